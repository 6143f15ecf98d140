//! File-backed CLI state under ~/.cadence/.

use anyhow::{Context, Result};
use cadence_core::Task;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub fn cadence_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cadence"))
}

pub fn ensure_cadence_home() -> Result<PathBuf> {
    let dir = cadence_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub created_at_utc: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            created_at_utc: None,
            timezone: default_timezone(),
        }
    }
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_cadence_home()?.join("profile.json"))
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_cadence_home()?.join("tasks.json"))
}

pub fn read_profile() -> Result<Profile> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(Profile::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn write_profile(profile: &Profile) -> Result<()> {
    let p = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn load_tasks() -> Result<Vec<Task>> {
    let p = tasks_path()?;
    if !p.exists() {
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn save_tasks(tasks: &[Task]) -> Result<()> {
    let p = tasks_path()?;
    let json = serde_json::to_string_pretty(tasks)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
