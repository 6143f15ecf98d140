use anyhow::{Context, Result, bail};
use cadence_core::{
    Task, TaskStatus, format_parsed, format_rice_score, next_best_actions, parse_quick_add,
    rice_advice, rice_insights,
    time::{format_week_range, local_now, local_to_utc, week_iso, week_start},
};
use chrono::Utc;
use clap::{Parser, Subcommand};

mod state;

#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Cadence task tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture a task with quick-add syntax: "title #project !P1 ^M @tomorrow ops"
    Add {
        /// Quick-add text (quotes optional; words are joined)
        text: Vec<String>,

        /// Flag the new task as a must-do for today
        #[arg(long)]
        must_do: bool,
    },

    /// Parse quick-add text and print the draft as JSON without saving
    Parse {
        text: Vec<String>,
    },

    /// Next best actions, ordered (must-dos excluded unless --all)
    Next {
        /// Limit number of tasks printed (default: 10)
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Include must-do tasks in the candidate pool
        #[arg(long)]
        all: bool,
    },

    /// RICE insight buckets: high, low, quick wins, overdue
    Insights,

    /// Mark a task done
    Done { id: String },

    /// Flag or unflag a task as must-do
    MustDo {
        id: String,

        #[arg(long)]
        clear: bool,
    },

    /// Weekly review summary for the current week
    Review,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Add { text, must_do } => add(&text.join(" "), must_do),
        Command::Parse { text } => parse(&text.join(" ")),
        Command::Next { limit, all } => next(limit, all),
        Command::Insights => insights(),
        Command::Done { id } => done(&id),
        Command::MustDo { id, clear } => must_do(&id, clear),
        Command::Review => review(),
    }
}

fn add(text: &str, is_must_do: bool) -> Result<()> {
    let profile = state::read_profile()?;
    let now_local = local_now(&profile.timezone)?;
    let now_utc = Utc::now();

    let parsed = parse_quick_add(text, now_local);
    if parsed.title.is_empty() {
        bail!("nothing left for a title after parsing: {text:?}");
    }

    let mut task = Task::new(
        format!("t{}", now_utc.timestamp_millis()),
        parsed.title.clone(),
        now_utc,
    );
    if let Some(priority) = parsed.priority {
        task = task.with_priority(priority);
    }
    if let Some(effort) = parsed.effort {
        task = task.with_effort(effort);
    }
    if let Some(due_local) = parsed.due_date {
        let due = local_to_utc(due_local, &profile.timezone)
            .with_context(|| format!("resolving due date in {}", profile.timezone))?;
        task = task.with_due_date(due);
    }
    if let Some(project) = &parsed.project_name {
        task = task.with_project(project.clone());
    }
    if let Some(labels) = &parsed.labels {
        task = task.with_labels(labels.clone());
    }
    task = task.with_must_do(is_must_do);

    let mut tasks = state::load_tasks()?;
    println!("added {}: {}", task.id, format_parsed(&parsed));
    tasks.push(task);
    state::save_tasks(&tasks)?;

    if state::read_profile()?.created_at_utc.is_none() {
        state::write_profile(&state::Profile {
            created_at_utc: Some(now_utc.to_rfc3339()),
            ..profile
        })?;
    }
    Ok(())
}

fn parse(text: &str) -> Result<()> {
    let profile = state::read_profile()?;
    let parsed = parse_quick_add(text, local_now(&profile.timezone)?);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn next(limit: usize, all: bool) -> Result<()> {
    let tasks = state::load_tasks()?;
    let now = Utc::now();

    // Must-do exclusion is caller policy, not the engine's.
    let pool: Vec<Task> = tasks
        .into_iter()
        .filter(|t| all || !t.is_must_do)
        .collect();

    let actions = next_best_actions(&pool, now);
    if actions.is_empty() {
        println!("no active tasks");
        return Ok(());
    }

    for task in actions.iter().take(limit) {
        let score = task.rice_score.unwrap_or(0.0);
        println!(
            "{:<16} {:>2} {:>2} {:>6.1} {:<14} {}",
            task.id,
            task.priority.as_str(),
            task.effort.as_str(),
            score,
            format_rice_score(score),
            task.title,
        );
        println!("{:<16} {}", "", rice_advice(task));
    }
    Ok(())
}

fn insights() -> Result<()> {
    let tasks = state::load_tasks()?;
    let buckets = rice_insights(&tasks, Utc::now());

    print_bucket("High RICE", &buckets.high_rice);
    print_bucket("Low RICE", &buckets.low_rice);
    print_bucket("Quick wins", &buckets.quick_wins);
    print_bucket("Overdue", &buckets.overdue);
    Ok(())
}

fn print_bucket(name: &str, tasks: &[Task]) {
    println!("{name} ({}):", tasks.len());
    for task in tasks {
        let score = task.rice_score.unwrap_or(0.0);
        println!("  {:<16} {:>6.1}  {}", task.id, score, task.title);
    }
    println!();
}

fn done(id: &str) -> Result<()> {
    update_task(id, |task| {
        task.status = TaskStatus::Done;
    })
}

fn must_do(id: &str, clear: bool) -> Result<()> {
    update_task(id, |task| {
        task.is_must_do = !clear;
    })
}

/// Apply a mutation, touch the task, and drop its stale score cache.
fn update_task(id: &str, f: impl FnOnce(&mut Task)) -> Result<()> {
    let mut tasks = state::load_tasks()?;
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        bail!("no task with id {id}");
    };

    f(task);
    task.last_touched_at = Utc::now();
    task.rice_score = None;

    println!("updated {}: {}", task.id, task.title);
    state::save_tasks(&tasks)?;
    Ok(())
}

fn review() -> Result<()> {
    let profile = state::read_profile()?;
    let today = local_now(&profile.timezone)?.date();
    let tasks = state::load_tasks()?;

    let week_begin = local_to_utc(
        week_start(today)
            .and_hms_opt(0, 0, 0)
            .context("week start midnight")?,
        &profile.timezone,
    )?;

    let done_this_week = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done && t.last_touched_at >= week_begin)
        .count();

    let must_dos: Vec<&Task> = tasks.iter().filter(|t| t.is_must_do).collect();
    let must_dos_done = must_dos
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count();

    println!("{} ({})", format_week_range(today), week_iso(today));
    println!("done this week: {done_this_week}");
    if must_dos.is_empty() {
        println!("must-dos: none committed");
    } else {
        let rate = (must_dos_done as f64 / must_dos.len() as f64) * 100.0;
        println!(
            "must-dos: {must_dos_done}/{} ({rate:.0}%)",
            must_dos.len()
        );
    }
    Ok(())
}
