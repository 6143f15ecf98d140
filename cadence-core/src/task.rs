//! Task model shared by the quick-add parser and the prioritization engine.
//!
//! Wire spellings (`"P0"`, `"XS"`, `"IN_PROGRESS"`, camelCase fields) match the
//! backing store, so records round-trip through serde untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Inbox,
    Today,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    /// Most urgent.
    P0 = 0,
    P1 = 1,
    P2 = 2,
    /// Background.
    P3 = 3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

/// Coarse time-cost tier. XS ~15m doubling up to XL ~4h+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effort {
    Xs = 0,
    S = 1,
    M = 2,
    L = 3,
    Xl = 4,
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effort::Xs => "XS",
            Effort::S => "S",
            Effort::M => "M",
            Effort::L => "L",
            Effort::Xl => "XL",
        }
    }
}

/// Core task type.
///
/// The engine treats tasks as immutable input per call; mutation (and
/// invalidating the `rice_score` cache afterwards) belongs to whoever owns
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,

    pub status: TaskStatus,
    pub priority: Priority,
    pub effort: Effort,

    /// Optional deadline (UTC). Absent means "no deadline".
    pub due_date: Option<DateTime<Utc>>,

    /// Committed for today; excluded from next-best-actions by callers.
    #[serde(default)]
    pub is_must_do: bool,

    /// Final tie-break in the next-best-actions ordering (older first).
    pub last_touched_at: DateTime<Utc>,

    /// Optional 1-5 impact factor; engine defaults it when absent.
    pub impact: Option<f64>,

    /// Cached RICE score. When set, the engine returns it verbatim.
    pub rice_score: Option<f64>,

    pub project: Option<String>,

    #[serde(default)]
    pub labels: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::Inbox,
            priority: Priority::P2,
            effort: Effort::M,
            due_date: None,
            is_must_do: false,
            last_touched_at: created,
            impact: None,
            rice_score: None,
            project: None,
            labels: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_must_do(mut self, flag: bool) -> Self {
        self.is_must_do = flag;
        self
    }

    pub fn with_impact(mut self, impact: f64) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn with_rice_score(mut self, score: f64) -> Self {
        self.rice_score = Some(score);
        self
    }

    pub fn with_project(mut self, name: impl Into<String>) -> Self {
        self.project = Some(name.into());
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn touched_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_touched_at = at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_spellings_round_trip() {
        let created = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
        let t = Task::new("t1", "Ship report", created)
            .with_priority(Priority::P1)
            .with_effort(Effort::Xl)
            .with_status(TaskStatus::InProgress)
            .with_labels(vec!["ops".to_string()]);

        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"priority\":\"P1\""));
        assert!(json.contains("\"effort\":\"XL\""));
        assert!(json.contains("\"status\":\"IN_PROGRESS\""));
        assert!(json.contains("\"lastTouchedAt\""));
        assert!(json.contains("\"isMustDo\":false"));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_unknown_effort_rejected_at_the_boundary() {
        // The enums are closed; out-of-range wire values never become tasks.
        let err = serde_json::from_str::<Effort>("\"XXL\"");
        assert!(err.is_err());
    }
}
