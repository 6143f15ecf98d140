//! Quick-add micro-grammar: one line of free text in, a structured draft out.
//!
//! Grammar, in extraction order: `#project`, `!P0..!P3`, `^XS..^XL`,
//! `@today|tomorrow|EOW|YYYY-MM-DD[ HH:MM-HH:MM]`, then a fixed label
//! keyword set. Each step strips the first match of its token from the
//! working title and hands the residual to the next step; anything that
//! does not match stays in the title verbatim. Parsing never fails.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::task::{Effort, Priority};

/// Ephemeral draft produced by [`parse_quick_add`]. Converted into a real
/// task (project resolution, persistence) by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<Effort>,
    /// Local wall-clock instant; convert with [`crate::time::local_to_utc`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    /// `None` when no keyword matched; downstream consumers branch on
    /// presence, so this is never an empty vec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// How label keywords are matched against the residual title.
///
/// The source behavior is unanchored substring search ("opscenter" matches
/// `ops`), which may or may not be intended. Kept as the default;
/// [`LabelMatch::Word`] anchors on word boundaries instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMatch {
    #[default]
    Substring,
    Word,
}

const LABEL_KEYWORDS: [&str; 7] = [
    "sales",
    "ops",
    "labs",
    "finance",
    "content",
    "personal",
    "admin",
];

static PROJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("static pattern"));
static PRIORITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!P([0-3])").expect("static pattern"));
// XS and XL must be tried before S/L/M so `^XS` is not read as `^X` + `S`.
static EFFORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^(XS|XL|S|M|L)").expect("static pattern"));
static DUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(today|tomorrow|EOW|\d{4}-\d{2}-\d{2}(?:\s+\d{2}:\d{2}-\d{2}:\d{2})?)")
        .expect("static pattern")
});

struct LabelPattern {
    keyword: &'static str,
    substring: Regex,
    word: Regex,
}

static LABEL_PATTERNS: LazyLock<Vec<LabelPattern>> = LazyLock::new(|| {
    LABEL_KEYWORDS
        .iter()
        .map(|&kw| LabelPattern {
            keyword: kw,
            substring: Regex::new(&format!("(?i){kw}")).expect("static pattern"),
            word: Regex::new(&format!(r"(?i)\b{kw}\b")).expect("static pattern"),
        })
        .collect()
});

/// Parse one line of quick-add text. `now` is the local wall clock and only
/// feeds the relative date tokens (`@today`, `@tomorrow`, `@EOW`).
pub fn parse_quick_add(text: &str, now: NaiveDateTime) -> ParsedTask {
    parse_quick_add_with(text, now, LabelMatch::default())
}

pub fn parse_quick_add_with(text: &str, now: NaiveDateTime, label_match: LabelMatch) -> ParsedTask {
    let title = text.trim().to_string();

    let (title, project_name) = extract_project(&title);
    let (title, priority) = extract_priority(&title);
    let (title, effort) = extract_effort(&title);
    let (title, due_date) = extract_due(&title, now);
    let (title, labels) = extract_labels(&title, label_match);

    ParsedTask {
        title: normalize_whitespace(&title),
        project_name,
        priority,
        effort,
        due_date,
        labels,
    }
}

fn extract_project(title: &str) -> (String, Option<String>) {
    let Some(caps) = PROJECT_RE.captures(title) else {
        return (title.to_string(), None);
    };
    let name = caps.get(1).map(|m| m.as_str().to_string());
    (PROJECT_RE.replace(title, "").trim().to_string(), name)
}

fn extract_priority(title: &str) -> (String, Option<Priority>) {
    let Some(caps) = PRIORITY_RE.captures(title) else {
        return (title.to_string(), None);
    };
    let priority = caps.get(1).and_then(|m| match m.as_str() {
        "0" => Some(Priority::P0),
        "1" => Some(Priority::P1),
        "2" => Some(Priority::P2),
        "3" => Some(Priority::P3),
        _ => None,
    });
    (PRIORITY_RE.replace(title, "").trim().to_string(), priority)
}

fn extract_effort(title: &str) -> (String, Option<Effort>) {
    let Some(caps) = EFFORT_RE.captures(title) else {
        return (title.to_string(), None);
    };
    let effort = caps.get(1).and_then(|m| match m.as_str() {
        "XS" => Some(Effort::Xs),
        "S" => Some(Effort::S),
        "M" => Some(Effort::M),
        "L" => Some(Effort::L),
        "XL" => Some(Effort::Xl),
        _ => None,
    });
    (EFFORT_RE.replace(title, "").trim().to_string(), effort)
}

fn extract_due(title: &str, now: NaiveDateTime) -> (String, Option<NaiveDateTime>) {
    let Some(caps) = DUE_RE.captures(title) else {
        return (title.to_string(), None);
    };
    let (Some(whole), Some(tok)) = (caps.get(0), caps.get(1)) else {
        return (title.to_string(), None);
    };

    // A token that matches the shape but not the calendar (e.g. @2024-13-99)
    // is treated as unrecognized and stays in the title.
    let Some(due) = resolve_due_token(tok.as_str(), now) else {
        return (title.to_string(), None);
    };

    let mut residual = String::with_capacity(title.len());
    residual.push_str(&title[..whole.start()]);
    residual.push_str(&title[whole.end()..]);
    (residual.trim().to_string(), Some(due))
}

fn resolve_due_token(tok: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    match tok {
        "today" => end_of_day(now.date()),
        "tomorrow" => end_of_day(now.date() + Duration::days(1)),
        "EOW" => {
            // Signed remainder on purpose: Friday gives 0 (today), Saturday
            // gives -1 (the Friday just past), Sunday..Thursday the coming
            // Friday. Sunday = 0 weekday numbering.
            let weekday = now.date().weekday().num_days_from_sunday() as i64;
            let offset = (5 - weekday) % 7;
            end_of_day(now.date() + Duration::days(offset))
        }
        _ => {
            if let Some((date_part, range)) = tok.split_once(char::is_whitespace) {
                let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
                let (start, end) = range.trim_start().split_once('-')?;
                let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
                // The range's end is validated but dropped; ParsedTask only
                // carries a single due instant.
                NaiveTime::parse_from_str(end, "%H:%M").ok()?;
                Some(date.and_time(start))
            } else {
                let date = NaiveDate::parse_from_str(tok, "%Y-%m-%d").ok()?;
                end_of_day(date)
            }
        }
    }
}

fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(23, 59, 0)
}

fn extract_labels(title: &str, mode: LabelMatch) -> (String, Option<Vec<String>>) {
    let mut residual = title.to_string();
    let mut labels = Vec::new();

    // Fixed keyword order decides the output order, not order of
    // appearance in the input.
    for pat in LABEL_PATTERNS.iter() {
        let re = match mode {
            LabelMatch::Substring => &pat.substring,
            LabelMatch::Word => &pat.word,
        };
        if re.is_match(&residual) {
            labels.push(pat.keyword.to_string());
            residual = re.replace_all(&residual, "").trim().to_string();
        }
    }

    let labels = if labels.is_empty() { None } else { Some(labels) };
    (residual, labels)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical text form of a draft, for display and debugging.
///
/// Lossy round-trip: the due date collapses to `@YYYY-MM-DD`, so a draft
/// parsed from a time-range token does not re-parse to the same instant.
pub fn format_parsed(parsed: &ParsedTask) -> String {
    let mut out = parsed.title.clone();

    if let Some(project) = &parsed.project_name {
        out.push_str(&format!(" #{project}"));
    }
    if let Some(priority) = parsed.priority {
        out.push_str(&format!(" !{}", priority.as_str()));
    }
    if let Some(effort) = parsed.effort {
        out.push_str(&format!(" ^{}", effort.as_str()));
    }
    if let Some(due) = parsed.due_date {
        out.push_str(&format!(" @{}", due.date().format("%Y-%m-%d")));
    }
    if let Some(labels) = &parsed.labels {
        if !labels.is_empty() {
            out.push(' ');
            out.push_str(&labels.join(" "));
        }
    }

    out
}
