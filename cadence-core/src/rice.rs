//! RICE prioritization engine: scoring, next-best-actions ordering, and
//! insight buckets.
//!
//! Everything here is a pure function over the task slice plus an explicit
//! `now`; callers own filtering policy (e.g. keeping must-dos out of the
//! next-best-actions pool) and cache invalidation of `Task::rice_score`.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::task::{Effort, Priority, Task, TaskStatus};

/// Scores closer than this are treated as tied and fall through to the
/// effort tiebreak. Changing it changes observable orderings.
pub const RICE_EPSILON: f64 = 0.1;

/// Inputs to the RICE formula. Reach/impact/confidence are trusted to be on
/// the 1-5 scale; out-of-range values propagate into an out-of-range score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiceParams {
    pub reach: f64,
    pub impact: f64,
    pub confidence: f64,
    pub effort: Effort,
}

/// Default factors used when a task does not carry explicit RICE inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiceConfig {
    pub default_reach: f64,
    pub default_impact: f64,
    pub default_confidence: f64,
}

impl Default for RiceConfig {
    fn default() -> Self {
        Self {
            default_reach: 3.0,
            default_impact: 3.0,
            default_confidence: 4.0,
        }
    }
}

/// Doubling per tier: each larger effort is worth half as much per unit
/// impact. XS ~15m, S ~30m, M ~1h, L ~2h, XL ~4h+.
fn effort_multiplier(effort: Effort) -> f64 {
    match effort {
        Effort::Xs => 1.0,
        Effort::S => 2.0,
        Effort::M => 4.0,
        Effort::L => 8.0,
        Effort::Xl => 16.0,
    }
}

fn priority_rank(priority: Priority) -> u8 {
    match priority {
        Priority::P0 => 0,
        Priority::P1 => 1,
        Priority::P2 => 2,
        Priority::P3 => 3,
    }
}

fn effort_rank(effort: Effort) -> u8 {
    match effort {
        Effort::Xs => 0,
        Effort::S => 1,
        Effort::M => 2,
        Effort::L => 3,
        Effort::Xl => 4,
    }
}

/// `(reach × impact × confidence) / effort multiplier`. No clamping.
pub fn calculate_rice_score(params: &RiceParams) -> f64 {
    (params.reach * params.impact * params.confidence) / effort_multiplier(params.effort)
}

/// RICE score for a task with the default factor config.
pub fn calculate_task_rice(task: &Task) -> f64 {
    calculate_task_rice_with(task, &RiceConfig::default())
}

/// Cached `rice_score` wins verbatim, whatever the other fields say; the
/// store owner invalidates it on mutation, not the engine.
pub fn calculate_task_rice_with(task: &Task, config: &RiceConfig) -> f64 {
    if let Some(score) = task.rice_score {
        return score;
    }

    calculate_rice_score(&RiceParams {
        reach: config.default_reach,
        impact: task.impact.unwrap_or(config.default_impact),
        confidence: config.default_confidence,
        effort: task.effort,
    })
}

/// "Next best actions": active tasks (status != DONE) in a strict total
/// order, RICE scores attached to the returned tasks.
///
/// The order is a five-key comparison; each key only breaks ties left by
/// the previous one:
/// 1. priority rank ascending (P0 first)
/// 2. due-date urgency: dated before undated, overdue before not, then
///    chronological within the partition
/// 3. RICE descending, with [`RICE_EPSILON`] treated as a tie
/// 4. effort rank ascending (quick wins first)
/// 5. last-touched ascending (older first)
///
/// The sort is stable, so tasks equal at every key keep input order.
pub fn next_best_actions(tasks: &[Task], now: DateTime<Utc>) -> Vec<Task> {
    let mut scored: Vec<Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .cloned()
        .map(|mut t| {
            t.rice_score = Some(calculate_task_rice(&t));
            t
        })
        .collect();

    scored.sort_by(|a, b| compare_next_best(a, b, now));
    scored
}

fn compare_next_best(a: &Task, b: &Task, now: DateTime<Utc>) -> Ordering {
    let by_priority = priority_rank(a.priority).cmp(&priority_rank(b.priority));
    if by_priority != Ordering::Equal {
        return by_priority;
    }

    match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => {
            let a_overdue = a_due < now;
            let b_overdue = b_due < now;
            if a_overdue != b_overdue {
                return if a_overdue { Ordering::Less } else { Ordering::Greater };
            }
            match a_due.cmp(&b_due) {
                Ordering::Equal => {}
                by_due => return by_due,
            }
        }
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }

    let a_score = a.rice_score.unwrap_or(0.0);
    let b_score = b.rice_score.unwrap_or(0.0);
    if (a_score - b_score).abs() > RICE_EPSILON {
        return b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal);
    }

    let by_effort = effort_rank(a.effort).cmp(&effort_rank(b.effort));
    if by_effort != Ordering::Equal {
        return by_effort;
    }

    a.last_touched_at.cmp(&b.last_touched_at)
}

/// The four insight buckets. Independently computed over active tasks; a
/// task may sit in several buckets at once.
#[derive(Debug, Clone, PartialEq)]
pub struct RiceInsights {
    /// Top 5 by RICE score.
    pub high_rice: Vec<Task>,
    /// Bottom 5, taken from the tail of the same descending sort (order
    /// preserved, not re-sorted ascending).
    pub low_rice: Vec<Task>,
    /// XS/S tasks by RICE descending, top 5.
    pub quick_wins: Vec<Task>,
    /// Every active task whose due date is strictly in the past. Uncapped.
    pub overdue: Vec<Task>,
}

pub fn rice_insights(tasks: &[Task], now: DateTime<Utc>) -> RiceInsights {
    let scored: Vec<Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .cloned()
        .map(|mut t| {
            t.rice_score = Some(calculate_task_rice(&t));
            t
        })
        .collect();

    let mut by_score_desc = scored.clone();
    by_score_desc.sort_by(|a, b| {
        let a_score = a.rice_score.unwrap_or(0.0);
        let b_score = b.rice_score.unwrap_or(0.0);
        b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
    });

    let high_rice: Vec<Task> = by_score_desc.iter().take(5).cloned().collect();
    let low_rice: Vec<Task> =
        by_score_desc[by_score_desc.len().saturating_sub(5)..].to_vec();

    let mut quick_wins: Vec<Task> = scored
        .iter()
        .filter(|t| matches!(t.effort, Effort::Xs | Effort::S))
        .cloned()
        .collect();
    quick_wins.sort_by(|a, b| {
        let a_score = a.rice_score.unwrap_or(0.0);
        let b_score = b.rice_score.unwrap_or(0.0);
        b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
    });
    quick_wins.truncate(5);

    let overdue: Vec<Task> = scored
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| due < now))
        .cloned()
        .collect();

    RiceInsights {
        high_rice,
        low_rice,
        quick_wins,
        overdue,
    }
}

/// Discrete tier label for a score. Cut points are inclusive: exactly 5.0
/// is "High", not "Medium".
pub fn format_rice_score(score: f64) -> &'static str {
    if score >= 10.0 {
        "🔥 Very High"
    } else if score >= 5.0 {
        "⚡ High"
    } else if score >= 2.0 {
        "📈 Medium"
    } else if score >= 1.0 {
        "📉 Low"
    } else {
        "🐌 Very Low"
    }
}

/// One-line recommendation for a task, from its cached or computed score.
pub fn rice_advice(task: &Task) -> &'static str {
    let score = task
        .rice_score
        .unwrap_or_else(|| calculate_task_rice(task));

    if score >= 10.0 {
        "🚀 High impact! Consider making this a Must-Do."
    } else if score >= 5.0 {
        "⚡ Good candidate for Focus Block."
    } else if score >= 2.0 {
        "📈 Worth doing when you have time."
    } else if score >= 1.0 {
        "📉 Low priority. Consider delegating or deferring."
    } else {
        "🐌 Very low value. Consider archiving."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 15, 12, 0, 0).unwrap()
    }

    fn task(id: &str) -> Task {
        Task::new(id, format!("task {id}"), t0())
    }

    #[test]
    fn test_score_strictly_decreases_with_effort() {
        let efforts = [Effort::Xs, Effort::S, Effort::M, Effort::L, Effort::Xl];
        let scores: Vec<f64> = efforts
            .iter()
            .map(|&effort| {
                calculate_rice_score(&RiceParams {
                    reach: 3.0,
                    impact: 4.0,
                    confidence: 5.0,
                    effort,
                })
            })
            .collect();

        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1], "expected {} > {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_effort_multipliers_double_per_tier() {
        let base = RiceParams {
            reach: 2.0,
            impact: 2.0,
            confidence: 2.0,
            effort: Effort::Xs,
        };
        assert_eq!(calculate_rice_score(&base), 8.0);
        assert_eq!(
            calculate_rice_score(&RiceParams { effort: Effort::Xl, ..base }),
            0.5
        );
    }

    #[test]
    fn test_cached_score_short_circuits() {
        // Cache wins even when the other fields would compute differently.
        let t = task("t1").with_effort(Effort::Xl).with_rice_score(7.0);
        assert_eq!(calculate_task_rice(&t), 7.0);
    }

    #[test]
    fn test_default_factors() {
        // reach=3, impact=3, confidence=4, effort M(4) -> 9.0
        let t = task("t1");
        assert_eq!(calculate_task_rice(&t), 9.0);

        // Explicit impact replaces the default.
        let t = task("t2").with_impact(5.0);
        assert_eq!(calculate_task_rice(&t), 15.0);
    }

    #[test]
    fn test_config_overrides_defaults() {
        let config = RiceConfig {
            default_reach: 1.0,
            default_impact: 1.0,
            default_confidence: 1.0,
        };
        let t = task("t1").with_effort(Effort::Xs);
        assert_eq!(calculate_task_rice_with(&t, &config), 1.0);
    }

    #[test]
    fn test_done_tasks_are_excluded() {
        let tasks = vec![
            task("t1"),
            task("t2").with_status(TaskStatus::Done),
        ];
        let actions = next_best_actions(&tasks, t0());
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].id, "t1");
    }

    #[test]
    fn test_priority_beats_due_date() {
        let now = t0();
        let a = task("a")
            .with_priority(Priority::P0)
            .with_due_date(now - Duration::days(1));
        let b = task("b")
            .with_priority(Priority::P1)
            .with_due_date(now + Duration::days(1));

        let actions = next_best_actions(&[b, a], now);
        assert_eq!(actions[0].id, "a");
        assert_eq!(actions[1].id, "b");
    }

    #[test]
    fn test_overdue_sorts_before_upcoming() {
        let now = t0();
        let overdue = task("late").with_due_date(now - Duration::hours(1));
        let upcoming = task("soon").with_due_date(now + Duration::hours(1));

        let actions = next_best_actions(&[upcoming, overdue], now);
        assert_eq!(actions[0].id, "late");
    }

    #[test]
    fn test_both_overdue_earlier_due_first() {
        let now = t0();
        let older = task("older").with_due_date(now - Duration::days(2));
        let newer = task("newer").with_due_date(now - Duration::days(1));

        let actions = next_best_actions(&[newer, older], now);
        assert_eq!(actions[0].id, "older");
        assert_eq!(actions[1].id, "newer");
    }

    #[test]
    fn test_dated_sorts_before_undated() {
        let now = t0();
        let dated = task("dated").with_due_date(now + Duration::days(30));
        let undated = task("undated");

        let actions = next_best_actions(&[undated, dated], now);
        assert_eq!(actions[0].id, "dated");
    }

    #[test]
    fn test_rice_breaks_ties_beyond_epsilon() {
        let now = t0();
        let low = task("low").with_rice_score(2.0);
        let high = task("high").with_rice_score(8.0);

        let actions = next_best_actions(&[low, high], now);
        assert_eq!(actions[0].id, "high");
    }

    #[test]
    fn test_scores_within_epsilon_fall_through_to_effort() {
        let now = t0();
        // 0.05 apart: tied at the score key, so the smaller effort wins
        // even though its score is lower.
        let big = task("big").with_rice_score(5.05).with_effort(Effort::L);
        let small = task("small").with_rice_score(5.0).with_effort(Effort::S);

        let actions = next_best_actions(&[big, small], now);
        assert_eq!(actions[0].id, "small");
    }

    #[test]
    fn test_last_touched_is_the_final_tiebreak() {
        let now = t0();
        let fresh = task("fresh")
            .with_rice_score(3.0)
            .touched_at(now - Duration::hours(1));
        let stale = task("stale")
            .with_rice_score(3.0)
            .touched_at(now - Duration::days(3));

        let actions = next_best_actions(&[fresh, stale], now);
        assert_eq!(actions[0].id, "stale");
    }

    #[test]
    fn test_returned_tasks_carry_their_scores() {
        let actions = next_best_actions(&[task("t1")], t0());
        assert_eq!(actions[0].rice_score, Some(9.0));
    }

    #[test]
    fn test_insights_bucket_boundaries() {
        let now = t0();
        // Distinct scores 1..=7 via the cache field.
        let tasks: Vec<Task> = (1..=7)
            .map(|i| task(&format!("t{i}")).with_rice_score(i as f64))
            .collect();

        let insights = rice_insights(&tasks, now);

        let high: Vec<&str> = insights.high_rice.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(high, vec!["t7", "t6", "t5", "t4", "t3"]);

        // Tail of the same descending list, order preserved.
        let low: Vec<&str> = insights.low_rice.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(low, vec!["t5", "t4", "t3", "t2", "t1"]);
    }

    #[test]
    fn test_insights_low_rice_with_fewer_than_five_tasks() {
        let tasks = vec![task("t1").with_rice_score(1.0), task("t2").with_rice_score(2.0)];
        let insights = rice_insights(&tasks, t0());
        assert_eq!(insights.high_rice.len(), 2);
        assert_eq!(insights.low_rice.len(), 2);
    }

    #[test]
    fn test_quick_wins_are_xs_and_s_only() {
        let tasks = vec![
            task("xs").with_effort(Effort::Xs),
            task("s").with_effort(Effort::S),
            task("m").with_effort(Effort::M),
            task("xl").with_effort(Effort::Xl),
        ];
        let insights = rice_insights(&tasks, t0());
        let wins: Vec<&str> = insights.quick_wins.iter().map(|t| t.id.as_str()).collect();
        // XS scores 36, S scores 18.
        assert_eq!(wins, vec!["xs", "s"]);
    }

    #[test]
    fn test_overdue_bucket_is_uncapped_and_excludes_done() {
        let now = t0();
        let mut tasks: Vec<Task> = (0..8)
            .map(|i| task(&format!("t{i}")).with_due_date(now - Duration::hours(i + 1)))
            .collect();
        tasks.push(
            task("done")
                .with_due_date(now - Duration::days(1))
                .with_status(TaskStatus::Done),
        );
        tasks.push(task("future").with_due_date(now + Duration::days(1)));

        let insights = rice_insights(&tasks, now);
        assert_eq!(insights.overdue.len(), 8);
    }

    #[test]
    fn test_a_task_can_be_a_quick_win_and_overdue() {
        let now = t0();
        let t = task("both")
            .with_effort(Effort::Xs)
            .with_due_date(now - Duration::hours(2));

        let insights = rice_insights(&[t], now);
        assert!(insights.quick_wins.iter().any(|t| t.id == "both"));
        assert!(insights.overdue.iter().any(|t| t.id == "both"));
    }

    #[test]
    fn test_format_rice_score_boundaries_are_inclusive() {
        assert_eq!(format_rice_score(10.0), "🔥 Very High");
        assert_eq!(format_rice_score(5.0), "⚡ High");
        assert_eq!(format_rice_score(4.999), "📈 Medium");
        assert_eq!(format_rice_score(2.0), "📈 Medium");
        assert_eq!(format_rice_score(1.0), "📉 Low");
        assert_eq!(format_rice_score(0.999), "🐌 Very Low");
    }

    #[test]
    fn test_advice_uses_cached_score_when_present() {
        let t = task("t1").with_rice_score(12.0);
        assert!(rice_advice(&t).contains("Must-Do"));

        // No cache: computed score 9.0 lands in the Focus Block tier.
        let t = task("t2");
        assert!(rice_advice(&t).contains("Focus Block"));
    }
}
