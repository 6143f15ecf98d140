//! cadence-core: task model, quick-add parsing, and RICE prioritization.

pub mod quick_add;
pub mod rice;
pub mod task;
pub mod time;

pub use quick_add::{LabelMatch, ParsedTask, format_parsed, parse_quick_add, parse_quick_add_with};
pub use rice::{
    RICE_EPSILON, RiceConfig, RiceInsights, RiceParams, calculate_rice_score, calculate_task_rice,
    calculate_task_rice_with, format_rice_score, next_best_actions, rice_advice, rice_insights,
};
pub use task::{Effort, Priority, Task, TaskStatus};
