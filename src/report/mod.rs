pub mod generator;
pub mod stats;

pub use generator::generate_report;
pub use stats::{
    completion_by_category, daily_activity, open_subtask_count, overall_completion_rate,
    CategoryCompletion,
};
