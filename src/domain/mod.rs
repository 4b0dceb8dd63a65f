pub mod enums;
pub mod task;
pub mod views;

pub use enums::{Category, EnumParseError, Frequency, Priority, ViewMode};
pub use task::{Recurrence, SubTask, Task};
pub use views::{
    category_counts, due_buckets, format_due_relative, status_glyph, tree_connector, DueBuckets,
};
