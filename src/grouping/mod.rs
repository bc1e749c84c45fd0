pub mod comparators;
pub mod config;
pub mod todo;

pub use comparators::{compare_hustles, compare_upgrades, register_standard_buckets, standard_registry};
pub use config::{GroupingOptions, TaskGroupConfig};
pub use todo::{build_todo_grouping, group_entries_by_task_group, is_pending, TaskGroup, TodoGrouping};
