//! Commitment progress tracking and the daily action queue.
//!
//! The host game owns its state. This crate reads it, derives progress
//! snapshots for accepted commitments, assembles a deduplicated queue from
//! those commitments and registered providers, orders the queue by focus
//! mode and tracks what the player finished today.

pub mod completion;
pub mod grouping;
pub mod models;
pub mod progress;
pub mod queue;
pub mod settings;
pub mod utils;

pub use completion::{CommitmentHost, CompletionTracker, QueueController};
pub use grouping::{build_todo_grouping, standard_registry, GroupingOptions, TodoGrouping};
pub use models::{GameState, QueueEntry};
pub use progress::{build_progress_snapshot, ProgressSnapshot};
pub use queue::{ActionQueue, QueueAssembler, QueueOptions};
pub use settings::{SchedulerSettings, SettingsStore};
