pub mod controller;
pub mod tracker;

pub use controller::{execute_progress_action, CommitmentHost, ProvisionalPatch, QueueController};
pub use tracker::{CompletionRecord, CompletionTracker};
