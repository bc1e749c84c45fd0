use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::modes::CompletionMode;
use crate::progress::ProgressSnapshot;

/// Callback attached to provider entries. Returns how the action went.
pub type ActionHandler = Arc<dyn Fn() -> Result<ActionOutcome> + Send + Sync>;

/// What happens when the player triggers an entry.
#[derive(Clone)]
pub enum EntryAction {
    /// Log one work step (or the closing step) on a commitment.
    Progress(ProgressAction),
    /// Opaque callback supplied by a provider.
    Handler(ActionHandler),
}

impl EntryAction {
    pub fn handler<F>(callback: F) -> Self
    where
        F: Fn() -> Result<ActionOutcome> + Send + Sync + 'static,
    {
        EntryAction::Handler(Arc::new(callback))
    }
}

impl fmt::Debug for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryAction::Progress(action) => f.debug_tuple("Progress").field(action).finish(),
            EntryAction::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Work-step parameters captured from a progress snapshot at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressAction {
    pub definition_id: String,
    pub instance_id: String,
    pub step_hours: f64,
    pub hours_remaining: Option<f64>,
    pub completion: CompletionMode,
    pub study_track_id: Option<String>,
}

impl ProgressAction {
    /// Hours one trigger consumes, never more than what is left.
    pub fn step(&self) -> f64 {
        if self.step_hours.is_finite() && self.step_hours > 0.0 {
            return match self.hours_remaining {
                Some(remaining) if remaining >= 0.0 => self.step_hours.min(remaining),
                _ => self.step_hours,
            };
        }
        0.0
    }

    /// Manual commitments with nothing left to log only need closing out.
    pub fn needs_close_out(&self) -> bool {
        let has_remaining = self.hours_remaining.map(|hours| hours > 0.0).unwrap_or(true);
        self.completion.is_manual() && (!has_remaining || self.step() <= 0.0)
    }
}

/// Result reported by an entry action.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub success: bool,
    /// Hours actually consumed, when the action reports its own amount.
    pub hours: Option<f64>,
    /// The underlying commitment was closed by this action.
    pub completed: bool,
}

impl ActionOutcome {
    pub fn failed() -> Self {
        Self::default()
    }

    pub fn worked(hours: f64) -> Self {
        Self {
            success: true,
            hours: Some(hours),
            completed: false,
        }
    }

    pub fn closed() -> Self {
        Self {
            success: true,
            hours: Some(0.0),
            completed: true,
        }
    }
}

impl From<bool> for ActionOutcome {
    fn from(success: bool) -> Self {
        Self {
            success,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaTone {
    Alert,
    Warning,
}

/// Presentation-ready queue row. Rebuilt on every assembly.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub meta: String,
    pub meta_tone: Option<MetaTone>,
    pub duration_hours: f64,
    pub duration_text: String,
    pub money_cost: f64,
    pub payout: f64,
    pub payout_text: String,
    pub money_per_hour: f64,
    pub repeatable: bool,
    /// `None` means the entry can be run any number of times.
    pub remaining_runs: Option<u32>,
    pub focus_category: Option<String>,
    pub focus_bucket: Option<String>,
    pub upgrade_remaining: Option<f64>,
    /// Position hint used as the last tie-breaker inside a bucket.
    pub order_index: Option<i64>,
    pub exclude_from_queue: bool,
    pub progress: Option<ProgressSnapshot>,
    pub instance_id: Option<String>,
    pub definition_id: Option<String>,
    pub offer_id: Option<String>,
    #[serde(skip)]
    pub action: Option<EntryAction>,
}

impl QueueEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn order(&self) -> i64 {
        self.order_index.unwrap_or(0)
    }
}

/// Upkeep or study time the day-advance logic logged without player input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCompletedEntry {
    pub id: String,
    pub title: String,
    pub duration_hours: f64,
    pub duration_text: String,
    pub category: String,
    pub count: Option<u32>,
}
