use std::collections::HashMap;

use serde::Serialize;

use super::buckets::{FocusBucketRegistry, DEFAULT_FOCUS_MODE};
use super::entries::{collect_outstanding_entries, create_auto_completed_entries};
use super::metrics::QueueMetrics;
use super::providers::{ActionProvider, ProviderContext, ProviderHandle, ProviderRegistry};
use crate::models::{AutoCompletedEntry, DailySummary, DefinitionLookup, GameState, QueueEntry};
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_EMPTY_MESSAGE: &str = "Queue a hustle or upgrade to add new tasks.";

/// Per-build knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueOptions {
    pub focus_mode: String,
    /// Replaces the built-in empty-state copy when no provider set one.
    pub empty_message: Option<String>,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            focus_mode: DEFAULT_FOCUS_MODE.to_string(),
            empty_message: None,
        }
    }
}

/// The assembled queue handed to presentation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionQueue {
    pub entries: Vec<QueueEntry>,
    pub day: Option<u32>,
    pub hours_available: Option<f64>,
    pub hours_available_label: Option<String>,
    pub hours_spent: Option<f64>,
    pub hours_spent_label: Option<String>,
    pub money_available: Option<f64>,
    pub empty_message: Option<String>,
    pub button_class: Option<String>,
    pub default_label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub auto_completed_entries: Vec<AutoCompletedEntry>,
}

impl ActionQueue {
    pub fn entry(&self, id: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply_metrics(&mut self, metrics: QueueMetrics) {
        self.empty_message = metrics.empty_message;
        self.button_class = metrics.button_class;
        self.default_label = metrics.default_label;
        self.hours_available = metrics.hours_available;
        self.hours_available_label = metrics.hours_available_label;
        self.hours_spent = metrics.hours_spent;
        self.hours_spent_label = metrics.hours_spent_label;
        self.money_available = metrics.money_available;
    }
}

/// Keep one entry per id. A later duplicate only replaces the kept one when
/// it carries an action and the kept one does not; position stays with the
/// first occurrence.
pub fn dedupe_entries(entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut results: Vec<QueueEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match positions.get(&entry.id) {
            Some(&position) => {
                if entry.has_action() && !results[position].has_action() {
                    log_debug!("replacing duplicate entry {} with actionable copy", entry.id);
                    results[position] = entry;
                } else {
                    log_debug!("dropping duplicate entry {}", entry.id);
                }
            }
            None => {
                positions.insert(entry.id.clone(), results.len());
                results.push(entry);
            }
        }
    }
    results
}

/// Builds the queue from outstanding commitments and registered providers.
#[derive(Debug, Default)]
pub struct QueueAssembler {
    buckets: FocusBucketRegistry,
    providers: ProviderRegistry,
}

impl QueueAssembler {
    pub fn new(buckets: FocusBucketRegistry) -> Self {
        Self {
            buckets,
            providers: ProviderRegistry::new(),
        }
    }

    pub fn buckets(&self) -> &FocusBucketRegistry {
        &self.buckets
    }

    pub fn buckets_mut(&mut self) -> &mut FocusBucketRegistry {
        &mut self.buckets
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    pub fn register_provider<P>(&mut self, provider: P, priority: i32) -> ProviderHandle
    where
        P: ActionProvider + 'static,
    {
        self.providers.register(provider, priority)
    }

    pub fn unregister_provider(&mut self, handle: ProviderHandle) -> bool {
        self.providers.unregister(handle)
    }

    /// Rebuild the whole queue from `state`. Nothing is carried over from a
    /// previous build.
    pub fn build<L>(
        &self,
        state: &GameState,
        summary: &DailySummary,
        definitions: &L,
        options: &QueueOptions,
    ) -> ActionQueue
    where
        L: DefinitionLookup + ?Sized,
    {
        let mut entries = collect_outstanding_entries(state, definitions);
        let mut metrics = QueueMetrics::default();

        let context = ProviderContext { state, summary };
        for result in self.providers.collect(&context) {
            entries.extend(result.entries);
            metrics.merge_from(&result.metrics);
        }

        let entries = dedupe_entries(entries);
        if entries.is_empty() && metrics.empty_message.is_none() {
            metrics.empty_message = Some(
                options
                    .empty_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EMPTY_MESSAGE.to_string()),
            );
        }
        metrics.finalize(state);

        let entries = self.buckets.apply_focus_ordering(entries, &options.focus_mode);
        log_info!(
            "assembled queue with {} entries for day {:?}",
            entries.len(),
            state.reported_day()
        );

        let mut queue = ActionQueue {
            entries,
            day: state.reported_day(),
            auto_completed_entries: create_auto_completed_entries(summary),
            ..ActionQueue::default()
        };
        queue.apply_metrics(metrics);
        queue
    }
}
