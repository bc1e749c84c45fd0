use serde::Serialize;

use super::config::{GroupingOptions, TaskGroupConfig};
use crate::completion::CompletionTracker;
use crate::models::QueueEntry;
use crate::queue::{
    normalize_bucket_name, FocusBucketRegistry, DEFAULT_EMPTY_MESSAGE, DEFAULT_FOCUS_BUCKET,
    DEFAULT_FOCUS_MODE,
};
use crate::log_debug;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub key: String,
    pub label: String,
    pub empty: String,
    pub entries: Vec<QueueEntry>,
}

/// Pending entries, both as one ordered list and split into lanes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoGrouping {
    pub entries: Vec<QueueEntry>,
    pub groups: Vec<TaskGroup>,
    pub total_pending: usize,
    pub empty_message: String,
}

impl TodoGrouping {
    pub fn group(&self, key: &str) -> Option<&TaskGroup> {
        self.groups.iter().find(|group| group.key == key)
    }
}

fn budget(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite()).map(|value| value.max(0.0))
}

/// Whether `entry` can still be offered today under the given budgets.
pub fn is_pending(
    entry: &QueueEntry,
    tracker: &CompletionTracker,
    hours_available: Option<f64>,
    money_available: Option<f64>,
) -> bool {
    if tracker.effective_remaining_runs(entry) == Some(0) {
        return false;
    }
    if let Some(hours) = budget(hours_available) {
        if entry.duration_hours.is_finite() && entry.duration_hours > hours {
            return false;
        }
    }
    if let Some(money) = budget(money_available) {
        if entry.money_cost.is_finite() && entry.money_cost > money {
            return false;
        }
    }
    match tracker.record(&entry.id) {
        Some(_) => entry.repeatable,
        None => true,
    }
}

struct Lane<'c> {
    config: &'c TaskGroupConfig,
    buckets: Vec<String>,
}

fn lanes(configs: &[TaskGroupConfig]) -> Vec<Lane<'_>> {
    configs
        .iter()
        .map(|config| {
            let mut buckets: Vec<String> = config
                .buckets
                .iter()
                .filter_map(|bucket| normalize_bucket_name(Some(bucket.as_str())))
                .collect();
            if buckets.is_empty() {
                buckets.push(
                    normalize_bucket_name(Some(config.key.as_str()))
                        .unwrap_or_else(|| DEFAULT_FOCUS_BUCKET.to_string()),
                );
            }
            Lane { config, buckets }
        })
        .collect()
}

/// Split already-ordered entries into lanes. Buckets no lane claims go to
/// the lane holding the default bucket, else the last lane.
pub fn group_entries_by_task_group(
    entries: Vec<QueueEntry>,
    registry: &FocusBucketRegistry,
    configs: &[TaskGroupConfig],
) -> Vec<TaskGroup> {
    let configs: Vec<TaskGroupConfig> = if configs.is_empty() {
        TaskGroupConfig::defaults()
    } else {
        configs.to_vec()
    };
    let lanes = lanes(&configs);
    let fallback = lanes
        .iter()
        .position(|lane| lane.buckets.iter().any(|bucket| bucket == DEFAULT_FOCUS_BUCKET))
        .unwrap_or(lanes.len().saturating_sub(1));

    let mut groups: Vec<TaskGroup> = lanes
        .iter()
        .map(|lane| TaskGroup {
            key: lane.config.key.clone(),
            label: lane.config.label.clone(),
            empty: lane.config.empty.clone(),
            entries: Vec::new(),
        })
        .collect();

    for (bucket, bucket_entries) in registry.sorted_buckets(entries) {
        let target = lanes
            .iter()
            .position(|lane| lane.buckets.contains(&bucket))
            .unwrap_or(fallback);
        if let Some(group) = groups.get_mut(target) {
            group.entries.extend(bucket_entries);
        }
    }
    groups
}

/// Filter the queue down to what can run now, order it under the focus mode
/// and split it into lanes.
pub fn build_todo_grouping(
    entries: &[QueueEntry],
    registry: &FocusBucketRegistry,
    tracker: &CompletionTracker,
    options: &GroupingOptions,
) -> TodoGrouping {
    let focus_mode = match options.focus_mode.trim() {
        "" => DEFAULT_FOCUS_MODE,
        mode => mode,
    };

    let pending: Vec<QueueEntry> = entries
        .iter()
        .filter(|entry| {
            let keep = is_pending(entry, tracker, options.hours_available, options.money_available);
            if !keep {
                log_debug!("entry {} not pending", entry.id);
            }
            keep
        })
        .cloned()
        .collect();

    let ordered = registry.apply_focus_ordering(pending, focus_mode);
    let groups = group_entries_by_task_group(ordered.clone(), registry, &options.group_configs);
    let empty_message = options
        .empty_message
        .clone()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EMPTY_MESSAGE.to_string());

    TodoGrouping {
        total_pending: ordered.len(),
        entries: ordered,
        groups,
        empty_message,
    }
}
