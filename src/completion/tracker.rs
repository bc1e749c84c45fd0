use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AutoCompletedEntry, QueueEntry};
use crate::utils::format_duration;
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

/// One entry's completions for the current day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub id: String,
    pub title: String,
    /// Hours actually consumed by the most recent run.
    pub duration_hours: f64,
    pub duration_text: String,
    /// Hours consumed across every run today.
    pub total_hours: f64,
    pub repeatable: bool,
    pub remaining_runs: Option<u32>,
    pub count: u32,
    pub sequence: u64,
    pub auto_completed: bool,
    pub completed_at: DateTime<Utc>,
}

/// Per-day completion table.
///
/// The table belongs to exactly one in-game day; [`sync_day`] clears it as
/// soon as a different day is reported.
///
/// [`sync_day`]: CompletionTracker::sync_day
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    day: Option<u32>,
    records: HashMap<String, CompletionRecord>,
    next_sequence: u64,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// Align the table with the day the queue reports. Returns `true` when
    /// the table was cleared.
    pub fn sync_day(&mut self, day: Option<u32>) -> bool {
        if day == self.day {
            return false;
        }
        let cleared = !self.records.is_empty();
        if cleared {
            log_info!(
                "clearing {} completion records on day change {:?} -> {:?}",
                self.records.len(),
                self.day,
                day
            );
        }
        self.records.clear();
        self.day = day;
        cleared
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Record one run of `entry` that consumed `hours`.
    ///
    /// Repeat runs bump the count and keep the original sequence number and
    /// first-completion timestamp.
    pub fn record_completion(&mut self, entry: &QueueEntry, hours: f64) -> &CompletionRecord {
        let hours = if hours.is_finite() && hours > 0.0 { hours } else { 0.0 };
        let existing = self.records.get(&entry.id);
        let (sequence, count, total_hours, completed_at) = match existing {
            Some(record) => (
                record.sequence,
                record.count + 1,
                record.total_hours + hours,
                record.completed_at,
            ),
            None => (self.take_sequence(), 1, hours, Utc::now()),
        };
        log_debug!("recorded completion {} (run {count})", entry.id);

        let record = CompletionRecord {
            id: entry.id.clone(),
            title: entry.title.clone(),
            duration_hours: hours,
            duration_text: format_duration(hours),
            total_hours,
            repeatable: entry.repeatable,
            remaining_runs: entry.remaining_runs,
            count,
            sequence,
            auto_completed: false,
            completed_at,
        };
        self.records.insert(entry.id.clone(), record);
        &self.records[&entry.id]
    }

    /// Insert work the day-advance logic already resolved. Seeded records
    /// are never repeatable.
    pub fn seed_auto_completed(&mut self, entries: &[AutoCompletedEntry]) {
        for (index, entry) in entries.iter().enumerate() {
            let id = if entry.id.trim().is_empty() {
                format!("auto-{index}")
            } else {
                entry.id.clone()
            };
            let hours = if entry.duration_hours.is_finite() && entry.duration_hours > 0.0 {
                entry.duration_hours
            } else {
                0.0
            };
            let duration_text = if entry.duration_text.trim().is_empty() {
                format_duration(hours)
            } else {
                entry.duration_text.clone()
            };
            let count = entry.count.filter(|count| *count > 0).unwrap_or(1);

            let (sequence, completed_at) = match self.records.get(&id) {
                Some(existing) => (existing.sequence, existing.completed_at),
                None => (self.take_sequence(), Utc::now()),
            };
            let title = if entry.title.trim().is_empty() {
                "Scheduled work".to_string()
            } else {
                entry.title.clone()
            };

            self.records.insert(
                id.clone(),
                CompletionRecord {
                    id,
                    title,
                    duration_hours: hours,
                    duration_text,
                    total_hours: hours,
                    repeatable: false,
                    remaining_runs: None,
                    count,
                    sequence,
                    auto_completed: true,
                    completed_at,
                },
            );
        }
    }

    pub fn record(&self, entry_id: &str) -> Option<&CompletionRecord> {
        self.records.get(entry_id)
    }

    /// Runs still available today: the declared count minus today's runs.
    /// `None` means unbounded.
    pub fn effective_remaining_runs(&self, entry: &QueueEntry) -> Option<u32> {
        let declared = entry.remaining_runs?;
        let used = self.record(&entry.id).map(|record| record.count).unwrap_or(0);
        Some(declared.saturating_sub(used))
    }

    /// Completed records in first-completion order.
    pub fn completed_entries(&self) -> Vec<&CompletionRecord> {
        let mut records: Vec<&CompletionRecord> = self.records.values().collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    pub fn hours_logged_today(&self) -> f64 {
        self.records.values().map(|record| record.total_hours).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, runs: Option<u32>, repeatable: bool) -> QueueEntry {
        QueueEntry {
            remaining_runs: runs,
            repeatable,
            duration_hours: 2.0,
            ..QueueEntry::new(id, id)
        }
    }

    #[test]
    fn repeat_runs_keep_sequence_and_count_up() {
        let mut tracker = CompletionTracker::new();
        tracker.sync_day(Some(1));
        let first = entry("a", Some(3), true);
        let second = entry("b", None, false);

        let original = tracker.record_completion(&first, 2.0).clone();
        tracker.record_completion(&second, 1.0);
        let repeat = tracker.record_completion(&first, 1.5).clone();

        assert_eq!(repeat.count, 2);
        assert_eq!(repeat.sequence, original.sequence);
        assert_eq!(repeat.completed_at, original.completed_at);
        assert_eq!(repeat.duration_hours, 1.5);
        assert_eq!(repeat.total_hours, 3.5);

        let order: Vec<&str> = tracker
            .completed_entries()
            .into_iter()
            .map(|record| record.id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(tracker.hours_logged_today(), 4.5);
    }

    #[test]
    fn remaining_runs_subtract_completions() {
        let mut tracker = CompletionTracker::new();
        let work = entry("work", Some(3), true);
        assert_eq!(tracker.effective_remaining_runs(&work), Some(3));

        tracker.record_completion(&work, 2.0);
        assert_eq!(tracker.effective_remaining_runs(&work), Some(2));

        for _ in 0..4 {
            tracker.record_completion(&work, 2.0);
        }
        assert_eq!(tracker.effective_remaining_runs(&work), Some(0));
        assert_eq!(tracker.effective_remaining_runs(&entry("open", None, true)), None);
    }

    #[test]
    fn day_change_clears_the_table() {
        let mut tracker = CompletionTracker::new();
        assert!(!tracker.sync_day(Some(4)));
        tracker.record_completion(&entry("a", Some(2), true), 1.0);

        assert!(!tracker.sync_day(Some(4)));
        assert_eq!(tracker.len(), 1);

        assert!(tracker.sync_day(Some(5)));
        assert!(tracker.is_empty());
        assert_eq!(tracker.day(), Some(5));
    }

    #[test]
    fn seeded_entries_are_never_repeatable() {
        let mut tracker = CompletionTracker::new();
        tracker.seed_auto_completed(&[
            AutoCompletedEntry {
                id: "auto:blog".into(),
                title: "Blog upkeep".into(),
                duration_hours: 1.0,
                duration_text: String::new(),
                category: "maintenance".into(),
                count: None,
            },
            AutoCompletedEntry {
                id: String::new(),
                title: String::new(),
                duration_hours: -2.0,
                duration_text: String::new(),
                category: "study".into(),
                count: Some(2),
            },
        ]);

        let blog = tracker.record("auto:blog").expect("seeded");
        assert!(!blog.repeatable);
        assert!(blog.auto_completed);
        assert_eq!(blog.count, 1);
        assert_eq!(blog.duration_text, "1h");

        let fallback = tracker.record("auto-1").expect("fallback id");
        assert_eq!(fallback.title, "Scheduled work");
        assert_eq!(fallback.duration_hours, 0.0);
        assert_eq!(fallback.count, 2);
    }

    #[test]
    fn reseeding_keeps_first_sequence() {
        let mut tracker = CompletionTracker::new();
        let seed = AutoCompletedEntry {
            id: "auto:garden".into(),
            title: "Garden".into(),
            duration_hours: 1.0,
            duration_text: "1h".into(),
            category: "maintenance".into(),
            count: None,
        };
        tracker.seed_auto_completed(std::slice::from_ref(&seed));
        let sequence = tracker.record("auto:garden").expect("seeded").sequence;
        tracker.record_completion(&entry("manual", None, false), 1.0);
        tracker.seed_auto_completed(&[seed]);

        assert_eq!(tracker.record("auto:garden").expect("seeded").sequence, sequence);
        assert_eq!(tracker.completed_entries()[0].id, "auto:garden");
    }
}
