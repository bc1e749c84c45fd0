//! Runs entry actions and keeps the rendered queue consistent until the
//! next authoritative rebuild.
//!
//! A successful action records a completion and adds a provisional hours
//! delta on top of the last rendered queue. The delta only lives until the
//! host hands over a freshly built queue through [`QueueController::render`].

use anyhow::{Context, Result};

use super::tracker::CompletionTracker;
use crate::grouping::{build_todo_grouping, GroupingOptions, TodoGrouping};
use crate::models::{ActionOutcome, EntryAction, ProgressAction, QueueEntry};
use crate::queue::{ActionQueue, FocusBucketRegistry};
use crate::utils::format_hours;
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

/// Game operations a commitment action needs. Implemented by the game's
/// lifecycle layer.
pub trait CommitmentHost {
    /// Focus hours left today; `None` when the host does not track a limit.
    fn time_left(&self) -> Option<f64>;
    fn spend_time(&mut self, hours: f64) -> Result<()>;
    fn advance_instance(&mut self, definition_id: &str, instance_id: &str, hours: f64)
        -> Result<()>;
    fn complete_instance(&mut self, definition_id: &str, instance_id: &str) -> Result<()>;
    fn allocate_daily_study(&mut self, track_id: Option<&str>) -> Result<()>;
}

/// Log one step of work on a commitment, or close it out.
pub fn execute_progress_action<H>(action: &ProgressAction, host: &mut H) -> Result<ActionOutcome>
where
    H: CommitmentHost + ?Sized,
{
    let step = action.step();
    if action.needs_close_out() || step <= 0.0 {
        host.complete_instance(&action.definition_id, &action.instance_id)
            .with_context(|| format!("failed to complete {}", action.instance_id))?;
        return Ok(ActionOutcome::closed());
    }

    if let Some(available) = host.time_left() {
        if available < step {
            log_warn!(
                "You need {} focus free before logging that commitment. Wrap another task first or rest up.",
                format_hours(step)
            );
            return Ok(ActionOutcome::failed());
        }
    }

    host.spend_time(step).context("failed to spend focus hours")?;

    // Time is gone once spent, so the step counts as a run from here on.
    if let Err(err) = host.advance_instance(&action.definition_id, &action.instance_id, step) {
        log_warn!("failed to advance {}: {err:#}", action.instance_id);
    }
    if let Some(track) = action.study_track_id.as_deref() {
        if let Err(err) = host.allocate_daily_study(Some(track)) {
            log_warn!("failed to allocate study for {track}: {err:#}");
        }
    }

    Ok(ActionOutcome::worked(step))
}

/// Local adjustment applied on top of the last authoritative queue.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProvisionalPatch {
    pub hours_consumed: f64,
}

impl ProvisionalPatch {
    pub fn is_empty(&self) -> bool {
        self.hours_consumed <= 0.0
    }

    /// `queue` with the delta applied to its hour figures.
    pub fn apply(&self, queue: &ActionQueue) -> ActionQueue {
        let mut patched = queue.clone();
        if self.is_empty() {
            return patched;
        }
        if let Some(available) = patched.hours_available {
            let available = (available - self.hours_consumed).max(0.0);
            patched.hours_available = Some(available);
            patched.hours_available_label = Some(format_hours(available));
        }
        if let Some(spent) = patched.hours_spent {
            let spent = spent + self.hours_consumed;
            patched.hours_spent = Some(spent);
            patched.hours_spent_label = Some(format_hours(spent));
        }
        patched
    }
}

#[derive(Debug, Default)]
pub struct QueueController {
    queue: ActionQueue,
    tracker: CompletionTracker,
    patch: ProvisionalPatch,
}

impl QueueController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly assembled queue. Supersedes any provisional patch,
    /// clears completions when the day moved on, and seeds auto-completed
    /// work.
    pub fn render(&mut self, queue: ActionQueue) {
        self.tracker.sync_day(queue.day);
        self.tracker.seed_auto_completed(&queue.auto_completed_entries);
        self.patch = ProvisionalPatch::default();
        self.queue = queue;
    }

    /// The last authoritative queue, without the provisional delta.
    pub fn authoritative(&self) -> &ActionQueue {
        &self.queue
    }

    /// The queue as it should be shown right now.
    pub fn current(&self) -> ActionQueue {
        self.patch.apply(&self.queue)
    }

    pub fn patch(&self) -> ProvisionalPatch {
        self.patch
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    /// Pending lanes computed against the provisional hour budget.
    pub fn grouping(&self, registry: &FocusBucketRegistry, focus_mode: &str) -> TodoGrouping {
        let current = self.current();
        let options = GroupingOptions {
            focus_mode: focus_mode.to_string(),
            hours_available: current.hours_available,
            money_available: current.money_available,
            empty_message: current.empty_message.clone(),
            ..GroupingOptions::default()
        };
        build_todo_grouping(&current.entries, registry, &self.tracker, &options)
    }

    /// Run the action behind `entry_id`.
    ///
    /// A failed action leaves the tracker and the provisional patch
    /// untouched, so the entry stays available for a retry.
    pub fn trigger<H>(&mut self, entry_id: &str, host: &mut H) -> ActionOutcome
    where
        H: CommitmentHost + ?Sized,
    {
        let Some(entry) = self.queue.entry(entry_id).cloned() else {
            log_warn!("no queued entry {entry_id}");
            return ActionOutcome::failed();
        };
        if !self.is_available(&entry) {
            log_debug!("entry {entry_id} already used up today");
            return ActionOutcome::failed();
        }

        let outcome = match run_action(&entry, host) {
            Ok(outcome) => outcome,
            Err(err) => {
                log_warn!("action for {entry_id} failed: {err:#}");
                return ActionOutcome::failed();
            }
        };
        if !outcome.success {
            log_debug!("action for {entry_id} reported failure");
            return outcome;
        }

        let hours = outcome
            .hours
            .filter(|hours| hours.is_finite() && *hours >= 0.0)
            .unwrap_or(entry.duration_hours);
        self.tracker.record_completion(&entry, hours);
        self.patch.hours_consumed += hours;
        outcome
    }

    fn is_available(&self, entry: &QueueEntry) -> bool {
        if self.tracker.effective_remaining_runs(entry) == Some(0) {
            return false;
        }
        self.tracker.record(&entry.id).is_none() || entry.repeatable
    }
}

fn run_action<H>(entry: &QueueEntry, host: &mut H) -> Result<ActionOutcome>
where
    H: CommitmentHost + ?Sized,
{
    match &entry.action {
        Some(EntryAction::Progress(action)) => execute_progress_action(action, host),
        Some(EntryAction::Handler(handler)) => handler(),
        // Plain checklist items just get ticked off.
        None => Ok(ActionOutcome::from(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletionMode;
    use anyhow::bail;

    #[derive(Debug, Default)]
    struct FakeHost {
        time_left: Option<f64>,
        spent: f64,
        advanced: Vec<(String, f64)>,
        completed: Vec<String>,
        studied: Vec<Option<String>>,
        fail_spend: bool,
        fail_study: bool,
    }

    impl CommitmentHost for FakeHost {
        fn time_left(&self) -> Option<f64> {
            self.time_left
        }

        fn spend_time(&mut self, hours: f64) -> Result<()> {
            if self.fail_spend {
                bail!("clock stopped");
            }
            self.spent += hours;
            if let Some(left) = self.time_left.as_mut() {
                *left -= hours;
            }
            Ok(())
        }

        fn advance_instance(&mut self, _definition_id: &str, instance_id: &str, hours: f64) -> Result<()> {
            self.advanced.push((instance_id.to_string(), hours));
            Ok(())
        }

        fn complete_instance(&mut self, _definition_id: &str, instance_id: &str) -> Result<()> {
            self.completed.push(instance_id.to_string());
            Ok(())
        }

        fn allocate_daily_study(&mut self, track_id: Option<&str>) -> Result<()> {
            if self.fail_study {
                bail!("study slots full");
            }
            self.studied.push(track_id.map(str::to_string));
            Ok(())
        }
    }

    fn progress_entry(step: f64, remaining: f64, completion: CompletionMode) -> QueueEntry {
        let runs = if step > 0.0 { (remaining / step).ceil() as u32 } else { 1 };
        QueueEntry {
            duration_hours: step,
            remaining_runs: Some(runs.max(1)),
            repeatable: runs > 1,
            action: Some(EntryAction::Progress(ProgressAction {
                definition_id: "freelance".into(),
                instance_id: "inst-1".into(),
                step_hours: step,
                hours_remaining: Some(remaining),
                completion,
                study_track_id: None,
            })),
            ..QueueEntry::new("instance:inst-1", "Freelance")
        }
    }

    fn queue_with(entries: Vec<QueueEntry>, day: u32) -> ActionQueue {
        ActionQueue {
            entries,
            day: Some(day),
            hours_available: Some(8.0),
            hours_spent: Some(2.0),
            ..ActionQueue::default()
        }
    }

    #[test]
    fn work_step_spends_time_and_advances() {
        let mut host = FakeHost {
            time_left: Some(8.0),
            ..FakeHost::default()
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![progress_entry(2.0, 6.0, CompletionMode::Manual)], 1));

        let outcome = controller.trigger("instance:inst-1", &mut host);

        assert!(outcome.success);
        assert_eq!(outcome.hours, Some(2.0));
        assert_eq!(host.advanced, vec![("inst-1".to_string(), 2.0)]);
        let entry = controller.authoritative().entry("instance:inst-1").expect("entry");
        assert_eq!(controller.tracker().effective_remaining_runs(entry), Some(2));
        assert_eq!(controller.current().hours_available, Some(6.0));
        assert_eq!(controller.current().hours_spent, Some(4.0));
        assert_eq!(controller.authoritative().hours_available, Some(8.0));
    }

    #[test]
    fn manual_close_out_completes_instance() {
        let mut host = FakeHost::default();
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![progress_entry(0.0, 0.0, CompletionMode::Manual)], 1));

        let outcome = controller.trigger("instance:inst-1", &mut host);

        assert_eq!(outcome, ActionOutcome::closed());
        assert_eq!(host.completed, vec!["inst-1".to_string()]);
        assert_eq!(host.spent, 0.0);
        assert!(controller.patch().is_empty());
    }

    #[test]
    fn insufficient_time_leaves_state_untouched() {
        let mut host = FakeHost {
            time_left: Some(1.0),
            ..FakeHost::default()
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![progress_entry(2.0, 6.0, CompletionMode::Manual)], 1));

        let outcome = controller.trigger("instance:inst-1", &mut host);

        assert!(!outcome.success);
        assert!(controller.tracker().is_empty());
        assert!(controller.patch().is_empty());
        assert!(host.advanced.is_empty());
    }

    #[test]
    fn host_errors_become_failed_outcomes() {
        let mut host = FakeHost {
            fail_spend: true,
            ..FakeHost::default()
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![progress_entry(2.0, 6.0, CompletionMode::Manual)], 1));

        assert!(!controller.trigger("instance:inst-1", &mut host).success);
        assert!(controller.tracker().is_empty());
    }

    #[test]
    fn handler_reported_hours_are_recorded() {
        let entry = QueueEntry {
            duration_hours: 3.0,
            action: Some(EntryAction::handler(|| Ok(ActionOutcome::worked(1.5)))),
            ..QueueEntry::new("gig", "Gig")
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![entry], 1));

        let outcome = controller.trigger("gig", &mut FakeHost::default());

        assert!(outcome.success);
        assert_eq!(controller.tracker().record("gig").expect("record").duration_hours, 1.5);
        assert_eq!(controller.patch().hours_consumed, 1.5);
    }

    #[test]
    fn failed_handler_can_be_retried() {
        let entry = QueueEntry {
            action: Some(EntryAction::handler(|| Ok(ActionOutcome::from(false)))),
            ..QueueEntry::new("gig", "Gig")
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![entry], 1));

        assert!(!controller.trigger("gig", &mut FakeHost::default()).success);
        assert!(!controller.trigger("gig", &mut FakeHost::default()).success);
        assert!(controller.tracker().record("gig").is_none());
    }

    #[test]
    fn non_repeatable_entries_run_once_per_day() {
        let entry = QueueEntry {
            duration_hours: 1.0,
            ..QueueEntry::new("chore", "Chore")
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![entry.clone()], 1));

        assert!(controller.trigger("chore", &mut FakeHost::default()).success);
        assert!(!controller.trigger("chore", &mut FakeHost::default()).success);

        controller.render(queue_with(vec![entry], 2));
        assert!(controller.trigger("chore", &mut FakeHost::default()).success);
    }

    #[test]
    fn render_supersedes_provisional_patch() {
        let entry = QueueEntry {
            duration_hours: 2.0,
            repeatable: true,
            ..QueueEntry::new("gig", "Gig")
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![entry.clone()], 1));
        controller.trigger("gig", &mut FakeHost::default());
        assert_eq!(controller.current().hours_available, Some(6.0));

        let mut refreshed = queue_with(vec![entry], 1);
        refreshed.hours_available = Some(6.0);
        controller.render(refreshed);

        assert!(controller.patch().is_empty());
        assert_eq!(controller.current().hours_available, Some(6.0));
        assert_eq!(controller.tracker().record("gig").expect("kept").count, 1);
    }

    #[test]
    fn study_commitments_allocate_their_track() {
        let mut entry = progress_entry(1.0, 4.0, CompletionMode::Automatic);
        if let Some(EntryAction::Progress(action)) = entry.action.as_mut() {
            action.study_track_id = Some("design".into());
        }
        let mut host = FakeHost::default();
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![entry], 1));

        assert!(controller.trigger("instance:inst-1", &mut host).success);
        assert_eq!(host.studied, vec![Some("design".to_string())]);
    }

    #[test]
    fn spent_step_counts_even_when_study_allocation_fails() {
        let mut entry = progress_entry(2.0, 2.0, CompletionMode::Manual);
        if let Some(EntryAction::Progress(action)) = entry.action.as_mut() {
            action.study_track_id = Some("design".into());
        }
        assert_eq!(entry.remaining_runs, Some(1));
        assert!(!entry.repeatable);
        let mut host = FakeHost {
            time_left: Some(8.0),
            fail_study: true,
            ..FakeHost::default()
        };
        let mut controller = QueueController::new();
        controller.render(queue_with(vec![entry], 1));

        let first = controller.trigger("instance:inst-1", &mut host);
        let second = controller.trigger("instance:inst-1", &mut host);

        assert!(first.success);
        assert_eq!(first.hours, Some(2.0));
        assert!(!second.success);
        assert_eq!(host.spent, 2.0);
        assert_eq!(host.advanced, vec![("inst-1".to_string(), 2.0)]);
        assert!(host.studied.is_empty());
        assert_eq!(controller.tracker().len(), 1);
        assert_eq!(controller.patch().hours_consumed, 2.0);
        assert_eq!(controller.current().hours_available, Some(6.0));
    }
}
