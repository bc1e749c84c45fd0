use std::cmp::Ordering;
use std::collections::HashMap;

use super::buckets::resolve_queue_category;
use crate::models::state::{clamp_to_zero, non_blank};
use crate::models::{
    AcceptedOffer, AutoCompletedEntry, CommitmentInstance, DailySummary, Definition,
    DefinitionLookup, EntryAction, GameState, HustleOffer, MetaTone, ProgressAction,
    QueueEntry,
};
use crate::progress::{build_progress_snapshot, ProgressSnapshot, SnapshotInput};
use crate::utils::{format_duration, format_hours, format_payout_summary};
use crate::log_debug;

const ENABLE_LOGS: bool = true;

pub const COMMITMENT_BUCKET: &str = "commitment";
const META_SEPARATOR: &str = " • ";

/// Records one outstanding commitment is built from.
#[derive(Debug, Clone, Copy)]
pub struct OutstandingInput<'a> {
    pub current_day: u32,
    pub definition: Option<&'a Definition>,
    pub instance: &'a CommitmentInstance,
    pub accepted: Option<&'a AcceptedOffer>,
    pub offer: Option<&'a HustleOffer>,
    pub order: i64,
}

/// Runs left before a commitment is done. `None` means unbounded.
fn remaining_runs(progress: &ProgressSnapshot) -> Option<u32> {
    match progress.hours_remaining {
        Some(remaining) if progress.step_hours > 0.0 => {
            Some(((remaining / progress.step_hours).ceil() as u32).max(1))
        }
        Some(remaining) if remaining <= 0.0 && progress.completion.is_manual() => Some(1),
        _ => None,
    }
}

fn meta_text(progress: &ProgressSnapshot) -> String {
    let mut parts = Vec::new();
    if let Some(percent) = progress.percent_complete {
        let percent = (percent * 100.0).round().clamp(0.0, 100.0) as u32;
        parts.push(format!("{percent}% logged"));
    }
    if let Some(remaining) = progress.hours_remaining {
        parts.push(format!("{} left", format_hours(remaining)));
    }
    if let Some(days) = progress.remaining_days {
        let plural = if days == 1 { "" } else { "s" };
        parts.push(format!("{days} day{plural} remaining"));
    }
    if progress.payout_amount.map(|amount| amount > 0.0).unwrap_or(false) {
        parts.push(format_payout_summary(progress.payout_amount, &progress.payout_schedule));
    }
    if parts.is_empty() {
        if let Some(required) = progress.hours_required {
            parts.push(format!(
                "{} logged of {}",
                format_hours(progress.hours_logged),
                format_hours(required)
            ));
        }
    }
    parts.join(META_SEPARATOR)
}

fn meta_tone(remaining_days: Option<u32>) -> Option<MetaTone> {
    match remaining_days? {
        0..=1 => Some(MetaTone::Warning),
        2..=3 => Some(MetaTone::Alert),
        _ => None,
    }
}

/// Turn one commitment into a queue entry.
///
/// Returns `None` when the commitment has no snapshot or is already
/// finished without needing a manual close-out.
pub fn create_outstanding_entry(input: &OutstandingInput<'_>) -> Option<QueueEntry> {
    let progress = build_progress_snapshot(&SnapshotInput {
        instance: Some(input.instance),
        accepted: input.accepted,
        offer: input.offer,
        definition: input.definition,
        current_day: input.current_day,
    })?;

    let finished = progress.hours_remaining.map(|hours| hours <= 0.0).unwrap_or(false);
    if finished && !progress.completion.is_manual() {
        log_debug!("dropping finished commitment {}", progress.instance_id);
        return None;
    }

    let runs = remaining_runs(&progress);
    let metadata = &progress.metadata;
    let variant_label = [
        input
            .offer
            .and_then(|offer| offer.variant.as_ref())
            .and_then(|variant| variant.label.as_deref()),
        metadata.variant_label.as_deref(),
    ]
    .into_iter()
    .find_map(non_blank);
    let title = variant_label
        .or_else(|| {
            [
                input.instance.name.as_deref(),
                input.definition.and_then(|definition| definition.name.as_deref()),
                input.definition.map(|definition| definition.id.as_str()),
            ]
            .into_iter()
            .find_map(non_blank)
        })
        .unwrap_or("Accepted hustle")
        .to_string();
    let subtitle = [
        input
            .offer
            .and_then(|offer| offer.variant.as_ref())
            .and_then(|variant| variant.description.as_deref()),
        metadata.description.as_deref(),
    ]
    .into_iter()
    .find_map(non_blank)
    .map(str::to_string);

    let focus_category = resolve_queue_category([
        metadata.template_category.as_deref(),
        metadata.category.as_deref(),
        input
            .accepted
            .and_then(|accepted| accepted.metadata.as_ref())
            .and_then(|metadata| metadata.template_category.as_deref()),
        input.offer.and_then(|offer| offer.template_category.as_deref()),
        input.definition.and_then(|definition| definition.category.as_deref()),
    ])
    .unwrap_or_else(|| COMMITMENT_BUCKET.to_string());

    let action = progress.definition_id.clone().map(|definition_id| {
        EntryAction::Progress(ProgressAction {
            definition_id,
            instance_id: progress.instance_id.clone(),
            step_hours: progress.step_hours,
            hours_remaining: progress.hours_remaining,
            completion: progress.completion,
            study_track_id: progress.study_track_id.clone(),
        })
    });

    let payout = progress.payout_amount.unwrap_or(0.0);
    Some(QueueEntry {
        id: format!("instance:{}", progress.instance_id),
        title,
        subtitle,
        meta: meta_text(&progress),
        meta_tone: meta_tone(progress.remaining_days),
        duration_hours: progress.step_hours,
        duration_text: format_duration(progress.step_hours),
        money_cost: 0.0,
        payout,
        payout_text: format_payout_summary(progress.payout_amount, &progress.payout_schedule),
        money_per_hour: if progress.step_hours > 0.0 {
            payout / progress.step_hours
        } else {
            payout
        },
        repeatable: runs.map(|runs| runs > 1).unwrap_or(true),
        remaining_runs: runs,
        focus_category: Some(focus_category),
        focus_bucket: Some(COMMITMENT_BUCKET.to_string()),
        upgrade_remaining: None,
        order_index: Some(input.order),
        exclude_from_queue: false,
        instance_id: Some(progress.instance_id.clone()),
        definition_id: progress.definition_id.clone(),
        offer_id: progress.offer_id.clone(),
        progress: Some(progress),
        action,
    })
}

/// Deadline first, then the richer payout, then collection order.
pub fn compare_commitments(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    let days = |entry: &QueueEntry| {
        entry
            .progress
            .as_ref()
            .and_then(|progress| progress.remaining_days)
            .unwrap_or(u32::MAX)
    };
    days(a)
        .cmp(&days(b))
        .then_with(|| b.payout.total_cmp(&a.payout))
        .then_with(|| a.order().cmp(&b.order()))
}

struct MarketIndex<'a> {
    offers_by_id: HashMap<&'a str, &'a HustleOffer>,
    accepted_by_instance: HashMap<&'a str, &'a AcceptedOffer>,
    accepted_by_offer: HashMap<&'a str, &'a AcceptedOffer>,
}

impl<'a> MarketIndex<'a> {
    fn new(state: &'a GameState) -> Self {
        let market = &state.hustle_market;
        let mut index = Self {
            offers_by_id: HashMap::new(),
            accepted_by_instance: HashMap::new(),
            accepted_by_offer: HashMap::new(),
        };
        for offer in &market.offers {
            if let Some(id) = non_blank(offer.id.as_deref()) {
                index.offers_by_id.entry(id).or_insert(offer);
            }
        }
        for accepted in &market.accepted {
            if let Some(id) = non_blank(accepted.instance_id.as_deref()) {
                index.accepted_by_instance.entry(id).or_insert(accepted);
            }
            if let Some(id) = non_blank(accepted.offer_id.as_deref()) {
                index.accepted_by_offer.entry(id).or_insert(accepted);
            }
        }
        index
    }

    fn accepted_for(&self, instance: &CommitmentInstance) -> Option<&'a AcceptedOffer> {
        non_blank(instance.id.as_deref())
            .and_then(|id| self.accepted_by_instance.get(id).copied())
            .or_else(|| {
                non_blank(instance.offer_id.as_deref())
                    .and_then(|id| self.accepted_by_offer.get(id).copied())
            })
    }

    fn offer_for(&self, accepted: Option<&AcceptedOffer>) -> Option<&'a HustleOffer> {
        let offer_id = non_blank(accepted?.offer_id.as_deref())?;
        self.offers_by_id.get(offer_id).copied()
    }
}

/// Every outstanding commitment in `state` as a queue entry, most urgent
/// first.
pub fn collect_outstanding_entries<L>(state: &GameState, definitions: &L) -> Vec<QueueEntry>
where
    L: DefinitionLookup + ?Sized,
{
    let market = MarketIndex::new(state);
    let current_day = state.current_day();
    let mut entries = Vec::new();

    for (action_index, (action_id, action_state)) in state.actions.iter().enumerate() {
        if action_state.instances.is_empty() {
            continue;
        }
        let definition = definitions.definition(action_id);

        for (instance_index, instance) in action_state.instances.iter().enumerate() {
            if !instance.is_outstanding() {
                continue;
            }
            let accepted = market.accepted_for(instance);
            if accepted.is_none() && !instance.accepted {
                continue;
            }

            let order = -((action_index as i64) * 10 + instance_index as i64);
            let Some(entry) = create_outstanding_entry(&OutstandingInput {
                current_day,
                definition,
                instance,
                accepted,
                offer: market.offer_for(accepted),
                order,
            }) else {
                continue;
            };

            let studied = entry
                .progress
                .as_ref()
                .and_then(|progress| progress.study_track_id.as_deref())
                .map(|track| state.studied_today(track))
                .unwrap_or(false);
            if studied {
                log_debug!("skipping {}: track already studied today", entry.id);
                continue;
            }
            entries.push(entry);
        }
    }

    entries.sort_by(compare_commitments);
    entries
}

/// Upkeep and study time the day-advance logic already logged.
pub fn create_auto_completed_entries(summary: &DailySummary) -> Vec<AutoCompletedEntry> {
    summary
        .time_breakdown
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let hours = clamp_to_zero(item.hours);
            if hours <= 0.0 {
                return None;
            }
            let category = item.category.as_deref().unwrap_or_default().to_lowercase();
            let tracks_maintenance = category.starts_with("maintenance");
            let tracks_study = category.starts_with("study") || category.starts_with("education");
            if !tracks_maintenance && !tracks_study {
                return None;
            }

            let definition = item.definition.as_ref();
            let title = [
                item.label.as_deref(),
                definition.and_then(|definition| definition.label.as_deref()),
                definition.and_then(|definition| definition.name.as_deref()),
            ]
            .into_iter()
            .find_map(non_blank)
            .unwrap_or("Scheduled work")
            .to_string();
            let key = non_blank(item.key.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    let prefix = if category.is_empty() { "auto" } else { category.as_str() };
                    format!("{prefix}-{index}")
                });

            Some(AutoCompletedEntry {
                id: format!("auto:{key}"),
                title,
                duration_hours: hours,
                duration_text: format_hours(hours),
                category,
                count: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::{
        AcceptedPayout, ActionState, InstanceProgress, KnowledgeTrack, OfferMetadata, OfferVariant,
        TimeBreakdownEntry,
    };

    fn manual_instance(id: &str, required: f64, logged: f64, per_day: Option<f64>) -> CommitmentInstance {
        CommitmentInstance {
            id: Some(id.into()),
            definition_id: Some("freelance".into()),
            accepted: true,
            progress: Some(InstanceProgress {
                hours_required: Some(required),
                hours_logged: Some(logged),
                hours_per_day: per_day,
                completion: Some("manual".into()),
                ..InstanceProgress::default()
            }),
            ..CommitmentInstance::default()
        }
    }

    fn build(instance: &CommitmentInstance) -> Option<QueueEntry> {
        create_outstanding_entry(&OutstandingInput {
            current_day: 1,
            definition: None,
            instance,
            accepted: None,
            offer: None,
            order: 0,
        })
    }

    #[test]
    fn work_steps_become_remaining_runs() {
        let entry = build(&manual_instance("inst-1", 6.0, 0.0, Some(2.0))).expect("entry");

        assert_eq!(entry.id, "instance:inst-1");
        assert_eq!(entry.duration_hours, 2.0);
        assert_eq!(entry.remaining_runs, Some(3));
        assert!(entry.repeatable);
        assert_eq!(entry.focus_bucket.as_deref(), Some("commitment"));
        assert_eq!(entry.meta, "0% logged • 6h left");
        assert!(matches!(entry.action, Some(EntryAction::Progress(_))));
    }

    #[test]
    fn manual_commitment_keeps_one_close_out_run() {
        let entry = build(&manual_instance("inst-2", 4.0, 4.0, None)).expect("entry");

        assert_eq!(entry.duration_hours, 0.0);
        assert_eq!(entry.remaining_runs, Some(1));
        assert!(!entry.repeatable);
    }

    #[test]
    fn finished_automatic_commitment_is_dropped() {
        let mut instance = manual_instance("inst-3", 4.0, 4.0, None);
        if let Some(progress) = instance.progress.as_mut() {
            progress.completion = Some("automatic".into());
        }
        assert!(build(&instance).is_none());
    }

    #[test]
    fn title_and_category_come_from_offer_data() {
        let instance = manual_instance("inst-4", 6.0, 0.0, Some(2.0));
        let accepted = AcceptedOffer {
            instance_id: Some("inst-4".into()),
            payout: Some(AcceptedPayout {
                amount: Some(120.0),
                schedule: None,
            }),
            metadata: Some(OfferMetadata {
                template_category: Some("Contract".into()),
                ..OfferMetadata::default()
            }),
            ..AcceptedOffer::default()
        };
        let offer = HustleOffer {
            variant: Some(OfferVariant {
                label: Some("Rush edit".into()),
                description: Some("Tight turnaround".into()),
            }),
            ..HustleOffer::default()
        };
        let entry = create_outstanding_entry(&OutstandingInput {
            current_day: 1,
            definition: None,
            instance: &instance,
            accepted: Some(&accepted),
            offer: Some(&offer),
            order: 0,
        })
        .expect("entry");

        assert_eq!(entry.title, "Rush edit");
        assert_eq!(entry.subtitle.as_deref(), Some("Tight turnaround"));
        assert_eq!(entry.focus_category.as_deref(), Some("hustle"));
        assert_eq!(entry.payout_text, "$120 on completion");
        assert_eq!(entry.meta, "0% logged • 6h left • $120 on completion");
    }

    #[test]
    fn tight_deadlines_raise_tone() {
        assert_eq!(meta_tone(Some(0)), Some(MetaTone::Warning));
        assert_eq!(meta_tone(Some(1)), Some(MetaTone::Warning));
        assert_eq!(meta_tone(Some(3)), Some(MetaTone::Alert));
        assert_eq!(meta_tone(Some(4)), None);
        assert_eq!(meta_tone(None), None);
    }

    fn state_with(instances: Vec<CommitmentInstance>) -> GameState {
        let mut state = GameState {
            day: Some(5.0),
            ..GameState::default()
        };
        state
            .actions
            .insert("freelance".into(), ActionState { instances });
        state
    }

    #[test]
    fn collection_skips_unaccepted_and_terminal_instances() {
        let mut unaccepted = manual_instance("loose", 6.0, 0.0, Some(2.0));
        unaccepted.accepted = false;
        let mut failed = manual_instance("failed", 6.0, 0.0, Some(2.0));
        failed.status = Some("failed".into());
        let kept = manual_instance("kept", 6.0, 0.0, Some(2.0));

        let state = state_with(vec![unaccepted, failed, kept]);
        let definitions: HashMap<String, Definition> = HashMap::new();
        let entries = collect_outstanding_entries(&state, &definitions);

        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["instance:kept"]);
    }

    #[test]
    fn accepted_record_links_by_offer_id() {
        let mut instance = manual_instance("inst-9", 6.0, 0.0, Some(2.0));
        instance.accepted = false;
        instance.offer_id = Some("offer-9".into());

        let mut state = state_with(vec![instance]);
        state.hustle_market.accepted.push(AcceptedOffer {
            offer_id: Some("offer-9".into()),
            deadline_day: Some(6.0),
            ..AcceptedOffer::default()
        });
        let definitions: HashMap<String, Definition> = HashMap::new();
        let entries = collect_outstanding_entries(&state, &definitions);

        assert_eq!(entries.len(), 1);
        let progress = entries[0].progress.as_ref().expect("progress");
        assert_eq!(progress.remaining_days, Some(2));
        assert_eq!(entries[0].meta_tone, Some(MetaTone::Alert));
    }

    #[test]
    fn urgent_commitments_sort_first() {
        let mut later = manual_instance("later", 6.0, 0.0, Some(2.0));
        if let Some(progress) = later.progress.as_mut() {
            progress.deadline_day = Some(20.0);
        }
        let mut sooner = manual_instance("sooner", 6.0, 0.0, Some(2.0));
        if let Some(progress) = sooner.progress.as_mut() {
            progress.deadline_day = Some(7.0);
        }
        let open = manual_instance("open", 6.0, 0.0, Some(2.0));

        let state = state_with(vec![open, later, sooner]);
        let definitions: HashMap<String, Definition> = HashMap::new();
        let entries = collect_outstanding_entries(&state, &definitions);

        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["instance:sooner", "instance:later", "instance:open"]);
    }

    #[test]
    fn studied_tracks_are_suppressed() {
        let mut instance = manual_instance("study-1", 6.0, 0.0, Some(2.0));
        instance.definition_id = Some("study-design".into());

        let mut state = state_with(vec![instance]);
        state.progress.knowledge.insert(
            "design".into(),
            KnowledgeTrack {
                studied_today: true,
            },
        );
        let definitions: HashMap<String, Definition> = HashMap::new();
        assert!(collect_outstanding_entries(&state, &definitions).is_empty());

        state.progress.knowledge.clear();
        assert_eq!(collect_outstanding_entries(&state, &definitions).len(), 1);
    }

    #[test]
    fn auto_completed_entries_only_track_upkeep_and_study() {
        let summary = DailySummary {
            time_breakdown: vec![
                TimeBreakdownEntry {
                    key: Some("blog-upkeep".into()),
                    label: Some("Blog upkeep".into()),
                    hours: Some(1.5),
                    category: Some("maintenance:asset".into()),
                    definition: None,
                },
                TimeBreakdownEntry {
                    hours: Some(2.0),
                    category: Some("Study".into()),
                    ..TimeBreakdownEntry::default()
                },
                TimeBreakdownEntry {
                    label: Some("Gig".into()),
                    hours: Some(3.0),
                    category: Some("hustle".into()),
                    ..TimeBreakdownEntry::default()
                },
                TimeBreakdownEntry {
                    hours: Some(0.0),
                    category: Some("maintenance".into()),
                    ..TimeBreakdownEntry::default()
                },
            ],
        };
        let entries = create_auto_completed_entries(&summary);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "auto:blog-upkeep");
        assert_eq!(entries[0].duration_text, "1.5h");
        assert_eq!(entries[1].id, "auto:study-1");
        assert_eq!(entries[1].title, "Scheduled work");
    }
}
