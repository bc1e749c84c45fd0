use serde::Serialize;

use super::sources::{
    CommitmentSources, Source, COMPLETION_CHAIN, DAYS_REQUIRED_CHAIN, DEADLINE_CHAIN,
    HOURS_PER_DAY_CHAIN, HOURS_REQUIRED_CHAIN,
};
use crate::models::state::{coerce_day, non_blank, non_negative, positive};
use crate::models::{
    AcceptedOffer, CommitmentInstance, CompletionMode, Definition, HustleOffer, OfferMetadata,
    PayoutSchedule,
};
use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Fully-resolved progress view of one commitment.
///
/// Recomputed on every queue build. Fields that could not be resolved stay
/// `None` so "unknown" never reads as zero downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub definition_id: Option<String>,
    pub instance_id: String,
    pub offer_id: Option<String>,
    pub template_id: Option<String>,
    pub hours_logged: f64,
    pub hours_required: Option<f64>,
    pub hours_remaining: Option<f64>,
    pub step_hours: f64,
    pub hours_per_day: Option<f64>,
    pub days_completed: u32,
    pub days_required: Option<u32>,
    pub remaining_days: Option<u32>,
    pub deadline_day: Option<u32>,
    pub payout_amount: Option<f64>,
    pub payout_schedule: PayoutSchedule,
    pub completion: CompletionMode,
    pub percent_complete: Option<f64>,
    pub metadata: OfferMetadata,
    pub last_worked_day: Option<u32>,
    pub accepted_on_day: Option<u32>,
    pub study_track_id: Option<String>,
}

/// Raw records for one commitment plus the day the snapshot is taken on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotInput<'a> {
    pub instance: Option<&'a CommitmentInstance>,
    pub accepted: Option<&'a AcceptedOffer>,
    pub offer: Option<&'a HustleOffer>,
    pub definition: Option<&'a Definition>,
    pub current_day: u32,
}

/// Hours required, falling back to `hours_per_day * days_required` only when
/// no source states the total directly.
pub fn resolve_hours_required(
    direct: Option<f64>,
    hours_per_day: Option<f64>,
    days_required: Option<u32>,
) -> Option<f64> {
    direct.or_else(|| match (hours_per_day, days_required) {
        (Some(per_day), Some(days)) if per_day > 0.0 && days > 0 => Some(per_day * days as f64),
        _ => None,
    })
}

/// Hours one work action consumes.
///
/// Prefers the per-day rate, else spreads what is left over the remaining
/// day slots, else takes everything left. Never exceeds `hours_remaining`;
/// zero when nothing remains.
pub fn resolve_step_hours(
    hours_per_day: Option<f64>,
    hours_remaining: Option<f64>,
    days_required: Option<u32>,
    days_completed: u32,
) -> f64 {
    if let Some(remaining) = hours_remaining {
        if remaining <= 0.0 {
            return 0.0;
        }
    }

    let step = hours_per_day
        .filter(|per_day| *per_day > 0.0)
        .or_else(|| match (hours_remaining, days_required) {
            (Some(remaining), Some(days)) if days > 0 => {
                let slots = days.saturating_sub(days_completed).max(1);
                Some(remaining / slots as f64)
            }
            (Some(remaining), _) => Some(remaining),
            _ => None,
        })
        .unwrap_or(1.0);

    match hours_remaining {
        Some(remaining) => step.min(remaining),
        None => step,
    }
}

/// Inclusive days left before the deadline, floored at zero.
pub fn remaining_days(deadline_day: Option<u32>, current_day: u32) -> Option<u32> {
    deadline_day.map(|deadline| {
        let left = deadline as i64 - current_day as i64 + 1;
        left.max(0) as u32
    })
}

fn percent_complete(
    hours_logged: f64,
    hours_required: Option<f64>,
    days_completed: u32,
    days_required: Option<u32>,
) -> Option<f64> {
    match (hours_required, days_required) {
        (Some(required), _) if required > 0.0 => Some((hours_logged / required).clamp(0.0, 1.0)),
        (_, Some(days)) if days > 0 => Some((days_completed as f64 / days as f64).clamp(0.0, 1.0)),
        _ => None,
    }
}

/// Resolve one commitment into its canonical progress view.
///
/// Returns `None` when there is no instance (the commitment has not started)
/// or the instance carries no identifier.
pub fn build_progress_snapshot(input: &SnapshotInput<'_>) -> Option<ProgressSnapshot> {
    let instance = input.instance?;
    let Some(instance_id) = non_blank(instance.id.as_deref()) else {
        log_debug!("skipping commitment instance without an id");
        return None;
    };

    let sources = CommitmentSources {
        instance,
        accepted: input.accepted,
        offer: input.offer,
        definition: input.definition,
    };
    let progress = sources.progress();

    let hours_per_day = sources.resolve(HOURS_PER_DAY_CHAIN, Source::hours_per_day);
    let days_required = sources
        .resolve(DAYS_REQUIRED_CHAIN, Source::days_required)
        .map(|days| days.floor().max(1.0) as u32);
    let hours_required = resolve_hours_required(
        sources.resolve(HOURS_REQUIRED_CHAIN, Source::hours_required),
        hours_per_day,
        days_required,
    );

    let hours_logged = non_negative(progress.and_then(|progress| progress.hours_logged))
        .or_else(|| non_negative(instance.hours_logged))
        .unwrap_or(0.0);
    let days_completed = non_negative(progress.and_then(|progress| progress.days_completed))
        .map(|days| days.floor() as u32)
        .unwrap_or(0);
    let hours_remaining = hours_required.map(|required| (required - hours_logged).max(0.0));

    let completion = sources
        .resolve(COMPLETION_CHAIN, Source::completion_mode)
        .unwrap_or_else(|| {
            match progress.and_then(|progress| progress.kind.as_deref()) {
                Some("instant") => CompletionMode::Instant,
                _ => CompletionMode::Manual,
            }
        });

    let step_hours = resolve_step_hours(hours_per_day, hours_remaining, days_required, days_completed);

    let deadline_day = sources
        .collect(DEADLINE_CHAIN, Source::deadline_day)
        .into_iter()
        .min();

    let metadata = sources.metadata();
    let payout_amount = match input.accepted.and_then(|accepted| accepted.payout.as_ref()) {
        Some(payout) if payout.amount.is_some() => non_negative(payout.amount),
        _ => non_negative(metadata.and_then(|metadata| metadata.payout_amount)),
    };
    let payout_schedule = [
        input
            .accepted
            .and_then(|accepted| accepted.payout.as_ref())
            .and_then(|payout| payout.schedule.as_deref()),
        input
            .offer
            .and_then(|offer| offer.metadata.as_ref())
            .and_then(|metadata| metadata.payout_schedule.as_deref()),
    ]
    .into_iter()
    .flatten()
    .find_map(PayoutSchedule::parse)
    .unwrap_or_default();

    let definition_id = input
        .definition
        .map(|definition| definition.id.clone())
        .or_else(|| instance.definition_id.clone())
        .or_else(|| input.accepted.and_then(|accepted| accepted.definition_id.clone()))
        .or_else(|| input.offer.and_then(|offer| offer.definition_id.clone()));
    let offer_id = input
        .accepted
        .and_then(|accepted| accepted.offer_id.clone())
        .or_else(|| input.offer.and_then(|offer| offer.id.clone()));
    let template_id = input
        .accepted
        .and_then(|accepted| accepted.template_id.clone())
        .or_else(|| input.offer.and_then(|offer| offer.template_id.clone()))
        .or_else(|| input.definition.map(|definition| definition.id.clone()));

    Some(ProgressSnapshot {
        definition_id,
        instance_id: instance_id.to_string(),
        offer_id,
        template_id,
        hours_logged,
        hours_required,
        hours_remaining,
        step_hours,
        hours_per_day: positive(hours_per_day),
        days_completed,
        days_required,
        remaining_days: remaining_days(deadline_day, input.current_day),
        deadline_day,
        payout_amount,
        payout_schedule,
        completion,
        percent_complete: percent_complete(hours_logged, hours_required, days_completed, days_required),
        metadata: metadata.cloned().unwrap_or_default(),
        last_worked_day: coerce_day(progress.and_then(|progress| progress.last_worked_day)),
        accepted_on_day: coerce_day(instance.accepted_on_day),
        study_track_id: sources.study_track_id(),
    })
}
