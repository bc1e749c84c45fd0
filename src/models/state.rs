//! Inbound game-state records.
//!
//! These mirror the save-state shape the game hands to the scheduler. Every
//! field is optional because commitments are stitched together from records
//! written by different subsystems at different times.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub day: Option<f64>,
    pub time_left: Option<f64>,
    pub base_time: Option<f64>,
    pub bonus_time: Option<f64>,
    pub daily_bonus_time: Option<f64>,
    pub money: Option<f64>,
    pub actions: BTreeMap<String, ActionState>,
    pub hustle_market: HustleMarket,
    pub progress: PlayerProgress,
}

impl GameState {
    /// Current in-game day, defaulting to day 1 when unset.
    pub fn current_day(&self) -> u32 {
        self.day.and_then(|day| coerce_day(Some(day))).unwrap_or(1)
    }

    /// Day as reported to the completion tracker; `None` when unknown.
    pub fn reported_day(&self) -> Option<u32> {
        self.day
            .filter(|day| day.is_finite())
            .map(|day| day.max(0.0).floor() as u32)
    }

    /// Total focus hours granted for the day before anything was spent.
    pub fn base_hours(&self) -> f64 {
        clamp_to_zero(self.base_time)
            + clamp_to_zero(self.bonus_time)
            + clamp_to_zero(self.daily_bonus_time)
    }

    pub fn hours_left(&self) -> Option<f64> {
        self.time_left.filter(|value| value.is_finite()).map(|value| value.max(0.0))
    }

    pub fn money_available(&self) -> Option<f64> {
        self.money.filter(|value| value.is_finite()).map(|value| value.max(0.0))
    }

    pub fn studied_today(&self, track_id: &str) -> bool {
        self.progress
            .knowledge
            .get(track_id)
            .map(|track| track.studied_today)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionState {
    pub instances: Vec<CommitmentInstance>,
}

/// One started commitment: an accepted contract, an asset upkeep run, a
/// study enrollment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitmentInstance {
    pub id: Option<String>,
    pub definition_id: Option<String>,
    pub name: Option<String>,
    pub accepted: bool,
    pub completed: bool,
    pub status: Option<String>,
    pub offer_id: Option<String>,
    pub hours_required: Option<f64>,
    pub hours_logged: Option<f64>,
    pub deadline_day: Option<f64>,
    pub accepted_on_day: Option<f64>,
    pub progress: Option<InstanceProgress>,
}

impl CommitmentInstance {
    /// Instances that are finished or parked in a terminal status never
    /// reach the queue.
    pub fn is_outstanding(&self) -> bool {
        if self.completed {
            return false;
        }
        match self.status.as_deref() {
            None | Some("active") | Some("pending") => true,
            Some(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceProgress {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub hours_required: Option<f64>,
    pub hours_logged: Option<f64>,
    pub hours_per_day: Option<f64>,
    pub days_required: Option<f64>,
    pub days_completed: Option<f64>,
    pub completion: Option<String>,
    pub completion_mode: Option<String>,
    pub deadline_day: Option<f64>,
    pub last_worked_day: Option<f64>,
    pub study_track_id: Option<String>,
    pub track_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HustleMarket {
    pub offers: Vec<HustleOffer>,
    pub accepted: Vec<AcceptedOffer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HustleOffer {
    pub id: Option<String>,
    pub definition_id: Option<String>,
    pub template_id: Option<String>,
    pub template_category: Option<String>,
    pub claim_deadline_day: Option<f64>,
    pub expires_on_day: Option<f64>,
    pub metadata: Option<OfferMetadata>,
    pub claim_metadata: Option<OfferMetadata>,
    pub variant: Option<OfferVariant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferVariant {
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Record written when the player accepts an offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcceptedOffer {
    pub offer_id: Option<String>,
    pub instance_id: Option<String>,
    pub definition_id: Option<String>,
    pub template_id: Option<String>,
    pub hours_required: Option<f64>,
    pub deadline_day: Option<f64>,
    pub payout: Option<AcceptedPayout>,
    pub metadata: Option<OfferMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcceptedPayout {
    pub amount: Option<f64>,
    pub schedule: Option<String>,
}

/// Free-form metadata attached to offers and accepted records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferMetadata {
    pub hours_required: Option<f64>,
    pub hours_per_day: Option<f64>,
    pub days_required: Option<f64>,
    pub completion_mode: Option<String>,
    pub progress: Option<ProgressMetadata>,
    pub requirements: Option<OfferRequirements>,
    pub payout_amount: Option<f64>,
    pub payout_schedule: Option<String>,
    pub template_category: Option<String>,
    pub category: Option<String>,
    pub variant_label: Option<String>,
    pub description: Option<String>,
    pub study_track_id: Option<String>,
    pub track_id: Option<String>,
    pub definition_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressMetadata {
    pub hours_required: Option<f64>,
    pub hours_per_day: Option<f64>,
    pub days_required: Option<f64>,
    pub completion_mode: Option<String>,
    pub completion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferRequirements {
    pub hours: Option<f64>,
    pub time_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProgress {
    pub knowledge: BTreeMap<String, KnowledgeTrack>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeTrack {
    pub studied_today: bool,
}

/// End-of-day summary produced by the lifecycle loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailySummary {
    pub time_breakdown: Vec<TimeBreakdownEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeBreakdownEntry {
    pub key: Option<String>,
    pub label: Option<String>,
    pub hours: Option<f64>,
    pub category: Option<String>,
    pub definition: Option<BreakdownDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakdownDefinition {
    pub label: Option<String>,
    pub name: Option<String>,
}

pub(crate) fn clamp_to_zero(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0).max(0.0)
}

/// Whole, positive day number.
pub(crate) fn coerce_day(value: Option<f64>) -> Option<u32> {
    value
        .filter(|day| day.is_finite() && *day > 0.0)
        .map(|day| day.floor().max(1.0) as u32)
}

/// Present, finite, non-negative value.
pub(crate) fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value >= 0.0)
}

/// Present, finite, strictly positive value.
pub(crate) fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

/// Trimmed, non-blank string.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_state_parses_camel_case_json() {
        let state: GameState = serde_json::from_value(serde_json::json!({
            "day": 4,
            "timeLeft": 6.5,
            "baseTime": 10,
            "bonusTime": 2,
            "money": 320,
            "actions": {
                "freelance": { "instances": [{ "id": "inst-1", "accepted": true }] }
            },
            "hustleMarket": { "offers": [], "accepted": [] },
            "progress": { "knowledge": { "design": { "studiedToday": true } } }
        }))
        .expect("valid state");

        assert_eq!(state.current_day(), 4);
        assert_eq!(state.base_hours(), 12.0);
        assert_eq!(state.hours_left(), Some(6.5));
        assert!(state.studied_today("design"));
        assert_eq!(state.actions["freelance"].instances.len(), 1);
    }

    #[test]
    fn missing_day_defaults_to_first_day() {
        let state = GameState::default();
        assert_eq!(state.current_day(), 1);
        assert_eq!(state.reported_day(), None);
    }

    #[test]
    fn terminal_instances_are_not_outstanding() {
        let mut instance = CommitmentInstance::default();
        assert!(instance.is_outstanding());
        instance.status = Some("failed".into());
        assert!(!instance.is_outstanding());
        instance.status = Some("pending".into());
        instance.completed = true;
        assert!(!instance.is_outstanding());
    }

    #[test]
    fn coercion_helpers_reject_invalid_numbers() {
        assert_eq!(coerce_day(Some(3.7)), Some(3));
        assert_eq!(coerce_day(Some(0.0)), None);
        assert_eq!(positive(Some(0.0)), None);
        assert_eq!(non_negative(Some(0.0)), Some(0.0));
        assert_eq!(non_blank(Some("  ")), None);
    }
}
