use serde::{Deserialize, Serialize};

/// How a commitment finishes once its hours are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionMode {
    /// The player must trigger an explicit completion after the last hour.
    Manual,
    /// The day-advance logic closes the commitment on its own.
    Automatic,
    /// Single-shot actions with no multi-day tracking.
    Instant,
}

impl Default for CompletionMode {
    fn default() -> Self {
        CompletionMode::Manual
    }
}

impl CompletionMode {
    /// Parse a raw metadata value. Blank strings are treated as absent; any
    /// unrecognized label means the commitment closes itself.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_ascii_lowercase().as_str() {
            "manual" => CompletionMode::Manual,
            "instant" => CompletionMode::Instant,
            _ => CompletionMode::Automatic,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionMode::Manual => "manual",
            CompletionMode::Automatic => "automatic",
            CompletionMode::Instant => "instant",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, CompletionMode::Manual)
    }
}

/// Serialized as its plain label, custom schedules included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PayoutSchedule {
    OnCompletion,
    Daily,
    Other(String),
}

impl Default for PayoutSchedule {
    fn default() -> Self {
        PayoutSchedule::OnCompletion
    }
}

impl PayoutSchedule {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed {
            "onCompletion" => PayoutSchedule::OnCompletion,
            "daily" => PayoutSchedule::Daily,
            other => PayoutSchedule::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            PayoutSchedule::OnCompletion => "onCompletion",
            PayoutSchedule::Daily => "daily",
            PayoutSchedule::Other(label) => label.as_str(),
        }
    }
}

impl From<PayoutSchedule> for String {
    fn from(schedule: PayoutSchedule) -> Self {
        schedule.as_str().to_string()
    }
}

impl From<String> for PayoutSchedule {
    fn from(raw: String) -> Self {
        PayoutSchedule::parse(&raw).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_mode_parses_known_and_unknown_labels() {
        assert_eq!(CompletionMode::parse(" manual "), Some(CompletionMode::Manual));
        assert_eq!(CompletionMode::parse("instant"), Some(CompletionMode::Instant));
        assert_eq!(CompletionMode::parse("deferred"), Some(CompletionMode::Automatic));
        assert_eq!(CompletionMode::parse("   "), None);
    }

    #[test]
    fn payout_schedule_keeps_custom_labels() {
        assert_eq!(PayoutSchedule::parse("daily"), Some(PayoutSchedule::Daily));
        assert_eq!(
            PayoutSchedule::parse("weekly"),
            Some(PayoutSchedule::Other("weekly".into()))
        );
    }

    #[test]
    fn payout_schedule_serializes_as_plain_label() {
        assert_eq!(
            serde_json::to_value(PayoutSchedule::Other("weekly".into())).expect("custom"),
            serde_json::json!("weekly")
        );
        assert_eq!(
            serde_json::to_value(PayoutSchedule::OnCompletion).expect("known"),
            serde_json::json!("onCompletion")
        );
        let parsed: PayoutSchedule = serde_json::from_value(serde_json::json!("daily")).expect("parse");
        assert_eq!(parsed, PayoutSchedule::Daily);
    }
}
