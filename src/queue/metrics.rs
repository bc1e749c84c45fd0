use serde::{Deserialize, Serialize};

use crate::models::GameState;
use crate::utils::format_hours;

/// Aggregate figures shown next to the queue.
///
/// Providers may pre-fill any field; the first provider to set a field wins
/// and whatever is still unset gets computed from the live state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueMetrics {
    pub empty_message: Option<String>,
    pub button_class: Option<String>,
    pub default_label: Option<String>,
    pub hours_available: Option<f64>,
    pub hours_available_label: Option<String>,
    pub hours_spent: Option<f64>,
    pub hours_spent_label: Option<String>,
    pub money_available: Option<f64>,
}

fn fill<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if target.is_none() {
        *target = source.clone();
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

impl QueueMetrics {
    /// Copy every field `other` sets that `self` does not.
    pub fn merge_from(&mut self, other: &QueueMetrics) {
        fill(&mut self.empty_message, &other.empty_message);
        fill(&mut self.button_class, &other.button_class);
        fill(&mut self.default_label, &other.default_label);
        fill(&mut self.hours_available, &finite(other.hours_available));
        fill(&mut self.hours_available_label, &other.hours_available_label);
        fill(&mut self.hours_spent, &finite(other.hours_spent));
        fill(&mut self.hours_spent_label, &other.hours_spent_label);
        fill(&mut self.money_available, &finite(other.money_available));
    }

    /// Compute the resource figures still unset from `state`.
    pub fn finalize(&mut self, state: &GameState) {
        let hours_available = finite(self.hours_available)
            .or_else(|| state.hours_left())
            .map(|hours| hours.max(0.0));
        self.hours_available = hours_available;

        let hours_spent = finite(self.hours_spent)
            .or_else(|| hours_available.map(|available| state.base_hours() - available))
            .map(|hours| hours.max(0.0));
        self.hours_spent = hours_spent;

        if self.hours_available_label.is_none() {
            self.hours_available_label = hours_available.map(format_hours);
        }
        if self.hours_spent_label.is_none() {
            self.hours_spent_label = hours_spent.map(format_hours);
        }

        self.money_available = finite(self.money_available)
            .or_else(|| state.money_available())
            .map(|money| money.max(0.0));
    }
}
