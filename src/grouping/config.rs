use serde::{Deserialize, Serialize};

use crate::queue::DEFAULT_FOCUS_MODE;

/// One presentation lane and the buckets that feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroupConfig {
    pub key: String,
    pub label: String,
    /// Copy shown when the lane has nothing pending.
    pub empty: String,
    pub buckets: Vec<String>,
}

impl TaskGroupConfig {
    pub fn new<I, S>(key: &str, label: &str, empty: &str, buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            empty: empty.to_string(),
            buckets: buckets.into_iter().map(Into::into).collect(),
        }
    }

    /// Hustles, upgrades, study, and everything else.
    pub fn defaults() -> Vec<TaskGroupConfig> {
        vec![
            Self::new(
                "hustle",
                "Hustles queued",
                "Line up a gig to stack this lane.",
                ["hustle"],
            ),
            Self::new(
                "upgrade",
                "Upgrades to trigger",
                "Queue an upgrade to keep momentum.",
                ["upgrade"],
            ),
            Self::new(
                "study",
                "Study & training",
                "No study blocks queued yet.",
                ["study", "education"],
            ),
            Self::new(
                "other",
                "Assist & extras",
                "No support tasks waiting on you.",
                ["other", "commitment", "assist", "support"],
            ),
        ]
    }
}

/// Inputs for one grouping pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingOptions {
    pub focus_mode: String,
    /// `None` means no hour budget applies.
    pub hours_available: Option<f64>,
    /// `None` means no money budget applies.
    pub money_available: Option<f64>,
    pub empty_message: Option<String>,
    pub group_configs: Vec<TaskGroupConfig>,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            focus_mode: DEFAULT_FOCUS_MODE.to_string(),
            hours_available: None,
            money_available: None,
            empty_message: None,
            group_configs: TaskGroupConfig::defaults(),
        }
    }
}
