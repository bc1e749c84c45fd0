use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Content definition for an asset, hustle, study track or upgrade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Definition {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub time: Option<f64>,
    pub action: Option<DefinitionAction>,
    pub progress: Option<DefinitionProgress>,
    pub study_track_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefinitionAction {
    pub time_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefinitionProgress {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub completion: Option<String>,
    pub hours_per_day: Option<f64>,
    pub days_required: Option<f64>,
    pub study_track_id: Option<String>,
    pub track_id: Option<String>,
}

impl Definition {
    pub fn is_study(&self) -> bool {
        self.study_track_id.is_some()
            || self
                .progress
                .as_ref()
                .and_then(|progress| progress.kind.as_deref())
                == Some("study")
    }
}

/// Lookup capability owned by the content subsystem.
pub trait DefinitionLookup {
    fn definition(&self, id: &str) -> Option<&Definition>;
}

impl DefinitionLookup for HashMap<String, Definition> {
    fn definition(&self, id: &str) -> Option<&Definition> {
        self.get(id)
    }
}

/// Definitions loaded once per session; never invalidated.
#[derive(Debug, Clone, Default)]
pub struct DefinitionCatalog {
    definitions: HashMap<String, Definition>,
}

impl DefinitionCatalog {
    pub fn new<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = Definition>,
    {
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.id.clone(), definition))
                .collect(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let definitions: Vec<Definition> =
            serde_json::from_str(raw).context("failed to parse definition catalog")?;
        Ok(Self::new(definitions))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl DefinitionLookup for DefinitionCatalog {
    fn definition(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id)
    }
}
