use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::queue::{QueueOptions, DEFAULT_FOCUS_MODE};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

pub const FOCUS_MODES: [&str; 3] = ["money", "upgrades", "balanced"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerSettings {
    pub focus_mode: String,
    pub empty_message: Option<String>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            focus_mode: DEFAULT_FOCUS_MODE.into(),
            empty_message: None,
        }
    }
}

impl SchedulerSettings {
    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            focus_mode: self.focus_mode.clone(),
            empty_message: self.empty_message.clone(),
        }
    }
}

/// Lower-cased focus mode if it is one the player can pick.
pub fn normalize_focus_mode(mode: &str) -> Option<String> {
    let normalized = mode.trim().to_lowercase();
    FOCUS_MODES
        .contains(&normalized.as_str())
        .then_some(normalized)
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<SchedulerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("ignoring unreadable settings at {}: {err}", path.display());
                SchedulerSettings::default()
            })
        } else {
            SchedulerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn focus_mode(&self) -> String {
        self.settings().focus_mode
    }

    pub fn empty_message(&self) -> Option<String> {
        self.settings().empty_message
    }

    pub fn queue_options(&self) -> QueueOptions {
        self.settings().queue_options()
    }

    /// Switch focus mode. Returns `false` for unknown modes or when the mode
    /// is already active.
    pub fn set_focus_mode(&self, mode: &str) -> Result<bool> {
        let Some(mode) = normalize_focus_mode(mode) else {
            return Ok(false);
        };
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        if guard.focus_mode == mode {
            return Ok(false);
        }
        guard.focus_mode = mode;
        self.persist(&guard)?;
        Ok(true)
    }

    pub fn update(&self, settings: SchedulerSettings) -> Result<()> {
        {
            let mut guard = self
                .data
                .write()
                .map_err(|_| anyhow!("settings lock poisoned"))?;
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &SchedulerSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: SchedulerSettings = serde_json::from_str(&contents)?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = data;
        Ok(())
    }
}
