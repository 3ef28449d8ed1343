//! Pipeline settings management
//!
//! Settings are plain JSON. Missing fields take their defaults, a missing file
//! means all defaults, and a file that fails to parse is logged and ignored.

use crate::Result;
use edit_engine::{PatchSettings, ValidationSettings};
use revisions::DiffSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// All tunables of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Proposal validation policy
    pub validation: ValidationSettings,
    /// Patch-stage gates
    pub patch: PatchSettings,
    /// Diff and grouping options
    pub diff: DiffSettings,
    /// Wall-clock budget for the patch stage, in milliseconds
    pub budget_ms: Option<u64>,
}

impl PipelineSettings {
    /// Patch-stage budget as a duration
    pub fn budget(&self) -> Option<Duration> {
        self.budget_ms.map(Duration::from_millis)
    }
}

/// Loads and saves [`PipelineSettings`] as a JSON file
pub struct SettingsLoader {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: PipelineSettings,
}

impl SettingsLoader {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: PipelineSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_sync(&mut self) -> Result<&PipelineSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<PipelineSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                    self.current = PipelineSettings::default();
                }
            }
        } else {
            self.current = PipelineSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &PipelineSettings {
        &self.current
    }

    /// Replace the cached settings
    pub fn set(&mut self, settings: PipelineSettings) {
        self.current = settings;
    }
}
