//! Lead scoring and model preferences
//!
//! Settings are saved explicitly by the user and kept in the long-lived store
//! under `app_settings` as plain JSON, without a cache envelope or TTL.

use std::sync::Arc;

use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{FileStorage, MemoryStorage, Storage, StorageError};
use crate::data::Stage;

/// Storage key of the saved settings
pub const SETTINGS_KEY: &str = "app_settings";

pub const MAX_TEMPERATURE: f64 = 2.0;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to save settings: {0}")]
    Storage(#[from] StorageError),
}

/// One weighted input to a lead's qualification score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCriterion {
    pub id: String,
    pub name: String,
    /// Percentage weight (0-100)
    pub weight: u8,
    pub enabled: bool,
}

impl ScoringCriterion {
    fn new(id: &str, name: &str, weight: u8) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            weight,
            enabled: true,
        }
    }
}

/// Whether a pipeline stage is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageToggle {
    pub stage: Stage,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scoring: Vec<ScoringCriterion>,
    /// Model id preselected in the message composer
    pub default_model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stages: Vec<StageToggle>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scoring: vec![
                ScoringCriterion::new("1", "Company Size", 30),
                ScoringCriterion::new("2", "Industry Match", 25),
                ScoringCriterion::new("3", "Engagement Level", 20),
                ScoringCriterion::new("4", "Budget Fit", 15),
                ScoringCriterion::new("5", "Timeline", 10),
            ],
            default_model: "grok-4-fast-reasoning".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            stages: Stage::KNOWN
                .iter()
                .map(|stage| StageToggle {
                    stage: stage.clone(),
                    enabled: *stage != Stage::Lost,
                })
                .collect(),
        }
    }
}

impl Settings {
    /// Sum of enabled criterion weights; scoring expects exactly 100
    pub fn total_weight(&self) -> u32 {
        self.scoring
            .iter()
            .filter(|c| c.enabled)
            .map(|c| u32::from(c.weight))
            .sum()
    }

    pub fn weights_balanced(&self) -> bool {
        self.total_weight() == 100
    }

    /// Adjusts a criterion's weight by `delta`, clamped to 0..=100
    pub fn adjust_weight(&mut self, index: usize, delta: i16) {
        if let Some(criterion) = self.scoring.get_mut(index) {
            let weight = (i16::from(criterion.weight) + delta).clamp(0, 100);
            criterion.weight = weight as u8;
        }
    }

    /// Adjusts the temperature by `delta`, clamped to 0.0..=2.0 and rounded to one decimal
    pub fn adjust_temperature(&mut self, delta: f64) {
        let t = (self.temperature + delta).clamp(0.0, MAX_TEMPERATURE);
        self.temperature = (t * 10.0).round() / 10.0;
    }
}

/// Loads and saves [`Settings`] in a long-lived store
#[derive(Debug, Clone)]
pub struct SettingsStore {
    storage: Arc<dyn Storage>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Opens the store in the user's config directory
    ///
    /// Falls back to an in-memory store when no config directory exists, in
    /// which case settings last only for this run.
    pub fn open() -> Self {
        match ProjectDirs::from("", "", "grok-sdr") {
            Some(dirs) => Self::new(Arc::new(FileStorage::new(dirs.config_dir().to_path_buf()))),
            None => {
                warn!("No config directory available, settings will not persist");
                Self::new(Arc::new(MemoryStorage::new()))
            }
        }
    }

    /// Saved settings, or defaults when nothing valid is stored
    pub fn load(&self) -> Settings {
        let raw = match self.storage.get_item(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                warn!("Failed to read settings: {}", e);
                return Settings::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring malformed settings: {}", e);
            Settings::default()
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings)?;
        self.storage.set_item(SETTINGS_KEY, &json)?;
        info!("Settings saved");
        Ok(())
    }
}
