use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::gate::ACTIVITY_URL_RE;
use crate::parser::scripts::{FieldExtractor, ScriptScanner};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

/// Output key names. The engine is shared; only this table changes per locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub title: String,
    pub duration: String,
    pub duration_seconds: String,
    pub calories: String,
    pub pace: String,
    pub pace_seconds_per_km: String,
    pub average_heart_rate: String,
    pub splits: String,
    pub split_km: String,
    pub split_pace: String,
    pub split_elevation: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self::for_locale(Locale::En)
    }
}

impl FieldNames {
    pub fn for_locale(locale: Locale) -> Self {
        let names: [&str; 11] = match locale {
            Locale::En => [
                "title",
                "duration",
                "duration_seconds",
                "calories",
                "pace",
                "pace_seconds_per_km",
                "average_heart_rate",
                "splits",
                "km",
                "pace",
                "elevation",
            ],
            Locale::Fr => [
                "titre",
                "duree",
                "duree_secondes",
                "calories",
                "allure",
                "allure_secondes_par_km",
                "frequence_cardiaque_moyenne",
                "segments",
                "km",
                "allure",
                "denivele",
            ],
        };
        let [title, duration, duration_seconds, calories, pace, pace_seconds_per_km, average_heart_rate, splits, split_km, split_pace, split_elevation] =
            names.map(String::from);
        FieldNames {
            title,
            duration,
            duration_seconds,
            calories,
            pace,
            pace_seconds_per_km,
            average_heart_rate,
            splits,
            split_km,
            split_pace,
            split_elevation,
        }
    }

    /// Load a (possibly partial) name table from JSON; missing keys keep English names.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read field names from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid field names file {}", path.display()))
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub not_activity_page: String,
    pub extraction_error: String,
    pub loading_splits: String,
    pub splits_unavailable: String,
    pub written_to: String,
}

impl Messages {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Messages {
                not_activity_page: "Please open a Strava activity page".into(),
                extraction_error: "Extraction error".into(),
                loading_splits: "Loading splits...".into(),
                splits_unavailable: "Splits unavailable".into(),
                written_to: "Written to".into(),
            },
            Locale::Fr => Messages {
                not_activity_page: "Veuillez ouvrir une page d'activité Strava".into(),
                extraction_error: "Erreur d'extraction".into(),
                loading_splits: "Chargement des segments...".into(),
                splits_unavailable: "Segments indisponibles".into(),
                written_to: "Écrit dans".into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` polls until splits appear or the session is closed.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub field_names: FieldNames,
    pub messages: Messages,
    pub poll: PollConfig,
    pub gate_pattern: Regex,
    /// Script patterns used by every full extraction in a session.
    pub scanner: ScriptScanner,
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_locale(Locale::En)
    }
}

impl Settings {
    pub fn for_locale(locale: Locale) -> Self {
        Settings {
            field_names: FieldNames::for_locale(locale),
            messages: Messages::for_locale(locale),
            poll: PollConfig::default(),
            gate_pattern: ACTIVITY_URL_RE.clone(),
            scanner: ScriptScanner::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_field_names(mut self, field_names: FieldNames) -> Self {
        self.field_names = field_names;
        self
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.scanner = self.scanner.with_extractor(extractor);
        self
    }

    pub fn with_gate_pattern(mut self, pattern: &str) -> Result<Self> {
        self.gate_pattern =
            Regex::new(pattern).with_context(|| format!("Invalid gate pattern {pattern}"))?;
        Ok(self)
    }
}
