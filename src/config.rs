//! Pipeline configuration
//!
//! Every path and constant the pipeline uses lives in `PipelineConfig` and is
//! passed to `Pipeline::new`, so runs with different settings can coexist in
//! one process. Files are YAML (`.yaml`/`.yml`) or JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encode::{default_acceptable_durations, default_time_step, HOLD_SYMBOL, REST_SYMBOL};
use crate::error::{PipelineError, Result};
use crate::models::serde_helpers::{rational, rational_list};
use crate::models::Rational;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory searched recursively for score files
    pub dataset_path: PathBuf,

    /// Where one encoded file per accepted score is written
    pub songs_dir: PathBuf,

    /// Concatenated corpus file
    pub universal_dataset: PathBuf,

    /// Training window width; also the delimiter block length
    pub sequence_length: usize,

    /// Vocabulary JSON file
    pub mappings_path: PathBuf,

    /// Encoding resolution in quarter lengths
    #[serde(with = "rational")]
    pub time_step: Rational,

    /// Quarter lengths a score may contain
    #[serde(with = "rational_list")]
    pub acceptable_durations: Vec<Rational>,

    /// Token separating songs in the corpus
    pub delimiter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("./usa"),
            songs_dir: PathBuf::from("./preprocessed_data"),
            universal_dataset: PathBuf::from("songs_dataset"),
            sequence_length: 64,
            mappings_path: PathBuf::from("vocabulary.json"),
            time_step: default_time_step(),
            acceptable_durations: default_acceptable_durations(),
            delimiter: "/".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            return Err(PipelineError::Config(
                "sequence_length must be at least 1".to_string(),
            ));
        }

        if self.time_step <= Rational::from_integer(0) {
            return Err(PipelineError::Config(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }

        if let Some(duration) = self
            .acceptable_durations
            .iter()
            .find(|d| **d <= Rational::from_integer(0))
        {
            return Err(PipelineError::Config(format!(
                "acceptable duration {} is not positive",
                duration
            )));
        }

        if self.delimiter.is_empty() || self.delimiter.chars().any(char::is_whitespace) {
            return Err(PipelineError::Config(format!(
                "delimiter '{}' must be non-empty and contain no whitespace",
                self.delimiter
            )));
        }
        if self.delimiter == REST_SYMBOL
            || self.delimiter == HOLD_SYMBOL
            || self.delimiter.parse::<u8>().is_ok()
        {
            return Err(PipelineError::Config(format!(
                "delimiter '{}' collides with a note, rest or hold token",
                self.delimiter
            )));
        }

        for duration in &self.acceptable_durations {
            if !(*duration / self.time_step).is_integer() {
                log::warn!(
                    "acceptable duration {} is not a multiple of time step {}; it will be truncated",
                    duration,
                    self.time_step
                );
            }
        }

        Ok(())
    }
}

/// Load configuration from a YAML or JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config: PipelineConfig = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration as pretty JSON
pub fn save_config<P: AsRef<Path>>(config: &PipelineConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sequence_length, 64);
        assert_eq!(config.time_step, Rational::new(1, 4));
        assert_eq!(config.acceptable_durations.len(), 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = PipelineConfig::default();
        config.sequence_length = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.time_step = Rational::from_integer(0);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.acceptable_durations.push(Rational::new(-1, 4));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delimiter_collisions_rejected() {
        for delimiter in ["", "r", "_", "60", "a b"] {
            let config = PipelineConfig {
                delimiter: delimiter.to_string(),
                ..PipelineConfig::default()
            };
            assert!(config.validate().is_err(), "delimiter {:?} should fail", delimiter);
        }
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(
            &path,
            "dataset_path: ./essen\nsequence_length: 32\ntime_step: \"1/8\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("./essen"));
        assert_eq!(config.sequence_length, 32);
        assert_eq!(config.time_step, Rational::new(1, 8));
        assert_eq!(config.mappings_path, PathBuf::from("vocabulary.json"));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.json");
        let config = PipelineConfig {
            sequence_length: 16,
            ..PipelineConfig::default()
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{"sequence_length": 0}"#).unwrap();
        assert!(matches!(load_config(&path), Err(PipelineError::Config(_))));

        assert!(matches!(
            load_config(dir.path().join("missing.json")),
            Err(PipelineError::Io { .. })
        ));
    }
}
