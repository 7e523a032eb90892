//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument,
//! defaulting to config/dev.toml. A missing or unparsable file falls back
//! to built-in defaults with a warning.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct HeadingConfig {
    /// Exponential smoothing factor applied to heading updates
    #[serde(default = "default_heading_smoothing")]
    pub smoothing_factor: f64,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self { smoothing_factor: default_heading_smoothing() }
    }
}

fn default_heading_smoothing() -> f64 {
    0.1
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// Exponential smoothing factor applied to the arrow angle
    #[serde(default = "default_arrow_smoothing")]
    pub smoothing_factor: f64,
    /// Distance below which the destination counts as reached (meters)
    #[serde(default = "default_arrival_buffer_m")]
    pub arrival_buffer_m: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: default_arrow_smoothing(),
            arrival_buffer_m: default_arrival_buffer_m(),
        }
    }
}

fn default_arrow_smoothing() -> f64 {
    0.1
}

fn default_arrival_buffer_m() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    /// JSONL place dataset path
    #[serde(default = "default_places_file")]
    pub file: String,
    /// Maximum results returned per search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self { file: default_places_file(), search_limit: default_search_limit() }
    }
}

fn default_places_file() -> String {
    "data/places.jsonl".to_string()
}

fn default_search_limit() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct AltimeterConfig {
    /// Sea-level reference pressure (hPa)
    #[serde(default = "default_sea_level_hpa")]
    pub sea_level_hpa: f64,
}

impl Default for AltimeterConfig {
    fn default() -> Self {
        Self { sea_level_hpa: default_sea_level_hpa() }
    }
}

fn default_sea_level_hpa() -> f64 {
    1013.25
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionLogConfig {
    /// File path for completed-session egress (JSONL format)
    #[serde(default = "default_session_log_file")]
    pub file: String,
}

impl Default for SessionLogConfig {
    fn default() -> Self {
        Self { file: default_session_log_file() }
    }
}

fn default_session_log_file() -> String {
    "sessions.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Bounded sensor-event queue capacity
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,
    /// Bounded display-update queue capacity
    #[serde(default = "default_update_queue_capacity")]
    pub update_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: default_event_queue_capacity(),
            update_queue_capacity: default_update_queue_capacity(),
        }
    }
}

fn default_event_queue_capacity() -> usize {
    256
}

fn default_update_queue_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval_secs() }
    }
}

fn default_metrics_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub heading: HeadingConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub altimeter: AltimeterConfig,
    #[serde(default)]
    pub session_log: SessionLogConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    heading_smoothing: f64,
    arrow_smoothing: f64,
    arrival_buffer_m: f64,
    places_file: String,
    search_limit: usize,
    sea_level_hpa: f64,
    session_log_file: String,
    event_queue_capacity: usize,
    update_queue_capacity: usize,
    metrics_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            heading_smoothing: toml_config.heading.smoothing_factor,
            arrow_smoothing: toml_config.navigation.smoothing_factor,
            arrival_buffer_m: toml_config.navigation.arrival_buffer_m,
            places_file: toml_config.places.file,
            search_limit: toml_config.places.search_limit,
            sea_level_hpa: toml_config.altimeter.sea_level_hpa,
            session_log_file: toml_config.session_log.file,
            event_queue_capacity: toml_config.pipeline.event_queue_capacity,
            update_queue_capacity: toml_config.pipeline.update_queue_capacity,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            config_file: config_file.to_string(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn heading_smoothing(&self) -> f64 {
        self.heading_smoothing
    }

    pub fn arrow_smoothing(&self) -> f64 {
        self.arrow_smoothing
    }

    pub fn arrival_buffer_m(&self) -> f64 {
        self.arrival_buffer_m
    }

    pub fn places_file(&self) -> &str {
        &self.places_file
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    pub fn sea_level_hpa(&self) -> f64 {
        self.sea_level_hpa
    }

    pub fn session_log_file(&self) -> &str {
        &self.session_log_file
    }

    pub fn event_queue_capacity(&self) -> usize {
        self.event_queue_capacity
    }

    pub fn update_queue_capacity(&self) -> usize {
        self.update_queue_capacity
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the session log path
    #[cfg(test)]
    pub fn with_session_log_file(mut self, file: &str) -> Self {
        self.session_log_file = file.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.heading_smoothing(), 0.1);
        assert_eq!(config.arrow_smoothing(), 0.1);
        assert_eq!(config.arrival_buffer_m(), 10.0);
        assert_eq!(config.places_file(), "data/places.jsonl");
        assert_eq!(config.search_limit(), 3);
        assert_eq!(config.sea_level_hpa(), 1013.25);
        assert_eq!(config.session_log_file(), "sessions.jsonl");
        assert_eq!(config.event_queue_capacity(), 256);
        assert_eq!(config.metrics_interval_secs(), 10);
    }

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
            [navigation]
            arrival_buffer_m = 25.0
            "#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "test");
        assert_eq!(config.arrival_buffer_m(), 25.0);
        // Untouched sections keep their defaults
        assert_eq!(config.arrow_smoothing(), 0.1);
        assert_eq!(config.search_limit(), 3);
    }
}
