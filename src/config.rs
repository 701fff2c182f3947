// Configuration management for the execution monitor

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analytics::metrics::PNL_WINDOW_MINUTES;
use crate::analytics::PerformanceAnalyzer;
use crate::anomaly::{AnomalyDetector, AnomalyThresholds, DetectorSettings};
use crate::simulation::{SyntheticFillConfig, WhatIfSimulator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub annual_risk_free_rate: f64,   // Sharpe uses annual / 252 per window
    pub default_window_minutes: u32,  // Time series width when none is requested
    pub pnl_window_minutes: u32,      // Cumulative P&L bucket behind Sharpe and drawdown
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            annual_risk_free_rate: 0.02,
            default_window_minutes: 60,
            pnl_window_minutes: PNL_WINDOW_MINUTES,
        }
    }
}

/// `[detection]` holds the detector thresholds and window settings side by side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    #[serde(flatten)]
    pub thresholds: AnomalyThresholds,
    #[serde(flatten)]
    pub settings: DetectorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_anomalies: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_anomalies: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsConfig,
    pub detection: DetectionConfig,
    pub simulation: SyntheticFillConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analytics.default_window_minutes == 0 || self.analytics.pnl_window_minutes == 0 {
            return Err(ConfigError::Validation("window minutes must be greater than 0".to_string()));
        }

        let thresholds = &self.detection.thresholds;
        if thresholds.latency_spike_ms <= 0.0 {
            return Err(ConfigError::Validation("latency_spike_ms must be positive".to_string()));
        }

        for (name, value) in [
            ("high_reject_rate", thresholds.high_reject_rate),
            ("fill_rate_drop", thresholds.fill_rate_drop),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("{} must be within [0, 1]", name)));
            }
        }

        if thresholds.volume_multiplier <= 0.0 {
            return Err(ConfigError::Validation("volume_multiplier must be positive".to_string()));
        }

        let settings = &self.detection.settings;
        if settings.latency_window == 0 || settings.recent_windows == 0 {
            return Err(ConfigError::Validation(
                "latency_window and recent_windows must be greater than 0".to_string(),
            ));
        }

        if settings.reject_window_minutes == 0
            || settings.volume_window_minutes == 0
            || settings.fill_rate_window_minutes == 0
        {
            return Err(ConfigError::Validation("detector windows must be greater than 0".to_string()));
        }

        let simulation = &self.simulation;
        if simulation.min_quantity <= 0.0 || simulation.min_quantity > simulation.max_quantity {
            return Err(ConfigError::Validation(
                "synthetic quantity range must be positive with min <= max".to_string(),
            ));
        }

        if simulation.fallback_price <= 0.0 {
            return Err(ConfigError::Validation("fallback_price must be positive".to_string()));
        }

        Ok(())
    }

    pub fn thresholds(&self) -> AnomalyThresholds {
        self.detection.thresholds
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        self.detection.settings
    }

    pub fn detector(&self) -> AnomalyDetector {
        AnomalyDetector::new(self.thresholds()).with_settings(self.detector_settings())
    }

    pub fn analyzer(&self) -> PerformanceAnalyzer {
        PerformanceAnalyzer::new()
            .with_risk_free_rate(self.analytics.annual_risk_free_rate)
            .with_pnl_window(self.analytics.pnl_window_minutes)
    }

    pub fn simulator(&self) -> WhatIfSimulator {
        WhatIfSimulator::new(self.analyzer(), self.simulation.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
