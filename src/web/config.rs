use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::report::ReportSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid coordinates '{0}', expected 'lat,lon'")]
    Coordinates(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Request body limit for photo uploads.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_upload_mb() -> usize {
    32
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_base_folder")]
    pub base_folder: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            base_folder: default_base_folder(),
        }
    }
}

fn default_base_folder() -> PathBuf {
    PathBuf::from("storage")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_pdf")]
    pub pdf: bool,
    /// Map center used when a mission has no located data, as `"lat,lon"`.
    #[serde(default)]
    pub default_center: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            pdf: default_pdf(),
            default_center: None,
        }
    }
}

fn default_pdf() -> bool {
    true
}

fn parse_coordinates(coordinates: &str) -> Option<[f64; 2]> {
    let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
    if parts.len() != 2 {
        return None;
    }
    let lat: f64 = parts[0].parse().ok()?;
    let lon: f64 = parts[1].parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some([lat, lon])
}

impl ReportConfig {
    pub fn settings(&self) -> Result<ReportSettings, ConfigError> {
        let default_center = match &self.default_center {
            Some(c) => Some(
                parse_coordinates(c).ok_or_else(|| ConfigError::Coordinates(c.clone()))?,
            ),
            None => None,
        };
        Ok(ReportSettings {
            pdf: self.pdf,
            default_center,
        })
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.report.settings()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            warn!("Config file {} not found, using defaults", path);
            return Ok(Config::default());
        }
        Self::from_file(path)
    }
}
