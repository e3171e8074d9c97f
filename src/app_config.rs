use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::markup::DEFAULT_CLOZE_COLOR;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// CSS color applied to cloze answers
    #[serde(default = "default_color")]
    pub color: String,

    /// Directory scanned for packages when no input is given
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Directory receiving converted tables
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    /// Directory receiving package media
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// What to do with media files that already exist
    #[serde(default)]
    pub media_policy: MediaPolicy,

    /// Discard a leading UTF-8 byte-order mark from data files
    #[serde(default = "default_true")]
    pub strip_bom: bool,

    /// Keep processing remaining inputs after one fails
    #[serde(default)]
    pub keep_going: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Handling of media files already present at the destination
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaPolicy {
    // @policy: Replace the existing file
    Overwrite,
    // @policy: Leave the existing file alone
    #[default]
    Skip,
}

impl MediaPolicy {
    // @returns: Lowercase policy identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Overwrite => "overwrite".to_string(),
            Self::Skip => "skip".to_string(),
        }
    }
}

impl std::fmt::Display for MediaPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for MediaPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            _ => Err(anyhow!("Invalid media policy: {}", s)),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_color() -> String {
    DEFAULT_CLOZE_COLOR.to_string()
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("data/processed/media")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let color = self.color.trim();
        if color.is_empty() {
            return Err(anyhow!("Cloze color must not be empty"));
        }
        // The color lands inside an inline style attribute
        if color.contains([';', '<', '>', '"']) {
            return Err(anyhow!("Invalid cloze color: {}", self.color));
        }

        for (name, dir) in [
            ("raw_dir", &self.raw_dir),
            ("processed_dir", &self.processed_dir),
            ("media_dir", &self.media_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(anyhow!("{} must not be empty", name));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            color: default_color(),
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            media_dir: default_media_dir(),
            media_policy: MediaPolicy::default(),
            strip_bom: true,
            keep_going: false,
            log_level: LogLevel::default(),
        }
    }
}
