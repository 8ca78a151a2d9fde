use std::str::FromStr;

use thiserror::Error;
use tracing::Level;

/// Overrides whether validation layers are requested
pub const VALIDATION_VAR: &str = "VULKAN_DEMO_VALIDATION";
/// Maximum log level
pub const LOG_VAR: &str = "VULKAN_DEMO_LOG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{var} must be one of 1/true/on or 0/false/off, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },

    #[error("{var} is not a log level, got {value:?}")]
    InvalidLevel { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub validation: bool,
    pub log_level: Level,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            title: String::from("vulkan-demo"),
            width: 800,
            height: 600,
            resizable: false,
            validation: cfg!(debug_assertions),
            log_level: Level::INFO,
        }
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

impl DemoSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults, overridden by whatever `lookup` finds
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(value) = lookup(VALIDATION_VAR) {
            settings.validation = parse_flag(VALIDATION_VAR, &value)?;
        }
        if let Some(value) = lookup(LOG_VAR) {
            settings.log_level =
                Level::from_str(value.trim()).map_err(|_| SettingsError::InvalidLevel {
                    var: LOG_VAR,
                    value,
                })?;
        }
        Ok(settings)
    }

    pub fn app_settings(&self) -> vkboot::AppSettings {
        vkboot::AppSettings {
            name: self.title.clone(),
            enable_validation: self.validation,
            ..Default::default()
        }
    }
}
