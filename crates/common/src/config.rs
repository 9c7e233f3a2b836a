//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ProclipError, ProclipResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where exported clips are written.
    pub output_dir: PathBuf,

    /// Default export settings.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Tag embedded in every output file name.
    pub variant_tag: String,

    /// Output container extension (without the dot).
    pub container: String,

    /// Frame rate used when the source rate is requested but unknown.
    pub fallback_fps: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,

    /// x264 speed preset.
    pub x264_preset: String,

    /// Write each job into its own `ProClip_Exports_<unix>` folder.
    pub job_subfolder: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "proclip=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            export: ExportDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            variant_tag: "PREMIUM".to_string(),
            container: "mp4".to_string(),
            fallback_fps: 30,
            audio_bitrate_kbps: 192,
            x264_preset: "medium".to_string(),
            job_subfolder: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match Self::from_json(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Ignoring config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Parse and check a config document.
    pub fn from_json(content: &str) -> ProclipResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ProclipError::config(format!("malformed config: {e}")))?;
        config.export.validate()?;
        Ok(config)
    }
}

impl ExportDefaults {
    fn validate(&self) -> ProclipResult<()> {
        // The tag sits between '-' separators in every clip name.
        if self.variant_tag.is_empty() || self.variant_tag.contains('-') {
            return Err(ProclipError::config(format!(
                "variant_tag {:?} must be non-empty and free of '-'",
                self.variant_tag
            )));
        }
        if self.container.is_empty() || self.container.contains(['.', '/']) {
            return Err(ProclipError::config(format!(
                "container {:?} must be a bare extension",
                self.container
            )));
        }
        if self.fallback_fps == 0 {
            return Err(ProclipError::config("fallback_fps must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("proclip").join("config.json")
}

/// Default export directory.
fn default_output_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("proclip").join("exports")
}
