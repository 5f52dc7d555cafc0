use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use zano_runtime::{LuaScriptConfig, Vec2};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    IoError(String, #[source] std::io::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Client configuration
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Name of the demo object (shows up in script log lines)
    #[serde(default = "default_object_name")]
    pub object_name: String,

    /// Lua script driving the object; the bundled sprite controller when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    /// Number of frames to simulate
    #[serde(default = "default_frames")]
    pub frames: u64,

    /// Simulated frames per second (1-1000)
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-call script time budget in milliseconds; unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_budget_ms: Option<u64>,

    /// Initial position of the object
    #[serde(default = "default_start_position")]
    pub start_position: Vec2,
}

fn default_object_name() -> String {
    "sprite".to_string()
}

fn default_frames() -> u64 {
    120
}

fn default_fps() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_start_position() -> Vec2 {
    Vec2::new(400.0, 300.0)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            object_name: default_object_name(),
            script: None,
            frames: default_frames(),
            fps: default_fps(),
            log_level: default_log_level(),
            script_budget_ms: None,
            start_position: default_start_position(),
        }
    }
}

impl ClientConfig {
    /// Load and validate from JSON file
    pub fn from_json_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::IoError(path.to_string(), e))?;
        Self::from_json_str(&content)
    }

    /// Load and validate from JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.fps) {
            return Err(ConfigError::ValidationError(format!(
                "fps must be between 1 and 1000, got {}",
                self.fps
            )));
        }
        if self.frames == 0 {
            return Err(ConfigError::ValidationError(
                "frames must be at least 1".to_string(),
            ));
        }
        if self.script_budget_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "script_budget_ms must be at least 1; omit it for no budget".to_string(),
            ));
        }
        self.level()?;
        Ok(())
    }

    /// Parsed log level
    pub fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => Err(ConfigError::ValidationError(format!(
                "log_level must be one of trace, debug, info, warn, error; got '{}'",
                other
            ))),
        }
    }

    /// Fixed simulation step in seconds
    pub fn frame_delta(&self) -> f64 {
        1.0 / self.fps as f64
    }

    pub fn script_config(&self) -> LuaScriptConfig {
        match self.script_budget_ms {
            Some(ms) => LuaScriptConfig::new().with_max_call_duration(Duration::from_millis(ms)),
            None => LuaScriptConfig::new(),
        }
    }
}
