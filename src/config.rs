//! Explorer configuration.
//!
//! Loaded from an optional JSON file. Every field has a default, so an empty
//! object (or no file at all) gives the stock 800x600 view of the set.

use crate::constants::*;
use crate::shader::ShaderError;
use crate::viewport::ViewportState;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_DEFAULT_TITLE.to_string(),
            width: WINDOW_DEFAULT_WIDTH,
            height: WINDOW_DEFAULT_HEIGHT,
            vsync: true,
        }
    }
}

/// Initial viewport, also used by the reset-view key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub zoom: f64,
    pub center: [f64; 2],
    pub max_iterations: i32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            center: DEFAULT_CENTER,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SceneConfig {
    pub fn viewport(&self) -> ViewportState {
        ViewportState::new(self.zoom, DVec2::from_array(self.center), self.max_iterations)
    }
}

/// What to do when a hot reload fails to compile or link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadFailurePolicy {
    /// End the session
    #[default]
    Abort,
    /// Log and keep drawing with the previous program
    KeepPrevious,
}

impl ReloadFailurePolicy {
    /// Decide what a failed reload means for the session. `Err` ends it.
    pub fn handle(self, error: ShaderError) -> Result<(), ShaderError> {
        match self {
            ReloadFailurePolicy::Abort => Err(error),
            ReloadFailurePolicy::KeepPrevious => {
                tracing::warn!("shader reload failed, keeping previous program: {error}");
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    pub on_reload_failure: ReloadFailurePolicy,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from(VERTEX_SHADER_PATH),
            fragment: PathBuf::from(FRAGMENT_SHADER_PATH),
            on_reload_failure: ReloadFailurePolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub shaders: ShaderConfig,
    /// P6 image whose first row is used as the color lookup table
    pub palette: Option<PathBuf>,
    pub log_level: String,
    /// `host:port` for the puffin profiler server; profiling is off when unset
    pub profiler_addr: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scene: SceneConfig::default(),
            shaders: ShaderConfig::default(),
            palette: None,
            log_level: "info".to_string(),
            profiler_addr: None,
        }
    }
}

impl ExplorerConfig {
    /// Load from `path` if given, otherwise from `explorer.json` when present,
    /// otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scene.zoom.is_finite() && self.scene.zoom > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scene.zoom must be positive, got {}",
                self.scene.zoom
            )));
        }
        if self.scene.center.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::Invalid("scene.center must be finite".to_string()));
        }
        if self.scene.max_iterations <= 0 {
            return Err(ConfigError::Invalid(format!(
                "scene.max_iterations must be positive, got {}",
                self.scene.max_iterations
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        self.tracing_level()?;
        Ok(())
    }

    pub fn tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level {:?}", self.log_level)))
    }
}
