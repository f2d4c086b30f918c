//! Client configuration file (`termdesk.toml`).
//!
//! Every section is optional; missing keys fall back to defaults. Command-line
//! flags are layered on top by the binary via [`ClientConfig::merge_overrides`].

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HIGHLIGHT_STEP_MS: u64 = 200;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: Option<PathBuf>, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse config `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "failed to parse config: {source}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    /// Remote server root, e.g. `https://admin.example.com`.
    pub base_url: Option<String>,
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<String>,
    /// Absolute directory for rolling log files; stderr when absent.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    pub step_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            step_ms: DEFAULT_HIGHLIGHT_STEP_MS,
        }
    }
}

impl HighlightConfig {
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub endpoint: EndpointConfig,
    pub log: LogConfig,
    pub highlight: HighlightConfig,
}

/// Values supplied on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub csrf_token: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: None,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        config.validate()?;
        log::debug!("event=config_load module=config status=ok");
        Ok(config)
    }

    /// Applies command-line values over the file values.
    pub fn merge_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.base_url.is_some() {
            self.endpoint.base_url = overrides.base_url;
        }
        if overrides.csrf_token.is_some() {
            self.endpoint.csrf_token = overrides.csrf_token;
        }
        if overrides.log_level.is_some() {
            self.log.level = overrides.log_level;
        }
        if overrides.log_dir.is_some() {
            self.log.dir = overrides.log_dir;
        }
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.highlight.step_ms == 0 {
            return Err(ConfigError::Invalid(
                "highlight.step_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(base_url) = &self.endpoint.base_url {
            if base_url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "endpoint.base_url cannot be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}
