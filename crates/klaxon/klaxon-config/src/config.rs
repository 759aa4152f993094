use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KlaxonConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Length of one interval unit, in milliseconds.
    #[serde(default = "defaults::time_unit_ms")]
    pub time_unit_ms: u64,
    /// Upper bound on how long a display worker sleeps between checks.
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "defaults::max_message_len")]
    pub max_message_len: usize,
    #[serde(default = "defaults::prompt")]
    pub prompt: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn time_unit_ms() -> u64 {
        1_000
    }

    pub fn poll_interval_ms() -> u64 {
        100
    }

    pub fn max_message_len() -> usize {
        128
    }

    pub fn prompt() -> String {
        "Alarm> ".into()
    }
}

impl Default for KlaxonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            time_unit_ms: defaults::time_unit_ms(),
            poll_interval_ms: defaults::poll_interval_ms(),
            max_message_len: defaults::max_message_len(),
            prompt: defaults::prompt(),
        }
    }
}

impl KlaxonConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&toml_to_str)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: KlaxonConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.time_unit_ms == 0 {
            return Err(ConfigError::Zero {
                field: "time_unit_ms",
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "poll_interval_ms",
            });
        }
        Ok(())
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
