mod config;

pub use config::{ConfigError, KlaxonConfig};
