//! Runtime configuration for the programs (std-only)
//!
//! Both settings come from the environment, never from arguments:
//!
//! - `ASM_IDIOMS_BACKEND`: `inline`, `shim` or `portable`
//! - `ASM_IDIOMS_LOG`: `off`, `error`, `warn`, `info`, `debug` or `trace`
//!
//! With neither set the host's default backend runs and nothing is logged,
//! so standard output carries only the program's result line.

use std::env;
use std::fmt;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use crate::error::Error;
use crate::idioms::Backend;

pub const BACKEND_VAR: &str = "ASM_IDIOMS_BACKEND";
pub const LOG_VAR: &str = "ASM_IDIOMS_LOG";

/// Errors raised while reading the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    UnknownLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownBackend(name) => write!(
                f,
                "unknown backend '{}' in {} (expected inline, shim or portable)",
                name, BACKEND_VAR
            ),
            ConfigError::UnknownLogLevel(name) => write!(
                f,
                "unknown log level '{}' in {} (expected off, error, warn, info, debug or trace)",
                name, LOG_VAR
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Backend::Inline),
            "shim" => Ok(Backend::Shim),
            "portable" => Ok(Backend::Portable),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::default(),
            log_level: LevelFilter::Off,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env::var(BACKEND_VAR).ok().as_deref(),
            env::var(LOG_VAR).ok().as_deref(),
        )
    }

    /// Build a configuration from raw variable values; unset or empty
    /// values keep the default.
    pub fn from_values(backend: Option<&str>, log_level: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(name) = backend.filter(|s| !s.trim().is_empty()) {
            config.backend = name.parse()?;
        }
        if let Some(name) = log_level.filter(|s| !s.trim().is_empty()) {
            config.log_level = LevelFilter::from_str(name.trim())
                .map_err(|_| ConfigError::UnknownLogLevel(name.to_string()))?;
        }

        Ok(config)
    }

    /// Install the terminal logger on stderr unless logging is off
    pub fn configure_logging(&self) -> Result<(), Error> {
        if self.log_level == LevelFilter::Off {
            return Ok(());
        }
        configure_logging(self.log_level)
    }
}

/// Install a `TermLogger` writing to stderr at `level`
pub fn configure_logging(level: LevelFilter) -> Result<(), Error> {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Error)
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}
