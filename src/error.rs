//! Crate-level error type

use core::fmt;

use crate::idioms::Backend;
use crate::shim::ShimError;

#[cfg(feature = "std")]
use crate::common::jit::JitError;
#[cfg(feature = "std")]
use crate::config::ConfigError;

/// Errors surfaced to the programs
#[derive(Debug)]
pub enum Error {
    /// A shim failed to lower or verify
    Shim(ShimError),
    /// Executable memory could not be mapped
    #[cfg(feature = "std")]
    Jit(JitError),
    /// An environment variable holds an unknown value
    #[cfg(feature = "std")]
    Config(ConfigError),
    /// The logger was already installed
    #[cfg(feature = "std")]
    Logger(log::SetLoggerError),
    /// The backend cannot run on this host
    UnsupportedHost { backend: Backend, arch: &'static str },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Shim(e) => write!(f, "Shim error: {}", e),
            #[cfg(feature = "std")]
            Error::Jit(e) => write!(f, "{}", e),
            #[cfg(feature = "std")]
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            #[cfg(feature = "std")]
            Error::Logger(e) => write!(f, "Failed to configure logger: {}", e),
            Error::UnsupportedHost { backend, arch } => {
                write!(f, "The {} backend is not available on {}", backend, arch)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Shim(e) => Some(e),
            Error::Jit(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Logger(e) => Some(e),
            Error::UnsupportedHost { .. } => None,
        }
    }
}

impl From<ShimError> for Error {
    fn from(e: ShimError) -> Self {
        Error::Shim(e)
    }
}

#[cfg(feature = "std")]
impl From<JitError> for Error {
    fn from(e: JitError) -> Self {
        Error::Jit(e)
    }
}

#[cfg(feature = "std")]
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl From<log::SetLoggerError> for Error {
    fn from(e: log::SetLoggerError) -> Self {
        Error::Logger(e)
    }
}
