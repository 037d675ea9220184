//! Error types for the composition engine
//!
//! Two families: [`ObjectError`] is raised while instances are constructed or
//! their members are used, [`ComposeError`] is raised while templates and
//! classes are being defined. Capability checks have no error path.

use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised by runtime object operations
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// The named member is absent or is not a method
    #[error("'{name}' is not callable")]
    NotCallable {
        /// Member that was invoked
        name: String,
    },

    /// Assignment through an accessor that has no setter
    #[error("cannot assign to read-only member '{name}'")]
    ReadOnly {
        /// Member that was assigned
        name: String,
    },

    /// Construction with fewer arguments than the class requires
    #[error("{class} requires {expected} argument(s), got {actual}")]
    MissingArguments {
        /// Display name of the class being constructed
        class: String,
        /// Required argument count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Failure raised by user code (initializers, methods, accessors)
    #[error("{message}")]
    Custom {
        /// Error message supplied by the member implementation
        message: String,
    },
}

impl ObjectError {
    /// Create a not-callable error
    pub fn not_callable(name: impl Into<String>) -> Self {
        Self::NotCallable { name: name.into() }
    }

    /// Create a read-only assignment error
    pub fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnly { name: name.into() }
    }

    /// Create an error for user code
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Errors raised while defining templates and classes
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComposeError {
    /// A composition needs at least one protocol unit
    #[error("composition requires at least one protocol")]
    EmptyComposition,

    /// A concrete class leaves abstract members unsupplied
    #[error("{class} does not supply required members: {}", missing.join(", "))]
    MissingRequirements {
        /// Display name of the rejected class
        class: String,
        /// Required members nothing in the lineage supplies
        missing: Vec<String>,
    },

    /// Configuration file could not be read
    #[error("Failed to read config file {}", path.display())]
    ConfigRead {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Configuration document is not valid TOML for [`crate::EngineConfig`]
    #[error("Invalid TOML configuration")]
    ConfigParse {
        /// Underlying TOML decoding failure
        #[source]
        source: toml::de::Error,
    },

    /// Engine configuration is invalid
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl ComposeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result alias for runtime object operations
pub type ObjectResult<T> = Result<T, ObjectError>;
