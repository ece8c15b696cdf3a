//! Error types for Foundry

use thiserror::Error;

/// Result type alias for Foundry operations
pub type FoundryResult<T> = Result<T, FoundryError>;

/// Main error type for Foundry
#[derive(Error, Debug)]
pub enum FoundryError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Validation(String),

    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("Server error, status code: {status}, error code: {code}, message: {description}")]
    Http {
        status: u16,
        code: String,
        description: String,
    },

    #[error("{0}")]
    Remote(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not logged in. Log in to the platform and try again.")]
    NotLoggedIn,

    #[error("No API endpoint set. Set one in config.toml or with FOUNDRY_API.")]
    NoApiEndpoint,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FoundryError {
    fn from(err: reqwest::Error) -> Self {
        FoundryError::Network(err.to_string())
    }
}

impl FoundryError {
    /// Create a usage error
    pub fn usage<S: Into<String>>(msg: S) -> Self {
        FoundryError::Usage(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        FoundryError::Validation(msg.into())
    }

    /// Create a remote operation error
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        FoundryError::Remote(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        FoundryError::Config(msg.into())
    }

    /// Create a not-found error for a named resource
    pub fn not_found<S: Into<String>>(kind: &'static str, name: S) -> Self {
        FoundryError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether this error should be reported together with the command usage
    pub fn shows_usage(&self) -> bool {
        matches!(self, FoundryError::Usage(_) | FoundryError::Validation(_))
    }

    /// Wrap this error with a leading context line, keeping usage errors intact
    pub fn context(self, line: impl Into<String>) -> Self {
        if self.shows_usage() {
            return self;
        }
        FoundryError::Remote(format!("{}\n{}", line.into(), self))
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FoundryError::Usage(_) | FoundryError::Validation(_) => 2,
            _ => 1,
        }
    }
}
