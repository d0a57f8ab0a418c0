//! Error types.
//!
//! Effects never fail a page: a missing element or host capability is logged
//! and skipped. These errors surface only from configuration loading and from
//! explicit API misuse (bad selectors, unknown observers).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid root margin `{0}`")]
    InvalidRootMargin(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to read configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Viewport intersection is not supported by the host")]
    IntersectionUnsupported,

    #[error("Unknown intersection observer #{0}")]
    UnknownObserver(usize),
}

/// Client-side registration checks. These mirror server rules for UX only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{message}")]
    PasswordMismatch { message: String },

    #[error("{message}")]
    MissingField { field: String, message: String },

    #[error("{message}")]
    PasswordTooShort { min: usize, message: String },
}

impl ValidationError {
    /// Id of the form field the feedback should attach to.
    pub fn field(&self) -> &str {
        match self {
            Self::PasswordMismatch { .. } => "confirm_password",
            Self::MissingField { field, .. } => field,
            Self::PasswordTooShort { .. } => "password",
        }
    }
}

pub type Result<T> = std::result::Result<T, FxError>;
