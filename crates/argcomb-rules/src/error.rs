//! Errors raised while loading rule, signature and call documents.

use argcomb_kernel::{ConditionError, SignatureError};

#[derive(Debug, thiserror::Error)]
pub enum RuleDocumentError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML document: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unable to render TOML document: {0}")]
    TomlRender(#[from] toml::ser::Error),

    /// A condition at `path` could not be built.
    #[error("{path}: {source}")]
    Condition {
        path: String,
        #[source]
        source: ConditionError,
    },

    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    /// The document parsed but its structure is not a valid rule set.
    #[error("{path}: {message}")]
    Shape { path: String, message: String },
}

impl RuleDocumentError {
    pub(crate) fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Document path of the offending item, when known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Condition { path, .. } | Self::Shape { path, .. } => Some(path),
            _ => None,
        }
    }
}
