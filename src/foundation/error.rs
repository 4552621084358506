/// Convenience result type used across slidereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy. Every variant is fatal for a run.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// A voice-over line names a character missing from `characters`.
    #[error("unknown character: '{name}'")]
    UnknownCharacter {
        /// Character name as written in the script.
        name: String,
    },

    /// A script entry matches none of the recognized shapes.
    #[error("malformed script entry: {0}")]
    MalformedScriptEntry(String),

    /// A referenced file was never produced (or never existed).
    #[error("artifact missing: '{}'", path.display())]
    ArtifactMissing {
        /// Expected location of the artifact.
        path: std::path::PathBuf,
    },

    /// An external process (speech synthesis, highlighter, encoder) failed.
    #[error("{backend} failed: {detail}")]
    ExternalBackendFailure {
        /// Program name of the backend.
        backend: String,
        /// Exit status and stderr, verbatim.
        detail: String,
    },

    /// Invalid configuration or script values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when deserializing the script document.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::UnknownCharacter`] value.
    pub fn unknown_character(name: impl Into<String>) -> Self {
        Self::UnknownCharacter { name: name.into() }
    }

    /// Build a [`ReelError::MalformedScriptEntry`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedScriptEntry(msg.into())
    }

    /// Build a [`ReelError::ArtifactMissing`] value.
    pub fn artifact_missing(path: impl Into<std::path::PathBuf>) -> Self {
        Self::ArtifactMissing { path: path.into() }
    }

    /// Build a [`ReelError::ExternalBackendFailure`] value.
    pub fn backend(backend: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExternalBackendFailure {
            backend: backend.into(),
            detail: detail.into(),
        }
    }

    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
