use std::path::PathBuf;

/// Errors raised while designing a probe set.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// Ambiguous or illegal characters reached a stage that cannot tolerate them
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    /// Bad parameters, unknown channel or species, conflicting bounds
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-zero exit or malformed output from an external program
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Hit counts returned by the aligner do not line up with the submitted batch
    #[error("alignment correspondence error: {0}")]
    AlignmentCorrespondence(String),

    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl DesignError {
    /// Wraps an `io::Error` with the path it happened on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

impl From<std::io::Error> for DesignError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<unknown>"),
        }
    }
}

pub type Result<T> = std::result::Result<T, DesignError>;
