//! Error types for chaparral.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChaparralError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing config: {0}")]
    MissingConfig(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid skill: {0}")]
    InvalidSkill(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Some units of a multi-organization run failed; the rest completed.
    #[error("partial failure: {0}")]
    Partial(String),

    /// A write failed after other files of the same batch were written.
    #[error("{source} (already written: {})", .written.join(", "))]
    PartialWrite {
        written: Vec<String>,
        source: Box<ChaparralError>,
    },

    /// Staging produced a tree identical to HEAD. Publishing is a no-op.
    #[error("no changes to commit")]
    NothingToCommit,
}

impl ChaparralError {
    /// Short machine-readable code used in robot output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Git(_) => "git",
            Self::Serialization(_) => "serialization",
            Self::Config(_) | Self::MissingConfig(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidSkill(_) => "invalid_skill",
            Self::ValidationFailed(_) => "validation_failed",
            Self::CommandFailed(_) => "command_failed",
            Self::MissingCredentials(_) => "missing_credentials",
            Self::Partial(_) => "partial",
            Self::PartialWrite { source, .. } => source.code(),
            Self::NothingToCommit => "nothing_to_commit",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChaparralError>;
