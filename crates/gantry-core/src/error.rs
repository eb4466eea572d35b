//! Error types for pipeline operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode pipeline config: {0}")]
    Serialization(#[source] serde_yml::Error),

    #[error("failed to decode pipeline config: {0}")]
    Deserialization(#[source] serde_yml::Error),

    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("command `{command}` exited with {}", .code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        command: String,
        code: Option<i32>,
    },

    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap an error with the stage at which it occurred.
    pub fn in_stage(self, stage: &str) -> Self {
        PipelineError::Stage {
            stage: stage.to_string(),
            source: Box::new(self),
        }
    }

    /// The exit code carried by a `CommandFailed` cause, looking through
    /// `Stage` wrapping.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PipelineError::CommandFailed { code, .. } => *code,
            PipelineError::Stage { source, .. } => source.exit_code(),
            _ => None,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
