use std::path::PathBuf;
use thiserror::Error;

/// Failures of the log sink. Never fatal for sampling.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Log sink unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Failures converting a host path into the native format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Missing volume name in path: {path}")]
    MissingVolume { path: String },

    #[error("Empty component at position {index} in path: {path}")]
    EmptyComponent { path: String, index: usize },
}

#[derive(Error, Debug)]
pub enum TodError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TodError {
    /// Whether the plugin can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TodError::Sink(_) => true,
            TodError::Path(_) => true,
            TodError::Io(_) => true,
            TodError::ConfigJson(_) => false,
            TodError::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PathError::EmptyComponent { path: "HD::a".to_string(), index: 1 };
        assert_eq!(err.to_string(), "Empty component at position 1 in path: HD::a");

        let err = SinkError::Unavailable {
            path: PathBuf::from("/nope/log.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("Log sink unavailable at /nope/log.txt"));
    }

    #[test]
    fn test_recoverability() {
        assert!(TodError::from(PathError::Empty).is_recoverable());
        assert!(!TodError::Config("log_every_ticks must be > 0".into()).is_recoverable());
    }
}
