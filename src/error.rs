use std::path::PathBuf;
use thiserror::Error;

/// Errors scoped to a single input file. None of these abort a run.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path} as Turtle: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{subject} has no {predicate}")]
    MissingPredicate { subject: String, predicate: String },

    #[error("cannot build a URL from {base}: {message}")]
    InvalidUrl { base: String, message: String },

    #[error("failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocError::Io {
            path: path.into(),
            source,
        }
    }

    /// Raw OS error code for read failures, when the platform supplied one.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            DocError::Read { source, .. } | DocError::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

pub type DocResult<T> = std::result::Result<T, DocError>;
