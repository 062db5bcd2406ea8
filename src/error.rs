use std::path::PathBuf;

use thiserror::Error;

/// Every way a run can fail. All of them end the run.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input CSV path does not exist.
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Missing column or unparseable field in the input CSV.
    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: u64, message: String },

    /// Invalid command line value.
    #[error("bad argument: {0}")]
    BadArgument(String),

    /// Nothing left to plot after filtering.
    #[error("no sleep records left to plot")]
    NoData,

    /// Output image could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Plotting backend or PNG encoder failure.
    #[error("render failure: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "INPUT_NOT_FOUND",
            Self::MalformedInput { .. } => "INPUT_MALFORMED",
            Self::BadArgument(_) => "BAD_ARGUMENT",
            Self::NoData => "NO_DATA",
            Self::IoWrite { .. } => "OUTPUT_WRITE_ERROR",
            Self::Render(_) => "RENDER_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Process exit status for this error. Never 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::BadArgument(_) => 2,
            Self::NotFound(_) => 3,
            Self::MalformedInput { .. } => 4,
            Self::NoData => 5,
            Self::IoWrite { .. } => 6,
            Self::Render(_) => 7,
        }
    }

    /// Optional follow-up line printed under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedInput { .. } => Some(
                "Expected a header with 'date', 'deepSleepTime' and 'shallowSleepTime' columns.",
            ),
            Self::NoData => Some("Check the --after/--before range and --exclude-weekends."),
            _ => None,
        }
    }

    pub(crate) fn malformed(line: u64, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            message: message.into(),
        }
    }
}
