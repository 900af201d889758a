use thiserror::Error;
use util::BadInput;

use crate::path::DirPath;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Malformed transcript line: {line:?}")]
    MalformedInput {
        line: String,
        #[source]
        cause: BadInput,
    },

    #[error("Unable to go up from root directory!")]
    NoParent,

    #[error("File size must not be negative, got {0}")]
    InvalidSize(i64),

    #[error("Sizes under {path} do not fit in 64 bits")]
    SizeOverflow { path: DirPath },

    #[error("Directory {0} was never registered")]
    UnknownPath(DirPath),

    #[error("No directory is big enough to free {deficit}")]
    NoCandidate { deficit: i128 },

    #[error("Current directory used before `cd /`")]
    CursorUnset,
}

impl FsError {
    /// Graphical report pointing into the offending line, for malformed input.
    pub fn render_line(&self) -> Option<String> {
        match self {
            FsError::MalformedInput { cause, .. } => cause.render().ok(),
            _ => None,
        }
    }
}
