use std::path::PathBuf;

use thiserror::Error;

use crate::editing::infrastructure::font_resolver::FontResolveError;
use crate::pipeline::edit_session::SessionState;

/// Failure of one stage on one frame.
#[derive(Error, Debug)]
#[error("stage '{stage}' failed on frame {index}: {source}")]
pub struct StageError {
    pub stage: &'static str,
    pub index: usize,
    #[source]
    pub source: Box<dyn std::error::Error>,
}

/// Errors that stop an edit session before or while it starts streaming.
///
/// Failures after the first frame has been written are not errors: they are
/// logged, streaming stops, and the session still finishes with whatever was
/// written.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("could not open video file {path}: {source}")]
    FileNotOpenable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    #[error("could not read the first frame (index {index}): {reason}")]
    FirstFrameUnreadable { index: usize, reason: String },

    #[error("could not initialise the output writer for {path}: {source}")]
    WriterInitFailed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    #[error(transparent)]
    StageFailed(#[from] StageError),

    #[error(transparent)]
    Font(#[from] FontResolveError),

    #[error("session is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}

/// Non-fatal conditions collected in the session report and logged as warnings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionWarning {
    #[error("the frame is empty at frame number {0}")]
    EmptyFrameAtIndex(usize),

    #[error("invalid start or end time ({start_secs}s to {end_secs}s), using the full video")]
    InvalidTrimRange { start_secs: f64, end_secs: f64 },

    #[error("preview failed on frame {index}: {reason}")]
    PreviewFailed { index: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_exposes_source() {
        let err = StageError {
            stage: "blur",
            index: 3,
            source: "bad buffer".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("blur"));
        assert!(msg.contains("3"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_stage_failed_is_transparent() {
        let err: SessionError = StageError {
            stage: "rotate",
            index: 0,
            source: "nope".into(),
        }
        .into();
        assert!(err.to_string().starts_with("stage 'rotate'"));
    }

    #[test]
    fn test_file_not_openable_message_names_path() {
        let err = SessionError::FileNotOpenable {
            path: PathBuf::from("/nope.mp4"),
            source: "No such file".into(),
        };
        assert!(err.to_string().contains("/nope.mp4"));
    }

    #[test]
    fn test_warning_messages() {
        assert_eq!(
            SessionWarning::EmptyFrameAtIndex(12).to_string(),
            "the frame is empty at frame number 12"
        );
        let w = SessionWarning::InvalidTrimRange {
            start_secs: -1.0,
            end_secs: 5.0,
        };
        assert!(w.to_string().contains("full video"));
    }
}
