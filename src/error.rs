//! Error types for the host side: audio capture and recordings.
//!
//! The controller itself has no failure modes; everything here comes from
//! the desktop environment it is hosted in.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LineLightError>;

#[derive(Debug, Error)]
pub enum LineLightError {
    /// No capture device matched the selection.
    #[error("no input device selected")]
    NoInputDevice,

    #[error("input device doesn't support {found} samples, expected f32")]
    UnsupportedSampleFormat { found: String },

    #[error("failed to get input config: {0}")]
    InputConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to read recording: {0}")]
    Wav(#[from] hound::Error),

    #[error("recording '{path}' contains no samples")]
    EmptyRecording { path: String },
}
