//! Error types for reelsmith
//!
//! The caption and background modules only ever produce the first three
//! variants; everything else comes from the collaborators that talk to the
//! network, to ffmpeg or to the filesystem.

use thiserror::Error;

/// Errors surfaced by the library
#[derive(Debug, Error)]
pub enum ReelError {
    /// Transcript JSON does not have the expected segment/word shape
    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    /// The background clip pool is empty
    #[error("No background clip candidates found")]
    NoCandidatesFound,

    /// Candidates exist but none has a usable measured duration
    #[error("No valid background clip: all {0} duration probes failed")]
    NoValidClip(usize),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote API answered with an error status
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    #[error("Video processing error: {0}")]
    VideoProcessing(String),

    /// Required external executable is not on PATH
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),
}

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, ReelError>;
