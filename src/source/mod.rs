//! Face detection sources for the enrollment agent.
//!
//! The detection capability is an external collaborator: given a video frame
//! it yields zero or more detections, each carrying a fixed-length numeric
//! descriptor. This module defines the boundary trait plus stand-in
//! implementations used when no camera capability is wired in.

pub mod scripted;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use scripted::ScriptedSource;
pub use synthetic::SyntheticSource;
pub use types::Detection;

/// Errors from a detection source.
#[derive(Debug)]
pub enum SourceError {
    /// The underlying capability could not produce a frame.
    Unavailable(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "detection source unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A detection capability invoked once per capture tick.
///
/// Implementations wrap a real camera/model pipeline or play back recorded
/// frames. Returning an empty vector means no face was visible this tick.
pub trait FaceSource {
    /// Run one detection pass, returning all faces found in the frame.
    fn detect(&mut self) -> Result<Vec<Detection>, SourceError>;
}
