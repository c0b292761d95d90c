//! Detection types produced by a face source.

use crate::core::Descriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single face detection carrying its recognition descriptor.
///
/// The detection capability itself (camera, landmark and recognition models)
/// is opaque to this crate; only the descriptor and an optional detection
/// score cross the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Timestamp when the detection occurred
    pub timestamp: DateTime<Utc>,
    /// Fixed-length recognition descriptor for the detected face
    pub descriptor: Descriptor,
    /// Detection confidence reported by the capability, when available
    pub score: Option<f64>,
}

impl Detection {
    /// Create a detection stamped with the current time.
    pub fn new(descriptor: Descriptor) -> Self {
        Self {
            timestamp: Utc::now(),
            descriptor,
            score: None,
        }
    }

    /// Create a detection with a confidence score.
    pub fn with_score(descriptor: Descriptor, score: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            descriptor,
            score: Some(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_creation() {
        let detection = Detection::new(Descriptor::new(vec![0.1, 0.2]));
        assert_eq!(detection.descriptor.len(), 2);
        assert!(detection.score.is_none());
    }

    #[test]
    fn test_detection_with_score() {
        let detection = Detection::with_score(Descriptor::new(vec![0.1]), 0.92);
        assert_eq!(detection.score, Some(0.92));
    }
}
