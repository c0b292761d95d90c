//! Scripted playback source for tests and demos.

use crate::core::Descriptor;
use crate::source::types::Detection;
use crate::source::{FaceSource, SourceError};
use std::collections::VecDeque;

/// A source that plays back a fixed sequence of frames.
///
/// Each call to `detect` consumes the next scripted frame; once the script
/// is exhausted every further tick reports no detections.
pub struct ScriptedSource {
    frames: VecDeque<Vec<Detection>>,
}

impl ScriptedSource {
    /// Create a source from explicit per-tick detection frames.
    pub fn new(frames: Vec<Vec<Detection>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Create a source yielding one unscored detection per frame.
    pub fn from_descriptors(descriptors: Vec<Vec<f32>>) -> Self {
        let frames = descriptors
            .into_iter()
            .map(|values| vec![Detection::new(Descriptor::new(values))])
            .collect();
        Self::new(frames)
    }

    /// Number of scripted frames remaining.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FaceSource for ScriptedSource {
    fn detect(&mut self) -> Result<Vec<Detection>, SourceError> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_playback_order() {
        let mut source =
            ScriptedSource::from_descriptors(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        let first = source.detect().unwrap();
        assert_eq!(first[0].descriptor.values(), &[1.0, 2.0]);

        let second = source.detect().unwrap();
        assert_eq!(second[0].descriptor.values(), &[3.0, 4.0]);
    }

    #[test]
    fn test_exhausted_script_reports_no_detections() {
        let mut source = ScriptedSource::from_descriptors(vec![vec![1.0]]);
        source.detect().unwrap();

        assert!(source.detect().unwrap().is_empty());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_empty_frames_are_preserved() {
        let detection = Detection::new(Descriptor::new(vec![1.0]));
        let mut source = ScriptedSource::new(vec![vec![], vec![detection]]);

        assert!(source.detect().unwrap().is_empty());
        assert_eq!(source.detect().unwrap().len(), 1);
    }
}
