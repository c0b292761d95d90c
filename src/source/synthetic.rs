//! Synthetic detection source.
//!
//! Generates deterministic descriptor frames so the capture loop can run
//! end to end on machines without a camera capability. Every fifth tick
//! yields no detection to exercise the skip path, and every third tick
//! yields two candidate faces with different scores.

use crate::core::Descriptor;
use crate::source::types::Detection;
use crate::source::{FaceSource, SourceError};

/// An endless source of synthetic face detections.
pub struct SyntheticSource {
    descriptor_len: usize,
    tick: u64,
}

impl SyntheticSource {
    /// Create a source producing descriptors of the given length.
    pub fn new(descriptor_len: usize) -> Self {
        Self {
            descriptor_len,
            tick: 0,
        }
    }

    fn descriptor_for(&self, variant: u64) -> Descriptor {
        let t = self.tick as f32 * 0.1 + variant as f32 * 0.37;
        let values = (0..self.descriptor_len)
            .map(|i| (i as f32 * 0.11 + t).sin() * 0.5)
            .collect();
        Descriptor::new(values)
    }
}

impl FaceSource for SyntheticSource {
    fn detect(&mut self) -> Result<Vec<Detection>, SourceError> {
        self.tick += 1;

        if self.tick % 5 == 0 {
            return Ok(Vec::new());
        }

        let mut detections = vec![Detection::with_score(self.descriptor_for(0), 0.9)];
        if self.tick % 3 == 0 {
            detections.push(Detection::with_score(self.descriptor_for(1), 0.6));
        }

        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_length_matches() {
        let mut source = SyntheticSource::new(16);
        let detections = source.detect().unwrap();
        assert_eq!(detections[0].descriptor.len(), 16);
    }

    #[test]
    fn test_every_fifth_tick_is_empty() {
        let mut source = SyntheticSource::new(4);
        let mut empties = 0;
        for _ in 0..10 {
            if source.detect().unwrap().is_empty() {
                empties += 1;
            }
        }
        assert_eq!(empties, 2);
    }

    #[test]
    fn test_multi_face_ticks_carry_scores() {
        let mut source = SyntheticSource::new(4);
        source.detect().unwrap();
        source.detect().unwrap();
        let third = source.detect().unwrap();

        assert_eq!(third.len(), 2);
        assert!(third[0].score.unwrap() > third[1].score.unwrap());
    }
}
