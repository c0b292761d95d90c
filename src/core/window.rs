//! Sliding-window aggregation of face descriptors.
//!
//! Each detection tick contributes one fixed-length descriptor. The window
//! keeps the most recent N descriptors (FIFO eviction) and produces an
//! element-wise average on demand for enrollment.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Descriptor length produced by the default recognition model.
pub const DEFAULT_DESCRIPTOR_LEN: usize = 128;

/// Number of recent descriptors retained for averaging.
pub const DEFAULT_WINDOW_CAPACITY: usize = 10;

/// A fixed-length face descriptor produced by the recognition capability.
///
/// Immutable once produced; the expected length is fixed per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    values: Vec<f32>,
}

impl Descriptor {
    /// Create a descriptor from raw component values.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the descriptor has no components.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Component values in order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consume the descriptor, yielding its components.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Errors from window operations.
#[derive(Debug, PartialEq, Eq)]
pub enum WindowError {
    /// A pushed descriptor did not match the session's fixed length.
    LengthMismatch { expected: usize, actual: usize },
    /// An average was requested from a window with no descriptors.
    EmptyWindow,
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::LengthMismatch { expected, actual } => {
                write!(f, "descriptor length {actual} does not match expected {expected}")
            }
            WindowError::EmptyWindow => write!(f, "window contains no descriptors"),
        }
    }
}

impl std::error::Error for WindowError {}

/// Bounded FIFO buffer of recent descriptors.
///
/// Pushes arrive one at a time from the capture tick; once the buffer holds
/// `capacity` descriptors, each push evicts the oldest. The average is
/// recomputed fresh on each request rather than maintained incrementally.
#[derive(Debug)]
pub struct DescriptorWindow {
    capacity: usize,
    expected_len: usize,
    frames: VecDeque<Descriptor>,
}

impl DescriptorWindow {
    /// Create an empty window with the given capacity and descriptor length.
    pub fn new(capacity: usize, expected_len: usize) -> Self {
        Self {
            capacity,
            expected_len,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a descriptor, evicting the oldest when over capacity.
    ///
    /// Rejects descriptors whose length differs from the session's fixed
    /// length, leaving the window unchanged.
    pub fn push(&mut self, descriptor: Descriptor) -> Result<(), WindowError> {
        if descriptor.len() != self.expected_len {
            return Err(WindowError::LengthMismatch {
                expected: self.expected_len,
                actual: descriptor.len(),
            });
        }

        self.frames.push_back(descriptor);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }

        Ok(())
    }

    /// Element-wise arithmetic mean over the current window contents.
    pub fn average(&self) -> Result<Descriptor, WindowError> {
        if self.frames.is_empty() {
            return Err(WindowError::EmptyWindow);
        }

        let mut sums = vec![0.0f64; self.expected_len];
        for frame in &self.frames {
            for (sum, value) in sums.iter_mut().zip(frame.values()) {
                *sum += f64::from(*value);
            }
        }

        let count = self.frames.len() as f64;
        let values = sums.iter().map(|sum| (sum / count) as f32).collect();

        Ok(Descriptor::new(values))
    }

    /// Number of descriptors currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check whether the window holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Maximum number of retained descriptors.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The session's fixed descriptor length.
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Descriptors in arrival order, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &Descriptor> {
        self.frames.iter()
    }

    /// Discard all held descriptors.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(values: &[f32]) -> Descriptor {
        Descriptor::new(values.to_vec())
    }

    #[test]
    fn test_average_of_two_descriptors() {
        let mut window = DescriptorWindow::new(10, 3);
        window.push(descriptor(&[1.0, 2.0, 3.0])).unwrap();
        window.push(descriptor(&[3.0, 4.0, 5.0])).unwrap();

        let averaged = window.average().unwrap();
        assert_eq!(averaged.values(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_window_retains_last_n_in_order() {
        let mut window = DescriptorWindow::new(3, 1);
        for i in 0..7 {
            window.push(descriptor(&[i as f32])).unwrap();
        }

        assert_eq!(window.len(), 3);
        let retained: Vec<f32> = window.frames().map(|d| d.values()[0]).collect();
        assert_eq!(retained, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_empty_window_average_fails() {
        let window = DescriptorWindow::new(10, 128);
        assert_eq!(window.average(), Err(WindowError::EmptyWindow));
    }

    #[test]
    fn test_length_mismatch_rejected_without_mutation() {
        let mut window = DescriptorWindow::new(10, 3);
        window.push(descriptor(&[1.0, 2.0, 3.0])).unwrap();

        let result = window.push(descriptor(&[1.0, 2.0]));
        assert_eq!(
            result,
            Err(WindowError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );

        assert_eq!(window.len(), 1);
        assert_eq!(window.average().unwrap().values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_average_is_idempotent() {
        let mut window = DescriptorWindow::new(10, 2);
        window.push(descriptor(&[0.5, -0.5])).unwrap();
        window.push(descriptor(&[1.5, 0.5])).unwrap();

        let first = window.average().unwrap();
        let second = window.average().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_eviction_is_single_per_push() {
        let mut window = DescriptorWindow::new(2, 1);
        window.push(descriptor(&[1.0])).unwrap();
        window.push(descriptor(&[2.0])).unwrap();
        window.push(descriptor(&[3.0])).unwrap();

        let retained: Vec<f32> = window.frames().map(|d| d.values()[0]).collect();
        assert_eq!(retained, vec![2.0, 3.0]);
    }

    #[test]
    fn test_clear_empties_window() {
        let mut window = DescriptorWindow::new(10, 1);
        window.push(descriptor(&[1.0])).unwrap();
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.average(), Err(WindowError::EmptyWindow));
    }
}
