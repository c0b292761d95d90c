//! Capture loop driving the descriptor pipeline.
//!
//! One tick runs one detection pass. The best detection is pushed into the
//! sliding window, then the average and its scalar encoding are recomputed
//! and published as a single snapshot for the next user-triggered send.
//! Ticks run synchronously on the driving thread, so a tick can never
//! overlap a previous one.

use crate::core::{encode, Descriptor, DescriptorWindow, EncodeError, WindowError};
use crate::source::{Detection, FaceSource, SourceError};
use crate::store::SharedSessionStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// The averaged descriptor and its scalar encoding, cached for sending.
///
/// Both fields are computed before the snapshot is published, so a reader
/// always observes a consistent pair.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorSnapshot {
    /// Element-wise mean over the current window
    pub averaged: Descriptor,
    /// Absolute component mean of the averaged descriptor
    pub scalar: f64,
    /// When the snapshot was computed
    pub captured_at: DateTime<Utc>,
    /// Number of descriptors contributing to the average
    pub window_len: usize,
}

/// Shared handle to the most recent snapshot.
pub type SharedSnapshot = Arc<Mutex<Option<DescriptorSnapshot>>>;

/// Result of a single capture tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// A face was detected and a fresh snapshot was published.
    Captured(DescriptorSnapshot),
    /// No face was visible; the window is unchanged.
    NoDetection,
}

/// Errors from a capture tick.
#[derive(Debug)]
pub enum CaptureError {
    Source(SourceError),
    Window(WindowError),
    Encode(EncodeError),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Source(e) => write!(f, "detection failed: {e}"),
            CaptureError::Window(e) => write!(f, "window update failed: {e}"),
            CaptureError::Encode(e) => write!(f, "scalar encoding failed: {e}"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<SourceError> for CaptureError {
    fn from(e: SourceError) -> Self {
        CaptureError::Source(e)
    }
}

impl From<WindowError> for CaptureError {
    fn from(e: WindowError) -> Self {
        CaptureError::Window(e)
    }
}

impl From<EncodeError> for CaptureError {
    fn from(e: EncodeError) -> Self {
        CaptureError::Encode(e)
    }
}

/// Drives one detection source through the window/encoder pipeline.
pub struct CaptureLoop<S: FaceSource> {
    source: S,
    window: DescriptorWindow,
    snapshot: SharedSnapshot,
    store: Option<SharedSessionStore>,
}

impl<S: FaceSource> CaptureLoop<S> {
    /// Create a capture loop over a source.
    pub fn new(source: S, window_capacity: usize, descriptor_len: usize) -> Self {
        Self {
            source,
            window: DescriptorWindow::new(window_capacity, descriptor_len),
            snapshot: Arc::new(Mutex::new(None)),
            store: None,
        }
    }

    /// Attach a session store updated on every successful capture.
    pub fn with_store(mut self, store: SharedSessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Shared handle to the cached snapshot for concurrent readers.
    pub fn snapshot_handle(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    /// The most recently published snapshot, if any tick has captured one.
    pub fn latest(&self) -> Option<DescriptorSnapshot> {
        self.snapshot
            .lock()
            .expect("snapshot lock poisoned")
            .clone()
    }

    /// Current window state.
    pub fn window(&self) -> &DescriptorWindow {
        &self.window
    }

    /// Run one detection cycle.
    ///
    /// A failed push leaves the window unchanged; a tick with no detection
    /// skips the cycle entirely.
    pub fn tick(&mut self) -> Result<TickOutcome, CaptureError> {
        let detections = self.source.detect()?;
        let Some(detection) = best_detection(detections) else {
            return Ok(TickOutcome::NoDetection);
        };

        self.window.push(detection.descriptor)?;

        let averaged = self.window.average()?;
        let scalar = encode(averaged.values())?;

        let snapshot = DescriptorSnapshot {
            averaged,
            scalar,
            captured_at: Utc::now(),
            window_len: self.window.len(),
        };

        // Publish only after both derived values exist.
        *self.snapshot.lock().expect("snapshot lock poisoned") = Some(snapshot.clone());

        if let Some(ref store) = self.store {
            store.record_capture(snapshot.averaged.clone(), snapshot.scalar);
        }

        Ok(TickOutcome::Captured(snapshot))
    }
}

/// Pick the detection to enroll when a frame contains several faces.
///
/// The highest-scoring detection wins; unscored detections rank lowest and
/// ties keep the earliest.
fn best_detection(detections: Vec<Detection>) -> Option<Detection> {
    let mut best: Option<Detection> = None;
    for detection in detections {
        let replaces = match &best {
            None => true,
            Some(current) => {
                detection.score.unwrap_or(0.0) > current.score.unwrap_or(0.0)
            }
        };
        if replaces {
            best = Some(detection);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use crate::store::create_shared_store;

    #[test]
    fn test_tick_captures_and_publishes() {
        let source = ScriptedSource::from_descriptors(vec![vec![1.0, 2.0, 3.0]]);
        let mut capture = CaptureLoop::new(source, 10, 3);

        let outcome = capture.tick().unwrap();
        match outcome {
            TickOutcome::Captured(snapshot) => {
                assert_eq!(snapshot.averaged.values(), &[1.0, 2.0, 3.0]);
                assert_eq!(snapshot.scalar, 2.0);
                assert_eq!(snapshot.window_len, 1);
            }
            TickOutcome::NoDetection => panic!("expected a capture"),
        }

        assert!(capture.latest().is_some());
    }

    #[test]
    fn test_empty_frame_skips_cycle() {
        let source = ScriptedSource::new(vec![vec![]]);
        let mut capture = CaptureLoop::new(source, 10, 3);

        assert!(matches!(capture.tick().unwrap(), TickOutcome::NoDetection));
        assert!(capture.window().is_empty());
        assert!(capture.latest().is_none());
    }

    #[test]
    fn test_snapshot_averages_across_ticks() {
        let source =
            ScriptedSource::from_descriptors(vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]]);
        let mut capture = CaptureLoop::new(source, 10, 3);

        capture.tick().unwrap();
        capture.tick().unwrap();

        let snapshot = capture.latest().unwrap();
        assert_eq!(snapshot.averaged.values(), &[2.0, 3.0, 4.0]);
        assert_eq!(snapshot.scalar, 3.0);
        assert_eq!(snapshot.window_len, 2);
    }

    #[test]
    fn test_mismatched_descriptor_surfaces_and_keeps_snapshot() {
        let source =
            ScriptedSource::from_descriptors(vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]);
        let mut capture = CaptureLoop::new(source, 10, 3);

        capture.tick().unwrap();
        let err = capture.tick().unwrap_err();
        assert!(matches!(err, CaptureError::Window(WindowError::LengthMismatch { .. })));

        // Window and cached snapshot are untouched by the rejected push.
        assert_eq!(capture.window().len(), 1);
        assert_eq!(capture.latest().unwrap().averaged.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_highest_scoring_face_is_enrolled() {
        let frame = vec![
            Detection::with_score(Descriptor::new(vec![0.0, 0.0]), 0.4),
            Detection::with_score(Descriptor::new(vec![1.0, 1.0]), 0.9),
        ];
        let source = ScriptedSource::new(vec![frame]);
        let mut capture = CaptureLoop::new(source, 10, 2);

        capture.tick().unwrap();
        assert_eq!(capture.latest().unwrap().averaged.values(), &[1.0, 1.0]);
    }

    #[test]
    fn test_store_receives_captures() {
        let store = create_shared_store();
        let source = ScriptedSource::from_descriptors(vec![vec![2.0, 4.0]]);
        let mut capture = CaptureLoop::new(source, 10, 2).with_store(store.clone());

        capture.tick().unwrap();

        let (saved, scalar) = store.saved().unwrap();
        assert_eq!(saved.values(), &[2.0, 4.0]);
        assert_eq!(scalar, 3.0);
    }
}
