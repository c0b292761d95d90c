//! Core descriptor pipeline for the enrollment agent.
//!
//! This module contains:
//! - Sliding-window aggregation of face descriptors
//! - Scalar encoding of the averaged descriptor for transmission

pub mod encoder;
pub mod window;

// Re-export commonly used types
pub use encoder::{encode, EncodeError};
pub use window::{
    Descriptor, DescriptorWindow, WindowError, DEFAULT_DESCRIPTOR_LEN, DEFAULT_WINDOW_CAPACITY,
};
