//! Face Enroll Agent - descriptor capture and relay for a demo sign-up flow.
//!
//! This library captures face descriptors from a detection capability,
//! averages them over a short sliding window, encodes the average as one
//! transmissible scalar, and relays the result to a sign-up server over a
//! WebSocket connection. The server half is a thin static-file host plus
//! an echo WebSocket endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Face Enroll Agent                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Source    │──▶│   Window    │──▶│   Encoder   │       │
//! │  │ (detection) │   │ (last 10)   │   │  (scalar)   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │   Session   │◀────────────────────│    Relay    │       │
//! │  │    Store    │      echoes         │ (WebSocket) │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use face_enroll_agent::capture::CaptureLoop;
//! use face_enroll_agent::source::ScriptedSource;
//!
//! let source = ScriptedSource::from_descriptors(vec![vec![0.0; 128]]);
//! let mut capture = CaptureLoop::new(source, 10, 128);
//!
//! // One detection cycle: push, average, encode, publish.
//! capture.tick().expect("tick failed");
//! ```

pub mod capture;
pub mod config;
pub mod core;
pub mod relay;
pub mod server;
pub mod source;
pub mod store;

// Re-export key types at crate root for convenience
pub use capture::{CaptureError, CaptureLoop, DescriptorSnapshot, TickOutcome};
pub use config::Config;
pub use core::{encode, Descriptor, DescriptorWindow, EncodeError, WindowError};
pub use relay::{BlockingRelayClient, RelayClient, RelayConfig, RelayError};
pub use server::{ServerConfig, ECHO_PREFIX};
pub use source::{Detection, FaceSource, ScriptedSource, SourceError, SyntheticSource};
pub use store::{SessionStore, SharedSessionStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
