//! Session-scoped store for captured descriptors and relay traffic.
//!
//! The store is created empty at session start and updated by the capture
//! loop and the relay. Session end either discards it or persists it to a
//! JSON document. The received-message list keeps only the most recent
//! entries, oldest evicted first.

use crate::core::Descriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Maximum number of retained relay messages.
pub const MAX_RECEIVED_MESSAGES: usize = 100;

#[derive(Debug, Default)]
struct SessionData {
    saved_descriptor: Option<Descriptor>,
    saved_scalar: Option<f64>,
    received_messages: VecDeque<String>,
    captures: u64,
    sends: u64,
    received_total: u64,
}

/// Mutable session state shared between the capture loop and the CLI.
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<SessionData>,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl SessionStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionData::default()),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a store backed by a JSON document on disk.
    pub fn with_persistence(path: PathBuf) -> Self {
        let store = Self {
            inner: Mutex::new(SessionData::default()),
            session_start: Utc::now(),
            persist_path: Some(path),
        };

        if let Err(e) = store.load() {
            eprintln!("Note: Could not load previous session data: {e}");
        }

        store
    }

    /// Record a successful capture: the averaged descriptor and its scalar.
    pub fn record_capture(&self, descriptor: Descriptor, scalar: f64) {
        let mut data = self.lock();
        data.saved_descriptor = Some(descriptor);
        data.saved_scalar = Some(scalar);
        data.captures += 1;
    }

    /// The last saved averaged descriptor with its scalar encoding.
    pub fn saved(&self) -> Option<(Descriptor, f64)> {
        let data = self.lock();
        match (&data.saved_descriptor, data.saved_scalar) {
            (Some(descriptor), Some(scalar)) => Some((descriptor.clone(), scalar)),
            _ => None,
        }
    }

    /// Record that the saved descriptor was sent over the relay.
    pub fn record_send(&self) {
        self.lock().sends += 1;
    }

    /// Append a message received from the relay, evicting the oldest once
    /// the retention cap is reached.
    pub fn record_received(&self, message: String) {
        let mut data = self.lock();
        data.received_messages.push_back(message);
        data.received_total += 1;
        while data.received_messages.len() > MAX_RECEIVED_MESSAGES {
            data.received_messages.pop_front();
        }
    }

    /// Retained relay messages, oldest first.
    pub fn received_messages(&self) -> Vec<String> {
        self.lock().received_messages.iter().cloned().collect()
    }

    /// Get the current statistics.
    pub fn stats(&self) -> SessionStats {
        let data = self.lock();
        SessionStats {
            captures: data.captures,
            sends: data.sends,
            received_total: data.received_total,
            received_retained: data.received_messages.len(),
            has_saved_descriptor: data.saved_descriptor.is_some(),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Descriptors captured: {}\n\
             - Descriptors sent: {}\n\
             - Relay messages received: {} ({} retained)\n\
             - Saved descriptor present: {}\n\
             - Session duration: {} seconds",
            stats.captures,
            stats.sends,
            stats.received_total,
            stats.received_retained,
            if stats.has_saved_descriptor { "yes" } else { "no" },
            stats.session_duration_secs
        )
    }

    /// Save the session to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let data = self.lock();
            let persisted = PersistedSession {
                saved_descriptor: data.saved_descriptor.clone(),
                saved_scalar: data.saved_scalar,
                received_messages: data.received_messages.iter().cloned().collect(),
                captures: data.captures,
                sends: data.sends,
                received_total: data.received_total,
                last_updated: Utc::now(),
            };
            drop(data);

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load a persisted session from disk.
    fn load(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedSession =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                let mut data = self.lock();
                data.saved_descriptor = persisted.saved_descriptor;
                data.saved_scalar = persisted.saved_scalar;
                data.received_messages = persisted.received_messages.into();
                data.captures = persisted.captures;
                data.sends = persisted.sends;
                data.received_total = persisted.received_total;
            }
        }
        Ok(())
    }

    /// Discard all session state.
    pub fn clear(&self) {
        *self.lock() = SessionData::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionData> {
        self.inner.lock().expect("session store lock poisoned")
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub captures: u64,
    pub sends: u64,
    pub received_total: u64,
    pub received_retained: usize,
    pub has_saved_descriptor: bool,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Session format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    saved_descriptor: Option<Descriptor>,
    saved_scalar: Option<f64>,
    received_messages: Vec<String>,
    captures: u64,
    sends: u64,
    received_total: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared session store.
pub type SharedSessionStore = Arc<SessionStore>;

/// Create a new shared session store.
pub fn create_shared_store() -> SharedSessionStore {
    Arc::new(SessionStore::new())
}

/// Create a new shared session store with persistence.
pub fn create_shared_store_with_persistence(path: PathBuf) -> SharedSessionStore {
    Arc::new(SessionStore::with_persistence(path))
}
