//! Demonstration of the descriptor capture pipeline.
//!
//! This example shows how to:
//! 1. Create a detection source
//! 2. Drive the capture loop tick by tick
//! 3. Read the averaged descriptor and its scalar encoding
//! 4. Inspect the session store at the end
//!
//! Run with: cargo run --example enroll_demo

use face_enroll_agent::capture::{CaptureLoop, TickOutcome};
use face_enroll_agent::source::SyntheticSource;
use face_enroll_agent::store::create_shared_store;

const DESCRIPTOR_LEN: usize = 128;
const WINDOW_CAPACITY: usize = 10;
const TICKS: usize = 15;

fn main() {
    println!("Face Enroll Agent - Capture Demo");
    println!("================================");
    println!();
    println!("Descriptor length: {DESCRIPTOR_LEN}");
    println!("Window capacity: {WINDOW_CAPACITY}");
    println!();

    let store = create_shared_store();
    let source = SyntheticSource::new(DESCRIPTOR_LEN);
    let mut capture =
        CaptureLoop::new(source, WINDOW_CAPACITY, DESCRIPTOR_LEN).with_store(store.clone());

    println!("Running {TICKS} detection ticks...");
    println!();

    for tick in 1..=TICKS {
        match capture.tick() {
            Ok(TickOutcome::Captured(snapshot)) => {
                println!(
                    "  Tick {tick:2}: captured  window={:2}  scalar={:.6}",
                    snapshot.window_len, snapshot.scalar
                );
            }
            Ok(TickOutcome::NoDetection) => {
                println!("  Tick {tick:2}: no face detected, window unchanged");
            }
            Err(e) => {
                eprintln!("  Tick {tick:2}: failed: {e}");
            }
        }
    }

    println!();

    match capture.latest() {
        Some(snapshot) => {
            println!("=== Final Snapshot ===");
            println!("  Captured at: {}", snapshot.captured_at.format("%H:%M:%S"));
            println!("  Window length: {}", snapshot.window_len);
            println!("  Scalar encoding: {:.6}", snapshot.scalar);

            let values = snapshot.averaged.values();
            println!(
                "  Averaged descriptor (first 8 of {}): {:?}",
                values.len(),
                &values[..8.min(values.len())]
            );

            let payload = serde_json::to_string(values).unwrap();
            println!("  Relay payload size: {} bytes", payload.len());
        }
        None => {
            println!("No snapshot captured.");
        }
    }

    println!();
    println!("{}", store.summary());
    println!();
    println!("Demo complete!");
}
