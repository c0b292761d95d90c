//! Face Enroll Agent CLI
//!
//! Captures face descriptors, averages them over a sliding window, and
//! relays the result to the sign-up server.

use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use face_enroll_agent::{
    capture::{CaptureLoop, TickOutcome},
    config::Config,
    relay::BlockingRelayClient,
    server::{self, ServerConfig},
    source::SyntheticSource,
    store::{create_shared_store_with_persistence, SessionStore, SharedSessionStore},
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "face-enroll")]
#[command(version = VERSION)]
#[command(about = "Face descriptor capture and relay for a demo sign-up flow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture loop; press Enter to send, q to quit
    Capture {
        /// Send captured descriptors to the relay endpoint
        #[arg(long)]
        relay: bool,

        /// Relay host (overrides config)
        #[arg(long)]
        relay_host: Option<String>,

        /// Relay port (overrides config)
        #[arg(long)]
        relay_port: Option<u16>,

        /// Detection tick period in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many detection ticks
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Run the sign-up server (static pages + relay WebSocket)
    Serve {
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Directory with the sign-up pages (overrides config)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Directory with the recognition model files (overrides config)
        #[arg(long)]
        models_dir: Option<PathBuf>,
    },

    /// Show the persisted session summary
    Status,

    /// Show configuration
    Config,
}

/// Commands typed by the user while the capture loop runs.
enum UserCommand {
    Send,
    Quit,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Capture {
            relay,
            relay_host,
            relay_port,
            interval_ms,
            ticks,
        } => {
            cmd_capture(relay, relay_host, relay_port, interval_ms, ticks);
        }
        Commands::Serve {
            port,
            static_dir,
            models_dir,
        } => {
            cmd_serve(port, static_dir, models_dir);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_capture(
    relay_enabled: bool,
    relay_host: Option<String>,
    relay_port: Option<u16>,
    interval_ms: Option<u64>,
    tick_limit: Option<u64>,
) {
    println!("Face Enroll Agent v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or(config.capture_interval);

    println!("Starting capture...");
    println!("  Detection interval: {}ms", interval.as_millis());
    println!("  Window capacity: {}", config.window_capacity);
    println!("  Descriptor length: {}", config.descriptor_len);

    // Connect the relay if requested; capture continues without it on failure.
    let mut relay_client = if relay_enabled {
        let mut relay_config = config.relay.clone();
        if let Some(host) = relay_host {
            relay_config.host = host;
        }
        if let Some(port) = relay_port {
            relay_config.port = port;
        }

        match BlockingRelayClient::connect(&relay_config) {
            Ok(client) => {
                println!("  Relay: connected to {}", relay_config.url());
                println!("  Client ID: {}", client.client_id());
                Some(client)
            }
            Err(e) => {
                eprintln!("Warning: Relay connection failed: {e}");
                eprintln!("Continuing without relay.");
                None
            }
        }
    } else {
        println!("  Relay: disabled");
        None
    };

    println!();
    println!("No camera capability wired in; using the synthetic source.");
    println!("Press Enter to send the current descriptor, q + Enter or Ctrl+C to stop.");
    println!();

    let store = create_shared_store_with_persistence(config.session_path());

    let source = SyntheticSource::new(config.descriptor_len);
    let mut capture = CaptureLoop::new(source, config.window_capacity, config.descriptor_len)
        .with_store(store.clone());

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    // Stdin reader feeding user commands into the main loop.
    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<UserCommand>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let command = if line.trim().eq_ignore_ascii_case("q") {
                        UserCommand::Quit
                    } else {
                        UserCommand::Send
                    };
                    let quit = matches!(command, UserCommand::Quit);
                    if cmd_tx.send(command).is_err() || quit {
                        break;
                    }
                }
            }
        }
    });

    // Main event loop
    let mut last_tick = Instant::now();
    let mut ticks_done: u64 = 0;

    while running.load(Ordering::SeqCst) {
        match cmd_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(UserCommand::Send) => {
                send_current(&capture, &store, &mut relay_client);
            }
            Ok(UserCommand::Quit) => {
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Stdin closed; keep ticking until cancelled.
            }
        }

        if last_tick.elapsed() >= interval {
            match capture.tick() {
                Ok(TickOutcome::Captured(snapshot)) => {
                    println!(
                        "[{}] Face detected: window={} scalar={:.6}",
                        snapshot.captured_at.format("%H:%M:%S"),
                        snapshot.window_len,
                        snapshot.scalar
                    );
                }
                Ok(TickOutcome::NoDetection) => {
                    println!("[tick] No face detected");
                }
                Err(e) => {
                    eprintln!("Capture tick failed: {e}");
                }
            }

            last_tick = Instant::now();
            ticks_done += 1;

            if let Some(limit) = tick_limit {
                if ticks_done >= limit {
                    break;
                }
            }
        }
    }

    // Shut down
    println!();
    println!("Stopping capture...");

    if let Some(client) = relay_client {
        if let Err(e) = client.close() {
            eprintln!("Warning: Relay close failed: {e}");
        }
    }

    if let Err(e) = store.save() {
        eprintln!("Warning: Could not save session data: {e}");
    }

    println!();
    println!("{}", store.summary());
}

/// Send the cached averaged descriptor over the relay.
fn send_current(
    capture: &CaptureLoop<SyntheticSource>,
    store: &SharedSessionStore,
    relay_client: &mut Option<BlockingRelayClient>,
) {
    let Some(snapshot) = capture.latest() else {
        println!("No descriptor captured yet; nothing to send.");
        return;
    };

    match relay_client {
        Some(client) => match client.send_descriptor(&snapshot.averaged) {
            Ok(echo) => {
                store.record_send();
                store.record_received(echo.clone());
                println!("[relay] {echo}");
            }
            Err(e) => {
                eprintln!("Relay send failed: {e}");
            }
        },
        None => {
            println!(
                "Relay disabled; current scalar is {:.6} over {} descriptors.",
                snapshot.scalar, snapshot.window_len
            );
        }
    }
}

fn cmd_serve(port: Option<u16>, static_dir: Option<PathBuf>, models_dir: Option<PathBuf>) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load().unwrap_or_default();
    let server_config = ServerConfig::new(
        port.unwrap_or(config.server.port),
        static_dir.unwrap_or(config.server.static_path),
        models_dir.unwrap_or(config.server.models_path),
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error creating runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve_until_interrupted(server_config)) {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn serve_until_interrupted(config: ServerConfig) -> anyhow::Result<()> {
    let (addr, shutdown_tx) = server::run(config).await?;

    println!("Sign-up server running at http://{addr}");
    println!("Relay endpoint at ws://{addr}/ws");
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    println!();
    println!("Shutting down...");
    let _ = shutdown_tx.send(());

    Ok(())
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();
    let session_path = config.session_path();

    println!("Face Enroll Agent Status");
    println!("========================");
    println!();

    if session_path.exists() {
        let store = SessionStore::with_persistence(session_path);
        println!("{}", store.summary());

        let received = store.received_messages();
        if !received.is_empty() {
            println!();
            println!("Recent relay messages:");
            for (i, msg) in received.iter().rev().take(5).enumerate() {
                println!("  {}: {}", i + 1, msg);
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
