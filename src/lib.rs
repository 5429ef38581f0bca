//! Camera Recorder - live camera preview, still capture and video recording.
//!
//! This is the main library crate. The binary in `main.rs` wires it to a
//! headless terminal front end.

pub mod app;
pub mod capture;
pub mod config;
pub mod controller;
pub mod preview;
pub mod recorder;
pub mod storage;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod testing;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camera_recorder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Camera Recorder v{}", env!("CARGO_PKG_VERSION"));
}
