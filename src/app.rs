//! Terminal event loop
//!
//! Drives the controller from a preview timer, stdin commands and Ctrl-C.
//! Controller calls may block (frame reads, the stop join), so they run
//! under `block_in_place` on the multi-threaded runtime. Stdin is read on a
//! plain thread: a pending read there never holds up runtime teardown.

use crate::capture;
use crate::config::AppConfig;
use crate::controller::AppController;
use crate::recorder::FfmpegEncoderFactory;
use crate::ui::TerminalUi;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tokio::task::block_in_place;
use tokio::time::MissedTickBehavior;

/// User actions read from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    CapturePhoto,
    ToggleRecording,
    Quit,
}

impl AppCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "p" | "photo" => Some(Self::CapturePhoto),
            "r" | "record" => Some(Self::ToggleRecording),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Input {
    Command(AppCommand),
    Unknown(String),
}

/// Forward lines from `reader` as commands until it ends or the receiver is gone
fn spawn_command_reader<R>(reader: R, tx: mpsc::Sender<Input>) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let input = match AppCommand::parse(&line) {
                    Some(command) => Input::Command(command),
                    None => Input::Unknown(line),
                };
                if tx.blocking_send(input).is_err() {
                    break;
                }
            }
            // Reader exhausted: dropping `tx` ends the event loop
        })
}

/// Open the camera and run until the user quits
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let source = capture::open_source(&config)?;
    let ui = TerminalUi::new(
        config.save_dir.clone(),
        (config.preview_width, config.preview_height),
    );
    let mut controller =
        AppController::new(source, Arc::new(FfmpegEncoderFactory::default()), ui, &config);
    controller.ui().print_help();

    let (tx, mut commands) = mpsc::channel(16);
    spawn_command_reader(BufReader::new(std::io::stdin()), tx)?;

    let mut ticker = tokio::time::interval(config.preview_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                block_in_place(|| controller.preview_tick());
            }
            input = commands.recv() => match input {
                Some(Input::Command(AppCommand::CapturePhoto)) => {
                    if let Err(e) = block_in_place(|| controller.capture_photo()) {
                        tracing::warn!("Photo capture failed: {}", e);
                    }
                }
                Some(Input::Command(AppCommand::ToggleRecording)) => {
                    if let Err(e) = block_in_place(|| controller.toggle_recording()) {
                        tracing::warn!("Toggle recording failed: {}", e);
                    }
                }
                Some(Input::Unknown(line)) => {
                    println!("Unknown command: {line}");
                    controller.ui().print_help();
                }
                Some(Input::Command(AppCommand::Quit)) | None => break,
            },
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    block_in_place(|| controller.shutdown());
    Ok(())
}
