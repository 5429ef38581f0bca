//! Camera Recorder command-line entry point

use camera_recorder::config::{AppConfig, SourceKind};
use clap::Parser;
use std::path::PathBuf;

/// Camera Recorder - preview a camera, save stills, record clips
#[derive(Parser, Debug)]
#[command(name = "camera-recorder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Camera index to open
    #[arg(short, long, default_value_t = 0)]
    device: u32,

    /// Capture backend
    #[arg(long, value_enum, default_value_t = SourceKind::default())]
    source: SourceKind,

    /// Directory used whenever a save location is requested (omit to cancel saves)
    #[arg(short, long)]
    save_dir: Option<PathBuf>,

    /// Directory for in-progress recordings
    #[arg(long, default_value = ".")]
    working_dir: PathBuf,

    /// Preview refresh period in milliseconds
    #[arg(long, default_value_t = 30)]
    preview_interval_ms: u64,

    /// Disable the horizontal preview mirror
    #[arg(long)]
    no_mirror: bool,

    /// List cameras and exit
    #[arg(long)]
    list_cameras: bool,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            device_index: cli.device,
            source: cli.source,
            save_dir: cli.save_dir,
            working_dir: cli.working_dir,
            preview_interval_ms: cli.preview_interval_ms,
            mirror_preview: !cli.no_mirror,
            ..AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    camera_recorder::init_tracing();

    if cli.list_cameras {
        let cameras = camera_recorder::capture::list_cameras();
        if cameras.is_empty() {
            println!("No cameras found");
        }
        for camera in cameras {
            println!("{}\t{}", camera.id, camera.name);
        }
        return Ok(());
    }

    camera_recorder::app::run(AppConfig::from(cli)).await
}
