// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use depth_capture::app::CaptureApp;
use depth_capture::backends::camera::SyntheticCamera;
use depth_capture::errors::AppError;
use depth_capture::config::{
    CameraConfig, CaptureSettings, CoordinateUnit, DepthMode, Resolution, SensingMode,
};
use depth_capture::storage::CloudEncoding;
use depth_capture::ui::TerminalUi;

#[derive(Parser)]
#[command(name = "depth-capture")]
#[command(about = "Object capture utility for stereo depth cameras")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Directory that per-capture timestamp directories are created under
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Camera resolution preset
    #[arg(long, value_enum, default_value = "hd1080")]
    resolution: Resolution,

    /// Depth estimation mode
    #[arg(long, value_enum, default_value = "performance")]
    depth_mode: DepthMode,

    /// Unit of depth and point cloud coordinates
    #[arg(long, value_enum, default_value = "millimeter")]
    unit: CoordinateUnit,

    /// Per-grab sensing mode
    #[arg(long, value_enum, default_value = "standard")]
    sensing_mode: SensingMode,

    /// Write the point cloud as ASCII PLY instead of binary
    #[arg(long)]
    ascii_cloud: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let config = CameraConfig {
        resolution: cli.resolution,
        depth_mode: cli.depth_mode,
        unit: cli.unit,
        sensing_mode: cli.sensing_mode,
    };
    let settings = CaptureSettings {
        output_root: cli.output,
        cloud_encoding: if cli.ascii_cloud {
            CloudEncoding::Ascii
        } else {
            CloudEncoding::Binary
        },
    };

    // A camera that fails to open is fatal; no window is created
    let camera = match SyntheticCamera::open(&config) {
        Ok(camera) => camera,
        Err(e) => {
            error!(error = %e, "Camera could not be opened");
            return Err(AppError::Camera(e).into());
        }
    };

    let ui = TerminalUi::new()?;
    CaptureApp::new(camera, ui, settings).run()?;

    Ok(())
}
