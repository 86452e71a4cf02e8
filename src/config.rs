// SPDX-License-Identifier: GPL-3.0-only

//! Camera and capture configuration types

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backends::camera::ImageSize;
use crate::storage::CloudEncoding;

/// Camera resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Resolution {
    /// 1920x1080
    #[default]
    Hd1080,
    /// 1280x720
    Hd720,
}

impl Resolution {
    /// Native sensor size for this preset
    pub fn size(self) -> ImageSize {
        match self {
            Resolution::Hd1080 => ImageSize {
                width: 1920,
                height: 1080,
            },
            Resolution::Hd720 => ImageSize {
                width: 1280,
                height: 720,
            },
        }
    }
}

/// Depth estimation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum DepthMode {
    /// Fastest, lowest accuracy
    #[default]
    Performance,
    Quality,
    Ultra,
}

/// Unit of depth and point cloud coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum CoordinateUnit {
    #[default]
    Millimeter,
    Meter,
}

impl CoordinateUnit {
    /// Scale factor from millimeters to this unit
    pub fn scale_from_mm(self) -> f32 {
        match self {
            CoordinateUnit::Millimeter => 1.0,
            CoordinateUnit::Meter => 0.001,
        }
    }
}

/// Per-grab sensing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum SensingMode {
    /// Raw depth, occlusions left unfilled
    #[default]
    Standard,
    /// Occlusion-filled depth
    Fill,
}

/// Camera startup configuration.
///
/// Set once before opening the camera; immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    pub resolution: Resolution,
    pub depth_mode: DepthMode,
    pub unit: CoordinateUnit,
    pub sensing_mode: SensingMode,
}

/// Runtime capture settings owned by the orchestrator
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Root directory that per-capture timestamp directories are created under
    pub output_root: PathBuf,
    /// Point cloud file encoding
    pub cloud_encoding: CloudEncoding,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("data"),
            cloud_encoding: CloudEncoding::default(),
        }
    }
}
