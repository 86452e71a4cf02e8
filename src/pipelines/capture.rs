// SPDX-License-Identifier: GPL-3.0-only

//! One user-triggered capture: a fresh acquisition, the sensor snapshot, and
//! the per-artifact writes into a timestamped directory.
//!
//! The capture path grabs and retrieves on its own, independent of the
//! preview loop, so the persisted frame is never the downscaled preview.
//! Artifact writes are independent of each other; failures are logged and
//! reported in the summary, and the remaining artifacts are still attempted.

use chrono::Local;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use crate::backends::camera::{CameraError, DepthCamera, TimeReference, View};
use crate::config::CaptureSettings;
use crate::constants::files;
use crate::sensors::{SensorSnapshot, format_vec3, format_vec4};
use crate::storage;

/// User-supplied object dimensions in centimeters.
///
/// Only parseability is validated; sign and magnitude are recorded as
/// entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectDimensions {
    pub height: f64,
    pub width: f64,
    pub length: f64,
}

impl ObjectDimensions {
    /// Parse the three raw field texts. Fails on the first non-numeric field.
    pub fn parse(height: &str, width: &str, length: &str) -> Result<Self, DimensionParseError> {
        Ok(Self {
            height: parse_field("height", height)?,
            width: parse_field("width", width)?,
            length: parse_field("length", length)?,
        })
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, DimensionParseError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DimensionParseError {
            field,
            value: raw.to_string(),
        })
}

/// A dimension field that did not parse as a real number
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionParseError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for DimensionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field is not numeric: {:?}", self.field, self.value)
    }
}

impl std::error::Error for DimensionParseError {}

/// Errors that abort a capture before any artifact is attempted
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Acquisition failed; nothing was written
    Camera(CameraError),
    /// The capture directory could not be created
    CreateDir { path: PathBuf, reason: String },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Camera(e) => write!(f, "acquisition failed: {}", e),
            CaptureError::CreateDir { path, reason } => {
                write!(f, "failed to create {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<CameraError> for CaptureError {
    fn from(err: CameraError) -> Self {
        CaptureError::Camera(err)
    }
}

/// Outcome of one capture: where it went and which artifacts failed
#[derive(Debug, Clone)]
pub struct CaptureSummary {
    pub dir: PathBuf,
    pub failed: Vec<&'static str>,
}

impl CaptureSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run one full capture: grab, retrieve all artifacts at native resolution,
/// create the timestamp directory, and write each artifact independently.
pub fn capture_record<C: DepthCamera>(
    camera: &mut C,
    dims: &ObjectDimensions,
    settings: &CaptureSettings,
) -> Result<CaptureSummary, CaptureError> {
    camera.grab()?;
    let native = camera.resolution();
    let rgb = camera.retrieve_image(View::Left, native)?;
    let depth = camera.retrieve_image(View::Depth, native)?;
    let cloud = camera.retrieve_point_cloud()?;
    let bundle = camera.retrieve_sensors(TimeReference::Image)?;
    let snapshot = SensorSnapshot::from_bundle(&bundle);

    info!(
        orientation = %format_vec4(snapshot.orientation),
        acceleration = %format_vec3(snapshot.acceleration),
        angular_velocity = %format_vec3(snapshot.angular_velocity),
        magnetic_field = %format_vec3(snapshot.magnetic_field),
        pressure = snapshot.pressure,
        "Sensor snapshot"
    );

    let dir = storage::capture_dir(&settings.output_root, Local::now());
    fs::create_dir_all(&dir).map_err(|e| CaptureError::CreateDir {
        path: dir.clone(),
        reason: e.to_string(),
    })?;

    let mut failed = Vec::new();
    let results: [(&'static str, Result<PathBuf, String>); 5] = [
        (
            files::RGB_IMAGE,
            storage::save_image(files::RGB_IMAGE, &rgb, &dir),
        ),
        (
            files::DEPTH_IMAGE,
            storage::save_image(files::DEPTH_IMAGE, &depth, &dir),
        ),
        (
            files::POINT_CLOUD,
            storage::save_point_cloud(&cloud, &dir, settings.cloud_encoding),
        ),
        (
            files::SENSOR_RECORD,
            storage::save_sensor_record(&snapshot, &dir),
        ),
        (files::DIMENSIONS, storage::save_dimensions(dims, &dir)),
    ];
    for (artifact, result) in results {
        match result {
            Ok(path) => info!(path = %path.display(), "Artifact saved"),
            Err(reason) => {
                error!(artifact, reason = %reason, "Artifact not saved");
                failed.push(artifact);
            }
        }
    }

    Ok(CaptureSummary { dir, failed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_real_numbers() {
        let dims = ObjectDimensions::parse("10", "5.5", "20").unwrap();
        assert_eq!(dims.height, 10.0);
        assert_eq!(dims.width, 5.5);
        assert_eq!(dims.length, 20.0);
    }

    #[test]
    fn parse_trims_whitespace() {
        assert!(ObjectDimensions::parse(" 10 ", "5.5", "20.0").is_ok());
    }

    #[test]
    fn parse_accepts_sign_and_magnitude_unchecked() {
        let dims = ObjectDimensions::parse("-3", "1e6", "0").unwrap();
        assert_eq!(dims.height, -3.0);
        assert_eq!(dims.width, 1e6);
        assert_eq!(dims.length, 0.0);
    }

    #[test]
    fn parse_rejects_non_numeric_and_names_the_field() {
        let err = ObjectDimensions::parse("10", "5.5", "abc").unwrap_err();
        assert_eq!(err.field, "length");
        assert_eq!(err.value, "abc");

        let err = ObjectDimensions::parse("", "1", "2").unwrap_err();
        assert_eq!(err.field, "height");
    }

    #[test]
    fn parse_rejects_comma_decimals() {
        // Decimals use a point, as the operator message says
        assert!(ObjectDimensions::parse("10,5", "1", "2").is_err());
    }
}
