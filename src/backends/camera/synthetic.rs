// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic depth camera backend.
//!
//! Generates a deterministic scene (a light bar sweeping over a gradient
//! backdrop) together with a matching depth map, point cloud, and sensor
//! stream. Stands in for the vendor SDK when no physical camera is attached
//! and backs the integration tests.

use tracing::{debug, info};

use super::types::{
    BarometerData, CameraError, CameraFrame, CameraResult, CloudPoint, ImageSize, ImuData,
    MagnetometerData, PointCloud, SensorBundle, TimeReference, View,
};
use super::DepthCamera;
use crate::config::CameraConfig;

/// Backdrop depth range in millimeters, near edge to far edge
const BACKDROP_NEAR_MM: f32 = 1500.0;
const BACKDROP_FAR_MM: f32 = 3500.0;

/// Depth of the sweeping bar ("the object") in millimeters
const BAR_DEPTH_MM: f32 = 600.0;

/// Bar sweep period in grab ticks
const SWEEP_PERIOD: u64 = 240;

/// Point cloud sampling step over the native resolution, in pixels
const CLOUD_STEP: u32 = 8;

/// Synthetic depth camera.
///
/// Holds the configuration it was opened with and a grab counter that drives
/// the scene animation. Everything derived from the counter is deterministic,
/// so tests can assert exact behavior.
pub struct SyntheticCamera {
    config: CameraConfig,
    resolution: ImageSize,
    tick: u64,
    grabbed: bool,
    open: bool,
    injected_grab_failures: u32,
}

impl SyntheticCamera {
    /// Open the synthetic camera with the given configuration
    pub fn open(config: &CameraConfig) -> CameraResult<Self> {
        let resolution = config.resolution.size();
        info!(
            resolution = %resolution,
            depth_mode = ?config.depth_mode,
            unit = ?config.unit,
            "Opening synthetic depth camera"
        );
        Ok(Self {
            config: *config,
            resolution,
            tick: 0,
            grabbed: false,
            open: true,
            injected_grab_failures: 0,
        })
    }

    /// Make the next `count` grab calls fail, as a disconnected cable would.
    ///
    /// Used by the integration tests to exercise the skip-a-tick path.
    pub fn inject_grab_failures(&mut self, count: u32) {
        self.injected_grab_failures = count;
    }

    fn ensure_retrievable(&self) -> CameraResult<()> {
        if !self.open {
            return Err(CameraError::Disconnected);
        }
        if !self.grabbed {
            return Err(CameraError::RetrieveFailed(
                "no grabbed acquisition to retrieve from".into(),
            ));
        }
        Ok(())
    }

    /// Horizontal center of the sweeping bar in normalized [0, 1) coordinates
    fn bar_center(&self) -> f32 {
        (self.tick % SWEEP_PERIOD) as f32 / SWEEP_PERIOD as f32
    }

    fn in_bar(&self, x_norm: f32) -> bool {
        (x_norm - self.bar_center()).abs() < 0.03
    }

    /// Scene depth at a normalized coordinate, in millimeters
    fn depth_mm(&self, x_norm: f32) -> f32 {
        if self.in_bar(x_norm) {
            BAR_DEPTH_MM
        } else {
            BACKDROP_NEAR_MM + (BACKDROP_FAR_MM - BACKDROP_NEAR_MM) * x_norm
        }
    }

    /// Left view color at a normalized coordinate
    fn left_color(&self, x_norm: f32, y_norm: f32) -> [u8; 4] {
        if self.in_bar(x_norm) {
            [220, 210, 200, 255]
        } else {
            let r = 40.0 + 150.0 * x_norm;
            let g = 60.0 + 120.0 * y_norm;
            [r as u8, g as u8, 90, 255]
        }
    }

    /// Color-mapped depth view color at a normalized coordinate.
    ///
    /// Near is warm, far is cold, matching the usual depth visualizations.
    fn depth_color(&self, x_norm: f32) -> [u8; 4] {
        let t = ((self.depth_mm(x_norm) - 500.0) / 3000.0).clamp(0.0, 1.0);
        [(255.0 * (1.0 - t)) as u8, 64, (255.0 * t) as u8, 255]
    }
}

impl DepthCamera for SyntheticCamera {
    fn resolution(&self) -> ImageSize {
        self.resolution
    }

    fn grab(&mut self) -> CameraResult<()> {
        if !self.open {
            return Err(CameraError::Disconnected);
        }
        if self.injected_grab_failures > 0 {
            self.injected_grab_failures -= 1;
            return Err(CameraError::GrabFailed("injected grab failure".into()));
        }
        self.tick += 1;
        self.grabbed = true;
        Ok(())
    }

    fn retrieve_image(&mut self, view: View, size: ImageSize) -> CameraResult<CameraFrame> {
        self.ensure_retrievable()?;
        let mut data = Vec::with_capacity((size.width as usize) * (size.height as usize) * 4);
        for y in 0..size.height {
            let y_norm = y as f32 / size.height as f32;
            for x in 0..size.width {
                let x_norm = x as f32 / size.width as f32;
                let pixel = match view {
                    View::Left => self.left_color(x_norm, y_norm),
                    View::Depth => self.depth_color(x_norm),
                };
                data.extend_from_slice(&pixel);
            }
        }
        CameraFrame::new(size.width, size.height, data)
            .ok_or_else(|| CameraError::RetrieveFailed("generated frame buffer mismatch".into()))
    }

    fn retrieve_point_cloud(&mut self) -> CameraResult<PointCloud> {
        self.ensure_retrievable()?;
        let ImageSize { width, height } = self.resolution;
        let scale = self.config.unit.scale_from_mm();
        // Fixed pinhole intrinsics for the synthetic scene
        let fx = width as f32 * 0.8;
        let fy = fx;
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;

        let mut points = Vec::new();
        for y in (0..height).step_by(CLOUD_STEP as usize) {
            let y_norm = y as f32 / height as f32;
            for x in (0..width).step_by(CLOUD_STEP as usize) {
                let x_norm = x as f32 / width as f32;
                let z_mm = self.depth_mm(x_norm);
                let position = [
                    (x as f32 - cx) * z_mm / fx * scale,
                    -(y as f32 - cy) * z_mm / fy * scale,
                    z_mm * scale,
                ];
                points.push(CloudPoint {
                    position,
                    color: self.left_color(x_norm, y_norm),
                });
            }
        }
        debug!(points = points.len(), "Synthetic point cloud generated");
        Ok(PointCloud { points })
    }

    fn retrieve_sensors(&mut self, _reference: TimeReference) -> CameraResult<SensorBundle> {
        self.ensure_retrievable()?;
        let t = self.tick as f32;
        let yaw = t * 0.002;
        Ok(SensorBundle {
            imu: ImuData {
                orientation: [0.0, 0.0, (yaw / 2.0).sin(), (yaw / 2.0).cos()],
                linear_acceleration: [0.02 * (t * 0.05).sin(), 0.02 * (t * 0.07).cos(), 9.81],
                angular_velocity: [0.0, 0.0, 0.11],
            },
            magnetometer: MagnetometerData {
                magnetic_field_calibrated: [21.3 + 0.2 * (t * 0.01).sin(), 4.1, -43.6],
            },
            barometer: BarometerData {
                pressure: 1013.25 + 0.4 * (t * 0.003).sin(),
            },
        })
    }

    fn close(&mut self) {
        if self.open {
            info!("Closing synthetic depth camera");
            self.open = false;
            self.grabbed = false;
        }
    }
}
