// SPDX-License-Identifier: GPL-3.0-only

//! Normalized view of one synchronized sensor bundle.
//!
//! The camera hands back a nested SDK-shaped bundle; the capture record and
//! the on-screen labels both want the five flat fields. The conversion is a
//! pure reshape, no I/O and no failure path.

use crate::backends::camera::SensorBundle;

/// The five sensor fields of one capture, all referenced to image time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    /// Orientation quaternion, `[x, y, z, w]`
    pub orientation: [f32; 4],
    /// Linear acceleration in m/s²
    pub acceleration: [f32; 3],
    /// Angular velocity in deg/s
    pub angular_velocity: [f32; 3],
    /// Calibrated magnetic field in µT
    pub magnetic_field: [f32; 3],
    /// Atmospheric pressure in hPa
    pub pressure: f32,
}

impl SensorSnapshot {
    pub fn from_bundle(bundle: &SensorBundle) -> Self {
        Self {
            orientation: bundle.imu.orientation,
            acceleration: bundle.imu.linear_acceleration,
            angular_velocity: bundle.imu.angular_velocity,
            magnetic_field: bundle.magnetometer.magnetic_field_calibrated,
            pressure: bundle.barometer.pressure,
        }
    }
}

/// Bracketed space-separated vector, the cell format of `sensors_data.csv`
/// and the on-screen label format
pub fn format_vec3(v: [f32; 3]) -> String {
    format!("[{} {} {}]", v[0], v[1], v[2])
}

/// Same as [`format_vec3`] for a quaternion
pub fn format_vec4(v: [f32; 4]) -> String {
    format!("[{} {} {} {}]", v[0], v[1], v[2], v[3])
}
