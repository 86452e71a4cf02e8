// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Timeout for the per-tick UI event poll.
///
/// This is the only suspension point in the main loop; the camera grab and
/// retrieve calls are synchronous.
pub const UI_POLL_TIMEOUT: Duration = Duration::from_millis(20);

/// How long transient popups stay on screen before auto-dismissing.
pub const TRANSIENT_POPUP_DURATION: Duration = Duration::from_secs(5);

/// Capture directory name format, second resolution.
///
/// Two captures within the same second resolve to the same directory and the
/// later one overwrites the earlier.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Artifact file names inside a capture directory
pub mod files {
    pub const RGB_IMAGE: &str = "rgb.png";
    pub const DEPTH_IMAGE: &str = "depth.png";
    pub const POINT_CLOUD: &str = "pointcloud.ply";
    pub const SENSOR_RECORD: &str = "sensors_data.csv";
    pub const DIMENSIONS: &str = "dimensions.csv";
}

/// Column order of `sensors_data.csv`
pub const SENSOR_CSV_COLUMNS: [&str; 5] = [
    "IMU_orientation",
    "IMU_acceleration",
    "IMU_angular_velocity",
    "Magnetometer_magnetic_field",
    "Barometer_atmospheric_pressure",
];

/// Column order of `dimensions.csv`
pub const DIMENSIONS_CSV_COLUMNS: [&str; 3] = ["height", "width", "length"];

/// Operator-facing popup messages, kept in the operators' language
pub mod messages {
    pub const CAPTURING: &str = "Capturando datos, no mover la cámara ni el objeto";
    pub const CAPTURE_SAVED: &str = "Captura guardada correctamente. Listo para continuar";
    pub const CAPTURE_FAILED: &str = "Falla al capturar. Revise la cámara e intente de nuevo";
    pub const INVALID_DIMENSIONS: &str =
        "Debe ingresar valor numérico en los tres campos. Decimales con punto.";
}
