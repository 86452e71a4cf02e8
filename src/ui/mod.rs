// SPDX-License-Identifier: GPL-3.0-only

//! Display surface abstraction.
//!
//! The orchestrator talks to the window through this narrow capability set:
//! render the preview image, reflect sensor values into labels, read and
//! clear the dimension fields, pop transient notifications, and poll for at
//! most one event per tick with a bounded timeout. [`terminal::TerminalUi`]
//! implements it on top of ratatui.

pub mod terminal;

pub use terminal::TerminalUi;

use std::fmt;
use std::time::Duration;

use crate::backends::camera::CameraFrame;

/// Result type for display surface operations
pub type UiResult<T> = Result<T, UiError>;

/// Display surface error
#[derive(Debug, Clone)]
pub struct UiError(pub String);

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UiError {}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        UiError(err.to_string())
    }
}

/// One user interaction, surfaced to the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// The capture control was activated
    Capture,
    /// The exit control or quit keycode was activated
    Exit,
    /// The window was closed by the environment
    Closed,
}

/// The three dimension input fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Height,
    Width,
    Length,
}

impl FieldKey {
    pub const ALL: [FieldKey; 3] = [FieldKey::Height, FieldKey::Width, FieldKey::Length];

    pub fn index(self) -> usize {
        match self {
            FieldKey::Height => 0,
            FieldKey::Width => 1,
            FieldKey::Length => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Height => "Height",
            FieldKey::Width => "Width",
            FieldKey::Length => "Length",
        }
    }
}

/// The five read-only sensor labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorField {
    Orientation,
    Acceleration,
    AngularVelocity,
    MagneticField,
    Pressure,
}

impl SensorField {
    pub const ALL: [SensorField; 5] = [
        SensorField::Orientation,
        SensorField::Acceleration,
        SensorField::AngularVelocity,
        SensorField::MagneticField,
        SensorField::Pressure,
    ];

    pub fn index(self) -> usize {
        match self {
            SensorField::Orientation => 0,
            SensorField::Acceleration => 1,
            SensorField::AngularVelocity => 2,
            SensorField::MagneticField => 3,
            SensorField::Pressure => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SensorField::Orientation => "IMU Orientation",
            SensorField::Acceleration => "IMU Acceleration",
            SensorField::AngularVelocity => "IMU Angular Velocity",
            SensorField::MagneticField => "Magnetometer Magnetic Field",
            SensorField::Pressure => "Barometer Atmospheric Pressure",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorField::Orientation => "",
            SensorField::Acceleration => "[m/sec^2]",
            SensorField::AngularVelocity => "[deg/sec]",
            SensorField::MagneticField => "[uT]",
            SensorField::Pressure => "[hPa]",
        }
    }
}

/// Display surface capability consumed by the orchestrator.
///
/// The widget layout is fixed at construction; only field contents, the
/// preview image, and transient notifications change at runtime.
pub trait Ui {
    /// Redraw and wait for at most one event within `timeout`.
    ///
    /// This is the control loop's only suspension point.
    fn poll(&mut self, timeout: Duration) -> UiResult<Option<UiEvent>>;

    /// Replace the preview image
    fn update_image(&mut self, frame: CameraFrame);

    /// Replace a sensor label's value text
    fn update_sensor_field(&mut self, field: SensorField, value: String);

    /// Current raw text of a dimension input field
    fn read_field(&self, key: FieldKey) -> String;

    /// Reset the given input fields to empty
    fn clear_fields(&mut self, keys: &[FieldKey]);

    /// Show an auto-dismissing, non-blocking notification
    fn show_transient(&mut self, message: &str, duration: Duration);

    /// Tear down the surface; the struct must not be used afterwards
    fn close(&mut self) -> UiResult<()>;
}
