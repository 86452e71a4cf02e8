// SPDX-License-Identifier: GPL-3.0-only

//! Top-level error type for the capture application

use std::fmt;

use crate::backends::camera::CameraError;
use crate::ui::UiError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Display surface errors
    Ui(UiError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Ui(e) => write!(f, "UI error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<UiError> for AppError {
    fn from(err: UiError) -> Self {
        AppError::Ui(err)
    }
}
