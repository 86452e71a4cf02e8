// SPDX-License-Identifier: GPL-3.0-only

//! Capture orchestrator.
//!
//! Owns the camera handle and the display surface for the process lifetime
//! and drives the cooperative polling loop: grab, poll one UI event, handle
//! it, refresh the preview. Single-threaded; the bounded UI poll is the only
//! suspension point per iteration.

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::backends::camera::{CameraResult, DepthCamera, TimeReference, View};
use crate::config::CaptureSettings;
use crate::constants::{TRANSIENT_POPUP_DURATION, UI_POLL_TIMEOUT, messages};
use crate::errors::AppResult;
use crate::pipelines::capture::{ObjectDimensions, capture_record};
use crate::sensors::{SensorSnapshot, format_vec3, format_vec4};
use crate::ui::{FieldKey, SensorField, Ui, UiEvent};

/// The capture application: camera, display surface, runtime settings
pub struct CaptureApp<C: DepthCamera, U: Ui> {
    camera: C,
    ui: U,
    settings: CaptureSettings,
    poll_timeout: Duration,
}

impl<C: DepthCamera, U: Ui> CaptureApp<C, U> {
    pub fn new(camera: C, ui: U, settings: CaptureSettings) -> Self {
        Self {
            camera,
            ui,
            settings,
            poll_timeout: UI_POLL_TIMEOUT,
        }
    }

    /// Run the control loop until the user exits.
    ///
    /// A failed grab only skips that tick's preview refresh; a capture event
    /// runs to completion before the loop resumes.
    pub fn run(&mut self) -> AppResult<()> {
        info!(
            output_root = %self.settings.output_root.display(),
            "Capture loop started"
        );
        info!("Tab switches the dimension field, Enter captures, Esc quits");

        loop {
            let grabbed = match self.camera.grab() {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "Grab failed, keeping previous preview");
                    false
                }
            };

            match self.ui.poll(self.poll_timeout)? {
                Some(UiEvent::Exit) | Some(UiEvent::Closed) => break,
                Some(UiEvent::Capture) => self.handle_capture(),
                None => {}
            }

            if grabbed && let Err(e) = self.refresh_preview() {
                debug!(error = %e, "Preview refresh skipped");
            }
        }

        self.camera.close();
        if let Err(e) = self.ui.close() {
            warn!(error = %e, "Display teardown reported an error");
        }
        info!("Capture loop finished");
        Ok(())
    }

    /// Retrieve half-resolution views and the sensor bundle of the last grab
    /// and push them to the display.
    fn refresh_preview(&mut self) -> CameraResult<()> {
        let preview_size = self.camera.resolution().halved();
        let left = self.camera.retrieve_image(View::Left, preview_size)?;
        let depth = self.camera.retrieve_image(View::Depth, preview_size)?;
        let bundle = self.camera.retrieve_sensors(TimeReference::Image)?;
        let snapshot = SensorSnapshot::from_bundle(&bundle);

        if let Some(side_by_side) = left.concat_horizontal(&depth) {
            self.ui.update_image(side_by_side);
        }

        self.ui
            .update_sensor_field(SensorField::Orientation, format_vec4(snapshot.orientation));
        self.ui
            .update_sensor_field(SensorField::Acceleration, format_vec3(snapshot.acceleration));
        self.ui.update_sensor_field(
            SensorField::AngularVelocity,
            format_vec3(snapshot.angular_velocity),
        );
        self.ui.update_sensor_field(
            SensorField::MagneticField,
            format_vec3(snapshot.magnetic_field),
        );
        self.ui
            .update_sensor_field(SensorField::Pressure, snapshot.pressure.to_string());
        Ok(())
    }

    /// Validate the dimension fields and run one capture to completion.
    ///
    /// On a parse failure nothing is written and the fields keep their
    /// contents so the operator can correct them.
    fn handle_capture(&mut self) {
        let height = self.ui.read_field(FieldKey::Height);
        let width = self.ui.read_field(FieldKey::Width);
        let length = self.ui.read_field(FieldKey::Length);

        let dims = match ObjectDimensions::parse(&height, &width, &length) {
            Ok(dims) => dims,
            Err(e) => {
                warn!(field = e.field, value = %e.value, "Capture rejected");
                self.ui
                    .show_transient(messages::INVALID_DIMENSIONS, TRANSIENT_POPUP_DURATION);
                return;
            }
        };

        self.ui
            .show_transient(messages::CAPTURING, TRANSIENT_POPUP_DURATION);

        match capture_record(&mut self.camera, &dims, &self.settings) {
            Ok(summary) => {
                info!(
                    dir = %summary.dir.display(),
                    failed_artifacts = summary.failed.len(),
                    "Capture finished"
                );
                self.ui.clear_fields(&FieldKey::ALL);
                self.ui
                    .show_transient(messages::CAPTURE_SAVED, TRANSIENT_POPUP_DURATION);
            }
            Err(e) => {
                error!(error = %e, "Capture aborted");
                self.ui
                    .show_transient(messages::CAPTURE_FAILED, TRANSIENT_POPUP_DURATION);
            }
        }
    }
}
