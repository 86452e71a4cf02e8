// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end tests for the capture loop, run against the synthetic camera
//! and a scripted display surface.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use depth_capture::app::CaptureApp;
use depth_capture::backends::camera::{
    CameraFrame, CameraResult, DepthCamera, ImageSize, PointCloud, SensorBundle, SyntheticCamera,
    TimeReference, View,
};
use depth_capture::config::{CameraConfig, CaptureSettings, Resolution};
use depth_capture::constants::messages;
use depth_capture::pipelines::capture::{ObjectDimensions, capture_record};
use depth_capture::storage::CloudEncoding;
use depth_capture::ui::{FieldKey, SensorField, Ui, UiEvent, UiResult};

/// Observable state of the scripted display surface
#[derive(Default)]
struct UiState {
    fields: [String; 3],
    transients: Vec<String>,
    images: usize,
    sensor_updates: usize,
    closed: bool,
}

/// Display surface that replays a fixed event script.
///
/// Each poll pops the next scripted event; an exhausted script exits so a
/// test can never hang the loop.
struct ScriptedUi {
    events: VecDeque<Option<UiEvent>>,
    state: Rc<RefCell<UiState>>,
}

impl ScriptedUi {
    fn new(events: Vec<Option<UiEvent>>) -> (Self, Rc<RefCell<UiState>>) {
        let state = Rc::new(RefCell::new(UiState::default()));
        (
            Self {
                events: events.into(),
                state: Rc::clone(&state),
            },
            state,
        )
    }

    fn set_fields(&self, height: &str, width: &str, length: &str) {
        let mut state = self.state.borrow_mut();
        state.fields = [height.to_string(), width.to_string(), length.to_string()];
    }
}

impl Ui for ScriptedUi {
    fn poll(&mut self, _timeout: Duration) -> UiResult<Option<UiEvent>> {
        Ok(self.events.pop_front().unwrap_or(Some(UiEvent::Exit)))
    }

    fn update_image(&mut self, _frame: CameraFrame) {
        self.state.borrow_mut().images += 1;
    }

    fn update_sensor_field(&mut self, _field: SensorField, _value: String) {
        self.state.borrow_mut().sensor_updates += 1;
    }

    fn read_field(&self, key: FieldKey) -> String {
        self.state.borrow().fields[key.index()].clone()
    }

    fn clear_fields(&mut self, keys: &[FieldKey]) {
        let mut state = self.state.borrow_mut();
        for key in keys {
            state.fields[key.index()].clear();
        }
    }

    fn show_transient(&mut self, message: &str, _duration: Duration) {
        self.state.borrow_mut().transients.push(message.to_string());
    }

    fn close(&mut self) -> UiResult<()> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }
}

/// Camera wrapper whose point cloud retrieve returns an empty cloud,
/// making exactly one artifact writer fail.
struct EmptyCloudCamera(SyntheticCamera);

impl DepthCamera for EmptyCloudCamera {
    fn resolution(&self) -> ImageSize {
        self.0.resolution()
    }

    fn grab(&mut self) -> CameraResult<()> {
        self.0.grab()
    }

    fn retrieve_image(&mut self, view: View, size: ImageSize) -> CameraResult<CameraFrame> {
        self.0.retrieve_image(view, size)
    }

    fn retrieve_point_cloud(&mut self) -> CameraResult<PointCloud> {
        self.0.retrieve_point_cloud()?;
        Ok(PointCloud::default())
    }

    fn retrieve_sensors(&mut self, reference: TimeReference) -> CameraResult<SensorBundle> {
        self.0.retrieve_sensors(reference)
    }

    fn close(&mut self) {
        self.0.close()
    }
}

fn test_config() -> CameraConfig {
    // 720p keeps the generated frames small
    CameraConfig {
        resolution: Resolution::Hd720,
        ..CameraConfig::default()
    }
}

fn test_settings(root: &Path) -> CaptureSettings {
    CaptureSettings {
        output_root: root.to_path_buf(),
        cloud_encoding: CloudEncoding::Ascii,
    }
}

fn capture_dirs(root: &Path) -> Vec<std::path::PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    std::fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

#[test]
fn full_capture_writes_all_artifacts_and_clears_fields() {
    let output = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::open(&test_config()).unwrap();
    let (ui, state) = ScriptedUi::new(vec![None, Some(UiEvent::Capture), Some(UiEvent::Exit)]);
    ui.set_fields("10", "5.5", "20");

    CaptureApp::new(camera, ui, test_settings(output.path()))
        .run()
        .unwrap();

    let dirs = capture_dirs(output.path());
    assert_eq!(dirs.len(), 1, "exactly one capture directory");
    for file in [
        "rgb.png",
        "depth.png",
        "pointcloud.ply",
        "sensors_data.csv",
        "dimensions.csv",
    ] {
        assert!(dirs[0].join(file).is_file(), "{} missing", file);
    }

    let state = state.borrow();
    assert_eq!(state.fields, ["", "", ""], "fields cleared after capture");
    assert!(
        state
            .transients
            .iter()
            .any(|m| m == messages::CAPTURE_SAVED)
    );
    assert!(state.closed);
}

#[test]
fn non_numeric_dimension_writes_nothing_and_keeps_fields() {
    let output = tempfile::tempdir().unwrap();
    let root = output.path().join("data");
    let camera = SyntheticCamera::open(&test_config()).unwrap();
    let (ui, state) = ScriptedUi::new(vec![Some(UiEvent::Capture), Some(UiEvent::Exit)]);
    ui.set_fields("10", "5.5", "abc");

    CaptureApp::new(camera, ui, test_settings(&root))
        .run()
        .unwrap();

    assert!(capture_dirs(&root).is_empty(), "no capture directory");
    let state = state.borrow();
    assert_eq!(
        state.fields,
        ["10", "5.5", "abc"],
        "fields keep their contents"
    );
    assert_eq!(state.transients, vec![messages::INVALID_DIMENSIONS]);
}

#[test]
fn failed_grabs_do_not_stop_the_loop() {
    let output = tempfile::tempdir().unwrap();
    let mut camera = SyntheticCamera::open(&test_config()).unwrap();
    camera.inject_grab_failures(3);
    let (ui, state) = ScriptedUi::new(vec![None, None, None, None, Some(UiEvent::Exit)]);

    CaptureApp::new(camera, ui, test_settings(output.path()))
        .run()
        .unwrap();

    let state = state.borrow();
    // The three failed ticks skip the preview refresh; the fourth succeeds
    assert_eq!(state.images, 1);
    assert_eq!(state.sensor_updates, 5);
}

#[test]
fn capture_grab_failure_keeps_fields_and_writes_nothing() {
    let output = tempfile::tempdir().unwrap();
    let root = output.path().join("data");
    let mut camera = SyntheticCamera::open(&test_config()).unwrap();
    // First failure hits the preview grab, second the capture acquisition
    camera.inject_grab_failures(2);
    let (ui, state) = ScriptedUi::new(vec![Some(UiEvent::Capture), Some(UiEvent::Exit)]);
    ui.set_fields("10", "5.5", "20");

    CaptureApp::new(camera, ui, test_settings(&root))
        .run()
        .unwrap();

    assert!(capture_dirs(&root).is_empty());
    let state = state.borrow();
    assert_eq!(state.fields, ["10", "5.5", "20"]);
    assert!(
        state
            .transients
            .iter()
            .any(|m| m == messages::CAPTURE_FAILED)
    );
}

#[test]
fn empty_fields_after_capture_reject_the_next_capture() {
    let output = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::open(&test_config()).unwrap();
    let (ui, state) = ScriptedUi::new(vec![
        Some(UiEvent::Capture),
        Some(UiEvent::Capture),
        Some(UiEvent::Exit),
    ]);
    ui.set_fields("10", "5.5", "20");

    CaptureApp::new(camera, ui, test_settings(output.path()))
        .run()
        .unwrap();

    let state = state.borrow();
    // The first capture clears the fields, so the second is rejected
    assert!(
        state
            .transients
            .iter()
            .any(|m| m == messages::INVALID_DIMENSIONS)
    );
}

#[test]
fn one_failed_artifact_does_not_abort_the_siblings() {
    let output = tempfile::tempdir().unwrap();
    let mut camera = EmptyCloudCamera(SyntheticCamera::open(&test_config()).unwrap());
    let dims = ObjectDimensions {
        height: 10.0,
        width: 5.5,
        length: 20.0,
    };

    let summary = capture_record(&mut camera, &dims, &test_settings(output.path())).unwrap();

    assert_eq!(summary.failed, vec!["pointcloud.ply"]);
    assert!(!summary.is_complete());
    for file in ["rgb.png", "depth.png", "sensors_data.csv", "dimensions.csv"] {
        assert!(summary.dir.join(file).is_file(), "{} missing", file);
    }
    assert!(!summary.dir.join("pointcloud.ply").exists());
}
