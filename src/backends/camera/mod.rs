// SPDX-License-Identifier: GPL-3.0-only

//! Depth camera backend abstraction.
//!
//! The stereo matching, sensor fusion, and driver plumbing live inside the
//! camera vendor's SDK; this module only defines the narrow surface the
//! orchestrator consumes. The [`synthetic`] backend implements it with a
//! generated scene so the application runs without hardware.

pub mod synthetic;
pub mod types;

pub use synthetic::SyntheticCamera;
pub use types::{
    BarometerData, CameraError, CameraFrame, CameraResult, CloudPoint, ImageSize, ImuData,
    MagnetometerData, PointCloud, SensorBundle, TimeReference, View,
};

/// Operational surface of an opened depth camera.
///
/// One grab produces one synchronized acquisition covering the image and
/// sensor buffers; the retrieve calls then read views of that acquisition.
/// Retrieving before the first successful grab is an error.
pub trait DepthCamera {
    /// Native sensor resolution the camera was opened with
    fn resolution(&self) -> ImageSize;

    /// Run one acquisition cycle.
    ///
    /// On failure the previously grabbed data stays retrievable.
    fn grab(&mut self) -> CameraResult<()>;

    /// Retrieve a view of the last grab, rescaled to `size`
    fn retrieve_image(&mut self, view: View, size: ImageSize) -> CameraResult<CameraFrame>;

    /// Retrieve the dense XYZRGBA point cloud of the last grab
    fn retrieve_point_cloud(&mut self) -> CameraResult<PointCloud>;

    /// Retrieve the sensor bundle for the given timestamp reference
    fn retrieve_sensors(&mut self, reference: TimeReference) -> CameraResult<SensorBundle>;

    /// Release the camera handle; all calls after this fail with `Disconnected`
    fn close(&mut self);
}
