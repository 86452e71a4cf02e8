// SPDX-License-Identifier: GPL-3.0-only

//! Capture artifact writers.
//!
//! Persists the artifacts of one capture record into an already-created
//! directory. Every writer is independent: a failed write is reported to the
//! caller and never prevents the sibling artifacts from being attempted.

use chrono::{DateTime, Local};
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backends::camera::{CameraFrame, PointCloud};
use crate::constants::{DIMENSIONS_CSV_COLUMNS, SENSOR_CSV_COLUMNS, TIMESTAMP_FORMAT, files};
use crate::pipelines::capture::ObjectDimensions;
use crate::sensors::{SensorSnapshot, format_vec3, format_vec4};

/// Point cloud file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloudEncoding {
    /// Binary little-endian PLY, the compact default
    #[default]
    Binary,
    /// ASCII PLY, human-readable
    Ascii,
}

/// Capture directory for a wall-clock instant, second resolution.
///
/// Pure in its inputs: two captures within the same second map to the same
/// directory and the later capture overwrites the earlier artifacts.
pub fn capture_dir(root: &Path, at: DateTime<Local>) -> PathBuf {
    root.join(at.format(TIMESTAMP_FORMAT).to_string())
}

/// Write an RGBA frame as `<file_name>` (PNG) inside `dir`
pub fn save_image(file_name: &str, frame: &CameraFrame, dir: &Path) -> Result<PathBuf, String> {
    let path = dir.join(file_name);
    let img: image::RgbaImage =
        image::ImageBuffer::from_raw(frame.width, frame.height, frame.data.to_vec())
            .ok_or_else(|| "frame buffer does not match its dimensions".to_string())?;
    img.save(&path)
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
    debug!(path = %path.display(), "Image written");
    Ok(path)
}

/// Write the point cloud as `pointcloud.ply` inside `dir`
pub fn save_point_cloud(
    cloud: &PointCloud,
    dir: &Path,
    encoding: CloudEncoding,
) -> Result<PathBuf, String> {
    if cloud.is_empty() {
        return Err("point cloud is empty".to_string());
    }

    let path = dir.join(files::POINT_CLOUD);
    let file =
        File::create(&path).map_err(|e| format!("failed to create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = match encoding {
        CloudEncoding::Binary => Encoding::BinaryLittleEndian,
        CloudEncoding::Ascii => Encoding::Ascii,
    };

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for name in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    for name in ["red", "green", "blue", "alpha"] {
        vertex_def.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::UChar),
        ));
    }
    vertex_def.count = cloud.len();
    ply.header.elements.add(vertex_def);

    let mut elements = Vec::with_capacity(cloud.len());
    for point in &cloud.points {
        let mut element = DefaultElement::new();
        element.insert("x".to_string(), Property::Float(point.position[0]));
        element.insert("y".to_string(), Property::Float(point.position[1]));
        element.insert("z".to_string(), Property::Float(point.position[2]));
        element.insert("red".to_string(), Property::UChar(point.color[0]));
        element.insert("green".to_string(), Property::UChar(point.color[1]));
        element.insert("blue".to_string(), Property::UChar(point.color[2]));
        element.insert("alpha".to_string(), Property::UChar(point.color[3]));
        elements.push(element);
    }
    ply.payload.insert("vertex".to_string(), elements);

    let ply_writer = Writer::new();
    ply_writer
        .write_ply(&mut writer, &mut ply)
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;

    debug!(path = %path.display(), points = cloud.len(), "Point cloud written");
    Ok(path)
}

/// Write `sensors_data.csv`: one header row, one data row, fixed column order
pub fn save_sensor_record(snapshot: &SensorSnapshot, dir: &Path) -> Result<PathBuf, String> {
    let path = dir.join(files::SENSOR_RECORD);
    let file =
        File::create(&path).map_err(|e| format!("failed to create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    // Vector cells are bracketed and space-separated, so no cell ever needs
    // quoting.
    writeln!(writer, "{}", SENSOR_CSV_COLUMNS.join(","))
        .and_then(|_| {
            writeln!(
                writer,
                "{},{},{},{},{}",
                format_vec4(snapshot.orientation),
                format_vec3(snapshot.acceleration),
                format_vec3(snapshot.angular_velocity),
                format_vec3(snapshot.magnetic_field),
                snapshot.pressure,
            )
        })
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;

    debug!(path = %path.display(), "Sensor record written");
    Ok(path)
}

/// Write `dimensions.csv`: one header row, one data row
pub fn save_dimensions(dims: &ObjectDimensions, dir: &Path) -> Result<PathBuf, String> {
    let path = dir.join(files::DIMENSIONS);
    let file =
        File::create(&path).map_err(|e| format!("failed to create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", DIMENSIONS_CSV_COLUMNS.join(","))
        .and_then(|_| writeln!(writer, "{},{},{}", dims.height, dims.width, dims.length))
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;

    debug!(path = %path.display(), "Dimensions written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::CloudPoint;
    use chrono::TimeZone;

    fn small_cloud() -> PointCloud {
        PointCloud {
            points: vec![
                CloudPoint {
                    position: [0.0, 0.0, 1.0],
                    color: [255, 0, 0, 255],
                },
                CloudPoint {
                    position: [0.5, -0.5, 2.0],
                    color: [0, 255, 0, 255],
                },
            ],
        }
    }

    fn snapshot() -> SensorSnapshot {
        SensorSnapshot {
            orientation: [0.0, 0.0, 0.5, 0.87],
            acceleration: [0.1, -0.2, 9.81],
            angular_velocity: [0.0, 0.0, 0.11],
            magnetic_field: [21.3, 4.1, -43.6],
            pressure: 1013.25,
        }
    }

    #[test]
    fn capture_dir_is_second_resolution() {
        let at = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let dir = capture_dir(Path::new("data"), at);
        assert_eq!(dir, PathBuf::from("data/20240101_100000"));
    }

    #[test]
    fn sensor_record_has_one_header_and_one_data_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_sensor_record(&snapshot(), dir.path()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], SENSOR_CSV_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "[0 0 0.5 0.87],[0.1 -0.2 9.81],[0 0 0.11],[21.3 4.1 -43.6],1013.25"
        );
    }

    #[test]
    fn dimensions_row_order_and_shape() {
        let dir = tempfile::tempdir().unwrap();
        let dims = ObjectDimensions {
            height: 10.0,
            width: 5.5,
            length: -20.0,
        };
        let path = save_dimensions(&dims, dir.path()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "height,width,length");
        assert_eq!(lines[1], "10,5.5,-20");
    }

    #[test]
    fn same_directory_writes_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let first = ObjectDimensions {
            height: 1.0,
            width: 2.0,
            length: 3.0,
        };
        let second = ObjectDimensions {
            height: 4.0,
            width: 5.0,
            length: 6.0,
        };
        save_dimensions(&first, dir.path()).unwrap();
        let path = save_dimensions(&second, dir.path()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(content.lines().nth(1).unwrap(), "4,5,6");
    }

    #[test]
    fn ascii_point_cloud_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_point_cloud(&small_cloud(), dir.path(), CloudEncoding::Ascii).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("ply"));
        assert!(content.contains("format ascii 1.0"));
        assert!(content.contains("element vertex 2"));
        assert!(content.contains("property uchar alpha"));
    }

    #[test]
    fn binary_point_cloud_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_point_cloud(&small_cloud(), dir.path(), CloudEncoding::Binary).unwrap();
        let content = std::fs::read(path).unwrap();
        assert!(content.starts_with(b"ply"));
    }

    #[test]
    fn empty_point_cloud_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_point_cloud(&PointCloud::default(), dir.path(), CloudEncoding::Ascii).is_err());
    }

    #[test]
    fn write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(save_sensor_record(&snapshot(), &missing).is_err());
        assert!(save_point_cloud(&small_cloud(), &missing, CloudEncoding::Ascii).is_err());
    }

    #[test]
    fn image_roundtrips_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let frame = CameraFrame::new(4, 2, vec![128u8; 4 * 2 * 4]).unwrap();
        let path = save_image(files::RGB_IMAGE, &frame, dir.path()).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0, [128, 128, 128, 128]);
    }
}
