//! Monocular 3D localization from a pinhole camera model.
//!
//! Depth comes from similar triangles: an object of known physical height
//! projecting to `h_px` pixels sits at `Zc = fy * height_m / h_px`. The
//! bottom-center of the bounding box is back-projected through the inverse
//! pinhole model, then rotated and translated into world coordinates using
//! the fixed camera pose (downward pitch, height above ground).

use std::collections::HashMap;

use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::BBox;

/// Invalid camera configuration detected when intrinsics are derived.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
    #[error("field of view must lie in (0, 180) degrees, got {0}")]
    FovOutOfRange(f64),
}

/// Fixed per-session camera parameters.
///
/// Intrinsics are not configured directly; they are derived from the field of
/// view and the first frame's resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Horizontal field of view in degrees
    pub hfov_deg: f64,
    /// Vertical field of view in degrees
    pub vfov_deg: f64,
    /// Downward camera tilt in degrees
    pub pitch_deg: f64,
    /// Camera height above the ground plane in meters
    pub height_m: f64,
    /// Real-world object height in meters per class label
    pub object_heights_m: HashMap<String, f64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            hfov_deg: 66.5,
            vfov_deg: 52.6,
            pitch_deg: 60.0,
            height_m: 0.1,
            object_heights_m: HashMap::new(),
        }
    }
}

/// Pinhole intrinsics derived from field of view and frame resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    /// Derive focal lengths and principal point from the field of view.
    ///
    /// `fx = (W/2) / tan(hfov/2)`, `fy = (H/2) / tan(vfov/2)`, principal
    /// point at the frame center.
    pub fn from_fov(
        width: u32,
        height: u32,
        hfov_deg: f64,
        vfov_deg: f64,
    ) -> Result<Self, CalibrationError> {
        if width == 0 || height == 0 {
            return Err(CalibrationError::EmptyFrame { width, height });
        }
        for fov in [hfov_deg, vfov_deg] {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(CalibrationError::FovOutOfRange(fov));
            }
        }
        let w = width as f64;
        let h = height as f64;
        Ok(Self {
            fx: (w / 2.0) / (hfov_deg.to_radians() / 2.0).tan(),
            fy: (h / 2.0) / (vfov_deg.to_radians() / 2.0).tan(),
            cx: w / 2.0,
            cy: h / 2.0,
        })
    }
}

/// 3D position of a detection in camera and world coordinates.
///
/// Both points are present together or the whole estimate is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionEstimate {
    /// Position relative to the camera
    pub camera: Point3<f64>,
    /// Position relative to the ground-plane origin
    pub world: Point3<f64>,
}

/// Stateless monocular position estimator.
///
/// Constructed once per session from the first frame's resolution; every
/// subsequent call is pure.
#[derive(Debug, Clone)]
pub struct Localizer {
    intrinsics: Intrinsics,
    /// Camera-to-world rotation (pitch about the horizontal axis)
    rotation: Rotation3<f64>,
    /// Camera origin in world coordinates
    position: Vector3<f64>,
    heights_m: HashMap<String, f64>,
}

impl Localizer {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Result<Self, CalibrationError> {
        let intrinsics = Intrinsics::from_fov(width, height, config.hfov_deg, config.vfov_deg)?;
        Ok(Self {
            intrinsics,
            rotation: Rotation3::from_axis_angle(
                &Vector3::x_axis(),
                (-config.pitch_deg).to_radians(),
            ),
            position: Vector3::new(0.0, 0.0, config.height_m),
            heights_m: config.object_heights_m.clone(),
        })
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Estimate the 3D position of a detection standing on the ground plane.
    ///
    /// Returns `None` when `label` has no configured physical height; this is
    /// absence, not an error. The pixel height is floored at 1 so degenerate
    /// boxes yield an extreme but defined depth.
    pub fn estimate(&self, bbox: &BBox, label: &str) -> Option<PositionEstimate> {
        let true_h = *self.heights_m.get(label)?;

        let h_px = f64::from(bbox.height()).max(1.0);
        let zc = self.intrinsics.fy * true_h / h_px;

        let anchor = bbox.bottom_center();
        let u = f64::from(anchor.x);
        let v = f64::from(anchor.y);
        let xc = (u - self.intrinsics.cx) * zc / self.intrinsics.fx;
        let yc = (v - self.intrinsics.cy) * zc / self.intrinsics.fy;

        let camera = Point3::new(xc, yc, zc);
        let world = Point3::from(self.position + self.rotation * camera.coords);
        Some(PositionEstimate { camera, world })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn config_with(label: &str, height_m: f64) -> CameraConfig {
        let mut config = CameraConfig::default();
        config.object_heights_m.insert(label.to_string(), height_m);
        config
    }

    #[test]
    fn test_intrinsics_from_fov() {
        let intr = Intrinsics::from_fov(1280, 720, 90.0, 60.0).unwrap();
        // tan(45 deg) = 1
        assert_approx_eq!(intr.fx, 640.0, 1e-9);
        assert_approx_eq!(intr.fy, 360.0 / (30.0f64.to_radians()).tan(), 1e-9);
        assert_approx_eq!(intr.cx, 640.0, 1e-9);
        assert_approx_eq!(intr.cy, 360.0, 1e-9);
    }

    #[test]
    fn test_invalid_calibration() {
        assert!(matches!(
            Intrinsics::from_fov(0, 720, 66.5, 52.6),
            Err(CalibrationError::EmptyFrame { .. })
        ));
        assert!(matches!(
            Intrinsics::from_fov(1280, 720, 180.0, 52.6),
            Err(CalibrationError::FovOutOfRange(_))
        ));
    }

    #[test]
    fn test_depth_inverse_proportionality() {
        // Pick a vertical FoV so that fy = 700 for a 720px-high frame.
        let vfov = 2.0 * (360.0f64 / 700.0).atan().to_degrees();
        let mut config = config_with("bottle", 0.2);
        config.vfov_deg = vfov;
        let localizer = Localizer::new(1280, 720, &config).unwrap();
        assert_approx_eq!(localizer.intrinsics().fy, 700.0, 1e-9);

        let est = localizer
            .estimate(&BBox::new(600.0, 300.0, 700.0, 400.0), "bottle")
            .unwrap();
        assert_approx_eq!(est.camera.z, 1.4, 1e-9);

        // Doubling the pixel height halves the depth.
        let est = localizer
            .estimate(&BBox::new(600.0, 200.0, 700.0, 400.0), "bottle")
            .unwrap();
        assert_approx_eq!(est.camera.z, 0.7, 1e-9);
    }

    #[test]
    fn test_unknown_label_is_absent() {
        let localizer = Localizer::new(1280, 720, &config_with("bottle", 0.2)).unwrap();
        assert!(
            localizer
                .estimate(&BBox::new(0.0, 0.0, 100.0, 100.0), "chair")
                .is_none()
        );
    }

    #[test]
    fn test_degenerate_box_floors_height() {
        let localizer = Localizer::new(1280, 720, &config_with("bottle", 0.2)).unwrap();
        let est = localizer
            .estimate(&BBox::new(100.0, 200.0, 150.0, 200.0), "bottle")
            .unwrap();
        // h_px floored at 1: depth is extreme but defined.
        assert_approx_eq!(
            est.camera.z,
            localizer.intrinsics().fy * 0.2,
            1e-9
        );
        assert!(est.camera.z.is_finite());
    }

    #[test]
    fn test_world_transform_identity_pose() {
        // Zero pitch, zero height: world equals camera space.
        let mut config = config_with("bottle", 0.2);
        config.pitch_deg = 0.0;
        config.height_m = 0.0;
        let localizer = Localizer::new(1280, 720, &config).unwrap();
        let est = localizer
            .estimate(&BBox::new(600.0, 300.0, 700.0, 400.0), "bottle")
            .unwrap();
        assert_approx_eq!(est.world.x, est.camera.x, 1e-9);
        assert_approx_eq!(est.world.y, est.camera.y, 1e-9);
        assert_approx_eq!(est.world.z, est.camera.z, 1e-9);
    }

    #[test]
    fn test_world_transform_applies_pitch_and_height() {
        let mut config = config_with("bottle", 0.2);
        config.pitch_deg = 90.0;
        config.height_m = 0.5;
        let localizer = Localizer::new(1280, 720, &config).unwrap();
        let est = localizer
            .estimate(&BBox::new(590.0, 260.0, 690.0, 360.0), "bottle")
            .unwrap();
        // Rx(-90 deg): (x, y, z) -> (x, z, -y), then + (0, 0, 0.5).
        assert_approx_eq!(est.world.x, est.camera.x, 1e-9);
        assert_approx_eq!(est.world.y, est.camera.z, 1e-9);
        assert_approx_eq!(est.world.z, 0.5 - est.camera.y, 1e-9);
    }
}
