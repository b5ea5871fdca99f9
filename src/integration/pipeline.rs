//! Per-stream tracking session and the detector + session pipeline.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::geometry::{BBox, CalibrationError, CameraConfig, Localizer, PositionEstimate};
use crate::smoothing::{SmootherConfig, TrackSmoother};
use crate::tracker::{Detection, IdentityManager, ReidConfig};

use super::builder::sanitize_detections;
use super::detector::DetectionSource;

/// Session-scoped configuration, set once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Detector class labels, indexed by class index
    pub classes: Vec<String>,
    /// Label sets treated as interchangeable for identity continuity
    pub continuity_groups: Vec<Vec<String>>,
    pub reid: ReidConfig,
    pub camera: CameraConfig,
    pub pixel_smoothing: SmootherConfig,
    pub world_smoothing: SmootherConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            continuity_groups: Vec::new(),
            reid: ReidConfig::default(),
            camera: CameraConfig::default(),
            pixel_smoothing: SmootherConfig::pixel(),
            world_smoothing: SmootherConfig::world(),
        }
    }
}

/// One tracked detection in one frame: the flat record consumed by external
/// renderers, CSV loggers and map panels.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedObject {
    pub frame: u64,
    pub global_id: u64,
    pub label: String,
    pub bbox: BBox,
    /// Raw pixel center
    pub center: Point2<f32>,
    /// Camera/world position; present only when the class has a configured
    /// physical height, and then in full
    pub position: Option<PositionEstimate>,
    /// Smoothed pixel center
    pub smoothed_center: Point2<f64>,
    /// Smoothed world ground-plane position (Xw, Yw); absent exactly when
    /// `position` is absent
    pub smoothed_world: Option<Point2<f64>>,
}

/// Failure of the end-to-end pipeline.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detection source failed")]
    Detector(#[source] E),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// One camera stream's tracking state: identity pools, calibration and
/// smoother state, mutated only through [`TrackingSession::process`].
///
/// Processing is strictly sequential; concurrent streams each own their own
/// session. Intrinsics are derived from the first processed frame's
/// resolution and kept for the life of the session.
pub struct TrackingSession {
    config: SessionConfig,
    identities: IdentityManager,
    localizer: Option<Localizer>,
    pixel_smoother: TrackSmoother,
    world_smoother: TrackSmoother,
    frame_index: u64,
}

impl TrackingSession {
    pub fn new(config: SessionConfig) -> Self {
        let identities =
            IdentityManager::new(&config.classes, &config.continuity_groups, config.reid);
        let pixel_smoother = TrackSmoother::new(config.pixel_smoothing.clone());
        let world_smoother = TrackSmoother::new(config.world_smoothing.clone());
        Self {
            config,
            identities,
            localizer: None,
            pixel_smoother,
            world_smoother,
            frame_index: 0,
        }
    }

    /// Process one frame's detections and return the tracked records.
    ///
    /// Detections are sanitized (clamped to the frame, degenerate boxes
    /// dropped), assigned identities, localized when their class has a known
    /// height, and smoothed. The frame counter advances by one per call.
    pub fn process(
        &mut self,
        width: u32,
        height: u32,
        detections: Vec<Detection>,
    ) -> Result<Vec<TrackedObject>, CalibrationError> {
        if self.localizer.is_none() {
            self.localizer = Some(Localizer::new(width, height, &self.config.camera)?);
        }

        let frame = self.frame_index;
        let detections = sanitize_detections(detections, width, height);
        let ids = self.identities.assign(frame, &detections);

        let mut tracked = Vec::with_capacity(detections.len());
        for (det, &gid) in detections.iter().zip(&ids) {
            let position = self
                .localizer
                .as_ref()
                .and_then(|loc| loc.estimate(&det.bbox, &det.label));

            let raw_center = Vector2::new(f64::from(det.center.x), f64::from(det.center.y));
            let smoothed_center = Point2::from(self.pixel_smoother.smooth(gid, frame, raw_center));

            let raw_world = position.map(|p| Vector2::new(p.world.x, p.world.y));
            let smoothed_world = self
                .world_smoother
                .smooth_optional(gid, frame, raw_world)
                .map(Point2::from);

            tracked.push(TrackedObject {
                frame,
                global_id: gid,
                label: det.label.clone(),
                bbox: det.bbox,
                center: det.center,
                position,
                smoothed_center,
                smoothed_world,
            });
        }

        // Smoother state for identities the manager has purged is dead; drop
        // it so neither side grows without bound.
        let identities = &self.identities;
        self.pixel_smoother.retain(|gid| identities.contains(gid));
        self.world_smoother.retain(|gid| identities.contains(gid));

        self.frame_index += 1;
        Ok(tracked)
    }

    /// Clear identity pools, smoother state and the frame counter.
    ///
    /// Total and synchronous, for video stream restarts. Calibration derived
    /// from the first frame survives.
    pub fn reset(&mut self) {
        info!("tracking session reset");
        self.identities = IdentityManager::new(
            &self.config.classes,
            &self.config.continuity_groups,
            self.config.reid,
        );
        self.pixel_smoother.clear();
        self.world_smoother.clear();
        self.frame_index = 0;
    }

    /// Index the next processed frame will receive.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn identities(&self) -> &IdentityManager {
        &self.identities
    }

    pub fn pixel_smoother(&self) -> &TrackSmoother {
        &self.pixel_smoother
    }

    pub fn world_smoother(&self) -> &TrackSmoother {
        &self.world_smoother
    }
}

/// A detector bundled with a tracking session for end-to-end per-frame
/// processing.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    session: TrackingSession,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a pipeline from a detector and session configuration.
    pub fn new(detector: D, config: SessionConfig) -> Self {
        Self {
            detector,
            session: TrackingSession::new(config),
        }
    }

    /// Run detection on one frame and feed the results through the session.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<TrackedObject>, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detector)?;
        Ok(self.session.process(width, height, detections)?)
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TrackingSession {
        &mut self.session
    }
}
