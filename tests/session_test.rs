use assert_approx_eq::assert_approx_eq;
use geotrack_rs::integration::{DetectionBuilder, SessionConfig, TrackingSession};
use geotrack_rs::smoothing::{SmootherConfig, SmoothingPolicy};
use geotrack_rs::tracker::Detection;

fn bottle_config() -> SessionConfig {
    let mut config = SessionConfig {
        classes: vec!["white bottle".to_string(), "black bottle".to_string()],
        continuity_groups: vec![vec![
            "white bottle".to_string(),
            "black bottle".to_string(),
        ]],
        ..SessionConfig::default()
    };
    config
        .camera
        .object_heights_m
        .insert("white bottle".to_string(), 0.15);
    // "black bottle" deliberately has no height entry.
    config
}

fn white_bottle(cx: f32, cy: f32) -> Detection {
    DetectionBuilder::new()
        .class(0, "white bottle")
        .xywh(cx, cy, 60.0, 120.0)
        .build()
}

fn black_bottle(cx: f32, cy: f32) -> Detection {
    DetectionBuilder::new()
        .class(1, "black bottle")
        .xywh(cx, cy, 60.0, 120.0)
        .build()
}

#[test]
fn test_end_to_end_record_shape() {
    let mut session = TrackingSession::new(bottle_config());
    let tracked = session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    assert_eq!(tracked.len(), 1);

    let obj = &tracked[0];
    assert_eq!(obj.frame, 0);
    assert_eq!(obj.global_id, 0);
    assert_eq!(obj.label, "white bottle");

    // Known height: camera and world positions present together.
    let position = obj.position.expect("white bottle has a configured height");
    assert!(position.camera.z > 0.0);
    assert!(obj.smoothed_world.is_some());

    // First observation seeds smoothing at the raw center.
    assert_approx_eq!(obj.smoothed_center.x, f64::from(obj.center.x), 1e-9);
    assert_approx_eq!(obj.smoothed_center.y, f64::from(obj.center.y), 1e-9);
}

#[test]
fn test_unknown_height_yields_absent_position() {
    let mut session = TrackingSession::new(bottle_config());
    let tracked = session
        .process(1280, 720, vec![black_bottle(400.0, 300.0)])
        .unwrap();
    assert!(tracked[0].position.is_none());
    assert!(tracked[0].smoothed_world.is_none());
}

#[test]
fn test_identity_persists_across_frames() {
    let mut session = TrackingSession::new(bottle_config());
    let first = session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    // The same object drifts a little and changes apparent class; the
    // continuity group keeps its identity.
    let second = session
        .process(1280, 720, vec![black_bottle(420.0, 310.0)])
        .unwrap();
    assert_eq!(first[0].global_id, second[0].global_id);
    assert_eq!(second[0].frame, 1);
}

#[test]
fn test_degenerate_detections_never_reach_core() {
    let mut session = TrackingSession::new(bottle_config());
    let degenerate = DetectionBuilder::new()
        .class(0, "white bottle")
        .tlbr(200.0, 200.0, 200.0, 260.0)
        .build();
    let tracked = session
        .process(1280, 720, vec![degenerate, white_bottle(400.0, 300.0)])
        .unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].global_id, 0);
}

#[test]
fn test_pixel_smoothing_with_ema_policy() {
    let mut config = bottle_config();
    config.pixel_smoothing = SmootherConfig {
        policy: SmoothingPolicy::Ema { alpha: 0.4 },
        gap_reset_frames: 60,
        teleport_threshold: 300.0,
    };
    let mut session = TrackingSession::new(config);

    session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    let tracked = session
        .process(1280, 720, vec![white_bottle(410.0, 300.0)])
        .unwrap();
    // EMA with alpha 0.4: 400 + 0.4 * 10 = 404.
    assert_approx_eq!(tracked[0].smoothed_center.x, 404.0, 1e-6);
}

#[test]
fn test_reset_is_total() {
    let mut session = TrackingSession::new(bottle_config());
    session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    session
        .process(1280, 720, vec![white_bottle(410.0, 300.0)])
        .unwrap();
    assert_eq!(session.frame_index(), 2);

    session.reset();
    assert_eq!(session.frame_index(), 0);

    // Identity numbering restarts: the stream has restarted.
    let tracked = session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    assert_eq!(tracked[0].global_id, 0);
    assert_eq!(tracked[0].frame, 0);
}

#[test]
fn test_purged_identities_drop_smoother_state() {
    let mut config = bottle_config();
    config.reid.max_frames = 2;
    let mut session = TrackingSession::new(config);

    session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    assert_eq!(session.pixel_smoother().tracked_ids(), 1);
    assert_eq!(session.world_smoother().tracked_ids(), 1);

    // Empty frames: the track is demoted, ages out of the re-id window and
    // is purged; its smoother trails must go with it.
    session.process(1280, 720, vec![]).unwrap();
    session.process(1280, 720, vec![]).unwrap();
    assert_eq!(session.pixel_smoother().tracked_ids(), 1);

    session.process(1280, 720, vec![]).unwrap();
    assert!(!session.identities().contains(0));
    assert_eq!(session.pixel_smoother().tracked_ids(), 0);
    assert_eq!(session.world_smoother().tracked_ids(), 0);
}

#[test]
fn test_sessions_are_independent() {
    let mut a = TrackingSession::new(bottle_config());
    let mut b = TrackingSession::new(bottle_config());
    a.process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    // Session b never saw a's object; it starts numbering from 0.
    let tracked = b
        .process(1280, 720, vec![white_bottle(900.0, 500.0)])
        .unwrap();
    assert_eq!(tracked[0].global_id, 0);
}

#[test]
fn test_empty_frames_are_fine() {
    let mut session = TrackingSession::new(bottle_config());
    assert!(session.process(1280, 720, vec![]).unwrap().is_empty());
    session
        .process(1280, 720, vec![white_bottle(400.0, 300.0)])
        .unwrap();
    assert!(session.process(1280, 720, vec![]).unwrap().is_empty());
    // The demoted track revives when the object returns.
    let tracked = session
        .process(1280, 720, vec![white_bottle(405.0, 300.0)])
        .unwrap();
    assert_eq!(tracked[0].global_id, 0);
}
