mod common;

use approx::assert_relative_eq;
use common::synthetic_frame::{blank_frame, paint_blob, paint_rect, to_bgra, BLUE, YELLOW};
use cone_steering::pipeline::{ExternalInputs, SteeringPipeline};
use cone_steering::segmentation::ColorThreshold;
use cone_steering::steering::{DecisionSource, ProximityReading, SteeringClass};
use cone_steering::types::{Config, MarkerColor, TrackDirection};

const WIDTH: usize = 300;
const HEIGHT: usize = 240;

/// Defaults with a smaller foreground crop so 120-row regions keep 100 rows.
fn test_config() -> Config {
    let mut config = Config::default();
    config.region.foreground_crop_px = 20;
    config
}

#[test]
fn markers_on_their_edges_drive_straight() {
    let pipeline = SteeringPipeline::new(&test_config());

    // 0.1 W and 0.9 W
    let mut region = blank_frame(WIDTH, 120);
    paint_blob(&mut region, 23, 20, BLUE);
    paint_blob(&mut region, 263, 20, YELLOW);

    let steering =
        pipeline.compute_steering(&region, &region, 0.0, TrackDirection::Clockwise, 0.3, -0.3);
    assert_eq!(steering, 0.0);
}

#[test]
fn inner_marker_at_center_steers_right() {
    let pipeline = SteeringPipeline::new(&test_config());

    let mut region = blank_frame(WIDTH, 120);
    paint_blob(&mut region, 143, 20, BLUE);

    let steering =
        pipeline.compute_steering(&region, &region, 0.0, TrackDirection::Clockwise, 0.3, -0.3);
    assert_relative_eq!(steering, -0.011, epsilon = 1e-6);
}

#[test]
fn empty_scene_keeps_previous_steering() {
    let pipeline = SteeringPipeline::new(&test_config());
    let region = blank_frame(WIDTH, 120);

    for direction in [TrackDirection::Clockwise, TrackDirection::CounterClockwise] {
        let steering = pipeline.compute_steering(&region, &region, 0.07, direction, 0.3, -0.3);
        assert_eq!(steering, 0.07);
    }

    let blue = pipeline.analyze_marker(MarkerColor::Blue, &region);
    assert!(!blue.centroid.valid);
    assert_eq!((blue.centroid.x, blue.centroid.y), (150.0, 60.0));
}

#[test]
fn blob_centroid_is_recovered() {
    let pipeline = SteeringPipeline::new(&test_config());

    let mut region = blank_frame(WIDTH, 120);
    paint_blob(&mut region, 60, 30, BLUE);

    let observation = pipeline.analyze_marker(MarkerColor::Blue, &region);
    assert_eq!(observation.contour_count, 1);
    assert!(observation.centroid.valid);
    assert_relative_eq!(observation.centroid.x, 66.5, epsilon = 1e-3);
    assert_relative_eq!(observation.centroid.y, 36.5, epsilon = 1e-3);
}

#[test]
fn out_of_range_blobs_fall_back_to_center() {
    let pipeline = SteeringPipeline::new(&test_config());

    let mut region = blank_frame(WIDTH, 120);
    // Far above the maximum area
    paint_rect(&mut region, 100, 10, 45, 45, YELLOW);
    // Elongated: area passes, aspect does not
    paint_rect(&mut region, 200, 10, 60, 6, YELLOW);

    let observation = pipeline.analyze_marker(MarkerColor::Yellow, &region);
    assert_eq!(observation.contour_count, 0);
    assert!(!observation.centroid.valid);
    assert_eq!((observation.centroid.x, observation.centroid.y), (150.0, 60.0));
}

#[test]
fn foreground_rows_are_ignored() {
    let pipeline = SteeringPipeline::new(&test_config());

    // Blob entirely inside the bottom 20 rows
    let mut region = blank_frame(WIDTH, 120);
    paint_blob(&mut region, 140, 103, BLUE);

    assert!(!pipeline.analyze_marker(MarkerColor::Blue, &region).centroid.valid);
}

#[test]
fn bgra_frames_match_rgb_frames() {
    let pipeline = SteeringPipeline::new(&test_config());

    let mut region = blank_frame(WIDTH, 120);
    paint_blob(&mut region, 143, 20, BLUE);
    let rgb = pipeline.analyze_marker(MarkerColor::Blue, &region);
    let bgra = pipeline.analyze_marker(MarkerColor::Blue, &to_bgra(&region));

    assert_eq!(rgb, bgra);
}

#[test]
fn classifier_keeps_direction_on_ambiguous_frames() {
    let pipeline = SteeringPipeline::new(&test_config());

    let mut left_only = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut left_only, 40, 50, YELLOW);
    let direction = pipeline.classify_direction(&left_only, TrackDirection::Unknown);
    assert_eq!(direction, TrackDirection::Clockwise);

    let mut both = left_only.clone();
    paint_blob(&mut both, 240, 50, YELLOW);
    assert_eq!(pipeline.classify_direction(&both, direction), TrackDirection::Clockwise);

    let empty = blank_frame(WIDTH, HEIGHT);
    assert_eq!(pipeline.classify_direction(&empty, direction), TrackDirection::Clockwise);

    let mut right_only = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut right_only, 240, 50, YELLOW);
    assert_eq!(
        pipeline.classify_direction(&right_only, direction),
        TrackDirection::CounterClockwise
    );
}

#[test]
fn classifier_ignores_the_bottom_of_the_frame() {
    let pipeline = SteeringPipeline::new(&test_config());

    // Below 80 % of the frame height
    let mut frame = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut frame, 40, 210, YELLOW);
    assert_eq!(
        pipeline.classify_direction(&frame, TrackDirection::Unknown),
        TrackDirection::Unknown
    );
}

#[test]
fn process_frame_tracks_direction_and_previous_command() {
    let mut pipeline = SteeringPipeline::new(&test_config());

    // Yellow in the top-left (classifier only), blue at the center of the ROI
    let mut frame = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut frame, 40, 50, YELLOW);
    paint_blob(&mut frame, 143, 140, BLUE);

    let first = pipeline.process_frame(&frame, ExternalInputs::default());
    assert_eq!(first.frame_id, 0);
    assert!(first.direction_checked);
    assert_eq!(first.direction, TrackDirection::Clockwise);
    assert!(first.blue.detected());
    assert!(!first.yellow.detected());
    assert!(matches!(
        first.decision.source,
        DecisionSource::ZoneRule(SteeringClass::Right(_))
    ));
    assert_relative_eq!(first.steering(), -0.011, epsilon = 1e-6);

    // Nothing visible: direction and command carry over
    let second = pipeline.process_frame(&blank_frame(WIDTH, HEIGHT), ExternalInputs::default());
    assert_eq!(second.direction, TrackDirection::Clockwise);
    assert_eq!(second.decision.source, DecisionSource::NoAdjustment);
    assert_eq!(second.steering(), first.steering());
    assert_eq!(pipeline.previous_steering(), first.steering());

    let summary = pipeline.metrics().summary();
    assert_eq!(summary.total_frames, 2);
    assert_eq!(summary.classifier_runs, 2);
    assert_eq!(summary.direction_changes, 1);
    assert_eq!(summary.rule_hits.get("right_mild"), Some(&1));
}

#[test]
fn alternate_steering_used_while_direction_unknown() {
    let mut pipeline = SteeringPipeline::new(&test_config());
    let inputs = ExternalInputs {
        alternate: Some(0.12),
        proximity: None,
    };

    let ctx = pipeline.process_frame(&blank_frame(WIDTH, HEIGHT), inputs);
    assert_eq!(ctx.direction, TrackDirection::Unknown);
    assert_eq!(ctx.decision.source, DecisionSource::Alternate);
    assert_eq!(ctx.steering(), 0.12);
    assert_eq!(pipeline.previous_steering(), 0.12);
}

#[test]
fn closest_cone_steers_while_direction_unknown() {
    let mut pipeline = SteeringPipeline::new(&test_config());

    // Only blue: the yellow-based classifier stays undecided
    let mut frame = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut frame, 143, 140, BLUE);

    let ctx = pipeline.process_frame(&frame, ExternalInputs::default());
    assert_eq!(ctx.direction, TrackDirection::Unknown);
    assert_eq!(ctx.decision.source, DecisionSource::Alternate);

    // Centroid (149.5, 26.5) seen from (150, 120): just left of straight ahead
    let expected = (-93.5f32).atan2(-0.5) / std::f32::consts::PI * 0.3;
    assert_relative_eq!(ctx.steering(), expected, epsilon = 1e-3);
    assert_eq!(ctx.alternate, Some(ctx.steering()));
}

#[test]
fn external_alternate_overrides_closest_cone() {
    let mut pipeline = SteeringPipeline::new(&test_config());

    let mut frame = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut frame, 143, 140, BLUE);
    let inputs = ExternalInputs {
        alternate: Some(0.2),
        proximity: None,
    };

    let ctx = pipeline.process_frame(&frame, inputs);
    assert_eq!(ctx.decision.source, DecisionSource::Alternate);
    assert_eq!(ctx.steering(), 0.2);
}

#[test]
fn disabled_closest_cone_falls_back_to_zone_rules() {
    let mut config = test_config();
    config.steering.closest_cone.enabled = false;
    let mut pipeline = SteeringPipeline::new(&config);

    let mut frame = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut frame, 143, 140, BLUE);

    let ctx = pipeline.process_frame(&frame, ExternalInputs::default());
    assert_eq!(ctx.direction, TrackDirection::Unknown);
    assert_eq!(ctx.alternate, None);
    assert!(matches!(ctx.decision.source, DecisionSource::ZoneRule(_)));
}

#[test]
fn proximity_nudges_when_no_marker_is_visible() {
    let mut pipeline = SteeringPipeline::new(&test_config());
    let left_close = ExternalInputs {
        alternate: None,
        proximity: Some(ProximityReading {
            left: 0.001,
            right: 1.0,
        }),
    };

    let first = pipeline.process_frame(&blank_frame(WIDTH, HEIGHT), left_close);
    assert_eq!(first.alternate, None);
    assert_eq!(first.decision.source, DecisionSource::Proximity);
    assert_relative_eq!(first.steering(), 0.05, epsilon = 1e-6);

    let second = pipeline.process_frame(&blank_frame(WIDTH, HEIGHT), left_close);
    assert_relative_eq!(second.steering(), 0.1, epsilon = 1e-6);
}

#[test]
fn path_points_pair_blue_with_nearest_yellow() {
    let mut pipeline = SteeringPipeline::new(&test_config());

    let mut frame = blank_frame(WIDTH, HEIGHT);
    paint_blob(&mut frame, 23, 140, BLUE);
    paint_blob(&mut frame, 263, 140, YELLOW);

    let ctx = pipeline.process_frame(&frame, ExternalInputs::default());
    assert_eq!(ctx.path.len(), 1);
    assert_relative_eq!(ctx.path[0].x, 149.5, epsilon = 1e-3);
    assert_relative_eq!(ctx.path[0].y, 26.5, epsilon = 1e-3);
}

#[test]
fn reconfigured_threshold_takes_effect() {
    let mut pipeline = SteeringPipeline::new(&test_config());

    let mut region = blank_frame(WIDTH, 120);
    paint_blob(&mut region, 143, 20, BLUE);
    assert!(pipeline.analyze_marker(MarkerColor::Blue, &region).detected());

    // Hue band that excludes pure blue
    pipeline.reconfigure(MarkerColor::Blue, ColorThreshold::new([0, 44, 43], [60, 255, 255]));
    assert!(!pipeline.analyze_marker(MarkerColor::Blue, &region).detected());
}
