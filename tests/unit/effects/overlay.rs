use super::*;

fn white_layer(spec: &OverlaySpec) -> OverlayLayer {
    let img = PreparedImage::solid(2, 2, [255, 255, 255, 255]).unwrap();
    OverlayLayer::new(OverlaySource::still(img), spec).unwrap()
}

#[test]
fn opacity_outside_unit_range_is_rejected() {
    assert!(OverlaySpec::new("grain.png", 1.5).validate().is_err());
    assert!(OverlaySpec::new("grain.png", -0.1).validate().is_err());
    assert!(OverlaySpec::new("", 0.5).validate().is_err());
    assert!(OverlaySpec::new("grain.png", 0.5).validate().is_ok());
}

#[test]
fn active_window_follows_offset_and_duration() {
    let spec = OverlaySpec {
        name: "leak.png".into(),
        opacity: 0.5,
        start_offset: 1.0,
        duration: Some(2.0),
    };
    let layer = white_layer(&spec);
    assert!(!layer.is_active(0.5));
    assert!(layer.is_active(1.0));
    assert!(layer.is_active(2.9));
    assert!(!layer.is_active(3.0));

    let open = white_layer(&OverlaySpec::new("leak.png", 0.5));
    assert!(open.is_active(0.0));
    assert!(open.is_active(1000.0));
}

#[test]
fn apply_blends_with_opacity() {
    let layer = white_layer(&OverlaySpec::new("leak.png", 0.5));
    let mut dst = [0u8, 0, 0, 255].repeat(4);
    layer.apply(&mut dst, 0.0).unwrap();
    assert_eq!(&dst[0..4], &[128, 128, 128, 255]);
}

fn canvas() -> Canvas {
    Canvas {
        width: 4,
        height: 4,
    }
}

#[test]
fn missing_overlay_file_errors_with_path() {
    let dir = std::env::temp_dir().join("storyreel_no_such_overlay_dir");
    let fps = Fps::new(24, 1).unwrap();
    let err = OverlaySource::load(&OverlaySpec::new("missing.png", 0.5), &dir, canvas(), fps, 5.0)
        .unwrap_err();
    assert!(err.to_string().contains("missing.png"));
    // Video names go through ffprobe, which fails on a missing file (or a missing ffprobe).
    assert!(
        OverlaySource::load(&OverlaySpec::new("missing.mp4", 0.5), &dir, canvas(), fps, 5.0)
            .is_err()
    );
}

fn two_frame_source() -> OverlaySource {
    let red = PreparedImage::solid(2, 2, [255, 0, 0, 255]).unwrap();
    let blue = PreparedImage::solid(2, 2, [0, 0, 255, 255]).unwrap();
    OverlaySource::from_frames(vec![red, blue], Fps::new(2, 1).unwrap()).unwrap()
}

#[test]
fn video_overlay_loops_from_its_start_offset() {
    let source = two_frame_source();
    assert_eq!(source.frame_count(), 2);
    assert_eq!(source.loop_duration(), 1.0);

    let spec = OverlaySpec {
        name: "leak.mp4".into(),
        opacity: 1.0,
        start_offset: 0.5,
        duration: None,
    };
    let layer = OverlayLayer::new(source, &spec).unwrap();
    let color_at = |t: f64| {
        let mut dst = [0u8, 0, 0, 255].repeat(4);
        layer.apply(&mut dst, t).unwrap();
        [dst[0], dst[1], dst[2], dst[3]]
    };
    assert_eq!(color_at(0.25), [0, 0, 0, 255]);
    assert_eq!(color_at(0.5), [255, 0, 0, 255]);
    assert_eq!(color_at(0.9), [255, 0, 0, 255]);
    assert_eq!(color_at(1.0), [0, 0, 255, 255]);
    // One full loop later the sequence starts again.
    assert_eq!(color_at(1.5), [255, 0, 0, 255]);
    assert_eq!(color_at(2.0), [0, 0, 255, 255]);
    assert_eq!(color_at(10.5), [255, 0, 0, 255]);
}

#[test]
fn still_source_ignores_time() {
    let still = OverlaySource::still(PreparedImage::solid(2, 2, [9, 9, 9, 255]).unwrap());
    assert_eq!(still.frame_count(), 1);
    assert_eq!(still.loop_duration(), 0.0);
    assert_eq!(still.frame_at(0.0).rgba8_premul, still.frame_at(123.4).rgba8_premul);
}

#[test]
fn frame_sequences_must_be_non_empty_and_uniform() {
    let fps = Fps::new(24, 1).unwrap();
    assert!(OverlaySource::from_frames(Vec::new(), fps).is_err());
    let mixed = vec![
        PreparedImage::solid(2, 2, [0, 0, 0, 255]).unwrap(),
        PreparedImage::solid(3, 2, [0, 0, 0, 255]).unwrap(),
    ];
    assert!(OverlaySource::from_frames(mixed, fps).is_err());
}

#[test]
fn spec_defaults_from_json() {
    let spec: OverlaySpec = serde_json::from_str(r#"{"name": "dust.png"}"#).unwrap();
    assert_eq!(spec.opacity, 0.3);
    assert_eq!(spec.start_offset, 0.0);
    assert_eq!(spec.duration, None);
}
