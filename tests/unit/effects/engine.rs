use super::*;
use rand::{SeedableRng, rngs::StdRng};

fn gray(w: u32, h: u32) -> PreparedImage {
    PreparedImage::solid(w, h, [120, 120, 120, 255]).unwrap()
}

fn clip(name: &str, params: serde_json::Value, duration: f64) -> ClipRenderer {
    try_apply_effect(&gray(100, 100), duration, &EffectSpec::new(name, params)).unwrap()
}

const ALL_EFFECTS: [&str; 15] = [
    "zoom_in",
    "zoom_out",
    "pan_left",
    "pan_right",
    "pan_up",
    "pan_down",
    "kenburns",
    "shake",
    "shake_zoom_combo",
    "shake_kenburns_combo",
    "fade_in",
    "fade_out",
    "mirror_x",
    "mirror_y",
    "rotate_180",
];

#[test]
fn zoom_in_window_goes_from_full_to_half() {
    let clip = clip("zoom_in", serde_json::json!({"zoom_factor": 2.0}), 1.0);
    let mut rng = StdRng::seed_from_u64(1);

    let start = clip.crop_window(0.0, &mut rng).unwrap();
    assert!(start.is_full(100, 100));

    let end = clip.crop_window(1.0, &mut rng).unwrap();
    assert_eq!(
        end,
        CropWindow {
            x: 25,
            y: 25,
            width: 50,
            height: 50
        }
    );
}

#[test]
fn zoom_out_mirrors_zoom_in() {
    let clip = clip("zoom_out", serde_json::json!({"zoom_factor": 2.0}), 2.0);
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(clip.crop_window(0.0, &mut rng).unwrap().width, 50);
    assert!(clip.crop_window(2.0, &mut rng).unwrap().is_full(100, 100));
}

#[test]
fn windows_stay_inside_source_for_every_effect() {
    let mut rng = StdRng::seed_from_u64(7);
    for name in ALL_EFFECTS {
        let clip = try_apply_effect(&gray(64, 48), 3.0, &EffectSpec::named(name)).unwrap();
        for i in 0..=60 {
            let t = 3.0 * f64::from(i) / 60.0;
            if let Some(w) = clip.crop_window(t, &mut rng) {
                assert!(w.fits_within(64, 48), "{name} at t={t}: {w:?}");
            }
        }
    }
}

#[test]
fn rendered_frames_keep_source_size() {
    let mut rng = StdRng::seed_from_u64(3);
    for name in ["zoom_in", "pan_up", "shake", "kenburns", "fade_out"] {
        let clip = try_apply_effect(&gray(40, 30), 2.0, &EffectSpec::named(name)).unwrap();
        for t in [0.0, 0.7, 2.0] {
            let frame = clip.render_frame(t, &mut rng).unwrap();
            assert_eq!((frame.width, frame.height), (40, 30), "{name}");
            assert_eq!(frame.data.len(), 40 * 30 * 4);
            assert!(frame.premultiplied);
        }
    }
}

#[test]
fn unknown_effect_falls_back_to_still() {
    let src = gray(10, 10);
    let (clip, err) = build_clip(&src, 2.0, &EffectSpec::named("wobble")).unwrap();
    assert!(clip.effect().is_none());
    assert_eq!(err, Some(EffectError::UnknownEffect("wobble".into())));

    let mut rng = StdRng::seed_from_u64(0);
    let frame = clip.render_frame(1.0, &mut rng).unwrap();
    assert_eq!(frame.data, *src.rgba8_premul);
}

#[test]
fn bad_params_fall_back_and_try_reports_effect_error() {
    let src = gray(10, 10);
    let spec = EffectSpec::new("zoom_in", serde_json::json!({"zoom_factor": 0.5}));
    let err = try_apply_effect(&src, 1.0, &spec).unwrap_err();
    assert!(matches!(err, ReelError::Effect(EffectError::InvalidParam { .. })));

    let clip = apply_effect(&src, 1.0, &spec).unwrap();
    assert!(clip.effect().is_none());
    assert_eq!(clip.duration(), 1.0);
}

#[test]
fn non_positive_duration_is_an_effect_error() {
    let err = try_apply_effect(&gray(4, 4), 0.0, &EffectSpec::named("zoom_in")).unwrap_err();
    assert!(matches!(
        err,
        ReelError::Effect(EffectError::InvalidDuration(_))
    ));
}

#[test]
fn pan_moves_from_edge_bias_to_center() {
    let mut rng = StdRng::seed_from_u64(0);
    let left = clip("pan_left", serde_json::Value::Null, 2.0);
    let c0 = left.camera(0.0, &mut rng).unwrap();
    let c1 = left.camera(2.0, &mut rng).unwrap();
    assert!((c0.center.x - 0.7).abs() < 1e-12);
    assert!((c1.center.x - 0.5).abs() < 1e-12);
    assert!((c0.zoom - 1.3).abs() < 1e-12);

    let down = clip("pan_down", serde_json::Value::Null, 2.0);
    let c0 = down.camera(0.0, &mut rng).unwrap();
    assert!((c0.center.y - 0.3).abs() < 1e-12);
    assert!((c0.center.x - 0.5).abs() < 1e-12);
}

#[test]
fn kenburns_interpolates_zoom_and_center() {
    let mut rng = StdRng::seed_from_u64(0);
    let kb = clip("kenburns", serde_json::Value::Null, 4.0);
    let start = kb.camera(0.0, &mut rng).unwrap();
    let end = kb.camera(4.0, &mut rng).unwrap();
    assert!((start.zoom - 1.0).abs() < 1e-12);
    assert!((end.zoom - 1.5).abs() < 1e-12);
    assert!((start.center.x - 0.45).abs() < 1e-12);
    assert!((end.center.y - 0.6).abs() < 1e-12);

    let mid = kb.camera(2.0, &mut rng).unwrap();
    assert!((mid.zoom - 1.25).abs() < 1e-9);
}

#[test]
fn shake_is_bounded_and_seed_deterministic() {
    let shake = clip("shake", serde_json::json!({"intensity": 5.0}), 2.0);

    let mut a = StdRng::seed_from_u64(42);
    let mut b = StdRng::seed_from_u64(42);
    for i in 0..20 {
        let t = f64::from(i) * 0.1;
        let ca = shake.camera(t, &mut a).unwrap();
        let cb = shake.camera(t, &mut b).unwrap();
        assert_eq!(ca, cb);
        assert!((ca.center.x - 0.5).abs() <= 5.0 / 100.0 + 1e-12);
        assert!((ca.center.y - 0.5).abs() <= 5.0 / 100.0 + 1e-12);
        assert!((ca.zoom - 1.15).abs() < 1e-12);
    }
}

#[test]
fn zero_intensity_shake_is_centered() {
    let shake = clip("shake", serde_json::json!({"intensity": 0.0}), 1.0);
    let mut rng = StdRng::seed_from_u64(9);
    let cam = shake.camera(0.5, &mut rng).unwrap();
    assert_eq!(cam.center, Point::new(0.5, 0.5));
}

#[test]
fn shake_zoom_combo_runs_its_three_phases() {
    // 2s shake, then 60% of the remaining 5s zooming in, then 40% zooming from out to in.
    let combo = clip("shake_zoom_combo", serde_json::Value::Null, 7.0);
    let mut rng = StdRng::seed_from_u64(5);

    let shaking = combo.camera(1.0, &mut rng).unwrap();
    assert!((shaking.zoom - 1.2).abs() < 1e-12);

    let zoom_start = combo.camera(2.0 + 1e-9, &mut rng).unwrap();
    assert!((zoom_start.zoom - 1.0).abs() < 1e-6);
    assert_eq!(zoom_start.center, Point::new(0.5, 0.5));

    let zoom_peak = combo.camera(5.0, &mut rng).unwrap();
    assert!((zoom_peak.zoom - 1.4).abs() < 1e-9);

    let out_start = combo.camera(5.0 + 1e-9, &mut rng).unwrap();
    assert!((out_start.zoom - 1.6).abs() < 1e-6);

    let end = combo.camera(7.0, &mut rng).unwrap();
    assert!((end.zoom - 1.4).abs() < 1e-12);
}

#[test]
fn shake_longer_than_clip_is_all_shake() {
    let combo = clip(
        "shake_kenburns_combo",
        serde_json::json!({"shake_duration": 10.0}),
        2.0,
    );
    let mut rng = StdRng::seed_from_u64(5);
    for t in [0.0, 1.0, 2.0] {
        let cam = combo.camera(t, &mut rng).unwrap();
        assert!((cam.zoom - 1.15).abs() < 1e-12);
    }
}

#[test]
fn shake_then_kenburns_hands_over_after_shake_duration() {
    let combo = clip(
        "shake_kenburns_combo",
        serde_json::json!({
            "shake_duration": 1.0,
            "zoom_factor_shake": 1.25,
            "kenburns_zoom_start": 1.1,
            "kenburns_zoom_end": 1.6,
            "kenburns_pan_start": [0.3, 0.4],
            "kenburns_pan_end": [0.7, 0.6]
        }),
        3.0,
    );
    let mut rng = StdRng::seed_from_u64(11);

    let shaking = combo.camera(0.5, &mut rng).unwrap();
    assert!((shaking.zoom - 1.25).abs() < 1e-12);

    let kb_start = combo.camera(1.0 + 1e-9, &mut rng).unwrap();
    assert!((kb_start.zoom - 1.1).abs() < 1e-6);
    assert!((kb_start.center.x - 0.3).abs() < 1e-6);
    assert!((kb_start.center.y - 0.4).abs() < 1e-6);

    let mid = combo.camera(2.0, &mut rng).unwrap();
    assert!(mid.zoom > 1.1 && mid.zoom < 1.6);
    assert!(mid.center.x > 0.3 && mid.center.x < 0.7);

    let kb_end = combo.camera(3.0, &mut rng).unwrap();
    assert!((kb_end.zoom - 1.6).abs() < 1e-12);
    assert!((kb_end.center.x - 0.7).abs() < 1e-12);
    assert!((kb_end.center.y - 0.6).abs() < 1e-12);

    // The Ken Burns phase is deterministic.
    let again = combo.camera(2.0, &mut StdRng::seed_from_u64(99)).unwrap();
    assert_eq!(again, mid);
}

#[test]
fn fades_scale_alpha_linearly() {
    let fade_in = clip("fade_in", serde_json::json!({"duration": 1.0}), 3.0);
    assert_eq!(fade_in.alpha(0.0), 0.0);
    assert!((fade_in.alpha(0.5) - 0.5).abs() < 1e-6);
    assert_eq!(fade_in.alpha(2.0), 1.0);

    let fade_out = clip("fade_out", serde_json::json!({"duration": 1.0}), 3.0);
    assert_eq!(fade_out.alpha(1.0), 1.0);
    assert_eq!(fade_out.alpha(3.0), 0.0);

    let mut rng = StdRng::seed_from_u64(0);
    let first = fade_in.render_frame(0.0, &mut rng).unwrap();
    assert!(first.data.iter().all(|&b| b == 0));
}

#[test]
fn mirror_and_rotate_move_pixels() {
    // 2x1: red on the left, blue on the right.
    let mut data = vec![255u8, 0, 0, 255];
    data.extend_from_slice(&[0, 0, 255, 255]);
    let src = PreparedImage::from_premul(2, 1, data).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    for name in ["mirror_x", "rotate_180"] {
        let clip = try_apply_effect(&src, 1.0, &EffectSpec::named(name)).unwrap();
        let frame = clip.render_frame(0.5, &mut rng).unwrap();
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]), "{name}");
        assert_eq!(frame.pixel(1, 0), Some([255, 0, 0, 255]), "{name}");
    }

    let clip = try_apply_effect(&src, 1.0, &EffectSpec::named("mirror_y")).unwrap();
    let frame = clip.render_frame(0.5, &mut rng).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn overlay_is_drawn_over_clip() {
    let overlay = OverlayLayer::new(
        crate::effects::overlay::OverlaySource::still(
            PreparedImage::solid(4, 4, [255, 255, 255, 255]).unwrap(),
        ),
        &crate::effects::overlay::OverlaySpec::new("white.png", 1.0),
    )
    .unwrap();
    let clip = ClipRenderer::still(&PreparedImage::solid(4, 4, [0, 0, 0, 255]).unwrap(), 1.0)
        .unwrap()
        .with_overlay(overlay);
    let mut rng = StdRng::seed_from_u64(0);
    let frame = clip.render_frame(0.0, &mut rng).unwrap();
    assert_eq!(frame.pixel(3, 3), Some([255, 255, 255, 255]));
}
