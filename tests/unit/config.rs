use super::*;

#[test]
fn empty_object_is_the_default_config() {
    let cfg = RenderConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, RenderConfig::default());
    assert_eq!(cfg.canvas(), Canvas { width: 1920, height: 1080 });
    assert_eq!(cfg.transition.kind, "dissolve");
    assert_eq!(cfg.effects.len(), 5);
}

#[test]
fn partial_config_keeps_other_defaults() {
    let cfg = RenderConfig::from_json_str(
        r#"{
            "width": 640,
            "height": 360,
            "fps": {"num": 30, "den": 1},
            "segmentation": {"mode": "duration", "target_scene_duration": 8.0},
            "transition": {"type": "wipe", "duration": 0.5},
            "effects": [{"name": "shake", "params": {"intensity": 4}}],
            "overlays": [{"name": "grain.png"}]
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps.as_f64(), 30.0);
    assert_eq!(cfg.segmentation.target_scene_duration, 8.0);
    assert_eq!(cfg.segmentation.max_scene_duration, 15.0);
    assert_eq!(cfg.transition.duration, 0.5);
    assert_eq!(cfg.overlays[0].opacity, 0.3);
    assert_eq!(cfg.reconcile, ReconcilePolicy::default());
    assert_eq!(cfg.global_fade().fade_in, 1.0);
}

#[test]
fn rejects_invalid_values() {
    let bad = [
        r#"{"width": 0}"#,
        r#"{"width": 641}"#,
        r#"{"fps": {"num": 0, "den": 1}}"#,
        r#"{"fade_in": -1.0}"#,
        r#"{"transition": {"type": "dissolve", "duration": -2.0}}"#,
        r#"{"segmentation": {"max_scene_duration": 0.0}}"#,
        r#"{"overlays": [{"name": "grain.png", "opacity": 1.5}]}"#,
        r#"{"reconcile": {"min_clip_duration": 0.0}}"#,
    ];
    for json in bad {
        assert!(
            matches!(RenderConfig::from_json_str(json), Err(ReelError::Validation(_))),
            "{json}"
        );
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        RenderConfig::from_json_str("{\"width\": \"wide\"}"),
        Err(ReelError::Serde(_))
    ));
}

#[test]
fn unknown_effects_do_not_fail_validation() {
    let cfg = RenderConfig::from_json_str(r#"{"effects": [{"name": "sparkle"}]}"#).unwrap();
    assert_eq!(cfg.effects[0].name, "sparkle");
}

#[test]
fn missing_file_is_reported() {
    let err = RenderConfig::from_path(Path::new("/nonexistent/storyreel.json")).unwrap_err();
    assert!(err.to_string().contains("storyreel.json"));
}
