use super::*;

#[test]
fn known_kinds_parse() {
    let null = serde_json::Value::Null;
    assert_eq!(
        parse_transition_kind_params("none", &null).unwrap(),
        TransitionKind::None
    );
    assert_eq!(
        parse_transition_kind_params(" Dissolve ", &null).unwrap(),
        TransitionKind::Dissolve
    );
    assert_eq!(
        parse_transition_kind_params("crossfade", &null).unwrap(),
        TransitionKind::Dissolve
    );
    assert_eq!(
        parse_transition_kind_params("fade", &null).unwrap(),
        TransitionKind::Fade
    );
}

#[test]
fn unknown_kind_is_unsupported_not_an_error() {
    let kind = parse_transition_kind_params("spiral", &serde_json::Value::Null).unwrap();
    assert_eq!(kind, TransitionKind::Unsupported("spiral".to_string()));
    assert!(!kind.is_overlapping());
}

#[test]
fn wipe_parses_dir_aliases_and_soft_edge() {
    let kind =
        parse_transition_kind_params("wipe", &serde_json::json!({"dir": "rtl", "soft_edge": 2.0}))
            .unwrap();
    assert_eq!(
        kind,
        TransitionKind::Wipe {
            dir: WipeDir::RightToLeft,
            soft_edge: 1.0
        }
    );

    let kind = parse_transition_kind_params("wipe", &serde_json::Value::Null).unwrap();
    assert_eq!(
        kind,
        TransitionKind::Wipe {
            dir: WipeDir::LeftToRight,
            soft_edge: 0.0
        }
    );
}

#[test]
fn wipe_rejects_bad_params() {
    assert!(parse_transition_kind_params("wipe", &serde_json::json!([1, 2])).is_err());
    assert!(parse_transition_kind_params("wipe", &serde_json::json!({"dir": "diagonal"})).is_err());
}

#[test]
fn overlap_only_for_overlapping_kinds() {
    assert_eq!(Transition::dissolve(1.0).overlap(), 1.0);
    assert_eq!(Transition::dissolve(0.0).overlap(), 0.0);
    assert_eq!(Transition::none().overlap(), 0.0);
    let unsupported = Transition {
        kind: TransitionKind::Unsupported("x".into()),
        duration: 2.0,
    };
    assert_eq!(unsupported.overlap(), 0.0);
}

#[test]
fn spec_deserializes_type_field() {
    let spec: TransitionSpec = serde_json::from_str(r#"{"type": "fade", "duration": 0.5}"#).unwrap();
    let t = Transition::from_spec(&spec).unwrap();
    assert_eq!(t.kind, TransitionKind::Fade);
    assert_eq!(t.duration, 0.5);
    assert_eq!(parse_transition(&spec).unwrap(), TransitionKind::Fade);
}

#[test]
fn negative_duration_is_rejected() {
    let spec = TransitionSpec {
        kind: "dissolve".into(),
        duration: -1.0,
        params: serde_json::Value::Null,
    };
    assert!(Transition::from_spec(&spec).is_err());
}
