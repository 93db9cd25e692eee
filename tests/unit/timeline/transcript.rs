use super::*;

#[test]
fn well_formed_spans_pass() {
    let spans = vec![
        TranscriptionSpan::new("a", 0.0, 1.0),
        TranscriptionSpan::new("b", 1.0, 2.5),
        TranscriptionSpan::new("c", 3.0, 4.0),
    ];
    validate_spans(&spans).unwrap();
    assert_eq!(spans[1].duration(), 1.5);
    assert_eq!(spans[2].midpoint(), 3.5);
}

#[test]
fn contract_violations_are_rejected() {
    let cases: Vec<Vec<TranscriptionSpan>> = vec![
        vec![],
        vec![TranscriptionSpan::new("a", 1.0, 1.0)],
        vec![TranscriptionSpan::new("a", 2.0, 1.0)],
        vec![TranscriptionSpan::new("a", f64::NAN, 1.0)],
        vec![TranscriptionSpan::new("a", -1.0, 1.0)],
        vec![
            TranscriptionSpan::new("a", 0.0, 2.0),
            TranscriptionSpan::new("b", 1.0, 3.0),
        ],
    ];
    for spans in cases {
        let err = validate_spans(&spans).unwrap_err();
        assert!(matches!(err, ReelError::Contract(_)), "{spans:?}");
    }
}

#[test]
fn load_reads_json_array() {
    let dir = std::env::temp_dir().join(format!("storyreel_transcript_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("t.json");
    std::fs::write(
        &path,
        r#"[{"text": "Hello world.", "start": 0.0, "end": 3.0}]"#,
    )
    .unwrap();

    let spans = load_transcript(&path).unwrap();
    assert_eq!(spans, vec![TranscriptionSpan::new("Hello world.", 0.0, 3.0)]);

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(load_transcript(&path), Err(ReelError::Serde(_))));
    let _ = std::fs::remove_dir_all(&dir);
}
