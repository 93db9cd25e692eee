use super::*;

#[test]
fn close_boundaries_removes_gaps() {
    let mut scenes = vec![
        Scene::new(7, "a", 0.4, 2.0),
        Scene::new(8, "b", 2.5, 5.0),
        Scene::new(9, "c", 6.0, 8.0),
    ];
    close_boundaries(&mut scenes, 10.0);

    assert_eq!(
        scenes.iter().map(|s| (s.start, s.end)).collect::<Vec<_>>(),
        vec![(0.0, 2.5), (2.5, 6.0), (6.0, 10.0)]
    );
    assert_eq!(
        scenes.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(scenes[2].duration, 4.0);
    check_coverage(&scenes, 10.0).unwrap();
}

#[test]
fn coverage_detects_gaps_and_short_totals() {
    let scenes = vec![Scene::new(0, "a", 0.0, 2.0), Scene::new(1, "b", 2.5, 4.0)];
    assert!(check_coverage(&scenes, 4.0).is_err());

    let scenes = vec![Scene::new(0, "a", 0.0, 2.0)];
    assert!(check_coverage(&scenes, 3.0).is_err());
    assert!(check_coverage(&[], 3.0).is_err());
}

#[test]
fn optional_fields_are_omitted_from_json() {
    let json = serde_json::to_value(Scene::new(0, "x", 0.0, 1.0)).unwrap();
    let obj = json.as_object().unwrap();
    assert!(!obj.contains_key("image_path"));
    assert!(!obj.contains_key("narrative_unit"));
    assert_eq!(obj["duration"], serde_json::json!(1.0));
}
