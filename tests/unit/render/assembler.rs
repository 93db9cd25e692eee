use super::*;
use crate::effects::overlay::OverlaySpec;
use crate::effects::spec::EffectSpec;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Fps;
use crate::render::plan::build_render_plan;
use crate::timeline::scene::Scene;
use rand::{SeedableRng, rngs::StdRng};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "storyreel_assembler_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn small_config() -> RenderConfig {
    RenderConfig {
        width: 64,
        height: 36,
        fps: Fps::new(10, 1).unwrap(),
        fade_in: 0.0,
        fade_out: 0.0,
        effects: vec![EffectSpec::named("zoom_in"), EffectSpec::named("sparkle")],
        ..RenderConfig::default()
    }
}

fn plan(cfg: &RenderConfig, paths: &[PathBuf], audio: f64) -> RenderPlan {
    let n = paths.len();
    let step = audio / n as f64;
    let scenes: Vec<Scene> = (0..n)
        .map(|i| Scene::new(i, format!("scene {i}"), step * i as f64, step * (i + 1) as f64))
        .collect();
    build_render_plan(&scenes, paths, cfg, audio).unwrap()
}

fn solid(rgba: [u8; 4]) -> PreparedImage {
    PreparedImage::solid(64, 36, rgba).unwrap()
}

#[test]
fn frame_count_matches_target_duration() {
    let cfg = small_config();
    let paths = vec![PathBuf::from("a.png"), PathBuf::from("b.png"), PathBuf::from("c.png")];
    let plan = plan(&cfg, &paths, 7.4);
    let images = vec![
        solid([255, 0, 0, 255]),
        solid([0, 255, 0, 255]),
        solid([0, 0, 255, 255]),
    ];

    let mut sink = InMemorySink::new();
    let mut rng = StdRng::seed_from_u64(7);
    let stats = VideoAssembler::new(&cfg)
        .render_images_with_rng(&plan, &images, &mut sink, &mut rng)
        .unwrap();

    assert!((stats.duration_secs - 7.4).abs() < 1e-9);
    assert_eq!(stats.frames, 74);
    assert_eq!(sink.frames().len(), 74);
    assert!(sink.is_finished());
    assert!(
        sink.frames()
            .iter()
            .enumerate()
            .all(|(i, (idx, f))| idx.0 == i as u64 && f.width == 64 && f.height == 36)
    );
    // "sparkle" is not an effect and falls back to a still.
    assert_eq!(stats.fallback_effects, 1);
    assert_eq!(stats.skipped_overlays, 0);
    assert_eq!(sink.frames()[0].1.pixel(32, 18), Some([255, 0, 0, 255]));
    assert_eq!(sink.frames()[73].1.pixel(32, 18), Some([0, 0, 255, 255]));
}

#[test]
fn audio_is_passed_to_the_sink() {
    let cfg = small_config();
    let plan = plan(&cfg, &[PathBuf::from("a.png")], 1.0);
    let mut sink = InMemorySink::new();
    let mut rng = StdRng::seed_from_u64(0);
    VideoAssembler::new(&cfg)
        .with_audio("narration.mp3")
        .render_images_with_rng(&plan, &[solid([9, 9, 9, 255])], &mut sink, &mut rng)
        .unwrap();
    let sink_cfg = sink.config().unwrap();
    assert_eq!(sink_cfg.audio.as_deref(), Some(Path::new("narration.mp3")));
    assert_eq!((sink_cfg.width, sink_cfg.height), (64, 36));
}

#[test]
fn renders_images_from_disk_and_fits_them() {
    let dir = temp_dir("disk");
    let path = dir.join("wide.png");
    image::RgbaImage::from_pixel(128, 72, image::Rgba([10, 200, 30, 255]))
        .save(&path)
        .unwrap();

    let cfg = RenderConfig {
        effects: Vec::new(),
        ..small_config()
    };
    let plan = plan(&cfg, &[path.clone(), path.clone()], 2.0);
    let assembler = VideoAssembler::new(&cfg);
    let images = assembler.load_images(&plan).unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.width == 64 && i.height == 36));

    let mut sink = InMemorySink::new();
    let stats = assembler.render(&plan, &mut sink).unwrap();
    assert_eq!(stats.frames, 20);
    assert_eq!(sink.frames()[10].1.pixel(5, 5), Some([10, 200, 30, 255]));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_image_is_an_error() {
    let cfg = small_config();
    let plan = plan(&cfg, &[PathBuf::from("/nonexistent/storyreel/a.png")], 1.0);
    let mut sink = InMemorySink::new();
    assert!(VideoAssembler::new(&cfg).render(&plan, &mut sink).is_err());
}

#[test]
fn overlays_are_loaded_once_and_missing_ones_skipped() {
    let dir = temp_dir("overlay");
    image::RgbaImage::from_pixel(64, 36, image::Rgba([255, 255, 255, 255]))
        .save(dir.join("white.png"))
        .unwrap();

    let cfg = RenderConfig {
        effects: Vec::new(),
        overlays: vec![
            OverlaySpec::new("white.png", 1.0),
            OverlaySpec::new("missing.png", 0.5),
        ],
        overlay_dir: dir.clone(),
        transition: crate::effects::transitions::TransitionSpec {
            kind: "none".into(),
            duration: 0.0,
            params: serde_json::Value::Null,
        },
        ..small_config()
    };
    let paths: Vec<PathBuf> = (0..3).map(|i| PathBuf::from(format!("{i}.png"))).collect();
    let plan = plan(&cfg, &paths, 3.0);
    let images = vec![solid([0, 0, 0, 255]); 3];

    let (compositor, stats) = VideoAssembler::new(&cfg).compose(&plan, &images).unwrap();
    assert_eq!(stats.skipped_overlays, 1);
    let mut rng = StdRng::seed_from_u64(0);
    let first = compositor.frame_at(0.5, &mut rng).unwrap();
    assert_eq!(first.pixel(0, 0), Some([255, 255, 255, 255]));
    let second = compositor.frame_at(1.5, &mut rng).unwrap();
    assert_eq!(second.pixel(0, 0), Some([0, 0, 0, 255]));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn image_count_must_match_plan() {
    let cfg = small_config();
    let plan = plan(&cfg, &[PathBuf::from("a.png"), PathBuf::from("b.png")], 4.0);
    assert!(matches!(
        VideoAssembler::new(&cfg).compose(&plan, &[solid([0, 0, 0, 255])]),
        Err(ReelError::Contract(_))
    ));
}
