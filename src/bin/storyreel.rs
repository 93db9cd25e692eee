use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storyreel::timeline::document::ProjectSummary;
use storyreel::timeline::planning::{estimate_num_images, optimal_scene_duration};
use storyreel::{
    FfmpegSink, FfmpegSinkOpts, RenderConfig, RenderPlan, SceneSegmenter, ScenesDocument,
    Transition, VideoAssembler, build_render_plan, load_transcript,
};

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    /// Render configuration JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cut a transcription into scenes and write a scenes document.
    Segment(SegmentArgs),
    /// Pair scenes with images and write a render plan.
    Plan(PlanArgs),
    /// Render a plan to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SegmentArgs {
    /// Transcription JSON: a list of `{text, start, end}` spans.
    #[arg(long)]
    transcript: PathBuf,

    /// Script the narration was read from, paragraphs separated by blank lines.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Narration length in seconds; defaults to the end of the last span.
    #[arg(long)]
    audio_duration: Option<f64>,

    /// Project title stored in the document.
    #[arg(long)]
    title: Option<String>,

    /// Output scenes document.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Scenes document written by `segment`.
    #[arg(long)]
    scenes: PathBuf,

    /// One image per scene, in scene order.
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Directory of images used in file name order when no `--image` is given.
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Target video length in seconds; defaults to the document's total duration.
    #[arg(long)]
    audio_duration: Option<f64>,

    /// Output plan JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render plan written by `plan`.
    #[arg(long)]
    plan: PathBuf,

    /// Narration audio to mux into the video.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };
    match cli.cmd {
        Command::Segment(args) => cmd_segment(&config, args),
        Command::Plan(args) => cmd_plan(&config, args),
        Command::Render(args) => cmd_render(&config, args),
    }
}

fn cmd_segment(config: &RenderConfig, args: SegmentArgs) -> anyhow::Result<()> {
    let spans = load_transcript(&args.transcript)?;
    let script = args
        .script
        .as_deref()
        .map(|p| {
            std::fs::read_to_string(p).with_context(|| format!("read script '{}'", p.display()))
        })
        .transpose()?;

    let policy = &config.segmentation;
    let scenes = SceneSegmenter::new(policy).segment(&spans, script.as_deref(), args.audio_duration)?;
    let doc = ScenesDocument::new(
        ProjectSummary {
            title: args.title,
            ..ProjectSummary::default()
        },
        scenes,
        policy.mode,
        policy.target_scene_duration,
    );
    doc.save(&args.out)?;

    let total = doc.generation.total_duration;
    let transition = Transition::from_spec(&config.transition)?;
    let suggested = estimate_num_images(total, 4, policy.max_scene_duration);
    tracing::info!(
        suggested_images = suggested,
        seconds_per_image = optimal_scene_duration(total, suggested, &transition),
        "image budget for a fixed-count slideshow"
    );
    eprintln!("wrote {} ({} scenes)", args.out.display(), doc.scenes.len());
    Ok(())
}

fn cmd_plan(config: &RenderConfig, args: PlanArgs) -> anyhow::Result<()> {
    let doc = ScenesDocument::load(&args.scenes)?;
    let images = if !args.images.is_empty() {
        args.images
    } else if let Some(dir) = &args.images_dir {
        list_images(dir)?
    } else {
        anyhow::bail!("pass --image for every scene or --images-dir");
    };
    let audio_duration = args
        .audio_duration
        .unwrap_or(doc.generation.total_duration);

    let plan = build_render_plan(&doc.scenes, &images, config, audio_duration)?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, plan.to_json_pretty()?)
        .with_context(|| format!("write plan '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} clips, {:.2}s, {:?})",
        args.out.display(),
        plan.clip_specs.len(),
        plan.rendered_total,
        plan.outcome
    );
    Ok(())
}

fn cmd_render(config: &RenderConfig, args: RenderArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.plan)
        .with_context(|| format!("read plan '{}'", args.plan.display()))?;
    let plan = RenderPlan::from_json_str(&text)?;

    let mut assembler = VideoAssembler::new(config);
    if let Some(audio) = &args.audio {
        assembler = assembler.with_audio(audio);
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: args.overwrite,
        bg_rgba: config.bg_rgba,
    });
    let stats = assembler.render(&plan, &mut sink)?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        args.out.display(),
        stats.frames,
        stats.duration_secs
    );
    Ok(())
}

fn list_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("read images dir '{}'", dir.display()))?
    {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "webp"));
        if is_image {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}
