//! Storyreel turns narration into a slideshow video.
//!
//! A transcription (and optionally the script it was read from) is cut into scenes, each scene
//! gets an image, and the images are rendered as clips with camera effects, joined by transitions
//! and fitted to the length of the narration:
//!
//! - Segment a transcription with [`SceneSegmenter`]
//! - Build a [`RenderPlan`] with [`build_render_plan`]
//! - Stream frames into a [`FrameSink`] with [`VideoAssembler`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
/// Render configuration.
pub mod config;
/// Clip effects, overlays, transitions and pixel compositing.
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod render;
/// Transcriptions, scenes and segmentation.
pub mod timeline;
/// Fitting clip holds to the narration length.
pub mod timing;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::assets::decode::{PreparedImage, decode_image, load_image};
pub use crate::config::RenderConfig;
pub use crate::effects::engine::{ClipRenderer, apply_effect, build_clip, try_apply_effect};
pub use crate::effects::overlay::OverlaySpec;
pub use crate::effects::spec::{EffectError, EffectKind, EffectSpec, parse_effect};
pub use crate::effects::transitions::{Transition, TransitionKind, TransitionSpec};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::assembler::{RenderStats, VideoAssembler};
pub use crate::render::compositor::{Compositor, GlobalFade, Timeline};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::plan::{ClipSpec, RenderPlan, build_render_plan};
pub use crate::timeline::document::ScenesDocument;
pub use crate::timeline::scene::Scene;
pub use crate::timeline::segment::{SceneSegmenter, SegmentMode, SegmentPolicy};
pub use crate::timeline::transcript::{TranscriptionSpan, load_transcript};
pub use crate::timing::reconcile::{ReconcileOutcome, ReconcilePolicy, Reconciled, reconcile};
