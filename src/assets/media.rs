use std::path::{Path, PathBuf};

use crate::assets::decode::{PreparedImage, premultiply_rgba8_in_place};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// File extensions decoded through ffmpeg rather than the image decoder.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "webm"];

/// Whether `path` names a video asset.
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[derive(Clone, Debug)]
/// Basic metadata about a source video file.
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Stream frame rate, when ffprobe reports a usable one.
    pub fps: Option<f64>,
    /// Container duration in seconds, when known.
    pub duration_secs: Option<f64>,
}

/// Read source video metadata through `ffprobe`.
pub fn read_video_info(source_path: &Path) -> ReelResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct StreamEntry {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct FormatEntry {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct FfprobeOutput {
        streams: Vec<StreamEntry>,
        format: Option<FormatEntry>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ReelError::evaluation(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::evaluation(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: FfprobeOutput = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::evaluation(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            ReelError::evaluation(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| ReelError::evaluation("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| ReelError::evaluation("missing video height from ffprobe"))?;
    let fps = video_stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video_stream.r_frame_rate.as_deref().and_then(parse_frame_rate));
    let duration_secs = video_stream
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_secs,
    })
}

/// Parse an ffprobe rate such as `"30000/1001"` or `"25"`. Zero rates are `None`.
pub(crate) fn parse_frame_rate(s: &str) -> Option<f64> {
    let rate = match s.trim().split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.trim().parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// ffmpeg arguments that resample `source` to `fps`, stretch it to `canvas` and write at most
/// `max_secs` seconds of raw RGBA frames to stdout.
pub(crate) fn decode_args(source: &Path, canvas: Canvas, fps: Fps, max_secs: f64) -> Vec<String> {
    let mut args: Vec<String> = vec!["-v".into(), "error".into(), "-i".into()];
    args.push(source.to_string_lossy().into_owned());
    if max_secs.is_finite() && max_secs > 0.0 {
        args.push("-t".into());
        args.push(format!("{max_secs:.6}"));
    }
    args.extend([
        "-an".into(),
        "-vf".into(),
        format!(
            "fps={}/{},scale={}:{}:flags=lanczos",
            fps.num, fps.den, canvas.width, canvas.height
        ),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "pipe:1".into(),
    ]);
    args
}

/// Split a raw straight-alpha RGBA stream into premultiplied frames of `canvas` size.
pub(crate) fn split_rgba_frames(raw: Vec<u8>, canvas: Canvas) -> ReelResult<Vec<PreparedImage>> {
    let expected_len = canvas.byte_len();
    if expected_len == 0 {
        return Err(ReelError::evaluation(
            "decoded video frame size is zero (invalid canvas)",
        ));
    }
    if raw.len() < expected_len || !raw.len().is_multiple_of(expected_len) {
        return Err(ReelError::evaluation(format!(
            "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
            raw.len()
        )));
    }

    raw.chunks_exact(expected_len)
        .map(|chunk| {
            let mut px = chunk.to_vec();
            premultiply_rgba8_in_place(&mut px);
            PreparedImage::from_premul(canvas.width, canvas.height, px)
        })
        .collect()
}

/// Decode up to `max_secs` seconds of `source` as premultiplied frames sampled at `fps` and
/// resized to `canvas`.
#[tracing::instrument(skip(source), fields(path = %source.source_path.display()))]
pub fn decode_video_frames_rgba8(
    source: &VideoSourceInfo,
    canvas: Canvas,
    fps: Fps,
    max_secs: f64,
) -> ReelResult<Vec<PreparedImage>> {
    let out = std::process::Command::new("ffmpeg")
        .args(decode_args(&source.source_path, canvas, fps, max_secs))
        .output()
        .map_err(|e| {
            ReelError::evaluation(format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(ReelError::evaluation(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let frames = split_rgba_frames(out.stdout, canvas)?;
    tracing::debug!(
        frames = frames.len(),
        source_fps = source.fps,
        source_duration = source.duration_secs,
        "video frames decoded"
    );
    Ok(frames)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
