//! ffmpeg-backed clip renderer.
//!
//! Each clip is one ffmpeg invocation:
//!
//! ```text
//! video ──trim/setpts per segment──concat──scale──crop──fps──format──▶ [outv]
//! video ──atrim per segment──concat──┐
//!                                    ├──amix──▶ [outa]
//! bg ─────atrim per segment──concat──┘
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use proclip_clip_model::descriptor::{EncodingPreset, ExportDescriptor};
use proclip_clip_model::segment::{TrackKind, TrackPlan};
use proclip_common::error::{ProclipError, ProclipResult};

use crate::renderer::Renderer;

/// Renders clips by spawning one ffmpeg process per clip.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    binary: String,
}

impl Default for FfmpegRenderer {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }
}

impl FfmpegRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg executable instead of the one on `PATH`.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run_ffmpeg(&self, plan: &FfmpegPlan, args: Vec<String>) -> ProclipResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let start = std::time::Instant::now();
        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProclipError::render(format!("Failed to start ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProclipError::render("Failed to capture ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProclipError::render("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks on a full stderr pipe, so drain it alongside stdout.
        let stderr_task = tokio::spawn(async move {
            let mut output = String::new();
            match stderr.read_to_string(&mut output).await {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut progress = ProgressState::default();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ProclipError::render(format!("Failed reading ffmpeg progress: {e}")))?
        {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            progress.update(key, value);
            if key == "progress" {
                tracing::debug!(
                    out_time_secs = progress.out_time_secs,
                    fraction = progress.fraction(plan.duration_secs),
                    complete = progress.complete,
                    "ffmpeg progress"
                );
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ProclipError::render(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .await
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(ProclipError::render(format!(
                "ffmpeg failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::debug!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(&self, descriptor: &ExportDescriptor, destination: &Path) -> ProclipResult<()> {
        let plan = build_plan(descriptor)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let args = build_ffmpeg_args(&plan, &descriptor.encoding, destination);
        self.run_ffmpeg(&plan, args).await
    }

    fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Inputs, filter graph, and stream mapping for one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegPlan {
    pub inputs: Vec<PathBuf>,
    pub filter_graph: String,
    pub video_label: String,
    pub audio_label: Option<String>,
    pub duration_secs: f64,
}

/// Translate a descriptor into an ffmpeg filter graph.
pub fn build_plan(descriptor: &ExportDescriptor) -> ProclipResult<FfmpegPlan> {
    let composition = &descriptor.composition;
    if composition.video.is_empty() {
        return Err(ProclipError::render(format!(
            "Clip {} has no video segments",
            descriptor.clip_number()
        )));
    }

    let mut inputs = vec![descriptor.video_location.clone()];
    let mut filters = Vec::new();

    push_track(&mut filters, 0, &composition.video, "vseg", "vcat");
    let geometry = &descriptor.geometry;
    let mut video_chain = format!(
        "[vcat]scale={}:{}",
        geometry.scaled_size.width, geometry.scaled_size.height
    );
    if geometry.is_cropped() {
        let (x, y) = geometry.crop_origin_px();
        video_chain.push_str(&format!(
            ",crop={}:{}:{x}:{y}",
            geometry.render_size.width, geometry.render_size.height
        ));
    }
    video_chain.push_str(&format!(
        ",fps={},format={},setsar=1[outv]",
        descriptor.fps, descriptor.encoding.pixel_format
    ));
    filters.push(video_chain);

    let mut audio_labels = Vec::new();
    if let Some(original) = composition.original_audio.as_ref().filter(|p| !p.is_empty()) {
        push_track(&mut filters, 0, original, "oseg", "orig");
        audio_labels.push("orig");
    }
    if let Some(background) = composition
        .background_audio
        .as_ref()
        .filter(|p| !p.is_empty())
    {
        let location = descriptor.background_location.clone().ok_or_else(|| {
            ProclipError::render("Background audio planned without a background source")
        })?;
        inputs.push(location);
        push_track(&mut filters, inputs.len() - 1, background, "bseg", "bg");
        audio_labels.push("bg");
    }

    let audio_label = match audio_labels.as_slice() {
        [] => None,
        [only] => Some(only.to_string()),
        labels => {
            let mix_inputs: String = labels.iter().map(|l| format!("[{l}]")).collect();
            filters.push(format!(
                "{mix_inputs}amix=inputs={}:duration=first:dropout_transition=0:normalize=0[outa]",
                labels.len()
            ));
            Some("outa".to_string())
        }
    };

    Ok(FfmpegPlan {
        inputs,
        filter_graph: filters.join(";"),
        video_label: "outv".to_string(),
        audio_label,
        duration_secs: composition.total_duration_secs,
    })
}

/// Trim each segment of `plan` from input `input` and concatenate them into `out`.
fn push_track(filters: &mut Vec<String>, input: usize, plan: &TrackPlan, prefix: &str, out: &str) {
    let is_video = plan.kind == TrackKind::Video;
    let (stream, trim, setpts) = if is_video {
        ("v", "trim", "setpts")
    } else {
        ("a", "atrim", "asetpts")
    };

    let mut concat_inputs = String::new();
    for (i, segment) in plan.segments.iter().enumerate() {
        filters.push(format!(
            "[{input}:{stream}]{trim}=start={:.6}:duration={:.6},{setpts}=PTS-STARTPTS[{prefix}{i}]",
            segment.source_start, segment.length
        ));
        concat_inputs.push_str(&format!("[{prefix}{i}]"));
    }

    let (v, a) = if is_video { (1, 0) } else { (0, 1) };
    filters.push(format!(
        "{concat_inputs}concat=n={}:v={v}:a={a}[{out}]",
        plan.segments.len()
    ));
}

/// Full ffmpeg argument list for one clip.
pub fn build_ffmpeg_args(
    plan: &FfmpegPlan,
    encoding: &EncodingPreset,
    destination: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-progress",
        "pipe:1",
        "-nostats",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for input in &plan.inputs {
        args.push("-i".to_string());
        args.push(input.to_string_lossy().to_string());
    }

    args.push("-filter_complex".to_string());
    args.push(plan.filter_graph.clone());
    args.push("-map".to_string());
    args.push(format!("[{}]", plan.video_label));
    if let Some(audio) = &plan.audio_label {
        args.push("-map".to_string());
        args.push(format!("[{audio}]"));
    }

    args.extend(codec_args(encoding, plan.audio_label.is_some()));
    args.push("-t".to_string());
    args.push(format!("{:.6}", plan.duration_secs));
    args.push(destination.to_string_lossy().to_string());
    args
}

fn codec_args(encoding: &EncodingPreset, has_audio: bool) -> Vec<String> {
    let mut args = vec![
        "-c:v".to_string(),
        encoding.video_codec.clone(),
        "-preset".to_string(),
        encoding.x264_preset.clone(),
        "-pix_fmt".to_string(),
        encoding.pixel_format.clone(),
        "-b:v".to_string(),
        format!("{}k", encoding.video_bitrate_kbps),
    ];
    if has_audio {
        args.extend([
            "-c:a".to_string(),
            encoding.audio_codec.clone(),
            "-b:a".to_string(),
            format!("{}k", encoding.audio_bitrate_kbps),
        ]);
    } else {
        args.push("-an".to_string());
    }
    if encoding.faststart {
        args.extend(["-movflags".to_string(), "+faststart".to_string()]);
    }
    args
}

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports both keys in microseconds.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    fn fraction(&self, expected_secs: f64) -> f64 {
        if self.complete {
            1.0
        } else if expected_secs <= 0.0 {
            0.0
        } else {
            (self.out_time_secs / expected_secs).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proclip_clip_model::geometry::{Point2D, RenderGeometry};
    use proclip_clip_model::media::PixelSize;
    use proclip_clip_model::segment::{ClipComposition, TimeRangeSegment};

    fn seg(source_start: f64, length: f64, destination_offset: f64) -> TimeRangeSegment {
        TimeRangeSegment {
            source_start,
            length,
            destination_offset,
        }
    }

    fn descriptor(with_background: bool) -> ExportDescriptor {
        let video = vec![seg(7.0, 3.0, 0.0), seg(0.0, 7.0, 3.0)];
        ExportDescriptor {
            clip_index: 2,
            video_location: PathBuf::from("/media/in.mp4"),
            background_location: with_background.then(|| PathBuf::from("/media/bg.mp3")),
            composition: ClipComposition {
                video: TrackPlan::new(TrackKind::Video, video.clone()),
                original_audio: Some(TrackPlan::new(TrackKind::OriginalAudio, video)),
                background_audio: with_background
                    .then(|| TrackPlan::new(TrackKind::BackgroundAudio, vec![seg(0.0, 10.0, 0.0)])),
                total_duration_secs: 10.0,
            },
            geometry: RenderGeometry {
                render_size: PixelSize::new(606, 1080),
                scaled_size: PixelSize::new(1920, 1080),
                crop_origin: Point2D::new(656.25, 0.0),
                scale_factor: 1.0,
            },
            fps: 30.0,
            frame_duration_secs: 1.0 / 30.0,
            output_identifier: "clip.mp4".to_string(),
            encoding: EncodingPreset::default(),
        }
    }

    #[test]
    fn test_plan_trims_each_segment_and_crops() {
        let plan = build_plan(&descriptor(false)).unwrap();
        assert_eq!(plan.inputs, vec![PathBuf::from("/media/in.mp4")]);
        assert!(plan
            .filter_graph
            .contains("[0:v]trim=start=7.000000:duration=3.000000,setpts=PTS-STARTPTS[vseg0]"));
        assert!(plan
            .filter_graph
            .contains("[vseg0][vseg1]concat=n=2:v=1:a=0[vcat]"));
        assert!(plan
            .filter_graph
            .contains("[vcat]scale=1920:1080,crop=606:1080:656:0,fps=30,format=yuv420p,setsar=1[outv]"));
        assert_eq!(plan.audio_label.as_deref(), Some("orig"));
        assert!(!plan.filter_graph.contains("amix"));
    }

    #[test]
    fn test_plan_mixes_background_from_second_input() {
        let plan = build_plan(&descriptor(true)).unwrap();
        assert_eq!(plan.inputs.len(), 2);
        assert!(plan
            .filter_graph
            .contains("[1:a]atrim=start=0.000000:duration=10.000000,asetpts=PTS-STARTPTS[bseg0]"));
        assert!(plan.filter_graph.contains("[orig][bg]amix=inputs=2"));
        assert_eq!(plan.audio_label.as_deref(), Some("outa"));
    }

    #[test]
    fn test_background_without_location_is_render_error() {
        let mut d = descriptor(true);
        d.background_location = None;
        let err = build_plan(&d).unwrap_err();
        assert!(matches!(err, ProclipError::Render { .. }));
    }

    #[test]
    fn test_silent_clip_drops_audio_codec() {
        let mut d = descriptor(false);
        d.composition.original_audio = None;
        let plan = build_plan(&d).unwrap();
        let args = build_ffmpeg_args(&plan, &d.encoding, Path::new("/out/clip.mp4"));
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/out/clip.mp4"));
    }

    #[test]
    fn test_args_carry_encoding_and_progress() {
        let d = descriptor(true);
        let plan = build_plan(&d).unwrap();
        let args = build_ffmpeg_args(&plan, &d.encoding, Path::new("/out/clip.mp4"));
        let joined = args.join(" ");
        assert!(joined.contains("-progress pipe:1"));
        assert!(joined.contains("-map [outv] -map [outa]"));
        assert!(joined.contains("-c:v libx264 -preset medium -pix_fmt yuv420p -b:v 8000k"));
        assert!(joined.contains("-c:a aac -b:a 192k"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(joined.contains("-t 10.000000"));
    }

    #[test]
    fn test_progress_state_parsing() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "5000000");
        state.update("progress", "continue");
        assert!((state.fraction(10.0) - 0.5).abs() < 1e-9);
        state.update("progress", "end");
        assert_eq!(state.fraction(10.0), 1.0);
    }
}
