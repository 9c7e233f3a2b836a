//! Media source loading via ffprobe.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use proclip_clip_model::media::{MediaSourceRef, PixelSize};
use proclip_common::error::{ProclipError, ProclipResult};

/// Turns a location into a loaded media source.
#[async_trait::async_trait]
pub trait MediaSourceLoader: Send + Sync {
    /// Load `location`, failing with [`ProclipError::SourceUnreadable`].
    async fn load(&self, location: &Path) -> ProclipResult<MediaSourceRef>;
}

/// Loader backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeLoader {
    binary: String,
}

impl Default for FfprobeLoader {
    fn default() -> Self {
        Self {
            binary: "ffprobe".to_string(),
        }
    }
}

impl FfprobeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

#[async_trait::async_trait]
impl MediaSourceLoader for FfprobeLoader {
    async fn load(&self, location: &Path) -> ProclipResult<MediaSourceRef> {
        if !tokio::fs::try_exists(location).await.unwrap_or(false) {
            return Err(ProclipError::source_unreadable(location, "file does not exist"));
        }

        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(location)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ProclipError::source_unreadable(location, format!("failed to start ffprobe: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProclipError::source_unreadable(
                location,
                format!("ffprobe failed (status {}): {}", output.status, stderr.trim()),
            ));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let source = parse_probe_json(location, &json)?;
        tracing::debug!(
            location = %location.display(),
            duration_secs = source.duration_secs,
            size = %source.natural_size,
            rotated_90 = source.rotated_90,
            has_video = source.has_video,
            has_audio = source.has_audio,
            "Media source loaded"
        );
        Ok(source)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    tags: Option<ProbeTags>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    disposition: Option<ProbeDisposition>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

impl ProbeStream {
    fn is_kind(&self, kind: &str) -> bool {
        self.codec_type.as_deref() == Some(kind)
    }

    /// Cover art embedded in audio files is reported as a video stream.
    fn is_attached_picture(&self) -> bool {
        self.disposition
            .as_ref()
            .map(|d| d.attached_pic != 0)
            .unwrap_or(false)
    }

    fn rotation_degrees(&self) -> f64 {
        let from_tag = self
            .tags
            .as_ref()
            .and_then(|t| t.rotate.as_deref())
            .and_then(|r| r.trim().parse::<f64>().ok());
        let from_side_data = self.side_data_list.iter().find_map(|d| d.rotation);
        from_tag.or(from_side_data).unwrap_or(0.0)
    }

    fn frame_rate(&self) -> Option<f64> {
        self.avg_frame_rate
            .as_deref()
            .and_then(parse_rational)
            .or_else(|| self.r_frame_rate.as_deref().and_then(parse_rational))
    }
}

/// Parse ffprobe's `num/den` notation; `0/0` means unknown.
fn parse_rational(raw: &str) -> Option<f64> {
    let value = match raw.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => raw.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Build a [`MediaSourceRef`] from `ffprobe -print_format json` output.
pub fn parse_probe_json(location: &Path, json: &str) -> ProclipResult<MediaSourceRef> {
    let probe: ProbeOutput = serde_json::from_str(json).map_err(|e| {
        ProclipError::source_unreadable(location, format!("invalid ffprobe output: {e}"))
    })?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.is_kind("video") && !s.is_attached_picture());
    let has_audio = probe.streams.iter().any(|s| s.is_kind("audio"));
    if video.is_none() && !has_audio {
        return Err(ProclipError::source_unreadable(
            location,
            "no audio or video streams",
        ));
    }

    let parse_secs = |raw: &Option<String>| raw.as_deref().and_then(|d| d.trim().parse::<f64>().ok());
    let duration_secs = probe
        .format
        .as_ref()
        .and_then(|f| parse_secs(&f.duration))
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| parse_secs(&s.duration))
                .reduce(f64::max)
        })
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| ProclipError::source_unreadable(location, "unknown or zero duration"))?;

    let source = match video {
        Some(stream) => {
            let size = PixelSize::new(stream.width.unwrap_or(0), stream.height.unwrap_or(0));
            let quarter_turns = (stream.rotation_degrees() / 90.0).round() as i64;
            let mut source = MediaSourceRef::video(location, duration_secs, size)
                .with_rotation(quarter_turns.rem_euclid(2) == 1)
                .with_audio(has_audio);
            source.nominal_frame_rate = stream.frame_rate();
            source
        }
        None => MediaSourceRef::audio(location, duration_secs),
    };
    Ok(source)
}
