//! Per-job clip settings.

use std::fmt;
use std::str::FromStr;

use proclip_common::error::{ProclipError, ProclipResult};
use serde::{Deserialize, Serialize};

use crate::media::MediaSourceRef;

/// Which audio tracks end up in each clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// Only the background track.
    BackgroundOnly,
    /// Original audio plus background track.
    #[default]
    Mix,
    /// Only the audio carried by the video source.
    OriginalOnly,
}

impl AudioMode {
    pub fn includes_original(self) -> bool {
        matches!(self, AudioMode::OriginalOnly | AudioMode::Mix)
    }

    pub fn includes_background(self) -> bool {
        matches!(self, AudioMode::BackgroundOnly | AudioMode::Mix)
    }
}

/// How many clips a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// As many whole clips as the video holds (at least one).
    #[default]
    Automatic,
    /// A fixed number of clips, continuing over the looped video if needed.
    Custom(u32),
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Keep the source size.
    #[default]
    Original,
    /// Target height in pixels (applied to the width for portrait sources).
    Height(u32),
}

impl Resolution {
    pub const UHD_4K: Resolution = Resolution::Height(2160);
    pub const P1080: Resolution = Resolution::Height(1080);
    pub const P720: Resolution = Resolution::Height(720);
    pub const P480: Resolution = Resolution::Height(480);
    pub const P360: Resolution = Resolution::Height(360);
    pub const P240: Resolution = Resolution::Height(240);
    pub const P144: Resolution = Resolution::Height(144);

    pub fn target_height(self) -> Option<u32> {
        match self {
            Resolution::Original => None,
            Resolution::Height(h) => Some(h),
        }
    }

    /// Target video bitrate for this preset.
    pub fn video_bitrate_kbps(self) -> u32 {
        match self {
            Resolution::Original => 8000,
            Resolution::Height(h) if h >= 2160 => 20000,
            Resolution::Height(h) if h >= 1080 => 8000,
            Resolution::Height(h) if h >= 720 => 4000,
            Resolution::Height(h) if h >= 480 => 2500,
            Resolution::Height(h) if h >= 360 => 1000,
            Resolution::Height(h) if h >= 240 => 500,
            Resolution::Height(_) => 300,
        }
    }
}

/// Output frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRate {
    /// Keep the source rate.
    #[default]
    Source,
    /// Fixed frames per second.
    Fixed(u32),
}

/// Output aspect ratio, stored as an exact `width:height` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// No crop.
    #[default]
    Original,
    Ratio { width: u32, height: u32 },
}

impl AspectRatio {
    pub const PORTRAIT_9_16: AspectRatio = AspectRatio::Ratio {
        width: 9,
        height: 16,
    };
    pub const LANDSCAPE_16_9: AspectRatio = AspectRatio::Ratio {
        width: 16,
        height: 9,
    };
    pub const SQUARE: AspectRatio = AspectRatio::Ratio {
        width: 1,
        height: 1,
    };
    pub const PORTRAIT_4_5: AspectRatio = AspectRatio::Ratio {
        width: 4,
        height: 5,
    };

    /// Width divided by height, `None` for `Original`.
    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectRatio::Original => None,
            AspectRatio::Ratio { width, height } => Some(width as f64 / height as f64),
        }
    }
}

/// Everything needed to plan a batch of clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipJobSettings {
    /// The foreground video.
    pub video_source: MediaSourceRef,

    /// Optional background audio.
    pub background_audio: Option<MediaSourceRef>,

    /// Length of every output clip in seconds.
    pub clip_duration_secs: f64,

    pub audio_mode: AudioMode,
    pub count_mode: CountMode,
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    pub aspect_ratio: AspectRatio,
}

impl ClipJobSettings {
    /// Settings with defaults matching a plain "cut into N-second clips" job.
    pub fn new(video_source: MediaSourceRef, clip_duration_secs: f64) -> Self {
        Self {
            video_source,
            background_audio: None,
            clip_duration_secs,
            audio_mode: AudioMode::Mix,
            count_mode: CountMode::Automatic,
            resolution: Resolution::Original,
            frame_rate: FrameRate::Source,
            aspect_ratio: AspectRatio::Original,
        }
    }

    /// Reject settings the planner cannot work with.
    pub fn validate(&self) -> ProclipResult<()> {
        let video = &self.video_source;
        if !(video.duration_secs.is_finite() && video.duration_secs > 0.0) {
            return Err(ProclipError::invalid_input(format!(
                "video duration must be positive, got {}",
                video.duration_secs
            )));
        }
        if !video.has_video {
            return Err(ProclipError::invalid_input(format!(
                "{} has no video stream",
                video.location.display()
            )));
        }
        if video.natural_size.is_empty() {
            return Err(ProclipError::invalid_input(format!(
                "video frame size must be non-zero, got {}",
                video.natural_size
            )));
        }
        if !(self.clip_duration_secs.is_finite() && self.clip_duration_secs > 0.0) {
            return Err(ProclipError::invalid_input(format!(
                "clip duration must be positive, got {}",
                self.clip_duration_secs
            )));
        }
        if let CountMode::Custom(0) = self.count_mode {
            return Err(ProclipError::invalid_input("clip count must be positive"));
        }
        if let Some(bg) = &self.background_audio {
            if !(bg.duration_secs.is_finite() && bg.duration_secs > 0.0) {
                return Err(ProclipError::invalid_input(format!(
                    "background audio duration must be positive, got {}",
                    bg.duration_secs
                )));
            }
        }
        if self.resolution == Resolution::Height(0) {
            return Err(ProclipError::invalid_input("target height must be positive"));
        }
        if self.frame_rate == FrameRate::Fixed(0) {
            return Err(ProclipError::invalid_input("frame rate must be positive"));
        }
        if let AspectRatio::Ratio { width, height } = self.aspect_ratio {
            if width == 0 || height == 0 {
                return Err(ProclipError::invalid_input(format!(
                    "aspect ratio terms must be positive, got {width}:{height}"
                )));
            }
        }
        Ok(())
    }
}

/// A textual setting that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}' (expected {expected})")]
pub struct ParseSettingError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseSettingError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

impl FromStr for AudioMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" | "background-only" | "bg" => Ok(AudioMode::BackgroundOnly),
            "mix" => Ok(AudioMode::Mix),
            "original" | "original-only" => Ok(AudioMode::OriginalOnly),
            _ => Err(ParseSettingError::new(
                "audio mode",
                s,
                "background, mix, or original",
            )),
        }
    }
}

impl FromStr for CountMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "auto" | "automatic" => Ok(CountMode::Automatic),
            n => n
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(CountMode::Custom)
                .ok_or_else(|| ParseSettingError::new("clip count", s, "auto or a positive number")),
        }
    }
}

impl FromStr for Resolution {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "original" | "source" => Ok(Resolution::Original),
            "4k" | "uhd" => Ok(Resolution::UHD_4K),
            other => other
                .strip_suffix('p')
                .unwrap_or(other)
                .parse::<u32>()
                .ok()
                .filter(|h| *h > 0)
                .map(Resolution::Height)
                .ok_or_else(|| {
                    ParseSettingError::new("resolution", s, "original, 4k, or a height such as 1080p")
                }),
        }
    }
}

impl FromStr for FrameRate {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "source" | "original" => Ok(FrameRate::Source),
            n => n
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(FrameRate::Fixed)
                .ok_or_else(|| ParseSettingError::new("frame rate", s, "source or a positive number")),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("original") {
            return Ok(AspectRatio::Original);
        }
        let parsed = trimmed.split_once(':').and_then(|(w, h)| {
            let width = w.trim().parse::<u32>().ok()?;
            let height = h.trim().parse::<u32>().ok()?;
            (width > 0 && height > 0).then_some(AspectRatio::Ratio { width, height })
        });
        parsed.ok_or_else(|| ParseSettingError::new("aspect ratio", s, "original or W:H such as 9:16"))
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioMode::BackgroundOnly => write!(f, "background"),
            AudioMode::Mix => write!(f, "mix"),
            AudioMode::OriginalOnly => write!(f, "original"),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Original => write!(f, "original"),
            Resolution::Height(h) => write!(f, "{h}p"),
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRate::Source => write!(f, "source"),
            FrameRate::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Original => write!(f, "original"),
            AspectRatio::Ratio { width, height } => write!(f, "{width}:{height}"),
        }
    }
}
