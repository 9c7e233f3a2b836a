//! Loaded media source handles.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The same size with width and height exchanged.
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Landscape or square.
    pub fn is_landscape(self) -> bool {
        self.width >= self.height
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn is_even(self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A decodable media source as reported by a loader.
///
/// Immutable once loaded. `natural_size` is the stored frame size; when
/// `rotated_90` is set the displayed frame has width and height swapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSourceRef {
    /// Where the source was loaded from.
    pub location: PathBuf,

    /// Duration in seconds.
    pub duration_secs: f64,

    /// Stored frame size (zero for audio-only sources).
    pub natural_size: PixelSize,

    /// Whether the display transform rotates the frame by 90 or 270 degrees.
    #[serde(default)]
    pub rotated_90: bool,

    /// Whether a video stream is present.
    pub has_video: bool,

    /// Whether an audio stream is present.
    pub has_audio: bool,

    /// Average frame rate of the video stream, if known.
    #[serde(default)]
    pub nominal_frame_rate: Option<f64>,
}

impl MediaSourceRef {
    /// A video source with an audio stream.
    pub fn video(location: impl Into<PathBuf>, duration_secs: f64, size: PixelSize) -> Self {
        Self {
            location: location.into(),
            duration_secs,
            natural_size: size,
            rotated_90: false,
            has_video: true,
            has_audio: true,
            nominal_frame_rate: None,
        }
    }

    /// An audio-only source.
    pub fn audio(location: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            location: location.into(),
            duration_secs,
            natural_size: PixelSize::new(0, 0),
            rotated_90: false,
            has_video: false,
            has_audio: true,
            nominal_frame_rate: None,
        }
    }

    pub fn with_rotation(mut self, rotated_90: bool) -> Self {
        self.rotated_90 = rotated_90;
        self
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.nominal_frame_rate = Some(fps);
        self
    }

    /// Frame size as displayed, after applying rotation.
    pub fn display_size(&self) -> PixelSize {
        if self.rotated_90 {
            self.natural_size.transposed()
        } else {
            self.natural_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_size_swaps_when_rotated() {
        let src = MediaSourceRef::video("in.mov", 12.0, PixelSize::new(1920, 1080)).with_rotation(true);
        assert_eq!(src.display_size(), PixelSize::new(1080, 1920));
        assert!(!src.display_size().is_landscape());
    }

    #[test]
    fn test_square_counts_as_landscape() {
        assert!(PixelSize::new(720, 720).is_landscape());
    }

    #[test]
    fn test_audio_source_has_no_frame() {
        let src = MediaSourceRef::audio("bg.m4a", 30.0);
        assert!(src.natural_size.is_empty());
        assert!(!src.has_video);
    }
}
