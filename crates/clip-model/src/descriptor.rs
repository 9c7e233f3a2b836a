//! The unit of work handed to a renderer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::RenderGeometry;
use crate::segment::ClipComposition;

/// Encoder parameters for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingPreset {
    pub video_codec: String,
    pub video_bitrate_kbps: u32,
    pub x264_preset: String,
    pub pixel_format: String,
    pub audio_codec: String,
    pub audio_bitrate_kbps: u32,
    /// Move the index to the front of the file for progressive playback.
    pub faststart: bool,
}

impl Default for EncodingPreset {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            video_bitrate_kbps: 8000,
            x264_preset: "medium".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate_kbps: 192,
            faststart: true,
        }
    }
}

/// Everything a renderer needs to produce one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDescriptor {
    /// Zero-based position of this clip in the job.
    pub clip_index: u32,

    /// Source read by the video and original-audio tracks.
    pub video_location: PathBuf,

    /// Source read by the background-audio track, when one is planned.
    pub background_location: Option<PathBuf>,

    pub composition: ClipComposition,
    pub geometry: RenderGeometry,

    /// Output frames per second.
    pub fps: f64,

    /// `1 / fps` in seconds.
    pub frame_duration_secs: f64,

    /// File name of the clip inside the job's output folder.
    pub output_identifier: String,

    pub encoding: EncodingPreset,
}

impl ExportDescriptor {
    /// One-based clip number as used in file names and logs.
    pub fn clip_number(&self) -> u32 {
        self.clip_index + 1
    }
}
