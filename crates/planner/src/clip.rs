//! Job-level planning: validated settings in, export descriptors out.

use proclip_clip_model::descriptor::{EncodingPreset, ExportDescriptor};
use proclip_clip_model::geometry::RenderGeometry;
use proclip_clip_model::settings::{ClipJobSettings, CountMode, FrameRate};
use proclip_common::error::ProclipResult;

use crate::geometry::resolve_geometry;
use crate::segment_planner::{resolve_total_clips, whole_clips_in, SegmentPlanner};

/// Export knobs that come from configuration rather than the job.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Frame rate used when the source rate is requested but unknown.
    pub fallback_fps: u32,
    pub audio_bitrate_kbps: u32,
    pub x264_preset: String,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            fallback_fps: 30,
            audio_bitrate_kbps: 192,
            x264_preset: "medium".to_string(),
        }
    }
}

/// Plans every clip of one job.
#[derive(Debug, Clone)]
pub struct ClipPlanner {
    settings: ClipJobSettings,
    options: PlanOptions,
    total_clips: u32,
}

impl ClipPlanner {
    /// Validate `settings` and resolve the clip count.
    pub fn new(settings: ClipJobSettings, options: PlanOptions) -> ProclipResult<Self> {
        settings.validate()?;
        let total_clips = resolve_total_clips(
            settings.video_source.duration_secs,
            settings.clip_duration_secs,
            settings.count_mode,
        );
        Ok(Self {
            settings,
            options,
            total_clips,
        })
    }

    pub fn settings(&self) -> &ClipJobSettings {
        &self.settings
    }

    pub fn total_clips(&self) -> u32 {
        self.total_clips
    }

    /// Clips beyond what the video holds without looping, for custom counts.
    pub fn looped_clip_shortfall(&self) -> u32 {
        match self.settings.count_mode {
            CountMode::Automatic => 0,
            CountMode::Custom(n) => n.saturating_sub(whole_clips_in(
                self.settings.video_source.duration_secs,
                self.settings.clip_duration_secs,
            )),
        }
    }

    /// Output frames per second.
    pub fn output_fps(&self) -> f64 {
        match self.settings.frame_rate {
            FrameRate::Fixed(n) => n as f64,
            FrameRate::Source => self
                .settings
                .video_source
                .nominal_frame_rate
                .filter(|fps| fps.is_finite() && *fps > 0.0)
                .unwrap_or(self.options.fallback_fps.max(1) as f64),
        }
    }

    pub fn geometry(&self) -> RenderGeometry {
        let video = &self.settings.video_source;
        resolve_geometry(
            video.natural_size,
            video.rotated_90,
            self.settings.resolution,
            self.settings.aspect_ratio,
        )
    }

    pub fn encoding(&self) -> EncodingPreset {
        EncodingPreset {
            video_bitrate_kbps: self.settings.resolution.video_bitrate_kbps(),
            audio_bitrate_kbps: self.options.audio_bitrate_kbps,
            x264_preset: self.options.x264_preset.clone(),
            ..EncodingPreset::default()
        }
    }

    /// Full descriptor for clip `clip_index`, written as `output_identifier`.
    pub fn describe_clip(&self, clip_index: u32, output_identifier: String) -> ExportDescriptor {
        let composition = SegmentPlanner::new(&self.settings).plan_clip(clip_index);
        let fps = self.output_fps();
        let background_location = composition
            .background_audio
            .as_ref()
            .and(self.settings.background_audio.as_ref())
            .map(|bg| bg.location.clone());
        ExportDescriptor {
            clip_index,
            video_location: self.settings.video_source.location.clone(),
            background_location,
            composition,
            geometry: self.geometry(),
            fps,
            frame_duration_secs: 1.0 / fps,
            output_identifier,
            encoding: self.encoding(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proclip_clip_model::media::{MediaSourceRef, PixelSize};
    use proclip_clip_model::settings::{AspectRatio, Resolution};

    fn settings() -> ClipJobSettings {
        ClipJobSettings::new(
            MediaSourceRef::video("in.mp4", 95.0, PixelSize::new(1920, 1080)),
            10.0,
        )
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut s = settings();
        s.video_source.duration_secs = 0.0;
        let err = ClipPlanner::new(s, PlanOptions::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_describe_clip_merges_plan_and_geometry() {
        let mut s = settings();
        s.resolution = Resolution::P1080;
        s.aspect_ratio = AspectRatio::PORTRAIT_9_16;
        s.frame_rate = FrameRate::Fixed(24);
        let planner = ClipPlanner::new(s, PlanOptions::default()).unwrap();
        assert_eq!(planner.total_clips(), 9);

        let d = planner.describe_clip(4, "clip.mp4".to_string());
        assert_eq!(d.clip_number(), 5);
        assert_eq!(d.composition.video.segments[0].source_start, 40.0);
        assert_eq!(d.geometry.render_size, PixelSize::new(606, 1080));
        assert_eq!(d.fps, 24.0);
        assert!((d.frame_duration_secs - 1.0 / 24.0).abs() < 1e-12);
        assert_eq!(d.encoding.video_bitrate_kbps, 8000);
        assert_eq!(d.output_identifier, "clip.mp4");
        assert_eq!(d.video_location, std::path::PathBuf::from("in.mp4"));
        assert!(d.background_location.is_none());
    }

    #[test]
    fn test_source_fps_falls_back_when_unknown() {
        let planner = ClipPlanner::new(settings(), PlanOptions::default()).unwrap();
        assert_eq!(planner.output_fps(), 30.0);

        let mut s = settings();
        s.video_source = s.video_source.clone().with_frame_rate(29.97);
        let planner = ClipPlanner::new(s, PlanOptions::default()).unwrap();
        assert!((planner.output_fps() - 29.97).abs() < 1e-12);
    }

    #[test]
    fn test_custom_count_shortfall() {
        let mut s = settings();
        s.count_mode = CountMode::Custom(12);
        let planner = ClipPlanner::new(s, PlanOptions::default()).unwrap();
        assert_eq!(planner.total_clips(), 12);
        assert_eq!(planner.looped_clip_shortfall(), 3);
    }
}
