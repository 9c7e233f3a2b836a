//! Per-clip track plans.
//!
//! Each track reads from its own looped tape:
//! - video and original audio continue forward from clip to clip, so clip
//!   `k` starts at `k * clip_duration` on the video tape;
//! - background audio restarts from its beginning on every clip.

use proclip_clip_model::segment::{ClipComposition, TrackKind, TrackPlan};
use proclip_clip_model::settings::{ClipJobSettings, CountMode};

use crate::time_tape;

/// Slack for float noise when dividing durations (e.g. `30.0 / 0.1`).
const COUNT_EPSILON: f64 = 1e-9;

/// Number of whole clips a video holds without looping.
pub fn whole_clips_in(video_duration: f64, clip_duration: f64) -> u32 {
    if !(clip_duration > 0.0 && video_duration > 0.0) {
        return 0;
    }
    let whole = (video_duration / clip_duration + COUNT_EPSILON).floor();
    whole.min(u32::MAX as f64) as u32
}

/// Number of clips a job produces; always at least one.
pub fn resolve_total_clips(video_duration: f64, clip_duration: f64, count_mode: CountMode) -> u32 {
    match count_mode {
        CountMode::Custom(n) => n.max(1),
        CountMode::Automatic => whole_clips_in(video_duration, clip_duration).max(1),
    }
}

/// Builds the composition of each clip of a job.
#[derive(Debug, Clone, Copy)]
pub struct SegmentPlanner<'a> {
    settings: &'a ClipJobSettings,
}

impl<'a> SegmentPlanner<'a> {
    pub fn new(settings: &'a ClipJobSettings) -> Self {
        Self { settings }
    }

    /// Where `kind` starts reading on its looped tape for clip `clip_index`.
    pub fn logical_start_offset(&self, kind: TrackKind, clip_index: u32) -> f64 {
        match kind {
            TrackKind::Video | TrackKind::OriginalAudio => {
                clip_index as f64 * self.settings.clip_duration_secs
            }
            TrackKind::BackgroundAudio => 0.0,
        }
    }

    pub fn plan_clip(&self, clip_index: u32) -> ClipComposition {
        let settings = self.settings;
        let clip_duration = settings.clip_duration_secs;
        let video = &settings.video_source;

        let plan_track = |kind: TrackKind, source_duration: f64| {
            TrackPlan::new(
                kind,
                time_tape::plan(
                    source_duration,
                    clip_duration,
                    self.logical_start_offset(kind, clip_index),
                ),
            )
        };

        let video_plan = plan_track(TrackKind::Video, video.duration_secs);

        let original_audio = (settings.audio_mode.includes_original() && video.has_audio)
            .then(|| plan_track(TrackKind::OriginalAudio, video.duration_secs));

        let background_audio = settings
            .background_audio
            .as_ref()
            .filter(|_| settings.audio_mode.includes_background())
            .map(|bg| plan_track(TrackKind::BackgroundAudio, bg.duration_secs));

        tracing::debug!(
            clip_index,
            video_segments = video_plan.segments.len(),
            original_audio_segments = original_audio.as_ref().map(|p| p.segments.len()),
            background_segments = background_audio.as_ref().map(|p| p.segments.len()),
            "Clip composition planned"
        );

        ClipComposition {
            video: video_plan,
            original_audio,
            background_audio,
            total_duration_secs: clip_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proclip_clip_model::media::{MediaSourceRef, PixelSize};
    use proclip_clip_model::settings::AudioMode;

    fn settings(video_secs: f64, clip_secs: f64) -> ClipJobSettings {
        ClipJobSettings::new(
            MediaSourceRef::video("in.mp4", video_secs, PixelSize::new(1920, 1080)),
            clip_secs,
        )
    }

    #[test]
    fn test_automatic_count() {
        assert_eq!(resolve_total_clips(95.0, 10.0, CountMode::Automatic), 9);
        assert_eq!(resolve_total_clips(5.0, 10.0, CountMode::Automatic), 1);
        assert_eq!(resolve_total_clips(30.0, 0.1, CountMode::Automatic), 300);
    }

    #[test]
    fn test_custom_count() {
        assert_eq!(resolve_total_clips(5.0, 10.0, CountMode::Custom(4)), 4);
        assert_eq!(resolve_total_clips(95.0, 10.0, CountMode::Custom(0)), 1);
    }

    #[test]
    fn test_video_continues_and_background_restarts() {
        let mut s = settings(95.0, 10.0);
        s.background_audio = Some(MediaSourceRef::audio("bg.mp3", 25.0));
        let planner = SegmentPlanner::new(&s);

        for k in 0..5 {
            assert_eq!(
                planner.logical_start_offset(TrackKind::Video, k),
                k as f64 * 10.0
            );
            assert_eq!(planner.logical_start_offset(TrackKind::BackgroundAudio, k), 0.0);
        }

        let clip = planner.plan_clip(3);
        assert_eq!(clip.video.segments[0].source_start, 30.0);
        let bg = clip.background_audio.unwrap();
        assert_eq!(bg.segments[0].source_start, 0.0);
        assert_eq!(clip.original_audio.unwrap().segments, clip.video.segments);
    }

    #[test]
    fn test_last_clips_loop_over_short_video() {
        let mut s = settings(25.0, 10.0);
        s.count_mode = CountMode::Custom(3);
        let clip = SegmentPlanner::new(&s).plan_clip(2);
        assert_eq!(clip.video.segments.len(), 2);
        assert_eq!(clip.video.segments[0].source_start, 20.0);
        assert_eq!(clip.video.segments[0].length, 5.0);
        assert_eq!(clip.video.segments[1].source_start, 0.0);
        assert_eq!(clip.video.segments[1].destination_offset, 5.0);
    }

    #[test]
    fn test_audio_mode_selects_tracks() {
        let mut s = settings(40.0, 10.0);
        s.background_audio = Some(MediaSourceRef::audio("bg.mp3", 8.0));

        s.audio_mode = AudioMode::BackgroundOnly;
        let clip = SegmentPlanner::new(&s).plan_clip(0);
        assert!(clip.original_audio.is_none());
        assert_eq!(clip.background_audio.as_ref().unwrap().segments.len(), 2);

        s.audio_mode = AudioMode::OriginalOnly;
        let clip = SegmentPlanner::new(&s).plan_clip(0);
        assert!(clip.original_audio.is_some());
        assert!(clip.background_audio.is_none());

        s.audio_mode = AudioMode::Mix;
        let clip = SegmentPlanner::new(&s).plan_clip(0);
        assert_eq!(clip.audio_plans().count(), 2);
    }

    #[test]
    fn test_silent_video_has_no_original_audio() {
        let mut s = settings(40.0, 10.0);
        s.video_source = s.video_source.clone().with_audio(false);
        s.audio_mode = AudioMode::Mix;
        let clip = SegmentPlanner::new(&s).plan_clip(1);
        assert!(clip.original_audio.is_none());
        assert!(clip.background_audio.is_none());
        assert_eq!(clip.total_duration_secs, 10.0);
    }
}
