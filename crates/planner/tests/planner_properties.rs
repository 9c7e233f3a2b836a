//! Property tests for the planning stages.

use proptest::prelude::*;

use proclip_clip_model::media::{MediaSourceRef, PixelSize};
use proclip_clip_model::segment::TrackPlan;
use proclip_clip_model::settings::{AspectRatio, ClipJobSettings, CountMode, Resolution};
use proclip_clip_model::TrackKind;
use proclip_planner::time_tape;
use proclip_planner::{resolve_geometry, ClipPlanner, PlanOptions, SegmentPlanner};

const EPS: f64 = 1e-6;

fn resolution_strategy() -> impl Strategy<Value = Resolution> {
    prop_oneof![
        Just(Resolution::Original),
        Just(Resolution::UHD_4K),
        Just(Resolution::P1080),
        Just(Resolution::P720),
        Just(Resolution::P480),
        Just(Resolution::P144),
    ]
}

fn aspect_strategy() -> impl Strategy<Value = AspectRatio> {
    prop_oneof![
        Just(AspectRatio::Original),
        Just(AspectRatio::PORTRAIT_9_16),
        Just(AspectRatio::LANDSCAPE_16_9),
        Just(AspectRatio::SQUARE),
        Just(AspectRatio::PORTRAIT_4_5),
    ]
}

proptest! {
    #[test]
    fn tape_fills_exactly_and_stays_in_source(
        source in 0.05f64..600.0,
        target in 0.05f64..900.0,
        offset in 0.0f64..5000.0,
    ) {
        let segments = time_tape::plan(source, target, offset);
        let plan = TrackPlan::new(TrackKind::Video, segments);

        prop_assert!((plan.total_length() - target).abs() < EPS);
        prop_assert!(plan.is_contiguous());
        for seg in &plan.segments {
            prop_assert!(seg.source_start >= 0.0);
            prop_assert!(seg.length > 0.0);
            prop_assert!(seg.source_end() <= source + EPS);
        }
    }

    #[test]
    fn first_read_starts_at_offset_modulo_source(
        source in 0.5f64..100.0,
        target in 0.5f64..100.0,
        offset in 0.0f64..1000.0,
    ) {
        let segments = time_tape::plan(source, target, offset);
        let expected = offset % source;
        let first = segments[0].source_start;
        // Either the exact remainder, or snapped to zero right at the end.
        prop_assert!((first - expected).abs() < EPS || (first == 0.0 && source - expected < EPS));
    }

    #[test]
    fn geometry_is_even_and_inside_scaled_frame(
        w in 16u32..8000,
        h in 16u32..8000,
        rotated in any::<bool>(),
        resolution in resolution_strategy(),
        aspect in aspect_strategy(),
    ) {
        let g = resolve_geometry(PixelSize::new(w, h), rotated, resolution, aspect);

        prop_assert!(g.render_size.width >= 2 && g.render_size.height >= 2);
        prop_assert!(g.render_size.is_even());
        prop_assert!(g.scaled_size.is_even());
        prop_assert!(g.render_size.width <= g.scaled_size.width);
        prop_assert!(g.render_size.height <= g.scaled_size.height);
        prop_assert!(g.crop_origin.x >= 0.0 && g.crop_origin.y >= 0.0);
        prop_assert!(g.scale_factor > 0.0);
        if let Some(target) = resolution.target_height() {
            let shorter = g.scaled_size.width.min(g.scaled_size.height);
            prop_assert!(shorter <= target);
            prop_assert!(target - shorter <= 1);
        }
    }

    #[test]
    fn every_clip_spans_the_clip_duration(
        video_secs in 1.0f64..300.0,
        clip_secs in 0.5f64..60.0,
        bg_secs in 0.5f64..120.0,
        count in 1u32..12,
    ) {
        let mut settings = ClipJobSettings::new(
            MediaSourceRef::video("in.mp4", video_secs, PixelSize::new(1280, 720)),
            clip_secs,
        );
        settings.background_audio = Some(MediaSourceRef::audio("bg.mp3", bg_secs));
        settings.count_mode = CountMode::Custom(count);

        let planner = ClipPlanner::new(settings.clone(), PlanOptions::default()).unwrap();
        prop_assert_eq!(planner.total_clips(), count);

        let segments = SegmentPlanner::new(&settings);
        for k in 0..count {
            let clip = segments.plan_clip(k);
            prop_assert!((clip.video.total_length() - clip_secs).abs() < EPS);
            for audio in clip.audio_plans() {
                prop_assert!((audio.total_length() - clip_secs).abs() < EPS);
            }
            let bg = clip.background_audio.as_ref().unwrap();
            prop_assert_eq!(bg.segments[0].source_start, 0.0);
        }
    }
}

#[test]
fn consecutive_clips_continue_on_the_video_tape() {
    let settings = ClipJobSettings::new(
        MediaSourceRef::video("in.mp4", 25.0, PixelSize::new(1920, 1080)),
        10.0,
    );
    let planner = SegmentPlanner::new(&settings);
    let starts: Vec<f64> = (0..4)
        .map(|k| planner.plan_clip(k).video.segments[0].source_start)
        .collect();
    assert_eq!(starts, vec![0.0, 10.0, 20.0, 5.0]);
}
