//! Time-range segments and per-clip track plans.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing accumulated segment lengths.
pub const TIME_EPSILON_SECS: f64 = 1e-6;

/// One contiguous read from a finite source, placed in the clip timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRangeSegment {
    /// Read position in the source (seconds).
    pub source_start: f64,
    /// Read length (seconds, always positive).
    pub length: f64,
    /// Position in the output clip (seconds).
    pub destination_offset: f64,
}

impl TimeRangeSegment {
    pub fn source_end(&self) -> f64 {
        self.source_start + self.length
    }

    pub fn destination_end(&self) -> f64 {
        self.destination_offset + self.length
    }
}

/// The logical tracks a clip can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    OriginalAudio,
    BackgroundAudio,
}

/// Ordered reads that fill one track of a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPlan {
    pub kind: TrackKind,
    pub segments: Vec<TimeRangeSegment>,
}

impl TrackPlan {
    pub fn new(kind: TrackKind, segments: Vec<TimeRangeSegment>) -> Self {
        Self { kind, segments }
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Number of times the plan jumps back to an earlier source position.
    pub fn wrap_count(&self) -> usize {
        self.segments
            .windows(2)
            .filter(|pair| pair[1].source_start < pair[0].source_end() - TIME_EPSILON_SECS)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments are positive, gap-free, and start at zero.
    pub fn is_contiguous(&self) -> bool {
        let mut cursor = 0.0;
        for segment in &self.segments {
            if segment.length <= 0.0
                || (segment.destination_offset - cursor).abs() > TIME_EPSILON_SECS
            {
                return false;
            }
            cursor = segment.destination_end();
        }
        true
    }
}

/// All track plans of one output clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipComposition {
    pub video: TrackPlan,
    pub original_audio: Option<TrackPlan>,
    pub background_audio: Option<TrackPlan>,
    /// Always equal to the job's clip duration.
    pub total_duration_secs: f64,
}

impl ClipComposition {
    /// Audio plans present in this clip, original first.
    pub fn audio_plans(&self) -> impl Iterator<Item = &TrackPlan> {
        self.original_audio
            .iter()
            .chain(self.background_audio.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(source_start: f64, length: f64, destination_offset: f64) -> TimeRangeSegment {
        TimeRangeSegment {
            source_start,
            length,
            destination_offset,
        }
    }

    #[test]
    fn test_contiguous_plan() {
        let plan = TrackPlan::new(
            TrackKind::Video,
            vec![seg(7.0, 3.0, 0.0), seg(0.0, 10.0, 3.0), seg(0.0, 2.0, 13.0)],
        );
        assert!(plan.is_contiguous());
        assert!((plan.total_length() - 15.0).abs() < TIME_EPSILON_SECS);
        assert_eq!(plan.wrap_count(), 2);
    }

    #[test]
    fn test_gap_breaks_contiguity() {
        let plan = TrackPlan::new(TrackKind::Video, vec![seg(0.0, 3.0, 0.0), seg(5.0, 2.0, 4.0)]);
        assert!(!plan.is_contiguous());
    }

    #[test]
    fn test_audio_plans_order() {
        let comp = ClipComposition {
            video: TrackPlan::new(TrackKind::Video, vec![seg(0.0, 5.0, 0.0)]),
            original_audio: Some(TrackPlan::new(TrackKind::OriginalAudio, vec![seg(0.0, 5.0, 0.0)])),
            background_audio: Some(TrackPlan::new(
                TrackKind::BackgroundAudio,
                vec![seg(0.0, 5.0, 0.0)],
            )),
            total_duration_secs: 5.0,
        };
        let kinds: Vec<_> = comp.audio_plans().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![TrackKind::OriginalAudio, TrackKind::BackgroundAudio]);
    }
}
