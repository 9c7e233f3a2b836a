//! Looped reads from a finite source.
//!
//! The source is treated as an infinite tape made of copies of itself laid
//! end to end. A request for `[offset, offset + length)` of that tape is
//! answered with the concrete reads into the finite source, wrapping at its
//! end as many times as needed.

use proclip_clip_model::segment::TimeRangeSegment;

/// Remainders shorter than this are treated as float noise, not as reads.
const TAPE_EPSILON_SECS: f64 = 1e-9;

/// Plan the reads needed to fill `target_length` seconds starting at
/// `logical_start_offset` on the looped tape of a `source_duration` source.
///
/// `source_duration` must be positive; callers validate it upstream. A
/// non-positive `target_length` yields an empty plan.
pub fn plan(
    source_duration: f64,
    target_length: f64,
    logical_start_offset: f64,
) -> Vec<TimeRangeSegment> {
    debug_assert!(source_duration > 0.0, "source duration must be positive");
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(source_duration) || !positive(target_length) {
        return Vec::new();
    }

    let offset = if logical_start_offset.is_finite() {
        logical_start_offset.max(0.0)
    } else {
        0.0
    };
    let wraps = (target_length / source_duration).ceil() as usize;
    let mut segments = Vec::with_capacity(wraps.saturating_add(1).min(1024));
    let mut filled = 0.0;

    // Only the first read can start mid-source; every later one starts at 0.
    let mut read_start = offset % source_duration;
    if source_duration - read_start <= TAPE_EPSILON_SECS {
        read_start = 0.0;
    }

    while target_length - filled > TAPE_EPSILON_SECS {
        let chunk = (target_length - filled).min(source_duration - read_start);

        segments.push(TimeRangeSegment {
            source_start: read_start,
            length: chunk,
            destination_offset: filled,
        });
        filled += chunk;
        read_start = 0.0;
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_seg(seg: &TimeRangeSegment, start: f64, len: f64, dst: f64) {
        assert!((seg.source_start - start).abs() < 1e-9, "{seg:?}");
        assert!((seg.length - len).abs() < 1e-9, "{seg:?}");
        assert!((seg.destination_offset - dst).abs() < 1e-9, "{seg:?}");
    }

    #[test]
    fn test_wraps_twice() {
        let segments = plan(10.0, 15.0, 7.0);
        assert_eq!(segments.len(), 3);
        assert_seg(&segments[0], 7.0, 3.0, 0.0);
        assert_seg(&segments[1], 0.0, 10.0, 3.0);
        assert_seg(&segments[2], 0.0, 2.0, 13.0);
    }

    #[test]
    fn test_single_read_inside_source() {
        let segments = plan(60.0, 10.0, 20.0);
        assert_eq!(segments.len(), 1);
        assert_seg(&segments[0], 20.0, 10.0, 0.0);
    }

    #[test]
    fn test_offset_beyond_source_wraps_first() {
        let segments = plan(10.0, 4.0, 23.0);
        assert_eq!(segments.len(), 1);
        assert_seg(&segments[0], 3.0, 4.0, 0.0);
    }

    #[test]
    fn test_read_ending_exactly_at_source_end() {
        let segments = plan(10.0, 10.0, 0.0);
        assert_eq!(segments.len(), 1);
        assert_seg(&segments[0], 0.0, 10.0, 0.0);
    }

    #[test]
    fn test_zero_target_is_empty() {
        assert!(plan(10.0, 0.0, 3.0).is_empty());
    }

    #[test]
    fn test_fractional_durations_leave_no_sliver() {
        let segments = plan(0.3, 0.9, 0.1);
        let total: f64 = segments.iter().map(|s| s.length).sum();
        assert!((total - 0.9).abs() < 1e-9);
        assert!(segments.iter().all(|s| s.length > TAPE_EPSILON_SECS));
    }

    #[test]
    fn test_large_offset_keeps_whole_reads() {
        let segments = plan(0.3, 20.0, 2e7);
        assert_eq!(segments.len(), 68);
        assert!((segments[0].source_start - 2e7 % 0.3).abs() < 1e-12);
        assert!(segments[1..].iter().all(|s| s.source_start == 0.0));
        assert!(segments.iter().all(|s| s.length > 1e-3), "{segments:?}");
        let total: f64 = segments.iter().map(|s| s.length).sum();
        assert!((total - 20.0).abs() < 1e-9);
    }
}
