//! Output file naming.
//!
//! Every exported clip is named
//! `{timestamp}-{variantTag}-{randomId}-CLIP-{clipNumber}.{ext}` where the
//! timestamp is `ddMMyyyyHHmmss` local time, the random id is four digits,
//! and the clip number is one-based.

use chrono::{DateTime, Local, TimeZone};
use rand::Rng;

/// Timestamp layout used in clip names.
pub const CLIP_TIMESTAMP_FORMAT: &str = "%d%m%Y%H%M%S";

/// Builds output identifiers for the clips of one job.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    variant_tag: String,
    extension: String,
}

impl OutputNamer {
    pub fn new(variant_tag: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            variant_tag: variant_tag.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Name for `clip_number` using the current time and a fresh random id.
    pub fn next_identifier(&self, clip_number: u32) -> String {
        let random_id: u16 = rand::thread_rng().gen_range(1000..=9999);
        self.identifier_at(&Local::now(), random_id, clip_number)
    }

    /// Deterministic variant of [`OutputNamer::next_identifier`].
    pub fn identifier_at<Tz: TimeZone>(
        &self,
        at: &DateTime<Tz>,
        random_id: u16,
        clip_number: u32,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{}-{}-{}-CLIP-{}.{}",
            at.format(CLIP_TIMESTAMP_FORMAT),
            self.variant_tag,
            random_id,
            clip_number,
            self.extension
        )
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Folder name for a job started at `unix_secs`.
pub fn job_folder_name(unix_secs: i64) -> String {
    format!("ProClip_Exports_{unix_secs}")
}

/// Extract the one-based clip number from a name produced by [`OutputNamer`].
pub fn clip_number_from_identifier(identifier: &str) -> Option<u32> {
    let (_, tail) = identifier.rsplit_once("-CLIP-")?;
    let digits = tail.split('.').next()?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_identifier_layout() {
        let namer = OutputNamer::new("PREMIUM", ".mp4");
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            namer.identifier_at(&at, 4821, 3),
            "07032024090502-PREMIUM-4821-CLIP-3.mp4"
        );
    }

    #[test]
    fn test_next_identifier_uses_four_digit_id() {
        let namer = OutputNamer::new("PREMIUM", "mp4");
        let name = namer.next_identifier(12);
        let parts: Vec<&str> = name.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].len(), 14);
        assert_eq!(parts[1], "PREMIUM");
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(clip_number_from_identifier(&name), Some(12));
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn test_job_folder_name() {
        assert_eq!(job_folder_name(1_700_000_000), "ProClip_Exports_1700000000");
    }

    #[test]
    fn test_clip_number_rejects_foreign_names() {
        assert_eq!(clip_number_from_identifier("holiday.mp4"), None);
    }
}
