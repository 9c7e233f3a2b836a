pub mod check;
pub mod export;
pub mod plan;
pub mod probe;

use proclip_clip_model::settings::{AspectRatio, AudioMode, CountMode, FrameRate, Resolution};
use proclip_render_engine::ClipJobRequest;

use crate::JobArgs;

/// Parse the textual job options into a request.
pub fn job_request(args: JobArgs) -> anyhow::Result<ClipJobRequest> {
    if !(args.clip_secs.is_finite() && args.clip_secs > 0.0) {
        anyhow::bail!("Clip duration must be a positive number of seconds");
    }

    let mut request = ClipJobRequest::new(args.video, args.clip_secs);
    request.background_audio = args.background;
    request.audio_mode = args.audio.parse::<AudioMode>()?;
    request.count_mode = args.count.parse::<CountMode>()?;
    request.resolution = args.resolution.parse::<Resolution>()?;
    request.frame_rate = args.fps.parse::<FrameRate>()?;
    request.aspect_ratio = args.aspect.parse::<AspectRatio>()?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> JobArgs {
        JobArgs {
            video: PathBuf::from("in.mp4"),
            clip_secs: 15.0,
            background: Some(PathBuf::from("bg.mp3")),
            audio: "bg".to_string(),
            count: "12".to_string(),
            resolution: "720p".to_string(),
            fps: "30".to_string(),
            aspect: "9:16".to_string(),
        }
    }

    #[test]
    fn test_job_request_parses_every_option() {
        let request = job_request(args()).unwrap();
        assert_eq!(request.audio_mode, AudioMode::BackgroundOnly);
        assert_eq!(request.count_mode, CountMode::Custom(12));
        assert_eq!(request.resolution, Resolution::P720);
        assert_eq!(request.frame_rate, FrameRate::Fixed(30));
        assert_eq!(request.aspect_ratio, AspectRatio::PORTRAIT_9_16);
        assert_eq!(request.background_audio, Some(PathBuf::from("bg.mp3")));
    }

    #[test]
    fn test_job_request_rejects_bad_values() {
        let mut bad = args();
        bad.aspect = "wide".to_string();
        assert!(job_request(bad).is_err());

        let mut bad = args();
        bad.clip_secs = 0.0;
        assert!(job_request(bad).is_err());
    }
}
