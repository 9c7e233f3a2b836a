//! Print a job's clip plan.

use serde::Serialize;

use proclip_clip_model::descriptor::ExportDescriptor;
use proclip_clip_model::naming::OutputNamer;
use proclip_common::config::AppConfig;
use proclip_planner::ClipPlanner;
use proclip_render_engine::{FfprobeLoader, JobOptions, MediaSourceLoader};

use crate::JobArgs;

/// Descriptors listed at most; the counts always cover the whole job.
const MAX_LISTED_CLIPS: u32 = 1000;

#[derive(Serialize)]
struct PlanReport {
    total_clips: u32,
    looped_clips: u32,
    clips: Vec<ExportDescriptor>,
    truncated: bool,
}

pub async fn run(args: JobArgs, config: &AppConfig) -> anyhow::Result<()> {
    let request = super::job_request(args)?;
    let loader = FfprobeLoader::new();

    let video = loader.load(&request.video).await?;
    let background = match &request.background_audio {
        Some(path) => Some(loader.load(path).await?),
        None => None,
    };

    let options = JobOptions::from_config(config);
    let planner = ClipPlanner::new(request.into_settings(video, background), options.plan)?;
    let namer = OutputNamer::new(options.variant_tag, options.container);

    let total = planner.total_clips();
    let listed = total.min(MAX_LISTED_CLIPS);
    let clips = (0..listed)
        .map(|i| planner.describe_clip(i, namer.next_identifier(i + 1)))
        .collect();
    let report = PlanReport {
        total_clips: total,
        looped_clips: planner.looped_clip_shortfall(),
        clips,
        truncated: listed < total,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
