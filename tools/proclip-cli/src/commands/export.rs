//! Render every clip of a job.

use std::path::PathBuf;
use std::sync::Arc;

use proclip_clip_model::job::{JobStatus, LogLevel};
use proclip_common::config::AppConfig;
use proclip_render_engine::{ClipJobOrchestrator, FfmpegRenderer, FfprobeLoader, JobOptions, Renderer};

use crate::JobArgs;

pub async fn run(args: JobArgs, output: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<()> {
    let request = super::job_request(args)?;
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());

    let renderer = FfmpegRenderer::new();
    if !renderer.is_available() {
        anyhow::bail!("ffmpeg was not found in PATH. Run `proclip check` for details.");
    }

    println!("Exporting clips from: {}", request.video.display());
    println!("  Output: {}", output_dir.display());

    let orchestrator = Arc::new(ClipJobOrchestrator::new(
        Arc::new(renderer),
        JobOptions::from_config(config),
    ));

    let cancel = orchestrator.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut state = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        let mut printed = 0;
        while state.changed().await.is_ok() {
            let snapshot = state.borrow_and_update().clone();
            for entry in &snapshot.log[printed.min(snapshot.log.len())..] {
                let marker = match entry.level {
                    LogLevel::Info => "  ",
                    LogLevel::Success => "OK",
                    LogLevel::Error => "!!",
                };
                println!("[{marker}] {}", entry.message);
            }
            printed = snapshot.log.len();
            if snapshot.status.is_active() {
                println!(
                    "     Progress: {:.1}% ({}/{} clips)",
                    snapshot.progress * 100.0,
                    snapshot.completed_clips,
                    snapshot.total_clips
                );
            }
        }
    });

    let loader = FfprobeLoader::new();
    let result = orchestrator
        .start_request(&loader, request, &output_dir)
        .await;

    // The printer stops once every state sender is gone.
    ctrl_c.abort();
    let _ = ctrl_c.await;
    drop(orchestrator);
    let _ = printer.await;

    let report = result?;
    match report.status {
        JobStatus::Cancelled => println!(
            "\nCancelled after {}/{} clip(s). Files in: {}",
            report.clips.len(),
            report.total_clips,
            report.output_dir.display()
        ),
        _ => println!(
            "\nExport complete: {} clip(s) in {}",
            report.clips.len(),
            report.output_dir.display()
        ),
    }

    Ok(())
}
