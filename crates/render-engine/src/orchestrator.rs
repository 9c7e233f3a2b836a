//! Clip job orchestration.
//!
//! One job at a time renders its clips strictly in order. Observers follow
//! the job through a [`tokio::sync::watch`] channel carrying [`JobState`];
//! the job task is its only writer. Cancellation sets a flag and wakes the
//! job, which publishes `Cancelling` and stops before the next clip, so an
//! in-flight render always finishes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

use proclip_clip_model::job::{JobState, JobStatus, LogEntry, LogLevel};
use proclip_clip_model::media::MediaSourceRef;
use proclip_clip_model::naming::{job_folder_name, OutputNamer};
use proclip_clip_model::settings::{
    AspectRatio, AudioMode, ClipJobSettings, CountMode, FrameRate, Resolution,
};
use proclip_common::config::AppConfig;
use proclip_common::error::{ProclipError, ProclipResult};
use proclip_planner::{ClipPlanner, PlanOptions};

use crate::probe::MediaSourceLoader;
use crate::renderer::Renderer;

/// Per-job knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct JobOptions {
    pub plan: PlanOptions,
    pub variant_tag: String,
    pub container: String,
    /// Write clips into a fresh `ProClip_Exports_<unix>` folder.
    pub job_subfolder: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl JobOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let export = &config.export;
        Self {
            plan: PlanOptions {
                fallback_fps: export.fallback_fps,
                audio_bitrate_kbps: export.audio_bitrate_kbps,
                x264_preset: export.x264_preset.clone(),
            },
            variant_tag: export.variant_tag.clone(),
            container: export.container.clone(),
            job_subfolder: export.job_subfolder,
        }
    }
}

/// A job described by source locations instead of loaded sources.
#[derive(Debug, Clone)]
pub struct ClipJobRequest {
    pub video: PathBuf,
    pub background_audio: Option<PathBuf>,
    pub clip_duration_secs: f64,
    pub audio_mode: AudioMode,
    pub count_mode: CountMode,
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    pub aspect_ratio: AspectRatio,
}

impl ClipJobRequest {
    pub fn new(video: impl Into<PathBuf>, clip_duration_secs: f64) -> Self {
        Self {
            video: video.into(),
            background_audio: None,
            clip_duration_secs,
            audio_mode: AudioMode::default(),
            count_mode: CountMode::default(),
            resolution: Resolution::default(),
            frame_rate: FrameRate::default(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    pub fn into_settings(
        self,
        video_source: MediaSourceRef,
        background_audio: Option<MediaSourceRef>,
    ) -> ClipJobSettings {
        ClipJobSettings {
            video_source,
            background_audio,
            clip_duration_secs: self.clip_duration_secs,
            audio_mode: self.audio_mode,
            count_mode: self.count_mode,
            resolution: self.resolution,
            frame_rate: self.frame_rate,
            aspect_ratio: self.aspect_ratio,
        }
    }
}

/// How a job that did not fail ended.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    /// [`JobStatus::Completed`] or [`JobStatus::Cancelled`].
    pub status: JobStatus,
    pub output_dir: PathBuf,
    /// Clips written, in order.
    pub clips: Vec<PathBuf>,
    pub total_clips: u32,
}

struct Shared {
    state: watch::Sender<JobState>,
    cancel_requested: AtomicBool,
    cancel_signal: Notify,
    active: AtomicBool,
}

impl Shared {
    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        match level {
            LogLevel::Error => tracing::error!("{}", entry.message),
            _ => tracing::info!("{}", entry.message),
        }
        self.state.send_modify(|state| state.log.push(entry));
    }

    /// Callable from any task; never touches the job state.
    fn cancel(&self) -> bool {
        if !self.active.load(Ordering::SeqCst) {
            return false;
        }
        if !self.cancel_requested.swap(true, Ordering::SeqCst) {
            self.cancel_signal.notify_one();
        }
        true
    }

    /// Mirror a pending cancel request into the job state, once per job.
    fn publish_cancel(&self) {
        if !self.cancel_requested.load(Ordering::SeqCst) {
            return;
        }
        let mut first = false;
        self.state.send_if_modified(|state| {
            if state.cancel_requested {
                return false;
            }
            state.cancel_requested = true;
            if state.status == JobStatus::Running {
                state.status = JobStatus::Cancelling;
            }
            first = true;
            true
        });
        if first {
            self.log(LogLevel::Info, "Cancelling operation...");
        }
    }
}

/// Releases the single-job slot when a job ends, however it ends.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Cloneable handle that requests cancellation of the running job.
#[derive(Clone)]
pub struct CancelHandle {
    shared: Arc<Shared>,
}

impl CancelHandle {
    /// Request cancellation; returns `false` when no job is running.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }
}

/// Runs clip jobs against a [`Renderer`].
pub struct ClipJobOrchestrator {
    renderer: Arc<dyn Renderer>,
    options: JobOptions,
    shared: Arc<Shared>,
}

impl ClipJobOrchestrator {
    pub fn new(renderer: Arc<dyn Renderer>, options: JobOptions) -> Self {
        let (state, _) = watch::channel(JobState::default());
        Self {
            renderer,
            options,
            shared: Arc::new(Shared {
                state,
                cancel_requested: AtomicBool::new(false),
                cancel_signal: Notify::new(),
                active: AtomicBool::new(false),
            }),
        }
    }

    /// Read-only view of the job state.
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> JobState {
        self.shared.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Request cancellation; takes effect before the next clip starts.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run a job over already-loaded sources, writing clips under `output_dir`.
    pub async fn start(
        &self,
        settings: ClipJobSettings,
        output_dir: &Path,
    ) -> ProclipResult<JobReport> {
        let _guard = self.acquire()?;
        self.run(settings, output_dir).await
    }

    /// Load the request's sources with `loader`, then run the job.
    pub async fn start_request(
        &self,
        loader: &dyn MediaSourceLoader,
        request: ClipJobRequest,
        output_dir: &Path,
    ) -> ProclipResult<JobReport> {
        let _guard = self.acquire()?;

        let video = match loader.load(&request.video).await {
            Ok(video) => video,
            Err(err) => return Err(self.fail_before_start(err)),
        };
        let background = match &request.background_audio {
            Some(location) => match loader.load(location).await {
                Ok(bg) => Some(bg),
                Err(err) => return Err(self.fail_before_start(err)),
            },
            None => None,
        };

        self.run(request.into_settings(video, background), output_dir)
            .await
    }

    fn acquire(&self) -> ProclipResult<ActiveGuard<'_>> {
        self.shared
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ProclipError::JobActive)?;
        self.shared.cancel_requested.store(false, Ordering::SeqCst);
        Ok(ActiveGuard(&self.shared.active))
    }

    /// Record a failure that happened before any clip was attempted.
    fn fail_before_start(&self, err: ProclipError) -> ProclipError {
        self.shared.state.send_replace(JobState {
            status: JobStatus::Failed,
            ..JobState::default()
        });
        self.shared
            .log(LogLevel::Error, format!("Critical Error: {err}"));
        err
    }

    fn fail(&self, err: ProclipError) -> ProclipError {
        self.shared
            .log(LogLevel::Error, format!("Critical Error: {err}"));
        self.shared
            .state
            .send_modify(|state| state.status = JobStatus::Failed);
        err
    }

    async fn run(&self, settings: ClipJobSettings, output_dir: &Path) -> ProclipResult<JobReport> {
        let planner = match ClipPlanner::new(settings, self.options.plan.clone()) {
            Ok(planner) => planner,
            Err(err) => return Err(self.fail_before_start(err)),
        };
        let total = planner.total_clips();
        let clip_secs = planner.settings().clip_duration_secs;

        self.shared.state.send_replace(JobState::running(total));
        self.shared.publish_cancel();
        self.shared.log(
            LogLevel::Info,
            format!("Plan: {total} clip(s) of {clip_secs}s each."),
        );
        let shortfall = planner.looped_clip_shortfall();
        if shortfall > 0 {
            self.shared.log(
                LogLevel::Info,
                format!(
                    "Video holds {} whole clip(s); the last {shortfall} continue from its start.",
                    total - shortfall
                ),
            );
        }

        let job_dir = if self.options.job_subfolder {
            output_dir.join(job_folder_name(chrono::Utc::now().timestamp()))
        } else {
            output_dir.to_path_buf()
        };
        if let Err(err) = tokio::fs::create_dir_all(&job_dir).await {
            return Err(self.fail(err.into()));
        }
        tracing::info!(
            renderer = self.renderer.name(),
            output_dir = %job_dir.display(),
            total_clips = total,
            "Starting clip job"
        );

        let namer = OutputNamer::new(&self.options.variant_tag, &self.options.container);
        let mut clips = Vec::new();

        for clip_index in 0..total {
            if self.shared.cancel_requested.load(Ordering::SeqCst) {
                self.shared.publish_cancel();
                self.shared.state.send_modify(|state| {
                    state.status = JobStatus::Cancelled;
                });
                self.shared.log(
                    LogLevel::Info,
                    format!("Operation cancelled after {clip_index}/{total} clip(s)."),
                );
                return Ok(JobReport {
                    status: JobStatus::Cancelled,
                    output_dir: job_dir,
                    clips,
                    total_clips: total,
                });
            }

            let clip_number = clip_index + 1;
            self.shared.log(
                LogLevel::Info,
                format!("Processing Clip {clip_number}/{total}..."),
            );

            let descriptor = planner.describe_clip(clip_index, namer.next_identifier(clip_number));
            let destination = job_dir.join(&descriptor.output_identifier);

            let render = self.renderer.render(&descriptor, &destination);
            tokio::pin!(render);
            let rendered = loop {
                tokio::select! {
                    result = &mut render => break result,
                    _ = self.shared.cancel_signal.notified() => self.shared.publish_cancel(),
                }
            };
            if let Err(err) = rendered {
                return Err(self.fail(err));
            }

            clips.push(destination.clone());
            self.shared.state.send_modify(|state| {
                state.completed_clips = clip_number;
                state.progress = clip_number as f64 / total as f64;
            });
            self.shared.log(
                LogLevel::Success,
                format!("Completed: {}", descriptor.output_identifier),
            );
        }

        self.shared.state.send_modify(|state| {
            state.status = JobStatus::Completed;
            state.progress = 1.0;
        });
        self.shared
            .log(LogLevel::Success, "All operations completed!");

        Ok(JobReport {
            status: JobStatus::Completed,
            output_dir: job_dir,
            clips,
            total_clips: total,
        })
    }
}
