//! ProClip Render Engine
//!
//! Turns planned clips into files and drives whole jobs.
//!
//! # Pipeline Architecture
//!
//! ```text
//! locations ──MediaSourceLoader──▶ ClipJobSettings
//!                                        │
//!                                        ▼
//!                                  ClipPlanner (per clip)
//!                                        │ ExportDescriptor
//!                                        ▼
//!                                     Renderer ──▶ ProClip_Exports_<unix>/<clip>.mp4
//!                                        │
//!                       JobState ◀───────┘ (watch channel)
//! ```

pub mod ffmpeg;
pub mod orchestrator;
pub mod probe;
pub mod renderer;

pub use ffmpeg::{command_exists, FfmpegRenderer};
pub use orchestrator::*;
pub use probe::{FfprobeLoader, MediaSourceLoader};
pub use renderer::Renderer;
