//! ProClip Clip Model
//!
//! Defines the data contracts shared by the planner, the render engine,
//! and the CLI:
//! - **Media:** Loaded source handles (duration, size, rotation, tracks)
//! - **Settings:** Per-job options (clip length, count, audio, geometry, fps)
//! - **Segments:** Time-range reads that make up each track of a clip
//! - **Geometry:** Scale + centered crop mapping source pixels to output
//! - **Descriptor:** The self-contained unit handed to a renderer
//! - **Job:** Observable job status, progress, and log
//!
//! All times are in seconds (`f64`); all pixel sizes are `u32`.

pub mod descriptor;
pub mod geometry;
pub mod job;
pub mod media;
pub mod naming;
pub mod segment;
pub mod settings;

pub use descriptor::*;
pub use geometry::*;
pub use job::*;
pub use media::*;
pub use naming::*;
pub use segment::*;
pub use settings::*;
