//! ProClip Planner
//!
//! Pure planning stages turning job settings into per-clip export
//! descriptors:
//! - **Time tape:** reads that fill a duration from a looped finite source
//! - **Segment planner:** video/original/background track plans per clip
//! - **Geometry:** output size, scale factor, and centered crop
//! - **Clip planner:** ties the stages together for the orchestrator
//!
//! Nothing here touches media bytes or the filesystem.

pub mod clip;
pub mod geometry;
pub mod segment_planner;
pub mod time_tape;

pub use clip::*;
pub use geometry::resolve_geometry;
pub use segment_planner::*;
