//! Renderer seam.

use std::path::Path;

use proclip_clip_model::descriptor::ExportDescriptor;
use proclip_common::error::ProclipResult;

/// Produces one clip file from an export descriptor.
///
/// Implementations must be callable repeatedly; the orchestrator awaits each
/// call before starting the next clip.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render `descriptor` and write the result to `destination`.
    async fn render(&self, descriptor: &ExportDescriptor, destination: &Path) -> ProclipResult<()>;

    /// Check if this renderer can run on the system.
    fn is_available(&self) -> bool;

    /// Renderer name.
    fn name(&self) -> &str;
}
