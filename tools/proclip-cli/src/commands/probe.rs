//! Show media source information.

use std::path::PathBuf;

use proclip_render_engine::{FfprobeLoader, MediaSourceLoader};

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    let source = FfprobeLoader::new().load(&path).await?;

    println!("Source: {}", source.location.display());
    println!("  Duration: {:.3}s", source.duration_secs);
    if source.has_video {
        println!("  Frame size: {}", source.natural_size);
        if source.rotated_90 {
            println!("  Displayed as: {} (rotated)", source.display_size());
        }
        match source.nominal_frame_rate {
            Some(fps) => println!("  Frame rate: {fps:.3} fps"),
            None => println!("  Frame rate: unknown"),
        }
    } else {
        println!("  Video: none");
    }
    println!("  Audio: {}", if source.has_audio { "yes" } else { "no" });

    Ok(())
}
