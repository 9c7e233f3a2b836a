//! Check system capabilities.

use proclip_common::config::{config_file_path, AppConfig};
use proclip_render_engine::{command_exists, FfmpegRenderer, FfprobeLoader, Renderer};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("ProClip System Check");
    println!("{}", "=".repeat(50));

    let renderer = FfmpegRenderer::new();
    let ffmpeg_ok = renderer.is_available();
    let ffprobe_ok = command_exists(FfprobeLoader::new().binary());

    for (name, ok, purpose) in [
        ("ffmpeg", ffmpeg_ok, "renders clips"),
        ("ffprobe", ffprobe_ok, "reads media sources"),
    ] {
        if ok {
            println!("[OK] {name} found ({purpose})");
        } else {
            println!("[MISSING] {name} not in PATH ({purpose})");
        }
    }

    println!();
    let config_path = config_file_path();
    if config_path.exists() {
        println!("Config: {}", config_path.display());
    } else {
        println!("Config: defaults ({} not found)", config_path.display());
    }
    println!("Export directory: {}", config.output_dir.display());
    println!("Variant tag: {}", config.export.variant_tag);

    println!();
    if ffmpeg_ok && ffprobe_ok {
        println!("All required tools are available. ProClip is ready.");
    } else {
        println!("Install ffmpeg (which ships ffprobe) and make sure it is on PATH.");
    }

    Ok(())
}
