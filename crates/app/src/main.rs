//! Entry point for Lumen3D.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use platform::{PlatformConfig, RendererConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "lumen3d")]
#[command(about = "Real-time viewer for a small lit 3D scene", long_about = None)]
struct Cli {
    /// auto | vulkan | dx12 | metal | gl
    #[arg(long = "gpu-backend", default_value = "auto")]
    gpu_backend: String,

    /// Initial window size, e.g. 1280x720
    #[arg(long, default_value = "1280x720", value_parser = parse_size)]
    size: (u32, u32),

    /// Log frames per second once per second
    #[arg(long = "show-fps")]
    show_fps: bool,

    /// Render a second viewport from an offset camera
    #[arg(long = "split-view")]
    split_view: bool,

    /// Directory holding models/ and textures/
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Camera movement in units per second
    #[arg(long = "move-speed", default_value_t = 1.0)]
    move_speed: f32,

    /// Camera look speed in radians per pixel per second
    #[arg(long = "rot-speed", default_value_t = 0.75)]
    rot_speed: f32,
}

impl Cli {
    fn into_config(self) -> PlatformConfig {
        let (width, height) = self.size;
        PlatformConfig {
            width,
            height,
            show_fps: self.show_fps,
            renderer: RendererConfig {
                backends: parse_backend(&self.gpu_backend),
                assets_dir: self.assets,
                split_view: self.split_view,
                move_speed: self.move_speed,
                rot_speed: self.rot_speed,
                ..RendererConfig::default()
            },
            ..PlatformConfig::default()
        }
    }
}

fn parse_backend(name: &str) -> wgpu::Backends {
    match name.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w.max(1), h.max(1)))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    log::info!(
        "Starting Lumen3D. Backend: {:?}, show_fps={}, split_view={}, window_size={}x{}, assets={}",
        config.renderer.backends,
        config.show_fps,
        config.renderer.split_view,
        config.width,
        config.height,
        config.renderer.assets_dir.display()
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_either_separator() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert_eq!(parse_size("0x0"), Ok((1, 1)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn backend_names() {
        assert_eq!(parse_backend("Vulkan"), wgpu::Backends::VULKAN);
        assert_eq!(parse_backend("d3d12"), wgpu::Backends::DX12);
        assert_eq!(parse_backend("nonsense"), wgpu::Backends::all());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Cli::parse_from(["lumen3d"]).into_config();
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(!config.show_fps);
        assert!(!config.renderer.split_view);
        assert_eq!(config.renderer.move_speed, 1.0);
        assert_eq!(config.renderer.rot_speed, 0.75);
        assert_eq!(config.renderer.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn flags_reach_the_config() {
        let config = Cli::parse_from([
            "lumen3d",
            "--split-view",
            "--show-fps",
            "--size",
            "320x200",
            "--move-speed",
            "2.5",
        ])
        .into_config();
        assert!(config.renderer.split_view);
        assert!(config.show_fps);
        assert_eq!((config.width, config.height), (320, 200));
        assert_eq!(config.renderer.move_speed, 2.5);
    }
}
