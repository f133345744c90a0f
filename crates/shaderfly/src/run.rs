use anyhow::Result;
use flycam::CameraTuning;
use renderer::{render_extent, RendererConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Installs the global tracing subscriber; `RUST_LOG` overrides the default
/// `info` filter.
pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let tuning = CameraTuning {
        sensitivity: cli.sensitivity,
        move_step: cli.move_step,
        exponential_speed: !cli.fixed_speed,
        sliders_enabled: !cli.no_sliders,
        ..CameraTuning::default()
    };

    let (width, height) = render_extent(cli.width, cli.aspect_ratio);
    info!(
        width,
        height,
        aspect_ratio = cli.aspect_ratio,
        windowed = cli.windowed,
        "resolved render target"
    );

    let config = RendererConfig {
        shader_path: cli.shader,
        render_width: cli.width,
        aspect_ratio: cli.aspect_ratio,
        windowed: cli.windowed,
        tuning,
        ..RendererConfig::default()
    };

    renderer::run_preview(config)
}
