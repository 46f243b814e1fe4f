use std::path::PathBuf;

use clap::Parser;
use log::info;

use solar_renderer::app;
use solar_renderer::config::RenderConfig;

/// Software rasterizer, rendering a small solar system with procedural planet shaders.
#[derive(Parser, Debug)]
#[command(name = "solar_renderer")]
struct Args {
    /// TOML config, defaults are used for anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// OBJ mesh used for every body, overrides the one from config.
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Render without a window and save the last frame.
    #[arg(long)]
    headless: bool,

    /// Number of frames to render in headless mode.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Where headless mode saves the frame.
    #[arg(long, default_value = "frame.png")]
    output: PathBuf,

    /// Log frames per second.
    #[arg(long)]
    print_fps: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            RenderConfig::load(path)?
        }
        None => RenderConfig::default(),
    };

    let context = app::Context {
        mesh: args.mesh,
        headless: args.headless,
        frames: args.frames,
        output: args.output,
        print_fps: args.print_fps,
    };

    if context.headless {
        return app::run(config, context);
    }
    // Window event loop has to own the main thread, rendering moves to a thread of its own.
    show_image::run_context(move || -> Result<(), String> {
        return app::run(config, context).map_err(|error| error.to_string());
    });
}
