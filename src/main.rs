use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pbr_spheres::{
    App, ShadingParams,
    geometry::sphere::DEFAULT_SUBDIVISIONS,
    params::parse_hex_rgb,
    render::RendererSettings,
};
use winit::event_loop::EventLoop;

#[derive(Parser)]
#[command(name = "pbr-spheres")]
#[command(about = "A grid of physically-based spheres rendered with wgpu")]
#[command(version)]
struct Args {
    /// Directory holding the environment and material images
    #[arg(long, value_name = "DIR", default_value = "assets")]
    assets: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Window height
    #[arg(long, default_value = "720")]
    height: u32,

    /// Sphere albedo (hex format, e.g., #ff8000)
    #[arg(long, default_value = "#ffffff", value_parser = parse_hex_rgb)]
    albedo: [u8; 3],

    /// Start with the four punctual lights instead of image-based lighting
    #[arg(long)]
    punctual: bool,

    /// Start with the material toggle on
    #[arg(long)]
    material: bool,

    /// Start with the rusted iron textures instead of the albedo
    #[arg(long)]
    metal: bool,

    /// Read diffuse irradiance from the baked offscreen target
    #[arg(long)]
    baked_irradiance: bool,

    /// Background color (hex format, e.g., #000000)
    #[arg(long, default_value = "#000000", value_parser = parse_hex_rgb)]
    background: [u8; 3],

    /// Sphere subdivisions along both axes
    #[arg(long, default_value_t = DEFAULT_SUBDIVISIONS)]
    subdivisions: u32,

    /// Draw a triangle per grid cell instead of spheres
    #[arg(long)]
    triangle: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins when set; otherwise our crate at Info/Debug and the GPU
    // stack at Warn.
    let rust_log_set = std::env::var("RUST_LOG").is_ok();
    let mut builder = env_logger::Builder::from_default_env();
    if !rust_log_set {
        if args.verbose {
            builder.filter_level(log::LevelFilter::Debug);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder
            .filter_module("wgpu", log::LevelFilter::Warn)
            .filter_module("wgpu_core", log::LevelFilter::Warn)
            .filter_module("wgpu_hal", log::LevelFilter::Warn)
            .filter_module("naga", log::LevelFilter::Warn);
    }
    builder.init();

    log::info!("PBR Spheres starting");
    if !args.assets.is_dir() {
        log::warn!(
            "Assets directory '{}' not found; only punctual lighting will be available",
            args.assets.display()
        );
    }

    let settings = RendererSettings {
        assets: args.assets,
        background: args.background,
        subdivisions: args.subdivisions,
        triangle: args.triangle,
    };
    let params = ShadingParams {
        albedo: args.albedo,
        punctual: args.punctual,
        material: args.material,
        textured_metal: args.metal,
        use_baked_irradiance: args.baked_irradiance,
    };

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(settings, params, (args.width, args.height));

    event_loop.run_app(&mut app)?;

    if let Some(err) = app.take_error() {
        return Err(err);
    }
    log::info!("PBR Spheres exiting");
    Ok(())
}
