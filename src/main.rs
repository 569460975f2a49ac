mod app;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vax_radial::export::LayoutSnapshot;
use vax_radial::layout::{LayoutConfig, layout};
use vax_radial::vaccinations::{load_table, location_hierarchy};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// CSV with location, date, vaccine and total_vaccinations columns.
    #[arg(long)]
    data: PathBuf,

    #[arg(long, default_value = "Japan")]
    location: String,

    /// JSON overrides for the layout parameters.
    #[arg(long)]
    layout_config: Option<PathBuf>,

    /// Settle the layout without a window and write it as JSON.
    #[arg(long)]
    export: Option<PathBuf>,

    #[arg(long, default_value_t = 400)]
    max_ticks: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let config = match &args.layout_config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };

    if let Some(output) = args.export.clone() {
        return export(&args, config, &output);
    }
    run_window(args, config)
}

fn export(args: &Args, config: LayoutConfig, output: &Path) -> Result<()> {
    let table = load_table(&args.data)
        .with_context(|| format!("failed to load {}", args.data.display()))?;
    let hierarchy = location_hierarchy(&table, &args.location)
        .with_context(|| format!("failed to build hierarchy for {}", args.location))?;

    let mut handle = layout(&hierarchy, config)?;
    let ticks = handle.run_until_settled(args.max_ticks);
    info!(
        location = %args.location,
        ticks,
        settled = handle.is_settled(),
        "layout finished"
    );

    LayoutSnapshot::capture(&args.location, &handle).write(output)?;
    info!(path = %output.display(), "layout written");
    Ok(())
}

fn run_window(args: Args, config: LayoutConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.viewport.width, config.viewport.height]),
        ..Default::default()
    };

    eframe::run_native(
        "vax-radial",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::VaxRadialApp::new(
                cc,
                args.data,
                args.location,
                config,
            )))
        }),
    )
    .map_err(|error| anyhow!("window failed: {error}"))
}
