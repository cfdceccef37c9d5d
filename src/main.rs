mod app;
mod market;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use market::{DemoProvider, GraphDataProvider, GraphQueryService, JsonFileProvider};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore investment and acquisition networks as a graph")]
struct Args {
    /// JSON dataset with `nodes` and `edges`; the built-in demo market is used when omitted.
    #[arg(long, value_name = "PATH")]
    dataset: Option<PathBuf>,

    /// Neighbourhood hops added around direct search matches.
    #[arg(long, default_value_t = GraphQueryService::DEFAULT_EXPANSION_HOPS)]
    expansion_hops: usize,

    /// Start with the force simulation paused.
    #[arg(long)]
    no_physics: bool,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ma_scout=debug")),
        )
        .init();

    let args = Args::parse();
    let provider: Arc<dyn GraphDataProvider> = match &args.dataset {
        Some(path) => Arc::new(JsonFileProvider::new(path.clone())),
        None => Arc::new(DemoProvider),
    };
    let settings = app::Settings {
        expansion_hops: args.expansion_hops,
        live_physics: !args.no_physics,
    };
    tracing::info!(
        source = %provider.describe(),
        hops = settings.expansion_hops,
        live_physics = settings.live_physics,
        "starting M&A Scout"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "M&A Scout",
        options,
        Box::new(move |cc| Ok(Box::new(app::ScoutApp::new(cc, provider, settings)))),
    )
}
