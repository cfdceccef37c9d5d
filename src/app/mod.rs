use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};

use crate::market::{FilterSpec, GraphDataProvider, Inspection, MarketGraph, Subgraph};

mod commands;
mod filters;
mod graph;
mod highlight;
mod layout;
mod render_utils;
mod style;
mod ui;

pub use commands::ViewCommand;
use filters::FilterDraft;
use graph::ViewTransform;
use layout::{ForceLayout, LayoutConfig};

/// Startup options that outlive a single loaded graph.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub expansion_hops: usize,
    pub live_physics: bool,
}

pub struct ScoutApp {
    provider: Arc<dyn GraphDataProvider>,
    settings: Settings,
    state: AppState,
    reload_rx: Option<Receiver<Result<MarketGraph, String>>>,
    banner: Option<String>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<MarketGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: MarketGraph,
    source: String,
    expansion_hops: usize,
    query_input: String,
    applied_query: String,
    facets: FilterFacets,
    filter_draft: FilterDraft,
    filter_error: Option<String>,
    applied_filters: FilterSpec,
    highlight: String,
    finder: String,
    selected: Option<String>,
    transform: ViewTransform,
    live_physics: bool,
    layout_config: LayoutConfig,
    graph_dirty: bool,
    render_revision: u64,
    render: Option<RenderGraph>,
    inspection_cache: Option<InspectionCache>,
    pending: Vec<ViewCommand>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

/// One query result bound to the simulation that lays it out.
struct RenderGraph {
    subgraph: Subgraph,
    layout: ForceLayout,
    /// Layout indices per subgraph edge; `None` when an endpoint is missing.
    endpoints: Vec<Option<(usize, usize)>>,
}

impl Drop for RenderGraph {
    fn drop(&mut self) {
        self.layout.stop();
    }
}

/// Distinct values offered by the filter checkboxes, computed once per load.
struct FilterFacets {
    event_types: Vec<String>,
    industries: Vec<String>,
    regions: Vec<String>,
}

struct InspectionCache {
    node_id: String,
    inspection: Option<Inspection>,
}

impl ScoutApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        provider: Arc<dyn GraphDataProvider>,
        settings: Settings,
    ) -> Self {
        let state = Self::start_load(Arc::clone(&provider));
        Self {
            provider,
            settings,
            state,
            reload_rx: None,
            banner: None,
        }
    }

    fn spawn_load(provider: Arc<dyn GraphDataProvider>) -> Receiver<Result<MarketGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let source = provider.describe();
            tracing::info!(%source, "loading market graph");
            let result = provider.load().map_err(|error| {
                tracing::error!(%source, "market graph load failed: {error:#}");
                format!("{error:#}")
            });
            if let Ok(graph) = &result {
                tracing::info!(
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    dropped_edges = graph.dropped_edges(),
                    "market graph loaded"
                );
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(provider: Arc<dyn GraphDataProvider>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(provider),
        }
    }

    fn ready(&self, graph: MarketGraph) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            graph,
            self.provider.describe(),
            self.settings,
        )))
    }
}

impl eframe::App for ScoutApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(graph)) => transition = Some(Transition::Loaded(graph)),
                    Ok(Err(error)) => transition = Some(Transition::Failed(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Transition::Failed(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading market graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the market graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Transition::Retry);
                    }
                });
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                let escalated = model.show(ctx, self.banner.as_deref(), is_reloading);

                for command in escalated {
                    match command {
                        ViewCommand::Reload if self.reload_rx.is_none() => {
                            self.banner = None;
                            self.reload_rx = Some(Self::spawn_load(Arc::clone(&self.provider)));
                        }
                        ViewCommand::DismissError => self.banner = None,
                        _ => {}
                    }
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(graph)) => transition = Some(Transition::Loaded(graph)),
                        Ok(Err(error)) => self.banner = Some(error),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            self.banner = Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(transition) = transition {
            self.reload_rx = None;
            // Dropping the previous view model stops its simulation.
            self.state = match transition {
                Transition::Loaded(graph) => self.ready(graph),
                Transition::Failed(error) => AppState::Error(error),
                Transition::Retry => Self::start_load(Arc::clone(&self.provider)),
            };
        }
    }
}

enum Transition {
    Loaded(MarketGraph),
    Failed(String),
    Retry,
}
