use eframe::egui::{self, Align, Color32, Context, Layout, RichText};

use crate::market::{FilterSpec, MarketGraph};

use super::super::filters::FilterDraft;
use super::super::graph::ViewTransform;
use super::super::layout::LayoutConfig;
use super::super::{FilterFacets, Settings, ViewCommand, ViewModel};

const ZOOM_STEP: f32 = 1.25;

impl ViewModel {
    pub(in crate::app) fn new(graph: MarketGraph, source: String, settings: Settings) -> Self {
        let facets = FilterFacets {
            event_types: graph.event_types(),
            industries: graph.industries(),
            regions: graph.regions(),
        };

        Self {
            graph,
            source,
            expansion_hops: settings.expansion_hops,
            query_input: String::new(),
            applied_query: String::new(),
            facets,
            filter_draft: FilterDraft::default(),
            filter_error: None,
            applied_filters: FilterSpec::default(),
            highlight: String::new(),
            finder: String::new(),
            selected: None,
            transform: ViewTransform::default(),
            live_physics: settings.live_physics,
            layout_config: LayoutConfig::default(),
            graph_dirty: true,
            render_revision: 0,
            render: None,
            inspection_cache: None,
            pending: Vec::new(),
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    /// Draws one frame and processes the commands it produced. Commands the
    /// view model cannot serve are returned to the caller.
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        banner: Option<&str>,
        is_reloading: bool,
    ) -> Vec<ViewCommand> {
        if self.graph_dirty {
            self.replace_layout();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("M&A Scout");
                    ui.separator();
                    ui.label(format!("source: {}", self.source));
                    ui.label(format!("nodes: {}", self.graph.node_count()));
                    ui.label(format!("edges: {}", self.graph.edge_count()));

                    let reload = ui.add_enabled(!is_reloading, egui::Button::new("Reload data"));
                    if reload.clicked() {
                        self.pending.push(ViewCommand::Reload);
                    }
                    if is_reloading {
                        ui.spinner();
                    }

                    ui.separator();
                    if ui.button("-").on_hover_text("Zoom out").clicked() {
                        self.pending.push(ViewCommand::ZoomBy(1.0 / ZOOM_STEP));
                    }
                    if ui.button("+").on_hover_text("Zoom in").clicked() {
                        self.pending.push(ViewCommand::ZoomBy(ZOOM_STEP));
                    }
                    if ui.button("Reset view").clicked() {
                        self.pending.push(ViewCommand::ResetView);
                    }
                    ui.label(format!("{:.0}%", self.transform.zoom * 100.0));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                    });
                });
            });

        if let Some(message) = banner {
            egui::TopBottomPanel::top("error_banner")
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(
                            Color32::from_rgb(220, 38, 38),
                            RichText::new("Reload failed").strong(),
                        );
                        ui.label(message);
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.pending.push(ViewCommand::DismissError);
                            }
                            if ui.add_enabled(!is_reloading, egui::Button::new("Retry")).clicked() {
                                self.pending.push(ViewCommand::Reload);
                            }
                        });
                    });
                });
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        let escalated = self.drain_commands();
        if self.graph_dirty {
            ctx.request_repaint();
        }
        escalated
    }

    fn visible_graph_text(&self) -> String {
        match &self.render {
            Some(render) => format!(
                "showing {} of {} nodes, {} edges  |  on screen {}/{}  |  layout {:?}",
                render.subgraph.nodes.len(),
                self.graph.node_count(),
                render.subgraph.edges.len(),
                self.visible_node_count,
                self.visible_edge_count,
                render.layout.phase(),
            ),
            None => "no matching nodes".to_owned(),
        }
    }

    pub(in crate::app) fn drain_commands(&mut self) -> Vec<ViewCommand> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter_map(|command| self.apply(command))
            .collect()
    }

    /// Applies one command. Returns it back when only the app shell can serve it.
    pub(in crate::app) fn apply(&mut self, command: ViewCommand) -> Option<ViewCommand> {
        tracing::debug!(?command, "view command");

        if command.is_app_level() {
            return Some(command);
        }
        let requeries = command.requeries();

        match command {
            ViewCommand::Search(query) => {
                self.query_input.clone_from(&query);
                self.applied_query = query.trim().to_owned();
            }
            ViewCommand::ApplyFilters => match self.filter_draft.to_spec() {
                Ok(spec) => {
                    self.applied_filters = spec;
                    self.filter_error = None;
                }
                Err(error) => {
                    tracing::warn!(%error, "filter input rejected");
                    self.filter_error = Some(error.to_string());
                    return None;
                }
            },
            ViewCommand::ResetFilters => {
                self.filter_draft = FilterDraft::default();
                self.filter_error = None;
                self.applied_filters = FilterSpec::default();
                self.query_input.clear();
                self.applied_query.clear();
            }
            ViewCommand::SelectNode(id) => {
                if self.graph.node(&id).is_some() {
                    self.selected = Some(id);
                } else {
                    tracing::warn!(%id, "ignoring selection of unknown node");
                }
            }
            ViewCommand::ClearSelection => self.selected = None,
            ViewCommand::ResetView => self.transform.reset(),
            ViewCommand::ZoomBy(factor) => {
                if factor.is_finite() && factor > 0.0 {
                    self.transform.zoom_centered(factor);
                }
            }
            ViewCommand::Reload | ViewCommand::DismissError => {}
        }

        if requeries {
            self.graph_dirty = true;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::market::{DemoProvider, GraphDataProvider};

    use super::*;

    fn model_with(live_physics: bool) -> ViewModel {
        let graph = DemoProvider.load().unwrap();
        let mut model = ViewModel::new(
            graph,
            "demo".to_owned(),
            Settings {
                expansion_hops: 1,
                live_physics,
            },
        );
        model.replace_layout();
        model
    }

    fn model() -> ViewModel {
        model_with(true)
    }

    /// Runs `frames` egui frames and returns how many of them asked for another.
    fn repainting_frames(ctx: &Context, model: &mut ViewModel, frames: usize) -> usize {
        (0..frames)
            .filter(|_| {
                ctx.run(egui::RawInput::default(), |ctx| {
                    model.show(ctx, None, false);
                });
                ctx.has_requested_repaint()
            })
            .count()
    }

    #[test]
    fn starts_with_the_full_graph() {
        let model = model();
        let render = model.render.as_ref().unwrap();
        assert_eq!(render.subgraph.nodes.len(), model.graph.node_count());
        assert_eq!(render.subgraph.edges.len(), model.graph.edge_count());
        assert!(!model.graph_dirty);
    }

    #[test]
    fn search_requeries_and_reuses_positions() {
        let mut model = model();
        let before = model.render.as_ref().unwrap().layout.positions_by_id();

        assert_eq!(model.apply(ViewCommand::Search("  Northwind ".to_owned())), None);
        assert!(model.graph_dirty);
        assert_eq!(model.applied_query, "Northwind");

        model.replace_layout();
        let render = model.render.as_ref().unwrap();
        assert!(render.subgraph.nodes.len() < model.graph.node_count());
        for node in render.layout.nodes() {
            assert_eq!(Some(&node.position), before.get(&node.id));
        }
    }

    #[test]
    fn no_match_clears_the_render_graph_until_reset() {
        let mut model = model();
        model.apply(ViewCommand::Search("zzz-no-such-company".to_owned()));
        model.replace_layout();
        assert!(model.render.is_none());

        model.apply(ViewCommand::ResetFilters);
        model.replace_layout();
        assert!(model.applied_query.is_empty());
        assert_eq!(
            model.render.as_ref().unwrap().subgraph.nodes.len(),
            model.graph.node_count()
        );
    }

    #[test]
    fn invalid_filters_keep_the_applied_filters() {
        let mut model = model();
        model.filter_draft.start_date = "not a date".to_owned();

        model.apply(ViewCommand::ApplyFilters);
        assert!(model.filter_error.is_some());
        assert!(!model.graph_dirty);
        assert_eq!(model.applied_filters, FilterSpec::default());
    }

    #[test]
    fn valid_filters_are_applied() {
        let mut model = model();
        model.filter_draft.event_types.insert("acquisition".to_owned());

        model.apply(ViewCommand::ApplyFilters);
        assert!(model.filter_error.is_none());
        assert!(model.graph_dirty);
        assert_eq!(model.applied_filters.event_types, vec!["acquisition".to_owned()]);
    }

    #[test]
    fn selection_ignores_unknown_ids() {
        let mut model = model();
        model.apply(ViewCommand::SelectNode("co-ledgerly".to_owned()));
        assert_eq!(model.selected.as_deref(), Some("co-ledgerly"));

        model.apply(ViewCommand::SelectNode("missing".to_owned()));
        assert_eq!(model.selected.as_deref(), Some("co-ledgerly"));

        model.apply(ViewCommand::ClearSelection);
        assert!(model.selected.is_none());
        assert!(!model.graph_dirty);
    }

    #[test]
    fn app_level_commands_are_escalated() {
        let mut model = model();
        model.pending.push(ViewCommand::ZoomBy(2.0));
        model.pending.push(ViewCommand::Reload);
        model.pending.push(ViewCommand::DismissError);

        let escalated = model.drain_commands();
        assert_eq!(escalated, vec![ViewCommand::Reload, ViewCommand::DismissError]);
        assert_eq!(model.transform.zoom, 2.0);
        assert!(model.pending.is_empty());

        model.apply(ViewCommand::ResetView);
        assert_eq!(model.transform, ViewTransform::default());
    }

    #[test]
    fn paused_physics_leaves_the_layout_cold() {
        let mut model = model_with(false);
        assert!(!model.layout_wants_tick());

        let ctx = Context::default();
        // Let egui settle its own first-frame layout passes.
        repainting_frames(&ctx, &mut model, 2);
        assert_eq!(repainting_frames(&ctx, &mut model, 4), 0);

        let layout = &model.render.as_ref().unwrap().layout;
        assert_eq!(layout.ticks(), 0);
    }

    #[test]
    fn paused_layout_only_ticks_while_a_node_is_held() {
        let mut model = model_with(false);
        let layout = &mut model.render.as_mut().unwrap().layout;
        assert!(layout.begin_drag(0, eframe::egui::vec2(10.0, 10.0)));
        assert!(model.layout_wants_tick());

        model.render.as_mut().unwrap().layout.end_drag();
        assert!(!model.layout_wants_tick());
    }

    #[test]
    fn live_physics_ticks_until_stopped() {
        let mut model = model();
        assert!(model.layout_wants_tick());

        model.render.as_mut().unwrap().layout.stop();
        assert!(!model.layout_wants_tick());
    }

    #[test]
    fn on_screen_counts_come_from_the_drawn_frame() {
        let mut model = model_with(false);
        let ctx = Context::default();

        model.apply(ViewCommand::Search("zzz-no-such-company".to_owned()));
        repainting_frames(&ctx, &mut model, 2);
        assert!(model.render.is_none());
        assert_eq!((model.visible_node_count, model.visible_edge_count), (0, 0));

        model.apply(ViewCommand::ResetFilters);
        repainting_frames(&ctx, &mut model, 2);
        let render = model.render.as_ref().unwrap();
        assert!(model.visible_node_count <= render.subgraph.nodes.len());
        assert!(model.visible_edge_count <= render.subgraph.edges.len());
    }
}
