use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::market::{GraphQueryService, Subgraph};

use super::super::layout::{ForceLayout, LayoutConfig};
use super::super::{RenderGraph, ViewModel};

impl RenderGraph {
    /// Binds a query result to a fresh simulation. `None` when the result is empty.
    pub(in crate::app) fn new(
        subgraph: Subgraph,
        config: LayoutConfig,
        prior_positions: &HashMap<String, Vec2>,
    ) -> Option<Self> {
        let layout = ForceLayout::start(
            &subgraph.nodes,
            &subgraph.edges,
            config,
            Vec2::ZERO,
            prior_positions,
        )?;

        let endpoints = subgraph
            .edges
            .iter()
            .map(|edge| Some((layout.index_of(&edge.source)?, layout.index_of(&edge.target)?)))
            .collect();

        Some(Self {
            subgraph,
            layout,
            endpoints,
        })
    }
}

impl ViewModel {
    /// Re-runs the applied query and swaps in a new layout. The previous
    /// layout is stopped before its replacement starts; surviving nodes keep
    /// their positions.
    pub(in crate::app) fn replace_layout(&mut self) {
        self.render_revision = self.render_revision.wrapping_add(1);
        self.inspection_cache = None;

        let prior_positions = match self.render.take() {
            Some(mut previous) => {
                previous.layout.stop();
                previous.layout.positions_by_id()
            }
            None => HashMap::new(),
        };

        let subgraph = GraphQueryService::new(&self.graph)
            .with_expansion_hops(self.expansion_hops)
            .search(&self.applied_query, &self.applied_filters);

        tracing::info!(
            query = %self.applied_query,
            filters_active = self.applied_filters.is_active(),
            hops = self.expansion_hops,
            nodes = subgraph.nodes.len(),
            edges = subgraph.edges.len(),
            revision = self.render_revision,
            "graph view rebuilt"
        );

        if subgraph.is_empty() {
            tracing::debug!(query = %self.applied_query, "query matched no nodes");
        }
        self.render = RenderGraph::new(subgraph, self.layout_config, &prior_positions);
        self.graph_dirty = false;
    }
}
