use std::collections::HashSet;

use super::RenderGraph;
use super::style::highlight_opacity;

/// Per-frame emphasis for the current render graph.
#[derive(Debug, Default)]
pub(super) struct HighlightState {
    pub(super) node_opacity: Vec<f32>,
    pub(super) selected: Option<usize>,
    pub(super) selected_edges: HashSet<usize>,
}

impl HighlightState {
    pub(super) fn edge_opacity(&self, source: usize, target: usize) -> f32 {
        let source = self.node_opacity.get(source).copied().unwrap_or(1.0);
        let target = self.node_opacity.get(target).copied().unwrap_or(1.0);
        source.min(target)
    }

    pub(super) fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }
}

pub(super) fn build_highlight_state(
    render: &RenderGraph,
    selected_id: Option<&str>,
    highlight_text: &str,
) -> HighlightState {
    let needle = highlight_text.trim().to_lowercase();
    let node_opacity = render
        .subgraph
        .nodes
        .iter()
        .map(|node| highlight_opacity(&node.name, &needle))
        .collect();

    let selected = selected_id.and_then(|id| render.layout.index_of(id));
    let mut selected_edges = HashSet::new();

    if let Some(selected) = selected {
        for (edge_index, endpoints) in render.endpoints.iter().enumerate() {
            let Some((source, target)) = *endpoints else {
                continue;
            };
            if source == selected || target == selected {
                selected_edges.insert(edge_index);
            }
        }
    }

    HighlightState {
        node_opacity,
        selected,
        selected_edges,
    }
}
