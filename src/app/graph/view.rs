use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};

use crate::market::{EdgeKind, NodeKind};
use crate::util::format_currency;

use super::super::highlight::build_highlight_state;
use super::super::render_utils::{
    circle_visible, draw_background, draw_edge, edge_visible, with_opacity,
};
use super::super::style::{
    LABEL_FONT_SIZE, edge_style, label_offset, node_fill, node_radius, node_style,
};
use super::super::{RenderGraph, ViewCommand, ViewModel};

const LABEL_COLOR: Color32 = Color32::from_rgb(31, 41, 55);
const CAPTION_COLOR: Color32 = Color32::from_rgb(55, 65, 81);

impl ViewModel {
    /// Screen position and radius per layout node, in layout order.
    fn screen_geometry(&self, rect: Rect, render: &RenderGraph) -> (Vec<Pos2>, Vec<f32>) {
        let zoom = self.transform.zoom;
        render
            .layout
            .nodes()
            .iter()
            .zip(&render.subgraph.nodes)
            .map(|(layout_node, node)| {
                (
                    self.transform.world_to_screen(rect, layout_node.position),
                    (node_radius(node.kind()) * zoom).max(2.0),
                )
            })
            .unzip()
    }

    /// Whether the layout should advance this frame. A paused simulation only
    /// moves while a node is held.
    pub(in crate::app) fn layout_wants_tick(&self) -> bool {
        self.render.as_ref().is_some_and(|render| {
            (self.live_physics || render.layout.dragging().is_some()) && render.layout.is_active()
        })
    }

    fn step_layout(&mut self, ui: &Ui) {
        if !self.layout_wants_tick() {
            return;
        }
        if let Some(render) = self.render.as_mut() {
            render.layout.tick();
        }
        if self.layout_wants_tick() {
            ui.ctx().request_repaint();
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.replace_layout();
        }

        if self.render.is_none() {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.draw_empty_state(ui);
            return;
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.transform);

        self.handle_graph_zoom(ui, rect, &response);
        self.step_layout(ui);

        let Some(render) = self.render.as_ref() else {
            return;
        };
        let (positions, radii) = self.screen_geometry(rect, render);
        let hovered = self.handle_graph_pointer(rect, &response, &positions, &radii);

        let Some(render) = self.render.as_ref() else {
            return;
        };
        let highlight = build_highlight_state(render, self.selected.as_deref(), &self.highlight);

        let mut drawn_edges = 0usize;
        for (edge_index, (edge, endpoints)) in
            render.subgraph.edges.iter().zip(&render.endpoints).enumerate()
        {
            let Some((source, target)) = *endpoints else {
                continue;
            };
            let (start, end) = (positions[source], positions[target]);
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            let style = edge_style(edge.kind, edge.properties.amount);
            let opacity = highlight.edge_opacity(source, target);
            let width = if highlight.selected_edges.contains(&edge_index) {
                style.width + 1.0
            } else {
                style.width
            };
            draw_edge(
                &painter,
                start,
                end,
                Stroke::new(width, with_opacity(style.color, opacity)),
                style.dashed,
            );
            drawn_edges += 1;
        }

        let label_font = FontId::proportional(LABEL_FONT_SIZE);
        let mut drawn_nodes = 0usize;
        let mut selection_animating = false;
        for (index, node) in render.subgraph.nodes.iter().enumerate() {
            let (position, radius) = (positions[index], radii[index]);
            if !circle_visible(rect, position, radius + 80.0) {
                continue;
            }

            let is_selected = highlight.is_selected(index);
            let style = node_style(node.kind(), is_selected);
            let opacity = highlight.node_opacity.get(index).copied().unwrap_or(1.0);

            let selection_mix = ui
                .ctx()
                .animate_bool(ui.make_persistent_id(("node-selection", node.id.as_str())), is_selected);
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            painter.circle_filled(position, radius, with_opacity(style.fill, opacity));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(style.stroke.width, with_opacity(style.stroke.color, opacity)),
            );
            if selection_mix > 0.0 {
                painter.circle_stroke(
                    position,
                    radius + 3.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(1.0, with_opacity(style.stroke.color, selection_mix * 0.6)),
                );
            }

            painter.text(
                position + label_offset(radius),
                Align2::LEFT_CENTER,
                node.name.as_str(),
                label_font.clone(),
                with_opacity(LABEL_COLOR, opacity),
            );
            drawn_nodes += 1;
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(node) = hovered.and_then(|index| render.subgraph.nodes.get(index)) {
            let mut caption = format!("{}  |  {}", node.name, node.kind().label());
            if let Some(industry) = node.profile.industry() {
                caption.push_str(&format!("  |  {industry}"));
            }
            let deal_total = render
                .subgraph
                .edges
                .iter()
                .filter(|edge| edge.source == node.id || edge.target == node.id)
                .filter_map(|edge| edge.properties.amount)
                .sum::<f64>();
            if deal_total > 0.0 {
                caption.push_str(&format!("  |  deals in view {}", format_currency(deal_total)));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                caption,
                FontId::proportional(13.0),
                CAPTION_COLOR,
            );
        }

        draw_legend(&painter, rect);

        self.visible_node_count = drawn_nodes;
        self.visible_edge_count = drawn_edges;
    }

    fn draw_empty_state(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading("No results match your filters");
            ui.add_space(6.0);
            if !self.applied_query.trim().is_empty() {
                ui.label(format!("Query: {:?}", self.applied_query.trim()));
            }
            ui.label("Broaden the search or clear the filters to see the market graph again.");
            ui.add_space(10.0);
            if ui.button("Reset filters").clicked() {
                self.pending.push(ViewCommand::ResetFilters);
            }
        });
    }
}

fn draw_legend(painter: &Painter, rect: Rect) {
    let row_height = 16.0;
    let rows = NodeKind::ALL.len() + EdgeKind::ALL.len();
    let size = vec2(150.0, (rows as f32 * row_height) + 12.0);
    let frame = Rect::from_min_size(rect.left_bottom() + vec2(10.0, -(size.y + 10.0)), size);

    painter.rect_filled(frame, 6.0, Color32::from_rgba_unmultiplied(255, 255, 255, 220));
    painter.rect_stroke(
        frame,
        6.0,
        Stroke::new(1.0, Color32::from_rgb(229, 231, 235)),
        egui::StrokeKind::Inside,
    );

    let font = FontId::proportional(LABEL_FONT_SIZE);
    let mut cursor = frame.left_top() + vec2(14.0, 6.0 + row_height * 0.5);

    for kind in NodeKind::ALL {
        painter.circle_filled(cursor, 5.0, node_fill(kind));
        painter.text(
            cursor + vec2(14.0, 0.0),
            Align2::LEFT_CENTER,
            kind.label(),
            font.clone(),
            CAPTION_COLOR,
        );
        cursor.y += row_height;
    }

    for kind in EdgeKind::ALL {
        let style = edge_style(kind, None);
        draw_edge(
            painter,
            cursor - vec2(6.0, 0.0),
            cursor + vec2(6.0, 0.0),
            Stroke::new(style.width.max(1.5), style.color),
            style.dashed,
        );
        painter.text(
            cursor + vec2(14.0, 0.0),
            Align2::LEFT_CENTER,
            kind.label(),
            font.clone(),
            CAPTION_COLOR,
        );
        cursor.y += row_height;
    }
}
