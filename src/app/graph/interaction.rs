use eframe::egui::{self, PointerButton, Pos2, Rect, Response, Ui};

use super::super::{ViewCommand, ViewModel};

/// Extra screen-space slack around small nodes so they stay easy to grab.
const HIT_SLOP: f32 = 3.0;

/// Topmost node under `pointer`; later indices draw on top.
pub(super) fn node_at(positions: &[Pos2], radii: &[f32], pointer: Pos2) -> Option<usize> {
    positions
        .iter()
        .zip(radii)
        .enumerate()
        .rev()
        .filter(|(_, (position, radius))| position.distance(pointer) <= **radius + HIT_SLOP)
        .min_by(|a, b| {
            a.1.0
                .distance(pointer)
                .total_cmp(&b.1.0.distance(pointer))
        })
        .map(|(index, _)| index)
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let anchor = response.hover_pos().unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.transform.zoom_about(rect, anchor, factor);
    }

    /// Handles dragging nodes, panning and click selection. Returns the
    /// hovered node index, if any.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        rect: Rect,
        response: &Response,
        positions: &[Pos2],
        radii: &[f32],
    ) -> Option<usize> {
        let hovered = response
            .hover_pos()
            .and_then(|pointer| node_at(positions, radii, pointer));
        let transform = self.transform;
        let mut commands = Vec::new();

        if let Some(render) = self.render.as_mut() {
            let layout = &mut render.layout;

            if response.drag_started_by(PointerButton::Primary)
                && let Some(pointer) = response.interact_pointer_pos()
                && let Some(index) = node_at(positions, radii, pointer)
            {
                layout.begin_drag(index, transform.screen_to_world(rect, pointer));
            }

            if response.dragged_by(PointerButton::Primary) {
                if layout.dragging().is_some() {
                    if let Some(pointer) = response.interact_pointer_pos() {
                        layout.drag_to(transform.screen_to_world(rect, pointer));
                    }
                } else {
                    self.transform.pan_by(response.drag_delta());
                }
            }

            if response.drag_stopped() && layout.dragging().is_some() {
                layout.end_drag();
            }

            if response.clicked_by(PointerButton::Primary) {
                let clicked = response
                    .interact_pointer_pos()
                    .and_then(|pointer| node_at(positions, radii, pointer))
                    .and_then(|index| layout.nodes().get(index))
                    .map(|node| node.id.clone());
                commands.push(match clicked {
                    Some(id) => ViewCommand::SelectNode(id),
                    None => ViewCommand::ClearSelection,
                });
            }
        }

        if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle)
        {
            self.transform.pan_by(response.drag_delta());
        }

        if response.double_clicked() && hovered.is_none() {
            commands.push(ViewCommand::ResetView);
        }

        self.pending.extend(commands);

        if hovered.is_some() {
            response.ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        hovered
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn hit_test_prefers_the_closest_node() {
        let positions = [pos2(0.0, 0.0), pos2(12.0, 0.0)];
        let radii = [10.0, 10.0];
        assert_eq!(node_at(&positions, &radii, pos2(8.0, 0.0)), Some(1));
        assert_eq!(node_at(&positions, &radii, pos2(2.0, 1.0)), Some(0));
    }

    #[test]
    fn hit_test_misses_empty_space() {
        let positions = [pos2(0.0, 0.0)];
        let radii = [10.0];
        assert_eq!(node_at(&positions, &radii, pos2(40.0, 40.0)), None);
        assert_eq!(node_at(&[], &[], pos2(0.0, 0.0)), None);
    }

    #[test]
    fn hit_test_allows_slop_around_small_nodes() {
        let positions = [pos2(0.0, 0.0)];
        let radii = [4.0];
        assert_eq!(node_at(&positions, &radii, pos2(6.5, 0.0)), Some(0));
    }
}
