use eframe::egui::{self, RichText, Ui};

use crate::market::{EdgeKind, EventKind, Inspection, inspect};
use crate::util::{format_currency, format_date};

use super::super::style::{edge_color, node_fill};
use super::super::{InspectionCache, ViewCommand, ViewModel};

impl ViewModel {
    fn refresh_inspection(&mut self, node_id: &str) {
        if self
            .inspection_cache
            .as_ref()
            .is_some_and(|cache| cache.node_id == node_id)
        {
            return;
        }

        let inspection = inspect(&self.graph, node_id);
        tracing::debug!(
            node_id,
            found = inspection.is_some(),
            connections = inspection.as_ref().map_or(0, |found| found.connections.len()),
            events = inspection.as_ref().map_or(0, |found| found.events.len()),
            "node inspected"
        );
        self.inspection_cache = Some(InspectionCache {
            node_id: node_id.to_owned(),
            inspection,
        });
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Node details");
            if self.selected.is_some() && ui.small_button("Close").clicked() {
                self.pending.push(ViewCommand::ClearSelection);
            }
        });
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node in the graph, or pick one from the finder.");
            return;
        };

        self.refresh_inspection(&selected_id);
        let Some(inspection) = self
            .inspection_cache
            .as_ref()
            .and_then(|cache| cache.inspection.as_ref())
        else {
            ui.label("Selected node no longer exists in the dataset.");
            return;
        };

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                draw_overview(ui, inspection);
                ui.separator();
                clicked = draw_connections(ui, inspection);
                ui.separator();
                draw_events(ui, inspection);
            });

        if let Some(id) = clicked {
            self.pending.push(ViewCommand::SelectNode(id));
        }
    }
}

fn draw_overview(ui: &mut Ui, inspection: &Inspection) {
    let overview = &inspection.overview;

    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 5.0, node_fill(overview.kind));
        ui.label(RichText::new(overview.name.as_str()).strong().size(16.0));
    });
    ui.small(format!("{}  |  {}", overview.kind.label(), overview.id));
    ui.add_space(6.0);

    egui::Grid::new("overview_facts")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .striped(true)
        .show(ui, |ui| {
            for (label, value) in &overview.facts {
                ui.label(*label);
                ui.label(value.as_str());
                ui.end_row();
            }
            if overview.total_deal_value > 0.0 {
                ui.label("Total deal value");
                ui.label(format_currency(overview.total_deal_value));
                ui.end_row();
            }
        });

    if let Some(description) = &overview.description {
        ui.add_space(6.0);
        ui.label(description.as_str());
    }
}

/// Returns the id of a connection the user clicked.
fn draw_connections(ui: &mut Ui, inspection: &Inspection) -> Option<String> {
    let mut clicked = None;

    egui::CollapsingHeader::new(format!("Connections ({})", inspection.connections.len()))
        .default_open(true)
        .show(ui, |ui| {
            if inspection.connections.is_empty() {
                ui.label("No direct connections.");
                return;
            }

            for connection in &inspection.connections {
                ui.horizontal_wrapped(|ui| {
                    let link = ui
                        .link(connection.name.as_str())
                        .on_hover_text(format!("{} ({})", connection.id, connection.kind.label()));
                    if link.clicked() {
                        clicked = Some(connection.id.clone());
                    }
                    ui.small(connection.relationships.join(", "));
                });
            }
        });

    clicked
}

fn draw_events(ui: &mut Ui, inspection: &Inspection) {
    egui::CollapsingHeader::new(format!("Deal history ({})", inspection.events.len()))
        .default_open(true)
        .show(ui, |ui| {
            if inspection.events.is_empty() {
                ui.label("No funding or acquisition events.");
                return;
            }

            for event in &inspection.events {
                let color = edge_color(match event.kind {
                    EventKind::Funding => EdgeKind::InvestedIn,
                    EventKind::Acquisition => EdgeKind::Acquired,
                });
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(color, RichText::new(event.kind.label()).strong());
                    ui.label(format_date(event.date));
                    if let Some(amount) = event.amount {
                        ui.label(format_currency(amount));
                    }
                    ui.label(format!("with {}", event.counterparty));
                });
                if !event.details.is_empty() {
                    ui.small(event.details.as_str());
                }
                ui.add_space(4.0);
            }
        });
}
