use std::collections::BTreeSet;

use eframe::egui::{self, Color32, Key, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::market::{MarketGraph, Node};

use super::super::{ViewCommand, ViewModel};

const FINDER_LIMIT: usize = 8;

/// Nodes whose name fuzzily matches `query`, best first. Ties keep dataset order.
fn find_nodes<'g>(graph: &'g MarketGraph, query: &str, limit: usize) -> Vec<&'g Node> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored = graph
        .nodes()
        .iter()
        .filter_map(|node| {
            matcher
                .fuzzy_match(&node.name, query)
                .map(|score| (score, node))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);
    scored.into_iter().map(|(_, node)| node).collect()
}

fn toggle_chips(ui: &mut Ui, options: &[String], chosen: &mut BTreeSet<String>) {
    ui.horizontal_wrapped(|ui| {
        for option in options {
            let mut enabled = chosen.contains(option);
            if ui.checkbox(&mut enabled, option.as_str()).changed() {
                if enabled {
                    chosen.insert(option.clone());
                } else {
                    chosen.remove(option);
                }
            }
        }
    });
}

fn submitted(ui: &Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter))
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .id_salt("controls_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_search_controls(ui);
                ui.separator();
                self.draw_filter_controls(ui);
                ui.separator();
                self.draw_highlight_controls(ui);
                ui.separator();
                self.draw_layout_controls(ui);
            });
    }

    fn draw_search_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.label("Matches names, industries, regions and sectors, then expands to neighbours.");

        let response = ui.add(
            egui::TextEdit::singleline(&mut self.query_input)
                .hint_text("e.g. fintech, Northwind")
                .desired_width(f32::INFINITY),
        );
        let enter = submitted(ui, &response);

        ui.horizontal(|ui| {
            if ui.button("Search").clicked() || enter {
                self.pending.push(ViewCommand::Search(self.query_input.clone()));
            }
            if ui.button("Clear").clicked() {
                self.pending.push(ViewCommand::Search(String::new()));
            }
        });

        if !self.applied_query.is_empty() {
            ui.small(format!("Showing results for {:?}", self.applied_query));
        }
    }

    fn draw_filter_controls(&mut self, ui: &mut Ui) {
        egui::CollapsingHeader::new("Filters")
            .default_open(true)
            .show(ui, |ui| {
                let draft = &mut self.filter_draft;

                ui.label(RichText::new("Timeframe").strong());
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.start_date)
                            .hint_text("from YYYY-MM-DD")
                            .desired_width(110.0),
                    );
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.end_date)
                            .hint_text("to YYYY-MM-DD")
                            .desired_width(110.0),
                    );
                });

                ui.label(RichText::new("Deal size ($M)").strong());
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.min_amount_m)
                            .hint_text("min")
                            .desired_width(80.0),
                    );
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.max_amount_m)
                            .hint_text("max")
                            .desired_width(80.0),
                    );
                });

                ui.label(RichText::new("Event types").strong());
                toggle_chips(ui, &self.facets.event_types, &mut draft.event_types);

                ui.label(RichText::new("Industries").strong());
                toggle_chips(ui, &self.facets.industries, &mut draft.industries);

                ui.label(RichText::new("Regions").strong());
                toggle_chips(ui, &self.facets.regions, &mut draft.regions);

                ui.label(RichText::new("Search term").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut draft.search_term)
                        .hint_text("used when the search box is empty")
                        .desired_width(f32::INFINITY),
                );

                ui.horizontal(|ui| {
                    if ui.button("Apply filters").clicked() {
                        self.pending.push(ViewCommand::ApplyFilters);
                    }
                    let can_reset = !self.filter_draft.is_empty() || self.applied_filters.is_active();
                    if ui.add_enabled(can_reset, egui::Button::new("Reset")).clicked() {
                        self.pending.push(ViewCommand::ResetFilters);
                    }
                });

                if let Some(error) = &self.filter_error {
                    ui.colored_label(Color32::from_rgb(220, 38, 38), error.as_str());
                } else if self.applied_filters.is_active() {
                    ui.small("Filters applied.");
                }
            });
    }

    fn draw_highlight_controls(&mut self, ui: &mut Ui) {
        ui.heading("Highlight");
        ui.add(
            egui::TextEdit::singleline(&mut self.highlight)
                .hint_text("dim nodes whose name does not contain...")
                .desired_width(f32::INFINITY),
        );

        ui.add_space(6.0);
        ui.label(RichText::new("Find node").strong());
        ui.add(
            egui::TextEdit::singleline(&mut self.finder)
                .hint_text("fuzzy name lookup")
                .desired_width(f32::INFINITY),
        );

        let mut chosen = None;
        for node in find_nodes(&self.graph, &self.finder, FINDER_LIMIT) {
            let label = format!("{}  ({})", node.name, node.kind().label());
            if ui.link(label).on_hover_text(node.id.as_str()).clicked() {
                chosen = Some(node.id.clone());
            }
        }
        if let Some(id) = chosen {
            self.pending.push(ViewCommand::SelectNode(id));
        }
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout");
        ui.checkbox(&mut self.live_physics, "Live physics");

        let mut restart = false;
        let config = &mut self.layout_config;
        restart |= ui
            .add(egui::Slider::new(&mut config.charge_strength, -1000.0..=-20.0).text("Charge"))
            .changed();
        restart |= ui
            .add(egui::Slider::new(&mut config.link_distance, 20.0..=300.0).text("Link distance"))
            .changed();
        restart |= ui
            .add(
                egui::Slider::new(&mut config.collision_radius, 0.0..=90.0)
                    .text("Collision radius"),
            )
            .changed();
        restart |= ui
            .add(egui::Slider::new(&mut config.center_strength, 0.0..=1.0).text("Centering"))
            .changed();
        restart |= ui
            .add(egui::Slider::new(&mut self.expansion_hops, 0..=4).text("Expansion hops"))
            .changed();

        ui.horizontal(|ui| {
            if ui.button("Restart layout").clicked() {
                restart = true;
            }
            if ui.button("Default tuning").clicked() {
                self.layout_config = Default::default();
                restart = true;
            }
        });

        if restart {
            self.graph_dirty = true;
        }

        if let Some(render) = &self.render {
            ui.small(format!(
                "{:?}  |  alpha {:.3}  |  {} ticks  |  {} links",
                render.layout.phase(),
                render.layout.alpha(),
                render.layout.ticks(),
                render.layout.link_count(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::market::{DemoProvider, GraphDataProvider};

    use super::*;

    #[test]
    fn finder_ranks_fuzzy_name_matches() {
        let graph = DemoProvider.load().unwrap();
        let found = find_nodes(&graph, "ldgrly", FINDER_LIMIT);
        assert_eq!(found.first().map(|node| node.id.as_str()), Some("co-ledgerly"));
    }

    #[test]
    fn finder_ignores_blank_queries_and_respects_limit() {
        let graph = DemoProvider.load().unwrap();
        assert!(find_nodes(&graph, "  ", FINDER_LIMIT).is_empty());
        assert!(find_nodes(&graph, "a", 3).len() <= 3);
    }
}
