//! Visual encoding of nodes and edges. Everything here is a pure function of
//! kind and properties so the same entity always draws the same way.

use eframe::egui::{Color32, Stroke, Vec2, vec2};

use crate::market::{EdgeKind, NodeKind};

pub const DIMMED_OPACITY: f32 = 0.3;
pub const LABEL_FONT_SIZE: f32 = 11.0;
pub const DASH_LENGTH: f32 = 6.0;
pub const DASH_GAP: f32 = 4.0;

const BLACK: Color32 = Color32::from_rgb(17, 17, 17);
const GREEN: Color32 = Color32::from_rgb(16, 185, 129);
const INDIGO: Color32 = Color32::from_rgb(99, 102, 241);
const GRAY: Color32 = Color32::from_rgb(156, 163, 175);
const AMBER: Color32 = Color32::from_rgb(245, 158, 11);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub radius: f32,
    pub fill: Color32,
    pub stroke: Stroke,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
    pub color: Color32,
    pub width: f32,
    pub dashed: bool,
}

pub fn node_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Industry => 15.0,
        NodeKind::Acquirer => 13.0,
        NodeKind::Investor => 12.0,
        NodeKind::Company => 10.0,
    }
}

pub fn node_fill(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Company => BLACK,
        NodeKind::Investor => GREEN,
        NodeKind::Acquirer => INDIGO,
        NodeKind::Industry => GRAY,
    }
}

pub fn node_stroke(highlighted: bool) -> Stroke {
    if highlighted {
        Stroke::new(3.0, AMBER)
    } else {
        Stroke::new(1.5, Color32::WHITE)
    }
}

pub fn node_style(kind: NodeKind, highlighted: bool) -> NodeStyle {
    NodeStyle {
        radius: node_radius(kind),
        fill: node_fill(kind),
        stroke: node_stroke(highlighted),
    }
}

pub fn edge_color(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Acquired => INDIGO,
        EdgeKind::InvestedIn => GREEN,
        EdgeKind::BelongsTo | EdgeKind::RelatedTo => GRAY,
    }
}

/// Investment lines grow with `log10(amount / 1M)`, never thinner than 1.
pub fn edge_width(kind: EdgeKind, amount: Option<f64>) -> f32 {
    match kind {
        EdgeKind::Acquired => 2.0,
        EdgeKind::InvestedIn => amount
            .filter(|amount| *amount > 0.0)
            .map(|amount| (amount / 1_000_000.0).log10().max(1.0) as f32)
            .unwrap_or(1.0),
        EdgeKind::BelongsTo | EdgeKind::RelatedTo => 1.0,
    }
}

pub fn edge_style(kind: EdgeKind, amount: Option<f64>) -> EdgeStyle {
    EdgeStyle {
        color: edge_color(kind),
        width: edge_width(kind, amount),
        dashed: kind == EdgeKind::BelongsTo,
    }
}

pub fn label_offset(radius: f32) -> Vec2 {
    vec2(radius + 4.0, -radius * 0.5)
}

/// Full opacity for names containing the highlight text, dimmed otherwise.
pub fn highlight_opacity(name: &str, highlight_lower: &str) -> f32 {
    if highlight_lower.is_empty() || name.to_lowercase().contains(highlight_lower) {
        1.0
    } else {
        DIMMED_OPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_encoding_follows_kind() {
        assert_eq!(node_radius(NodeKind::Industry), 15.0);
        assert_eq!(node_radius(NodeKind::Investor), 12.0);
        assert_eq!(node_radius(NodeKind::Company), 10.0);
        assert_eq!(node_fill(NodeKind::Investor), GREEN);
        assert_eq!(node_fill(NodeKind::Acquirer), INDIGO);
    }

    #[test]
    fn highlighted_stroke_is_wider_and_distinct() {
        let plain = node_stroke(false);
        let highlighted = node_stroke(true);
        assert!(highlighted.width > plain.width);
        assert_ne!(highlighted.color, plain.color);
    }

    #[test]
    fn investment_width_scales_with_amount() {
        assert!((edge_width(EdgeKind::InvestedIn, Some(1_000_000_000.0)) - 3.0).abs() < 1e-5);
        assert_eq!(edge_width(EdgeKind::InvestedIn, Some(50_000_000.0)), 50f64.log10() as f32);
        assert_eq!(edge_width(EdgeKind::InvestedIn, Some(500_000.0)), 1.0);
        assert_eq!(edge_width(EdgeKind::InvestedIn, None), 1.0);
        assert_eq!(edge_width(EdgeKind::Acquired, Some(1e12)), 2.0);
        assert_eq!(edge_width(EdgeKind::RelatedTo, Some(1e12)), 1.0);
    }

    #[test]
    fn only_belongs_to_is_dashed() {
        for kind in EdgeKind::ALL {
            assert_eq!(edge_style(kind, None).dashed, kind == EdgeKind::BelongsTo);
        }
    }

    #[test]
    fn mapping_is_independent_of_call_order() {
        let first = EdgeKind::ALL
            .iter()
            .map(|kind| edge_style(*kind, Some(75_000_000.0)))
            .collect::<Vec<_>>();
        let reversed = EdgeKind::ALL
            .iter()
            .rev()
            .map(|kind| edge_style(*kind, Some(75_000_000.0)))
            .rev()
            .collect::<Vec<_>>();
        assert_eq!(first, reversed);

        for kind in NodeKind::ALL {
            assert_eq!(node_style(kind, true), node_style(kind, true));
        }
    }

    #[test]
    fn highlight_dims_non_matching_names() {
        assert_eq!(highlight_opacity("Northwind Ventures", "north"), 1.0);
        assert_eq!(highlight_opacity("Ledgerly", "north"), DIMMED_OPACITY);
        assert_eq!(highlight_opacity("Ledgerly", ""), 1.0);
    }
}
