//! Force-directed layout: an alpha-cooled velocity Verlet simulation with
//! charge, link, centering and collision forces. One instance per query
//! result; `stop()` ends it for good.

mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::market::{Edge, Node};
use crate::util::stable_pair;

use forces::{ChargeParams, CollisionParams, Link, accumulate_charge, accumulate_collisions};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub charge_strength: f32,
    pub theta: f32,
    pub distance_min: f32,
    pub link_distance: f32,
    pub center_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge_strength: -300.0,
            theta: 0.9,
            distance_min: 1.0,
            link_distance: 100.0,
            center_strength: 0.1,
            collision_radius: 45.0,
            collision_strength: 0.7,
            alpha_min,
            // Cools from 1.0 to alpha_min in roughly 300 ticks.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
    Initializing,
    Running,
    Idle,
    Stopped,
}

#[derive(Clone, Debug)]
pub struct LayoutNode {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed position while the node is held by the pointer.
    pub pin: Option<Vec2>,
}

pub struct ForceLayout {
    config: LayoutConfig,
    center: Vec2,
    nodes: Vec<LayoutNode>,
    index_by_id: HashMap<String, usize>,
    links: Vec<Link>,
    alpha: f32,
    alpha_target: f32,
    phase: LayoutPhase,
    dragging: Option<usize>,
    ticks: u64,
    scratch: Scratch,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
}

impl ForceLayout {
    /// Returns `None` for an empty node set: there is nothing to simulate.
    pub fn start(
        nodes: &[Node],
        edges: &[Edge],
        config: LayoutConfig,
        center: Vec2,
        prior_positions: &HashMap<String, Vec2>,
    ) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }

        let mut index_by_id = HashMap::with_capacity(nodes.len());
        let layout_nodes = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                index_by_id.insert(node.id.clone(), index);
                LayoutNode {
                    id: node.id.clone(),
                    position: prior_positions
                        .get(&node.id)
                        .copied()
                        .unwrap_or_else(|| seed_position(&node.id, index, center)),
                    velocity: Vec2::ZERO,
                    pin: None,
                }
            })
            .collect::<Vec<_>>();

        let links = build_links(edges, &index_by_id, layout_nodes.len());

        tracing::debug!(
            nodes = layout_nodes.len(),
            links = links.len(),
            reused = nodes
                .iter()
                .filter(|node| prior_positions.contains_key(&node.id))
                .count(),
            "force layout started"
        );

        Some(Self {
            config,
            center,
            nodes: layout_nodes,
            index_by_id,
            links,
            alpha: 1.0,
            alpha_target: 0.0,
            phase: LayoutPhase::Initializing,
            dragging: None,
            ticks: 0,
            scratch: Scratch::default(),
        })
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, LayoutPhase::Initializing | LayoutPhase::Running)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    #[cfg(test)]
    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.nodes.get(index).map(|node| node.position)
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn positions_by_id(&self) -> HashMap<String, Vec2> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), node.position))
            .collect()
    }

    /// Advances the simulation one step. Returns whether anything moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.phase = LayoutPhase::Running;

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;
        self.apply_forces();

        let velocity_keep = 1.0 - self.config.velocity_decay;
        for node in &mut self.nodes {
            match node.pin {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= velocity_keep;
                    node.position += node.velocity;
                }
            }
        }

        if self.alpha < self.config.alpha_min {
            self.phase = LayoutPhase::Idle;
            tracing::trace!(ticks = self.ticks, "force layout cooled");
        }
        true
    }

    fn apply_forces(&mut self) {
        let node_count = self.nodes.len();
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
        }

        forces::apply_links(
            &self.links,
            &scratch.positions,
            &mut scratch.velocities,
            self.config.link_distance,
            self.alpha,
        );

        if node_count > 1
            && let Some(tree) = QuadNode::build(&scratch.positions)
        {
            let charge = ChargeParams {
                strength: self.config.charge_strength * self.alpha,
                theta: self.config.theta,
                distance_min_sq: self.config.distance_min * self.config.distance_min,
            };
            for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
                accumulate_charge(&tree, index, &scratch.positions, charge, velocity);
            }

            let predicted = scratch
                .positions
                .iter()
                .zip(&scratch.velocities)
                .map(|(position, velocity)| *position + *velocity)
                .collect::<Vec<_>>();
            if let Some(predicted_tree) = QuadNode::build(&predicted) {
                accumulate_collisions(
                    &predicted_tree,
                    &predicted_tree,
                    true,
                    &predicted,
                    CollisionParams {
                        radius: self.config.collision_radius,
                        strength: self.config.collision_strength,
                    },
                    &mut scratch.velocities,
                );
            }
        }

        for (node, velocity) in self.nodes.iter_mut().zip(&scratch.velocities) {
            node.velocity = *velocity;
        }

        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));
        forces::apply_centering(
            &mut scratch.positions,
            self.center,
            self.config.center_strength * self.alpha,
        );
        for (node, position) in self.nodes.iter_mut().zip(&scratch.positions) {
            if node.pin.is_none() {
                node.position = *position;
            }
        }
    }

    /// Pins a node under the pointer and reheats the simulation so neighbours follow.
    pub fn begin_drag(&mut self, index: usize, world: Vec2) -> bool {
        if self.phase == LayoutPhase::Stopped {
            return false;
        }
        let Some(node) = self.nodes.get_mut(index) else {
            return false;
        };

        node.pin = Some(world);
        self.dragging = Some(index);
        self.alpha_target = self.config.drag_alpha_target;
        if self.phase == LayoutPhase::Idle {
            self.phase = LayoutPhase::Running;
        }
        true
    }

    pub fn drag_to(&mut self, world: Vec2) {
        if self.phase == LayoutPhase::Stopped {
            return;
        }
        if let Some(node) = self.dragging.and_then(|index| self.nodes.get_mut(index)) {
            node.pin = Some(world);
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(node) = self.dragging.take().and_then(|index| self.nodes.get_mut(index)) {
            node.pin = None;
        }
        self.alpha_target = 0.0;
    }

    /// Terminal. After this no call mutates positions.
    pub fn stop(&mut self) {
        if self.phase == LayoutPhase::Stopped {
            return;
        }
        self.phase = LayoutPhase::Stopped;
        self.dragging = None;
        self.alpha_target = 0.0;
        tracing::debug!(ticks = self.ticks, "force layout stopped");
    }
}

fn seed_position(id: &str, index: usize, center: Vec2) -> Vec2 {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let radius = 10.0 * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    let (jx, jy) = stable_pair(id);
    center + vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy) * 2.0
}

fn build_links(
    edges: &[Edge],
    index_by_id: &HashMap<String, usize>,
    node_count: usize,
) -> Vec<Link> {
    let mut pairs = Vec::with_capacity(edges.len());
    for edge in edges {
        let (Some(&source), Some(&target)) =
            (index_by_id.get(&edge.source), index_by_id.get(&edge.target))
        else {
            tracing::warn!(
                source = %edge.source,
                target = %edge.target,
                "layout dropped edge with a missing endpoint"
            );
            continue;
        };
        if source != target {
            pairs.push((source, target));
        }
    }

    let mut degree = vec![0u32; node_count];
    for &(source, target) in &pairs {
        degree[source] += 1;
        degree[target] += 1;
    }

    pairs
        .into_iter()
        .map(|(source, target)| {
            let source_degree = degree[source] as f32;
            let target_degree = degree[target] as f32;
            Link {
                source,
                target,
                strength: 1.0 / source_degree.min(target_degree),
                bias: source_degree / (source_degree + target_degree),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{DemoProvider, EdgeKind, GraphDataProvider, MarketGraph};

    fn sample() -> MarketGraph {
        DemoProvider.load().unwrap()
    }

    fn start(graph: &MarketGraph) -> ForceLayout {
        ForceLayout::start(
            graph.nodes(),
            graph.edges(),
            LayoutConfig::default(),
            Vec2::ZERO,
            &HashMap::new(),
        )
        .unwrap()
    }

    fn snapshot(layout: &ForceLayout) -> Vec<Vec2> {
        layout.nodes().iter().map(|node| node.position).collect()
    }

    #[test]
    fn empty_node_set_does_not_start() {
        let layout = ForceLayout::start(
            &[],
            &[],
            LayoutConfig::default(),
            Vec2::ZERO,
            &HashMap::new(),
        );
        assert!(layout.is_none());
    }

    #[test]
    fn dangling_edges_are_dropped_before_linking() {
        let graph = sample();
        let mut edges = graph.edges().to_vec();
        edges.push(Edge::new("nobody", graph.nodes()[0].id.clone(), EdgeKind::RelatedTo));

        let layout = ForceLayout::start(
            graph.nodes(),
            &edges,
            LayoutConfig::default(),
            Vec2::ZERO,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(layout.link_count(), graph.edge_count());
    }

    #[test]
    fn ticking_moves_nodes_and_cools_to_idle() {
        let graph = sample();
        let mut layout = start(&graph);
        assert_eq!(layout.phase(), LayoutPhase::Initializing);

        let before = snapshot(&layout);
        assert!(layout.tick());
        assert_eq!(layout.phase(), LayoutPhase::Running);
        assert_ne!(before, snapshot(&layout));

        for _ in 0..1000 {
            if !layout.tick() {
                break;
            }
        }
        assert_eq!(layout.phase(), LayoutPhase::Idle);
        assert!(layout.alpha() < LayoutConfig::default().alpha_min);
    }

    #[test]
    fn positions_are_frozen_after_stop() {
        let graph = sample();
        let mut layout = start(&graph);
        for _ in 0..10 {
            layout.tick();
        }

        layout.stop();
        let frozen = snapshot(&layout);
        for _ in 0..50 {
            assert!(!layout.tick());
        }
        assert!(!layout.begin_drag(0, vec2(500.0, 500.0)));
        layout.drag_to(vec2(500.0, 500.0));
        assert_eq!(frozen, snapshot(&layout));
        assert_eq!(layout.phase(), LayoutPhase::Stopped);
    }

    #[test]
    fn drag_pins_node_and_reheats() {
        let graph = sample();
        let mut layout = start(&graph);
        while layout.tick() {}
        assert_eq!(layout.phase(), LayoutPhase::Idle);

        let target = vec2(250.0, -120.0);
        assert!(layout.begin_drag(3, target));
        assert_eq!(layout.phase(), LayoutPhase::Running);
        for _ in 0..40 {
            layout.tick();
        }
        assert_eq!(layout.position(3), Some(target));
        assert!(layout.alpha() > 0.1);

        layout.end_drag();
        assert!(layout.nodes()[3].pin.is_none());
        assert_eq!(layout.dragging(), None);
    }

    #[test]
    fn prior_positions_seed_the_next_layout() {
        let graph = sample();
        let mut layout = start(&graph);
        for _ in 0..30 {
            layout.tick();
        }
        let prior = layout.positions_by_id();
        layout.stop();

        let next = ForceLayout::start(
            graph.nodes(),
            graph.edges(),
            LayoutConfig::default(),
            Vec2::ZERO,
            &prior,
        )
        .unwrap();
        for node in next.nodes() {
            assert_eq!(Some(node.position), prior.get(&node.id).copied());
        }
    }

    #[test]
    fn collision_keeps_settled_nodes_apart() {
        let graph = sample();
        let mut layout = start(&graph);
        while layout.tick() {}

        let positions = snapshot(&layout);
        let mut closest = f32::INFINITY;
        for (offset, a) in positions.iter().enumerate() {
            for b in &positions[offset + 1..] {
                closest = closest.min((*a - *b).length());
            }
        }
        assert!(closest > 20.0, "closest pair at {closest}");
    }
}
