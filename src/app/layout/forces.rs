use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Strength already scaled by alpha. Negative repels.
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) distance_min_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) radius: f32,
    pub(super) strength: f32,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

/// Many-body charge for one node, walking the Barnes–Hut tree.
pub(super) fn accumulate_charge(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            if delta.length_sq() <= f32::EPSILON {
                delta = fallback_direction(index, other);
            }
            *velocity += delta * (params.strength / clamp_distance_sq(delta, params));
        }
        return;
    }

    let delta = cell.center_of_mass - point;
    let distance_sq = delta.length_sq();
    if distance_sq > f32::EPSILON {
        let width = cell.bounds.side_length();
        if width * width < params.theta * params.theta * distance_sq {
            *velocity += delta * (params.strength * cell.mass / clamp_distance_sq(delta, params));
            return;
        }
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, params, velocity);
    }
}

fn clamp_distance_sq(delta: Vec2, params: ChargeParams) -> f32 {
    let distance_sq = delta.length_sq();
    if distance_sq < params.distance_min_sq {
        (params.distance_min_sq * distance_sq).sqrt().max(f32::EPSILON)
    } else {
        distance_sq
    }
}

/// Pushes overlapping circles apart. `predicted` are positions advanced by current velocity.
pub(super) fn accumulate_collisions(
    cell_a: &QuadNode,
    cell_b: &QuadNode,
    same_cell: bool,
    predicted: &[Vec2],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let reach = params.radius * 2.0;
    if cell_a.bounds.gap_sq(cell_b.bounds) > reach * reach {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (offset, &from) in cell_a.indices.iter().enumerate() {
                for &to in &cell_a.indices[offset + 1..] {
                    separate(from, to, predicted, params, velocities);
                }
            }
        } else {
            for &from in &cell_a.indices {
                for &to in &cell_b.indices {
                    separate(from, to, predicted, params, velocities);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collisions(child_a, child_a, true, predicted, params, velocities);
            for child_b in &children[offset + 1..] {
                accumulate_collisions(child_a, child_b, false, predicted, params, velocities);
            }
        }
        return;
    }

    let split_a = if cell_a.is_leaf() {
        false
    } else if cell_b.is_leaf() {
        true
    } else {
        cell_a.bounds.half_extent >= cell_b.bounds.half_extent
    };

    if split_a {
        for child in cell_a.children() {
            accumulate_collisions(child, cell_b, false, predicted, params, velocities);
        }
    } else {
        for child in cell_b.children() {
            accumulate_collisions(cell_a, child, false, predicted, params, velocities);
        }
    }
}

fn separate(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let min_distance = params.radius * 2.0;
    let mut delta = predicted[from] - predicted[to];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }
    if distance_sq <= f32::EPSILON {
        delta = fallback_direction(from, to);
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((min_distance - distance) / distance * params.strength * 0.5);
    velocities[from] += push;
    velocities[to] -= push;
}

/// Spring toward `rest_length`, split between endpoints by degree (`bias`).
pub(super) fn apply_links(
    links: &[Link],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    rest_length: f32,
    alpha: f32,
) {
    for (offset, link) in links.iter().enumerate() {
        let predicted_source = positions[link.source] + velocities[link.source];
        let predicted_target = positions[link.target] + velocities[link.target];
        let mut delta = predicted_target - predicted_source;
        if delta.length_sq() <= f32::EPSILON {
            delta = fallback_direction(offset, link.target);
        }

        let distance = delta.length();
        let scale = (distance - rest_length) / distance * alpha * link.strength;
        let correction = delta * scale;
        velocities[link.target] -= correction * link.bias;
        velocities[link.source] += correction * (1.0 - link.bias);
    }
}

/// Moves every node so the centroid drifts toward `center`.
pub(super) fn apply_centering(positions: &mut [Vec2], center: Vec2, strength: f32) {
    if positions.is_empty() {
        return;
    }

    let centroid = positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point)
        / positions.len() as f32;
    let shift = (centroid - center) * strength;
    if shift.length_sq() <= f32::EPSILON {
        return;
    }
    for position in positions {
        *position -= shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_pushes_nodes_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).unwrap();
        let params = ChargeParams {
            strength: -30.0,
            theta: 0.9,
            distance_min_sq: 1.0,
        };

        let mut velocity = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, params, &mut velocity);
        assert!(velocity.x < 0.0);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn collisions_only_affect_overlapping_pairs() {
        let positions = vec![vec2(0.0, 0.0), vec2(30.0, 0.0), vec2(500.0, 0.0)];
        let tree = QuadNode::build(&positions).unwrap();
        let mut velocities = vec![Vec2::ZERO; 3];
        accumulate_collisions(
            &tree,
            &tree,
            true,
            &positions,
            CollisionParams {
                radius: 20.0,
                strength: 1.0,
            },
            &mut velocities,
        );

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[2], Vec2::ZERO);
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let positions = vec![vec2(0.0, 0.0), vec2(300.0, 0.0)];
        let mut velocities = vec![Vec2::ZERO; 2];
        let links = [Link {
            source: 0,
            target: 1,
            strength: 1.0,
            bias: 0.5,
        }];
        apply_links(&links, &positions, &mut velocities, 100.0, 1.0);

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
    }

    #[test]
    fn centering_moves_centroid_toward_center() {
        let mut positions = vec![vec2(100.0, 100.0), vec2(300.0, 100.0)];
        apply_centering(&mut positions, Vec2::ZERO, 0.5);
        let centroid = (positions[0] + positions[1]) / 2.0;
        assert_eq!(centroid, vec2(100.0, 50.0));
    }
}
