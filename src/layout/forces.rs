use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Closest squared distance at which repulsion is evaluated at full
/// strength; below it the falloff softens to avoid blow-ups.
const MIN_DISTANCE_SQ: f32 = 1.0;

/// Deterministic unit direction for a pair of coincident points.
fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

#[derive(Clone, Copy)]
pub(super) struct ResolvedLink {
    pub(super) source: usize,
    pub(super) target: usize,
    /// Share of the correction applied to the target; the better connected
    /// endpoint moves less.
    pub(super) bias: f32,
}

#[derive(Clone, Copy)]
pub(super) struct LinkParams {
    pub(super) distance: f32,
    pub(super) strength: f32,
}

/// Soft springs between parent and child, acting on predicted positions.
pub(super) fn apply_link_force(
    links: &[ResolvedLink],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    params: LinkParams,
    alpha: f32,
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() <= f32::EPSILON {
            delta = jiggle(source, target) * 1.0e-3;
        }
        let distance = delta.length();
        let scale = (distance - params.distance) / distance * alpha * params.strength;
        let correction = delta * scale;

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

/// Barnes-Hut repulsion felt by one point; `strength` already includes alpha.
pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    impulse: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *impulse += repulsion_between(point, positions[other_index], index, other_index, strength);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq();
    let can_approximate = !node.bounds.contains(point)
        && distance_sq > 0.0
        && (node.bounds.side_length() / distance_sq.sqrt()) < theta;

    if can_approximate {
        *impulse += delta * (strength * node.mass / soften(distance_sq));
        return;
    }

    for child in node.children() {
        accumulate_repulsion_for_node(child, index, positions, strength, theta, impulse);
    }
}

fn repulsion_between(point: Vec2, other: Vec2, index: usize, other_index: usize, strength: f32) -> Vec2 {
    let mut delta = point - other;
    if delta.length_sq() <= f32::EPSILON {
        delta = jiggle(index, other_index) * 1.0e-3;
    }
    delta * (strength / soften(delta.length_sq()))
}

fn soften(distance_sq: f32) -> f32 {
    if distance_sq < MIN_DISTANCE_SQ {
        (MIN_DISTANCE_SQ * distance_sq).sqrt()
    } else {
        distance_sq
    }
}

/// Pulls every free point toward `center` on each axis independently.
pub(super) fn apply_centering(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    center: Vec2,
    strength: f32,
    alpha: f32,
) {
    let scale = strength * alpha;
    for (position, velocity) in positions.iter().zip(velocities.iter_mut()) {
        velocity.x += (center.x - position.x) * scale;
        velocity.y += (center.y - position.y) * scale;
    }
}

/// One collision pass. `tree` is built over the predicted positions at the
/// start of the pass; pairs are resolved in index order against live
/// velocities so later pairs see earlier corrections.
pub(super) fn resolve_collisions(
    tree: &QuadNode,
    positions: &[Vec2],
    radii: &[f32],
    velocities: &mut [Vec2],
) {
    for index in 0..positions.len() {
        let predicted = positions[index] + velocities[index];
        visit_collisions(tree, index, predicted, positions, radii, velocities);
    }
}

fn visit_collisions(
    node: &QuadNode,
    index: usize,
    predicted: Vec2,
    positions: &[Vec2],
    radii: &[f32],
    velocities: &mut [Vec2],
) {
    let reach = radii[index] + node.max_radius;
    if node.bounds.distance_sq_to_point(predicted) > reach * reach {
        return;
    }

    if !node.is_leaf() {
        for child in node.children() {
            visit_collisions(child, index, predicted, positions, radii, velocities);
        }
        return;
    }

    let own_radius_sq = radii[index] * radii[index];
    for &other in &node.indices {
        if other <= index {
            continue;
        }

        let min_distance = radii[index] + radii[other];
        let mut delta = predicted - (positions[other] + velocities[other]);
        let distance_sq = delta.length_sq();
        if distance_sq >= min_distance * min_distance {
            continue;
        }
        if distance_sq <= f32::EPSILON {
            delta = jiggle(index, other) * 1.0e-3;
        }

        let distance = delta.length();
        let push = delta * ((min_distance - distance) / distance);
        let other_radius_sq = radii[other] * radii[other];
        let share = other_radius_sq / (own_radius_sq + other_radius_sq).max(f32::EPSILON);

        velocities[index] += push * share;
        velocities[other] -= push * (1.0 - share);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_pulls_stretched_pair_together() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let mut velocities = vec![Vec2::ZERO; 2];
        let links = [ResolvedLink {
            source: 0,
            target: 1,
            bias: 0.5,
        }];

        apply_link_force(
            &links,
            &positions,
            &mut velocities,
            LinkParams {
                distance: 20.0,
                strength: 0.8,
            },
            1.0,
        );

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
        assert!((velocities[0].x + velocities[1].x).abs() < 1.0e-4);
    }

    #[test]
    fn repulsion_points_away_from_neighbours() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(0.0, 10.0)];
        let radii = vec![1.0; 3];
        let tree = QuadNode::build(&positions, &radii).unwrap();

        let mut impulse = Vec2::ZERO;
        accumulate_repulsion_for_node(&tree, 0, &positions, 400.0, 0.9, &mut impulse);
        assert!(impulse.x < 0.0);
        assert!(impulse.y < 0.0);
    }

    #[test]
    fn approximation_stays_close_to_exact_sum() {
        let mut positions = vec![vec2(-500.0, -500.0)];
        for index in 0..60 {
            positions.push(vec2(
                200.0 + (index % 8) as f32 * 4.0,
                200.0 + (index / 8) as f32 * 4.0,
            ));
        }
        let radii = vec![1.0; positions.len()];
        let tree = QuadNode::build(&positions, &radii).unwrap();

        let mut approximate = Vec2::ZERO;
        accumulate_repulsion_for_node(&tree, 0, &positions, 400.0, 0.9, &mut approximate);

        let exact = positions[1..]
            .iter()
            .enumerate()
            .map(|(offset, other)| repulsion_between(positions[0], *other, 0, offset + 1, 400.0))
            .fold(Vec2::ZERO, |sum, impulse| sum + impulse);

        let error = (approximate - exact).length() / exact.length();
        assert!(error < 0.05, "relative error {error}");
    }

    #[test]
    fn collision_separates_overlapping_circles() {
        let positions = vec![vec2(0.0, 0.0), vec2(5.0, 0.0)];
        let radii = vec![10.0, 10.0];
        let mut velocities = vec![Vec2::ZERO; 2];
        let tree = QuadNode::build(&positions, &radii).unwrap();

        resolve_collisions(&tree, &positions, &radii, &mut velocities);

        let after = (positions[1] + velocities[1]) - (positions[0] + velocities[0]);
        assert!((after.length() - 20.0).abs() < 1.0e-3);
    }

    #[test]
    fn centering_acts_per_axis() {
        let positions = vec![vec2(110.0, 40.0)];
        let mut velocities = vec![Vec2::ZERO];
        apply_centering(&positions, &mut velocities, vec2(100.0, 50.0), 0.1, 0.5);
        assert!((velocities[0].x + 0.5).abs() < 1.0e-5);
        assert!((velocities[0].y - 0.5).abs() < 1.0e-5);
    }
}
