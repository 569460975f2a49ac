use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info, warn};

use crate::error::LayoutError;
use crate::util::stable_pair;

use super::config::LayoutConfig;
use super::forces::{
    LinkParams, ResolvedLink, accumulate_repulsion_for_node, apply_centering, apply_link_force,
    resolve_collisions,
};
use super::graph::{HierarchyGraph, LinkSpec, NodeSpec, Pin, SimLink, SimNode};
use super::quadtree::{QuadNode, QuadtreeCell, collect_quadtree_cells};

const BARNES_HUT_THETA: f32 = 0.9;
const INITIAL_RADIUS: f32 = 10.0;
const INITIAL_JITTER: f32 = 2.0;
const MAX_SPEED: f32 = 200.0;

type TickListener = Box<dyn FnMut(&[SimNode], &[SimLink])>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// `step` advances the simulation.
    Running,
    /// Alpha fell below the threshold; `reheat` resumes.
    Settled,
    /// Released with `stop`; nothing resumes it.
    Stopped,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    predicted: Vec<Vec2>,
}

/// One layout run over a fixed node/link set.
///
/// The handle owns its nodes. Drive it with [`LayoutHandle::step`] once per
/// frame or [`LayoutHandle::run_until_settled`] in batch, and call
/// [`LayoutHandle::stop`] before replacing it.
pub struct LayoutHandle {
    config: LayoutConfig,
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    resolved_links: Vec<ResolvedLink>,
    index_by_id: HashMap<String, usize>,
    alpha: f32,
    alpha_target: f32,
    state: RunState,
    ticks: u64,
    tick_listeners: Vec<TickListener>,
    scratch: PhysicsScratch,
}

impl LayoutHandle {
    pub fn start(
        nodes: Vec<NodeSpec>,
        links: Vec<LinkSpec>,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(LayoutError::DuplicateNode(node.id.clone()));
            }
        }

        let center = config.viewport.center();
        let mut sim_nodes = nodes
            .into_iter()
            .enumerate()
            .map(|(index, spec)| SimNode {
                position: center + initial_offset(index, &spec.id),
                id: spec.id,
                kind: spec.kind,
                label: spec.label,
                value: spec.value,
                radius: spec.radius,
                velocity: Vec2::ZERO,
                pin: Pin::Free,
                parent: None,
                children: Vec::new(),
            })
            .collect::<Vec<_>>();

        let mut sim_links = Vec::with_capacity(links.len());
        for link in links {
            let resolve = |id: &str| {
                index_by_id
                    .get(id)
                    .copied()
                    .ok_or_else(|| LayoutError::UnknownNode(id.to_owned()))
            };
            let source = resolve(&link.source)?;
            let target = resolve(&link.target)?;
            sim_nodes[source].children.push(target);
            sim_nodes[target].parent = Some(source);
            sim_links.push(SimLink { source, target });
        }

        let mut degree = vec![0usize; sim_nodes.len()];
        for link in &sim_links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }
        let resolved_links = sim_links
            .iter()
            .map(|link| ResolvedLink {
                source: link.source,
                target: link.target,
                bias: degree[link.source] as f32
                    / (degree[link.source] + degree[link.target]) as f32,
            })
            .collect();

        let state = if sim_nodes.is_empty() {
            RunState::Settled
        } else {
            RunState::Running
        };
        info!(
            nodes = sim_nodes.len(),
            links = sim_links.len(),
            "starting layout"
        );

        Ok(Self {
            config,
            nodes: sim_nodes,
            links: sim_links,
            resolved_links,
            index_by_id,
            alpha: 1.0,
            alpha_target: 0.0,
            state,
            ticks: 0,
            tick_listeners: Vec::new(),
            scratch: PhysicsScratch::default(),
        })
    }

    pub fn from_graph(graph: HierarchyGraph, config: LayoutConfig) -> Result<Self, LayoutError> {
        Self::start(graph.nodes, graph.links, config)
    }

    pub fn on_tick(&mut self, listener: impl FnMut(&[SimNode], &[SimLink]) + 'static) {
        self.tick_listeners.push(Box::new(listener));
    }

    /// Advances one tick if the run is live and returns the node state.
    pub fn step(&mut self) -> &[SimNode] {
        if self.state == RunState::Running {
            self.tick();
            self.ticks += 1;

            for listener in &mut self.tick_listeners {
                listener(&self.nodes, &self.links);
            }

            if self.alpha < self.config.alpha_min {
                self.state = RunState::Settled;
                debug!(ticks = self.ticks, "layout settled");
            }
        }

        &self.nodes
    }

    /// Steps until settled or `max_ticks` ticks ran; returns the tick count.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ran = 0;
        while ran < max_ticks && self.state == RunState::Running {
            self.step();
            ran += 1;
        }
        ran
    }

    /// Sets the temperature the run decays toward and resumes ticking.
    pub fn reheat(&mut self, alpha_target: f32) {
        if self.state == RunState::Stopped {
            warn!("reheat ignored on a stopped layout");
            return;
        }

        self.alpha_target = alpha_target.clamp(0.0, 1.0);
        if !self.nodes.is_empty() {
            self.state = RunState::Running;
        }
    }

    /// Fixes a node at `(x, y)` until [`LayoutHandle::unpin`]. Returns
    /// `false` for an unknown id.
    pub fn pin(&mut self, id: &str, x: f32, y: f32) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };

        let node = &mut self.nodes[index];
        let position = vec2(x, y);
        node.pin = Pin::Pinned(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
        true
    }

    pub fn unpin(&mut self, id: &str) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };

        self.nodes[index].pin = Pin::Free;
        true
    }

    /// Releases the run: no further ticks, listeners dropped.
    pub fn stop(&mut self) {
        if self.state != RunState::Stopped {
            debug!(ticks = self.ticks, "layout stopped");
        }
        self.state = RunState::Stopped;
        self.tick_listeners.clear();
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        self.state != RunState::Running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.node(id).map(|node| node.position)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&str, Vec2)> {
        self.nodes
            .iter()
            .map(|node| (node.id.as_str(), node.position))
    }

    pub fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = self
            .nodes
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();
        let radii = self.nodes.iter().map(|node| node.radius).collect::<Vec<_>>();
        if let Some(tree) = QuadNode::build(&positions, &radii) {
            collect_quadtree_cells(&tree, 0, cells);
        }
    }

    fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.radii.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
            scratch.radii.push(node.radius);
        }

        let positions = &scratch.positions;
        let velocities = &mut scratch.velocities;
        let radii = &scratch.radii;

        apply_link_force(
            &self.resolved_links,
            positions,
            velocities,
            LinkParams {
                distance: self.config.link.distance,
                strength: self.config.link.strength,
            },
            alpha,
        );

        if let Some(tree) = QuadNode::build(positions, radii) {
            let strength = self.config.repulsion_strength * alpha;
            for (index, velocity) in velocities.iter_mut().enumerate() {
                let mut impulse = Vec2::ZERO;
                accumulate_repulsion_for_node(
                    &tree,
                    index,
                    positions,
                    strength,
                    BARNES_HUT_THETA,
                    &mut impulse,
                );
                *velocity += impulse;
            }
        }

        apply_centering(
            positions,
            velocities,
            self.config.viewport.center(),
            self.config.center_strength,
            alpha,
        );

        for _ in 0..self.config.collision_iterations {
            scratch.predicted.clear();
            scratch.predicted.extend(
                positions
                    .iter()
                    .zip(velocities.iter())
                    .map(|(position, velocity)| *position + *velocity),
            );
            let Some(tree) = QuadNode::build(&scratch.predicted, radii) else {
                break;
            };
            resolve_collisions(&tree, positions, radii, velocities);
        }

        let retain = 1.0 - self.config.velocity_decay;
        for (node, velocity) in self.nodes.iter_mut().zip(velocities.iter()) {
            match node.pin {
                Pin::Pinned(position) => {
                    node.position = position;
                    node.velocity = Vec2::ZERO;
                }
                Pin::Free => {
                    let mut velocity = *velocity * retain;
                    let speed_sq = velocity.length_sq();
                    if speed_sq > MAX_SPEED * MAX_SPEED {
                        velocity *= MAX_SPEED / speed_sq.sqrt();
                    }
                    node.velocity = velocity;
                    node.position += velocity;
                }
            }
        }
    }
}

/// Phyllotaxis spiral with a small id-derived jitter.
fn initial_offset(index: usize, id: &str) -> Vec2 {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    let (jx, jy) = stable_pair(id);
    vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy) * INITIAL_JITTER
}
