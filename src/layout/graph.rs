use eframe::egui::Vec2;
use serde::Serialize;

use crate::vaccinations::HierarchyRoot;

use super::config::{LayoutConfig, RadiusBounds};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Year,
    Quarter,
    Leaf,
}

impl NodeKind {
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Leaf)
    }
}

/// Whether a node follows the forces or an externally imposed position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Pin {
    #[default]
    Free,
    Pinned(Vec2),
}

/// Node description handed to the layout before a run starts. Every field
/// must be final: the run resolves links against `id` once.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub value: Option<u64>,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default)]
pub struct HierarchyGraph {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub value: Option<u64>,
    pub radius: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pin: Pin,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl SimNode {
    pub fn is_pinned(&self) -> bool {
        matches!(self.pin, Pin::Pinned(_))
    }
}

/// Parent/child pair, as indices into the run's node slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
}

/// Square-root scale from `[0, max_value]` onto the radius bounds.
pub fn leaf_radius(value: u64, max_value: u64, bounds: RadiusBounds) -> f32 {
    if max_value == 0 {
        return bounds.min;
    }

    let t = (value as f64 / max_value as f64).sqrt() as f32;
    (bounds.min + (bounds.max - bounds.min) * t).clamp(bounds.min, bounds.max.max(bounds.min))
}

/// Flattens the hierarchy breadth-first into nodes with path ids
/// (`location/2021/Q1/vaccine`) and parent → child links. A root without
/// years has nothing to draw and yields an empty graph.
pub fn hierarchy_graph(root: &HierarchyRoot, config: &LayoutConfig) -> HierarchyGraph {
    let mut graph = HierarchyGraph::default();
    if root.is_empty() {
        return graph;
    }

    let max_value = root.max_leaf_doses();

    let internal = |id: String, kind: NodeKind, label: &str| NodeSpec {
        id,
        kind,
        label: label.to_owned(),
        value: None,
        radius: config.internal_radius,
    };

    let root_id = root.location.clone();
    graph
        .nodes
        .push(internal(root_id.clone(), NodeKind::Root, &root.location));

    let mut quarter_ids = Vec::new();
    for year in &root.years {
        let year_id = format!("{root_id}/{}", year.label);
        graph
            .nodes
            .push(internal(year_id.clone(), NodeKind::Year, &year.label));
        graph.links.push(LinkSpec {
            source: root_id.clone(),
            target: year_id.clone(),
        });

        for quarter in &year.quarters {
            quarter_ids.push((format!("{year_id}/{}", quarter.label), quarter, year_id.clone()));
        }
    }

    for (quarter_id, quarter, year_id) in &quarter_ids {
        graph
            .nodes
            .push(internal(quarter_id.clone(), NodeKind::Quarter, &quarter.label));
        graph.links.push(LinkSpec {
            source: year_id.clone(),
            target: quarter_id.clone(),
        });
    }

    for (quarter_id, quarter, _) in &quarter_ids {
        for leaf in &quarter.leaves {
            let leaf_id = format!("{quarter_id}/{}", leaf.vaccine);
            graph.nodes.push(NodeSpec {
                id: leaf_id.clone(),
                kind: NodeKind::Leaf,
                label: leaf.vaccine.clone(),
                value: Some(leaf.doses),
                radius: leaf_radius(leaf.doses, max_value, config.radius),
            });
            graph.links.push(LinkSpec {
                source: quarter_id.clone(),
                target: leaf_id,
            });
        }
    }

    graph
}
