//! Serializable snapshot of a layout run, for the headless export mode.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::layout::{LayoutHandle, NodeKind};

#[derive(Debug, Serialize)]
pub struct LayoutSnapshot {
    pub location: String,
    pub settled: bool,
    pub ticks: u64,
    pub alpha: f32,
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct LinkSnapshot {
    pub source: String,
    pub target: String,
}

impl LayoutSnapshot {
    pub fn capture(location: &str, layout: &LayoutHandle) -> Self {
        let nodes = layout.nodes();
        Self {
            location: location.to_owned(),
            settled: layout.is_settled(),
            ticks: layout.ticks(),
            alpha: layout.alpha(),
            nodes: nodes
                .iter()
                .map(|node| NodeSnapshot {
                    id: node.id.clone(),
                    kind: node.kind,
                    label: node.label.clone(),
                    value: node.value,
                    radius: node.radius,
                    x: node.position.x,
                    y: node.position.y,
                })
                .collect(),
            links: layout
                .links()
                .iter()
                .map(|link| LinkSnapshot {
                    source: nodes[link.source].id.clone(),
                    target: nodes[link.target].id.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize layout snapshot")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .with_context(|| format!("failed to write layout snapshot to {}", path.display()))
    }
}
