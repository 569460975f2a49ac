mod config;
mod forces;
mod graph;
mod interaction;
mod quadtree;
mod simulation;

pub use config::{LayoutConfig, LinkConfig, RadiusBounds, Viewport};
pub use graph::{
    HierarchyGraph, LinkSpec, NodeKind, NodeSpec, Pin, SimLink, SimNode, hierarchy_graph,
    leaf_radius,
};
pub use interaction::{DragState, InteractionController, TooltipDirective};
pub use quadtree::QuadtreeCell;
pub use simulation::{LayoutHandle, RunState};

use crate::error::LayoutError;
use crate::vaccinations::HierarchyRoot;

/// Builds the node/link graph for `root` and starts a run over it.
pub fn layout(root: &HierarchyRoot, config: LayoutConfig) -> Result<LayoutHandle, LayoutError> {
    LayoutHandle::from_graph(hierarchy_graph(root, &config), config)
}

/// Stops the run held in `slot` and takes it out, leaving `None`.
pub fn retire(slot: &mut Option<LayoutHandle>) -> Option<LayoutHandle> {
    let mut previous = slot.take()?;
    previous.stop();
    Some(previous)
}

/// Stops the run held in `slot`, then starts one for `root` in its place.
/// Returns the stopped run, if there was one. The slot is left empty when
/// the new run fails to start.
pub fn replace(
    slot: &mut Option<LayoutHandle>,
    root: &HierarchyRoot,
    config: LayoutConfig,
) -> Result<Option<LayoutHandle>, LayoutError> {
    let previous = retire(slot);
    *slot = Some(layout(root, config)?);
    Ok(previous)
}
