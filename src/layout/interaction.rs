use eframe::egui::Vec2;
use tracing::trace;

use super::simulation::LayoutHandle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragState {
    Free,
    Dragging { node: String },
}

/// What the renderer should do with its hover tooltip after a drag event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipDirective {
    Hide,
    Unchanged,
}

/// Pointer-drag state machine. While a node is dragged it is pinned under
/// the pointer and the layout is kept warm so its neighbours follow.
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: DragState,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            state: DragState::Free,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match &self.state {
            DragState::Free => None,
            DragState::Dragging { node } => Some(node.as_str()),
        }
    }

    pub fn drag_start(
        &mut self,
        layout: &mut LayoutHandle,
        node: &str,
        pointer: Vec2,
    ) -> TooltipDirective {
        if !matches!(self.state, DragState::Free) {
            return TooltipDirective::Unchanged;
        }
        if !layout.pin(node, pointer.x, pointer.y) {
            return TooltipDirective::Unchanged;
        }

        let target = layout.config().drag_alpha_target;
        layout.reheat(target);
        trace!(node, "drag started");
        self.state = DragState::Dragging {
            node: node.to_owned(),
        };
        TooltipDirective::Hide
    }

    pub fn drag_move(&mut self, layout: &mut LayoutHandle, pointer: Vec2) -> TooltipDirective {
        let DragState::Dragging { node } = &self.state else {
            return TooltipDirective::Unchanged;
        };

        layout.pin(node, pointer.x, pointer.y);
        TooltipDirective::Hide
    }

    pub fn drag_end(&mut self, layout: &mut LayoutHandle) -> TooltipDirective {
        let DragState::Dragging { node } = &self.state else {
            return TooltipDirective::Unchanged;
        };

        layout.unpin(node);
        layout.reheat(0.0);
        trace!(node, "drag ended");
        self.state = DragState::Free;
        TooltipDirective::Hide
    }

    /// Forgets any drag without touching a layout; used when the layout the
    /// drag belonged to has been replaced.
    pub fn reset(&mut self) {
        self.state = DragState::Free;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::layout::config::LayoutConfig;
    use crate::layout::graph::{LinkSpec, NodeKind, NodeSpec, Pin};
    use crate::layout::simulation::RunState;

    fn layout() -> LayoutHandle {
        let node = |id: &str| NodeSpec {
            id: id.to_owned(),
            kind: NodeKind::Quarter,
            label: id.to_owned(),
            value: None,
            radius: 15.0,
        };
        LayoutHandle::start(
            vec![node("p"), node("c")],
            vec![LinkSpec {
                source: "p".into(),
                target: "c".into(),
            }],
            LayoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn full_drag_cycle() {
        let mut layout = layout();
        layout.run_until_settled(1_000);
        let mut controller = InteractionController::new();

        let directive = controller.drag_start(&mut layout, "c", vec2(10.0, 20.0));
        assert_eq!(directive, TooltipDirective::Hide);
        assert_eq!(controller.dragged_node(), Some("c"));
        assert_eq!(layout.node("c").unwrap().pin, Pin::Pinned(vec2(10.0, 20.0)));
        assert_eq!(layout.alpha_target(), 0.3);
        assert_eq!(layout.state(), RunState::Running);

        let directive = controller.drag_move(&mut layout, vec2(30.0, 40.0));
        assert_eq!(directive, TooltipDirective::Hide);
        layout.step();
        assert_eq!(layout.position("c"), Some(vec2(30.0, 40.0)));

        let directive = controller.drag_end(&mut layout);
        assert_eq!(directive, TooltipDirective::Hide);
        assert_eq!(controller.state(), &DragState::Free);
        assert_eq!(layout.node("c").unwrap().pin, Pin::Free);
        assert_eq!(layout.alpha_target(), 0.0);
    }

    #[test]
    fn events_outside_a_drag_are_ignored() {
        let mut layout = layout();
        let mut controller = InteractionController::new();

        assert_eq!(
            controller.drag_move(&mut layout, vec2(1.0, 1.0)),
            TooltipDirective::Unchanged
        );
        assert_eq!(controller.drag_end(&mut layout), TooltipDirective::Unchanged);
        assert!(layout.nodes().iter().all(|node| !node.is_pinned()));
    }

    #[test]
    fn unknown_node_does_not_start_a_drag() {
        let mut layout = layout();
        let mut controller = InteractionController::new();
        assert_eq!(
            controller.drag_start(&mut layout, "ghost", vec2(0.0, 0.0)),
            TooltipDirective::Unchanged
        );
        assert_eq!(controller.state(), &DragState::Free);
    }

    #[test]
    fn second_drag_start_keeps_the_first_node() {
        let mut layout = layout();
        let mut controller = InteractionController::new();
        controller.drag_start(&mut layout, "p", vec2(0.0, 0.0));
        assert_eq!(
            controller.drag_start(&mut layout, "c", vec2(5.0, 5.0)),
            TooltipDirective::Unchanged
        );
        assert_eq!(controller.dragged_node(), Some("p"));
        assert!(!layout.node("c").unwrap().is_pinned());
    }
}
