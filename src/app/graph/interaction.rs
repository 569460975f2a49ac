use eframe::egui::{self, Pos2, Rect, Ui};
use vax_radial::layout::{SimNode, TooltipDirective};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.camera.zoom_about(rect, pointer, zoom_factor);
    }

    /// Secondary or middle drag pans; so does a primary drag that did not
    /// start on a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let panning = response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary)
                && self.controller.dragged_node().is_none());
        if panning {
            self.camera.pan += response.drag_delta();
        }
    }

    /// Routes primary-button drags on nodes through the interaction
    /// controller.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let Some(layout) = self.layout.as_mut() else {
            return;
        };
        let Some(pointer) = ui.input(|input| input.pointer.interact_pos()) else {
            return;
        };
        let world = self.camera.screen_to_world(rect, pointer);

        let mut directive = TooltipDirective::Unchanged;
        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(index) = hovered {
                let id = layout.nodes()[index].id.clone();
                directive = self.controller.drag_start(layout, &id, world);
            }
        } else if response.drag_stopped() {
            directive = self.controller.drag_end(layout);
        } else if response.dragged_by(egui::PointerButton::Primary) {
            directive = self.controller.drag_move(layout, world);
        }

        if directive == TooltipDirective::Hide {
            self.tooltip_hidden = true;
        }
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        nodes: &[SimNode],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        (0..nodes.len())
            .filter_map(|index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
