use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use vax_radial::layout::{LayoutHandle, NodeKind, QuadtreeCell, SimNode};
use vax_radial::util::format_count;

use super::super::render_utils::{
    Camera, INTERNAL_FILL, NODE_STROKE, circle_visible, draw_background, vaccine_color,
};
use super::super::{ViewModel, ViewScratch};

const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(150, 150, 150, 200);

impl ViewScratch {
    fn project(&mut self, rect: Rect, camera: Camera, nodes: &[SimNode]) {
        self.screen_positions.clear();
        self.screen_radii.clear();
        for node in nodes {
            self.screen_positions
                .push(camera.world_to_screen(rect, node.position));
            self.screen_radii.push((node.radius * camera.zoom).max(1.5));
        }
    }
}

fn leaf_tooltip(node: &SimNode) -> String {
    format!(
        "Vaccine: {}\nVaccinations: {}",
        node.label,
        format_count(node.value.unwrap_or(0))
    )
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.layout_dirty {
            self.rebuild_layout();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.camera);
        self.handle_graph_zoom(ui, rect, &response);

        let Some(layout) = self.layout.as_mut() else {
            let message = self
                .layout_error
                .as_deref()
                .unwrap_or("No layout has been started.");
            ui.put(rect, egui::Label::new(message));
            return;
        };

        if layout.nodes().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("No vaccination records for {}", self.location),
                FontId::proportional(16.0),
                Color32::from_gray(220),
            );
            return;
        }

        if self.live_physics {
            layout.step();
        }
        if !layout.is_settled() || response.dragged() {
            ui.ctx().request_repaint();
        }

        self.view_scratch.project(rect, self.camera, layout.nodes());
        let hovered = Self::hovered_index(
            ui,
            layout.nodes(),
            &self.view_scratch.screen_positions,
            &self.view_scratch.screen_radii,
        );

        self.handle_node_drag(ui, rect, &response, hovered);
        self.handle_graph_pan(&response);

        if hovered.is_some() || self.controller.dragged_node().is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.controller.dragged_node().is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::Grab
                };
            });
        } else {
            self.tooltip_hidden = false;
        }

        let Some(layout) = self.layout.as_ref() else {
            return;
        };

        if self.show_quadtree_overlay {
            draw_quadtree_overlay(&painter, rect, self.camera, layout, &mut self.quadtree_cells);
        }

        let scratch = &self.view_scratch;
        let link_stroke = Stroke::new((1.2 * self.camera.zoom.sqrt()).clamp(0.6, 3.0), LINK_COLOR);
        for link in layout.links() {
            painter.line_segment(
                [
                    scratch.screen_positions[link.source],
                    scratch.screen_positions[link.target],
                ],
                link_stroke,
            );
        }

        let node_stroke = Stroke::new((1.5 * self.camera.zoom.sqrt()).clamp(0.8, 3.0), NODE_STROKE);
        for (index, node) in layout.nodes().iter().enumerate() {
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let fill = match node.kind {
                NodeKind::Leaf => vaccine_color(self.table.vaccine_index(&node.label)),
                NodeKind::Root | NodeKind::Year | NodeKind::Quarter => INTERNAL_FILL,
            };
            painter.circle_filled(position, radius, fill);
            let stroke = if hovered == Some(index) {
                Stroke::new(node_stroke.width + 1.2, Color32::from_rgb(255, 164, 101))
            } else {
                node_stroke
            };
            painter.circle_stroke(position, radius, stroke);

            if !node.kind.is_leaf() && radius > 9.0 {
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    &node.label,
                    FontId::proportional((radius * 0.6).clamp(8.0, 14.0)),
                    Color32::BLACK,
                );
            }
        }

        self.draw_status(&painter, rect, layout);

        if self.tooltip_hidden || self.controller.dragged_node().is_some() {
            return;
        }
        let Some(index) = hovered else {
            return;
        };
        let node = &layout.nodes()[index];
        if node.kind.is_leaf() {
            if let Some(pointer) = ui.input(|input| input.pointer.hover_pos()) {
                draw_tooltip(&painter, pointer, &leaf_tooltip(node));
            }
        }
    }

    fn draw_status(&self, painter: &egui::Painter, rect: Rect, layout: &LayoutHandle) {
        let state = if layout.is_settled() {
            "settled".to_owned()
        } else {
            format!("alpha {:.3}", layout.alpha())
        };
        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            format!(
                "{}  |  {} nodes  |  tick {}  |  {}  |  motion {:.2}",
                self.location,
                layout.nodes().len(),
                layout.ticks(),
                state,
                self.motion.get()
            ),
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }
}

fn draw_quadtree_overlay(
    painter: &egui::Painter,
    rect: Rect,
    camera: Camera,
    layout: &LayoutHandle,
    cells: &mut Vec<QuadtreeCell>,
) {
    layout.quadtree_cells(cells);
    for cell in cells.iter() {
        let extent = vec2(cell.half_extent, cell.half_extent);
        let min = camera.world_to_screen(rect, cell.center - extent);
        let max = camera.world_to_screen(rect, cell.center + extent);

        let alpha = if cell.is_leaf { 110 } else { 55 };
        let line_width = (1.4_f32 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
        painter.rect_stroke(
            Rect::from_min_max(min, max),
            0.0,
            Stroke::new(line_width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha)),
            egui::StrokeKind::Middle,
        );
    }
}

fn draw_tooltip(painter: &egui::Painter, pointer: Pos2, text: &str) {
    let galley = painter.layout_no_wrap(
        text.to_owned(),
        FontId::proportional(13.0),
        Color32::from_gray(20),
    );
    let origin = pointer + vec2(14.0, 14.0);
    let frame = Rect::from_min_size(origin, galley.size()).expand(6.0);
    painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(250, 250, 250, 235));
    painter.rect_stroke(
        frame,
        4.0,
        Stroke::new(1.0, Color32::from_gray(60)),
        egui::StrokeKind::Inside,
    );
    painter.galley(origin, galley, Color32::from_gray(20));
}
