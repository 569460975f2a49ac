use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// One colour per vaccine, indexed by first appearance in the dataset and
/// wrapping when there are more vaccines than entries.
const VACCINE_PALETTE: [Color32; 15] = [
    Color32::from_rgb(255, 215, 0),   // gold
    Color32::from_rgb(0, 0, 255),     // blue
    Color32::from_rgb(255, 255, 0),   // yellow
    Color32::from_rgb(0, 128, 0),     // green
    Color32::from_rgb(128, 0, 0),     // maroon
    Color32::from_rgb(192, 192, 192), // silver
    Color32::from_rgb(0, 255, 0),     // lime
    Color32::from_rgb(128, 128, 0),   // olive
    Color32::from_rgb(0, 100, 0),     // darkgreen
    Color32::from_rgb(255, 192, 203), // pink
    Color32::from_rgb(165, 42, 42),   // brown
    Color32::from_rgb(106, 90, 205),  // slateblue
    Color32::from_rgb(255, 165, 0),   // orange
    Color32::from_rgb(0, 128, 128),   // teal
    Color32::from_rgb(0, 255, 255),   // cyan
];

pub(super) fn vaccine_color(index: Option<usize>) -> Color32 {
    match index {
        Some(index) => VACCINE_PALETTE[index % VACCINE_PALETTE.len()],
        None => Color32::from_gray(140),
    }
}

pub(super) const INTERNAL_FILL: Color32 = Color32::WHITE;
pub(super) const NODE_STROKE: Color32 = Color32::BLACK;

/// Maps layout coordinates onto the canvas. `origin` is the layout point
/// shown at the canvas centre when `pan` is zero.
#[derive(Clone, Copy, Debug)]
pub(super) struct Camera {
    pub(super) origin: Vec2,
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
}

impl Camera {
    pub(super) fn world_to_screen(self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + (world - self.origin) * self.zoom
    }

    pub(super) fn screen_to_world(self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom + self.origin
    }

    /// Zooms by `factor` keeping the layout point under `pointer` fixed.
    pub(super) fn zoom_about(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let world_before = self.screen_to_world(rect, pointer);
        self.zoom = (self.zoom * factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.center() - (world_before - self.origin) * self.zoom;
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, camera: Camera) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * camera.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + camera.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
