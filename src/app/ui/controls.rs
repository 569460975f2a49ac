use eframe::egui::{self, Color32, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use vax_radial::layout::LayoutConfig;
use vax_radial::util::format_count;

use super::super::ViewModel;
use super::super::render_utils::vaccine_color;

const LOCATION_ROWS: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Locations matching `query`, best match first; every location when the
/// query is blank.
fn matching_locations<'a>(locations: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return locations.iter().map(String::as_str).collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = locations
        .iter()
        .filter_map(|location| {
            fuzzy_match_score(&matcher, location, query).map(|score| (score, location.as_str()))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(_, location)| location).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Location");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search")
            .on_hover_text("Fuzzy-filter the locations present in the dataset.");
        ui.text_edit_singleline(&mut self.location_search);

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("location_list")
            .max_height(ui.spacing().interact_size.y * LOCATION_ROWS as f32)
            .show(ui, |ui| {
                for location in matching_locations(&self.table.locations, &self.location_search) {
                    let selected = location == self.location;
                    if ui.selectable_label(selected, location).clicked() {
                        picked = Some(location.to_owned());
                    }
                }
            });
        if let Some(location) = picked {
            self.select_location(&location);
        }

        ui.add_space(8.0);
        ui.heading("Forces");
        ui.separator();

        let mut config = self.config;
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut config.repulsion_strength, 0.0..=2_000.0).text("Repulsion"))
            .on_hover_text("Magnitude of the pairwise charge between all nodes.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.link.distance, 0.0..=200.0).text("Link distance"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.link.strength, 0.0..=1.0).text("Link strength"))
            .on_hover_text("Kept below 1 so collisions win over springs.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.center_strength, 0.0..=1.0).text("Centering"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut config.collision_iterations, 1..=10)
                    .text("Collision passes"),
            )
            .changed();
        if ui.button("Reset forces").clicked() {
            let defaults = LayoutConfig::default();
            config.repulsion_strength = defaults.repulsion_strength;
            config.link = defaults.link;
            config.center_strength = defaults.center_strength;
            config.collision_iterations = defaults.collision_iterations;
            changed = true;
        }
        if changed && config != self.config {
            self.config = config;
            self.layout_dirty = true;
        }

        ui.add_space(8.0);
        ui.heading("View");
        ui.separator();
        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Pause to freeze the layout; dragging still moves the grabbed node.");
        ui.checkbox(&mut self.show_quadtree_overlay, "Quadtree overlay");
        if ui.button("Reset view").clicked() {
            self.camera.pan = vec2(0.0, 0.0);
            self.camera.zoom = 1.0;
        }

        ui.add_space(8.0);
        self.draw_legend(ui);
    }

    fn draw_legend(&self, ui: &mut Ui) {
        ui.heading("Vaccines");
        ui.separator();

        for (index, vaccine) in self.table.vaccines.iter().enumerate() {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                ui.painter().circle_filled(rect.center(), 6.0, vaccine_color(Some(index)));
                ui.painter()
                    .circle_stroke(rect.center(), 6.0, (1.0, Color32::BLACK));
                ui.label(vaccine);

                let total = self
                    .hierarchy
                    .as_ref()
                    .map(|hierarchy| hierarchy.total_doses(vaccine))
                    .unwrap_or(0);
                if total > 0 {
                    ui.weak(format_count(total));
                }
            });
        }
    }
}
