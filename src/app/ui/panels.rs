use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use vax_radial::layout::{InteractionController, LayoutConfig};
use vax_radial::vaccinations::VaccinationTable;

use super::super::render_utils::Camera;
use super::super::{ViewModel, ViewScratch};

impl ViewModel {
    pub(in crate::app) fn new(table: VaccinationTable, location: String, config: LayoutConfig) -> Self {
        Self {
            table,
            location,
            location_search: String::new(),
            config,
            hierarchy: None,
            layout: None,
            layout_error: None,
            layout_dirty: true,
            controller: InteractionController::new(),
            camera: Camera {
                origin: config.viewport.center(),
                pan: Vec2::ZERO,
                zoom: 1.0,
            },
            live_physics: true,
            show_quadtree_overlay: false,
            quadtree_cells: Vec::new(),
            view_scratch: ViewScratch::default(),
            tooltip_hidden: false,
            motion: Rc::new(Cell::new(0.0)),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, data_path: &Path) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("vax-radial");
                    ui.separator();
                    ui.label(format!("data: {}", data_path.display()));
                    ui.label(format!("records: {}", self.table.records.len()));
                    ui.label(format!("locations: {}", self.table.locations.len()));
                    if let Some(domain) = self.table.domain {
                        ui.label(format!("{} → {}", domain.min, domain.max));
                    }
                    if ui.button("Restart layout").clicked() {
                        self.layout_dirty = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(summary) = self.hierarchy_summary() {
                            ui.label(summary);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    fn hierarchy_summary(&self) -> Option<String> {
        let hierarchy = self.hierarchy.as_ref()?;
        let quarters = hierarchy
            .years
            .iter()
            .map(|year| year.quarters.len())
            .sum::<usize>();
        Some(format!(
            "{}: {} years, {} quarters, {} leaves",
            hierarchy.location,
            hierarchy.years.len(),
            quarters,
            hierarchy.leaves().count()
        ))
    }
}
