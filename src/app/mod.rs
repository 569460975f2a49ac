use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2};
use tracing::{error, info};
use vax_radial::layout::{InteractionController, LayoutConfig, LayoutHandle, QuadtreeCell};
use vax_radial::vaccinations::{HierarchyRoot, VaccinationTable, load_table};

use render_utils::Camera;

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<VaccinationTable, String>;

pub struct VaxRadialApp {
    data_path: PathBuf,
    location: String,
    config: LayoutConfig,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    table: VaccinationTable,
    location: String,
    location_search: String,
    config: LayoutConfig,
    hierarchy: Option<HierarchyRoot>,
    layout: Option<LayoutHandle>,
    layout_error: Option<String>,
    layout_dirty: bool,
    controller: InteractionController,
    camera: Camera,
    live_physics: bool,
    show_quadtree_overlay: bool,
    quadtree_cells: Vec<QuadtreeCell>,
    view_scratch: ViewScratch,
    tooltip_hidden: bool,
    /// Largest node speed seen by the most recent tick.
    motion: Rc<Cell<f32>>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
}

impl VaxRadialApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_path: PathBuf,
        location: String,
        config: LayoutConfig,
    ) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            location,
            config,
            state,
        }
    }

    fn spawn_load(data_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_table(&data_path).map_err(|error| {
                format!("failed to load {}: {error}", data_path.display())
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: PathBuf) -> AppState {
        info!(path = %data_path.display(), "loading vaccination data");
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for VaxRadialApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(table)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            table,
                            self.location.clone(),
                            self.config,
                        ))));
                    }
                    Ok(Err(message)) => {
                        error!(%message, "vaccination data failed to load");
                        transition = Some(AppState::Error(message));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading vaccination data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load vaccination data");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx, &self.data_path);
                self.location.clone_from(&model.location);
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
