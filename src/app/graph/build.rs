use std::rc::Rc;

use tracing::{info, warn};
use vax_radial::layout::{replace, retire};
use vax_radial::vaccinations::location_hierarchy;

use super::super::ViewModel;

impl ViewModel {
    /// Replaces the running layout with a fresh one for the selected
    /// location.
    pub(in crate::app) fn rebuild_layout(&mut self) {
        self.layout_dirty = false;
        self.controller.reset();
        self.tooltip_hidden = false;
        self.motion.set(0.0);

        let hierarchy = match location_hierarchy(&self.table, &self.location) {
            Ok(hierarchy) => hierarchy,
            Err(error) => {
                warn!(location = %self.location, %error, "could not build hierarchy");
                retire(&mut self.layout);
                self.hierarchy = None;
                self.layout_error = Some(error.to_string());
                return;
            }
        };

        match replace(&mut self.layout, &hierarchy, self.config) {
            Ok(_) => {
                if let Some(layout) = self.layout.as_mut() {
                    let motion = Rc::clone(&self.motion);
                    layout.on_tick(move |nodes, _links| {
                        let fastest = nodes
                            .iter()
                            .map(|node| node.velocity.length())
                            .fold(0.0_f32, f32::max);
                        motion.set(fastest);
                    });
                    info!(
                        location = %self.location,
                        nodes = layout.nodes().len(),
                        "layout rebuilt"
                    );
                }
                self.layout_error = None;
            }
            Err(error) => {
                warn!(location = %self.location, %error, "could not start layout");
                self.layout_error = Some(error.to_string());
            }
        }
        self.hierarchy = Some(hierarchy);
    }

    pub(in crate::app) fn select_location(&mut self, location: &str) {
        if self.location == location {
            return;
        }

        self.location = location.to_owned();
        self.layout_dirty = true;
    }
}
