use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 920.0,
        }
    }
}

impl Viewport {
    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusBounds {
    pub min: f32,
    pub max: f32,
}

impl Default for RadiusBounds {
    fn default() -> Self {
        Self {
            min: 15.0,
            max: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Rest length of a parent/child spring.
    pub distance: f32,
    /// Below 1 so collisions can win against springs.
    pub strength: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            distance: 20.0,
            strength: 0.8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub viewport: Viewport,
    /// Scale range for leaf circles.
    pub radius: RadiusBounds,
    /// Radius of every root/year/quarter circle.
    pub internal_radius: f32,
    pub link: LinkConfig,
    /// Magnitude of the pairwise charge; always repulsive.
    pub repulsion_strength: f32,
    pub center_strength: f32,
    pub collision_iterations: usize,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    /// Temperature the layout is held at while a node is dragged.
    pub drag_alpha_target: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            viewport: Viewport::default(),
            radius: RadiusBounds::default(),
            internal_radius: 15.0,
            link: LinkConfig::default(),
            repulsion_strength: 400.0,
            center_strength: 0.1,
            collision_iterations: 4,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid layout config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse layout config {}", path.display()))
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            LayoutConfig::from_json_str(r#"{"link": {"distance": 35.0}, "collision_iterations": 2}"#)
                .unwrap();
        assert_eq!(config.link.distance, 35.0);
        assert_eq!(config.link.strength, 0.8);
        assert_eq!(config.collision_iterations, 2);
        assert_eq!(config.radius, RadiusBounds::default());
    }

    #[test]
    fn default_decay_settles_in_about_three_hundred_ticks() {
        let config = LayoutConfig::default();
        let mut alpha = 1.0_f32;
        let mut ticks = 0;
        while alpha >= config.alpha_min {
            alpha += (0.0 - alpha) * config.alpha_decay;
            ticks += 1;
        }
        assert!((295..=305).contains(&ticks), "settled after {ticks} ticks");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(LayoutConfig::from_json_str("{ not json").is_err());
    }
}
