//! Map configuration: zoom limits, input thresholds and the color palette.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes.

use crate::error::{Error, Result};
use egui::Color32;
use serde::Deserialize;
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Map settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub cell_size: CellSizeConfig,
    /// Scale change per wheel notch.
    pub wheel_zoom_factor: f32,
    /// Pointer travel, in points, under which a press/release is a click.
    pub click_threshold: f32,
    /// Cells moved per arrow key press while Shift is held.
    pub fast_step: i32,
    /// Side of the square overview, in points.
    pub minimap_size: f32,
    /// Below this cell size only every 5th coordinate gets a label.
    pub label_min_cell_size: f32,
    pub palette: Palette,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cell_size: CellSizeConfig::default(),
            wheel_zoom_factor: 1.1,
            click_threshold: 4.0,
            fast_step: 5,
            minimap_size: 160.0,
            label_min_cell_size: 20.0,
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CellSizeConfig {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for CellSizeConfig {
    fn default() -> Self {
        Self {
            initial: 32.0,
            min: 8.0,
            max: 96.0,
        }
    }
}

impl CellSizeConfig {
    pub fn clamp(&self, cell_size: f32) -> f32 {
        if cell_size.is_nan() {
            return self.initial;
        }
        cell_size.clamp(self.min, self.max)
    }
}

impl MapConfig {
    /// Parse a RON document.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] when the text is not a valid config.
    pub fn from_ron_str(text: &str, origin: &Path) -> Result<Self> {
        let mut config: Self = ron::from_str(text).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.sanitize();
        Ok(config)
    }

    /// Read and parse a RON config file.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`]
    /// if its content is not a valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text, path)?;
        log::info!("loaded map config from {}", path.display());
        Ok(config)
    }

    /// Repair values that would make the map unusable.
    fn sanitize(&mut self) {
        let defaults = Self::default();
        let cells = &mut self.cell_size;
        if cells.min.is_nan() || cells.max.is_nan() || cells.min <= 0.0 || cells.min > cells.max {
            log::warn!(
                "invalid cell size range {}..={}, using defaults",
                cells.min,
                cells.max
            );
            cells.min = defaults.cell_size.min;
            cells.max = defaults.cell_size.max;
        }
        cells.initial = cells.clamp(cells.initial);
        if self.wheel_zoom_factor.is_nan() || self.wheel_zoom_factor <= 1.0 {
            self.wheel_zoom_factor = defaults.wheel_zoom_factor;
        }
        self.fast_step = self.fast_step.max(1);
        self.click_threshold = self.click_threshold.max(0.0);
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Colors used by the map and the overview. Written as `(r, g, b, a)` byte tuples
/// in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    #[serde(with = "rgba")]
    pub background: Color32,
    #[serde(with = "rgba")]
    pub grid_fine: Color32,
    #[serde(with = "rgba")]
    pub grid_minor: Color32,
    #[serde(with = "rgba")]
    pub grid_major: Color32,
    #[serde(with = "rgba")]
    pub label: Color32,
    #[serde(with = "rgba")]
    pub scan: Color32,
    #[serde(with = "rgba")]
    pub neutral: Color32,
    #[serde(with = "rgba")]
    pub unknown: Color32,
    #[serde(with = "rgba")]
    pub own: Color32,
    #[serde(with = "rgba")]
    pub allied: Color32,
    #[serde(with = "rgba")]
    pub non_aggression: Color32,
    #[serde(with = "rgba")]
    pub hostile: Color32,
    #[serde(with = "rgba")]
    pub mixed: Color32,
    #[serde(with = "rgba")]
    pub selection: Color32,
    #[serde(with = "rgba")]
    pub filter_glow: Color32,
    #[serde(with = "rgba")]
    pub fleet_fill: Color32,
    #[serde(with = "rgba")]
    pub minimap_background: Color32,
    #[serde(with = "rgba")]
    pub minimap_frame: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(8, 10, 20),
            grid_fine: Color32::from_rgb(24, 28, 44),
            grid_minor: Color32::from_rgb(48, 56, 84),
            grid_major: Color32::from_rgb(96, 110, 150),
            label: Color32::from_rgb(150, 160, 190),
            scan: Color32::from_rgba_unmultiplied(90, 160, 255, 40),
            neutral: Color32::from_rgb(160, 160, 160),
            unknown: Color32::from_rgb(90, 70, 110),
            own: Color32::from_rgb(60, 200, 90),
            allied: Color32::from_rgb(70, 140, 255),
            non_aggression: Color32::from_rgb(240, 200, 60),
            hostile: Color32::from_rgb(230, 60, 50),
            mixed: Color32::from_rgb(200, 90, 220),
            selection: Color32::WHITE,
            filter_glow: Color32::from_rgba_unmultiplied(255, 240, 150, 180),
            fleet_fill: Color32::from_rgb(16, 18, 28),
            minimap_background: Color32::from_rgb(4, 6, 12),
            minimap_frame: Color32::from_rgb(220, 220, 220),
        }
    }
}

mod rgba {
    use egui::Color32;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color32, D::Error> {
        let (r, g, b, a) = <(u8, u8, u8, u8)>::deserialize(deserializer)?;
        Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
