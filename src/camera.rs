//! Camera and viewport projection.
//!
//! The [`Camera`] is the single source of truth for where the map looks. A
//! [`Viewport`] is derived from it every frame for a given surface size and
//! converts between world cells and canvas-local points.

use crate::torus::{AXIS_SIZE, Xy, delta, wrap};
use egui::{Pos2, Rect, Vec2, pos2, vec2};

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Center cell and zoom of the main map.
///
/// Only [`crate::input::apply`] mutates a camera; everything else reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    center: Xy,
    cell_size: f32,
}

impl Camera {
    pub fn new(center: Xy, cell_size: f32) -> Self {
        Self {
            center: Xy::new(center.x, center.y),
            cell_size,
        }
    }

    pub fn center(&self) -> Xy {
        self.center
    }

    /// Side of one cell, in points.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub(crate) fn set_center(&mut self, center: Xy) {
        self.center = Xy::new(center.x, center.y);
    }

    pub(crate) fn set_cell_size(&mut self, cell_size: f32) {
        self.cell_size = cell_size;
    }

    /// Derive the visible extent for a surface of `size` points.
    pub fn viewport(&self, size: Vec2) -> Viewport {
        let usable = self.cell_size.is_finite() && self.cell_size > 0.0;
        let count = |extent: f32| -> i32 {
            if usable && extent.is_finite() && extent > 0.0 {
                (extent / self.cell_size).floor() as i32
            } else {
                0
            }
        };
        // The galaxy is only AXIS_SIZE cells across; more would repeat it.
        let cols = count(size.x).min(AXIS_SIZE);
        let rows = count(size.y).min(AXIS_SIZE);
        let half_cols = cols / 2;
        let half_rows = rows / 2;

        Viewport {
            center: self.center,
            cell_size: self.cell_size,
            cols,
            rows,
            half_cols,
            half_rows,
            top_row: wrap(self.center.x - half_rows),
            left_col: wrap(self.center.y - half_cols),
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Column/row index of a cell on screen, `(0, 0)` being top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenCell {
    pub col: i32,
    pub row: i32,
}

/// Visible extent of the map for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Xy,
    pub cell_size: f32,
    pub cols: i32,
    pub rows: i32,
    pub half_cols: i32,
    pub half_rows: i32,
    /// World row shown on screen row 0.
    pub top_row: i32,
    /// World column shown on screen column 0.
    pub left_col: i32,
}

impl Viewport {
    pub fn is_empty(&self) -> bool {
        self.cols <= 0 || self.rows <= 0
    }

    /// Size of the drawn grid in points.
    pub fn extent(&self) -> Vec2 {
        vec2(
            self.cols as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    /// Screen cell showing `pos`, or `None` when it is culled.
    pub fn project(&self, pos: Xy) -> Option<ScreenCell> {
        if self.is_empty() {
            return None;
        }
        let col = wrap(pos.y - self.left_col + AXIS_SIZE) % AXIS_SIZE;
        let row = wrap(pos.x - self.top_row + AXIS_SIZE) % AXIS_SIZE;
        (col < self.cols && row < self.rows).then_some(ScreenCell { col, row })
    }

    /// World cell displayed at a screen cell.
    pub fn world_at(&self, cell: ScreenCell) -> Xy {
        Xy {
            x: delta(self.center.x, cell.row - self.half_rows, AXIS_SIZE),
            y: delta(self.center.y, cell.col - self.half_cols, AXIS_SIZE),
        }
    }

    /// Screen cell under a canvas-local point.
    pub fn cell_at(&self, point: Pos2) -> Option<ScreenCell> {
        if self.is_empty() || point.x.is_nan() || point.y.is_nan() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let col = (point.x / self.cell_size).floor() as i32;
        let row = (point.y / self.cell_size).floor() as i32;
        (col < self.cols && row < self.rows).then_some(ScreenCell { col, row })
    }

    /// World cell under a canvas-local point.
    pub fn screen_to_world(&self, point: Pos2) -> Option<Xy> {
        self.cell_at(point).map(|cell| self.world_at(cell))
    }

    pub fn cell_rect(&self, cell: ScreenCell) -> Rect {
        Rect::from_min_size(
            pos2(
                cell.col as f32 * self.cell_size,
                cell.row as f32 * self.cell_size,
            ),
            Vec2::splat(self.cell_size),
        )
    }

    pub fn cell_center(&self, cell: ScreenCell) -> Pos2 {
        self.cell_rect(cell).center()
    }
}

// ---------------------------------------------------------------------------
// Drawing surface
// ---------------------------------------------------------------------------

/// Logical size of the canvas plus the device scale it is shown at.
///
/// Drawing always happens in logical points; the backend multiplies by
/// `pixels_per_point` once per frame, so scales never compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub size: Vec2,
    pub pixels_per_point: f32,
}

impl Surface {
    pub fn new(size: Vec2, pixels_per_point: f32) -> Self {
        let pixels_per_point = if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            pixels_per_point
        } else {
            1.0
        };
        Self {
            size: size.max(Vec2::ZERO),
            pixels_per_point,
        }
    }

    /// Resolution of the backing store in physical pixels.
    pub fn backing_size(&self) -> [u32; 2] {
        [
            (self.size.x * self.pixels_per_point).round() as u32,
            (self.size.y * self.pixels_per_point).round() as u32,
        ]
    }

    /// Round a logical coordinate to the nearest physical pixel.
    pub fn snap(&self, v: f32) -> f32 {
        (v * self.pixels_per_point).round() / self.pixels_per_point
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
