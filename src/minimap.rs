//! Camera-centered overview of the whole galaxy.
//!
//! Every system and fleet is a single dot placed by its shortest torus
//! offset from the camera center, so the overview always has the camera in
//! its middle. A rectangle shows what the main map currently covers.

use crate::camera::{Camera, Viewport};
use crate::config::Palette;
use crate::ownership::OwnershipResolver;
use crate::render::{DrawCmd, MapFrame};
use crate::report::Report;
use crate::torus::{AXIS_SIZE, Xy, signed_delta};
use egui::{Pos2, Rect, Stroke, Vec2, vec2};

const DOT_SIZE: f32 = 1.0;
const FRAME_WIDTH: f32 = 1.0;

/// Offset of `to` from `from` in `[-AXIS_SIZE / 2, AXIS_SIZE / 2)`.
fn slot(from: i32, to: i32) -> i32 {
    let d = signed_delta(from, to);
    if d == AXIS_SIZE / 2 { -d } else { d }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjector {
    size: f32,
}

impl MinimapProjector {
    pub fn new(size: f32) -> Self {
        Self {
            size: if size.is_finite() { size.max(0.0) } else { 0.0 },
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::splat(self.size)
    }

    /// Points per world cell.
    pub fn scale(&self) -> f32 {
        self.size / AXIS_SIZE as f32
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size())
    }

    pub fn mid(&self) -> Pos2 {
        self.bounds().center()
    }

    /// Top-left of the slot `pos` occupies when the camera looks at `center`.
    pub fn project(&self, center: Xy, pos: Xy) -> Pos2 {
        let offset = vec2(slot(center.y, pos.y) as f32, slot(center.x, pos.x) as f32);
        self.mid() + offset * self.scale()
    }

    /// Outline of the main map's extent, clipped to the overview.
    pub fn viewport_rect(&self, viewport: &Viewport) -> Rect {
        let scale = self.scale();
        let min = self.mid() - vec2(viewport.half_cols as f32, viewport.half_rows as f32) * scale;
        let size = vec2(viewport.cols as f32, viewport.rows as f32) * scale;
        Rect::from_min_size(min, size).intersect(self.bounds())
    }

    /// Cells between the overview's middle and a point on it, as `(d_row, d_col)`.
    pub fn click_offset(&self, point: Pos2) -> (i32, i32) {
        let scale = self.scale();
        if scale <= 0.0 {
            return (0, 0);
        }
        let d = (point - self.mid()) / scale;
        (d.y.floor() as i32, d.x.floor() as i32)
    }

    /// Where the camera should move after a click at `point`.
    pub fn recenter_target(&self, center: Xy, point: Pos2) -> Xy {
        let (d_row, d_col) = self.click_offset(point);
        center.offset(d_row, d_col)
    }

    /// Lay out the overview for the current camera.
    pub fn redraw(&self, report: &Report, camera: &Camera, viewport: &Viewport, palette: &Palette) -> MapFrame {
        let mut frame = MapFrame::new(self.size());
        frame.push(DrawCmd::Rect {
            rect: self.bounds(),
            fill: palette.minimap_background,
        });
        if self.size <= 0.0 {
            return frame;
        }

        let resolver = OwnershipResolver::new(&report.player, palette);
        let center = camera.center();
        let dot = |pos: Xy| Rect::from_min_size(self.project(center, pos), Vec2::splat(DOT_SIZE));

        for system in &report.systems {
            frame.push(DrawCmd::Rect {
                rect: dot(system.pos()),
                fill: resolver.resolve(system.owners()),
            });
        }
        for fleet in &report.fleets {
            frame.push(DrawCmd::Rect {
                rect: dot(fleet.pos()),
                fill: resolver.owner_color(fleet.owner()),
            });
        }

        if !viewport.is_empty() {
            frame.push(DrawCmd::RectOutline {
                rect: self.viewport_rect(viewport),
                stroke: Stroke::new(FRAME_WIDTH, palette.minimap_frame),
            });
        }
        frame
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn minimap() -> MinimapProjector {
        MinimapProjector::new(160.0)
    }

    #[test]
    fn camera_center_sits_in_the_middle() {
        let m = minimap();
        assert_eq!(m.scale(), 4.0);
        for center in [Xy::new(1, 1), Xy::new(20, 20), Xy::new(40, 7)] {
            assert_eq!(m.project(center, center), pos2(80.0, 80.0));
        }
    }

    #[test]
    fn projection_uses_torus_offsets() {
        let m = minimap();
        let center = Xy::new(2, 39);
        // Two rows up across the seam, three columns right across the seam.
        assert_eq!(m.project(center, Xy::new(40, 2)), pos2(80.0 + 12.0, 80.0 - 8.0));
    }

    #[test]
    fn every_cell_lands_inside_the_overview() {
        let m = minimap();
        let center = Xy::new(13, 29);
        for x in 1..=AXIS_SIZE {
            for y in 1..=AXIS_SIZE {
                let p = m.project(center, Xy::new(x, y));
                assert!(m.bounds().contains(p), "{x}:{y} -> {p:?}");
            }
        }
    }

    #[test]
    fn viewport_rect_matches_main_map_extent() {
        let m = minimap();
        let vp = Camera::new(Xy::new(20, 20), 32.0).viewport(vec2(640.0, 320.0));
        let rect = m.viewport_rect(&vp);
        assert_eq!(rect.min, pos2(80.0 - 40.0, 80.0 - 20.0));
        assert_eq!(rect.size(), vec2(80.0, 40.0));
    }

    #[test]
    fn viewport_rect_is_clamped_to_bounds() {
        let m = minimap();
        let vp = Camera::new(Xy::new(20, 20), 8.0).viewport(vec2(800.0, 800.0));
        assert_eq!(m.viewport_rect(&vp), m.bounds());
    }

    #[test]
    fn click_recenters_by_scaled_offset() {
        let m = minimap();
        let center = Xy::new(20, 20);
        assert_eq!(m.recenter_target(center, pos2(80.0, 80.0)), center);
        assert_eq!(m.recenter_target(center, pos2(80.0 + 12.5, 80.0 - 4.0)), Xy::new(19, 23));
        // Near the edge the target wraps.
        assert_eq!(m.recenter_target(Xy::new(38, 2), pos2(2.0, 159.0)), Xy::new(17, 22));
    }

    #[test]
    fn click_on_dot_recenters_on_its_cell() {
        let m = minimap();
        let center = Xy::new(5, 33);
        let target = Xy::new(31, 12);
        let p = m.project(center, target) + vec2(0.5, 0.5);
        assert_eq!(m.recenter_target(center, p), target);
    }

    #[test]
    fn redraw_has_one_dot_per_entity_and_a_frame() {
        let m = minimap();
        let report = Report::sample();
        let camera = Camera::new(Xy::new(20, 20), 32.0);
        let vp = camera.viewport(vec2(640.0, 640.0));
        let frame = m.redraw(&report, &camera, &vp, &Palette::default());
        let dots = frame
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { rect, .. } if rect.width() == DOT_SIZE))
            .count();
        assert_eq!(dots, report.systems.len() + report.fleets.len());
        assert_eq!(
            frame.commands.iter().filter(|c| matches!(c, DrawCmd::RectOutline { .. })).count(),
            1
        );
    }
}
