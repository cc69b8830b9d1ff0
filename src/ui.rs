//! UI / rendering helpers.
//!
//! This module owns everything that depends on `egui` for presentation.
//! It reads a [`MapFrame`] or a [`Report`] and produces visual output.
//! No map logic lives here.

use crate::render::{DrawCmd, MapFrame};
use crate::report::{Report, SystemRecord};
use crate::torus::Xy;
use egui::epaint::{CircleShape, PathShape, RectShape};
use egui::{Color32, CornerRadius, FontId, Painter, Pos2, Shape, Stroke, StrokeKind, Vec2};
use rustc_hash::FxHashMap;
use std::f32::consts::FRAC_PI_2;

/// Arc segments per quarter turn of a pie slice.
const ARC_SEGMENTS_PER_QUARTER: usize = 8;

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Convert a display list into egui shapes placed at `origin`.
pub fn frame_shapes(frame: &MapFrame, origin: Pos2) -> Vec<Shape> {
    let offset = origin.to_vec2();
    let mut shapes = Vec::with_capacity(frame.len());
    for cmd in &frame.commands {
        match cmd {
            DrawCmd::Rect { rect, fill } => {
                shapes.push(Shape::Rect(RectShape::filled(
                    rect.translate(offset),
                    CornerRadius::ZERO,
                    *fill,
                )));
            }
            DrawCmd::RectOutline { rect, stroke } => {
                shapes.push(Shape::Rect(RectShape::stroke(
                    rect.translate(offset),
                    CornerRadius::ZERO,
                    *stroke,
                    StrokeKind::Inside,
                )));
            }
            DrawCmd::Line {
                points: [from, to],
                stroke,
            } => {
                shapes.push(Shape::line_segment([*from + offset, *to + offset], *stroke));
            }
            DrawCmd::Disk { center, radius, fill } => {
                shapes.push(Shape::Circle(CircleShape::filled(*center + offset, *radius, *fill)));
            }
            DrawCmd::Ring {
                center,
                radius,
                stroke,
            } => {
                shapes.push(Shape::Circle(CircleShape::stroke(*center + offset, *radius, *stroke)));
            }
            DrawCmd::Wedge {
                center,
                radius,
                start,
                sweep,
                fill,
            } => {
                shapes.extend(wedge_shapes(*center + offset, *radius, *start, *sweep, *fill));
            }
            // Text needs font layout, so it is painted separately.
            DrawCmd::Text { .. } => {}
        }
    }
    shapes
}

/// Paint a display list with its top-left corner at `origin`.
pub fn paint_frame(painter: &Painter, origin: Pos2, frame: &MapFrame) {
    painter.extend(frame_shapes(frame, origin));
    let offset = origin.to_vec2();
    for cmd in &frame.commands {
        if let DrawCmd::Text {
            pos,
            anchor,
            text,
            size,
            color,
        } = cmd
        {
            painter.text(*pos + offset, *anchor, text, FontId::monospace(*size), *color);
        }
    }
}

/// A pie slice as convex polygons no wider than a quarter turn each.
fn wedge_shapes(center: Pos2, radius: f32, start: f32, sweep: f32, fill: Color32) -> Vec<Shape> {
    if !(radius > 0.0 && sweep > 0.0) {
        return Vec::new();
    }
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f32;

    (0..pieces)
        .map(|i| {
            let a0 = start + piece_sweep * i as f32;
            let mut points = Vec::with_capacity(ARC_SEGMENTS_PER_QUARTER + 2);
            points.push(center);
            for s in 0..=ARC_SEGMENTS_PER_QUARTER {
                let a = a0 + piece_sweep * s as f32 / ARC_SEGMENTS_PER_QUARTER as f32;
                points.push(center + Vec2::angled(a) * radius);
            }
            Shape::Path(PathShape::convex_polygon(points, fill, Stroke::NONE))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Hover lookups
// ---------------------------------------------------------------------------

/// Pre-computed spatial index mapping cells to the systems in them.
pub type SpatialIndex<'a> = FxHashMap<Xy, Vec<&'a SystemRecord>>;

/// Build a spatial index from the report for O(1) lookups per cell.
pub fn build_spatial_index(report: &Report) -> SpatialIndex<'_> {
    let mut index = SpatialIndex::default();
    for system in &report.systems {
        index.entry(system.pos()).or_default().push(system);
    }
    index
}

/// One-line description of a cell for the coordinate readout.
pub fn describe_cell(index: &SpatialIndex<'_>, report: &Report, cell: Xy) -> String {
    let names: Vec<&str> = index
        .get(&cell)
        .map(|systems| systems.iter().map(|s| s.name()).collect())
        .unwrap_or_default();
    let fleets = report.fleets.iter().filter(|f| f.pos() == cell).count();

    let mut text = format!("{cell}");
    if !names.is_empty() {
        text.push_str(&format!("  {}", names.join(", ")));
    }
    if fleets > 0 {
        text.push_str(&format!("  ({fleets} fleet{})", if fleets == 1 { "" } else { "s" }));
    }
    text
}

/// Small color swatch followed by a label, for legends.
pub fn swatch(ui: &mut egui::Ui, color: Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 2.0, color);
        ui.label(label);
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};
    use std::f32::consts::TAU;

    #[test]
    fn full_pie_is_split_into_quarters() {
        let shapes = wedge_shapes(pos2(0.0, 0.0), 10.0, 0.0, TAU, Color32::RED);
        assert_eq!(shapes.len(), 4);
        let small = wedge_shapes(pos2(0.0, 0.0), 10.0, 0.0, 0.3, Color32::RED);
        assert_eq!(small.len(), 1);
        assert!(wedge_shapes(pos2(0.0, 0.0), 10.0, 0.0, 0.0, Color32::RED).is_empty());
    }

    #[test]
    fn shapes_are_offset_by_origin() {
        let mut frame = MapFrame::new(vec2(10.0, 10.0));
        frame.push(DrawCmd::Disk {
            center: pos2(5.0, 5.0),
            radius: 2.0,
            fill: Color32::WHITE,
        });
        frame.push(DrawCmd::Text {
            pos: pos2(0.0, 0.0),
            anchor: egui::Align2::LEFT_TOP,
            text: "1".into(),
            size: 10.0,
            color: Color32::WHITE,
        });
        let shapes = frame_shapes(&frame, pos2(100.0, 50.0));
        assert_eq!(shapes.len(), 1, "text is painted separately");
        let Shape::Circle(circle) = &shapes[0] else {
            panic!("expected a circle");
        };
        assert_eq!(circle.center, pos2(105.0, 55.0));
    }

    #[test]
    fn describe_cell_lists_systems_and_fleets() {
        let report = Report::sample();
        let index = build_spatial_index(&report);
        let home = report.home().expect("sample has a home system");
        let text = describe_cell(&index, &report, home);
        assert!(text.contains("Sol"), "{text}");
        assert!(text.contains("1 fleet"), "{text}");
        assert_eq!(describe_cell(&index, &report, Xy::new(33, 3)), "33:3");
    }
}
