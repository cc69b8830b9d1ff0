//! Map rendering.
//!
//! [`redraw`] is a pure function of the report, camera, surface and
//! selection. It lays out grid, scan coverage, systems and fleets as a
//! [`MapFrame`] display list; nothing in here touches egui state.

use crate::camera::{Camera, ScreenCell, Surface, Viewport};
use crate::config::{MapConfig, Palette};
use crate::ownership::OwnershipResolver;
use crate::report::{FleetRecord, OwnerId, PlanetShare, Report, SystemRecord};
use crate::scan::ScanOverlay;
use crate::torus::{Xy, wrap};
use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2, pos2, vec2};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};

mod cache;
mod frame;

pub use cache::FrameCache;
pub use frame::{DrawCmd, MapFrame};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const GRID_MINOR_EVERY: i32 = 5;
const GRID_MAJOR_EVERY: i32 = 20;

/// Disk diameter, as a fraction of a cell, for the smallest and largest stars.
const STAR_MIN_FRACTION: f32 = 0.5;
const STAR_MAX_FRACTION: f32 = 1.0;
const STAR_TYPE_MIN: u8 = 1;
const STAR_TYPE_MAX: u8 = 10;
/// Star type from which the disk fills the whole cell.
const STAR_TYPE_FULL: u8 = 9;

const FLEET_FRACTION: f32 = 1.0 / 3.0;
const ARROW_HEAD_ANGLE: f32 = FRAC_PI_6;
const ARROW_HEAD_LENGTH: f32 = 8.0;
const GLOW_WIDTH: f32 = 2.5;
const GLOW_GAP: f32 = 3.0;
const SELECTION_WIDTH: f32 = 2.0;
/// Twelve o'clock on a y-down canvas.
const PIE_START: f32 = -FRAC_PI_2;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Which owners the host wants highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OwnerFilter {
    #[default]
    Everyone,
    Owners(Vec<OwnerId>),
}

impl OwnerFilter {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Owners(_))
    }

    /// Whether an owner passes the filter. Everyone passes an inactive one.
    pub fn admits(&self, owner: OwnerId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Owners(owners) => owners.contains(&owner),
        }
    }
}

/// Visual-only selection state; never written back into report data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub cell: Option<Xy>,
    pub owner_filter: OwnerFilter,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Everything one map frame depends on.
pub struct MapScene<'a> {
    pub report: &'a Report,
    pub camera: &'a Camera,
    pub surface: Surface,
    pub selection: &'a Selection,
    pub config: &'a MapConfig,
}

/// Lay out one frame of the main map.
pub fn redraw(scene: &MapScene<'_>) -> MapFrame {
    let palette = &scene.config.palette;
    let mut frame = MapFrame::new(scene.surface.size);
    frame.push(DrawCmd::Rect {
        rect: Rect::from_min_size(Pos2::ZERO, scene.surface.size),
        fill: palette.background,
    });

    let viewport = scene.camera.viewport(scene.surface.size);
    if viewport.is_empty() {
        return frame;
    }

    let resolver = OwnershipResolver::new(&scene.report.player, palette);

    draw_grid(&mut frame, &viewport, &scene.surface, palette);
    draw_labels(&mut frame, &viewport, scene.config);
    draw_scan(&mut frame, &ScanOverlay::from_report(&viewport, scene.report), &viewport, palette);
    for system in &scene.report.systems {
        draw_system(&mut frame, system, &viewport, &resolver, scene.selection, palette);
    }
    for fleet in &scene.report.fleets {
        draw_fleet(&mut frame, fleet, &viewport, &resolver, scene.selection, palette);
    }
    draw_selection(&mut frame, scene.selection, &viewport, palette);

    frame
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum GridTier {
    Fine,
    Minor,
    Major,
}

/// Emphasis of the line drawn just before world coordinate `coord`.
fn grid_tier(coord: i32) -> GridTier {
    let boundary = wrap(coord - 1);
    if boundary % GRID_MAJOR_EVERY == 0 {
        GridTier::Major
    } else if boundary % GRID_MINOR_EVERY == 0 {
        GridTier::Minor
    } else {
        GridTier::Fine
    }
}

fn draw_grid(frame: &mut MapFrame, viewport: &Viewport, surface: &Surface, palette: &Palette) {
    let extent = viewport.extent();
    let mut lines: Vec<(GridTier, [Pos2; 2])> = Vec::new();

    for col in 0..=viewport.cols {
        let coord = viewport.world_at(ScreenCell { col, row: 0 }).y;
        let x = surface.snap(col as f32 * viewport.cell_size);
        lines.push((grid_tier(coord), [pos2(x, 0.0), pos2(x, extent.y)]));
    }
    for row in 0..=viewport.rows {
        let coord = viewport.world_at(ScreenCell { col: 0, row }).x;
        let y = surface.snap(row as f32 * viewport.cell_size);
        lines.push((grid_tier(coord), [pos2(0.0, y), pos2(extent.x, y)]));
    }

    // Stronger tiers last so they are never painted over.
    lines.sort_by_key(|(tier, _)| *tier);
    for (tier, points) in lines {
        let color = match tier {
            GridTier::Fine => palette.grid_fine,
            GridTier::Minor => palette.grid_minor,
            GridTier::Major => palette.grid_major,
        };
        frame.push(DrawCmd::Line {
            points,
            stroke: Stroke::new(1.0, color),
        });
    }
}

fn draw_labels(frame: &mut MapFrame, viewport: &Viewport, config: &MapConfig) {
    let size = (viewport.cell_size * 0.35).clamp(8.0, 14.0);
    let sparse = viewport.cell_size < config.label_min_cell_size;
    let wanted = |coord: i32| !sparse || coord % GRID_MINOR_EVERY == 0;

    for col in 0..viewport.cols {
        let cell = ScreenCell { col, row: 0 };
        let coord = viewport.world_at(cell).y;
        if wanted(coord) {
            frame.push(DrawCmd::Text {
                pos: viewport.cell_rect(cell).center_top() + vec2(0.0, 1.0),
                anchor: Align2::CENTER_TOP,
                text: coord.to_string(),
                size,
                color: config.palette.label,
            });
        }
    }
    for row in 0..viewport.rows {
        let cell = ScreenCell { col: 0, row };
        let coord = viewport.world_at(cell).x;
        if wanted(coord) {
            frame.push(DrawCmd::Text {
                pos: viewport.cell_rect(cell).left_center() + vec2(2.0, 0.0),
                anchor: Align2::LEFT_CENTER,
                text: coord.to_string(),
                size,
                color: config.palette.label,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Scan overlay
// ---------------------------------------------------------------------------

fn draw_scan(frame: &mut MapFrame, overlay: &ScanOverlay, viewport: &Viewport, palette: &Palette) {
    for cell in overlay.sorted_cells() {
        frame.push(DrawCmd::Rect {
            rect: viewport.cell_rect(cell),
            fill: palette.scan,
        });
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Disk diameter as a fraction of a cell: 50% for type 1 up to 100% from
/// type 9, out-of-range types clamped.
pub fn star_diameter_fraction(star_type: u8) -> f32 {
    let t = star_type.clamp(STAR_TYPE_MIN, STAR_TYPE_MAX);
    let span = f32::from(STAR_TYPE_FULL - STAR_TYPE_MIN);
    let progress = f32::from(t - STAR_TYPE_MIN) / span;
    (STAR_MIN_FRACTION + (STAR_MAX_FRACTION - STAR_MIN_FRACTION) * progress).min(STAR_MAX_FRACTION)
}

/// Sweep angle per owner for a contested system.
///
/// Slices are weighted by planet counts; with no counts, or counts that add
/// up to nothing, every owner gets an equal share.
pub fn pie_slices(owners: &[OwnerId], counts: Option<&[PlanetShare]>) -> Vec<(OwnerId, f32)> {
    if owners.is_empty() {
        return Vec::new();
    }
    let weight_of = |owner: OwnerId| -> u64 {
        counts
            .unwrap_or_default()
            .iter()
            .filter(|share| share.owner == owner)
            .map(|share| u64::from(share.planets))
            .sum()
    };
    let weights: Vec<u64> = owners.iter().map(|o| weight_of(*o)).collect();
    let total: u64 = weights.iter().sum();

    if total == 0 {
        let sweep = TAU / owners.len() as f32;
        return owners.iter().map(|o| (*o, sweep)).collect();
    }
    owners
        .iter()
        .zip(weights)
        .filter(|(_, w)| *w > 0)
        .map(|(o, w)| (*o, TAU * w as f32 / total as f32))
        .collect()
}

fn draw_system(
    frame: &mut MapFrame,
    system: &SystemRecord,
    viewport: &Viewport,
    resolver: &OwnershipResolver<'_>,
    selection: &Selection,
    palette: &Palette,
) {
    let Some(cell) = viewport.project(system.pos()) else {
        return;
    };
    let center = viewport.cell_center(cell);
    let radius = viewport.cell_size * star_diameter_fraction(system.star_type()) / 2.0;
    let owners = system.distinct_owners();

    if owners.len() >= 2 {
        let mut start = PIE_START;
        for (owner, sweep) in pie_slices(&owners, system.planet_owner_counts()) {
            frame.push(DrawCmd::Wedge {
                center,
                radius,
                start,
                sweep,
                fill: resolver.owner_color(owner),
            });
            start += sweep;
        }
    } else {
        frame.push(DrawCmd::Disk {
            center,
            radius,
            fill: resolver.resolve(system.owners()),
        });
    }

    let filter = &selection.owner_filter;
    if filter.is_active() && owners.iter().any(|o| filter.admits(*o)) {
        frame.push(DrawCmd::Ring {
            center,
            radius: radius + GLOW_GAP,
            stroke: Stroke::new(GLOW_WIDTH, palette.filter_glow),
        });
    }
}

// ---------------------------------------------------------------------------
// Fleets
// ---------------------------------------------------------------------------

/// Luminance-preserving gray of the same opacity.
pub fn grayscale(color: Color32) -> Color32 {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    let l = luma.round().clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(l, l, l, a)
}

fn draw_fleet(
    frame: &mut MapFrame,
    fleet: &FleetRecord,
    viewport: &Viewport,
    resolver: &OwnershipResolver<'_>,
    selection: &Selection,
    palette: &Palette,
) {
    let Some(cell) = viewport.project(fleet.pos()) else {
        return;
    };
    let center = viewport.cell_center(cell);
    let mut color = resolver.owner_color(fleet.owner());
    if !selection.owner_filter.admits(fleet.owner()) {
        color = grayscale(color);
    }

    let icon = Rect::from_center_size(center, Vec2::splat(viewport.cell_size * FLEET_FRACTION));
    frame.push(DrawCmd::Rect {
        rect: icon,
        fill: palette.fleet_fill,
    });
    frame.push(DrawCmd::RectOutline {
        rect: icon,
        stroke: Stroke::new(1.5, color),
    });

    let target = fleet
        .direction()
        .and_then(|dest| viewport.project(dest))
        .filter(|dest| *dest != cell);
    if let Some(dest) = target {
        draw_arrow(frame, center, viewport.cell_center(dest), Stroke::new(1.5, color));
    }
}

fn draw_arrow(frame: &mut MapFrame, from: Pos2, to: Pos2, stroke: Stroke) {
    frame.push(DrawCmd::Line {
        points: [from, to],
        stroke,
    });
    let back = (from - to).angle();
    for side in [-1.0, 1.0] {
        let angle = back + side * ARROW_HEAD_ANGLE;
        frame.push(DrawCmd::Line {
            points: [to, to + Vec2::angled(angle) * ARROW_HEAD_LENGTH],
            stroke,
        });
    }
}

fn draw_selection(frame: &mut MapFrame, selection: &Selection, viewport: &Viewport, palette: &Palette) {
    if let Some(cell) = selection.cell.and_then(|xy| viewport.project(xy)) {
        frame.push(DrawCmd::RectOutline {
            rect: viewport.cell_rect(cell).shrink(1.0),
            stroke: Stroke::new(SELECTION_WIDTH, palette.selection),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DetectedFleet, DetectedSystem, PlayerFleet, PlayerInfo, PlayerSystem};

    const ME: OwnerId = OwnerId(7);
    const FOE: OwnerId = OwnerId(9);

    fn empty_report() -> Report {
        Report {
            player: PlayerInfo {
                numero: ME,
                alliances: Vec::new(),
                pna: Vec::new(),
            },
            systems: Vec::new(),
            fleets: Vec::new(),
        }
    }

    fn render(report: &Report, selection: &Selection) -> MapFrame {
        let config = MapConfig::default();
        let camera = Camera::new(Xy::new(20, 20), 32.0);
        redraw(&MapScene {
            report,
            camera: &camera,
            surface: Surface::new(vec2(640.0, 640.0), 1.0),
            selection,
            config: &config,
        })
    }

    fn count(frame: &MapFrame, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        frame.commands.iter().filter(|c| pred(c)).count()
    }

    fn wedges(frame: &MapFrame) -> Vec<(f32, f32)> {
        frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Wedge { start, sweep, .. } => Some((*start, *sweep)),
                _ => None,
            })
            .collect()
    }

    fn system(pos: Xy, owners: Vec<OwnerId>, counts: Option<Vec<PlanetShare>>) -> SystemRecord {
        SystemRecord::Player(PlayerSystem {
            name: "Test".into(),
            pos,
            star_type: 5,
            owners,
            scan_radius: 0,
            planet_owner_counts: counts,
        })
    }

    // -- star size -----------------------------------------------------------

    #[test]
    fn star_diameter_interpolates_and_clamps() {
        assert_eq!(star_diameter_fraction(1), 0.5);
        assert_eq!(star_diameter_fraction(0), 0.5);
        assert_eq!(star_diameter_fraction(5), 0.75);
        assert_eq!(star_diameter_fraction(9), 1.0);
        assert_eq!(star_diameter_fraction(10), 1.0);
        assert_eq!(star_diameter_fraction(200), 1.0);
    }

    // -- pie slices ----------------------------------------------------------

    #[test]
    fn pie_slices_follow_planet_counts() {
        let counts = [
            PlanetShare { owner: ME, planets: 3 },
            PlanetShare { owner: FOE, planets: 1 },
        ];
        let slices = pie_slices(&[ME, FOE], Some(&counts));
        assert_eq!(slices.len(), 2);
        assert!((slices[0].1 - TAU * 0.75).abs() < 1e-5);
        assert!((slices[1].1 - TAU * 0.25).abs() < 1e-5);
    }

    #[test]
    fn pie_slices_split_evenly_without_counts() {
        let slices = pie_slices(&[ME, FOE, OwnerId(3)], None);
        assert!(slices.iter().all(|(_, s)| (s - TAU / 3.0).abs() < 1e-5));
        let zeroed = [PlanetShare { owner: ME, planets: 0 }];
        let slices = pie_slices(&[ME, FOE], Some(&zeroed));
        assert!(slices.iter().all(|(_, s)| (s - TAU / 2.0).abs() < 1e-5));
    }

    // -- frame layout --------------------------------------------------------

    #[test]
    fn empty_surface_only_clears() {
        let report = Report::sample();
        let config = MapConfig::default();
        let camera = Camera::new(Xy::new(20, 20), 32.0);
        let frame = redraw(&MapScene {
            report: &report,
            camera: &camera,
            surface: Surface::new(Vec2::ZERO, 2.0),
            selection: &Selection::default(),
            config: &config,
        });
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn grid_has_three_tiers() {
        let frame = render(&empty_report(), &Selection::default());
        let palette = Palette::default();
        let lines_of = |color: Color32| {
            count(&frame, |c| matches!(c, DrawCmd::Line { stroke, .. } if stroke.color == color))
        };
        // Columns and rows span world 10..=30 at the edges: boundary 20 is
        // major, 10/15/25 minor.
        assert_eq!(lines_of(palette.grid_major), 2);
        assert_eq!(lines_of(palette.grid_minor), 6);
        assert_eq!(lines_of(palette.grid_fine), 2 * 21 - 8);
    }

    #[test]
    fn grid_tier_boundaries() {
        assert_eq!(grid_tier(21), GridTier::Major);
        assert_eq!(grid_tier(1), GridTier::Major);
        assert_eq!(grid_tier(6), GridTier::Minor);
        assert_eq!(grid_tier(7), GridTier::Fine);
    }

    #[test]
    fn overlapping_scans_draw_each_cell_once() {
        let mut report = empty_report();
        for y in [20, 21] {
            report.systems.push(SystemRecord::Player(PlayerSystem {
                name: "Scanner".into(),
                pos: Xy::new(20, y),
                star_type: 1,
                owners: vec![ME],
                scan_radius: 1,
                planet_owner_counts: None,
            }));
        }
        let frame = render(&report, &Selection::default());
        let scan = Palette::default().scan;
        let drawn = count(&frame, |c| matches!(c, DrawCmd::Rect { fill, .. } if *fill == scan));
        assert_eq!(drawn, 12, "3x4 union, not 9 + 9");
    }

    #[test]
    fn single_owner_system_is_a_disk_in_the_center() {
        let mut report = empty_report();
        report.systems.push(system(Xy::new(20, 20), vec![ME], None));
        let frame = render(&report, &Selection::default());
        let own = Palette::default().own;
        let disk = frame.commands.iter().find_map(|c| match c {
            DrawCmd::Disk { center, radius, fill } if *fill == own => Some((*center, *radius)),
            _ => None,
        });
        assert_eq!(disk, Some((pos2(336.0, 336.0), 12.0)));
        assert!(wedges(&frame).is_empty());
    }

    #[test]
    fn contested_system_is_a_pie_from_twelve_oclock() {
        let mut report = empty_report();
        report.systems.push(system(
            Xy::new(20, 20),
            vec![ME, FOE],
            Some(vec![
                PlanetShare { owner: ME, planets: 1 },
                PlanetShare { owner: FOE, planets: 3 },
            ]),
        ));
        let frame = render(&report, &Selection::default());
        let slices = wedges(&frame);
        assert_eq!(slices.len(), 2);
        assert!((slices[0].0 - PIE_START).abs() < 1e-6);
        assert!((slices[0].1 - TAU / 4.0).abs() < 1e-5);
        assert!((slices[1].0 - (PIE_START + TAU / 4.0)).abs() < 1e-5);
    }

    #[test]
    fn ownerless_system_uses_unknown_color() {
        let mut report = empty_report();
        report.systems.push(SystemRecord::Detected(DetectedSystem {
            name: "Ghost".into(),
            pos: Xy::new(20, 20),
            star_type: 3,
            owners: Vec::new(),
        }));
        let frame = render(&report, &Selection::default());
        let unknown = Palette::default().unknown;
        assert_eq!(count(&frame, |c| matches!(c, DrawCmd::Disk { fill, .. } if *fill == unknown)), 1);
    }

    #[test]
    fn filter_glows_matching_systems_only() {
        let mut report = empty_report();
        report.systems.push(system(Xy::new(20, 20), vec![ME], None));
        report.systems.push(system(Xy::new(21, 21), vec![FOE], None));
        let selection = Selection {
            cell: None,
            owner_filter: OwnerFilter::Owners(vec![ME]),
        };
        let frame = render(&report, &selection);
        assert_eq!(count(&frame, |c| matches!(c, DrawCmd::Ring { .. })), 1);
        let unfiltered = render(&report, &Selection::default());
        assert_eq!(count(&unfiltered, |c| matches!(c, DrawCmd::Ring { .. })), 0);
    }

    #[test]
    fn filtered_out_fleets_are_gray() {
        let mut report = empty_report();
        report.fleets.push(FleetRecord::Detected(DetectedFleet {
            pos: Xy::new(20, 20),
            owner: FOE,
        }));
        let selection = Selection {
            cell: None,
            owner_filter: OwnerFilter::Owners(vec![ME]),
        };
        let frame = render(&report, &selection);
        let gray = grayscale(Palette::default().hostile);
        let outline = frame.commands.iter().find_map(|c| match c {
            DrawCmd::RectOutline { rect, stroke } => Some((*rect, stroke.color)),
            _ => None,
        });
        let (rect, color) = outline.expect("fleet outline drawn");
        assert_eq!(color, gray);
        assert!((rect.width() - 32.0 / 3.0).abs() < 1e-4);
        assert!((rect.center() - pos2(336.0, 336.0)).length() < 1e-4);
    }

    #[test]
    fn heading_arrow_needs_visible_target() {
        let fleet = |direction| {
            FleetRecord::Player(PlayerFleet {
                name: "F".into(),
                pos: Xy::new(20, 20),
                owner: ME,
                scan_radius: 0,
                direction,
            })
        };
        let lines = |frame: &MapFrame| {
            let own = Palette::default().own;
            count(frame, |c| matches!(c, DrawCmd::Line { stroke, .. } if stroke.color == own))
        };

        let mut report = empty_report();
        report.fleets.push(fleet(Some(Xy::new(22, 23))));
        assert_eq!(lines(&render(&report, &Selection::default())), 3, "shaft and two barbs");

        report.fleets = vec![fleet(Some(Xy::new(20, 35)))];
        assert_eq!(lines(&render(&report, &Selection::default())), 0, "target culled");

        report.fleets = vec![fleet(Some(Xy::new(20, 20)))];
        assert_eq!(lines(&render(&report, &Selection::default())), 0, "no zero-length arrow");
    }

    #[test]
    fn arrow_head_points_back_along_shaft() {
        let mut frame = MapFrame::default();
        draw_arrow(&mut frame, pos2(0.0, 0.0), pos2(100.0, 0.0), Stroke::new(1.0, Color32::RED));
        for cmd in &frame.commands[1..] {
            let DrawCmd::Line { points, .. } = cmd else {
                panic!("expected barb line, got {cmd:?}");
            };
            assert_eq!(points[0], pos2(100.0, 0.0));
            assert!(points[1].x < 100.0, "barb trails the tip");
        }
    }

    #[test]
    fn selection_halo_drawn_when_visible() {
        let report = empty_report();
        let selection = Selection {
            cell: Some(Xy::new(20, 20)),
            owner_filter: OwnerFilter::Everyone,
        };
        let frame = render(&report, &selection);
        let white = Palette::default().selection;
        assert_eq!(
            count(&frame, |c| matches!(c, DrawCmd::RectOutline { stroke, .. } if stroke.color == white)),
            1
        );
    }

    #[test]
    fn grayscale_keeps_alpha_and_drops_hue() {
        let gray = grayscale(Color32::from_rgb(255, 0, 0));
        let [r, g, b, a] = gray.to_srgba_unmultiplied();
        assert_eq!((r, a), (76, 255));
        assert!(r == g && g == b);
    }
}
