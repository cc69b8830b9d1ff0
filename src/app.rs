//! Application shell: wires report, camera, input and painting together.

use crate::camera::{Camera, Surface};
use crate::config::MapConfig;
use crate::input::{ArrowKey, InteractionController, MapEvent};
use crate::minimap::MinimapProjector;
use crate::render::{FrameCache, MapScene, OwnerFilter, Selection};
use crate::report::{OwnerId, PlayerInfo, Report};
use crate::torus::{Xy, format_position};
use crate::ui;

use egui::{PointerButton, Pos2, RichText, Sense, Vec2};
use std::path::PathBuf;

/// Scroll distance, in points, that counts as one wheel notch.
const WHEEL_NOTCH_POINTS: f32 = 50.0;
const SIDE_PANEL_MARGIN: f32 = 16.0;

/// Text describing the hovered and selected cells for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Readout {
    hover: Option<String>,
    selection: Option<String>,
}

/// Callback handed a world cell.
pub type CellHook = Box<dyn FnMut(Xy)>;

/// Which owners the side panel highlights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum FilterChoice {
    #[default]
    Everyone,
    Own,
    Allies,
    NonAggression,
}

impl FilterChoice {
    const ALL: [Self; 4] = [Self::Everyone, Self::Own, Self::Allies, Self::NonAggression];

    fn label(self) -> &'static str {
        match self {
            Self::Everyone => "Everyone",
            Self::Own => "Mine",
            Self::Allies => "Allies",
            Self::NonAggression => "Non-aggression",
        }
    }

    fn owner_filter(self, player: &PlayerInfo) -> OwnerFilter {
        match self {
            Self::Everyone => OwnerFilter::Everyone,
            Self::Own => OwnerFilter::Owners(vec![player.numero]),
            Self::Allies => {
                let mut owners: Vec<OwnerId> = player
                    .alliances
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|o| *o != player.numero)
                    .collect();
                owners.sort_unstable();
                owners.dedup();
                OwnerFilter::Owners(owners)
            }
            Self::NonAggression => OwnerFilter::Owners(player.pna.clone()),
        }
    }
}

pub struct StarmapApp {
    report: Report,
    /// Bumped whenever `report` is replaced.
    generation: u64,
    report_path: Option<PathBuf>,
    config: MapConfig,

    camera: Camera,
    controller: InteractionController,
    selection: Selection,
    filter: FilterChoice,
    minimap: MinimapProjector,
    cache: FrameCache,

    /// Map canvas from the last frame, used by the overview.
    map_surface: Surface,
    hover: Option<Xy>,
    status: Option<String>,

    on_select_cell: Option<CellHook>,
    on_center_change: Option<CellHook>,
}

impl StarmapApp {
    /// Called once before the first frame.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        report: Report,
        config: MapConfig,
        center: Option<Xy>,
    ) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = config.palette.background;
        cc.egui_ctx.set_visuals(visuals);

        Self::with_report(report, config, center)
    }

    /// Build the app state without an egui context.
    ///
    /// The camera starts on `center`, else on the player's first system,
    /// else on the middle of the galaxy.
    pub fn with_report(report: Report, config: MapConfig, center: Option<Xy>) -> Self {
        let center = center.or_else(|| report.home()).unwrap_or_default();
        log::info!("starting at {}", format_position(center));
        Self {
            generation: 0,
            report_path: None,
            camera: Camera::new(center, config.cell_size.initial),
            controller: InteractionController::new(&config),
            selection: Selection::default(),
            filter: FilterChoice::default(),
            minimap: MinimapProjector::new(config.minimap_size),
            cache: FrameCache::default(),
            map_surface: Surface::new(Vec2::ZERO, 1.0),
            hover: None,
            status: None,
            on_select_cell: None,
            on_center_change: None,
            report,
            config,
        }
    }

    /// Remember where the report came from so it can be reloaded.
    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    pub fn on_select_cell(mut self, hook: impl FnMut(Xy) + 'static) -> Self {
        self.on_select_cell = Some(Box::new(hook));
        self
    }

    pub fn on_center_change(mut self, hook: impl FnMut(Xy) + 'static) -> Self {
        self.on_center_change = Some(Box::new(hook));
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Swap in new report data; the next frame is redrawn from it.
    pub fn set_report(&mut self, report: Report) {
        self.report = report;
        self.generation += 1;
        self.selection.owner_filter = self.filter.owner_filter(&self.report.player);
    }

    /// Describe the hovered and selected cells from one spatial index.
    fn readout(&self) -> Readout {
        if self.hover.is_none() && self.selection.cell.is_none() {
            return Readout::default();
        }
        let index = ui::build_spatial_index(&self.report);
        let describe = |cell: Xy| ui::describe_cell(&index, &self.report, cell);
        Readout {
            hover: self.hover.map(&describe),
            selection: self.selection.cell.map(&describe),
        }
    }

    fn set_filter(&mut self, filter: FilterChoice) {
        self.filter = filter;
        self.selection.owner_filter = filter.owner_filter(&self.report.player);
    }

    fn reload_report(&mut self) {
        let Some(path) = self.report_path.clone() else {
            return;
        };
        match Report::load(&path) {
            Ok(report) => {
                self.set_report(report);
                self.status = None;
            }
            Err(e) => {
                log::warn!("{e}");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Route map events to selection state and the host hooks.
    fn handle_events(&mut self, events: Vec<MapEvent>) {
        for event in events {
            match event {
                MapEvent::SelectCell(xy) => {
                    self.selection.cell = Some(xy);
                    if let Some(hook) = &mut self.on_select_cell {
                        hook(xy);
                    }
                }
                MapEvent::CenterChanged(xy) => {
                    if let Some(hook) = &mut self.on_center_change {
                        hook(xy);
                    }
                }
            }
        }
    }
}

impl eframe::App for StarmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.keyboard(ctx);

        let readout = self.readout();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui, &readout));
        egui::SidePanel::right("overview")
            .resizable(false)
            .exact_width(self.minimap.size().x + SIDE_PANEL_MARGIN)
            .show(ctx, |ui| self.side_panel(ui, &readout));
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.map_canvas(ui));
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

impl StarmapApp {
    fn keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let mut pressed = Vec::new();
        ctx.input_mut(|i| {
            let modifiers = i.modifiers;
            for key in ArrowKey::ALL {
                // Consuming keeps egui from also using arrows for focus moves.
                if i.consume_key(modifiers, key.key()) {
                    pressed.push((key, modifiers.shift));
                }
            }
        });
        for (key, fast) in pressed {
            let events = self.controller.key(key, fast, &mut self.camera);
            self.handle_events(events);
        }
    }

    fn pointer(&mut self, ctx: &egui::Context, response: &egui::Response, surface: Vec2) {
        let origin = response.rect.min;
        let (pressed, released, latest, scroll) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.raw_scroll_delta.y,
            )
        });
        let local = latest.map(|p| Pos2::ZERO + (p - origin));

        let mut events = Vec::new();
        if let Some(pos) = local {
            if pressed && response.contains_pointer() {
                self.controller.pointer_down(PointerButton::Primary, pos);
            }
            if self.controller.is_dragging() {
                if released {
                    events.extend(self.controller.pointer_up(pos, &mut self.camera, surface));
                } else {
                    events.extend(self.controller.pointer_move(pos, &mut self.camera));
                }
            }
            if scroll != 0.0 && response.contains_pointer() {
                let notches = scroll / WHEEL_NOTCH_POINTS;
                events.extend(self.controller.wheel(notches, pos, surface, &mut self.camera));
            }
        } else if released {
            self.controller.cancel_drag();
        }

        self.hover = local
            .filter(|_| response.contains_pointer())
            .and_then(|pos| self.camera.viewport(surface).screen_to_world(pos));
        self.handle_events(events);
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

impl StarmapApp {
    fn toolbar(&mut self, ui: &mut egui::Ui, readout: &Readout) {
        ui.horizontal(|ui| {
            let limits = self.config.cell_size;
            let mut cell_size = self.camera.cell_size();
            let slider = egui::Slider::new(&mut cell_size, limits.min..=limits.max)
                .text("zoom")
                .integer();
            if ui.add(slider).changed() {
                let events = self.controller.set_cell_size(cell_size, &mut self.camera);
                self.handle_events(events);
            }

            ui.separator();
            ui.label(RichText::new(format!("center {}", self.camera.center())).monospace());

            if let Some(hover) = &readout.hover {
                ui.separator();
                ui.label(RichText::new(hover).monospace());
            }

            if self.report_path.is_some() {
                ui.separator();
                if ui.button("Reload report").clicked() {
                    self.reload_report();
                }
            }
            if let Some(status) = &self.status {
                ui.colored_label(self.config.palette.hostile, status);
            }
        });
    }

    fn side_panel(&mut self, ui: &mut egui::Ui, readout: &Readout) {
        ui.heading("Overview");
        self.overview(ui);

        let viewport = self.camera.viewport(self.map_surface.size);
        let [width, height] = self.map_surface.backing_size();
        ui.label(format!("{} × {} cells in view", viewport.cols, viewport.rows));
        ui.weak(format!("canvas {width} × {height} px"));

        ui.add_space(8.0);
        ui.label(RichText::new("Highlight").strong());
        let mut choice = self.filter;
        for option in FilterChoice::ALL {
            ui.radio_value(&mut choice, option, option.label());
        }
        if choice != self.filter {
            self.set_filter(choice);
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Selection").strong());
        match (self.selection.cell, &readout.selection) {
            (Some(cell), Some(text)) => {
                ui.label(text);
                if ui.button("Center here").clicked() {
                    let events = self.controller.recenter(cell, &mut self.camera);
                    self.handle_events(events);
                }
            }
            _ => {
                ui.label("Click a cell to select it.");
            }
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Legend").strong());
        let palette = &self.config.palette;
        ui::swatch(ui, palette.own, "Mine");
        ui::swatch(ui, palette.allied, "Allied");
        ui::swatch(ui, palette.non_aggression, "Non-aggression");
        ui::swatch(ui, palette.hostile, "Hostile");
        ui::swatch(ui, palette.mixed, "Contested");
        ui::swatch(ui, palette.neutral, "Neutral");
        ui::swatch(ui, palette.unknown, "Unknown");
    }

    fn overview(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(self.minimap.size(), Sense::click());
        let origin = response.rect.min;
        let viewport = self.camera.viewport(self.map_surface.size);
        let frame = self
            .minimap
            .redraw(&self.report, &self.camera, &viewport, &self.config.palette);
        ui::paint_frame(&painter, origin, &frame);

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let target = self
                    .minimap
                    .recenter_target(self.camera.center(), Pos2::ZERO + (pos - origin));
                let events = self.controller.recenter(target, &mut self.camera);
                self.handle_events(events);
            }
        }
    }

    fn map_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let surface = Surface::new(response.rect.size(), ui.ctx().pixels_per_point());
        self.map_surface = surface;

        self.pointer(ui.ctx(), &response, surface.size);

        let scene = MapScene {
            report: &self.report,
            camera: &self.camera,
            surface,
            selection: &self.selection,
            config: &self.config,
        };
        let frame = self.cache.frame(&scene, self.generation);
        ui::paint_frame(&painter, response.rect.min, frame);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn app() -> StarmapApp {
        StarmapApp::with_report(Report::sample(), MapConfig::default(), None)
    }

    // -- startup ---

    #[test]
    fn camera_starts_at_home_system() {
        let app = app();
        assert_eq!(Some(app.camera().center()), Report::sample().home());
        assert_eq!(app.camera().cell_size(), MapConfig::default().cell_size.initial);
    }

    #[test]
    fn explicit_center_wins_and_empty_report_uses_default() {
        let app = StarmapApp::with_report(Report::sample(), MapConfig::default(), Some(Xy::new(3, 4)));
        assert_eq!(app.camera().center(), Xy::new(3, 4));
        let empty = StarmapApp::with_report(Report::default(), MapConfig::default(), None);
        assert_eq!(empty.camera().center(), Xy::default());
    }

    // -- events ---

    #[test]
    fn select_event_updates_selection_and_hooks() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut app = app().on_select_cell(move |xy| sink.borrow_mut().push(xy));
        app.handle_events(vec![MapEvent::SelectCell(Xy::new(5, 6))]);
        assert_eq!(app.selection().cell, Some(Xy::new(5, 6)));
        assert_eq!(*seen.borrow(), vec![Xy::new(5, 6)]);
    }

    #[test]
    fn center_hook_hears_keyboard_steps() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut app = app().on_center_change(move |xy| sink.borrow_mut().push(xy));
        let start = app.camera().center();
        let events = app.controller.key(ArrowKey::Right, true, &mut app.camera);
        app.handle_events(events);
        assert_eq!(*seen.borrow(), vec![start.offset(0, 5)]);
        assert!(app.selection().cell.is_none());
    }

    #[test]
    fn readout_describes_hover_and_selection() {
        let mut app = app();
        assert_eq!(app.readout(), Readout::default());

        let home = Report::sample().home().expect("sample has a home system");
        app.hover = Some(home);
        app.handle_events(vec![MapEvent::SelectCell(Xy::new(33, 3))]);
        let readout = app.readout();
        assert!(readout.hover.as_deref().is_some_and(|t| t.contains("Sol")), "{readout:?}");
        assert_eq!(readout.selection.as_deref(), Some("33:3"));
    }

    #[test]
    fn new_report_bumps_generation() {
        let mut app = app();
        app.set_report(Report::default());
        assert_eq!(app.generation, 1);
        assert!(app.report.systems.is_empty());
    }

    // -- filters ---

    #[test]
    fn filter_choices_map_to_owner_sets() {
        let player = Report::sample().player;
        assert_eq!(FilterChoice::Everyone.owner_filter(&player), OwnerFilter::Everyone);
        assert_eq!(
            FilterChoice::Own.owner_filter(&player),
            OwnerFilter::Owners(vec![player.numero])
        );
        let OwnerFilter::Owners(allies) = FilterChoice::Allies.owner_filter(&player) else {
            panic!("allies filter is active");
        };
        assert!(!allies.contains(&player.numero));
        assert!(!allies.is_empty());
        assert_eq!(
            FilterChoice::NonAggression.owner_filter(&player),
            OwnerFilter::Owners(player.pna.clone())
        );
    }

    #[test]
    fn filter_follows_report_swap() {
        let mut app = app();
        app.set_filter(FilterChoice::NonAggression);
        let mut report = Report::sample();
        report.player.pna = vec![OwnerId(99)];
        app.set_report(report);
        assert_eq!(
            app.selection().owner_filter,
            OwnerFilter::Owners(vec![OwnerId(99)])
        );
    }
}
