//! Pointer and keyboard handling for the map.
//!
//! Input never touches the camera directly: it is turned into
//! [`CameraAction`]s, and [`apply`] is the only place a camera changes. Each
//! change is reported back as a [`MapEvent`] for the host.

use crate::camera::{Camera, ScreenCell};
use crate::config::{CellSizeConfig, MapConfig};
use crate::torus::{Xy, wrap};
use egui::{PointerButton, Pos2, Vec2};

// ---------------------------------------------------------------------------
// Actions & events
// ---------------------------------------------------------------------------

/// Every way the camera can be changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// Move the center by whole cells, wrapping on both axes.
    Step { d_row: i32, d_col: i32 },
    Recenter(Xy),
    SetCellSize(f32),
}

/// Notifications for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    SelectCell(Xy),
    CenterChanged(Xy),
}

/// Apply one [`CameraAction`] and return what the host should hear about.
pub fn apply(camera: &mut Camera, action: CameraAction) -> Vec<MapEvent> {
    let before = camera.center();
    match action {
        CameraAction::Step { d_row, d_col } => camera.set_center(before.offset(d_row, d_col)),
        CameraAction::Recenter(center) => camera.set_center(center),
        CameraAction::SetCellSize(cell_size) => camera.set_cell_size(cell_size),
    }

    let after = camera.center();
    if after == before {
        Vec::new()
    } else {
        log::debug!("camera centered on {after}");
        vec![MapEvent::CenterChanged(after)]
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the `(d_row, d_col)` offset for one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub const fn key(self) -> egui::Key {
        match self {
            Self::Up => egui::Key::ArrowUp,
            Self::Down => egui::Key::ArrowDown,
            Self::Left => egui::Key::ArrowLeft,
            Self::Right => egui::Key::ArrowRight,
        }
    }
}

// ---------------------------------------------------------------------------
// Zoom
// ---------------------------------------------------------------------------

/// Scale after `notches` wheel steps of `factor` each, clamped to `limits`.
pub fn zoomed_scale(scale: f32, notches: f32, factor: f32, limits: &CellSizeConfig) -> f32 {
    limits.clamp(scale * factor.powf(notches))
}

// ---------------------------------------------------------------------------
// Interaction controller
// ---------------------------------------------------------------------------

/// Bookkeeping for one press-drag-release of the primary button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    origin: Pos2,
    last: Pos2,
    /// Pointer travel not yet turned into whole cell steps.
    accum: Vec2,
    /// Farthest the pointer got from `origin`.
    max_travel: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Turns pointer, wheel and keyboard input into camera actions.
///
/// At most one drag session exists at a time; it lives in [`DragState`] from
/// press to release.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    state: DragState,
    click_threshold: f32,
    fast_step: i32,
    wheel_zoom_factor: f32,
    cell_limits: CellSizeConfig,
}

impl InteractionController {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            state: DragState::Idle,
            click_threshold: config.click_threshold,
            fast_step: config.fast_step,
            wheel_zoom_factor: config.wheel_zoom_factor,
            cell_limits: config.cell_size,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start a drag session. Only the primary button drags.
    pub fn pointer_down(&mut self, button: PointerButton, pos: Pos2) {
        if button != PointerButton::Primary || self.is_dragging() {
            return;
        }
        self.state = DragState::Dragging(DragSession {
            origin: pos,
            last: pos,
            accum: Vec2::ZERO,
            max_travel: 0.0,
        });
    }

    /// Feed pointer motion; emits one camera step per whole cell crossed.
    pub fn pointer_move(&mut self, pos: Pos2, camera: &mut Camera) -> Vec<MapEvent> {
        let DragState::Dragging(session) = &mut self.state else {
            return Vec::new();
        };
        let cell = camera.cell_size();
        session.accum += pos - session.last;
        session.last = pos;
        session.max_travel = session.max_travel.max((pos - session.origin).length());

        let mut events = Vec::new();
        if !(cell.is_finite() && cell > 0.0) {
            return events;
        }

        // Content follows the pointer, so the center moves the other way.
        while session.accum.x >= cell {
            session.accum.x -= cell;
            events.extend(apply(camera, CameraAction::Step { d_row: 0, d_col: -1 }));
        }
        while session.accum.x <= -cell {
            session.accum.x += cell;
            events.extend(apply(camera, CameraAction::Step { d_row: 0, d_col: 1 }));
        }
        while session.accum.y >= cell {
            session.accum.y -= cell;
            events.extend(apply(camera, CameraAction::Step { d_row: -1, d_col: 0 }));
        }
        while session.accum.y <= -cell {
            session.accum.y += cell;
            events.extend(apply(camera, CameraAction::Step { d_row: 1, d_col: 0 }));
        }
        events
    }

    /// End the drag session. A release close enough to the press is a click
    /// and selects the world cell under the pointer.
    pub fn pointer_up(&mut self, pos: Pos2, camera: &mut Camera, surface: Vec2) -> Vec<MapEvent> {
        let DragState::Dragging(_) = self.state else {
            return Vec::new();
        };
        let mut events = self.pointer_move(pos, camera);

        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return events;
        };
        if session.max_travel <= self.click_threshold {
            if let Some(xy) = camera.viewport(surface).screen_to_world(pos) {
                log::debug!("selected cell {xy}");
                events.push(MapEvent::SelectCell(xy));
            }
        }
        events
    }

    /// Drop an in-flight drag without selecting anything.
    pub fn cancel_drag(&mut self) {
        self.state = DragState::Idle;
    }

    /// Step the camera for an arrow key; `fast` uses the configured long step.
    pub fn key(&self, key: ArrowKey, fast: bool, camera: &mut Camera) -> Vec<MapEvent> {
        let step = if fast { self.fast_step } else { 1 };
        let (d_row, d_col) = key.delta();
        apply(
            camera,
            CameraAction::Step {
                d_row: d_row * step,
                d_col: d_col * step,
            },
        )
    }

    /// Zoom by wheel `notches`, keeping the cell under `pointer` in place.
    pub fn wheel(&self, notches: f32, pointer: Pos2, surface: Vec2, camera: &mut Camera) -> Vec<MapEvent> {
        if notches == 0.0 || !notches.is_finite() {
            return Vec::new();
        }
        let anchor = camera.viewport(surface).screen_to_world(pointer);
        let cell_size = zoomed_scale(camera.cell_size(), notches, self.wheel_zoom_factor, &self.cell_limits);
        self.zoom_to(cell_size, anchor.map(|world| (pointer, world)), surface, camera)
    }

    /// Set the cell size directly, e.g. from a slider, keeping the center.
    pub fn set_cell_size(&self, cell_size: f32, camera: &mut Camera) -> Vec<MapEvent> {
        apply(camera, CameraAction::SetCellSize(self.cell_limits.clamp(cell_size)))
    }

    /// Recenter on a world cell, e.g. from the overview.
    pub fn recenter(&self, center: Xy, camera: &mut Camera) -> Vec<MapEvent> {
        apply(camera, CameraAction::Recenter(center))
    }

    fn zoom_to(
        &self,
        cell_size: f32,
        anchor: Option<(Pos2, Xy)>,
        surface: Vec2,
        camera: &mut Camera,
    ) -> Vec<MapEvent> {
        let mut events = apply(camera, CameraAction::SetCellSize(cell_size));
        let Some((pointer, world)) = anchor else {
            return events;
        };
        let viewport = camera.viewport(surface);
        if let Some(ScreenCell { col, row }) = viewport.cell_at(pointer) {
            let center = Xy {
                x: wrap(world.x - (row - viewport.half_rows)),
                y: wrap(world.y - (col - viewport.half_cols)),
            };
            events.extend(apply(camera, CameraAction::Recenter(center)));
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
