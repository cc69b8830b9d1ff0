//! Display list produced by the renderers.
//!
//! A [`MapFrame`] is plain data in canvas-local points. It carries no UI
//! framework state, which keeps the renderers pure and testable; the egui
//! adapter in [`crate::ui`] turns it into shapes.

use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        fill: Color32,
    },
    RectOutline {
        rect: Rect,
        stroke: Stroke,
    },
    Line {
        points: [Pos2; 2],
        stroke: Stroke,
    },
    Disk {
        center: Pos2,
        radius: f32,
        fill: Color32,
    },
    Ring {
        center: Pos2,
        radius: f32,
        stroke: Stroke,
    },
    /// Pie slice starting at `start` radians and running clockwise on screen
    /// for `sweep` radians.
    Wedge {
        center: Pos2,
        radius: f32,
        start: f32,
        sweep: f32,
        fill: Color32,
    },
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFrame {
    pub size: Vec2,
    pub commands: Vec<DrawCmd>,
}

impl MapFrame {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
