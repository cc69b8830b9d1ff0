use super::{MapFrame, MapScene, Selection, redraw};
use crate::camera::{Camera, Surface};

/// Everything a map frame depends on, besides the immutable config.
#[derive(Debug, Clone, PartialEq)]
struct FrameKey {
    camera: Camera,
    surface: Surface,
    selection: Selection,
    generation: u64,
}

/// Keeps the last map frame and rebuilds it only when its inputs change.
///
/// `generation` stands in for the report: callers bump it whenever they
/// swap in new report data.
#[derive(Debug, Default)]
pub struct FrameCache {
    key: Option<FrameKey>,
    frame: MapFrame,
    rebuilds: u64,
}

impl FrameCache {
    pub fn frame(&mut self, scene: &MapScene<'_>, generation: u64) -> &MapFrame {
        let key = FrameKey {
            camera: *scene.camera,
            surface: scene.surface,
            selection: scene.selection.clone(),
            generation,
        };
        if self.key.as_ref() != Some(&key) {
            self.frame = redraw(scene);
            self.key = Some(key);
            self.rebuilds += 1;
            log::trace!("map frame rebuild #{} ({} commands)", self.rebuilds, self.frame.len());
        }
        &self.frame
    }

    /// How many times the frame has been laid out.
    #[cfg(test)]
    fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
