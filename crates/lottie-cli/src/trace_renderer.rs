use glam::Vec2;
use lottie_core::{Composition, ImageAssetManager, Renderer};
use std::sync::Arc;

/// Renderer that logs what it would paint and keeps simple counters.
#[derive(Default)]
pub struct TraceRenderer {
    frame: i32,
    has_images: bool,
    pub frames_pushed: usize,
    pub paints: usize,
    pub distinct_frames: std::collections::BTreeSet<i32>,
}

impl Renderer for TraceRenderer {
    fn set_composition(&mut self, composition: &Arc<Composition>) {
        tracing::trace!(name = composition.name().unwrap_or("unnamed"), "composition set");
    }

    fn set_frame_bounds(&mut self, min_frame: f32, max_frame: f32) {
        tracing::trace!(min_frame, max_frame, "frame bounds");
    }

    fn set_image_asset_manager(&mut self, manager: Option<Arc<ImageAssetManager>>) {
        self.has_images = manager.is_some();
    }

    fn set_frame(&mut self, frame: i32) {
        self.frame = frame;
        self.frames_pushed += 1;
    }

    fn draw(&mut self, scale: Vec2) {
        self.paints += 1;
        self.distinct_frames.insert(self.frame);
        tracing::debug!(
            frame = self.frame,
            sx = scale.x,
            sy = scale.y,
            images = self.has_images,
            "paint"
        );
    }
}
