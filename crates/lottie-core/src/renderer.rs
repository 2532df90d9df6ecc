use crate::composition::{Bounds, Composition};
use crate::images::ImageAssetManager;
use glam::Vec2;
use std::sync::Arc;

/// The drawable that paints composition frames.
///
/// Implementations own whatever rasterizer backs them; the playback core only
/// pushes state into them and asks for a paint.
pub trait Renderer {
    fn set_composition(&mut self, composition: &Arc<Composition>);

    /// Frame window derived from the active clip range.
    fn set_frame_bounds(&mut self, min_frame: f32, max_frame: f32);

    /// `None` while the manager is still being built or when the composition
    /// has no images.
    fn set_image_asset_manager(&mut self, manager: Option<Arc<ImageAssetManager>>);

    fn set_frame(&mut self, frame: i32);

    /// Paints the current frame, scaled per axis onto the output surface.
    fn draw(&mut self, scale: Vec2);
}

/// Per-axis scale from composition bounds to an output surface.
pub fn surface_scale(surface: Vec2, bounds: Bounds) -> Vec2 {
    let w = bounds.width.max(1) as f32;
    let h = bounds.height.max(1) as f32;
    Vec2::new(surface.x / w, surface.y / h)
}

/// Largest size with the composition's aspect ratio that fits in `available`.
pub fn fit_aspect(available: Vec2, bounds: Bounds) -> Vec2 {
    if bounds.width == 0 || bounds.height == 0 {
        return available;
    }
    let aspect = bounds.width as f32 / bounds.height as f32;
    if available.x / available.y > aspect {
        Vec2::new(available.y * aspect, available.y)
    } else {
        Vec2::new(available.x, available.x / aspect)
    }
}
