//! A playable animation component: state, driver, renderer and assets wired
//! together the way a host UI embeds them.

use crate::clip::{ClipRange, ClipSpec};
use crate::composition::{lerp, Composition};
use crate::config::PlaybackConfig;
use crate::driver::{FrameOutcome, FrameScheduler, PlaybackDriver};
use crate::error::Result;
use crate::images::{ImageAssetDelegate, ImageAssetManager, PendingImageAssetManager};
use crate::renderer::{fit_aspect, surface_scale, Renderer};
use crate::state::AnimationState;
use crate::task::CompositionResult;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    /// Nothing painted: no composition, zero duration, or disposed.
    Skipped,
    Painted { frame: i32, scale: Vec2 },
}

pub struct LottieAnimation<R: Renderer> {
    state: AnimationState,
    driver: PlaybackDriver,
    renderer: R,
    composition: Option<Arc<Composition>>,
    clip_spec: Option<ClipSpec>,
    image_manager: Option<Arc<ImageAssetManager>>,
    pending_images: Option<PendingImageAssetManager>,
    disposed: bool,
}

impl<R: Renderer> LottieAnimation<R> {
    pub fn new(renderer: R, scheduler: Box<dyn FrameScheduler>, state: AnimationState) -> Self {
        Self {
            state,
            driver: PlaybackDriver::new(scheduler),
            renderer,
            composition: None,
            clip_spec: None,
            image_manager: None,
            pending_images: None,
            disposed: false,
        }
    }

    pub fn with_config(
        renderer: R,
        scheduler: Box<dyn FrameScheduler>,
        config: &PlaybackConfig,
    ) -> Result<Self> {
        let mut animation = Self::new(renderer, scheduler, AnimationState::from_config(config)?);
        animation.clip_spec = config.clip.clone();
        Ok(animation)
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn driver(&self) -> &PlaybackDriver {
        &self.driver
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn composition(&self) -> Option<&Arc<Composition>> {
        self.composition.as_ref()
    }

    pub fn image_asset_manager(&self) -> Option<&Arc<ImageAssetManager>> {
        self.image_manager.as_ref()
    }

    /// `true` once a frame callback has been requested and not yet delivered.
    pub fn wants_frame(&self) -> bool {
        self.driver.wants_frame()
    }

    /// Width over height of the composition, for constraining the surface.
    pub fn aspect_ratio(&self) -> Option<f32> {
        let bounds = self.composition.as_ref()?.bounds();
        if bounds.height == 0 {
            return None;
        }
        Some(bounds.width as f32 / bounds.height as f32)
    }

    /// Largest surface inside `available` that keeps the composition aspect.
    pub fn constrain_surface(&self, available: Vec2) -> Vec2 {
        match &self.composition {
            Some(c) => fit_aspect(available, c.bounds()),
            None => available,
        }
    }

    /// Swaps the composition. A different composition restarts the loop.
    pub fn set_composition(&mut self, composition: Option<Arc<Composition>>) {
        if self.disposed {
            return;
        }
        let same = match (&self.composition, &composition) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }

        self.composition = composition;
        if let (Some(spec), Some(comp)) = (&self.clip_spec, &self.composition) {
            match spec.resolve(comp) {
                Ok(range) => self.state.set_clip_range(range),
                Err(e) => {
                    tracing::warn!(error = %e, "clip does not apply to composition, clearing it");
                    self.state.clear_clip_range();
                }
            }
        }
        self.refresh_image_assets();
        self.driver
            .restart(&mut self.state, self.composition.as_deref());
    }

    /// Applies a load outcome. Anything but `Success` leaves no composition.
    pub fn set_result(&mut self, result: &CompositionResult) {
        self.set_composition(result.composition().cloned());
    }

    pub fn play(&mut self) {
        self.state.play();
        self.sync();
    }

    pub fn pause(&mut self) {
        self.state.pause();
        self.sync();
    }

    pub fn seek(&mut self, progress: f32) {
        self.state.seek(progress);
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.state.set_speed(speed)?;
        self.sync();
        Ok(())
    }

    pub fn set_repeat_count(&mut self, count: i32) -> Result<()> {
        self.state.set_repeat_count(count)
    }

    pub fn set_clip_range(&mut self, range: ClipRange) {
        self.clip_spec = None;
        self.state.set_clip_range(range);
    }

    /// Resolves now if a composition is present, otherwise when one arrives.
    pub fn set_clip_spec(&mut self, spec: ClipSpec) -> Result<()> {
        if let Some(comp) = &self.composition {
            let range = spec.resolve(comp)?;
            self.state.set_clip_range(range);
        }
        self.clip_spec = Some(spec);
        Ok(())
    }

    pub fn clear_clip(&mut self) {
        self.clip_spec = None;
        self.state.clear_clip_range();
    }

    pub fn set_image_assets_folder(&mut self, folder: Option<PathBuf>) {
        if self.state.image_assets_folder() == folder.as_ref() {
            return;
        }
        self.state.set_image_assets_folder(folder);
        self.refresh_image_assets();
    }

    pub fn set_image_asset_delegate(&mut self, delegate: Option<Arc<dyn ImageAssetDelegate>>) {
        self.state.set_image_asset_delegate(delegate);
        self.refresh_image_assets();
    }

    fn sync(&mut self) {
        self.driver.sync(&mut self.state, self.composition.as_deref());
    }

    fn refresh_image_assets(&mut self) {
        self.image_manager = None;
        self.pending_images = match &self.composition {
            Some(comp) if comp.has_images() => Some(PendingImageAssetManager::spawn(
                self.state.image_assets_folder().cloned(),
                self.state.image_asset_delegate().cloned(),
                comp.images().to_vec(),
            )),
            _ => None,
        };
    }

    fn poll_image_assets(&mut self) {
        if let Some(manager) = self.pending_images.as_ref().and_then(|p| p.try_take()) {
            self.image_manager = Some(Arc::new(manager));
            self.pending_images = None;
        }
    }

    /// Blocks until a pending image asset manager is ready.
    pub fn wait_for_image_assets(&mut self) {
        if let Some(pending) = self.pending_images.take() {
            self.image_manager = pending.wait().map(Arc::new);
        }
    }

    /// Host frame callback.
    pub fn on_frame(&mut self, frame_time_nanos: u64) -> FrameOutcome {
        if self.disposed {
            return FrameOutcome::Ignored;
        }
        self.driver.on_frame(
            frame_time_nanos,
            &mut self.state,
            self.composition.as_deref(),
            &mut self.renderer,
        )
    }

    /// Host render pass for an output surface of `surface` pixels.
    pub fn render(&mut self, surface: Vec2) -> RenderOutcome {
        if self.disposed {
            return RenderOutcome::Skipped;
        }
        let Some(comp) = self.composition.clone() else {
            return RenderOutcome::Skipped;
        };
        if comp.duration_ms() <= 0.0 {
            return RenderOutcome::Skipped;
        }

        self.poll_image_assets();
        self.renderer.set_composition(&comp);

        let (min, max) = self.state.effective_range();
        self.renderer.set_frame_bounds(
            lerp(comp.start_frame(), comp.end_frame(), min),
            lerp(comp.start_frame(), comp.end_frame(), max),
        );

        let manager = if comp.has_images() {
            self.image_manager.clone()
        } else {
            None
        };
        self.renderer.set_image_asset_manager(manager);

        let frame = comp.frame_for_progress(self.state.progress());
        self.state.set_current_frame(frame);
        self.renderer.set_frame(frame);

        let scale = surface_scale(surface, comp.bounds());
        self.renderer.draw(scale);
        RenderOutcome::Painted { frame, scale }
    }

    /// Ends the session. No frames are consumed or painted afterwards.
    pub fn dispose(&mut self) {
        self.driver.dispose();
        self.pending_images = None;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
