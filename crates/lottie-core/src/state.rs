use crate::clip::ClipRange;
use crate::config::PlaybackConfig;
use crate::error::{LottieError, Result};
use crate::images::ImageAssetDelegate;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Repeat count meaning "loop forever".
pub const INFINITE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    /// Repeat cap reached. `play()` starts over from the beginning of the clip.
    Finished,
}

/// Live playback state of one animation session.
#[derive(Clone)]
pub struct AnimationState {
    progress: f32,
    phase: PlaybackPhase,
    speed: f32,
    repeat_count: i32,
    clip_range: Option<ClipRange>,
    current_frame: i32,
    image_assets_folder: Option<PathBuf>,
    image_asset_delegate: Option<Arc<dyn ImageAssetDelegate>>,
}

impl AnimationState {
    pub fn new(autoplay: bool) -> Self {
        Self {
            progress: 0.0,
            phase: if autoplay {
                PlaybackPhase::Playing
            } else {
                PlaybackPhase::Idle
            },
            speed: 1.0,
            repeat_count: INFINITE,
            clip_range: None,
            current_frame: 0,
            image_assets_folder: None,
            image_asset_delegate: None,
        }
    }

    /// Builds a state from config. The clip is applied later since it may
    /// need a composition to resolve.
    pub fn from_config(config: &PlaybackConfig) -> Result<Self> {
        let mut state = Self::new(false);
        state.set_speed(config.speed)?;
        state.set_repeat_count(config.repeat_count)?;
        state.seek(config.start_progress);
        state.image_assets_folder = config.image_assets_folder.clone();
        if config.autoplay {
            state.play();
        }
        Ok(state)
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }

    pub fn clip_range(&self) -> Option<ClipRange> {
        self.clip_range
    }

    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    pub fn image_assets_folder(&self) -> Option<&PathBuf> {
        self.image_assets_folder.as_ref()
    }

    pub fn image_asset_delegate(&self) -> Option<&Arc<dyn ImageAssetDelegate>> {
        self.image_asset_delegate.as_ref()
    }

    /// Effective `(min, max)` progress, `(0, 1)` without a clip.
    pub fn effective_range(&self) -> (f32, f32) {
        let range = self.clip_range.unwrap_or_default();
        (range.min(), range.max())
    }

    pub fn play(&mut self) {
        if self.speed == 0.0 {
            tracing::debug!("play() ignored while speed is zero");
            return;
        }
        self.phase = PlaybackPhase::Playing;
    }

    pub fn pause(&mut self) {
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Idle;
        }
    }

    /// Zero speed pauses playback instead of spinning on frames that never
    /// move the progress.
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !speed.is_finite() {
            return Err(LottieError::InvalidSpeed(speed));
        }
        self.speed = speed;
        if speed == 0.0 {
            self.pause();
        }
        Ok(())
    }

    pub fn set_repeat_count(&mut self, count: i32) -> Result<()> {
        if count < INFINITE {
            return Err(LottieError::InvalidRepeatCount(count));
        }
        self.repeat_count = count;
        Ok(())
    }

    pub fn set_clip_range(&mut self, range: ClipRange) {
        self.clip_range = Some(range);
        self.progress = range.clamp(self.progress);
    }

    pub fn clear_clip_range(&mut self) {
        self.clip_range = None;
    }

    /// Moves the playhead. Takes effect on the next render pass.
    pub fn seek(&mut self, progress: f32) {
        if progress.is_nan() {
            return;
        }
        let (min, max) = self.effective_range();
        self.progress = progress.clamp(min, max);
        if self.phase == PlaybackPhase::Finished {
            self.phase = PlaybackPhase::Idle;
        }
    }

    pub fn set_image_assets_folder(&mut self, folder: Option<PathBuf>) {
        self.image_assets_folder = folder;
    }

    pub fn set_image_asset_delegate(&mut self, delegate: Option<Arc<dyn ImageAssetDelegate>>) {
        self.image_asset_delegate = delegate;
    }

    pub(crate) fn set_progress(&mut self, progress: f32) {
        self.progress = progress;
    }

    pub(crate) fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }

    pub(crate) fn finish(&mut self, progress: f32) {
        self.progress = progress;
        self.phase = PlaybackPhase::Finished;
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationState")
            .field("progress", &self.progress)
            .field("phase", &self.phase)
            .field("speed", &self.speed)
            .field("repeat_count", &self.repeat_count)
            .field("clip_range", &self.clip_range)
            .field("current_frame", &self.current_frame)
            .finish_non_exhaustive()
    }
}
