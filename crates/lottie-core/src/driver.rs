//! Frame-driven playback loop.
//!
//! The host delivers one timestamp per display refresh through
//! [`PlaybackDriver::on_frame`]; the driver turns elapsed time into progress,
//! handles looping and repeat limits, and pushes the resulting frame into the
//! renderer. There is no internal timer: the driver only asks for the next
//! frame through its [`FrameScheduler`].

use crate::composition::Composition;
use crate::renderer::Renderer;
use crate::state::{AnimationState, INFINITE};

const NANOS_PER_MILLI: f32 = 1_000_000.0;

/// Host hook for arming the per-refresh callback.
pub trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel_frame(&mut self);
}

/// Scheduler for hosts that poll [`PlaybackDriver::wants_frame`] instead.
#[derive(Debug, Default)]
pub struct PolledScheduler;

impl FrameScheduler for PolledScheduler {
    fn request_frame(&mut self) {}
    fn cancel_frame(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Not running, not requested, or disposed.
    Ignored,
    /// First frame of a run; only records the time baseline.
    Baseline,
    Advanced { frame: i32, wrapped: bool },
    /// Repeat limit reached on this frame; the loop has stopped.
    Finished { frame: i32 },
}

/// Loop-local state carried between frames.
#[derive(Debug, Clone, Copy, Default)]
struct LoopContinuation {
    last_frame_nanos: Option<u64>,
    wraps: u32,
}

pub struct PlaybackDriver {
    scheduler: Box<dyn FrameScheduler>,
    continuation: Option<LoopContinuation>,
    frame_requested: bool,
    disposed: bool,
}

impl PlaybackDriver {
    pub fn new(scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            scheduler,
            continuation: None,
            frame_requested: false,
            disposed: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn wants_frame(&self) -> bool {
        self.frame_requested
    }

    /// Wraps counted in the current run.
    pub fn wraps(&self) -> Option<u32> {
        self.continuation.map(|c| c.wraps)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Starts or stops the loop to match `state` and `composition`.
    pub fn sync(&mut self, state: &mut AnimationState, composition: Option<&Composition>) {
        if self.disposed {
            return;
        }
        let playable = composition.is_some_and(|c| c.duration_ms() > 0.0);
        if !playable || !state.is_playing() {
            self.stop();
            return;
        }
        if self.continuation.is_none() {
            self.activate(state);
        }
    }

    /// Drops the current run and starts a fresh one if playback is on.
    pub fn restart(&mut self, state: &mut AnimationState, composition: Option<&Composition>) {
        self.stop();
        self.sync(state, composition);
    }

    fn activate(&mut self, state: &mut AnimationState) {
        let (min, max) = state.effective_range();
        // A finished run sits at its end; replay from the other end.
        if state.speed() > 0.0 && state.progress() == max {
            state.set_progress(min);
        } else if state.speed() < 0.0 && state.progress() == min {
            state.set_progress(max);
        }

        tracing::debug!(progress = state.progress(), speed = state.speed(), "playback started");
        self.continuation = Some(LoopContinuation::default());
        self.arm();
    }

    fn arm(&mut self) {
        self.frame_requested = true;
        self.scheduler.request_frame();
    }

    fn stop(&mut self) {
        if self.frame_requested {
            self.scheduler.cancel_frame();
            self.frame_requested = false;
        }
        if self.continuation.take().is_some() {
            tracing::debug!("playback loop stopped");
        }
    }

    /// Consumes one frame-time signal.
    pub fn on_frame(
        &mut self,
        frame_time_nanos: u64,
        state: &mut AnimationState,
        composition: Option<&Composition>,
        renderer: &mut dyn Renderer,
    ) -> FrameOutcome {
        if self.disposed || !self.frame_requested {
            return FrameOutcome::Ignored;
        }
        let Some(composition) = composition.filter(|c| c.duration_ms() > 0.0) else {
            self.stop();
            return FrameOutcome::Ignored;
        };
        if !state.is_playing() {
            self.stop();
            return FrameOutcome::Ignored;
        }
        let Some(mut cont) = self.continuation else {
            self.frame_requested = false;
            return FrameOutcome::Ignored;
        };
        self.frame_requested = false;

        let Some(last) = cont.last_frame_nanos else {
            cont.last_frame_nanos = Some(frame_time_nanos);
            self.continuation = Some(cont);
            self.arm();
            return FrameOutcome::Baseline;
        };

        // Timestamps are monotonic; a clock going backwards counts as no time.
        let d_time_ms = frame_time_nanos.saturating_sub(last) as f32 / NANOS_PER_MILLI;
        cont.last_frame_nanos = Some(frame_time_nanos);
        let d_progress = d_time_ms * state.speed() / composition.duration_ms();

        let (min, max) = state.effective_range();
        let span = max - min;
        let previous = state.progress();

        let mut finished = false;
        let mut wrapped = false;
        if span <= 0.0 {
            state.finish(min);
            finished = true;
        } else if d_progress != 0.0 {
            // Unwrapped offset into the span; leaving [0, span) means the
            // loop end was crossed, however long the step.
            let raw = (previous - min) + d_progress;
            let progress = (min + raw.rem_euclid(span)).clamp(min, max);
            state.set_progress(progress);

            wrapped = raw >= span
                || raw < 0.0
                || if d_progress > 0.0 {
                    progress < previous
                } else {
                    progress > previous
                };
            if wrapped {
                // One wrap per tick, even when the step spans several loops.
                cont.wraps = cont.wraps.saturating_add(1);
                let cap = state.repeat_count();
                if cap != INFINITE && cont.wraps > cap as u32 {
                    let end = if d_progress > 0.0 { max } else { min };
                    state.finish(end);
                    finished = true;
                }
            }
        }

        let frame = composition.frame_for_progress(state.progress());
        state.set_current_frame(frame);
        renderer.set_frame(frame);

        if finished {
            tracing::debug!(frame, wraps = cont.wraps, "repeat limit reached");
            self.continuation = None;
            return FrameOutcome::Finished { frame };
        }

        self.continuation = Some(cont);
        self.arm();
        FrameOutcome::Advanced { frame, wrapped }
    }

    /// Tears the loop down for good.
    pub fn dispose(&mut self) {
        self.stop();
        self.disposed = true;
    }
}
