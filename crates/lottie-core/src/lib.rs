//! Playback core for Lottie animations.
//!
//! Loads compositions from files, bundles, resources or URLs, and drives
//! their playback from host frame callbacks into a [`Renderer`].

pub mod animation;
pub mod clip;
pub mod composition;
pub mod config;
pub mod driver;
pub mod error;
pub mod images;
pub mod renderer;
pub mod source;
pub mod state;
pub mod task;

pub use animation::{LottieAnimation, RenderOutcome};
pub use clip::{ClipRange, ClipSpec};
pub use composition::{Bounds, Composition, ImageAsset, Marker};
pub use config::{LoaderConfig, PlaybackConfig};
pub use driver::{FrameOutcome, FrameScheduler, PlaybackDriver, PolledScheduler};
pub use error::{LottieError, Result};
pub use images::{Bitmap, ImageAssetDelegate, ImageAssetManager, PendingImageAssetManager};
pub use renderer::Renderer;
pub use source::{CompositionLoader, CompositionSpec};
pub use state::{AnimationState, PlaybackPhase, INFINITE};
pub use task::{CompositionResult, CompositionTask};
