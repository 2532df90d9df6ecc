use crate::composition::Composition;
use crate::error::{LottieError, Result};
use serde::{Deserialize, Serialize};

/// Sub-interval of progress that playback loops within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipRange {
    min: f32,
    max: f32,
}

impl ClipRange {
    pub const FULL: ClipRange = ClipRange { min: 0.0, max: 1.0 };

    pub fn new(min: f32, max: f32) -> Result<Self> {
        let valid = min.is_finite() && max.is_finite() && 0.0 <= min && min <= max && max <= 1.0;
        if !valid {
            return Err(LottieError::InvalidClipRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn clamp(&self, progress: f32) -> f32 {
        progress.clamp(self.min, self.max)
    }
}

impl Default for ClipRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Ways of describing a clip before a composition is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipSpec {
    Progress {
        min: f32,
        max: f32,
    },
    Frames {
        #[serde(default)]
        min: Option<f32>,
        #[serde(default)]
        max: Option<f32>,
    },
    /// Plays from the marker's start frame to its end frame.
    Marker { name: String },
    /// Plays from the start of `min` to the start of `max`.
    Markers { min: String, max: String },
}

impl ClipSpec {
    pub fn resolve(&self, composition: &Composition) -> Result<ClipRange> {
        match self {
            ClipSpec::Progress { min, max } => ClipRange::new(*min, *max),
            ClipSpec::Frames { min, max } => {
                let min = min.map_or(0.0, |f| composition.progress_for_frame(f));
                let max = max.map_or(1.0, |f| composition.progress_for_frame(f));
                ClipRange::new(min, max)
            }
            ClipSpec::Marker { name } => {
                let marker = lookup_marker(composition, name)?;
                ClipRange::new(
                    composition.progress_for_frame(marker.start_frame),
                    composition.progress_for_frame(marker.end_frame()),
                )
            }
            ClipSpec::Markers { min, max } => {
                let start = lookup_marker(composition, min)?.start_frame;
                let end = lookup_marker(composition, max)?.start_frame;
                ClipRange::new(
                    composition.progress_for_frame(start),
                    composition.progress_for_frame(end),
                )
            }
        }
    }
}

fn lookup_marker<'a>(
    composition: &'a Composition,
    name: &str,
) -> Result<&'a crate::composition::Marker> {
    composition
        .marker(name)
        .ok_or_else(|| LottieError::UnknownMarker(name.to_string()))
}
