use crate::error::{LottieError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use lottie_data::model::{self as data, LottieJson};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

/// An image referenced by the composition.
///
/// `embedded` holds encoded bytes (PNG/JPG/WebP) when the document carries a
/// data URI or the image came out of a zip bundle.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub dir_name: String,
    pub embedded: Option<Arc<Vec<u8>>>,
}

impl ImageAsset {
    fn from_model(asset: &data::Asset) -> Option<Self> {
        if !asset.is_image() {
            return None;
        }
        let p = asset.p.clone()?;
        let embedded = decode_data_uri(&p).map(Arc::new);
        let file_name = if embedded.is_some() { String::new() } else { p };

        Some(Self {
            id: asset.id.clone(),
            width: asset.w.unwrap_or(0),
            height: asset.h.unwrap_or(0),
            file_name,
            dir_name: asset.u.clone().unwrap_or_default(),
            embedded,
        })
    }

    /// Relative path of the image on disk, `u` joined with `p`.
    pub fn relative_path(&self) -> String {
        format!("{}{}", self.dir_name, self.file_name)
    }
}

fn decode_data_uri(p: &str) -> Option<Vec<u8>> {
    if !p.starts_with("data:") || !p.contains(";base64,") {
        return None;
    }
    let (_, payload) = p.split_once(',')?;
    BASE64_STANDARD.decode(payload).ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub start_frame: f32,
    pub duration_frames: f32,
}

impl Marker {
    pub fn end_frame(&self) -> f32 {
        self.start_frame + self.duration_frames
    }
}

/// Immutable metadata of a parsed animation.
#[derive(Debug, Clone)]
pub struct Composition {
    name: Option<String>,
    version: Option<String>,
    bounds: Bounds,
    start_frame: f32,
    end_frame: f32,
    frame_rate: f32,
    images: Vec<ImageAsset>,
    markers: Vec<Marker>,
    layer_count: usize,
}

impl Composition {
    pub fn from_model(model: LottieJson) -> Result<Self> {
        if !(model.fr.is_finite() && model.fr > 0.0) {
            return Err(LottieError::InvalidComposition(format!(
                "frame rate must be positive, got {}",
                model.fr
            )));
        }
        if !(model.ip.is_finite() && model.op.is_finite()) || model.op < model.ip {
            return Err(LottieError::InvalidComposition(format!(
                "out point {} precedes in point {}",
                model.op, model.ip
            )));
        }

        let images = model
            .assets
            .iter()
            .filter_map(ImageAsset::from_model)
            .collect();

        let markers = model
            .markers
            .iter()
            .map(|m| Marker {
                name: m.cm.clone().unwrap_or_default(),
                start_frame: m.tm.unwrap_or(0.0),
                duration_frames: m.dr.unwrap_or(0.0),
            })
            .collect();

        Ok(Self {
            name: model.nm,
            version: model.v,
            bounds: Bounds {
                width: model.w,
                height: model.h,
            },
            start_frame: model.ip,
            end_frame: model.op,
            frame_rate: model.fr,
            images,
            markers,
            layer_count: model.layers.len(),
        })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_model(LottieJson::from_slice(bytes)?)
    }

    /// Attaches bundle-provided image bytes, matched by file name.
    pub(crate) fn attach_embedded_images(&mut self, files: &HashMap<String, Arc<Vec<u8>>>) {
        for image in &mut self.images {
            if image.embedded.is_some() {
                continue;
            }
            if let Some(bytes) = files.get(&image.file_name) {
                image.embedded = Some(bytes.clone());
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn start_frame(&self) -> f32 {
        self.start_frame
    }

    pub fn end_frame(&self) -> f32 {
        self.end_frame
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn duration_frames(&self) -> f32 {
        self.end_frame - self.start_frame
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        self.duration_frames() / self.frame_rate * 1000.0
    }

    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Marker lookup, tolerating the trailing CR/LF some exporters append.
    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| m.name.trim_end_matches(['\r', '\n']) == name)
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Progress of `frame` in the composition, clamped to [0, 1].
    pub fn progress_for_frame(&self, frame: f32) -> f32 {
        let span = self.duration_frames();
        if span <= 0.0 {
            return 0.0;
        }
        ((frame - self.start_frame) / span).clamp(0.0, 1.0)
    }

    /// `floor(lerp(start_frame, end_frame, progress))` over the full frame
    /// range; a clip never narrows the lerp, it only sets renderer bounds.
    pub fn frame_for_progress(&self, progress: f32) -> i32 {
        lerp(self.start_frame, self.end_frame, progress).floor() as i32
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
