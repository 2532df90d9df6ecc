use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LottieError>;

#[derive(Debug, Error)]
pub enum LottieError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid animation json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid zip bundle: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("zip bundle has no animation json entry")]
    MissingJson,

    #[error("no raw resource registered for id {0}")]
    UnknownResource(u32),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("url sources need the `http` feature")]
    HttpDisabled,

    #[error("invalid composition: {0}")]
    InvalidComposition(String),

    #[error("clip range [{min}, {max}] must satisfy 0 <= min <= max <= 1")]
    InvalidClipRange { min: f32, max: f32 },

    #[error("speed must be finite, got {0}")]
    InvalidSpeed(f32),

    #[error("repeat count must be -1 (infinite) or >= 0, got {0}")]
    InvalidRepeatCount(i32),

    #[error("composition has no marker named '{0}'")]
    UnknownMarker(String),

    #[error("failed to decode image asset '{id}': {source}")]
    Image {
        id: String,
        #[source]
        source: image::ImageError,
    },
}

impl LottieError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LottieError::Io {
            path: path.into(),
            source,
        }
    }
}
