use crate::composition::ImageAsset;
use crate::error::{LottieError, Result};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

pub type Bitmap = Arc<RgbaImage>;

/// Host hook for supplying bitmaps the composition cannot resolve itself.
pub trait ImageAssetDelegate: Send + Sync {
    fn fetch_bitmap(&self, asset: &ImageAsset) -> Option<RgbaImage>;
}

/// Resolves the composition's image references to decoded bitmaps.
///
/// Lookup order: host overrides, the delegate, bytes embedded in the
/// composition, then `folder/u/p` on disk. Results are cached by asset id.
pub struct ImageAssetManager {
    folder: Option<PathBuf>,
    delegate: Option<Arc<dyn ImageAssetDelegate>>,
    images: HashMap<String, ImageAsset>,
    bitmap_cache: Mutex<HashMap<String, Bitmap>>,
}

impl ImageAssetManager {
    pub fn new(
        folder: Option<PathBuf>,
        delegate: Option<Arc<dyn ImageAssetDelegate>>,
        images: &[ImageAsset],
    ) -> Self {
        Self {
            folder,
            delegate,
            images: images
                .iter()
                .map(|image| (image.id.clone(), image.clone()))
                .collect(),
            bitmap_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn folder(&self) -> Option<&PathBuf> {
        self.folder.as_ref()
    }

    pub fn asset(&self, id: &str) -> Option<&ImageAsset> {
        self.images.get(id)
    }

    /// Replaces the bitmap for `id`, returning the previous one.
    pub fn update_bitmap(&self, id: &str, bitmap: Option<RgbaImage>) -> Option<Bitmap> {
        let mut cache = self.lock_cache();
        match bitmap {
            Some(bitmap) => cache.insert(id.to_string(), Arc::new(bitmap)),
            None => cache.remove(id),
        }
    }

    /// Decodes (or returns the cached) bitmap for `id`.
    ///
    /// Unknown ids and missing files yield `Ok(None)`; undecodable bytes are
    /// an error.
    pub fn bitmap_for_id(&self, id: &str) -> Result<Option<Bitmap>> {
        if let Some(bitmap) = self.lock_cache().get(id) {
            return Ok(Some(bitmap.clone()));
        }

        let Some(asset) = self.images.get(id) else {
            return Ok(None);
        };

        let decoded = match self.resolve(asset)? {
            Some(bitmap) => bitmap,
            None => {
                tracing::warn!(id, path = %asset.relative_path(), "image asset not found");
                return Ok(None);
            }
        };

        let bitmap = Arc::new(decoded);
        self.lock_cache().insert(id.to_string(), bitmap.clone());
        Ok(Some(bitmap))
    }

    fn resolve(&self, asset: &ImageAsset) -> Result<Option<RgbaImage>> {
        if let Some(delegate) = &self.delegate {
            if let Some(bitmap) = delegate.fetch_bitmap(asset) {
                return Ok(Some(bitmap));
            }
        }

        if let Some(bytes) = &asset.embedded {
            return decode(&asset.id, bytes).map(Some);
        }

        let Some(folder) = &self.folder else {
            return Ok(None);
        };
        let path = folder.join(asset.relative_path());
        match std::fs::read(&path) {
            Ok(bytes) => decode(&asset.id, &bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LottieError::io(path, e)),
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Bitmap>> {
        // The cache only holds finished bitmaps, so a poisoned lock is still usable.
        self.bitmap_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn decode(id: &str, bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| LottieError::Image {
            id: id.to_string(),
            source,
        })
}

/// An asset manager being built on a worker thread.
pub struct PendingImageAssetManager {
    rx: Receiver<ImageAssetManager>,
}

impl PendingImageAssetManager {
    pub fn spawn(
        folder: Option<PathBuf>,
        delegate: Option<Arc<dyn ImageAssetDelegate>>,
        images: Vec<ImageAsset>,
    ) -> Self {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let manager = ImageAssetManager::new(folder, delegate, &images);
            // The receiver is gone if the session moved on.
            let _ = tx.send(manager);
        });
        Self { rx }
    }

    /// `Some` once the manager is ready. A dead worker also yields `None`.
    pub fn try_take(&self) -> Option<ImageAssetManager> {
        match self.rx.try_recv() {
            Ok(manager) => Some(manager),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("image asset manager worker exited without a result");
                None
            }
        }
    }

    /// Blocks until the worker delivers. Used by headless tools and tests.
    pub fn wait(self) -> Option<ImageAssetManager> {
        self.rx.recv().ok()
    }
}
