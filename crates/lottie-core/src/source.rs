use crate::composition::Composition;
use crate::config::LoaderConfig;
use crate::error::{LottieError, Result};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Where a composition comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompositionSpec {
    /// Id in the loader's raw resource table.
    RawRes(u32),
    Url(String),
    /// Files ending in `zip` are bundles, anything else is plain JSON.
    File(PathBuf),
    /// Name relative to the loader's assets directory.
    Asset(String),
}

impl CompositionSpec {
    pub fn cache_key(&self) -> String {
        match self {
            CompositionSpec::RawRes(id) => format!("raw:{id}"),
            CompositionSpec::Url(url) => format!("url:{url}"),
            CompositionSpec::File(path) => format!("file:{}", path.display()),
            CompositionSpec::Asset(name) => format!("asset:{name}"),
        }
    }
}

impl fmt::Display for CompositionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// `res:<id>`, `asset:<name>`, `http(s)://...`, otherwise a file path.
impl FromStr for CompositionSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("res:").and_then(|id| id.parse().ok()) {
            return Ok(CompositionSpec::RawRes(id));
        }
        if let Some(name) = s.strip_prefix("asset:") {
            return Ok(CompositionSpec::Asset(name.to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(CompositionSpec::Url(s.to_string()));
        }
        Ok(CompositionSpec::File(PathBuf::from(s)))
    }
}

/// Loads compositions from any [`CompositionSpec`], caching parsed results.
pub struct CompositionLoader {
    config: LoaderConfig,
    cache: Mutex<HashMap<String, Arc<Composition>>>,
}

impl CompositionLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn load(&self, spec: &CompositionSpec) -> Result<Arc<Composition>> {
        let key = spec.cache_key();
        if self.config.cache {
            if let Some(hit) = self.lock_cache().get(&key) {
                tracing::debug!(%key, "composition cache hit");
                return Ok(hit.clone());
            }
        }

        let composition = Arc::new(self.load_uncached(spec)?);
        tracing::info!(
            %key,
            frames = composition.duration_frames(),
            duration_ms = composition.duration_ms(),
            images = composition.images().len(),
            "loaded composition"
        );

        if self.config.cache {
            self.lock_cache().insert(key, composition.clone());
        }
        Ok(composition)
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn load_uncached(&self, spec: &CompositionSpec) -> Result<Composition> {
        match spec {
            CompositionSpec::RawRes(id) => {
                let path = self
                    .config
                    .resources
                    .get(id)
                    .ok_or(LottieError::UnknownResource(*id))?;
                let bytes = read_file(path)?;
                parse_bytes(&bytes)
            }
            CompositionSpec::Url(url) => {
                let bytes = self.fetch_url(url)?;
                parse_bytes(&bytes)
            }
            CompositionSpec::File(path) => {
                let bytes = read_file(path)?;
                if path.to_string_lossy().ends_with("zip") {
                    parse_zip(Cursor::new(bytes))
                } else {
                    Composition::from_json_slice(&bytes)
                }
            }
            CompositionSpec::Asset(name) => {
                let path = self.config.assets_dir.join(name);
                let bytes = read_file(&path)?;
                if name.ends_with(".zip") {
                    parse_zip(Cursor::new(bytes))
                } else {
                    Composition::from_json_slice(&bytes)
                }
            }
        }
    }

    #[cfg(feature = "http")]
    fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.http_timeout_secs))
            .build()
            .map_err(|e| LottieError::Http(e.to_string()))?;
        let resp = client
            .get(url)
            .send()
            .map_err(|e| LottieError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(LottieError::Http(format!("{url}: {}", resp.status())));
        }
        let bytes = resp.bytes().map_err(|e| LottieError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    fn fetch_url(&self, _url: &str) -> Result<Vec<u8>> {
        Err(LottieError::HttpDisabled)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Composition>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CompositionLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| LottieError::io(path, e))
}

/// Sniffs the zip magic so sources without a file name still work.
fn parse_bytes(bytes: &[u8]) -> Result<Composition> {
    if bytes.starts_with(ZIP_MAGIC) {
        parse_zip(Cursor::new(bytes))
    } else {
        Composition::from_json_slice(bytes)
    }
}

/// Reads a bundle: the first `.json` entry is the animation, image entries
/// are attached to the matching assets by file name.
pub fn parse_zip<R: Read + Seek>(reader: R) -> Result<Composition> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut json: Option<Vec<u8>> = None;
    let mut images: HashMap<String, Arc<Vec<u8>>> = HashMap::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name.starts_with("__MACOSX/") {
            continue;
        }

        let lower = name.to_ascii_lowercase();
        let file_name = name.rsplit('/').next().unwrap_or(&name).to_string();
        if lower.ends_with(".json") {
            if json.is_none() {
                let mut buf = Vec::new();
                entry
                    .read_to_end(&mut buf)
                    .map_err(|e| LottieError::io(&name, e))?;
                json = Some(buf);
            }
        } else if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| LottieError::io(&name, e))?;
            images.insert(file_name, Arc::new(buf));
        }
    }

    let json = json.ok_or(LottieError::MissingJson)?;
    let mut composition = Composition::from_json_slice(&json)?;
    composition.attach_embedded_images(&images);
    Ok(composition)
}
