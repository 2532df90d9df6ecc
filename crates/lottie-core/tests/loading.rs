// Composition loading from files, bundles, assets and resources.

use image::{ImageFormat, Rgba, RgbaImage};
use lottie_core::{
    CompositionLoader, CompositionResult, CompositionSpec, CompositionTask, LoaderConfig,
    LottieError,
};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::write::SimpleFileOptions;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pulse.json")
}

const WITH_IMAGE: &str = r#"{
    "fr": 24, "ip": 0, "op": 48, "w": 32, "h": 32, "layers": [],
    "assets": [{ "id": "image_0", "w": 2, "h": 2, "u": "images/", "p": "img_0.png" }]
}"#;

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn write_bundle(path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    zip.start_file("__MACOSX/._data.json", options).unwrap();
    zip.write_all(b"not json").unwrap();
    zip.start_file("data.json", options).unwrap();
    zip.write_all(WITH_IMAGE.as_bytes()).unwrap();
    zip.start_file("images/img_0.png", options).unwrap();
    zip.write_all(&png_bytes()).unwrap();
    zip.finish().unwrap();
}

fn loader_without_cache() -> CompositionLoader {
    CompositionLoader::new(LoaderConfig {
        cache: false,
        ..LoaderConfig::default()
    })
}

#[test]
fn loads_plain_json_file() {
    let comp = loader_without_cache()
        .load(&CompositionSpec::File(fixture()))
        .unwrap();
    assert_eq!(comp.name(), Some("pulse"));
    assert_eq!(comp.duration_ms(), 2000.0);
    assert_eq!(comp.markers().len(), 2);
    assert_eq!(comp.layer_count(), 1);
}

#[test]
fn loads_zip_bundle_with_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.zip");
    write_bundle(&path);

    let comp = loader_without_cache()
        .load(&CompositionSpec::File(path))
        .unwrap();
    assert_eq!(comp.duration_ms(), 2000.0);
    let image = &comp.images()[0];
    assert_eq!(image.embedded.as_deref(), Some(&png_bytes()));

    let manager = lottie_core::ImageAssetManager::new(None, None, comp.images());
    let bitmap = manager.bitmap_for_id("image_0").unwrap().unwrap();
    assert_eq!(bitmap.dimensions(), (2, 2));
}

#[test]
fn zip_without_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.zip");
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file("readme.txt", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"hi").unwrap();
    zip.finish().unwrap();

    let err = loader_without_cache()
        .load(&CompositionSpec::File(path))
        .unwrap_err();
    assert!(matches!(err, LottieError::MissingJson));
}

#[test]
fn resolves_assets_and_raw_resources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture(), dir.path().join("pulse.json")).unwrap();
    write_bundle(&dir.path().join("bundle.zip"));

    let mut config = LoaderConfig {
        assets_dir: dir.path().to_path_buf(),
        cache: false,
        ..LoaderConfig::default()
    };
    config.resources.insert(7, dir.path().join("bundle.zip"));
    let loader = CompositionLoader::new(config);

    let asset = loader
        .load(&CompositionSpec::Asset("pulse.json".into()))
        .unwrap();
    assert_eq!(asset.name(), Some("pulse"));

    let bundled = loader
        .load(&CompositionSpec::Asset("bundle.zip".into()))
        .unwrap();
    assert!(bundled.has_images());

    // Raw resources are sniffed, not judged by extension.
    let raw = loader.load(&CompositionSpec::RawRes(7)).unwrap();
    assert!(raw.images()[0].embedded.is_some());
}

#[test]
fn missing_file_reports_path() {
    let err = loader_without_cache()
        .load(&CompositionSpec::File("does/not/exist.json".into()))
        .unwrap_err();
    match err {
        LottieError::Io { path, .. } => assert_eq!(path, PathBuf::from("does/not/exist.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cache_returns_the_same_composition() {
    let loader = CompositionLoader::default();
    let spec = CompositionSpec::File(fixture());
    let a = loader.load(&spec).unwrap();
    let b = loader.load(&spec).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    loader.clear_cache();
    let c = loader.load(&spec).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn task_delivers_success() {
    let loader = Arc::new(CompositionLoader::default());
    let mut task = CompositionTask::spawn(loader, CompositionSpec::File(fixture()));
    match task.wait() {
        CompositionResult::Success(comp) => assert_eq!(comp.name(), Some("pulse")),
        other => panic!("expected success, got {other:?}"),
    }
    assert!(task.poll().composition().is_some());
}

#[test]
fn task_delivers_failure() {
    let loader = Arc::new(CompositionLoader::default());
    let mut task = CompositionTask::spawn(loader, CompositionSpec::RawRes(404));
    let result = task.wait();
    assert!(matches!(
        result.error(),
        Some(LottieError::UnknownResource(404))
    ));
}

#[test]
fn disposed_task_stays_loading() {
    let loader = Arc::new(CompositionLoader::default());
    let mut task = CompositionTask::spawn(loader, CompositionSpec::File(fixture()));
    task.dispose();
    assert!(task.wait().is_loading());
    assert!(task.poll().is_loading());
}
