use std::io::Cursor;

use super::*;

fn temp_dir(tag: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(format!(
        "viewframe_asset_store_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    tmp
}

fn write_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([1u8, 2u8, 3u8, 255u8]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, &buf).unwrap();
}

#[test]
fn zero_dimension_asset_is_invalid() {
    let err = ImageAsset::from_premul_rgba("empty.png", image::RgbaImage::new(0, 10)).unwrap_err();
    assert!(matches!(err, ViewframeError::InvalidAsset { .. }));
}

#[test]
fn open_missing_file_is_asset_not_found() {
    let err = ImageAsset::open("/definitely/not/here/nova.png").unwrap_err();
    assert!(matches!(err, ViewframeError::AssetNotFound { .. }));
}

#[test]
fn prepare_records_successes_and_faults() {
    let tmp = temp_dir("prepare");
    write_png(&tmp.join("nova.png"), 4, 6);
    std::fs::write(tmp.join("corrupt.png"), b"nope").unwrap();

    let store = AssetStore::prepare(
        &tmp,
        ["nova.png", "nova.png", "missing.png", "corrupt.png"],
    );
    assert_eq!(store.len(), 1);

    let nova = store.get("nova.png").unwrap();
    assert_eq!(nova.size(), Size::new(4, 6));
    assert!(matches!(
        store.get("missing.png").unwrap_err(),
        ViewframeError::AssetNotFound { .. }
    ));
    assert!(matches!(
        store.get("corrupt.png").unwrap_err(),
        ViewframeError::InvalidAsset { .. }
    ));
    assert!(matches!(
        store.get("never_listed.png").unwrap_err(),
        ViewframeError::Validation(_)
    ));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn absolute_sources_ignore_root() {
    let store = AssetStore::new("/some/root");
    let abs = std::env::temp_dir().join("x.png");
    assert_eq!(store.resolve(abs.to_str().unwrap()), abs);
    assert_eq!(
        store.resolve("desmos/a.png"),
        Path::new("/some/root").join("desmos/a.png")
    );
}

#[test]
fn insert_overrides_fault() {
    let mut store = AssetStore::prepare("/definitely/not/here", ["a.png"]);
    assert!(store.get("a.png").is_err());
    let asset =
        ImageAsset::from_straight_rgba("a.png", image::RgbaImage::new(2, 2)).unwrap();
    store.insert("a.png", asset);
    assert_eq!(store.get("a.png").unwrap().width(), 2);
}
