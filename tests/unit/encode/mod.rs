use super::*;
use crate::compose::frame::FramePlacements;

fn frame(w: u32, h: u32, px: [u8; 4]) -> ComposedFrame {
    ComposedFrame {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        placements: FramePlacements::default(),
        skipped_text: 0,
    }
}

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let tmp = std::env::temp_dir().join(format!(
        "viewframe_encode_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    tmp
}

#[test]
fn format_from_extension() {
    assert_eq!(OutputFormat::from_path(Path::new("view1.png")).unwrap(), OutputFormat::Png);
    assert_eq!(OutputFormat::from_path(Path::new("a/screen.JPG")).unwrap(), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_path(Path::new("x.jpeg")).unwrap(), OutputFormat::Jpeg);
    assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    assert!(OutputFormat::from_path(Path::new("x.gif")).is_err());
}

#[test]
fn png_is_lossless_and_flattened() {
    // Half-transparent premultiplied red over a white matte.
    let f = frame(4, 2, [128, 0, 0, 128]);
    let bytes = encode_frame(&f, OutputFormat::Png, Rgba8::WHITE, 95).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 1).0, [255, 127, 127]);
}

#[test]
fn jpeg_has_soi_marker_and_size() {
    let f = frame(16, 8, [0, 0, 255, 255]);
    let bytes = encode_frame(&f, OutputFormat::Jpeg, Rgba8::WHITE, 95).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (16, 8));
}

#[test]
fn write_creates_parent_dirs() {
    let dir = temp_dir("nested");
    let out = dir.join("a/b/view1.png");
    let fmt = write_frame(&frame(2, 2, [0, 0, 0, 255]), &out, None, Rgba8::WHITE, 95).unwrap();
    assert_eq!(fmt, OutputFormat::Png);
    assert!(out.is_file());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unwritable_output_is_write_error() {
    let dir = temp_dir("blocked");
    let blocker = dir.join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let out = blocker.join("view.png");
    let err = write_frame(&frame(2, 2, [0, 0, 0, 255]), &out, None, Rgba8::WHITE, 95).unwrap_err();
    assert!(matches!(err, ViewframeError::Write { .. }));
    let _ = std::fs::remove_dir_all(dir);
}
