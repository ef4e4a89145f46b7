use super::*;

#[test]
fn no_fonts_never_resolves() {
    assert!(NoFonts.resolve_font(36.0).is_none());
}

#[test]
fn font_bytes_carry_size_hint() {
    let r = FontBytes::new(vec![1, 2, 3]);
    let h = r.resolve_font(42.0).unwrap();
    assert_eq!(h.bytes(), &[1, 2, 3]);
    assert_eq!(h.size_px(), 42.0);
}

const FIXTURE_FONT: &str = "tests/data/fonts/DejaVuSans.ttf";

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("viewframe_font_{tag}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn candidates_pick_first_readable_and_cache() {
    let dir = temp_dir("cache");
    let second = dir.join("second.ttf");
    std::fs::copy(FIXTURE_FONT, &second).unwrap();
    let want = std::fs::read(FIXTURE_FONT).unwrap();

    let r = FontCandidates::new([dir.join("missing.ttf"), second.clone()]);
    assert_eq!(r.resolve_font(10.0).unwrap().bytes(), want.as_slice());

    std::fs::remove_file(&second).unwrap();
    assert_eq!(r.resolve_font(20.0).unwrap().bytes(), want.as_slice());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn candidates_skip_files_that_are_not_fonts() {
    let dir = temp_dir("garbage");
    let bad = dir.join("bad.ttf");
    std::fs::write(&bad, b"not a font").unwrap();
    let empty = dir.join("empty.ttf");
    std::fs::write(&empty, b"").unwrap();

    let r = FontCandidates::new([bad.clone(), empty.clone(), PathBuf::from(FIXTURE_FONT)]);
    let h = r.resolve_font(24.0).unwrap();
    assert_eq!(h.bytes(), std::fs::read(FIXTURE_FONT).unwrap().as_slice());

    let only_bad = FontCandidates::new([bad, empty]);
    assert!(only_bad.resolve_font(24.0).is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn candidates_with_nothing_readable_yield_none() {
    let r = FontCandidates::new(["/definitely/not/a/font.ttf"]);
    assert!(r.resolve_font(12.0).is_none());
}
