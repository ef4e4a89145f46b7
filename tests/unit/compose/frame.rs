use super::*;
use crate::assets::font::FontBytes;
use crate::compose::card::{CardLayout, CardMode};
use crate::foundation::core::{Canvas, Rgba8};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Arc<ImageAsset> {
    Arc::new(
        ImageAsset::from_straight_rgba("solid.png", image::RgbaImage::from_pixel(w, h, image::Rgba(rgba)))
            .unwrap(),
    )
}

fn close(px: [u8; 4], want: Rgba8) -> bool {
    px.iter()
        .zip(want.to_array())
        .all(|(a, b)| a.abs_diff(b) <= 2)
}

#[test]
fn output_is_exactly_canvas_sized() {
    let composer = FrameComposer::without_fonts().unwrap();
    for (cw, ch, bw, bh) in [(800, 1200, 1600, 900), (10, 4000, 5000, 7), (1, 1, 1, 1)] {
        let frame = composer
            .compose_pair(solid(cw, ch, [0, 0, 255, 255]), solid(bw, bh, [255, 0, 0, 255]), CharacterPose::default())
            .unwrap();
        assert_eq!((frame.width, frame.height), (1920, 1080));
        assert_eq!(frame.data.len(), 1920 * 1080 * 4);
        let (bg, _) = frame.placements.background.unwrap();
        let (chr, _) = frame.placements.character.unwrap();
        assert!(bg.within(Canvas::HD), "{bg:?}");
        assert!(chr.within(Canvas::HD), "{chr:?}");
    }
}

#[test]
fn tutorial_pair_lands_in_expected_panels() {
    let composer = FrameComposer::without_fonts().unwrap();
    let frame = composer
        .compose_pair(
            solid(800, 1200, [0, 0, 255, 255]),
            solid(1600, 900, [255, 0, 0, 255]),
            CharacterPose::default(),
        )
        .unwrap();

    let (bg, bg_binding) = frame.placements.background.unwrap();
    assert_eq!(bg_binding, Binding::Target);
    assert_eq!((bg.x, bg.y, bg.width, bg.height), (672, 189, 1248, 702));

    let (chr, _) = frame.placements.character.unwrap();
    assert_eq!((chr.x, chr.y, chr.width, chr.height), (38, 221, 537, 805));
    assert!(chr.height <= 972);

    assert!(close(frame.pixel(300, 500).unwrap(), Rgba8::rgb(0, 0, 255)));
    assert!(close(frame.pixel(1500, 500).unwrap(), Rgba8::rgb(255, 0, 0)));
    assert!(close(frame.pixel(1000, 100).unwrap(), Rgba8::WHITE));
}

#[test]
fn character_is_drawn_over_background() {
    let mut config = ComposerConfig::default();
    config.background.panel_fraction = 1.0;
    let composer = FrameComposer::new(config, Arc::new(NoFonts)).unwrap();
    let frame = composer
        .compose_pair(
            solid(800, 1200, [0, 255, 0, 255]),
            solid(1920, 1080, [255, 0, 0, 255]),
            CharacterPose::default(),
        )
        .unwrap();
    assert!(close(frame.pixel(300, 600).unwrap(), Rgba8::rgb(0, 255, 0)));
    assert!(close(frame.pixel(1800, 600).unwrap(), Rgba8::rgb(255, 0, 0)));
}

#[test]
fn right_anchor_mirrors_placement() {
    let composer = FrameComposer::without_fonts().unwrap();
    let pose = CharacterPose {
        anchor: Side::Right,
        ..CharacterPose::default()
    };
    let frame = composer
        .compose(&FrameLayers {
            character: Some(CharacterLayer {
                asset: solid(800, 1200, [0, 0, 0, 255]),
                pose,
            }),
            ..Default::default()
        })
        .unwrap();
    let (chr, _) = frame.placements.character.unwrap();
    assert_eq!(chr.right(), 1920 - 38);
}

#[test]
fn double_mirror_is_identity() {
    let mut img = image::RgbaImage::new(5, 3);
    for (i, p) in img.pixels_mut().enumerate() {
        *p = image::Rgba([i as u8, (i * 3) as u8, 7, 255]);
    }
    let once = mirror(&img);
    assert_ne!(once, img);
    assert_eq!(mirror(&once), img);
}

#[test]
fn non_positive_scale_is_rejected() {
    let composer = FrameComposer::without_fonts().unwrap();
    for scale in [0.0, -0.5, f64::NAN] {
        let err = composer
            .compose_pair(
                solid(10, 10, [0, 0, 0, 255]),
                solid(10, 10, [0, 0, 0, 255]),
                CharacterPose {
                    scale,
                    ..CharacterPose::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ViewframeError::Validation(_)));
    }
}

fn marker_centers() -> Vec<(u32, u32)> {
    // Side panel on 1920x1080: left 672, top 86, first row at y 576, rows 70 apart.
    (0..4).map(|i| (732, 594 + i * 70)).collect()
}

#[test]
fn answer_card_marks_only_the_correct_row() {
    let composer = FrameComposer::without_fonts().unwrap();
    let card = QuestionCard::sat_system_of_equations(CardLayoutKind::SidePanel, CardMode::Answer);
    let frame = composer
        .compose(&FrameLayers {
            card: Some(card.clone()),
            ..Default::default()
        })
        .unwrap();

    let palette = &composer.config().card.palette;
    let distinct: Vec<usize> = marker_centers()
        .into_iter()
        .enumerate()
        .filter(|(_, (x, y))| !close(frame.pixel(*x, *y).unwrap(), palette.panel_fill))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(distinct, vec![2]);
    let (x, y) = marker_centers()[2];
    assert!(close(frame.pixel(x, y).unwrap(), palette.correct_fill));
    assert!(frame.skipped_text > 0);
}

#[test]
fn question_card_rows_are_all_neutral() {
    let composer = FrameComposer::without_fonts().unwrap();
    let card = QuestionCard::sat_system_of_equations(CardLayoutKind::SidePanel, CardMode::Question);
    let frame = composer
        .compose(&FrameLayers {
            card: Some(card),
            ..Default::default()
        })
        .unwrap();
    let fill = composer.config().card.palette.panel_fill;
    for (x, y) in marker_centers() {
        assert!(close(frame.pixel(x, y).unwrap(), fill));
    }
}

#[test]
fn answer_card_with_two_correct_rows_is_rejected() {
    let composer = FrameComposer::without_fonts().unwrap();
    let mut card = QuestionCard::sat_system_of_equations(CardLayoutKind::FullWidth, CardMode::Answer);
    card.choices[0].correct = true;
    let err = composer
        .compose(&FrameLayers {
            card: Some(card),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ViewframeError::Validation(_)));
}

#[test]
fn logo_is_scaled_to_badge_height() {
    let composer = FrameComposer::without_fonts().unwrap();
    let frame = composer
        .compose(&FrameLayers {
            logo: Some(LogoLayer {
                asset: Some(solid(200, 100, [10, 20, 30, 255])),
                title: "Brand".to_string(),
                subtitle: "SAT Prep".to_string(),
            }),
            ..Default::default()
        })
        .unwrap();
    let logo = frame.placements.logo.unwrap();
    assert_eq!((logo.x, logo.y, logo.width, logo.height), (20, 20, 160, 80));
    assert!(close(frame.pixel(100, 60).unwrap(), Rgba8::rgb(10, 20, 30)));
    assert_eq!(frame.skipped_text, 2);
}

#[test]
fn transparent_fill_flattens_onto_matte() {
    let mut config = ComposerConfig::default();
    config.fill = Rgba8::TRANSPARENT;
    config.matte = Rgba8::rgb(1, 2, 3);
    let composer = FrameComposer::new(config, Arc::new(NoFonts)).unwrap();
    let frame = composer.compose(&FrameLayers::default()).unwrap();
    let rgb = frame.flatten(composer.config().matte).unwrap();
    assert_eq!(rgb.dimensions(), (1920, 1080));
    assert_eq!(rgb.get_pixel(0, 0).0, [1, 2, 3]);
}

#[test]
fn logo_badge_sits_above_full_width_card() {
    let composer = FrameComposer::without_fonts().unwrap();
    let frame = composer
        .compose(&FrameLayers {
            card: Some(QuestionCard::sat_system_of_equations(
                CardLayoutKind::FullWidth,
                CardMode::Question,
            )),
            logo: Some(LogoLayer {
                asset: Some(solid(200, 100, [10, 20, 30, 255])),
                title: String::new(),
                subtitle: String::new(),
            }),
            ..Default::default()
        })
        .unwrap();
    let logo = frame.placements.logo.unwrap();
    assert_eq!((logo.x, logo.y, logo.width, logo.height), (20, 20, 160, 80));
    // Inside both the logo and the card panel (which starts at 96,86).
    assert!(close(frame.pixel(150, 95).unwrap(), Rgba8::rgb(10, 20, 30)));
    assert!(close(frame.pixel(170, 99).unwrap(), Rgba8::rgb(10, 20, 30)));
    let fill = composer.config().card.palette.panel_fill;
    assert!(close(frame.pixel(150, 120).unwrap(), fill));
}

fn fixture_composer() -> FrameComposer {
    let bytes = std::fs::read("tests/data/fonts/DejaVuSans.ttf").unwrap();
    FrameComposer::new(ComposerConfig::default(), Arc::new(FontBytes::new(bytes))).unwrap()
}

fn near(px: [u8; 4], want: Rgba8, tol: u8) -> bool {
    px.iter()
        .zip(want.to_array())
        .all(|(a, b)| a.abs_diff(b) <= tol)
}

#[test]
fn answer_text_is_green_only_on_the_correct_row() {
    let composer = fixture_composer();
    let card = QuestionCard::sat_system_of_equations(CardLayoutKind::SidePanel, CardMode::Answer);
    let frame = composer
        .compose(&FrameLayers {
            card: Some(card.clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(frame.skipped_text, 0);

    let metrics = &composer.config().card.side_panel;
    let green = composer.config().card.palette.correct_fill;
    let layout = CardLayout::compute(Canvas::HD, metrics, &card);
    let right = layout.panel.x1 as u32;
    let green_per_row: Vec<usize> = layout
        .rows
        .iter()
        .map(|row| {
            // Text only: start right of the marker circle.
            let x0 = row.value.x as u32 - 2;
            let y0 = row.value.y as u32;
            let mut n = 0;
            for y in y0..y0 + metrics.choice_spacing {
                for x in x0..right {
                    if near(frame.pixel(x, y).unwrap(), green, 12) {
                        n += 1;
                    }
                }
            }
            n
        })
        .collect();

    assert_eq!(green_per_row.len(), 4);
    for (i, n) in green_per_row.iter().enumerate() {
        if i == 2 {
            assert!(*n > 50, "correct row has too little green text: {n}");
        } else {
            assert_eq!(*n, 0, "row {i} has green pixels");
        }
    }
}

#[test]
fn full_width_equations_are_centred_on_the_panel() {
    let composer = fixture_composer();
    let card = QuestionCard::sat_system_of_equations(CardLayoutKind::FullWidth, CardMode::Question);
    let frame = composer
        .compose(&FrameLayers {
            card: Some(card.clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(frame.skipped_text, 0);

    let metrics = &composer.config().card.full_width;
    let layout = CardLayout::compute(Canvas::HD, metrics, &card);
    let (left, right) = (layout.panel.x0 as u32, layout.panel.x1 as u32);
    let center = (layout.panel.x0 + layout.panel.x1) / 2.0;

    for origin in &layout.equations {
        let y0 = origin.y as u32;
        let mut ink: Option<(u32, u32)> = None;
        for y in y0..y0 + metrics.equation_spacing {
            for x in left..right {
                let [r, g, b, _] = frame.pixel(x, y).unwrap();
                if r < 90 && g < 90 && b < 90 {
                    ink = Some(match ink {
                        Some((lo, hi)) => (lo.min(x), hi.max(x)),
                        None => (x, x),
                    });
                }
            }
        }
        let (lo, hi) = ink.expect("equation line has no ink");
        let mid = f64::from(lo + hi) / 2.0;
        assert!((mid - center).abs() <= 8.0, "ink {lo}..{hi} centred at {mid}, panel at {center}");
        assert!(f64::from(lo) > layout.panel.x0 + f64::from(metrics.equation_indent));
    }
}

#[test]
fn unusable_first_font_candidate_falls_through_to_the_next() {
    let dir = std::env::temp_dir().join(format!("viewframe_frame_fonts_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let bad = dir.join("bad.ttf");
    std::fs::write(&bad, b"not a font").unwrap();

    let fonts = crate::assets::font::FontCandidates::new([
        bad,
        std::path::PathBuf::from("tests/data/fonts/DejaVuSans.ttf"),
    ]);
    let composer = FrameComposer::new(ComposerConfig::default(), Arc::new(fonts)).unwrap();
    let frame = composer
        .compose(&FrameLayers {
            card: Some(QuestionCard::sat_system_of_equations(
                CardLayoutKind::SidePanel,
                CardMode::Question,
            )),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(frame.skipped_text, 0);

    std::fs::remove_dir_all(&dir).ok();
}
