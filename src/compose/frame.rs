use std::sync::Arc;

use crate::assets::font::{FontResolver, NoFonts};
use crate::assets::store::ImageAsset;
use crate::compose::card::{CardLayoutKind, QuestionCard};
use crate::compose::composite::{self, clamp_premul_in_place, paste_over};
use crate::compose::config::ComposerConfig;
use crate::compose::overlay::OverlayPainter;
use crate::foundation::core::{Placement, Point, Side, Size};
use crate::foundation::error::{ViewframeError, ViewframeResult};
use crate::layout::fit::{Axis, Binding, fit, place_anchored, place_panel};

/// How a character is sized and anchored.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterPose {
    /// Target size as a fraction of the canvas dimension named by `basis`.
    pub scale: f64,
    /// Canvas dimension `scale` applies to.
    pub basis: Axis,
    /// Side the character stands on.
    pub anchor: Side,
    /// Mirror the character horizontally before placing it.
    pub flip: bool,
}

impl Default for CharacterPose {
    fn default() -> Self {
        Self {
            scale: 0.28,
            basis: Axis::Width,
            anchor: Side::Left,
            flip: false,
        }
    }
}

impl CharacterPose {
    /// Rejects a non-finite or non-positive scale.
    pub fn validate(&self) -> ViewframeResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ViewframeError::validation(format!(
                "character scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// A character asset plus its pose.
#[derive(Clone, Debug)]
pub struct CharacterLayer {
    pub asset: Arc<ImageAsset>,
    pub pose: CharacterPose,
}

/// Logo badge: optional image with a two-line caption to its right.
#[derive(Clone, Debug, Default)]
pub struct LogoLayer {
    pub asset: Option<Arc<ImageAsset>>,
    pub title: String,
    pub subtitle: String,
}

/// Everything that goes onto one frame, bottom to top.
#[derive(Clone, Debug, Default)]
pub struct FrameLayers {
    pub background: Option<Arc<ImageAsset>>,
    pub character: Option<CharacterLayer>,
    pub card: Option<QuestionCard>,
    pub logo: Option<LogoLayer>,
}

/// Where each raster layer ended up.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FramePlacements {
    pub background: Option<(Placement, Binding)>,
    pub character: Option<(Placement, Binding)>,
    pub logo: Option<Placement>,
}

/// Composed canvas, premultiplied RGBA8, row-major.
#[derive(Clone, Debug)]
pub struct ComposedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub placements: FramePlacements,
    /// Text runs left out because no font resolved.
    pub skipped_text: usize,
}

impl ComposedFrame {
    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Flatten onto an opaque matte.
    pub fn flatten(&self, matte: crate::foundation::core::Rgba8) -> ViewframeResult<image::RgbImage> {
        let rgb = composite::flatten_onto(&self.data, matte);
        image::RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| ViewframeError::validation("frame buffer size mismatch"))
    }
}

/// Composes tutorial frames on a fixed canvas.
///
/// Paste order is fixed: background, character, card, then the logo badge (image and captions).
#[derive(Clone, Debug)]
pub struct FrameComposer {
    config: ComposerConfig,
    fonts: Arc<dyn FontResolver>,
}

impl FrameComposer {
    /// Build a composer; the config is validated once here.
    pub fn new(config: ComposerConfig, fonts: Arc<dyn FontResolver>) -> ViewframeResult<Self> {
        config.validate()?;
        Ok(Self { config, fonts })
    }

    /// Composer with default config and no text.
    pub fn without_fonts() -> ViewframeResult<Self> {
        Self::new(ComposerConfig::default(), Arc::new(NoFonts))
    }

    /// Validated configuration this composer draws with.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Character over background, the common two-panel case.
    pub fn compose_pair(
        &self,
        character: Arc<ImageAsset>,
        background: Arc<ImageAsset>,
        pose: CharacterPose,
    ) -> ViewframeResult<ComposedFrame> {
        self.compose(&FrameLayers {
            background: Some(background),
            character: Some(CharacterLayer {
                asset: character,
                pose,
            }),
            ..Default::default()
        })
    }

    /// Compose every present layer onto a fresh canvas.
    #[tracing::instrument(skip_all)]
    pub fn compose(&self, layers: &FrameLayers) -> ViewframeResult<ComposedFrame> {
        let cfg = &self.config;
        let canvas = cfg.canvas;
        if let Some(c) = &layers.character {
            c.pose.validate()?;
        }
        if let Some(card) = &layers.card {
            card.validate()?;
        }

        let mut data = vec![0u8; (canvas.width as usize) * (canvas.height as usize) * 4];
        composite::fill(&mut data, cfg.fill);
        let mut placements = FramePlacements::default();

        if let Some(bg) = &layers.background {
            let panel = Size::new(canvas.frac_w(cfg.background.panel_fraction).max(1), canvas.height);
            let f = fit(bg.size(), Axis::Width, panel.width, panel)?;
            let at = place_panel(canvas, f.size, cfg.background.side);
            tracing::debug!(src = %bg.size(), out = %f.size, binding = ?f.binding, x = at.x, y = at.y, "background placed");
            let resized = resize_premul(bg.pixels(), f.size);
            paste_over(&mut data, canvas.width, canvas.height, &resized, at);
            placements.background = Some((at, f.binding));
        }

        if let Some(ch) = &layers.character {
            let style = &cfg.character;
            let pose = ch.pose;
            let margin_x = canvas.frac_w(style.margin_x_fraction);
            let margin_bottom = canvas.frac_h(style.margin_bottom_fraction);
            let target = match pose.basis {
                Axis::Width => canvas.frac_w(pose.scale),
                Axis::Height => canvas.frac_h(pose.scale),
            }
            .max(1);
            let bounds = Size::new(
                canvas.width.saturating_sub(margin_x).max(1),
                canvas.frac_h(style.max_height_fraction).max(1),
            );
            let f = fit(ch.asset.size(), pose.basis, target, bounds)?;
            let at = place_anchored(canvas, f.size, pose.anchor, margin_x, margin_bottom);
            tracing::debug!(src = %ch.asset.size(), out = %f.size, binding = ?f.binding, x = at.x, y = at.y, "character placed");
            let resized = if pose.flip {
                resize_premul(&mirror(ch.asset.pixels()), f.size)
            } else {
                resize_premul(ch.asset.pixels(), f.size)
            };
            paste_over(&mut data, canvas.width, canvas.height, &resized, at);
            placements.character = Some((at, f.binding));
        }

        let mut skipped_text = 0;
        if let Some(card) = &layers.card {
            let metrics = match card.layout {
                CardLayoutKind::SidePanel => &cfg.card.side_panel,
                CardLayoutKind::FullWidth => &cfg.card.full_width,
            };
            let mut painter = OverlayPainter::new(canvas, self.fonts.as_ref())?;
            painter.draw_card(card, metrics, &cfg.card.palette)?;
            skipped_text += painter.skipped_text();
            composite::over_in_place(&mut data, &painter.finish()?)?;
        }

        if let Some(logo) = &layers.logo {
            let s = &cfg.logo;
            let mut caption_x = s.margin_px;
            if let Some(asset) = &logo.asset {
                let f = fit(asset.size(), Axis::Height, s.height_px, canvas.size())?;
                let at = Placement {
                    x: i64::from(s.margin_px),
                    y: i64::from(s.margin_px),
                    width: f.size.width,
                    height: f.size.height,
                };
                let resized = resize_premul(asset.pixels(), f.size);
                paste_over(&mut data, canvas.width, canvas.height, &resized, at);
                placements.logo = Some(at);
                caption_x = s.margin_px + f.size.width + s.gap_px;
            }

            if !(logo.title.is_empty() && logo.subtitle.is_empty()) {
                let mut painter = OverlayPainter::new(canvas, self.fonts.as_ref())?;
                let x = f64::from(caption_x);
                let top = f64::from(s.margin_px);
                painter.text_at(
                    &logo.title,
                    Point::new(x, top + f64::from(s.title_offset_y)),
                    s.title_size,
                    s.title_color,
                )?;
                painter.text_at(
                    &logo.subtitle,
                    Point::new(x, top + f64::from(s.subtitle_offset_y)),
                    s.subtitle_size,
                    s.subtitle_color,
                )?;
                skipped_text += painter.skipped_text();
                composite::over_in_place(&mut data, &painter.finish()?)?;
            }
        }

        if skipped_text > 0 {
            tracing::warn!(skipped = skipped_text, "no font available; text left out");
        }

        Ok(ComposedFrame {
            width: canvas.width,
            height: canvas.height,
            data,
            placements,
            skipped_text,
        })
    }
}

/// Horizontally mirrored copy.
pub fn mirror(img: &image::RgbaImage) -> image::RgbaImage {
    image::imageops::flip_horizontal(img)
}

/// Lanczos3 resize of a premultiplied raster. Returns the input unchanged when sizes match.
pub fn resize_premul(img: &image::RgbaImage, size: Size) -> image::RgbaImage {
    if img.dimensions() == (size.width, size.height) {
        return img.clone();
    }
    let mut out = image::imageops::resize(
        img,
        size.width,
        size.height,
        image::imageops::FilterType::Lanczos3,
    );
    clamp_premul_in_place(&mut out);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;
