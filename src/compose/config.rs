use crate::compose::card::{CardMetrics, CardPalette};
use crate::foundation::core::{Canvas, Rgba8, Side};
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Explicit configuration for [`crate::FrameComposer`].
///
/// Every field has a default matching the 1080p tutorial frames, so manifests only list what they
/// change.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Output canvas size.
    pub canvas: Canvas,
    /// Initial canvas fill. May be transparent.
    pub fill: Rgba8,
    /// Opaque color the canvas is flattened onto before encoding; alpha is ignored.
    pub matte: Rgba8,
    /// JPEG quality used for lossy output.
    pub jpeg_quality: u8,
    /// Background panel geometry.
    pub background: BackgroundStyle,
    /// Character placement limits.
    pub character: CharacterStyle,
    /// Question card colors and metric presets.
    pub card: CardStyle,
    /// Logo badge metrics.
    pub logo: LogoStyle,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD,
            fill: Rgba8::WHITE,
            matte: Rgba8::WHITE,
            jpeg_quality: 95,
            background: BackgroundStyle::default(),
            character: CharacterStyle::default(),
            card: CardStyle::default(),
            logo: LogoStyle::default(),
        }
    }
}

impl ComposerConfig {
    /// Check ranges that would otherwise produce empty or off-canvas panels.
    pub fn validate(&self) -> ViewframeResult<()> {
        self.canvas.validate()?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ViewframeError::validation(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        check_fraction("background.panel_fraction", self.background.panel_fraction, false)?;
        check_fraction(
            "character.max_height_fraction",
            self.character.max_height_fraction,
            false,
        )?;
        check_fraction(
            "character.margin_x_fraction",
            self.character.margin_x_fraction,
            true,
        )?;
        check_fraction(
            "character.margin_bottom_fraction",
            self.character.margin_bottom_fraction,
            true,
        )?;
        if self.character.margin_x_fraction >= 0.5 {
            return Err(ViewframeError::validation(
                "character.margin_x_fraction must be < 0.5",
            ));
        }
        self.card.side_panel.validate("card.side_panel")?;
        self.card.full_width.validate("card.full_width")?;
        if self.logo.height_px == 0 {
            return Err(ViewframeError::validation("logo.height_px must be > 0"));
        }
        Ok(())
    }
}

fn check_fraction(name: &str, v: f64, allow_zero: bool) -> ViewframeResult<()> {
    let lower_ok = if allow_zero { v >= 0.0 } else { v > 0.0 };
    if !v.is_finite() || !lower_ok || v > 1.0 {
        return Err(ViewframeError::validation(format!(
            "{name} must be a fraction in {}..=1, got {v}",
            if allow_zero { "0" } else { "(0" }
        )));
    }
    Ok(())
}

/// Where the background/content asset goes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackgroundStyle {
    /// Panel width as a fraction of the canvas width. `1.0` fills the canvas.
    pub panel_fraction: f64,
    /// Side the panel is flush against.
    pub side: Side,
}

impl Default for BackgroundStyle {
    fn default() -> Self {
        Self {
            panel_fraction: 0.65,
            side: Side::Right,
        }
    }
}

/// Limits applied to every character placement.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterStyle {
    /// Maximum character height as a fraction of the canvas height.
    pub max_height_fraction: f64,
    /// Gap between the character and its anchor edge, as a fraction of the canvas width.
    pub margin_x_fraction: f64,
    /// Gap between the character and the bottom edge, as a fraction of the canvas height.
    pub margin_bottom_fraction: f64,
}

impl Default for CharacterStyle {
    fn default() -> Self {
        Self {
            max_height_fraction: 0.9,
            margin_x_fraction: 0.02,
            margin_bottom_fraction: 0.05,
        }
    }
}

/// Question card palette and the two metric presets.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardStyle {
    /// Colors shared by both presets.
    pub palette: CardPalette,
    /// Card next to a character (35%..95% of the width).
    pub side_panel: CardMetrics,
    /// Card spanning the canvas (5%..95% of the width).
    pub full_width: CardMetrics,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            palette: CardPalette::default(),
            side_panel: CardMetrics::side_panel(),
            full_width: CardMetrics::full_width(),
        }
    }
}

/// Logo badge in the top-left corner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogoStyle {
    /// Logo height; width follows the logo's aspect ratio.
    pub height_px: u32,
    /// Distance from the top and left edges.
    pub margin_px: u32,
    /// Gap between logo and caption.
    pub gap_px: u32,
    /// Title baseline box offset from the top margin.
    pub title_offset_y: u32,
    /// Subtitle box offset from the top margin.
    pub subtitle_offset_y: u32,
    /// Title text size.
    pub title_size: f32,
    /// Subtitle text size.
    pub subtitle_size: f32,
    /// Title color.
    pub title_color: Rgba8,
    /// Subtitle color.
    pub subtitle_color: Rgba8,
}

impl Default for LogoStyle {
    fn default() -> Self {
        Self {
            height_px: 80,
            margin_px: 20,
            gap_px: 15,
            title_offset_y: 18,
            subtitle_offset_y: 48,
            title_size: 26.0,
            subtitle_size: 20.0,
            title_color: Rgba8::rgb(33, 33, 33),
            subtitle_color: Rgba8::rgb(80, 80, 80),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/config.rs"]
mod tests;
