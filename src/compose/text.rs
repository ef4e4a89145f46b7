use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Builds single-line Parley layouts from raw font bytes.
///
/// Each distinct font buffer is registered once; the handle is kept so pointer identity stays
/// meaningful for the lifetime of the engine.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: Vec<(Arc<Vec<u8>>, String)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("families", &self.families.iter().map(|(_, n)| n).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: Vec::new(),
        }
    }

    fn family_for(&mut self, font: &Arc<Vec<u8>>) -> ViewframeResult<String> {
        if let Some((_, name)) = self.families.iter().find(|(b, _)| Arc::ptr_eq(b, font)) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ViewframeError::validation("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ViewframeError::validation("registered font family has no name"))?
            .to_string();
        tracing::debug!(family = %name, "registered font family");
        self.families.push((Arc::clone(font), name.clone()));
        Ok(name)
    }

    /// Shape one line of text. Lines are never wrapped.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &Arc<Vec<u8>>,
        size_px: f32,
        brush: TextBrush,
    ) -> ViewframeResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ViewframeError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&mut self, text: &str, font: &Arc<Vec<u8>>, size_px: f32) -> ViewframeResult<f32> {
        Ok(self
            .layout_line(text, font, size_px, TextBrush::default())?
            .width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
