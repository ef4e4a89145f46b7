use std::sync::Arc;

use crate::assets::font::FontResolver;
use crate::compose::card::{CardLayout, CardMetrics, CardPalette, QuestionCard, RowStyle};
use crate::compose::text::{TextBrush, TextLayoutEngine};
use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Vector overlay drawn on top of the pasted rasters: the question card and logo captions.
///
/// Everything is recorded into one canvas-sized `vello_cpu` context and rendered once in
/// [`OverlayPainter::finish`].
pub(crate) struct OverlayPainter<'a> {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    text: TextLayoutEngine,
    fonts: &'a dyn FontResolver,
    font_data: Vec<(Arc<Vec<u8>>, vello_cpu::peniko::FontData)>,
    skipped_text: usize,
}

impl<'a> OverlayPainter<'a> {
    pub(crate) fn new(canvas: Canvas, fonts: &'a dyn FontResolver) -> ViewframeResult<Self> {
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            text: TextLayoutEngine::new(),
            fonts,
            font_data: Vec::new(),
            skipped_text: 0,
        })
    }

    /// Number of text runs dropped because no font was available.
    pub(crate) fn skipped_text(&self) -> usize {
        self.skipped_text
    }

    pub(crate) fn draw_card(
        &mut self,
        card: &QuestionCard,
        metrics: &CardMetrics,
        palette: &CardPalette,
    ) -> ViewframeResult<()> {
        let layout = CardLayout::compute(self.canvas, metrics, card);
        let m = metrics;

        let panel = kurbo::RoundedRect::from_rect(layout.panel, m.radius);
        self.fill(&panel, palette.panel_fill);
        self.stroke(&panel, palette.panel_outline, m.outline_width);

        self.text_at(&card.header, layout.header, m.title_size, palette.header)?;
        self.stroke(
            &kurbo::Line::new(layout.rule.0, layout.rule.1),
            palette.rule,
            m.rule_width,
        );

        let center_x = (layout.panel.x0 + layout.panel.x1) / 2.0;
        for (line, origin) in card.equations.iter().zip(&layout.equations) {
            let origin = if m.center_equations {
                match self.measure(line, m.equation_size)? {
                    Some(w) => Point::new(center_x - f64::from(w) / 2.0, origin.y),
                    None => *origin,
                }
            } else {
                *origin
            };
            self.text_at(line, origin, m.equation_size, palette.text)?;
        }

        for (line, origin) in card.question.iter().zip(&layout.question) {
            self.text_at(line, *origin, m.body_size, palette.text)?;
        }

        for (i, (choice, row)) in card.choices.iter().zip(&layout.rows).enumerate() {
            let marker = kurbo::Circle::new(row.marker_center, m.marker_radius);
            match card.row_style(i) {
                RowStyle::Correct => {
                    self.fill(&marker, palette.correct_fill);
                    self.stroke(&marker, palette.correct_outline, m.correct_marker_width);
                    self.text_at(&choice.label, row.letter, m.choice_size, palette.correct_letter)?;
                    self.text_at(&choice.value, row.value, m.correct_size, palette.correct_fill)?;
                    self.text_at(&m.correct_label, row.label, m.correct_size, palette.correct_fill)?;
                }
                RowStyle::Muted => {
                    self.stroke(&marker, palette.muted_marker, m.marker_width);
                    self.text_at(&choice.label, row.letter, m.choice_size, palette.muted_marker)?;
                    self.text_at(&choice.value, row.value, m.choice_size, palette.muted_value)?;
                }
                RowStyle::Neutral => {
                    self.stroke(&marker, palette.neutral_marker, m.marker_width);
                    self.text_at(&choice.label, row.letter, m.choice_size, palette.neutral_marker)?;
                    self.text_at(&choice.value, row.value, m.choice_size, palette.text)?;
                }
            }
        }
        Ok(())
    }

    /// Draw one line of text with its top-left corner at `origin`. Skipped without a font.
    pub(crate) fn text_at(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgba8,
    ) -> ViewframeResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let Some(handle) = self.fonts.resolve_font(size_px) else {
            self.skipped_text += 1;
            return Ok(());
        };
        let bytes = handle.shared_bytes();
        let layout = self
            .text
            .layout_line(text, &bytes, handle.size_px(), TextBrush::from(color))?;
        let font = self.font_data_for(&bytes);

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn measure(&mut self, text: &str, size_px: f32) -> ViewframeResult<Option<f32>> {
        let Some(handle) = self.fonts.resolve_font(size_px) else {
            return Ok(None);
        };
        let bytes = handle.shared_bytes();
        Ok(Some(self.text.measure(text, &bytes, handle.size_px())?))
    }

    fn font_data_for(&mut self, bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
        if let Some((_, f)) = self.font_data.iter().find(|(b, _)| Arc::ptr_eq(b, bytes)) {
            return f.clone();
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        self.font_data.push((Arc::clone(bytes), font.clone()));
        font
    }

    fn fill(&mut self, shape: &impl kurbo::Shape, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx.fill_path(&to_cpu_path(shape));
    }

    fn stroke(&mut self, shape: &impl kurbo::Shape, color: Rgba8, width: f64) {
        if width <= 0.0 {
            return;
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&to_cpu_path(shape));
    }

    /// Rasterize everything recorded so far. Returns premultiplied RGBA8 canvas pixels.
    pub(crate) fn finish(mut self) -> ViewframeResult<Vec<u8>> {
        let (w, h) = canvas_u16(self.canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }
}

fn canvas_u16(canvas: Canvas) -> ViewframeResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| ViewframeError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| ViewframeError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn to_cpu_path(shape: &impl kurbo::Shape) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        p.push(el);
    }
    p
}
