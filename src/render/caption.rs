use image::RgbImage;

use crate::foundation::error::{BurninError, BurninResult};
use crate::render::composite::{blend_rect, over_premul_at};
use crate::render::layout::{CaptionStyle, LineSize, layout_panel, wrap_words};
use crate::render::text::{FontBytes, TextBrushRgba8, TextLayoutEngine};

/// Burns caption text into single frames.
///
/// Rendering never mutates the input frame; it returns a composited copy. Layout is computed from
/// the frame size handed in, so every frame of one video gets the same font scale and wrap width.
pub struct CaptionRenderer {
    style: CaptionStyle,
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

impl CaptionRenderer {
    /// Create a renderer drawing with `font`.
    pub fn new(style: CaptionStyle, font: FontBytes) -> BurninResult<Self> {
        let engine = TextLayoutEngine::new(&font)?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.as_slice().to_vec()),
            0,
        );
        Ok(Self {
            style,
            engine,
            font,
        })
    }

    /// Create a renderer with the embedded default font.
    pub fn with_default_font(style: CaptionStyle) -> BurninResult<Self> {
        Self::new(style, FontBytes::embedded())
    }

    /// Composite `caption_text` onto a copy of `frame`.
    ///
    /// `frame_width`/`frame_height` drive font scale, wrap width and panel placement; drawing is
    /// clipped to the actual frame bounds. Empty or whitespace-only text returns an unchanged
    /// copy.
    pub fn render(
        &mut self,
        frame: &RgbImage,
        caption_text: &str,
        frame_height: u32,
        frame_width: u32,
    ) -> BurninResult<RgbImage> {
        if caption_text.trim().is_empty() {
            return Ok(frame.clone());
        }

        let scale = self.style.font_scale(frame_width, frame_height);
        let thickness = self.style.line_thickness(scale);
        let font_px = self.style.font_px(scale);
        let max_chars = self.style.max_chars_per_line(frame_width);
        let brush = TextBrushRgba8::opaque(self.style.text_rgb);

        let lines = wrap_words(caption_text, max_chars);
        let mut layouts = Vec::with_capacity(lines.len());
        let mut sizes = Vec::with_capacity(lines.len());
        for line in &lines {
            let layout = self.engine.layout_line(line, font_px, brush)?;
            sizes.push(LineSize {
                width: layout.width().ceil().max(0.0) as u32 + (thickness - 1),
                height: layout.height().ceil().max(0.0) as u32,
            });
            layouts.push(layout);
        }

        let placed = layout_panel(&self.style, frame_width, frame_height, &sizes);

        let mut out = frame.clone();
        blend_rect(
            &mut out,
            placed.panel,
            self.style.panel_rgb,
            self.style.panel_opacity,
        );

        let panel = placed.panel;
        if panel.is_empty() {
            return Ok(out);
        }
        let pw: u16 = panel
            .width
            .try_into()
            .map_err(|_| BurninError::render("caption panel width exceeds u16"))?;
        let ph: u16 = panel
            .height
            .try_into()
            .map_err(|_| BurninError::render("caption panel height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(pw, ph);
        for (layout, &(lx, ly)) in layouts.iter().zip(&placed.line_origins) {
            let ox = (lx - i64::from(panel.x)) as f64;
            let oy = (ly - i64::from(panel.y)) as f64;
            for dx in 0..thickness {
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                    ox + f64::from(dx),
                    oy,
                )));
                self.draw_layout(&mut ctx, layout);
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(pw, ph);
        ctx.render_to_pixmap(&mut pixmap);
        over_premul_at(
            &mut out,
            pixmap.data_as_u8_slice(),
            panel.width,
            panel.height,
            panel.x,
            panel.y,
        )?;

        Ok(out)
    }

    fn draw_layout(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &parley::Layout<TextBrushRgba8>,
    ) {
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
