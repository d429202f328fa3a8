//! Pure caption layout: font scaling, word wrapping and panel geometry.
//!
//! Nothing here touches fonts or pixels; measured line sizes come in from the text engine.

/// Visual parameters of the caption overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Lower bound of the adaptive font scale.
    pub min_font_scale: f32,
    /// Frame size at which the font scale is 1.0.
    pub reference_width: u32,
    /// Frame size at which the font scale is 1.0.
    pub reference_height: u32,
    /// Font size in pixels at scale 1.0.
    pub base_font_px: f32,
    /// Lower bound of the wrap width in characters.
    pub min_chars_per_line: usize,
    /// Frame width divided by this gives the wrap width in characters.
    pub px_per_char: u32,
    /// Padding between panel edge and text block.
    pub padding_px: u32,
    /// Vertical gap between wrapped lines.
    pub line_spacing_px: u32,
    /// Gap between panel bottom and frame bottom.
    pub bottom_margin_px: u32,
    /// Panel opacity in `[0, 1]`.
    pub panel_opacity: f32,
    /// Panel fill color.
    pub panel_rgb: [u8; 3],
    /// Text color.
    pub text_rgb: [u8; 3],
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            min_font_scale: 0.8,
            reference_width: 800,
            reference_height: 600,
            base_font_px: 28.0,
            min_chars_per_line: 30,
            px_per_char: 20,
            padding_px: 10,
            line_spacing_px: 5,
            bottom_margin_px: 20,
            panel_opacity: 0.7,
            panel_rgb: [0, 0, 0],
            text_rgb: [255, 255, 255],
        }
    }
}

impl CaptionStyle {
    /// Adaptive font scale: `max(min, min(w / ref_w, h / ref_h))`.
    pub fn font_scale(&self, frame_width: u32, frame_height: u32) -> f32 {
        let sx = frame_width as f32 / self.reference_width.max(1) as f32;
        let sy = frame_height as f32 / self.reference_height.max(1) as f32;
        sx.min(sy).max(self.min_font_scale)
    }

    /// Stroke thickness for a font scale: `max(1, floor(scale * 2))`.
    pub fn line_thickness(&self, font_scale: f32) -> u32 {
        ((font_scale * 2.0).floor() as u32).max(1)
    }

    /// Font size in pixels for a font scale.
    pub fn font_px(&self, font_scale: f32) -> f32 {
        self.base_font_px * font_scale
    }

    /// Wrap width in characters: `max(min_chars, frame_width / px_per_char)`.
    pub fn max_chars_per_line(&self, frame_width: u32) -> usize {
        let by_width = (frame_width / self.px_per_char.max(1)) as usize;
        by_width.max(self.min_chars_per_line)
    }
}

/// Greedily pack whitespace-separated words into lines of at most `max_chars` characters.
///
/// Words are never split; a word longer than `max_chars` gets a line of its own. Characters are
/// counted as Unicode scalar values.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Measured pixel extent of one rendered line (text height plus descent).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineSize {
    /// Advance width in pixels.
    pub width: u32,
    /// Line height in pixels.
    pub height: u32,
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PixelRect {
    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `(x, y)` is inside.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Placement of the panel and every line's top-left corner, in frame coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelLayout {
    /// Panel rectangle, clipped to the frame.
    pub panel: PixelRect,
    /// Top-left origin of each line, in line order. May lie partly outside the frame when the
    /// text block is larger than the frame.
    pub line_origins: Vec<(i64, i64)>,
}

/// Place the panel and lines for measured `lines` on a `frame_width` x `frame_height` frame.
///
/// The panel hugs the text block plus padding, is centered horizontally and sits
/// `bottom_margin_px` above the frame bottom; its origin is clamped into the frame.
pub fn layout_panel(
    style: &CaptionStyle,
    frame_width: u32,
    frame_height: u32,
    lines: &[LineSize],
) -> PanelLayout {
    let pad = i64::from(style.padding_px);
    let spacing = i64::from(style.line_spacing_px);
    let fw = i64::from(frame_width);
    let fh = i64::from(frame_height);

    let max_w = lines.iter().map(|l| i64::from(l.width)).max().unwrap_or(0);
    let total_h: i64 = lines.iter().map(|l| i64::from(l.height)).sum::<i64>()
        + spacing * (lines.len() as i64 - 1).max(0);

    let caption_w = max_w + 2 * pad;
    let caption_h = total_h + 2 * pad;

    let x = (fw - caption_w) / 2;
    let y = fh - caption_h - i64::from(style.bottom_margin_px);
    let x = x.min(fw - caption_w).max(0);
    let y = y.min(fh - caption_h).max(0);

    let panel = PixelRect {
        x: x as u32,
        y: y as u32,
        width: caption_w.min(fw - x).max(0) as u32,
        height: caption_h.min(fh - y).max(0) as u32,
    };

    let mut line_origins = Vec::with_capacity(lines.len());
    let mut top = y + pad;
    for l in lines {
        let lx = x + (caption_w - i64::from(l.width)) / 2;
        line_origins.push((lx, top));
        top += i64::from(l.height) + spacing;
    }

    PanelLayout {
        panel,
        line_origins,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
