use image::RgbImage;

use crate::foundation::error::{BurninError, BurninResult};
use crate::foundation::math::{lerp_u8, mul_div255_u8};
use crate::render::layout::PixelRect;

/// Source-over of one premultiplied RGBA8 pixel onto an opaque RGB pixel.
pub fn over_opaque(dst: [u8; 3], src_premul: [u8; 4]) -> [u8; 3] {
    let sa = u16::from(src_premul[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return [src_premul[0], src_premul[1], src_premul[2]];
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 3];
    for i in 0..3 {
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = src_premul[i].saturating_add(dc);
    }
    out
}

/// Mix `color` into every pixel of `rect` at `opacity`; pixels outside `rect` are untouched.
///
/// Equivalent to drawing a filled rectangle on a copy of the frame and weighting copy and
/// original by `opacity` and `1 - opacity`.
pub fn blend_rect(frame: &mut RgbImage, rect: PixelRect, color: [u8; 3], opacity: f32) {
    let x_end = rect.x.saturating_add(rect.width).min(frame.width());
    let y_end = rect.y.saturating_add(rect.height).min(frame.height());
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            let px = frame.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = lerp_u8(px.0[c], color[c], opacity);
            }
        }
    }
}

/// Composite a premultiplied RGBA8 buffer of `width` x `height` onto `frame` with its top-left
/// corner at `(x0, y0)`. Parts falling outside the frame are dropped.
pub fn over_premul_at(
    frame: &mut RgbImage,
    src_premul: &[u8],
    width: u32,
    height: u32,
    x0: u32,
    y0: u32,
) -> BurninResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BurninError::render("overlay buffer size overflow"))?;
    if src_premul.len() != expected {
        return Err(BurninError::render(format!(
            "overlay buffer has {} bytes, expected {expected}",
            src_premul.len()
        )));
    }

    let (fw, fh) = frame.dimensions();
    for (row, line) in src_premul.chunks_exact(width as usize * 4).enumerate() {
        let y = y0 + row as u32;
        if y >= fh {
            break;
        }
        for (col, s) in line.chunks_exact(4).enumerate() {
            let x = x0 + col as u32;
            if x >= fw {
                break;
            }
            if s[3] == 0 {
                continue;
            }
            let px = frame.get_pixel_mut(x, y);
            px.0 = over_opaque(px.0, [s[0], s[1], s[2], s[3]]);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
