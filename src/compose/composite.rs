use crate::foundation::core::{Placement, Rgba8};
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Composite an equal-length premultiplied buffer over `dst`.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> ViewframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ViewframeError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Paste a premultiplied `src` image over a `canvas_w`-wide canvas at `at`, clipping to the
/// canvas. Returns the number of pixels touched.
pub fn paste_over(
    dst: &mut [u8],
    canvas_w: u32,
    canvas_h: u32,
    src: &image::RgbaImage,
    at: Placement,
) -> usize {
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
    let (cw, ch) = (i64::from(canvas_w), i64::from(canvas_h));
    let x0 = at.x.max(0);
    let y0 = at.y.max(0);
    let x1 = (at.x + sw).min(cw);
    let y1 = (at.y + sh).min(ch);
    if x0 >= x1 || y0 >= y1 {
        return 0;
    }

    let raw = src.as_raw();
    let span = ((x1 - x0) * 4) as usize;
    for y in y0..y1 {
        let sy = y - at.y;
        let s_off = ((sy * sw + (x0 - at.x)) * 4) as usize;
        let d_off = ((y * cw + x0) * 4) as usize;
        let s_row = &raw[s_off..s_off + span];
        let d_row = &mut dst[d_off..d_off + span];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    ((x1 - x0) * (y1 - y0)) as usize
}

/// Fill a buffer with one color.
pub fn fill(dst: &mut [u8], color: Rgba8) {
    let px = color.premultiplied();
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

/// Flatten a premultiplied buffer onto an opaque matte, producing opaque RGB8.
pub fn flatten_onto(src: &[u8], matte: Rgba8) -> Vec<u8> {
    let m = [matte.r, matte.g, matte.b];
    let mut out = Vec::with_capacity(src.len() / 4 * 3);
    for s in src.chunks_exact(4) {
        let inv = 255u16 - u16::from(s[3]);
        for i in 0..3 {
            out.push(s[i].saturating_add(mul_div255(u16::from(m[i]), inv)));
        }
    }
    out
}

/// Clamp color channels to alpha after filtering; resampling kernels with negative lobes can
/// overshoot.
pub fn clamp_premul_in_place(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
}

pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composite.rs"]
mod tests;
