use std::path::Path;

use anyhow::Context;

use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Decode asset bytes into a premultiplied RGBA8 raster.
///
/// The path is only used to pick the decoder (`.svg`/`.svgz` go through usvg, everything else
/// through `image`) and to label errors.
pub(crate) fn decode_asset(path: &Path, bytes: &[u8]) -> ViewframeResult<image::RgbaImage> {
    if is_svg_path(path) {
        decode_svg(path, bytes)
    } else {
        decode_raster(path, bytes)
    }
}

pub(crate) fn decode_raster(path: &Path, bytes: &[u8]) -> ViewframeResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ViewframeError::invalid_asset(path, format!("decode image: {e}")))?;
    let mut rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ViewframeError::invalid_asset(path, "image has zero width or height"));
    }
    premultiply_rgba8_in_place(&mut rgba);
    Ok(rgba)
}

pub(crate) fn decode_svg(path: &Path, bytes: &[u8]) -> ViewframeResult<image::RgbaImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| ViewframeError::invalid_asset(path, format!("parse svg tree: {e}")))?;
    let (w, h) = svg_intrinsic_px(&tree)
        .map_err(|reason| ViewframeError::invalid_asset(path, reason))?;
    let data = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
    let img = image::RgbaImage::from_raw(w, h, data)
        .context("svg raster buffer does not match its dimensions")?;
    Ok(img)
}

fn svg_intrinsic_px(tree: &usvg::Tree) -> Result<(u32, u32), String> {
    fn to_px(v: f32) -> Result<u32, String> {
        if !v.is_finite() || v <= 0.0 {
            return Err("svg has invalid width/height".to_string());
        }
        Ok((v.ceil() as u32).max(1))
    }
    let size = tree.size();
    Ok((to_px(size.width())?, to_px(size.height())?))
}

fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg") || e.eq_ignore_ascii_case("svgz"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
