use crate::foundation::error::{ViewframeError, ViewframeResult};

// Avoid pathological allocations from hostile or mistyped SVG sizes.
const MAX_DIM: u32 = 16_384;

pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> ViewframeResult<Vec<u8>> {
    if width > MAX_DIM || height > MAX_DIM {
        return Err(ViewframeError::validation(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ViewframeError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
