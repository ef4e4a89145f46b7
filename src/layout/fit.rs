use crate::foundation::core::{Canvas, Placement, Side, Size};
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Axis a resize target is expressed along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Target is a width.
    #[default]
    Width,
    /// Target is a height.
    Height,
}

/// Which constraint ended up determining the scale of an aspect-preserving resize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// The requested target length.
    Target,
    /// The width bound.
    Width,
    /// The height bound.
    Height,
}

/// Result of [`fit`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Fit {
    /// Output size.
    pub size: Size,
    /// Scale factor applied to both sides.
    pub ratio: f64,
    /// Constraint that fixed `ratio`.
    pub binding: Binding,
}

/// Aspect-preserving resize of `src` to `target` along `axis`, capped by `bounds`.
///
/// The candidate ratios are `target / src[axis]`, `bounds.width / src.width` and
/// `bounds.height / src.height`; the smallest one wins and its dimension is set exactly to the
/// constraint, the other dimension is derived from the ratio and truncated. Ties prefer the
/// target, then width.
///
/// A target larger than the bound on its own axis simply loses to that bound.
pub fn fit(src: Size, axis: Axis, target: u32, bounds: Size) -> ViewframeResult<Fit> {
    if src.is_degenerate() {
        return Err(ViewframeError::validation(format!(
            "cannot fit zero-dimension source {src}"
        )));
    }
    if target == 0 || bounds.is_degenerate() {
        return Err(ViewframeError::validation(format!(
            "fit target {target} / bounds {bounds} must be non-zero"
        )));
    }

    // Ratios are compared as exact fractions `num / den` so ties resolve deterministically.
    let src_axis = match axis {
        Axis::Width => src.width,
        Axis::Height => src.height,
    };
    let mut best = (target, src_axis);
    let mut binding = Binding::Target;
    let less = |a: (u32, u32), b: (u32, u32)| -> bool {
        u64::from(a.0) * u64::from(b.1) < u64::from(b.0) * u64::from(a.1)
    };
    if less((bounds.width, src.width), best) {
        best = (bounds.width, src.width);
        binding = Binding::Width;
    }
    if less((bounds.height, src.height), best) {
        best = (bounds.height, src.height);
        binding = Binding::Height;
    }
    let ratio = f64::from(best.0) / f64::from(best.1);

    let derive = |len: u32, cap: u32| -> u32 {
        let v = u64::from(len) * u64::from(best.0) / u64::from(best.1);
        v.clamp(1, u64::from(cap)) as u32
    };
    let (width, height) = match (binding, axis) {
        (Binding::Target, Axis::Width) => (target, derive(src.height, bounds.height)),
        (Binding::Target, Axis::Height) => (derive(src.width, bounds.width), target),
        (Binding::Width, _) => (bounds.width, derive(src.height, bounds.height)),
        (Binding::Height, _) => (derive(src.width, bounds.width), bounds.height),
    };

    Ok(Fit {
        size: Size::new(width, height),
        ratio,
        binding,
    })
}

/// Place a fitted panel asset flush against `side`, vertically centered.
pub fn place_panel(canvas: Canvas, size: Size, side: Side) -> Placement {
    let x = match side {
        Side::Left => 0,
        Side::Right => i64::from(canvas.width) - i64::from(size.width),
    };
    let y = (i64::from(canvas.height) - i64::from(size.height)) / 2;
    Placement {
        x,
        y,
        width: size.width,
        height: size.height,
    }
}

/// Place a character of `size` on `side`, `margin_x` pixels from that edge and bottom-aligned
/// `margin_bottom` pixels above the bottom edge. Never places above the top edge.
pub fn place_anchored(
    canvas: Canvas,
    size: Size,
    side: Side,
    margin_x: u32,
    margin_bottom: u32,
) -> Placement {
    let x = match side {
        Side::Left => i64::from(margin_x),
        Side::Right => i64::from(canvas.width) - i64::from(size.width) - i64::from(margin_x),
    };
    let y = (i64::from(canvas.height) - i64::from(size.height) - i64::from(margin_bottom)).max(0);
    Placement {
        x,
        y,
        width: size.width,
        height: size.height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
