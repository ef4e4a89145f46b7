use crate::foundation::error::{ViewframeError, ViewframeResult};

pub use kurbo::{Point, Rect};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The 1080p canvas every tutorial frame is rendered at.
    pub const HD: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Create a validated canvas.
    ///
    /// The CPU rasterizer addresses pixels with `u16`, so both sides must fit in `1..=65535`.
    pub fn new(width: u32, height: u32) -> ViewframeResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Check the canvas can be allocated and rasterized.
    pub fn validate(self) -> ViewframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ViewframeError::validation("canvas width/height must be > 0"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ViewframeError::validation(format!(
                "canvas {}x{} exceeds {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Size of this canvas.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// `fraction * width`, truncated to whole pixels.
    pub fn frac_w(self, fraction: f64) -> u32 {
        frac_px(self.width, fraction)
    }

    /// `fraction * height`, truncated to whole pixels.
    pub fn frac_h(self, fraction: f64) -> u32 {
        frac_px(self.height, fraction)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::HD
    }
}

pub(crate) fn frac_px(len: u32, fraction: f64) -> u32 {
    (f64::from(len) * fraction).floor().max(0.0) as u32
}

/// Integer pixel size of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Build a size from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either side is zero.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, or `None` for degenerate sizes.
    pub fn aspect(self) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        Some(f64::from(self.width) / f64::from(self.height))
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Size {
    type Err = ViewframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| ViewframeError::validation(format!("expected WxH, got '{s}'")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| ViewframeError::validation(format!("invalid size '{s}': {e}")))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    /// Build a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiply color channels by alpha.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Rgb([u8; 3]),
            Rgba([u8; 4]),
            Obj { r: u8, g: u8, b: u8, a: Option<u8> },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Rgb([r, g, b]) => Ok(Self::rgb(r, g, b)),
            Repr::Rgba([r, g, b, a]) => Ok(Self::new(r, g, b, a)),
            Repr::Obj { r, g, b, a } => Ok(Self::new(r, g, b, a.unwrap_or(255))),
        }
    }
}

/// Horizontal side of the canvas an asset is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Attached to the left edge.
    #[default]
    Left,
    /// Attached to the right edge.
    Right,
}

impl Side {
    /// The opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Computed rectangle where a resized asset is pasted onto the canvas.
///
/// `x`/`y` may be negative when a caller deliberately places an asset partly off-canvas; paste
/// clips to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Placement {
    /// Left edge in canvas pixels.
    pub x: i64,
    /// Top edge in canvas pixels.
    pub y: i64,
    /// Width of the resized asset.
    pub width: u32,
    /// Height of the resized asset.
    pub height: u32,
}

impl Placement {
    /// Size of the placed asset.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    pub fn right(self) -> i64 {
        self.x + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i64 {
        self.y + i64::from(self.height)
    }

    /// Return `true` when the placement lies fully inside `canvas`.
    pub fn within(self, canvas: Canvas) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(canvas.width)
            && self.bottom() <= i64::from(canvas.height)
    }

    /// The placement as a floating-point rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.right() as f64,
            self.bottom() as f64,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
