use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Font bytes plus the pixel size they were resolved for.
#[derive(Clone, Debug)]
pub struct FontHandle {
    bytes: Arc<Vec<u8>>,
    size_px: f32,
}

impl FontHandle {
    /// Wrap raw font file bytes (TTF/OTF/TTC).
    pub fn new(bytes: Arc<Vec<u8>>, size_px: f32) -> Self {
        Self { bytes, size_px }
    }

    /// Raw font file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the font bytes.
    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    /// Pixel size requested by the caller.
    pub fn size_px(&self) -> f32 {
        self.size_px
    }
}

/// Strategy for turning a text size hint into a usable font.
///
/// Returning `None` means no font is available: the overlay still draws every shape but skips
/// glyphs.
pub trait FontResolver: Send + Sync + std::fmt::Debug {
    /// Resolve a font for text drawn at `size_px`.
    fn resolve_font(&self, size_px: f32) -> Option<FontHandle>;
}

/// Resolver that never yields a font.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFonts;

impl FontResolver for NoFonts {
    fn resolve_font(&self, _size_px: f32) -> Option<FontHandle> {
        None
    }
}

/// Resolver backed by in-memory font bytes.
#[derive(Clone, Debug)]
pub struct FontBytes {
    bytes: Arc<Vec<u8>>,
}

impl FontBytes {
    /// Use `bytes` for every size.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
        }
    }
}

impl FontResolver for FontBytes {
    fn resolve_font(&self, size_px: f32) -> Option<FontHandle> {
        Some(FontHandle::new(Arc::clone(&self.bytes), size_px))
    }
}

/// Ordered list of font files; the first one that parses as a font wins.
///
/// The probe runs once and its outcome (including "nothing found") is cached.
#[derive(Debug, Default)]
pub struct FontCandidates {
    paths: Vec<PathBuf>,
    loaded: OnceLock<Option<Arc<Vec<u8>>>>,
}

impl FontCandidates {
    /// Probe `paths` in order on first use.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            loaded: OnceLock::new(),
        }
    }

    /// Common system font locations on macOS and Linux.
    pub fn system_defaults() -> Self {
        Self::new([
            "/System/Library/Fonts/Helvetica.ttc",
            "/System/Library/Fonts/SFNSText.ttf",
            "/Library/Fonts/Arial.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        ])
    }

    /// Candidate paths in probe order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn probe(&self) -> Option<Arc<Vec<u8>>> {
        for p in &self.paths {
            match std::fs::read(p) {
                Ok(bytes) if parses_as_font(&bytes) => {
                    tracing::debug!(path = %p.display(), "resolved font");
                    return Some(Arc::new(bytes));
                }
                Ok(_) => tracing::warn!(path = %p.display(), "font candidate is not a usable font"),
                Err(e) => tracing::trace!(path = %p.display(), error = %e, "font candidate unavailable"),
            }
        }
        tracing::warn!(
            candidates = self.paths.len(),
            "no usable font candidate; text will be skipped"
        );
        None
    }
}

/// True when fontique registers at least one family from `bytes`.
fn parses_as_font(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let mut collection = parley::fontique::Collection::new(parley::fontique::CollectionOptions {
        shared: false,
        system_fonts: false,
    });
    !collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None)
        .is_empty()
}

impl FontResolver for FontCandidates {
    fn resolve_font(&self, size_px: f32) -> Option<FontHandle> {
        self.loaded
            .get_or_init(|| self.probe())
            .as_ref()
            .map(|bytes| FontHandle::new(Arc::clone(bytes), size_px))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
