use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::decode_asset;
use crate::foundation::core::Size;
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Immutable raster loaded from disk.
///
/// Pixels are premultiplied RGBA8. The buffer is shared behind an `Arc`; compositing only ever
/// reads it and produces new mirrored/resized buffers.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    source: PathBuf,
    pixels: Arc<image::RgbaImage>,
}

impl ImageAsset {
    /// Wrap an already-premultiplied raster.
    ///
    /// Fails with [`ViewframeError::InvalidAsset`] when either side is zero, since every resize
    /// divides by the source dimensions.
    pub fn from_premul_rgba(
        source: impl Into<PathBuf>,
        pixels: image::RgbaImage,
    ) -> ViewframeResult<Self> {
        let source = source.into();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ViewframeError::invalid_asset(
                &source,
                format!("zero dimension {}x{}", pixels.width(), pixels.height()),
            ));
        }
        Ok(Self {
            source,
            pixels: Arc::new(pixels),
        })
    }

    /// Wrap a straight-alpha raster, premultiplying it.
    pub fn from_straight_rgba(
        source: impl Into<PathBuf>,
        mut pixels: image::RgbaImage,
    ) -> ViewframeResult<Self> {
        crate::assets::decode::premultiply_rgba8_in_place(&mut pixels);
        Self::from_premul_rgba(source, pixels)
    }

    /// Read and decode an asset file.
    pub fn open(path: impl AsRef<Path>) -> ViewframeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ViewframeError::asset_not_found(path),
            _ => ViewframeError::invalid_asset(path, format!("read: {e}")),
        })?;
        let pixels = decode_asset(path, &bytes)?;
        Self::from_premul_rgba(path, pixels)
    }

    /// Path the asset was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Pixel size.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Premultiplied RGBA8 pixels.
    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AssetFault {
    Missing,
    Invalid(String),
}

/// Read-only set of decoded assets shared by every frame of a batch stage.
///
/// All loading happens in [`AssetStore::prepare`]; afterwards the store is only read, so worker
/// threads can share `&AssetStore` without locks. Load failures are remembered per path and
/// reported to whichever frame asks for that asset.
#[derive(Debug, Default)]
pub struct AssetStore {
    root: PathBuf,
    assets: HashMap<PathBuf, Arc<ImageAsset>>,
    faults: HashMap<PathBuf, AssetFault>,
}

impl AssetStore {
    /// Create an empty store resolving relative sources against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load every distinct source up front. Never fails; failures are recorded per source.
    #[tracing::instrument(skip_all)]
    pub fn prepare<'a>(
        root: impl AsRef<Path>,
        sources: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut store = Self::new(root.as_ref());
        let mut paths: Vec<PathBuf> = sources.into_iter().map(|s| store.resolve(s)).collect();
        paths.sort();
        paths.dedup();

        let loaded: Vec<(PathBuf, ViewframeResult<ImageAsset>)> = paths
            .into_par_iter()
            .map(|p| {
                let r = ImageAsset::open(&p);
                (p, r)
            })
            .collect();

        for (path, result) in loaded {
            store.record(path, result);
        }
        tracing::debug!(
            loaded = store.assets.len(),
            failed = store.faults.len(),
            "asset store prepared"
        );
        store
    }

    /// Insert an in-memory asset under `source`.
    pub fn insert(&mut self, source: &str, asset: ImageAsset) {
        let path = self.resolve(source);
        self.faults.remove(&path);
        self.assets.insert(path, Arc::new(asset));
    }

    /// Resolve a manifest source against the store root. Absolute paths are kept as-is.
    pub fn resolve(&self, source: &str) -> PathBuf {
        let p = Path::new(source);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Fetch a prepared asset.
    pub fn get(&self, source: &str) -> ViewframeResult<Arc<ImageAsset>> {
        let path = self.resolve(source);
        if let Some(a) = self.assets.get(&path) {
            return Ok(Arc::clone(a));
        }
        match self.faults.get(&path) {
            Some(AssetFault::Missing) => Err(ViewframeError::asset_not_found(&path)),
            Some(AssetFault::Invalid(reason)) => {
                Err(ViewframeError::invalid_asset(&path, reason.clone()))
            }
            None => Err(ViewframeError::validation(format!(
                "asset '{}' was not prepared",
                path.display()
            ))),
        }
    }

    /// Number of successfully loaded assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Return `true` when nothing loaded successfully.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn record(&mut self, path: PathBuf, result: ViewframeResult<ImageAsset>) {
        match result {
            Ok(asset) => {
                self.assets.insert(path, Arc::new(asset));
            }
            Err(ViewframeError::AssetNotFound { .. }) => {
                tracing::warn!(path = %path.display(), "asset not found");
                self.faults.insert(path, AssetFault::Missing);
            }
            Err(ViewframeError::InvalidAsset { reason, .. }) => {
                tracing::warn!(path = %path.display(), %reason, "invalid asset");
                self.faults.insert(path, AssetFault::Invalid(reason));
            }
            Err(other) => {
                let reason = other.to_string();
                tracing::warn!(path = %path.display(), %reason, "asset failed to load");
                self.faults.insert(path, AssetFault::Invalid(reason));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
