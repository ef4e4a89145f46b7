use std::io::Write as _;
use std::path::Path;

use image::ImageEncoder as _;

use crate::compose::frame::ComposedFrame;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Output file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Lossless.
    Png,
    /// Lossy, at the configured quality.
    Jpeg,
}

impl OutputFormat {
    /// Infer the format from a file extension (`png`, `jpg`, `jpeg`; case-insensitive).
    pub fn from_path(path: &Path) -> ViewframeResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("jpg" | "jpeg") => Ok(Self::Jpeg),
            _ => Err(ViewframeError::validation(format!(
                "cannot infer output format from '{}'; use .png/.jpg or set it explicitly",
                path.display()
            ))),
        }
    }
}

/// Flatten `frame` onto `matte` and encode it in memory.
pub fn encode_frame(
    frame: &ComposedFrame,
    format: OutputFormat,
    matte: Rgba8,
    jpeg_quality: u8,
) -> ViewframeResult<Vec<u8>> {
    let rgb = frame.flatten(matte)?;
    let mut out = Vec::new();
    let res = match format {
        OutputFormat::Png => image::codecs::png::PngEncoder::new(&mut out).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        ),
        OutputFormat::Jpeg => {
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
        }
    };
    res.map_err(|e| ViewframeError::Other(anyhow::Error::new(e).context("encode frame")))?;
    Ok(out)
}

/// Encode and write `frame` to `path`, creating parent directories.
///
/// `format` falls back to the path extension when `None`.
#[tracing::instrument(skip(frame), fields(path = %path.display()))]
pub fn write_frame(
    frame: &ComposedFrame,
    path: &Path,
    format: Option<OutputFormat>,
    matte: Rgba8,
    jpeg_quality: u8,
) -> ViewframeResult<OutputFormat> {
    let format = match format {
        Some(f) => f,
        None => OutputFormat::from_path(path)?,
    };
    let bytes = encode_frame(frame, format, matte, jpeg_quality)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ViewframeError::write(path, format!("create dir: {e}")))?;
    }
    let mut f = std::fs::File::create(path).map_err(|e| ViewframeError::write(path, e.to_string()))?;
    f.write_all(&bytes)
        .and_then(|()| f.flush())
        .map_err(|e| ViewframeError::write(path, e.to_string()))?;
    tracing::debug!(bytes = bytes.len(), ?format, "frame encoded");
    Ok(format)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mod.rs"]
mod tests;
