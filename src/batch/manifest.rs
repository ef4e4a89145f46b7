use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compose::card::QuestionCard;
use crate::compose::config::ComposerConfig;
use crate::compose::frame::CharacterPose;
use crate::encode::OutputFormat;
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// A batch of frames grouped into ordered stages.
///
/// Relative paths resolve against `assets_root` (inputs) and `output_dir` (outputs); both default
/// to the manifest's directory when loaded with [`BatchManifest::from_path`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchManifest {
    #[serde(default)]
    pub config: ComposerConfig,
    #[serde(default)]
    pub assets_root: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Font files probed in order; empty means text is skipped.
    #[serde(default)]
    pub fonts: Vec<PathBuf>,
    pub stages: Vec<Stage>,
}

/// Frames that can be composed independently of each other.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stage {
    pub name: String,
    pub frames: Vec<FrameJob>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameJob {
    pub name: String,
    pub output: PathBuf,
    #[serde(default)]
    pub character: Option<CharacterJob>,
    #[serde(default)]
    pub background: Option<AssetRef>,
    #[serde(default)]
    pub card: Option<QuestionCard>,
    #[serde(default)]
    pub logo: Option<LogoJob>,
    /// Overrides the output extension.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CharacterJob {
    pub source: String,
    #[serde(flatten)]
    pub pose: CharacterPose,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetRef {
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoJob {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

impl FrameJob {
    /// Asset sources this frame reads.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.character
            .as_ref()
            .map(|c| c.source.as_str())
            .into_iter()
            .chain(self.background.as_ref().map(|b| b.source.as_str()))
            .chain(self.logo.as_ref().and_then(|l| l.source.as_deref()))
    }
}

impl BatchManifest {
    pub fn from_reader<R: std::io::Read>(r: R) -> ViewframeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ViewframeError::validation(format!("parse batch manifest JSON: {e}")))
    }

    /// Read a manifest; unset roots default to the manifest's directory.
    pub fn from_path(path: impl AsRef<Path>) -> ViewframeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ViewframeError::validation(format!("open batch manifest '{}': {e}", path.display()))
        })?;
        let mut m = Self::from_reader(BufReader::new(f))?;
        let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let assets_root = match m.assets_root.take() {
            Some(p) if p.is_relative() => dir.join(p),
            Some(p) => p,
            None => dir.clone(),
        };
        m.output_dir = Some(match m.output_dir.take() {
            Some(p) if p.is_relative() => dir.join(p),
            Some(p) => p,
            None => assets_root.clone(),
        });
        m.assets_root = Some(assets_root);
        m.fonts = m
            .fonts
            .into_iter()
            .map(|p| if p.is_relative() { dir.join(p) } else { p })
            .collect();
        Ok(m)
    }

    pub fn validate(&self) -> ViewframeResult<()> {
        self.config.validate()?;
        if self.stages.is_empty() {
            return Err(ViewframeError::validation("batch manifest has no stages"));
        }
        let mut outputs = std::collections::HashSet::new();
        for stage in &self.stages {
            for job in &stage.frames {
                if !outputs.insert(&job.output) {
                    return Err(ViewframeError::validation(format!(
                        "stage '{}': output '{}' is written by more than one frame",
                        stage.name,
                        job.output.display()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn assets_root(&self) -> &Path {
        self.assets_root.as_deref().unwrap_or_else(|| Path::new("."))
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or_else(|| self.assets_root())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/manifest.rs"]
mod tests;
