use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::font::{FontCandidates, FontResolver};
use crate::assets::store::AssetStore;
use crate::batch::manifest::{BatchManifest, FrameJob, Stage};
use crate::compose::frame::{CharacterLayer, FrameComposer, FrameLayers, LogoLayer};
use crate::encode::write_frame;
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Execution options for [`run_batch`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BatchOpts {
    /// Compose the frames of a stage on a rayon pool.
    pub parallel: bool,
    /// Pool size; rayon's default when `None`.
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenFrame {
    pub stage: String,
    pub name: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFrame {
    pub stage: String,
    pub name: String,
    pub reason: String,
}

/// Outcome of a batch run, in manifest order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: Vec<WrittenFrame>,
    pub skipped: Vec<SkippedFrame>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} frame(s) written, {} skipped",
            self.written.len(),
            self.skipped.len()
        )?;
        for w in &self.written {
            writeln!(f, "  wrote   {}/{}: {}", w.stage, w.name, w.path.display())?;
        }
        for s in &self.skipped {
            writeln!(f, "  skipped {}/{}: {}", s.stage, s.name, s.reason)?;
        }
        Ok(())
    }
}

/// Run a manifest with fonts taken from its `fonts` list, or the system defaults when empty.
pub fn run_batch(manifest: &BatchManifest, opts: BatchOpts) -> ViewframeResult<BatchReport> {
    let fonts: Arc<dyn FontResolver> = if manifest.fonts.is_empty() {
        Arc::new(FontCandidates::system_defaults())
    } else {
        Arc::new(FontCandidates::new(manifest.fonts.iter().cloned()))
    };
    run_batch_with_fonts(manifest, fonts, opts)
}

/// Run every stage in order. Frame failures are logged and reported; only invalid manifests or
/// options fail the whole run.
#[tracing::instrument(skip_all, fields(stages = manifest.stages.len(), parallel = opts.parallel))]
pub fn run_batch_with_fonts(
    manifest: &BatchManifest,
    fonts: Arc<dyn FontResolver>,
    opts: BatchOpts,
) -> ViewframeResult<BatchReport> {
    manifest.validate()?;
    let composer = FrameComposer::new(manifest.config.clone(), fonts)?;
    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    let mut report = BatchReport::default();
    for stage in &manifest.stages {
        let store = AssetStore::prepare(
            manifest.assets_root(),
            stage.frames.iter().flat_map(FrameJob::sources),
        );
        let run = |job: &FrameJob| run_job(&composer, &store, manifest, job);
        let results: Vec<ViewframeResult<PathBuf>> = match &pool {
            Some(pool) => pool.install(|| stage.frames.par_iter().map(run).collect()),
            None => stage.frames.iter().map(run).collect(),
        };
        record_stage(&mut report, stage, results);
    }

    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}

fn record_stage(report: &mut BatchReport, stage: &Stage, results: Vec<ViewframeResult<PathBuf>>) {
    for (job, result) in stage.frames.iter().zip(results) {
        match result {
            Ok(path) => {
                tracing::info!(stage = %stage.name, frame = %job.name, path = %path.display(), "frame written");
                report.written.push(WrittenFrame {
                    stage: stage.name.clone(),
                    name: job.name.clone(),
                    path,
                });
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(
                    stage = %stage.name,
                    frame = %job.name,
                    asset_error = e.is_asset_error(),
                    %reason,
                    "frame skipped"
                );
                report.skipped.push(SkippedFrame {
                    stage: stage.name.clone(),
                    name: job.name.clone(),
                    reason,
                });
            }
        }
    }
}

fn run_job(
    composer: &FrameComposer,
    store: &AssetStore,
    manifest: &BatchManifest,
    job: &FrameJob,
) -> ViewframeResult<PathBuf> {
    let character = match &job.character {
        Some(c) => Some(CharacterLayer {
            asset: store.get(&c.source)?,
            pose: c.pose,
        }),
        None => None,
    };
    let background = match &job.background {
        Some(b) => Some(store.get(&b.source)?),
        None => None,
    };
    let logo = match &job.logo {
        Some(l) => Some(LogoLayer {
            asset: l.source.as_deref().map(|s| store.get(s)).transpose()?,
            title: l.title.clone(),
            subtitle: l.subtitle.clone(),
        }),
        None => None,
    };

    let frame = composer.compose(&FrameLayers {
        background,
        character,
        card: job.card.clone(),
        logo,
    })?;

    let path = manifest.output_dir().join(&job.output);
    let cfg = composer.config();
    write_frame(&frame, &path, job.format, cfg.matte, cfg.jpeg_quality)?;
    Ok(path)
}

fn build_thread_pool(threads: Option<usize>) -> ViewframeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ViewframeError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ViewframeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/runner.rs"]
mod tests;
