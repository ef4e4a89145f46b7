//! Viewframe composes the static frames of avatar tutorial videos.
//!
//! A frame is a fixed-size canvas (1920×1080 by default) with a background screenshot filling a
//! panel on one side, a character anchored to the other side, and optionally a question card and
//! a logo badge on top:
//!
//! - Load inputs into an [`AssetStore`] (PNG/JPEG/… and SVG)
//! - Build a [`FrameComposer`] from a [`ComposerConfig`] and a [`FontResolver`]
//! - [`FrameComposer::compose`] a set of [`FrameLayers`] and write it with [`write_frame`]
//!
//! [`run_batch`] drives the same pipeline from a JSON [`BatchManifest`]. The [`AgentSession`]
//! and [`AgentSpec`] types model the seams of the orchestration agent that consumes the frames.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod agent;
pub(crate) mod assets;
pub(crate) mod batch;
pub(crate) mod compose;
pub(crate) mod encode;
pub(crate) mod layout;

pub use crate::foundation::core::{Canvas, Placement, Point, Rect, Rgba8, Side, Size};
pub use crate::foundation::error::{ViewframeError, ViewframeResult};

pub use crate::agent::session::{
    AgentSession, Part, UploadDecision, Uploader, UserTurn, VIEW_URLS_HEADING,
};
pub use crate::agent::spec::{AgentSpec, SCRIPT_SEQUENCER_TOOL, VIDEO_TOOL, display_url};
pub use crate::assets::font::{FontBytes, FontCandidates, FontHandle, FontResolver, NoFonts};
pub use crate::assets::store::{AssetStore, ImageAsset};
pub use crate::batch::manifest::{AssetRef, BatchManifest, CharacterJob, FrameJob, LogoJob, Stage};
pub use crate::batch::runner::{
    BatchOpts, BatchReport, SkippedFrame, WrittenFrame, run_batch, run_batch_with_fonts,
};
pub use crate::compose::card::{
    CardLayout, CardLayoutKind, CardMetrics, CardMode, CardPalette, Choice, QuestionCard,
    RowLayout, RowStyle,
};
pub use crate::compose::config::{
    BackgroundStyle, CardStyle, CharacterStyle, ComposerConfig, LogoStyle,
};
pub use crate::compose::frame::{
    CharacterLayer, CharacterPose, ComposedFrame, FrameComposer, FrameLayers, FramePlacements,
    LogoLayer, mirror, resize_premul,
};
pub use crate::encode::{OutputFormat, encode_frame, write_frame};
pub use crate::layout::fit::{Axis, Binding, Fit, fit, place_anchored, place_panel};
