use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "viewframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose one character + background frame.
    Frame(FrameArgs),
    /// Run a JSON batch manifest.
    Batch(BatchArgs),
    /// Print the placement computed for a source size.
    Fit(FitArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Character image (PNG with alpha, JPEG, SVG).
    #[arg(long)]
    character: PathBuf,

    /// Background screenshot.
    #[arg(long)]
    background: PathBuf,

    /// Output path (.png or .jpg).
    #[arg(long)]
    out: PathBuf,

    /// Character size as a fraction of the canvas dimension chosen by --basis.
    #[arg(long, default_value_t = 0.28)]
    scale: f64,

    #[arg(long, value_enum, default_value_t = BasisArg::Width)]
    basis: BasisArg,

    /// Side the character stands on; the background takes the other side.
    #[arg(long, value_enum, default_value_t = SideArg::Left)]
    anchor: SideArg,

    /// Mirror the character horizontally.
    #[arg(long)]
    flip: bool,

    /// Background panel width as a fraction of the canvas width.
    #[arg(long, default_value_t = 0.65)]
    panel: f64,

    /// Overlay the SAT example question card.
    #[arg(long, value_enum)]
    card: Option<CardArg>,

    /// Output format; inferred from --out when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Font file for card text (repeatable, first readable wins). Defaults to system fonts.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Batch manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Compose the frames of each stage in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads when --parallel is set.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Source size, e.g. 1600x900.
    #[arg(long)]
    src: viewframe::Size,

    /// Target length along --basis.
    #[arg(long)]
    target: u32,

    /// Bounding size, e.g. 1248x1080.
    #[arg(long)]
    bounds: viewframe::Size,

    #[arg(long, value_enum, default_value_t = BasisArg::Width)]
    basis: BasisArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BasisArg {
    Width,
    Height,
}

impl From<BasisArg> for viewframe::Axis {
    fn from(b: BasisArg) -> Self {
        match b {
            BasisArg::Width => viewframe::Axis::Width,
            BasisArg::Height => viewframe::Axis::Height,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for viewframe::Side {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::Left => viewframe::Side::Left,
            SideArg::Right => viewframe::Side::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CardArg {
    Question,
    Answer,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Fit(args) => cmd_fit(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let anchor = viewframe::Side::from(args.anchor);
    let mut config = viewframe::ComposerConfig::default();
    config.background.panel_fraction = args.panel;
    config.background.side = anchor.opposite();

    let fonts: Arc<dyn viewframe::FontResolver> = if args.fonts.is_empty() {
        Arc::new(viewframe::FontCandidates::system_defaults())
    } else {
        Arc::new(viewframe::FontCandidates::new(args.fonts))
    };
    let composer = viewframe::FrameComposer::new(config, fonts).context("invalid frame options")?;

    let character = viewframe::ImageAsset::open(&args.character)
        .with_context(|| format!("load character '{}'", args.character.display()))?;
    let background = viewframe::ImageAsset::open(&args.background)
        .with_context(|| format!("load background '{}'", args.background.display()))?;

    let card = args.card.map(|c| {
        let mode = match c {
            CardArg::Question => viewframe::CardMode::Question,
            CardArg::Answer => viewframe::CardMode::Answer,
        };
        viewframe::QuestionCard::sat_system_of_equations(viewframe::CardLayoutKind::SidePanel, mode)
    });

    let frame = composer.compose(&viewframe::FrameLayers {
        background: Some(Arc::new(background)),
        character: Some(viewframe::CharacterLayer {
            asset: Arc::new(character),
            pose: viewframe::CharacterPose {
                scale: args.scale,
                basis: args.basis.into(),
                anchor,
                flip: args.flip,
            },
        }),
        card,
        logo: None,
    })?;

    let format = args.format.map(|f| match f {
        FormatArg::Png => viewframe::OutputFormat::Png,
        FormatArg::Jpeg => viewframe::OutputFormat::Jpeg,
    });
    let cfg = composer.config();
    viewframe::write_frame(&frame, &args.out, format, cfg.matte, cfg.jpeg_quality)
        .with_context(|| format!("write frame '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let manifest = viewframe::BatchManifest::from_path(&args.manifest)
        .with_context(|| format!("load manifest '{}'", args.manifest.display()))?;
    let report = viewframe::run_batch(
        &manifest,
        viewframe::BatchOpts {
            parallel: args.parallel,
            threads: args.threads,
        },
    )?;
    print!("{report}");
    Ok(())
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    let fit = viewframe::fit(args.src, args.basis.into(), args.target, args.bounds)?;
    println!(
        "{}",
        serde_json::to_string(&fit).context("serialize fit result")?
    );
    Ok(())
}
