use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "burnin", version, about = "Burn frame-accurate captions into videos")]
struct Cli {
    /// Pipeline config JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (holds `uploads/` and `frames/`). Overrides config and `BURNIN_DATA_DIR`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Font file for captions. Overrides config and `BURNIN_FONT`.
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a video as a new upload and extract its frames.
    Ingest(IngestArgs),
    /// Extract frames from a video file, using its file stem as the video id.
    Extract(ExtractArgs),
    /// Edit or list captions.
    #[command(subcommand)]
    Caption(CaptionCommand),
    /// Render a video from its frames (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct IngestArgs {
    /// Video file (.mp4, .avi, .mov, .mkv).
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Video file.
    file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum CaptionCommand {
    /// Insert a caption, or replace the text of the caption with the same range.
    Set {
        /// Video id.
        video_id: String,
        /// First frame (inclusive).
        start_frame: u64,
        /// Last frame (inclusive).
        end_frame: u64,
        /// Caption text.
        text: String,
    },
    /// Print the captions of a video.
    List {
        /// Video id.
        video_id: String,
    },
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Video id.
    video_id: String,

    /// Re-encode without captions.
    #[arg(long, default_value_t = false)]
    plain: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "burnin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let pipeline = burnin::Pipeline::new(load_config(&cli)?)?;

    match cli.cmd {
        Command::Ingest(args) => cmd_ingest(&pipeline, args),
        Command::Extract(args) => {
            let info = pipeline.extract_frames(&args.file)?;
            print_json(&info)
        }
        Command::Caption(CaptionCommand::Set {
            video_id,
            start_frame,
            end_frame,
            text,
        }) => {
            let outcome = pipeline.upsert_caption(&video_id, start_frame, end_frame, &text)?;
            print_json(&serde_json::json!({ "status": "success", "outcome": outcome }))
        }
        Command::Caption(CaptionCommand::List { video_id }) => {
            print_json(&pipeline.get_captions(&video_id)?)
        }
        Command::Render(args) => {
            let kind = if args.plain {
                burnin::RenderKind::Plain
            } else {
                burnin::RenderKind::Captioned
            };
            let (_, report) = pipeline.render_video(&args.video_id, kind)?;
            print_json(&report)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<burnin::PipelineConfig> {
    let mut cfg = match &cli.config {
        Some(path) => burnin::PipelineConfig::from_json_file(path)?,
        None => burnin::PipelineConfig::default(),
    };
    cfg.apply_env();
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }
    if let Some(font) = &cli.font {
        cfg.font_path = Some(font.clone());
    }
    Ok(cfg)
}

fn cmd_ingest(pipeline: &burnin::Pipeline, args: IngestArgs) -> anyhow::Result<()> {
    let name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' has no usable file name", args.file.display()))?;
    let mut file = std::fs::File::open(&args.file)
        .with_context(|| format!("open '{}'", args.file.display()))?;
    let info = pipeline.ingest_upload(name, &mut file)?;
    print_json(&info)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value).context("encode output json")?;
    println!("{s}");
    Ok(())
}
