//! # Video Tools - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Dispatch verso planner ed executor della libreria
//! - Exit code: 0 in caso di successo, lo status di ffmpeg se ffmpeg fallisce, 1 altrimenti
//!
//! ## Esempio di utilizzo:
//! ```bash
//! video-tools chunk-time lecture.mp4 --segment-time 00:10:00 --out-dir parts
//! video-tools chunk-size lecture.mp4 --target-mb 25 --max-seconds 600
//! video-tools concat --dir parts --ext mp4 --output lecture_joined.mp4
//! video-tools compress lecture.mp4 --output lecture_small.mp4 --target-mb 250
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use video_tools::chunk::{self, SegmentBounds};
use video_tools::compress;
use video_tools::concat::{self, ConcatRequest, ConcatSource};
use video_tools::json_output::JsonMessage;
use video_tools::segment::{self, parse_segment_time, SegmentRequest};
use video_tools::utils::format_size;
use video_tools::{Config, FfmpegToolkit, MediaToolkit, StreamMode, ToolPathResolver, VideoToolsError};

#[derive(Parser)]
#[command(name = "video-tools")]
#[command(about = "Small ffmpeg/ffprobe helpers: chunking, concat and size-targeted compression")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON events on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: <config dir>/video-tools/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct SegmentOutput {
    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output file prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Output extension (default: input ext)
    #[arg(long)]
    ext: Option<String>,
}

#[derive(clap::Args)]
struct CopyFlag {
    /// Stream copy (default)
    #[arg(long, overrides_with = "no_copy")]
    copy: bool,

    /// Re-encode instead of stream copy
    #[arg(long, overrides_with = "copy")]
    no_copy: bool,
}

impl CopyFlag {
    fn mode(&self) -> StreamMode {
        // the later of --copy/--no-copy wins
        StreamMode::from_copy_flag(self.copy || !self.no_copy)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Split into fixed-duration chunks
    ChunkTime {
        /// Input video path
        input: PathBuf,

        /// Seconds or HH:MM:SS
        #[arg(long)]
        segment_time: String,

        #[command(flatten)]
        output: SegmentOutput,

        #[command(flatten)]
        copy: CopyFlag,
    },

    /// Split into chunks of roughly --target-mb each
    ChunkSize {
        /// Input video path
        input: PathBuf,

        /// Approx target chunk size in MB
        #[arg(long, allow_negative_numbers = true)]
        target_mb: f64,

        /// Clamp segment time minimum
        #[arg(long)]
        min_seconds: Option<f64>,

        /// Clamp segment time maximum
        #[arg(long)]
        max_seconds: Option<f64>,

        #[command(flatten)]
        output: SegmentOutput,

        #[command(flatten)]
        copy: CopyFlag,
    },

    /// Join files in order (same codec/params recommended for --copy)
    Concat {
        /// Directory of chunks to concat
        #[arg(long)]
        dir: Option<PathBuf>,

        /// If using --dir, only include this extension
        #[arg(long)]
        ext: Option<String>,

        /// Input files to concat in order
        inputs: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        copy: CopyFlag,
    },

    /// Compress toward a target size (CRF if already small, capped bitrate otherwise)
    Compress {
        /// Input video path
        input: PathBuf,

        /// Output file path (default: <input>_compressed.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target output size in MB
        #[arg(long, allow_negative_numbers = true)]
        target_mb: Option<f64>,
    },

    /// Print duration, size and bitrate of a file
    Probe {
        /// Input media path
        input: PathBuf,
    },

    /// Report where ffmpeg and ffprobe were found
    Tools,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let json = args.json;
    if let Err(err) = run(args).await {
        let exit_code = match err.downcast_ref::<VideoToolsError>() {
            Some(tool_error) => {
                if json {
                    JsonMessage::error(tool_error).emit();
                }
                tool_error.exit_code()
            }
            None => 1,
        };
        error!("{:#}", err);
        std::process::exit(exit_code);
    }
}

async fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::from_file(&path).await?,
        None => Config::default(),
    };
    config.json_output |= args.json;
    Ok(config)
}

fn segment_request(
    input: PathBuf,
    segment_seconds: f64,
    output: SegmentOutput,
    copy: &CopyFlag,
    config: &Config,
) -> SegmentRequest {
    SegmentRequest {
        source: input,
        segment_seconds,
        out_dir: output.out_dir.unwrap_or_else(|| config.out_dir.clone()),
        prefix: output.prefix.unwrap_or_else(|| config.prefix.clone()),
        ext: output.ext,
        mode: copy.mode(),
    }
}

async fn run_segments(toolkit: &FfmpegToolkit, request: SegmentRequest, config: &Config) -> Result<()> {
    let set = segment::run(toolkit, &request, &config.segment_profile).await?;
    if config.json_output {
        JsonMessage::segments(request.segment_seconds, &set).emit();
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args).await?;
    let resolver = ToolPathResolver::new();
    let toolkit = FfmpegToolkit::new(&resolver);

    match args.command {
        Command::ChunkTime {
            input,
            segment_time,
            output,
            copy,
        } => {
            let segment_seconds = parse_segment_time(&segment_time)?;
            let request = segment_request(input, segment_seconds, output, &copy, &config);
            run_segments(&toolkit, request, &config).await?;
        }

        Command::ChunkSize {
            input,
            target_mb,
            min_seconds,
            max_seconds,
            output,
            copy,
        } => {
            let metadata = toolkit.probe(&input).await?;
            let plan = chunk::plan(
                &metadata,
                target_mb,
                SegmentBounds {
                    min_seconds,
                    max_seconds,
                },
            )?;
            if config.json_output {
                JsonMessage::ChunkPlan {
                    input: input.clone(),
                    target_mb,
                    plan,
                }
                .emit();
            }

            let request = segment_request(input, plan.segment_seconds, output, &copy, &config);
            run_segments(&toolkit, request, &config).await?;
        }

        Command::Concat {
            dir,
            ext,
            inputs,
            output,
            copy,
        } => {
            let request = ConcatRequest {
                source: ConcatSource::from_args(dir, ext, inputs)?,
                output,
                mode: copy.mode(),
            };
            let report = concat::run(&toolkit, &request, &config.concat_profile).await?;
            if config.json_output {
                JsonMessage::concat(&report).emit();
            }
        }

        Command::Compress {
            input,
            output,
            target_mb,
        } => {
            let mut policy = config.bitrate.clone();
            if let Some(target_mb) = target_mb {
                policy.target_size_mb = target_mb;
            }
            let output = output.unwrap_or_else(|| compress::default_output(&input));

            let plan = compress::run(&toolkit, &input, &output, &policy).await?;
            if config.json_output {
                JsonMessage::BitratePlan { input, output, plan }.emit();
            }
        }

        Command::Probe { input } => {
            let metadata = toolkit.probe(&input).await?;
            if config.json_output {
                JsonMessage::Probe {
                    path: input,
                    metadata,
                }
                .emit();
            } else {
                info!("duration: {:.3}s", metadata.duration_seconds);
                info!("size: {}", format_size(metadata.size_bytes));
                match metadata.bitrate_bps {
                    Some(bps) => info!("bitrate: {:.1} kbps", bps as f64 / 1000.0),
                    None => info!("bitrate: n/a (derived {:.1} kbps)", metadata.effective_bitrate_bps() / 1000.0),
                }
            }
        }

        Command::Tools => {
            println!("{}", resolver.tools_report());
        }
    }

    Ok(())
}
