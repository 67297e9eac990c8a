use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::get_styles;

use stroke_analysis::analysis::AnalysisPipeline;
use stroke_analysis::config::ConfigArgs;
use stroke_analysis::landmarks::read_jsonl;
use stroke_analysis::store::{export_csv, open_store};

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyzes a JSON-lines landmark file and stores its summary.
    Analyze {
        /// One JSON array of landmarks per line, `null` for frames without a detection.
        landmarks: PathBuf,

        /// Frame rate of the source video.
        #[clap(long)]
        fps: f64,

        /// Name of the athlete in the video.
        #[clap(long)]
        subject: String,

        /// Input identifier to record. Defaults to the landmark file name.
        #[clap(long)]
        input_id: Option<String>,
    },

    /// Prints the stored summary for an output file name.
    Lookup { output_id: String },

    /// Writes every stored summary as CSV.
    Export {
        /// Destination file. Defaults to stdout.
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
}

fn default_input_id(landmarks: &Path) -> Result<String> {
    landmarks
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Cannot derive an input id from {:?}", landmarks))
}

/// Writes through a temp file in the destination directory so a failed
/// export never leaves a truncated file behind.
fn export_to_file(pipeline: &AnalysisPipeline, output: &Path) -> Result<usize> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    let count = export_csv(pipeline.store().as_ref(), &mut temp)?;
    temp.flush()?;
    temp.persist(output)
        .with_context(|| format!("Failed to write {:?}", output))?;
    Ok(count)
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout carries command output, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let app_config = cli_args.config.resolve()?;
    let store = open_store(app_config.store_backend, &app_config.data_dir)?;
    let pipeline = AnalysisPipeline::new(store, app_config.analysis_settings());

    match cli_args.command {
        Command::Analyze {
            landmarks,
            fps,
            subject,
            input_id,
        } => {
            let input_id = match input_id {
                Some(id) => id,
                None => default_input_id(&landmarks)?,
            };
            let file = File::open(&landmarks)
                .with_context(|| format!("Failed to open {:?}", landmarks))?;
            let frames = read_jsonl(BufReader::new(file))?;
            info!("Read {} frames from {:?}", frames.len(), landmarks);

            let report = pipeline.run_batch(&frames, fps, &input_id, &subject)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Lookup { output_id } => match pipeline.lookup_summary(&output_id)? {
            Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
            None => bail!("No results found for {}", output_id),
        },
        Command::Export { output } => {
            let count = match output {
                Some(path) => export_to_file(&pipeline, &path)?,
                None => {
                    let stdout = io::stdout();
                    let handle = stdout.lock();
                    export_csv(pipeline.store().as_ref(), handle)?
                }
            };
            info!("Exported {} summaries", count);
        }
    }
    Ok(())
}
