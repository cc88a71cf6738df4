//! Main entry point for ytsift CLI

use anyhow::{bail, Context};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ytsift::cli::output::OutputFormatter;
use ytsift::cli::{Args, OutputMode, VerbosityLevel};
use ytsift::core::{EngineOutput, Sifter};
use ytsift::engine::{FileEngine, ProcessEngine};
use ytsift::utils::humanize::{MetaSummary, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbosity_level())?;

    debug!("Starting ytsift with args: {:?}", args);

    let mut formatter = OutputFormatter::new(args.verbosity_level());

    match run(&args, &mut formatter).await {
        Ok(()) => Ok(()),
        Err(err) => {
            formatter.finish_spinner();
            formatter.error(&format!("{:#}", err));
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args, formatter: &mut OutputFormatter) -> anyhow::Result<()> {
    let sifter = build_sifter(args);
    let output = extract(args, &sifter, formatter).await?;
    formatter.print_category_counts(&output);

    match args.mode {
        OutputMode::Metadata => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputMode::Summary => {
            formatter.print_summary(&MetaSummary::new(&output.metadata, &SystemClock));
        }
        OutputMode::Urls | OutputMode::Command => {
            let selection = sifter
                .select(&output, args.audio_request().as_ref(), args.video_request().as_ref())
                .context("Format selection failed")?;

            if args.mode == OutputMode::Urls {
                formatter.print_urls(&selection);
            } else {
                let plan = selection.mux_plan(args.mux_target(), args.filter)?;
                println!("{}", plan.command_line(&args.ffmpeg)?);
            }
        }
    }

    Ok(())
}

fn build_sifter(args: &Args) -> Sifter {
    match &args.json_dir {
        Some(dir) => Sifter::with_engine(FileEngine::new(dir)),
        None => Sifter::with_engine(
            ProcessEngine::new(&args.engine)
                .with_args(&args.engine_args)
                .with_timeout(args.timeout_duration()),
        ),
    }
    .with_options(args.sift_options())
}

/// Produce the classified output from a dump file, a dump directory or the engine
async fn extract(
    args: &Args,
    sifter: &Sifter,
    formatter: &mut OutputFormatter,
) -> anyhow::Result<EngineOutput> {
    if let Some(path) = &args.input {
        formatter.info(&format!("Reading extraction document from {}", path.display()));
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(sifter.classify_json(&json)?);
    }

    let Some(target) = &args.target else {
        bail!("Provide a video URL or ID, or --input FILE");
    };

    formatter.start_spinner(&format!("Extracting formats for {}", target));
    let result = sifter.extract(target).await;
    formatter.finish_spinner();

    let output = result.with_context(|| format!("Extraction failed for {}", target))?;
    formatter.success(&format!(
        "Found {} audio and {} video formats",
        output.audio_only.standard.len() + output.audio_only.drc.len(),
        output.video_only.sdr.len() + output.video_only.hdr.len()
    ));
    Ok(output)
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) -> anyhow::Result<()> {
    let default_level = match verbosity {
        VerbosityLevel::Quiet => "error",
        VerbosityLevel::Normal => "info",
        VerbosityLevel::Verbose => "debug",
    };

    // RUST_LOG wins over the verbosity flags
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
