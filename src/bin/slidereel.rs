use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a script to a video file (requires `mimic3`, `pygmentize` and `ffmpeg` on PATH).
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input script YAML.
    script_path: PathBuf,

    /// Output video path.
    output_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = slidereel::ReelConfig::for_script(&args.script_path).with_env_overrides();
    let pipeline = slidereel::Pipeline::with_system_backends(config);
    let report = pipeline
        .run(&args.script_path, &args.output_path)
        .with_context(|| format!("render '{}'", args.script_path.display()))?;

    eprintln!(
        "wrote {} ({} slides, {} voice-overs, {:.2}s; synthesized {}, rendered {})",
        args.output_path.display(),
        report.slides,
        report.voice_overs,
        report.total_duration.as_secs_f64(),
        report.synthesized,
        report.rendered
    );
    Ok(())
}
