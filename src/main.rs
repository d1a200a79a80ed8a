use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use grisaille_core::{Pipeline, PipelineConfig, PipelineOutput, io};

const DEFAULT_INPUT: &str = "src.png";
const DEFAULT_OUTPUT: &str = "out.png";

/// Paths for one run, taken from positional arguments:
/// `grisaille [INPUT] [OUTPUT] [CONFIG.json]`.
#[derive(Debug, PartialEq)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Self {
        let input = args.next().unwrap_or_else(|| DEFAULT_INPUT.to_string());
        let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
        Self {
            input: input.into(),
            output: output.into(),
            config: args.next().map(PathBuf::from),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Human-readable duration lines for the stages of the standard pipeline.
fn timing_lines(output: &PipelineOutput) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(elapsed) = output.timing("grayscale") {
        lines.push(format!("Grayscale conversion took {elapsed:?}"));
    }
    if let Some(elapsed) = output.timing("blur") {
        lines.push(format!("Blurring took {elapsed:?}"));
    }
    lines
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let img = io::load_image(&args.input)?;

    let pipeline = Pipeline::from_config(&config);
    info!(stages = ?pipeline.stage_names(), "running pipeline");
    let output = pipeline.run(img)?;

    // Printed regardless of the log filter.
    for line in timing_lines(&output) {
        eprintln!("{line}");
    }

    io::save_png(&output.image, &args.output)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1));
    run(&args)
}
