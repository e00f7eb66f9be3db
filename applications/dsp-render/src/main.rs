/// DSP Render - writes the test tone through each DSP stage to WAV files
use clap::Parser;
use dsp_render::{render, RenderConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dsp-render")]
#[command(about = "Render a test tone through the DSP chain to WAV files", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./dsp-render.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Test tone length in seconds
    #[arg(short, long)]
    seconds: Option<f32>,

    /// Test tone frequency in Hz
    #[arg(short, long)]
    frequency: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dsp_render=info,dsp_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = RenderConfig::load(cli.config.as_deref())?;
    if let Some(out) = cli.out {
        config.output_dir = out;
    }
    if let Some(seconds) = cli.seconds {
        config.seconds = seconds;
    }
    if let Some(frequency) = cli.frequency {
        config.frequency = frequency;
    }
    config.validate()?;

    let report = render(&config)?;

    println!("Average RMS: {:.4}", report.average_rms);
    for (stage, path) in &report.files {
        println!("{stage:>16}: {}", path.display());
    }

    Ok(())
}
