use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use synrisk::{output, Config, Pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load + validate configuration ────────────────────────────
    let config_path = PathBuf::from(env::args().nth(1).unwrap_or_else(|| "config.yaml".into()));
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    fs::create_dir_all(&config.output_root)?;
    info!(
        samples = config.samples().len(),
        groups = ?config.groups,
        "processing {}", config.data_root.display()
    );

    // ─── 3) run the pipeline, one sample at a time, fail fast ────────
    let pipeline = Pipeline::new(&config)?;
    for result in pipeline.results() {
        let risk = result?;
        let path = output::write_sample_csv(&config.output_root, &risk)?;
        info!(sample = risk.sample, path = %path.display(), "result written");
    }

    info!("all samples complete");
    Ok(())
}
