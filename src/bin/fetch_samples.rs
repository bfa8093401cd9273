//! Download and unpack the configured DE-SynPUF archives into the data root.
//!
//! Runs entirely before the aggregation pipeline; the pipeline only ever sees
//! the extracted CSVs.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use synrisk::config::Config;
use synrisk::fetch::{urls, zips};
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config_path = PathBuf::from(env::args().nth(1).unwrap_or_else(|| "config.yaml".into()));
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let data_root = config.data_root.clone();
    tokio::fs::create_dir_all(&data_root).await?;

    // one claims archive per sample, one beneficiary archive per (sample, year)
    let mut targets = Vec::new();
    for sample in config.samples() {
        targets.push(urls::inpatient_claims_zip_url(sample)?);
        for year in config.years() {
            targets.push(urls::beneficiary_zip_url(year, sample)?);
        }
    }
    info!("{} archives to download", targets.len());

    // ─── spawn downloader tasks ──────────────────────────────────────
    let client = Client::new();
    let (tx, mut rx) = mpsc::channel::<std::result::Result<PathBuf, (String, String)>>(100);
    let dl_sem = Arc::new(Semaphore::new(3));
    let mut dl_handles = Vec::with_capacity(targets.len());

    for url in targets {
        let client = client.clone();
        let data_root = data_root.clone();
        let tx = tx.clone();
        let sem = dl_sem.clone();

        dl_handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            info!(url = %url, "downloading");
            match zips::download_zip(&client, &url, &data_root).await {
                Ok(path) => {
                    let _ = tx.send(Ok(path)).await;
                }
                Err(err) => {
                    let _ = tx.send(Err((url, err.to_string()))).await;
                }
            }
        }));
    }
    // drop the original sender so `rx.recv()` ends once all downloads finish
    drop(tx);

    // ─── unpack each archive as it lands ─────────────────────────────
    let mut failures = 0usize;
    while let Some(msg) = rx.recv().await {
        match msg {
            Ok(zip_path) => {
                let extracted = tokio::task::spawn_blocking({
                    let zip_path = zip_path.clone();
                    let data_root = data_root.clone();
                    move || zips::extract_zip(&zip_path, &data_root)
                })
                .await?;

                match extracted {
                    Ok(names) => {
                        info!(archive = %zip_path.display(), files = names.len(), "extracted");
                        if let Err(e) = tokio::fs::remove_file(&zip_path).await {
                            error!("failed to delete {}: {e}", zip_path.display());
                        }
                    }
                    Err(e) => {
                        error!("extract {} failed: {e:#}", zip_path.display());
                        failures += 1;
                    }
                }
            }
            Err((url, err)) => {
                error!("download error {url}: {err}");
                failures += 1;
            }
        }
    }

    for handle in dl_handles {
        let _ = handle.await;
    }

    let renamed = zips::normalize_copy_suffix(&data_root)?;
    if renamed > 0 {
        info!(renamed, "normalized ' - Copy.csv' filenames");
    }

    if failures > 0 {
        anyhow::bail!("{failures} archives failed to land");
    }
    info!("acquisition complete");
    Ok(())
}
