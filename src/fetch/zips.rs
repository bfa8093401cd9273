//! Downloading and unpacking CMS archives.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Client;
use url::Url;
use zip::ZipArchive;

/// Download the given ZIP URL and save it under `dest_dir` using the original
/// filename. Returns the full path of the saved file.
pub async fn download_zip(
    client: &Client,
    url_str: &str,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let url = Url::parse(url_str)?;
    let filename = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.zip");
    let dest_path = dest_dir.join(filename);

    if let Some(parent) = dest_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let resp = client
        .get(url.as_str())
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("downloading {url_str}"))?;
    let bytes = resp.bytes().await?;
    tokio::fs::write(&dest_path, &bytes).await?;

    Ok(dest_path)
}

/// Unpack every entry of `zip_path` into `out_dir`. Returns the entry names.
pub fn extract_zip(zip_path: &Path, out_dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(out_dir)?;
    let file =
        File::open(zip_path).with_context(|| format!("opening {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    archive
        .extract(out_dir)
        .with_context(|| format!("extracting {}", zip_path.display()))?;
    Ok(names)
}

/// Some published archives contain files named `… - Copy.csv`; normalize the
/// suffix so discovery's filename patterns match. Returns the rename count.
pub fn normalize_copy_suffix(dir: &Path) -> Result<usize> {
    let mut renamed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(" - Copy.csv") {
            fs::rename(&path, dir.join(format!("{stem}.csv")))?;
            renamed += 1;
        }
    }
    Ok(renamed)
}
