// src/pipeline.rs
use std::{
    io::Write,
    path::{Path, PathBuf},
};

use reqwest::Client;
use tempfile::NamedTempFile;
use tracing::{info, instrument};
use url::Url;

use crate::api::{self, Credentials, UploadResponse};
use crate::error::{PriceSyncError, Result};
use crate::fetch;
use crate::process::{
    detect::FormatDetector,
    load_price_list,
    merge::{merge_prices, MergeColumns},
    serialize::to_delimited_text,
};

/// Everything one run needs. Built once by the binary and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    /// Merchant's current ("reset") price list.
    pub base_path: PathBuf,
    /// Where the supplier feed is read from (and downloaded to).
    pub supplier_path: PathBuf,
    /// Merged, upload-ready price list.
    pub output_path: PathBuf,
    pub feed_url: Option<Url>,
    pub token_url: Url,
    pub upload_url: Url,
    pub columns: MergeColumns,
    pub output_delimiter: u8,
}

impl Config {
    pub fn new(token_url: Url, upload_url: Url) -> Self {
        Self {
            base_path: PathBuf::from("price-reset.csv"),
            supplier_path: PathBuf::from("supplier-price.csv"),
            output_path: PathBuf::from("price-ready.csv"),
            feed_url: None,
            token_url,
            upload_url,
            columns: MergeColumns::default(),
            output_delimiter: b';',
        }
    }
}

/// Outcome of the local merge stage.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub csv: String,
    pub rows: usize,
    pub updated: usize,
}

/// Replace `path` with `contents` in one step, so a failed run never leaves a
/// half-written file behind.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PriceSyncError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| PriceSyncError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| PriceSyncError::io(path, e.error))?;
    Ok(())
}

/// Download the supplier feed at `url` into `config.supplier_path`.
pub async fn download(client: &Client, url: &Url, config: &Config) -> Result<()> {
    fetch::download_feed(client, url, &config.supplier_path).await?;
    Ok(())
}

/// Read both lists, merge supplier prices into the base list, and write the
/// result to `config.output_path`. Nothing is written unless every step succeeds.
#[instrument(level = "info", skip_all, fields(base = %config.base_path.display(), supplier = %config.supplier_path.display()))]
pub fn prepare(config: &Config, detector: &dyn FormatDetector) -> Result<Prepared> {
    let base = load_price_list(&config.base_path, detector)?;
    let supplier = load_price_list(&config.supplier_path, detector)?;

    let merged = merge_prices(&base, &supplier, &config.columns)?;
    let csv = to_delimited_text(&merged.records, config.output_delimiter)?;

    write_atomic(&config.output_path, &csv)?;
    info!(
        path = %config.output_path.display(),
        rows = merged.records.len(),
        updated = merged.updated,
        "wrote upload-ready price list"
    );

    Ok(Prepared {
        csv,
        rows: merged.records.len(),
        updated: merged.updated,
    })
}

/// Knobs for [`sync`] that are not part of the file/endpoint layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Merge the supplier file already on disk even when a feed URL is set.
    pub skip_download: bool,
}

/// Full run: obtain a token, refresh the feed when a URL is configured and
/// downloads are not skipped, merge, then upload. The first failing stage
/// aborts the run.
pub async fn sync(
    client: &Client,
    config: &Config,
    credentials: &Credentials,
    detector: &dyn FormatDetector,
    options: SyncOptions,
) -> Result<UploadResponse> {
    let token = api::exchange_token(client, &config.token_url, credentials).await?;

    match &config.feed_url {
        Some(url) if !options.skip_download => download(client, url, config).await?,
        Some(_) => info!(path = %config.supplier_path.display(), "download skipped; using existing supplier file"),
        None => info!(path = %config.supplier_path.display(), "no feed URL; using existing supplier file"),
    }

    let prepared = prepare(config, detector)?;

    info!(rows = prepared.rows, "uploading price list");
    let resp = api::upload_price_list(client, &config.upload_url, &token, prepared.csv).await?;
    info!(status = %resp.status, "price list uploaded");
    Ok(resp)
}
