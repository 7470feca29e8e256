// src/fetch/mod.rs
use bytes::Bytes;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

use crate::error::{PriceSyncError, Result};
use crate::process::detect::{AutoDetect, FormatDetector};

/// Number of lines shown in the post-download preview.
const PREVIEW_LINES: usize = 5;

/// GET the supplier feed. Any non-success status is a network error.
#[instrument(level = "info", skip(client), fields(url = %url))]
pub async fn fetch_feed(client: &Client, url: &Url) -> Result<Bytes> {
    let resp = client.get(url.clone()).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    info!(bytes = bytes.len(), "fetched supplier feed");
    Ok(bytes)
}

/// Fetch the feed and store it verbatim at `dest`, logging its first lines.
pub async fn download_feed(client: &Client, url: &Url, dest: impl AsRef<Path>) -> Result<Bytes> {
    let dest = dest.as_ref();
    let bytes = fetch_feed(client, url).await?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PriceSyncError::io(parent, e))?;
    }
    fs::write(dest, &bytes)
        .await
        .map_err(|e| PriceSyncError::io(dest, e))?;
    info!(path = %dest.display(), "saved supplier feed");

    info!("feed preview:\n{}", preview(&bytes));
    Ok(bytes)
}

fn preview(bytes: &[u8]) -> String {
    let detected = AutoDetect.detect(bytes);
    detected
        .text
        .lines()
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn download_writes_feed_to_disk() {
        let server = MockServer::start().await;
        let body = "vendor_code;price\nA1;15\nA2;20\n";
        Mock::given(method("GET"))
            .and(path("/export.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("feeds").join("supplier-price.csv");
        let url = Url::parse(&format!("{}/export.csv", server.uri())).unwrap();

        let bytes = download_feed(&Client::new(), &url, &dest).await.unwrap();
        assert_eq!(&bytes[..], body.as_bytes());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn error_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing.csv", server.uri())).unwrap();
        let err = fetch_feed(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, PriceSyncError::Network(_)));
    }

    #[test]
    fn preview_keeps_first_five_lines() {
        let text = "h\n1\n2\n3\n4\n5\n6";
        assert_eq!(preview(text.as_bytes()), "h\n1\n2\n3\n4");
    }
}
