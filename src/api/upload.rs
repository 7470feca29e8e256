// src/api/upload.rs
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, StatusCode,
};
use std::fmt;
use tracing::{info, instrument};
use url::Url;

use super::auth::BearerToken;
use crate::error::{PriceSyncError, Result};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Upload response body: JSON when the server says so, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

fn read_body(is_json: bool, text: String) -> ResponseBody {
    if is_json {
        if let Ok(value) = serde_json::from_str(&text) {
            return ResponseBody::Json(value);
        }
    }
    ResponseBody::Text(text)
}

/// PUT the finished price list. A non-success status becomes an upload error
/// carrying the status and body.
#[instrument(level = "info", skip(client, token, csv), fields(url = %url, bytes = csv.len()))]
pub async fn upload_price_list(
    client: &Client,
    url: &Url,
    token: &BearerToken,
    csv: String,
) -> Result<UploadResponse> {
    let resp = client
        .put(url.clone())
        .bearer_auth(token.as_str())
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, CSV_CONTENT_TYPE)
        .body(csv)
        .send()
        .await?;

    let status = resp.status();
    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let body = read_body(is_json, resp.text().await?);
    info!(%status, response = %body, "upload answered");

    if !status.is_success() {
        return Err(PriceSyncError::Upload {
            status,
            body: body.to_string(),
        });
    }
    Ok(UploadResponse { status, body })
}
