// src/api/mod.rs
pub mod auth;
pub mod upload;

pub use auth::{exchange_token, BearerToken, Credentials};
pub use upload::{upload_price_list, ResponseBody, UploadResponse};

pub const DEFAULT_TOKEN_URL: &str = "https://b2bapi.onliner.by/oauth/token";
pub const DEFAULT_UPLOAD_URL: &str = "https://price.api.onliner.by/pricelists";
