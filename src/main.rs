use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pricesync::{
    api::{Credentials, DEFAULT_TOKEN_URL, DEFAULT_UPLOAD_URL},
    pipeline::{self, SyncOptions},
    process::{detect::AutoDetect, merge::MergeColumns},
    Config,
};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Reconcile a merchant price list with a supplier feed and push it to the marketplace.
#[derive(Parser, Debug)]
#[command(name = "pricesync", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Merchant price list to correct
    #[arg(long, global = true, env = "PRICESYNC_BASE_FILE", default_value = "price-reset.csv")]
    base_file: PathBuf,

    /// Supplier price list (download target and merge input)
    #[arg(long, global = true, env = "PRICESYNC_SUPPLIER_FILE", default_value = "supplier-price.csv")]
    supplier_file: PathBuf,

    /// Merged, upload-ready price list
    #[arg(long, global = true, env = "PRICESYNC_OUTPUT_FILE", default_value = "price-ready.csv")]
    output_file: PathBuf,

    /// Supplier feed to download
    #[arg(long, global = true, env = "SUPPLIER_FEED_URL")]
    feed_url: Option<Url>,

    /// OAuth2 token endpoint for the client-credentials grant
    #[arg(long, global = true, default_value = DEFAULT_TOKEN_URL)]
    token_url: Url,

    /// Marketplace endpoint the finished price list is PUT to
    #[arg(long, global = true, default_value = DEFAULT_UPLOAD_URL)]
    upload_url: Url,

    /// Join column in the merchant list
    #[arg(long, global = true, default_value = "Артикул")]
    base_key: String,

    /// Price column in the merchant list
    #[arg(long, global = true, default_value = "Цена")]
    base_price: String,

    /// Join column in the supplier list
    #[arg(long, global = true, default_value = "vendor_code")]
    supplier_key: String,

    /// Price column in the supplier list (e.g. `price_recommended`)
    #[arg(long, global = true, default_value = "price")]
    supplier_price: String,

    /// Field separator for the output file: `;`, `,` or `tab`
    #[arg(long, global = true, default_value = ";", value_parser = parse_delimiter)]
    output_delimiter: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the supplier feed to the supplier file
    Download,
    /// Merge the two local files into the output file, no network
    Prepare,
    /// Authenticate, download (if a feed URL is set), merge and upload
    Sync {
        /// Merge the supplier file already on disk instead of downloading
        #[arg(long)]
        skip_download: bool,
    },
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("expected a single ASCII character or `tab`, got {:?}", s)),
    }
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            base_path: self.base_file.clone(),
            supplier_path: self.supplier_file.clone(),
            output_path: self.output_file.clone(),
            feed_url: self.feed_url.clone(),
            token_url: self.token_url.clone(),
            upload_url: self.upload_url.clone(),
            columns: MergeColumns {
                base_key: self.base_key.clone(),
                base_price: self.base_price.clone(),
                supplier_key: self.supplier_key.clone(),
                supplier_price: self.supplier_price.clone(),
            },
            output_delimiter: self.output_delimiter,
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    let client = Client::new();

    match cli.command {
        Command::Download => {
            let url = config
                .feed_url
                .as_ref()
                .context("a feed URL is required (--feed-url or SUPPLIER_FEED_URL)")?;
            pipeline::download(&client, url, &config)
                .await
                .context("downloading supplier feed")?;
        }
        Command::Prepare => {
            let prepared =
                pipeline::prepare(&config, &AutoDetect).context("preparing price list")?;
            info!(rows = prepared.rows, updated = prepared.updated, "prepare done");
        }
        Command::Sync { skip_download } => {
            let credentials = Credentials::from_env().context("loading API credentials")?;
            let options = SyncOptions { skip_download };
            let resp = pipeline::sync(&client, &config, &credentials, &AutoDetect, options)
                .await
                .context("syncing price list")?;
            info!(status = %resp.status, response = %resp.body, "sync done");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    info!(command = ?cli.command, "startup");

    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
    info!("all done");
}
