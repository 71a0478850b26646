use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docvault::{load_client_config, ApiClient, ClientConfig, MergeOpts, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "dv-tags", about = "List the remote tag catalog")]
struct Args {
    /// Filter the catalog by a search term
    #[arg(long, default_value = "")]
    term: String,
    /// Emit JSON (NDJSON)
    #[arg(long)]
    json: bool,
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Override the API base URL (env: DOCVAULT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper_util=warn,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let cfg = load_client_config(
        ClientConfig::default(),
        MergeOpts {
            config_path: args.config,
            cli_base_url: args.base_url,
            ..Default::default()
        },
    )?;
    let session = SessionStore::new(cfg.session_path.clone())
        .load()
        .context("not logged in; run dv-login first")?;
    let client = ApiClient::new(&cfg)?;

    let tags = client.fetch_tags(&session.token, &args.term).await?;
    if args.json {
        for tag in &tags {
            println!("{}", serde_json::to_string(tag)?);
        }
    } else {
        for tag in &tags {
            println!("{}\t{}", tag.id, tag.label);
        }
        eprintln!("{} tags", tags.len());
    }
    Ok(())
}
