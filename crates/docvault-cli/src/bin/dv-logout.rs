use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docvault::{load_client_config, ClientConfig, MergeOpts, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "dv-logout", about = "Clear the stored session")]
struct Args {
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let cfg = load_client_config(
        ClientConfig::default(),
        MergeOpts {
            config_path: args.config,
            ..Default::default()
        },
    )?;
    SessionStore::new(cfg.session_path).clear()?;
    println!("Logged out.");
    Ok(())
}
