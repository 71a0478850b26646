use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docvault::{load_client_config, ApiClient, ClientConfig, MergeOpts, Session, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "dv-login", about = "Log in to the document service with a mobile number and OTP")]
struct Args {
    /// Mobile number registered with the service
    #[arg(long)]
    mobile: String,
    /// One-time code; omit to have one sent first
    #[arg(long)]
    otp: Option<String>,
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
    let client = ApiClient::new(&cfg)?;

    match args.otp {
        None => {
            client.send_otp(&args.mobile).await?;
            println!(
                "OTP sent to {}. Re-run with --otp <code> to finish logging in.",
                args.mobile
            );
        }
        Some(otp) => {
            let identity = client.verify_otp(&args.mobile, &otp).await?;
            let session = Session {
                mobile_number: args.mobile,
                token: identity.token,
                user_id: identity.user_id,
                user_name: identity.user_name,
            };
            SessionStore::new(cfg.session_path).save(&session)?;
            println!("Logged in as {}.", session.user_name);
        }
    }
    Ok(())
}
