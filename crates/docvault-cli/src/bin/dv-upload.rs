use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docvault::{
    load_client_config, ApiClient, ClientConfig, DocumentMetadata, MajorHead, MergeOpts,
    SessionStore, TagCatalog, TagSelection, UploadRequest,
};

#[derive(Parser, Debug)]
#[command(name = "dv-upload", about = "Upload a document with category, date, remarks and tags")]
struct Args {
    /// File to upload (PDF, PNG or JPEG)
    #[arg(long)]
    file: std::path::PathBuf,
    /// Major category: Personal or Professional
    #[arg(long)]
    major: Option<String>,
    /// Minor category under the chosen major
    #[arg(long)]
    minor: Option<String>,
    /// Document date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
    /// Free-form remarks
    #[arg(long, default_value = "")]
    remarks: String,
    /// Tag to attach; repeatable. Labels found in the remote catalog are
    /// attached as catalog tags, anything else as a free-text tag.
    #[arg(long = "tag")]
    tags: Vec<String>,
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

    let major = match &args.major {
        Some(m) => Some(
            MajorHead::parse(m)
                .with_context(|| format!("--major must be Personal or Professional, got {m}"))?,
        ),
        None => None,
    };
    let minor = match args.minor {
        Some(minor) => {
            if !docvault::minor_options(major).contains(&minor.as_str()) {
                bail!("--minor {minor} is not valid for the selected category");
            }
            minor
        }
        None => String::new(),
    };

    let mut catalog = TagCatalog::new();
    let mut tags = TagSelection::new();
    if !args.tags.is_empty() {
        catalog.ensure_loaded(&client, &session.token).await;
        for label in &args.tags {
            if let Some(option) = catalog.find_by_label(label.trim()) {
                tags.add_catalog(option);
            } else {
                tags.add_free_text(label);
            }
        }
    }

    let metadata = DocumentMetadata {
        major_head: major,
        minor_head: minor,
        document_date: args.date,
        document_remarks: args.remarks,
        tags,
    };
    let request = UploadRequest::from_file(&args.file, metadata)?;
    let file_name = request.file_name.clone();
    tracing::info!(file = %file_name, size = request.bytes.len(), "uploading document");
    client.upload_document(request, &session).await?;
    println!("Uploaded {file_name}.");
    Ok(())
}
