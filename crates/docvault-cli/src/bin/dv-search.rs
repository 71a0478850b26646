use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docvault::{
    download_document, export_all, load_client_config, preview_kind, ApiClient, ClientConfig,
    MajorHead, MergeOpts, SearchOutcome, SearchWorkflow, SessionStore, BULK_ARCHIVE_NAME,
};

#[derive(Parser, Debug)]
#[command(
    name = "dv-search",
    about = "Search stored documents, download single results, or export all as a ZIP"
)]
struct Args {
    /// Free-text query matched by the service against name/owner
    #[arg(long, default_value = "")]
    query: String,
    /// Major category: Personal or Professional
    #[arg(long)]
    major: Option<String>,
    /// Minor category under the chosen major
    #[arg(long)]
    minor: Option<String>,
    /// Single tag filter
    #[arg(long)]
    tag: Option<String>,
    /// Lower date bound (YYYY-MM-DD)
    #[arg(long)]
    from: Option<chrono::NaiveDate>,
    /// Upper date bound (YYYY-MM-DD)
    #[arg(long)]
    to: Option<chrono::NaiveDate>,
    /// Emit JSON (NDJSON)
    #[arg(long)]
    json: bool,
    /// Download the Nth result (1-based) after searching
    #[arg(long)]
    download: Option<usize>,
    /// Directory for --download (default: current directory)
    #[arg(long)]
    out: Option<std::path::PathBuf>,
    /// Export every result into a ZIP archive at the given path
    #[arg(long)]
    save_all: Option<std::path::PathBuf>,
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

    let mut workflow = SearchWorkflow::new();
    {
        let filter = workflow.filter_mut();
        filter.set_free_text(args.query);
        if let Some(major) = &args.major {
            let major = MajorHead::parse(major)
                .with_context(|| format!("--major must be Personal or Professional, got {major}"))?;
            filter.set_major_head(Some(major));
        }
        if let Some(minor) = &args.minor {
            if !filter.set_minor_head(minor) {
                bail!("--minor {minor} is not valid for the selected category");
            }
        }
        if let Some(tag) = args.tag {
            filter.set_tag(tag);
        }
        filter.set_from_date(args.from);
        filter.set_to_date(args.to);
    }

    tracing::info!(user = %session.user_name, "submitting search");
    let count = match workflow.submit(&client, &session).await {
        SearchOutcome::Completed(count) => count,
        SearchOutcome::Failed(reason) => bail!("search failed: {reason}"),
        SearchOutcome::Busy => bail!("a search is already in flight"),
    };

    let records = workflow.records();
    if args.json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        for (i, record) in records.iter().enumerate() {
            println!(
                "{:>2}. {}  [{:?}]  uploaded by {}  {}",
                i + 1,
                if record.file_name.is_empty() {
                    "(unnamed)"
                } else {
                    record.file_name.as_str()
                },
                preview_kind(record),
                record.uploaded_by,
                record.document_remarks
            );
        }
        eprintln!("{count} results");
    }

    if let Some(index) = args.download {
        let record = records
            .get(index.checked_sub(1).context("--download is 1-based")?)
            .with_context(|| format!("no result #{index}"))?;
        let out_dir = args.out.unwrap_or_else(|| std::path::PathBuf::from("."));
        let path = download_document(&client, record, &out_dir).await?;
        println!("Saved {}", path.display());
    }

    if let Some(dest) = args.save_all {
        let dest = if dest.is_dir() {
            dest.join(BULK_ARCHIVE_NAME)
        } else {
            dest
        };
        let summary = export_all(&client, &records, &dest, cfg.export_concurrency).await?;
        println!(
            "Archived {} of {} files to {}",
            summary.archived.len(),
            records.len(),
            dest.display()
        );
        for skipped in &summary.skipped {
            eprintln!("skipped {}: {}", skipped.file_name, skipped.reason);
        }
    }

    Ok(())
}
