use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Production endpoint family for the document management service.
pub const DEFAULT_BASE_URL: &str = "https://apis.allsoft.co/api/documentManagement";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EXPORT_CONCURRENCY: usize = 4;

/// Client-side settings shared by the library and the `dv-*` binaries.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    /// Upper bound on concurrent per-file fetches during bulk export.
    pub export_concurrency: usize,
    /// Where the single persisted session record lives.
    pub session_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            export_concurrency: DEFAULT_EXPORT_CONCURRENCY,
            session_path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("docvault")
        .join("auth.json")
}

/// CLI-level options that binaries pass to `load_client_config`.
/// Keep this small and explicit; binaries can expand for extra fields.
#[derive(Clone, Debug, Default)]
pub struct MergeOpts {
    pub config_path: Option<PathBuf>,
    pub cli_base_url: Option<String>,
    pub cli_request_timeout_seconds: Option<u64>,
    pub cli_export_concurrency: Option<usize>,
    pub cli_session_path: Option<PathBuf>,
}

/// Load and merge ClientConfig from: defaults <- config file <- env vars <- CLI
pub fn load_client_config(mut base: ClientConfig, opts: MergeOpts) -> Result<ClientConfig> {
    if let Some(path) = opts.config_path.as_ref() {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            let v: toml::Value = toml::from_str(&s)?;
            if let Some(u) = v.get("base_url").and_then(|x| x.as_str()) {
                base.base_url = u.to_string();
            }
            if let Some(t) = v.get("request_timeout_seconds").and_then(|x| x.as_integer()) {
                base.request_timeout = Duration::from_secs(t as u64);
            }
            if let Some(c) = v.get("export_concurrency").and_then(|x| x.as_integer()) {
                base.export_concurrency = c as usize;
            }
            if let Some(p) = v.get("session_path").and_then(|x| x.as_str()) {
                base.session_path = PathBuf::from(p);
            }
        }
    }

    // env vars override file
    if let Ok(u) = std::env::var("DOCVAULT_BASE_URL") {
        base.base_url = u;
    }
    if let Ok(t) = std::env::var("DOCVAULT_REQUEST_TIMEOUT_SECONDS") {
        if let Ok(v) = t.parse::<u64>() {
            base.request_timeout = Duration::from_secs(v);
        }
    }
    if let Ok(c) = std::env::var("DOCVAULT_EXPORT_CONCURRENCY") {
        if let Ok(v) = c.parse::<usize>() {
            base.export_concurrency = v;
        }
    }
    if let Ok(p) = std::env::var("DOCVAULT_SESSION_PATH") {
        base.session_path = PathBuf::from(p);
    }

    // CLI overrides everything
    if let Some(u) = opts.cli_base_url {
        base.base_url = u;
    }
    if let Some(t) = opts.cli_request_timeout_seconds {
        base.request_timeout = Duration::from_secs(t);
    }
    if let Some(c) = opts.cli_export_concurrency {
        base.export_concurrency = c;
    }
    if let Some(p) = opts.cli_session_path {
        base.session_path = p;
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn init_test_logging() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        });
    }

    fn clear_env() {
        std::env::remove_var("DOCVAULT_BASE_URL");
        std::env::remove_var("DOCVAULT_REQUEST_TIMEOUT_SECONDS");
        std::env::remove_var("DOCVAULT_EXPORT_CONCURRENCY");
        std::env::remove_var("DOCVAULT_SESSION_PATH");
    }

    #[test]
    #[serial_test::serial]
    fn test_merge_file_env_cli_precedence() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
base_url = "http://file.example/api"
request_timeout_seconds = 11
export_concurrency = 3
"#;
        fs::write(tmp.path(), toml).unwrap();

        std::env::set_var("DOCVAULT_BASE_URL", "http://env.example/api");
        std::env::set_var("DOCVAULT_REQUEST_TIMEOUT_SECONDS", "22");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            cli_base_url: Some("http://cli.example/api".into()),
            cli_request_timeout_seconds: Some(33),
            cli_export_concurrency: None,
            cli_session_path: None,
        };

        let got = load_client_config(ClientConfig::default(), opts).expect("load");
        assert_eq!(got.base_url, "http://cli.example/api");
        assert_eq!(got.request_timeout.as_secs(), 33);
        // no env/CLI override, file wins over default
        assert_eq!(got.export_concurrency, 3);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_file_then_env() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
base_url = "http://file-only.example/api"
request_timeout_seconds = 7
"#;
        fs::write(tmp.path(), toml).unwrap();

        std::env::set_var("DOCVAULT_BASE_URL", "http://env-only.example/api");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        let got = load_client_config(ClientConfig::default(), opts).expect("load");
        assert_eq!(got.base_url, "http://env-only.example/api");
        assert_eq!(got.request_timeout.as_secs(), 7);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_env_is_ignored() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
request_timeout_seconds = 12
export_concurrency = 6
"#;
        fs::write(tmp.path(), toml).unwrap();

        std::env::set_var("DOCVAULT_REQUEST_TIMEOUT_SECONDS", "not-a-number");
        std::env::set_var("DOCVAULT_EXPORT_CONCURRENCY", "also-bad");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        let got = load_client_config(ClientConfig::default(), opts).expect("load");
        assert_eq!(got.request_timeout.as_secs(), 12);
        assert_eq!(got.export_concurrency, 6);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_defaults_without_file() {
        init_test_logging();
        clear_env();

        let got = load_client_config(ClientConfig::default(), MergeOpts::default()).expect("load");
        assert_eq!(got.base_url, DEFAULT_BASE_URL);
        assert_eq!(got.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(got.export_concurrency, DEFAULT_EXPORT_CONCURRENCY);
        assert!(got.session_path.ends_with("docvault/auth.json"));
    }
}
