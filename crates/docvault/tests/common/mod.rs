//! Shared helpers for the integration suites: an in-process mock of the
//! document service bound to an ephemeral port, and a client config pointed
//! at it.

use axum::Router;
use std::time::Duration;

use docvault::ClientConfig;

pub fn init_test_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,hyper_util=warn,hyper=warn,reqwest=warn")
            });
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// Serve `router` on 127.0.0.1:0 and return the base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock api");
    });
    format!("http://{addr}")
}

/// Reserve an ephemeral port and release it, yielding a base URL nothing
/// listens on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    }
}
