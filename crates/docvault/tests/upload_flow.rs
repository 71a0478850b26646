//! Upload workflow: validation happens before any request, and the multipart
//! submission carries the file, the metadata JSON, and the session headers.

mod common;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};

use docvault::{
    ApiClient, ApiError, DocumentMetadata, MajorHead, Session, TagSelection, UploadRequest,
};

/// One multipart submission as the mock saw it.
#[derive(Clone, Debug, Default)]
struct SeenUpload {
    token: Option<String>,
    user_id: Option<String>,
    file_name: Option<String>,
    file_content_type: Option<String>,
    file_bytes: Vec<u8>,
    data: Option<Value>,
}

#[derive(Clone, Default)]
struct Uploads(Arc<Mutex<Vec<SeenUpload>>>);

async fn save_handler(
    State(uploads): State<Uploads>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut seen = SeenUpload {
        token: headers
            .get("token")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        user_id: headers
            .get("user_id")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        ..SeenUpload::default()
    };
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("file") => {
                seen.file_name = field.file_name().map(String::from);
                seen.file_content_type = field.content_type().map(String::from);
                seen.file_bytes = field.bytes().await.expect("file bytes").to_vec();
            }
            Some("data") => {
                let raw = field.text().await.expect("data text");
                seen.data = serde_json::from_str(&raw).ok();
            }
            _ => {}
        }
    }
    uploads.0.lock().unwrap().push(seen);
    Json(json!({"status": true, "data": "saved"}))
}

fn upload_app(uploads: Uploads) -> Router {
    Router::new()
        .route("/saveDocumentEntry", post(save_handler))
        .with_state(uploads)
}

fn session() -> Session {
    Session {
        mobile_number: "9999999999".into(),
        token: "t1".into(),
        user_id: "u1".into(),
        user_name: "Jane".into(),
    }
}

fn temp_pdf(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("tempfile");
    tmp.write_all(contents).unwrap();
    tmp
}

#[tokio::test]
async fn valid_upload_sends_multipart_with_session_headers() {
    common::init_test_logging();

    let uploads = Uploads::default();
    let base = common::serve(upload_app(uploads.clone())).await;
    let client = ApiClient::new(&common::test_config(&base)).expect("client");

    let tmp = temp_pdf(b"%PDF-1.4 test");
    let mut tags = TagSelection::new();
    tags.add_free_text("urgent");
    let metadata = DocumentMetadata {
        major_head: Some(MajorHead::Professional),
        minor_head: "Accounts".into(),
        document_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 7),
        document_remarks: "February invoices".into(),
        tags,
    };

    let request = UploadRequest::from_file(tmp.path(), metadata).expect("validated");
    client
        .upload_document(request, &session())
        .await
        .expect("upload");

    let seen = uploads.0.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let seen = &seen[0];
    assert_eq!(seen.token.as_deref(), Some("t1"));
    assert_eq!(seen.user_id.as_deref(), Some("u1"));
    assert_eq!(seen.file_content_type.as_deref(), Some("application/pdf"));
    assert_eq!(seen.file_bytes, b"%PDF-1.4 test");
    assert!(seen
        .file_name
        .as_deref()
        .is_some_and(|n| n.ends_with(".pdf")));

    let data = seen.data.as_ref().expect("data part is JSON");
    assert_eq!(data["major_head"], "Professional");
    assert_eq!(data["minor_head"], "Accounts");
    assert_eq!(data["document_date"], "07-02-2024");
    assert_eq!(data["document_remarks"], "February invoices");
    assert_eq!(data["tags"], json!([{"tag_name": "urgent"}]));
    assert_eq!(data["user_id"], "u1");
}

#[tokio::test]
async fn disallowed_file_type_never_reaches_the_service() {
    common::init_test_logging();

    let uploads = Uploads::default();
    let _base = common::serve(upload_app(uploads.clone())).await;

    let mut tmp = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("tempfile");
    tmp.write_all(b"plain text").unwrap();

    let err = UploadRequest::from_file(tmp.path(), DocumentMetadata::default())
        .expect_err("txt refused");
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(uploads.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn incomplete_session_fails_before_any_request() {
    common::init_test_logging();

    let uploads = Uploads::default();
    let base = common::serve(upload_app(uploads.clone())).await;
    let client = ApiClient::new(&common::test_config(&base)).expect("client");

    let tmp = temp_pdf(b"%PDF-1.4");
    let request =
        UploadRequest::from_file(tmp.path(), DocumentMetadata::default()).expect("validated");

    let mut incomplete = session();
    incomplete.user_id.clear();

    let err = client
        .upload_document(request, &incomplete)
        .await
        .expect_err("incomplete session refused");
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(uploads.0.lock().unwrap().is_empty());
}
