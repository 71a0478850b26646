// Copyright 2025 DocVault Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Remote service client.
//!
//! Five operations against the document management endpoint family, all POST,
//! all wrapped by the service in a `{status, data, message}` envelope. Every
//! operation converts transport and envelope failures into [`ApiError`]
//! variants; none retries, and one failed attempt surfaces immediately.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::search::{DocumentRecord, SearchPayload};
use crate::session::Session;
use crate::taxonomy::TagOption;
use crate::upload::UploadRequest;

/// Identity fields returned by a successful OTP validation.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub token: String,
    pub user_id: String,
    pub user_name: String,
}

/// The service's uniform response wrapper.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    message: Option<String>,
}

impl Envelope {
    /// Rejection text: the `message` field when present, else a string
    /// `data` (the OTP endpoints put their error text there), else generic.
    fn rejection_message(&self) -> String {
        if let Some(m) = &self.message {
            return m.clone();
        }
        if let Some(s) = self.data.as_str() {
            return s.to_string();
        }
        "request rejected by service".to_string()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode_envelope(res: reqwest::Response) -> Result<Envelope, ApiError> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Envelope>(&body)
                .ok()
                .map(|env| env.rejection_message())
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Err(ApiError::Transport(message));
        }
        res.json::<Envelope>()
            .await
            .map_err(|e| ApiError::UnexpectedShape(e.to_string()))
    }

    /// Accept the envelope's payload or convert a `status: false` answer into
    /// a rejection.
    fn require_ok(env: Envelope) -> Result<serde_json::Value, ApiError> {
        if env.status {
            Ok(env.data)
        } else {
            Err(ApiError::Rejected(env.rejection_message()))
        }
    }

    /// Ask the service to send a one-time code to `mobile_number`.
    pub async fn send_otp(&self, mobile_number: &str) -> Result<(), ApiError> {
        tracing::debug!(mobile = %mobile_number, "requesting OTP");
        let res = self
            .http
            .post(self.endpoint("generateOTP"))
            .json(&json!({ "mobile_number": mobile_number }))
            .send()
            .await?;
        Self::require_ok(Self::decode_envelope(res).await?)?;
        Ok(())
    }

    /// Validate a one-time code; success yields the identity needed to
    /// construct a [`Session`].
    pub async fn verify_otp(&self, mobile_number: &str, otp: &str) -> Result<Identity, ApiError> {
        let res = self
            .http
            .post(self.endpoint("validateOTP"))
            .json(&json!({ "mobile_number": mobile_number, "otp": otp }))
            .send()
            .await?;
        let data = Self::require_ok(Self::decode_envelope(res).await?)?;
        serde_json::from_value::<Identity>(data)
            .map_err(|e| ApiError::UnexpectedShape(format!("identity payload: {e}")))
    }

    /// Fetch the tag catalog, optionally filtered by a search term.
    pub async fn fetch_tags(&self, token: &str, term: &str) -> Result<Vec<TagOption>, ApiError> {
        let res = self
            .http
            .post(self.endpoint("documentTags"))
            .header("token", token)
            .json(&json!({ "term": term }))
            .send()
            .await?;
        let data = Self::require_ok(Self::decode_envelope(res).await?)?;
        if !data.is_array() {
            return Err(ApiError::UnexpectedShape("tag catalog is not a list".into()));
        }
        serde_json::from_value::<Vec<TagOption>>(data)
            .map_err(|e| ApiError::UnexpectedShape(format!("tag catalog: {e}")))
    }

    /// Submit a search filter; success yields the documents in server
    /// response order.
    pub async fn search_documents(
        &self,
        payload: &SearchPayload,
        token: &str,
    ) -> Result<Vec<DocumentRecord>, ApiError> {
        tracing::debug!(query = %payload.search.value, "submitting document search");
        let res = self
            .http
            .post(self.endpoint("searchDocumentEntry"))
            .header("token", token)
            .json(payload)
            .send()
            .await?;
        let data = Self::require_ok(Self::decode_envelope(res).await?)?;
        if !data.is_array() {
            return Err(ApiError::UnexpectedShape(
                "search result is not a list".into(),
            ));
        }
        let records = serde_json::from_value::<Vec<DocumentRecord>>(data)
            .map_err(|e| ApiError::UnexpectedShape(format!("search result: {e}")))?;
        tracing::debug!(count = records.len(), "search completed");
        Ok(records)
    }

    /// Submit a validated upload as multipart form data with the session's
    /// token and user id as request headers. An incomplete session fails
    /// before any request is made.
    pub async fn upload_document(
        &self,
        upload: UploadRequest,
        session: &Session,
    ) -> Result<(), ApiError> {
        if !session.is_complete() {
            return Err(ApiError::Validation(
                "session is missing token or user id; log in again".into(),
            ));
        }

        let metadata = upload.metadata_json(&session.user_id);
        let file_part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.content_type)
            .map_err(|e| ApiError::Validation(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("data", metadata);

        let res = self
            .http
            .post(self.endpoint("saveDocumentEntry"))
            .header("token", &session.token)
            .header("user_id", &session.user_id)
            .multipart(form)
            .send()
            .await?;
        Self::require_ok(Self::decode_envelope(res).await?)?;
        Ok(())
    }

    /// Fetch a stored file's raw bytes from an absolute URL. Used by the
    /// download/export paths; not part of the enveloped API family.
    pub async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "file fetch failed with status {status}"
            )));
        }
        Ok(res.bytes().await?.to_vec())
    }

    /// Streaming variant of [`fetch_file`](Self::fetch_file) that writes
    /// chunks straight to `dest` instead of buffering the whole file.
    pub async fn fetch_file_to(
        &self,
        url: &str,
        dest: &std::path::Path,
    ) -> Result<(), ApiError> {
        use futures_util::StreamExt;
        use tokio::io::AsyncWriteExt;

        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "file fetch failed with status {status}"
            )));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| ApiError::Transport(format!("cannot create {}: {e}", dest.display())))?;
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ApiError::Transport(format!("write failed: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| ApiError::Transport(format!("flush failed: {e}")))?;
        Ok(())
    }
}
