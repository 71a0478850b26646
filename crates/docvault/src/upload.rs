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

//! Document upload: validation, metadata assembly, multipart payload.
//!
//! Validation happens entirely before any request: the file must exist and
//! carry an allowed content type, inferred from its extension. The metadata
//! travels as a JSON string in the `data` part of the multipart form, with
//! the document date formatted `DD-MM-YYYY`.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use crate::error::ApiError;
use crate::search::TagFilter;
use crate::taxonomy::{MajorHead, TagSelection};

/// Content types the service accepts.
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["application/pdf", "image/png", "image/jpeg"];

/// Content type for a file path, by extension. None for anything the
/// service does not accept.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// User-entered metadata for one document.
#[derive(Clone, Debug, Default)]
pub struct DocumentMetadata {
    pub major_head: Option<MajorHead>,
    pub minor_head: String,
    pub document_date: Option<NaiveDate>,
    pub document_remarks: String,
    pub tags: TagSelection,
}

/// Wire shape of the `data` part. The service wants `DD-MM-YYYY` dates and
/// plain tag names.
#[derive(Serialize)]
struct MetadataPayload<'a> {
    major_head: &'a str,
    minor_head: &'a str,
    document_date: String,
    document_remarks: &'a str,
    tags: Vec<TagFilter>,
    user_id: &'a str,
}

/// A validated upload, ready for submission.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub metadata: DocumentMetadata,
}

impl UploadRequest {
    /// Read and validate a file. Disallowed types and unreadable paths are
    /// refused here, so no request is ever issued for them.
    pub fn from_file(path: &Path, metadata: DocumentMetadata) -> Result<Self, ApiError> {
        let content_type = content_type_for(path).ok_or_else(|| {
            ApiError::Validation("only PDF, PNG and JPEG files are allowed".into())
        })?;
        let bytes = std::fs::read(path)
            .map_err(|e| ApiError::Validation(format!("cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
            metadata,
        })
    }

    /// The `data` part: metadata plus the uploading user's id, as one JSON
    /// string.
    pub(crate) fn metadata_json(&self, user_id: &str) -> String {
        let payload = MetadataPayload {
            major_head: self
                .metadata
                .major_head
                .map(|m| m.as_str())
                .unwrap_or_default(),
            minor_head: &self.metadata.minor_head,
            document_date: self
                .metadata
                .document_date
                .map(|d| d.format("%d-%m-%Y").to_string())
                .unwrap_or_default(),
            document_remarks: &self.metadata.document_remarks,
            tags: self
                .metadata
                .tags
                .tag_names()
                .into_iter()
                .map(|tag_name| TagFilter { tag_name })
                .collect(),
            user_id,
        };
        // MetadataPayload has no map keys or non-string-keyed content, so
        // serialization cannot fail.
        serde_json::to_string(&payload).unwrap_or_default()
    }
}
