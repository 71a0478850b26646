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

//! Download, bulk ZIP export, and preview classification.
//!
//! Single downloads stream to disk under a filename derived from the file
//! URL. Bulk export fetches every record of the current ResultSet under a
//! bounded number of concurrent requests, packs whatever succeeded into one
//! archive, and reports what was skipped; a per-file failure never aborts the
//! export. There is no cancellation once an export starts.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::search::DocumentRecord;

/// Fixed name for the bulk export archive.
pub const BULK_ARCHIVE_NAME: &str = "all_documents.zip";

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Derive a local filename from a file URL: the last path segment with any
/// query string (and fragment) stripped. None when the URL has no path
/// beyond the authority, so a bare `scheme://host` never yields the host as
/// a filename.
pub fn filename_from_url(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let after_scheme = match without_query.find("://") {
        Some(idx) => &without_query[idx + 3..],
        None => without_query,
    };
    // everything before the first '/' is the authority, not a path segment
    let (_, path) = after_scheme.split_once('/')?;
    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}

/// Name to save a record under: URL-derived first, then the server-supplied
/// name, then a fixed fallback.
pub fn download_filename(record: &DocumentRecord) -> String {
    if let Some(name) = filename_from_url(&record.file_url) {
        return name;
    }
    if !record.file_name.is_empty() {
        return record.file_name.clone();
    }
    "document".to_string()
}

/// How a record can be previewed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewKind {
    /// Recognized image type, safe to render inline.
    InlineImage,
    /// Anything else with a URL, PDF included: open in a separate context.
    OpenExternally,
    /// No file URL, nothing to preview.
    Unavailable,
}

/// Classify a record for preview. Pure function of the record's declared
/// file type and its filename extension.
pub fn preview_kind(record: &DocumentRecord) -> PreviewKind {
    if record.file_url.is_empty() {
        return PreviewKind::Unavailable;
    }
    let declared = record.file_type.to_ascii_lowercase();
    if declared == "image" || IMAGE_EXTENSIONS.contains(&declared.as_str()) {
        return PreviewKind::InlineImage;
    }
    let name = download_filename(record);
    if let Some((_, ext)) = name.rsplit_once('.') {
        if IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return PreviewKind::InlineImage;
        }
    }
    PreviewKind::OpenExternally
}

/// Download one record into `dest_dir`, returning the written path. A record
/// without a file URL is refused before any request.
pub async fn download_document(
    client: &ApiClient,
    record: &DocumentRecord,
    dest_dir: &Path,
) -> Result<PathBuf, ApiError> {
    if record.file_url.is_empty() {
        return Err(ApiError::Validation("file URL missing".into()));
    }
    let dest = dest_dir.join(download_filename(record));
    client.fetch_file_to(&record.file_url, &dest).await?;
    tracing::info!(path = %dest.display(), "document saved");
    Ok(dest)
}

/// A file the bulk export had to leave out of the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

/// What a bulk export did: entry names in archive order, plus everything
/// that was skipped and why.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub archived: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

impl ExportSummary {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fetch every record and pack the successes into a single ZIP archive at
/// `dest`. Per-file fetches run under a semaphore capped at `concurrency`;
/// archive entries keep ResultSet order regardless of fetch completion
/// order. With no records the archive is not written at all.
pub async fn export_all(
    client: &ApiClient,
    records: &[DocumentRecord],
    dest: &Path,
    concurrency: usize,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    if records.is_empty() {
        tracing::debug!("nothing to export");
        return Ok(summary);
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        let semaphore = semaphore.clone();
        let client = client.clone();
        let record = record.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(p) => p,
                Err(_) => return (record, Err("export aborted".to_string())),
            };
            if record.file_url.is_empty() {
                return (record, Err("file URL missing".to_string()));
            }
            let fetched = client
                .fetch_file(&record.file_url)
                .await
                .map_err(|e| e.to_string());
            (record, fetched)
        }));
    }

    // Awaiting the handles in spawn order keeps the archive in ResultSet
    // order even though the fetches complete out of order.
    let mut fetched: Vec<(DocumentRecord, Vec<u8>)> = Vec::new();
    for task in tasks {
        match task.await {
            Ok((record, Ok(bytes))) => fetched.push((record, bytes)),
            Ok((record, Err(reason))) => {
                tracing::warn!(file = %download_filename(&record), error = %reason, "skipping file in bulk export");
                summary.skipped.push(SkippedFile {
                    file_name: download_filename(&record),
                    reason,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "export task failed");
                summary.skipped.push(SkippedFile {
                    file_name: String::new(),
                    reason: format!("task failed: {e}"),
                });
            }
        }
    }

    let mut used_names: HashSet<String> = HashSet::new();
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (record, bytes) in &fetched {
            let entry = unique_entry_name(&download_filename(record), &mut used_names);
            writer
                .start_file(entry.clone(), options)
                .with_context(|| format!("adding {entry} to archive"))?;
            writer.write_all(bytes).context("writing archive entry")?;
            summary.archived.push(entry);
        }
        writer.finish().context("finishing archive")?;
    }
    tokio::fs::write(dest, cursor.into_inner())
        .await
        .with_context(|| format!("writing {}", dest.display()))?;

    tracing::info!(
        archived = summary.archived.len(),
        skipped = summary.skipped.len(),
        path = %dest.display(),
        "bulk export finished"
    );
    Ok(summary)
}

/// Two distinct records can derive the same filename; suffix later ones so
/// they cannot overwrite each other inside the archive.
fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.to_string(), String::new()),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
