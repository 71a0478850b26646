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

//! Document categories and tags.
//!
//! Categories are a fixed two-level taxonomy: a major head with a static set
//! of minors per major. Tags are an open set fetched once per process from
//! the remote catalog, plus ad-hoc free-text tags the user invents locally.

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;

/// Top-level document category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MajorHead {
    Personal,
    Professional,
}

impl MajorHead {
    pub fn as_str(&self) -> &'static str {
        match self {
            MajorHead::Personal => "Personal",
            MajorHead::Professional => "Professional",
        }
    }

    pub fn parse(s: &str) -> Option<MajorHead> {
        match s {
            "Personal" => Some(MajorHead::Personal),
            "Professional" => Some(MajorHead::Professional),
            _ => None,
        }
    }
}

/// Valid minor heads for a major head. Pure lookup, no network call; no major
/// means no minors.
pub fn minor_options(major: Option<MajorHead>) -> &'static [&'static str] {
    match major {
        Some(MajorHead::Personal) => &["John", "Tom", "Emily"],
        Some(MajorHead::Professional) => &["Accounts", "HR", "IT", "Finance"],
        None => &[],
    }
}

/// One entry of the remote tag catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOption {
    pub id: String,
    pub label: String,
}

/// Immutable snapshot of the remote tag catalog, fetched at most once per
/// process. A transport failure leaves the catalog empty rather than
/// surfacing an error to the selection UI.
#[derive(Debug, Default)]
pub struct TagCatalog {
    loaded: bool,
    options: Vec<TagOption>,
}

impl TagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the catalog on first call; later calls return the snapshot even
    /// if the token has changed since.
    pub async fn ensure_loaded(&mut self, client: &ApiClient, token: &str) -> &[TagOption] {
        if !self.loaded {
            self.loaded = true;
            match client.fetch_tags(token, "").await {
                Ok(options) => self.options = options,
                Err(e) => {
                    tracing::warn!(error = %e, "tag catalog unavailable, continuing with no catalog tags");
                    self.options.clear();
                }
            }
        }
        &self.options
    }

    pub fn options(&self) -> &[TagOption] {
        &self.options
    }

    pub fn find_by_label(&self, label: &str) -> Option<&TagOption> {
        self.options.iter().find(|t| t.label == label)
    }
}

/// Tags chosen for a document, in selection order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSelection {
    selected: Vec<TagOption>,
}

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog tag. Returns false when a tag with the same id is
    /// already selected.
    pub fn add_catalog(&mut self, tag: &TagOption) -> bool {
        if self.selected.iter().any(|t| t.id == tag.id) {
            return false;
        }
        self.selected.push(tag.clone());
        true
    }

    /// Add an ad-hoc tag keyed and labeled by its own trimmed text. Adding an
    /// empty string, or a label already present among the selected tags, is a
    /// no-op.
    pub fn add_free_text(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.selected.iter().any(|t| t.label == label) {
            return false;
        }
        self.selected.push(TagOption {
            id: label.to_string(),
            label: label.to_string(),
        });
        true
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn as_slice(&self) -> &[TagOption] {
        &self.selected
    }

    /// Names as the server expects them: plain labels, catalog ids dropped.
    pub fn tag_names(&self) -> Vec<String> {
        self.selected.iter().map(|t| t.label.clone()).collect()
    }
}
