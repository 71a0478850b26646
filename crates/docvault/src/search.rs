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

//! Document search workflow.
//!
//! Filter fields are buffered in a [`SearchFilter`] and only committed to a
//! wire payload when the user explicitly triggers a search. The workflow is a
//! small state machine, `Idle -> Searching -> Results(N) | Failed(reason)`,
//! re-entrant from any settled state; a trigger while a request is in flight
//! is refused without issuing a second request.

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::Session;
use crate::taxonomy::{minor_options, MajorHead};

/// Pagination window for the baseline design: first page only, no load-more.
pub const SEARCH_PAGE_START: u32 = 0;
pub const SEARCH_PAGE_LENGTH: u32 = 10;

/// One document in a search response. Owned by the remote service; the
/// client treats it as a read-only snapshot and tolerates absent fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub uploaded_by: String,
    #[serde(default)]
    pub document_remarks: String,
    #[serde(default)]
    pub file_type: String,
}

/// Wire shape of a single tag filter entry, shared by the search payload and
/// upload metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub tag_name: String,
}

/// The `search` sub-object of the filter payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub value: String,
}

/// Complete filter object as the service expects it. Empty fields are
/// serialized as empty strings, never omitted, so the server always receives
/// the same shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPayload {
    pub major_head: String,
    pub minor_head: String,
    pub from_date: String,
    pub to_date: String,
    pub tags: Vec<TagFilter>,
    pub uploaded_by: String,
    pub start: u32,
    pub length: u32,
    #[serde(rename = "filterId")]
    pub filter_id: String,
    pub search: SearchTerm,
}

/// Buffered filter fields. Nothing here touches the network; the workflow
/// commits a snapshot via [`SearchFilter::to_payload`] on trigger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilter {
    free_text: String,
    major_head: Option<MajorHead>,
    minor_head: String,
    tag: String,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The free-text query is passed through verbatim, no trimming.
    pub fn set_free_text(&mut self, value: impl Into<String>) {
        self.free_text = value.into();
    }

    /// Changing the major head invalidates any minor chosen under the
    /// previous one, so the minor selection is cleared here rather than left
    /// to the caller.
    pub fn set_major_head(&mut self, major: Option<MajorHead>) {
        if self.major_head != major {
            self.minor_head.clear();
        }
        self.major_head = major;
    }

    pub fn major_head(&self) -> Option<MajorHead> {
        self.major_head
    }

    /// Select a minor head. An empty string always clears the selection;
    /// anything else must come from the current major's option table.
    /// Returns false (leaving the selection unchanged) otherwise.
    pub fn set_minor_head(&mut self, minor: &str) -> bool {
        if minor.is_empty() {
            self.minor_head.clear();
            return true;
        }
        if minor_options(self.major_head).contains(&minor) {
            self.minor_head = minor.to_string();
            return true;
        }
        false
    }

    pub fn minor_head(&self) -> &str {
        &self.minor_head
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn set_from_date(&mut self, date: Option<NaiveDate>) {
        self.from_date = date;
    }

    pub fn set_to_date(&mut self, date: Option<NaiveDate>) {
        self.to_date = date;
    }

    /// Commit the buffered fields to the uniformly-shaped wire payload. A
    /// non-empty tag becomes a one-element tag filter list; everything unset
    /// normalizes to an empty string.
    pub fn to_payload(&self) -> SearchPayload {
        SearchPayload {
            major_head: self
                .major_head
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            minor_head: self.minor_head.clone(),
            from_date: self
                .from_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            to_date: self
                .to_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            tags: if self.tag.is_empty() {
                Vec::new()
            } else {
                vec![TagFilter {
                    tag_name: self.tag.clone(),
                }]
            },
            uploaded_by: String::new(),
            start: SEARCH_PAGE_START,
            length: SEARCH_PAGE_LENGTH,
            filter_id: String::new(),
            search: SearchTerm {
                value: self.free_text.clone(),
            },
        }
    }
}

/// Workflow state. `Failed` keeps the reason instead of collapsing into an
/// empty result list; its record view is still an empty slice, so callers
/// that only look at records see the same shape either way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
    Results(Vec<DocumentRecord>),
    Failed { reason: String },
}

impl SearchState {
    /// The current ResultSet view: empty unless a search has settled with
    /// results.
    pub fn records(&self) -> &[DocumentRecord] {
        match self {
            SearchState::Results(records) => records,
            _ => &[],
        }
    }
}

/// What a single trigger produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A prior request had not settled; nothing was sent.
    Busy,
    Completed(usize),
    Failed(String),
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::Idle
    }
}

/// State observable while a request is in flight, shared with whatever owns
/// the trigger control. The busy flag is claimed atomically at trigger time,
/// so a second trigger racing the first sees `Busy` instead of issuing a
/// duplicate request.
#[derive(Debug, Default)]
struct SharedSearchState {
    busy: AtomicBool,
    state: Mutex<SearchState>,
}

/// Buffered filter plus the state machine around one in-flight search.
/// Submission takes `&self`; the filter buffer is edited between searches
/// via `filter_mut`.
#[derive(Debug, Default)]
pub struct SearchWorkflow {
    filter: SearchFilter,
    shared: Arc<SharedSearchState>,
}

impl SearchWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut SearchFilter {
        &mut self.filter
    }

    /// Snapshot of the current workflow state.
    pub fn state(&self) -> SearchState {
        self.shared.state.lock().clone()
    }

    /// True while a request is in flight; the trigger control should be
    /// disabled whenever this holds.
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::SeqCst)
    }

    /// Convenience view of the current ResultSet.
    pub fn records(&self) -> Vec<DocumentRecord> {
        self.shared.state.lock().records().to_vec()
    }

    fn set_state(&self, next: SearchState) {
        *self.shared.state.lock() = next;
    }

    /// Explicit search trigger. Refused while a prior request is in flight;
    /// otherwise commits the buffered filter, submits it, and settles into
    /// `Results` or `Failed`. The previous ResultSet is replaced wholesale
    /// either way.
    pub async fn submit(&self, client: &ApiClient, session: &Session) -> SearchOutcome {
        // swap(true) both claims the flag and reports a prior claim; the
        // in-flight trigger keeps ownership, so nothing to undo here.
        if self.shared.busy.swap(true, Ordering::SeqCst) {
            tracing::debug!("search trigger refused, request already in flight");
            return SearchOutcome::Busy;
        }
        if !session.is_complete() {
            let reason = ApiError::Validation("not logged in".into()).to_string();
            self.set_state(SearchState::Failed {
                reason: reason.clone(),
            });
            self.shared.busy.store(false, Ordering::SeqCst);
            return SearchOutcome::Failed(reason);
        }

        let payload = self.filter.to_payload();
        self.set_state(SearchState::Searching);
        let outcome = match client.search_documents(&payload, &session.token).await {
            Ok(records) => {
                let count = records.len();
                self.set_state(SearchState::Results(records));
                SearchOutcome::Completed(count)
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(error = %reason, "search failed");
                self.set_state(SearchState::Failed {
                    reason: reason.clone(),
                });
                SearchOutcome::Failed(reason)
            }
        };
        self.shared.busy.store(false, Ordering::SeqCst);
        outcome
    }
}
