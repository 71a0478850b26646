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

//! Authenticated identity and its on-disk store.
//!
//! The service issues one identity per OTP validation; the client keeps it as
//! a single JSON record at a fixed path. Lifecycle is explicit: restore on
//! startup, save on login, clear on logout. Workflows receive the session as
//! a parameter instead of reading ambient state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Identity established by a successful OTP verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub mobile_number: String,
    pub token: String,
    pub user_id: String,
    pub user_name: String,
}

impl Session {
    /// A session can authorize requests only with a non-empty token and
    /// user id.
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.user_id.is_empty()
    }
}

/// File-backed store for the single session record.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Restore the persisted session if one exists. A missing file is a
    /// normal logged-out state; an unreadable record is treated the same but
    /// logged.
    pub fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(_) => return None,
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session record");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Delete the persisted record. Clearing an already-empty store is fine.
    pub fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
