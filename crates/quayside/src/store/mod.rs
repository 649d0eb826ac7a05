/*
 *  Copyright 2025 Quayside Contributors
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Persistence seam for catalog entries.
//!
//! The catalog does not prescribe a storage technology. Operations receive an
//! explicitly injected [`CatalogStore`] handle; there is no process-wide
//! singleton. The in-memory implementation here is the reference backend and
//! the one the test suite runs against; database-backed implementations live
//! in their own crates.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ConsistencyError;
use crate::models::{Entry, EntryKey};

pub use memory::MemoryCatalogStore;

/// Storage backend for entries and their owned versions/source files.
///
/// Versions and source files are stored inline on the entry: ownership is
/// exclusive, so the entry is the unit of persistence and of replacement.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a new entry, enforcing natural-key uniqueness.
    async fn insert(&self, entry: Entry) -> Result<(), ConsistencyError>;

    /// Fetches an entry snapshot by id.
    async fn get(&self, id: Uuid) -> Option<Entry>;

    /// Fetches an entry snapshot by natural key.
    async fn find_by_key(&self, key: &EntryKey) -> Option<Entry>;

    /// Replaces an existing entry wholesale. Returns `false` if the id is
    /// unknown (the entry was deleted out from under the caller).
    async fn update(&self, entry: Entry) -> bool;

    /// Deletes an entry and, with it, every owned version and source file.
    async fn remove(&self, id: Uuid) -> bool;

    /// Snapshots of all entries, in no particular order.
    async fn list(&self) -> Vec<Entry>;
}
