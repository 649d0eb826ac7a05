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

//! In-memory catalog store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::error::ConsistencyError;
use crate::models::{Entry, EntryKey};

/// Reference store backed by a `HashMap` behind an async `RwLock`.
#[derive(Default)]
pub struct MemoryCatalogStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn insert(&self, entry: Entry) -> Result<(), ConsistencyError> {
        let mut entries = self.entries.write().await;
        if entries.values().any(|e| e.key == entry.key) {
            return Err(ConsistencyError::DuplicateNaturalKey(entry.key.path()));
        }
        entries.insert(entry.id, entry);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Option<Entry> {
        self.entries.read().await.get(&id).cloned()
    }

    async fn find_by_key(&self, key: &EntryKey) -> Option<Entry> {
        self.entries
            .read()
            .await
            .values()
            .find(|e| &e.key == key)
            .cloned()
    }

    async fn update(&self, entry: Entry) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    async fn remove(&self, id: Uuid) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    async fn list(&self) -> Vec<Entry> {
        self.entries.read().await.values().cloned().collect()
    }
}
