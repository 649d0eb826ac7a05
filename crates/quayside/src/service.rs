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

//! The catalog service: the operations the transport layers consume.
//!
//! `CatalogService` combines the injected store with the external
//! collaborators and enforces the concurrency contract:
//!
//! - Each entry has a single-writer lock. Concurrent refreshes of the same
//!   entry queue behind the in-flight one instead of interleaving, and
//!   lifecycle operations take the same lock so publish never races a
//!   refresh that is still writing versions.
//! - Bulk refresh fans out across entries through a semaphore-bounded worker
//!   pool; one entry's failure never aborts its siblings.
//! - Every entry refresh carries a deadline. On timeout the snapshot under
//!   reconciliation is discarded, so the stored state is unchanged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, Semaphore};
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, ClientError};
use crate::lifecycle::tool_rules::{self, ToolRegistration};
use crate::lifecycle::{self, PublishOutcome, UnpublishOutcome};
use crate::models::{
    DescriptorLanguage, Entry, EntryAlias, EntryMode, FileType, RepoCoordinate, SourceFile,
};
use crate::paths;
use crate::reconciler::{reconcile_entry, RefreshReport};
use crate::remote::{DescriptorOracle, DoiMetadata, DoiMinter, RemoteReferenceLister};
use crate::store::CatalogStore;

/// Outcome of a publish/unpublish request, including the no-op repeats the
/// transport layers report verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    Published { entry_id: Uuid },
    AlreadyRegistered { path: String },
    Unpublished { path: String },
    AlreadyUnpublished { path: String },
}

/// Per-entry outcome summary of a bulk refresh.
#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub succeeded: Vec<(Uuid, RefreshReport)>,
    pub failed: Vec<(Uuid, String)>,
}

impl RefreshSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// The catalog service facade.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    lister: Arc<dyn RemoteReferenceLister>,
    oracle: Arc<dyn DescriptorOracle>,
    doi_minter: Arc<dyn DoiMinter>,
    config: CatalogConfig,
    /// Single-writer locks, one per entry, created lazily.
    entry_locks: Arc<StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl Clone for CatalogService {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lister: Arc::clone(&self.lister),
            oracle: Arc::clone(&self.oracle),
            doi_minter: Arc::clone(&self.doi_minter),
            config: self.config.clone(),
            entry_locks: Arc::clone(&self.entry_locks),
        }
    }
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        lister: Arc<dyn RemoteReferenceLister>,
        oracle: Arc<dyn DescriptorOracle>,
        doi_minter: Arc<dyn DoiMinter>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            store,
            lister,
            oracle,
            doi_minter,
            config,
            entry_locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    fn entry_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self
            .entry_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(id).or_default())
    }

    /// Loads an entry, applies a gatekeeper mutation, and persists the result.
    ///
    /// If the mutation fails, nothing is persisted.
    async fn mutate_entry<T>(
        &self,
        id: Uuid,
        mutate: impl FnOnce(&mut Entry) -> Result<T, ClientError>,
    ) -> Result<T, CatalogError> {
        let lock = self.entry_lock(id);
        let _guard = lock.lock().await;

        let mut entry = self
            .store
            .get(id)
            .await
            .ok_or(ClientError::EntryNotFound(id))?;
        let result = mutate(&mut entry)?;
        self.store.update(entry).await;
        Ok(result)
    }

    /// Registers a stub workflow entry for a source-control repository.
    pub async fn register_workflow(
        &self,
        coordinate: RepoCoordinate,
        language: DescriptorLanguage,
        descriptor_path: Option<&str>,
        alias: Option<&str>,
    ) -> Result<Uuid, CatalogError> {
        let key = crate::models::EntryKey::new(
            crate::models::Provider::SourceControl(coordinate.source_control),
            coordinate.organization.clone(),
            coordinate.repository.clone(),
            EntryAlias::from_name(alias),
        );
        let entry = Entry::new_workflow(
            key,
            language,
            descriptor_path.unwrap_or_else(|| language.default_path()),
        );
        let id = entry.id;
        let path = entry.key.path();

        self.store.insert(entry).await?;
        info!("Registered workflow '{}'", path);
        Ok(id)
    }

    /// Refreshes one entry against its remote.
    ///
    /// Serialized against any other operation on the same entry. The stored
    /// state is updated only if the whole reconciliation succeeds within the
    /// configured deadline.
    pub async fn refresh_entry(&self, id: Uuid) -> Result<RefreshReport, CatalogError> {
        let lock = self.entry_lock(id);
        let _guard = lock.lock().await;

        let mut entry = self
            .store
            .get(id)
            .await
            .ok_or(ClientError::EntryNotFound(id))?;

        let result = timeout(
            self.config.remote_timeout(),
            reconcile_entry(
                &mut entry,
                self.lister.as_ref(),
                self.oracle.as_ref(),
                self.config.retry_policy(),
            ),
        )
        .await;

        match result {
            Ok(Ok(report)) => {
                self.store.update(entry).await;
                Ok(report)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!("Refresh of '{}' timed out; state unchanged", entry.key);
                Err(CatalogError::RefreshTimeout(id))
            }
        }
    }

    /// Refreshes every refreshable entry in the catalog.
    ///
    /// Entries are reconciled concurrently up to the configured pool width.
    /// Hosted entries are skipped (they have no remote). Failures are
    /// collected per entry; the batch always runs to completion.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let entries = self.store.list().await;
        let semaphore = Arc::new(Semaphore::new(self.config.refresh_concurrency()));

        let mut handles = Vec::new();
        for entry in entries {
            if entry.mode == EntryMode::Hosted {
                continue;
            }
            let service = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let id = entry.id;
            let path = entry.key.path();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("refresh semaphore is never closed");
                let result = service.refresh_entry(id).await;
                (path, result)
            });
            handles.push((id, handle));
        }

        let mut summary = RefreshSummary::default();
        for (id, handle) in handles {
            match handle.await {
                Ok((_, Ok(report))) => summary.succeeded.push((id, report)),
                Ok((path, Err(e))) => {
                    error!("Bulk refresh: '{}' failed: {}", path, e);
                    summary.failed.push((id, e.to_string()));
                }
                Err(join_error) => {
                    error!("Bulk refresh task for {} failed to complete: {}", id, join_error);
                    summary
                        .failed
                        .push((id, CatalogError::RefreshCancelled(id).to_string()));
                }
            }
        }

        info!(
            "Bulk refresh finished: {} succeeded, {} failed",
            summary.succeeded.len(),
            summary.failed.len()
        );
        summary
    }

    /// Publishes or unpublishes an entry.
    ///
    /// With `unpublish` set, the entry (or, if `alias` names one, that
    /// aliased sibling) is unpublished; supplying both an alias and the
    /// unpublish flag is a command-level error. With an alias, the entry's
    /// coordinates plus the alias name a sibling entry: an existing published
    /// sibling is a no-op ("already registered"), an existing unpublished one
    /// is published, and a missing one is created as a copy of this entry
    /// under the new alias and published — subject to the same valid-version
    /// gate.
    pub async fn publish(
        &self,
        id: Uuid,
        alias: Option<&str>,
        unpublish: bool,
    ) -> Result<PublishResult, CatalogError> {
        if unpublish && alias.is_some() {
            return Err(ClientError::MutuallyExclusiveFlags.into());
        }

        if unpublish {
            return self
                .mutate_entry(id, |entry| {
                    let path = entry.key.path();
                    Ok(match lifecycle::unpublish(entry) {
                        UnpublishOutcome::Unpublished => PublishResult::Unpublished { path },
                        UnpublishOutcome::AlreadyUnpublished => {
                            PublishResult::AlreadyUnpublished { path }
                        }
                    })
                })
                .await;
        }

        let Some(alias) = alias else {
            return self
                .mutate_entry(id, |entry| {
                    let path = entry.key.path();
                    Ok(match lifecycle::publish(entry)? {
                        PublishOutcome::Published => PublishResult::Published { entry_id: id },
                        PublishOutcome::AlreadyRegistered => {
                            PublishResult::AlreadyRegistered { path }
                        }
                    })
                })
                .await;
        };

        // Aliased publish: the target is a sibling entry under the same
        // coordinates. Snapshot the source first, then work on the target
        // under its own lock.
        let source = {
            let lock = self.entry_lock(id);
            let _guard = lock.lock().await;
            self.store
                .get(id)
                .await
                .ok_or(ClientError::EntryNotFound(id))?
        };
        let target_key = source.key.with_alias(EntryAlias::from_name(Some(alias)));

        if let Some(existing) = self.store.find_by_key(&target_key).await {
            if existing.is_published {
                return Ok(PublishResult::AlreadyRegistered {
                    path: existing.key.path(),
                });
            }
            return self
                .mutate_entry(existing.id, move |entry| {
                    lifecycle::publish(entry)?;
                    Ok(PublishResult::Published { entry_id: entry.id })
                })
                .await;
        }

        let mut clone = source.clone_with_key(target_key);
        lifecycle::publish(&mut clone)?;
        let clone_id = clone.id;
        self.store.insert(clone).await?;
        Ok(PublishResult::Published { entry_id: clone_id })
    }

    /// Reverts an unpublished FULL entry to STUB.
    pub async fn restub(&self, id: Uuid) -> Result<(), CatalogError> {
        self.mutate_entry(id, lifecycle::restub).await
    }

    /// Changes the entry-level default descriptor path (dirty versions keep
    /// their override). Returns how many versions took the new path.
    pub async fn update_default_path(
        &self,
        id: Uuid,
        new_path: &str,
    ) -> Result<usize, CatalogError> {
        self.mutate_entry(id, |entry| Ok(paths::update_default_path(entry, new_path)))
            .await
    }

    /// Overrides one version's descriptor path and marks it dirty.
    pub async fn set_version_path(
        &self,
        id: Uuid,
        version_name: &str,
        new_path: &str,
    ) -> Result<(), CatalogError> {
        self.mutate_entry(id, |entry| paths::set_version_path(entry, version_name, new_path))
            .await
    }

    /// Changes the entry's descriptor language (only before the first
    /// refresh).
    pub async fn set_descriptor_language(
        &self,
        id: Uuid,
        language: DescriptorLanguage,
    ) -> Result<(), CatalogError> {
        self.mutate_entry(id, |entry| paths::set_descriptor_language(entry, language))
            .await
    }

    /// Freezes a version, making its content immutable.
    pub async fn freeze_version(&self, id: Uuid, version_name: &str) -> Result<(), CatalogError> {
        self.mutate_entry(id, |entry| lifecycle::freeze_version(entry, version_name))
            .await
    }

    /// Requests a DOI for a frozen version.
    ///
    /// Preconditions are checked in order: the version must be frozen, then
    /// a minting credential must be configured. A version that already has a
    /// DOI returns it without re-minting.
    pub async fn request_doi(&self, id: Uuid, version_name: &str) -> Result<String, CatalogError> {
        let lock = self.entry_lock(id);
        let _guard = lock.lock().await;

        let mut entry = self
            .store
            .get(id)
            .await
            .ok_or(ClientError::EntryNotFound(id))?;

        lifecycle::check_doi_preconditions(
            &entry,
            version_name,
            self.config.doi_credential().is_some(),
        )?;

        let version = entry
            .version(version_name)
            .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;
        if let Some(doi) = &version.doi {
            return Ok(doi.clone());
        }

        let metadata = DoiMetadata {
            entry_path: entry.key.path(),
            version_name: version_name.to_string(),
        };
        let doi = self.doi_minter.mint(&metadata).await?;

        if let Some(version) = entry.version_mut(version_name) {
            version.doi = Some(doi.clone());
        }
        self.store.update(entry).await;

        info!("Minted DOI {} for version '{}'", doi, version_name);
        Ok(doi)
    }

    /// Toggles a version's hidden flag.
    pub async fn set_version_hidden(
        &self,
        id: Uuid,
        version_name: &str,
        hidden: bool,
    ) -> Result<(), CatalogError> {
        self.mutate_entry(id, |entry| {
            lifecycle::set_version_hidden(entry, version_name, hidden)
        })
        .await
    }

    /// Selects the version surfaced as the entry default.
    pub async fn set_default_version(
        &self,
        id: Uuid,
        version_name: &str,
    ) -> Result<(), CatalogError> {
        self.mutate_entry(id, |entry| lifecycle::set_default_version(entry, version_name))
            .await
    }

    /// Manually registers and publishes a container-registry tool.
    ///
    /// Registry rules are validated before any state is created; the entry
    /// is then registered, refreshed, and published. Zero valid tags after
    /// the refresh is an error — the tool stays registered but unpublished.
    pub async fn manual_publish_tool(
        &self,
        registration: ToolRegistration,
    ) -> Result<Uuid, CatalogError> {
        tool_rules::validate_registration(&registration)?;

        let key = registration.entry_key();
        if self.store.find_by_key(&key).await.is_some() {
            return Err(ClientError::DuplicateEntry(key.path()).into());
        }

        let entry = Entry::new_manual_tool(
            key,
            registration.language,
            registration.descriptor_path.clone(),
            registration.tool_spec(),
        );
        let id = entry.id;
        self.store.insert(entry).await?;

        self.refresh_entry(id).await?;
        self.mutate_entry(id, |entry| lifecycle::publish(entry).map(|_| ()))
            .await?;
        Ok(id)
    }

    /// Flips a tool's privacy, enforcing the registry variant rules.
    ///
    /// A maintainer email declared by the tool's descriptor content counts
    /// when none is supplied explicitly.
    pub async fn set_tool_privacy(
        &self,
        id: Uuid,
        private: bool,
        maintainer_email: Option<&str>,
    ) -> Result<(), CatalogError> {
        let lock = self.entry_lock(id);
        let _guard = lock.lock().await;

        let mut entry = self
            .store
            .get(id)
            .await
            .ok_or(ClientError::EntryNotFound(id))?;

        let declared = self.declared_email(&entry);
        let spec = entry
            .tool_spec_mut()
            .ok_or(ClientError::EntryNotFound(id))?;
        tool_rules::set_privacy(spec, private, maintainer_email, declared.as_deref())?;

        self.store.update(entry).await;
        Ok(())
    }

    fn declared_email(&self, entry: &Entry) -> Option<String> {
        entry
            .versions
            .iter()
            .filter_map(|v| v.primary_descriptor())
            .find_map(|f| self.oracle.declared_maintainer_email(&f.content))
    }

    /// Attaches a test parameter JSON file to a version.
    ///
    /// The content must be well-formed JSON. A file already present at the
    /// path is replaced. Test parameter files survive refresh.
    pub async fn add_test_parameter_file(
        &self,
        id: Uuid,
        version_name: &str,
        path: &str,
        content: &str,
    ) -> Result<(), CatalogError> {
        if serde_json::from_str::<serde_json::Value>(content).is_err() {
            return Err(ClientError::MalformedTestParameterFile(path.to_string()).into());
        }

        self.mutate_entry(id, |entry| {
            let version = entry
                .version_mut(version_name)
                .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;
            if version.frozen {
                return Err(ClientError::FrozenVersion(version_name.to_string()));
            }
            version
                .source_files
                .retain(|f| !(f.file_type == FileType::TestParameter && f.path == path));
            version
                .source_files
                .push(SourceFile::new(path, content, FileType::TestParameter));
            Ok(())
        })
        .await
    }

    /// Removes a test parameter file from a version.
    pub async fn remove_test_parameter_file(
        &self,
        id: Uuid,
        version_name: &str,
        path: &str,
    ) -> Result<(), CatalogError> {
        self.mutate_entry(id, |entry| {
            let version = entry
                .version_mut(version_name)
                .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;
            if version.frozen {
                return Err(ClientError::FrozenVersion(version_name.to_string()));
            }
            version
                .source_files
                .retain(|f| !(f.file_type == FileType::TestParameter && f.path == path));
            Ok(())
        })
        .await
    }

    /// Snapshot of one entry.
    pub async fn entry(&self, id: Uuid) -> Option<Entry> {
        self.store.get(id).await
    }

    /// The publish list: every published entry.
    pub async fn published_entries(&self) -> Vec<Entry> {
        self.store
            .list()
            .await
            .into_iter()
            .filter(|e| e.is_published)
            .collect()
    }
}
