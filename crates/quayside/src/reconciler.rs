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

//! Version reconciliation: the refresh algorithm.
//!
//! Refresh synchronizes an entry's local version set against the remote
//! branch/tag list, which changes independently of the catalog. Per entry:
//!
//! 1. List the current remote references.
//! 2. Create a version for every reference the catalog has not seen.
//! 3. Re-fetch descriptor content for every surviving, non-frozen version at
//!    its current descriptor path.
//! 4. Delete versions whose reference no longer exists remotely.
//! 5. Recompute `valid`: the primary descriptor parses and every secondary
//!    file it requires could be fetched.
//! 6. Promote STUB entries that now own versions to FULL; demote FULL entries
//!    left with zero versions back to STUB.
//!
//! Refresh is idempotent: with no remote change, a second run produces an
//! identical version set. Frozen versions are never touched, not even to
//! update their reference stamp, and never deleted.
//!
//! This module mutates an owned entry snapshot; committing (or discarding,
//! on failure) the result is the service's job, which keeps partial progress
//! from ever being surfaced.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{CatalogError, ClientError};
use crate::models::{Entry, EntryMode, FileType, SourceFile, Version};
use crate::remote::{
    with_retry, DescriptorOracle, RemoteError, RemoteReferenceLister, RetryPolicy,
};

/// What one entry refresh did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Versions valid after the refresh.
    pub valid: usize,
}

/// Refreshes one entry against its remote.
///
/// Only the passed snapshot is mutated; the caller decides whether to
/// persist it. A remote failure after retries aborts the whole refresh so
/// the stored state is left untouched.
pub async fn reconcile_entry(
    entry: &mut Entry,
    lister: &dyn RemoteReferenceLister,
    oracle: &dyn DescriptorOracle,
    retry: &RetryPolicy,
) -> Result<RefreshReport, CatalogError> {
    if entry.mode == EntryMode::Hosted {
        return Err(ClientError::HostedRefresh.into());
    }
    let repo = entry
        .repo_coordinate()
        .ok_or(ClientError::HostedRefresh)?;

    let references = with_retry(retry, "list remote references", || {
        lister.list_references(&repo)
    })
    .await?;

    debug!(
        "Refreshing '{}': {} remote reference(s), {} stored version(s)",
        entry.key,
        references.len(),
        entry.versions.len()
    );

    let mut report = RefreshReport::default();

    // Drop versions whose remote reference disappeared. Frozen versions are
    // exempt: reconciliation never mutates them, and deletion would orphan
    // any DOI they anchor.
    let before = entry.versions.len();
    entry
        .versions
        .retain(|v| v.frozen || references.iter().any(|r| r.name == v.name));
    report.deleted = before - entry.versions.len();

    if let Some(default) = &entry.actual_default_version {
        if entry.version(default).is_none() {
            entry.actual_default_version = None;
        }
    }

    for reference in &references {
        match entry.version_mut(&reference.name) {
            Some(version) if version.frozen => {
                debug!(
                    "Skipping frozen version '{}' of '{}'",
                    reference.name, entry.key
                );
            }
            Some(version) => {
                version.reference = reference.stamp.clone();
                report.updated += 1;
            }
            None => {
                entry.versions.push(Version::new(
                    reference.name.clone(),
                    reference.stamp.clone(),
                    entry.default_descriptor_path.clone(),
                ));
                report.created += 1;
            }
        }
    }

    // Fetch + validate every non-frozen version at its current path.
    let language = entry.descriptor_language;
    for version in &mut entry.versions {
        if version.frozen {
            continue;
        }
        refresh_version_content(version, &repo, oracle, retry, language).await?;
        version.last_updated = Utc::now();
    }
    report.valid = entry.versions.iter().filter(|v| v.valid).count();

    // Mode transitions mirror the stub/full invariant: a stub owns no
    // versions, so gaining any promotes it; losing all demotes.
    if entry.mode == EntryMode::Stub && !entry.versions.is_empty() {
        info!("Entry '{}' promoted STUB -> FULL", entry.key);
        entry.mode = EntryMode::Full;
    } else if entry.mode == EntryMode::Full && entry.versions.is_empty() {
        info!("Entry '{}' demoted FULL -> STUB", entry.key);
        entry.mode = EntryMode::Stub;
    }

    entry.last_refreshed = Some(Utc::now());

    info!(
        "Refreshed '{}': {} created, {} updated, {} deleted, {} valid",
        entry.key, report.created, report.updated, report.deleted, report.valid
    );
    Ok(report)
}

/// Re-fetches one version's descriptor content and recomputes validity.
///
/// Missing or unparseable content is a fact about the version, not a refresh
/// failure: the version just ends up invalid. Only transient remote failures
/// (still failing after retries) abort the refresh.
async fn refresh_version_content(
    version: &mut Version,
    repo: &crate::models::RepoCoordinate,
    oracle: &dyn DescriptorOracle,
    retry: &RetryPolicy,
    language: crate::models::DescriptorLanguage,
) -> Result<(), RemoteError> {
    version.clear_reconciled_files();

    let fetched = match with_retry(retry, "fetch descriptor", || {
        oracle.fetch_descriptor(repo, &version.name, &version.descriptor_path)
    })
    .await
    {
        Ok(fetched) => fetched,
        Err(RemoteError::NotFound { path }) => {
            debug!(
                "No descriptor at '{}' on reference '{}'",
                path, version.name
            );
            version.valid = false;
            return Ok(());
        }
        Err(RemoteError::Parse { message }) => {
            debug!(
                "Descriptor on reference '{}' failed to parse: {}",
                version.name, message
            );
            version.valid = false;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let parses = oracle.validate(&fetched.content, language);
    version.source_files.push(SourceFile::new(
        version.descriptor_path.clone(),
        fetched.content,
        FileType::PrimaryDescriptor,
    ));

    let mut all_secondaries_present = true;
    for path in &fetched.required_paths {
        match with_retry(retry, "fetch secondary file", || {
            oracle.fetch_file(repo, &version.name, path)
        })
        .await
        {
            Ok(content) => {
                version.source_files.push(SourceFile::new(
                    path.clone(),
                    content,
                    FileType::SecondaryImport,
                ));
            }
            Err(RemoteError::NotFound { .. }) | Err(RemoteError::Parse { .. }) => {
                debug!(
                    "Missing secondary file '{}' for reference '{}'",
                    path, version.name
                );
                all_secondaries_present = false;
            }
            Err(e) => return Err(e),
        }
    }

    version.valid = parses && all_secondaries_present;
    Ok(())
}
