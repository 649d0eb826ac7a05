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

//! The lifecycle gatekeeper.
//!
//! Entries move between STUB and FULL, carry an orthogonal published flag,
//! and individual versions can be frozen. The transitions here enforce the
//! gates: publish requires a valid version, restub requires being
//! unpublished, and a DOI requires a frozen version. Each function mutates
//! only the passed snapshot; the service commits the result.

pub mod tool_rules;

use tracing::info;

use crate::error::ClientError;
use crate::models::{Entry, EntryMode};

/// Result of a publish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// The entry is already published; the request was a harmless repeat.
    AlreadyRegistered,
}

/// Result of an unpublish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpublishOutcome {
    Unpublished,
    /// The entry is already unpublished; the request was a harmless repeat.
    AlreadyUnpublished,
}

/// Publishes an entry, gated on it having at least one valid version.
///
/// Publishing an already-published entry is a no-op reporting
/// [`PublishOutcome::AlreadyRegistered`], not an error.
pub fn publish(entry: &mut Entry) -> Result<PublishOutcome, ClientError> {
    if entry.is_published {
        return Ok(PublishOutcome::AlreadyRegistered);
    }
    if !entry.has_valid_version() {
        return Err(ClientError::NoValidVersions(entry.key.path()));
    }

    entry.is_published = true;
    info!("Published '{}'", entry.key);
    Ok(PublishOutcome::Published)
}

/// Unpublishes an entry. Always allowed; repeats are no-ops.
pub fn unpublish(entry: &mut Entry) -> UnpublishOutcome {
    if !entry.is_published {
        return UnpublishOutcome::AlreadyUnpublished;
    }
    entry.is_published = false;
    info!("Unpublished '{}'", entry.key);
    UnpublishOutcome::Unpublished
}

/// Reverts a FULL entry to STUB, discarding every version and source file.
///
/// Disallowed while published: a published entry's identity depends on
/// having retrievable descriptor content.
pub fn restub(entry: &mut Entry) -> Result<(), ClientError> {
    if entry.is_published {
        return Err(ClientError::RestubWhilePublished(entry.key.path()));
    }

    entry.versions.clear();
    entry.actual_default_version = None;
    entry.mode = EntryMode::Stub;
    // A restubbed entry may pick a new language before its next refresh.
    entry.last_refreshed = None;

    info!("Restubbed '{}'", entry.key);
    Ok(())
}

/// Freezes a version, making its descriptor content immutable.
///
/// Irreversible for content: subsequent refreshes skip the version entirely.
/// Freezing an already-frozen version is a no-op.
pub fn freeze_version(entry: &mut Entry, version_name: &str) -> Result<(), ClientError> {
    let version = entry
        .version_mut(version_name)
        .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;

    if !version.frozen {
        version.frozen = true;
        info!("Froze version '{}' of '{}'", version_name, entry.key);
    }
    Ok(())
}

/// Checks the ordered DOI preconditions for a version.
///
/// The frozen check comes first; an unconfigured minting credential is only
/// reported for versions that are already frozen.
pub fn check_doi_preconditions(
    entry: &Entry,
    version_name: &str,
    credential_configured: bool,
) -> Result<(), ClientError> {
    let version = entry
        .version(version_name)
        .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;

    if !version.frozen {
        return Err(ClientError::NotFrozen(version_name.to_string()));
    }
    if !credential_configured {
        return Err(ClientError::NoDoiCredential);
    }
    Ok(())
}

/// Toggles a version's hidden flag.
pub fn set_version_hidden(
    entry: &mut Entry,
    version_name: &str,
    hidden: bool,
) -> Result<(), ClientError> {
    let version = entry
        .version_mut(version_name)
        .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;
    version.hidden = hidden;
    Ok(())
}

/// Selects the version surfaced as the entry default.
///
/// The target must exist, be valid, and not be hidden.
pub fn set_default_version(entry: &mut Entry, version_name: &str) -> Result<(), ClientError> {
    let version = entry
        .version(version_name)
        .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;

    if !version.valid || version.hidden {
        return Err(ClientError::IneligibleDefaultVersion(
            version_name.to_string(),
        ));
    }
    entry.actual_default_version = Some(version_name.to_string());
    Ok(())
}
