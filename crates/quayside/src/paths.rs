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

//! Descriptor path edits and the dirty bit.
//!
//! A version's descriptor path can come from two places: the entry-level
//! default, or a deliberate per-version override. The dirty bit records which
//! one applies. A bulk change to the entry default must never silently clobber
//! a per-version override, so dirty versions are skipped; frozen versions are
//! skipped as well since their content is immutable.

use tracing::debug;

use crate::error::ClientError;
use crate::models::{DescriptorLanguage, Entry};

/// Applies a per-version descriptor path override and marks it dirty.
pub fn set_version_path(
    entry: &mut Entry,
    version_name: &str,
    new_path: &str,
) -> Result<(), ClientError> {
    let version = entry
        .version_mut(version_name)
        .ok_or_else(|| ClientError::VersionNotFound(version_name.to_string()))?;

    if version.frozen {
        return Err(ClientError::FrozenVersion(version_name.to_string()));
    }

    version.descriptor_path = new_path.to_string();
    version.dirty_bit = true;
    version.last_updated = chrono::Utc::now();

    debug!(
        "Version '{}' of '{}' now overrides the descriptor path with '{}'",
        version_name, entry.key, new_path
    );
    Ok(())
}

/// Changes the entry-level default descriptor path.
///
/// The new path propagates to every version that still tracks the default
/// (dirty bit unset, not frozen). Returns how many versions were updated;
/// zero is not an error — an entry whose versions are all overridden still
/// accepts a new default for future versions.
pub fn update_default_path(entry: &mut Entry, new_path: &str) -> usize {
    entry.default_descriptor_path = new_path.to_string();

    let mut updated = 0;
    for version in &mut entry.versions {
        if version.dirty_bit || version.frozen {
            continue;
        }
        version.descriptor_path = new_path.to_string();
        version.last_updated = chrono::Utc::now();
        updated += 1;
    }

    debug!(
        "Default path of '{}' set to '{}', propagated to {} version(s)",
        entry.key, new_path, updated
    );
    updated
}

/// Changes the entry's descriptor language.
///
/// Permitted only while the entry has never been through a full refresh:
/// once descriptor content has been fetched and validated under one language,
/// flipping the language would invalidate every version silently.
pub fn set_descriptor_language(
    entry: &mut Entry,
    language: DescriptorLanguage,
) -> Result<(), ClientError> {
    if entry.last_refreshed.is_some() {
        return Err(ClientError::LanguageLocked);
    }
    entry.descriptor_language = language;
    Ok(())
}
