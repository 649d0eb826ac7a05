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

//! One branch/tag/reference snapshot of an entry's descriptor content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::source_file::{FileType, SourceFile};

/// Where a remote reference currently points.
///
/// Git hosts identify a reference by its head commit; registries that do not
/// expose commit ids report a last-modified timestamp instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceStamp {
    Commit(String),
    LastModified(DateTime<Utc>),
}

/// One version of an entry, mirroring a single remote reference.
///
/// A version is owned exclusively by its entry: it is deleted when the entry
/// is restubbed or when reconciliation observes its remote reference gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    /// The remote reference name (branch or tag).
    pub name: String,
    pub reference: ReferenceStamp,
    pub descriptor_path: String,
    pub valid: bool,
    /// Protects a manually edited descriptor path from bulk overwrite.
    pub dirty_bit: bool,
    /// Once set, reconciliation never touches this version again.
    pub frozen: bool,
    pub hidden: bool,
    pub doi: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub source_files: Vec<SourceFile>,
}

impl Version {
    /// Creates a fresh version for a newly observed remote reference.
    ///
    /// New versions start clean: not dirty, not valid (validity is computed
    /// by the reconciler after fetching), not frozen, not hidden.
    pub fn new(
        name: impl Into<String>,
        reference: ReferenceStamp,
        descriptor_path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            reference,
            descriptor_path: descriptor_path.into(),
            valid: false,
            dirty_bit: false,
            frozen: false,
            hidden: false,
            doi: None,
            last_updated: Utc::now(),
            source_files: Vec::new(),
        }
    }

    /// The primary descriptor file, if the last refresh fetched one.
    pub fn primary_descriptor(&self) -> Option<&SourceFile> {
        self.source_files
            .iter()
            .find(|f| f.file_type == FileType::PrimaryDescriptor)
    }

    /// Test parameter files, which are user-managed and survive refresh.
    pub fn test_parameter_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.source_files
            .iter()
            .filter(|f| f.file_type == FileType::TestParameter)
    }

    /// Drops all reconciled files (primary + imports), keeping user files.
    pub(crate) fn clear_reconciled_files(&mut self) {
        self.source_files.retain(|f| !f.is_reconciled());
    }
}
