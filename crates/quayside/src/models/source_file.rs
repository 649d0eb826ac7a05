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

//! Fetched file content owned by a version.

use serde::{Deserialize, Serialize};

/// The role a source file plays within its owning version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// The primary workflow/tool descriptor at the version's descriptor path.
    PrimaryDescriptor,
    /// A secondary file the primary descriptor imports.
    SecondaryImport,
    /// A user-managed test parameter JSON file.
    TestParameter,
}

/// One fetched descriptor, import, or test-parameter file.
///
/// Descriptor and import files are replaced wholesale on every non-frozen
/// refresh of the owning version; test parameter files are user-managed and
/// survive refresh until explicitly removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
    pub file_type: FileType,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            file_type,
        }
    }

    /// Whether this file is managed by reconciliation (as opposed to the user).
    pub fn is_reconciled(&self) -> bool {
        matches!(
            self.file_type,
            FileType::PrimaryDescriptor | FileType::SecondaryImport
        )
    }
}
