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

//! Domain models for the catalog: entries, versions, source files, and the
//! upstream coordinates that identify them.

pub mod coordinates;
pub mod entry;
pub mod source_file;
pub mod version;

pub use coordinates::{
    ContainerRegistry, EntryAlias, EntryKey, Provider, RepoCoordinate, SourceControl,
};
pub use entry::{DescriptorLanguage, Entry, EntryMode, EntryVariant, ToolSpec};
pub use source_file::{FileType, SourceFile};
pub use version::{ReferenceStamp, Version};
