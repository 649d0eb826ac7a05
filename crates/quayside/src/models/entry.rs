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

//! The catalog entry: one publishable workflow or tool.
//!
//! Workflows and tools share the same reconciliation and lifecycle machinery.
//! Rather than an inheritance hierarchy, the shared state lives on [`Entry`]
//! and the tool-specific state on the [`EntryVariant::Tool`] payload; the
//! registry variant rules in `lifecycle::tool_rules` operate on that payload
//! only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coordinates::{ContainerRegistry, EntryKey, Provider, RepoCoordinate};
use super::version::Version;

/// Lifecycle mode of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Registered but never refreshed: no versions, no source files.
    Stub,
    /// Refreshed from its remote; has versions (zero or more valid).
    Full,
    /// A tool registered by hand against an explicit image path.
    ManualImagePath,
    /// Descriptor content is edited in the catalog itself; no remote.
    Hosted,
}

/// Descriptor languages the catalog tracks.
///
/// Parsing is delegated to the descriptor oracle; the catalog only needs the
/// language to pick a default path and to route validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptorLanguage {
    Cwl,
    Wdl,
    Nextflow,
}

impl DescriptorLanguage {
    /// Conventional default descriptor path for this language.
    pub fn default_path(&self) -> &'static str {
        match self {
            DescriptorLanguage::Cwl => "/Dockstore.cwl",
            DescriptorLanguage::Wdl => "/Dockstore.wdl",
            DescriptorLanguage::Nextflow => "/nextflow.config",
        }
    }
}

/// Tool-specific payload: registry coordinates and privacy state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub registry: ContainerRegistry,
    /// Git repository holding the tool's descriptors.
    pub git_coordinate: RepoCoordinate,
    pub is_private: bool,
    pub maintainer_email: Option<String>,
    /// Explicit docker path for custom-docker-path registries.
    pub custom_docker_path: Option<String>,
}

/// Variant payload distinguishing workflows from registry-backed tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryVariant {
    Workflow,
    Tool(ToolSpec),
}

/// A catalog entry: the local mirror of one upstream workflow or tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub key: EntryKey,
    pub mode: EntryMode,
    pub is_published: bool,
    pub default_descriptor_path: String,
    pub descriptor_language: DescriptorLanguage,
    /// Name of the version surfaced as the entry's default, if chosen.
    pub actual_default_version: Option<String>,
    /// Set once the first full refresh commits; gates language changes.
    pub last_refreshed: Option<DateTime<Utc>>,
    pub versions: Vec<Version>,
    pub variant: EntryVariant,
}

impl Entry {
    /// Creates a stub workflow entry.
    pub fn new_workflow(
        key: EntryKey,
        language: DescriptorLanguage,
        default_descriptor_path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            mode: EntryMode::Stub,
            is_published: false,
            default_descriptor_path: default_descriptor_path.into(),
            descriptor_language: language,
            actual_default_version: None,
            last_refreshed: None,
            versions: Vec::new(),
            variant: EntryVariant::Workflow,
        }
    }

    /// Creates a manually registered tool entry.
    pub fn new_manual_tool(
        key: EntryKey,
        language: DescriptorLanguage,
        default_descriptor_path: impl Into<String>,
        spec: ToolSpec,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            mode: EntryMode::ManualImagePath,
            is_published: false,
            default_descriptor_path: default_descriptor_path.into(),
            descriptor_language: language,
            actual_default_version: None,
            last_refreshed: None,
            versions: Vec::new(),
            variant: EntryVariant::Tool(spec),
        }
    }

    /// The git coordinate reconciliation fetches descriptors from.
    ///
    /// Workflows derive it from their natural key; tools carry it on the
    /// variant payload because their key points at the registry instead.
    pub fn repo_coordinate(&self) -> Option<RepoCoordinate> {
        match (&self.key.provider, &self.variant) {
            (Provider::SourceControl(sc), EntryVariant::Workflow) => Some(RepoCoordinate::new(
                *sc,
                self.key.organization.clone(),
                self.key.repository.clone(),
            )),
            (_, EntryVariant::Tool(spec)) => Some(spec.git_coordinate.clone()),
            _ => None,
        }
    }

    pub fn tool_spec(&self) -> Option<&ToolSpec> {
        match &self.variant {
            EntryVariant::Tool(spec) => Some(spec),
            EntryVariant::Workflow => None,
        }
    }

    pub fn tool_spec_mut(&mut self) -> Option<&mut ToolSpec> {
        match &mut self.variant {
            EntryVariant::Tool(spec) => Some(spec),
            EntryVariant::Workflow => None,
        }
    }

    /// Copies this entry under a different natural key.
    ///
    /// Used by aliased publish: the copy is a distinct, independently
    /// publishable entry, so it gets fresh identifiers, starts unpublished,
    /// and does not inherit version DOIs.
    pub fn clone_with_key(&self, key: EntryKey) -> Entry {
        let mut clone = self.clone();
        clone.id = Uuid::new_v4();
        clone.key = key;
        clone.is_published = false;
        for version in &mut clone.versions {
            version.id = Uuid::new_v4();
            version.doi = None;
        }
        clone
    }

    /// Whether at least one version is currently valid.
    pub fn has_valid_version(&self) -> bool {
        self.versions.iter().any(|v| v.valid)
    }

    pub fn version(&self, name: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.name == name)
    }

    pub fn version_mut(&mut self, name: &str) -> Option<&mut Version> {
        self.versions.iter_mut().find(|v| v.name == name)
    }
}
