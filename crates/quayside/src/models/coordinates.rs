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

//! Upstream coordinates and the entry natural key.
//!
//! Every catalog entry is anchored to exactly one upstream system of record:
//! a source-control host for workflows, a container registry for tools. The
//! natural key `(provider, organization, repository, alias)` identifies an
//! entry uniquely; the alias component lets several entries share the same
//! upstream repository.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Source-control hosts that can back a workflow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceControl {
    GitHub,
    GitLab,
    Bitbucket,
}

impl SourceControl {
    /// The hostname used when rendering entry paths.
    pub fn host(&self) -> &'static str {
        match self {
            SourceControl::GitHub => "github.com",
            SourceControl::GitLab => "gitlab.com",
            SourceControl::Bitbucket => "bitbucket.org",
        }
    }
}

impl fmt::Display for SourceControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host())
    }
}

/// Container registries that can back a tool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerRegistry {
    DockerHub,
    Quay,
    AmazonEcr,
    SevenBridges,
    GitLab,
}

static ECR_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*\.dkr\.ecr\.[a-z0-9-]+\.amazonaws\.com$")
        .expect("ECR path pattern is valid")
});

static SEVEN_BRIDGES_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9._-]+\.)?images\.sbgenomics\.com$")
        .expect("Seven Bridges path pattern is valid")
});

impl ContainerRegistry {
    /// The fixed docker path for registries that have one.
    ///
    /// Registries in the custom-docker-path category return `None`; their
    /// path is supplied per entry and validated with [`validate_custom_path`].
    ///
    /// [`validate_custom_path`]: ContainerRegistry::validate_custom_path
    pub fn docker_path(&self) -> Option<&'static str> {
        match self {
            ContainerRegistry::DockerHub => Some("registry.hub.docker.com"),
            ContainerRegistry::Quay => Some("quay.io"),
            ContainerRegistry::GitLab => Some("registry.gitlab.com"),
            ContainerRegistry::AmazonEcr | ContainerRegistry::SevenBridges => None,
        }
    }

    /// Whether entries on this registry must remain private.
    pub fn is_private_only(&self) -> bool {
        matches!(
            self,
            ContainerRegistry::AmazonEcr | ContainerRegistry::SevenBridges
        )
    }

    /// Whether this registry requires an explicit per-entry docker path.
    pub fn requires_custom_path(&self) -> bool {
        self.docker_path().is_none()
    }

    /// Validates a custom docker path against this registry's pattern.
    ///
    /// Returns `false` for registries with a fixed path; callers should not
    /// supply a custom path for those at all.
    pub fn validate_custom_path(&self, path: &str) -> bool {
        match self {
            ContainerRegistry::AmazonEcr => ECR_PATH.is_match(path),
            ContainerRegistry::SevenBridges => SEVEN_BRIDGES_PATH.is_match(path),
            _ => false,
        }
    }
}

impl fmt::Display for ContainerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.docker_path() {
            Some(path) => write!(f, "{}", path),
            None => match self {
                ContainerRegistry::AmazonEcr => write!(f, "amazon.ecr"),
                ContainerRegistry::SevenBridges => write!(f, "images.sbgenomics.com"),
                _ => unreachable!(),
            },
        }
    }
}

/// The upstream system of record backing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    SourceControl(SourceControl),
    Registry(ContainerRegistry),
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::SourceControl(sc) => write!(f, "{}", sc),
            Provider::Registry(reg) => write!(f, "{}", reg),
        }
    }
}

/// A git repository coordinate: where descriptor content actually lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinate {
    pub source_control: SourceControl,
    pub organization: String,
    pub repository: String,
}

impl RepoCoordinate {
    pub fn new(
        source_control: SourceControl,
        organization: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            source_control,
            organization: organization.into(),
            repository: repository.into(),
        }
    }
}

impl fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.source_control, self.organization, self.repository
        )
    }
}

/// The user-given alias component of an entry key.
///
/// A dedicated sentinel rather than an optional string keeps equality and
/// hashing unambiguous: an unnamed entry and an entry named `""` cannot be
/// confused because the empty name is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntryAlias {
    #[default]
    Unnamed,
    Named(String),
}

impl EntryAlias {
    /// Builds an alias from an optional user-supplied name.
    ///
    /// Empty and whitespace-only names collapse to `Unnamed`.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(n) if !n.trim().is_empty() => EntryAlias::Named(n.trim().to_string()),
            _ => EntryAlias::Unnamed,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, EntryAlias::Named(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            EntryAlias::Unnamed => None,
            EntryAlias::Named(n) => Some(n),
        }
    }
}

impl fmt::Display for EntryAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryAlias::Unnamed => Ok(()),
            EntryAlias::Named(n) => write!(f, "{}", n),
        }
    }
}

/// Composite natural key for a catalog entry.
///
/// Two entries are the same entry iff all four components match; differing
/// only in `alias` yields distinct, independently publishable entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub provider: Provider,
    pub organization: String,
    pub repository: String,
    pub alias: EntryAlias,
}

impl EntryKey {
    pub fn new(
        provider: Provider,
        organization: impl Into<String>,
        repository: impl Into<String>,
        alias: EntryAlias,
    ) -> Self {
        Self {
            provider,
            organization: organization.into(),
            repository: repository.into(),
            alias,
        }
    }

    /// Returns a copy of this key with a different alias.
    pub fn with_alias(&self, alias: EntryAlias) -> Self {
        Self {
            alias,
            ..self.clone()
        }
    }

    /// The user-facing path for this entry, e.g.
    /// `github.com/org/repo` or `github.com/org/repo/name`.
    pub fn path(&self) -> String {
        match &self.alias {
            EntryAlias::Unnamed => {
                format!("{}/{}/{}", self.provider, self.organization, self.repository)
            }
            EntryAlias::Named(name) => format!(
                "{}/{}/{}/{}",
                self.provider, self.organization, self.repository, name
            ),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
