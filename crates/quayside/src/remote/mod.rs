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

//! Contracts for the external collaborators the catalog consumes.
//!
//! The catalog never talks to GitHub, Docker registries, or Zenodo directly.
//! It consumes three narrow traits — a reference lister, a descriptor oracle,
//! and a DOI minter — and the transport crates provide the real clients.
//! Tests provide in-memory fakes.

pub mod retry;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DescriptorLanguage, ReferenceStamp, RepoCoordinate};

pub use retry::{with_retry, RetryPolicy};

/// Failures at the collaborator boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The upstream could not be reached or is rate-limiting us. Transient.
    #[error("remote unavailable: {message}")]
    Unavailable { message: String },

    /// The requested file or repository does not exist upstream.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The upstream returned content the oracle could not parse.
    #[error("descriptor parse failure: {message}")]
    Parse { message: String },

    /// DOI minting failed upstream.
    #[error("DOI minting failed: {message}")]
    MintFailed { message: String },
}

impl RemoteError {
    /// Transient failures are worth retrying; the rest are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Unavailable { .. })
    }
}

/// One remote branch or tag as the upstream reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReference {
    pub name: String,
    pub stamp: ReferenceStamp,
}

/// A fetched primary descriptor plus the secondary paths it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDescriptor {
    pub content: String,
    /// Paths of secondary/import files the descriptor requires.
    pub required_paths: Vec<String>,
}

/// Lists the current branches/tags of a remote repository.
#[async_trait]
pub trait RemoteReferenceLister: Send + Sync {
    async fn list_references(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Vec<RemoteReference>, RemoteError>;
}

/// Fetches and validates descriptor content.
///
/// Parsing internals are out of scope for the catalog; the oracle is consumed
/// as a pass/fail + required-file-list service.
#[async_trait]
pub trait DescriptorOracle: Send + Sync {
    /// Fetches the primary descriptor at `path` on `reference`.
    async fn fetch_descriptor(
        &self,
        repo: &RepoCoordinate,
        reference: &str,
        path: &str,
    ) -> Result<FetchedDescriptor, RemoteError>;

    /// Fetches a secondary file at `path` on `reference`.
    async fn fetch_file(
        &self,
        repo: &RepoCoordinate,
        reference: &str,
        path: &str,
    ) -> Result<String, RemoteError>;

    /// Syntax and required-field check for a fetched descriptor.
    fn validate(&self, content: &str, language: DescriptorLanguage) -> bool;

    /// A maintainer email the descriptor content itself declares, if any.
    fn declared_maintainer_email(&self, _content: &str) -> Option<String> {
        None
    }
}

/// Metadata forwarded to the DOI registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiMetadata {
    pub entry_path: String,
    pub version_name: String,
}

/// Mints a DOI for a frozen version.
#[async_trait]
pub trait DoiMinter: Send + Sync {
    async fn mint(&self, metadata: &DoiMetadata) -> Result<String, RemoteError>;
}
