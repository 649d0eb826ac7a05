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

//! Error taxonomy for catalog operations.
//!
//! Three failure classes are kept distinct because callers react to them
//! differently:
//!
//! - [`ClientError`]: the caller violated a precondition it controls. The
//!   operation mutates nothing and the caller can fix the request.
//! - [`RemoteError`]: an upstream system was unreachable or returned garbage.
//!   Retried with backoff at the collaborator boundary; if exhausted, surfaces
//!   as a per-entry failure that never aborts sibling entries in a bulk run.
//! - [`ConsistencyError`]: the requested transition would break a catalog
//!   invariant. Detected before commit, never silently coerced.

use thiserror::Error;
use uuid::Uuid;

pub use crate::remote::RemoteError;

/// Precondition failures the caller can fix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("entry {0} not found")]
    EntryNotFound(Uuid),

    #[error("version '{0}' not found")]
    VersionNotFound(String),

    #[error("cannot restub: entry '{0}' is published")]
    RestubWhilePublished(String),

    #[error("no valid versions to publish for '{0}'")]
    NoValidVersions(String),

    #[error("--unpub and an entry name are mutually exclusive")]
    MutuallyExclusiveFlags,

    #[error("descriptor language cannot change after an entry has been refreshed")]
    LanguageLocked,

    #[error("refresh is not supported for hosted entries")]
    HostedRefresh,

    #[error("version '{0}' is not frozen; a DOI requires a frozen version")]
    NotFrozen(String),

    #[error("no DOI-minting credential is configured")]
    NoDoiCredential,

    #[error("version '{0}' is frozen and cannot be edited")]
    FrozenVersion(String),

    #[error("registry {0} only supports private tools")]
    PrivateOnlyRegistry(String),

    #[error("a private tool requires a maintainer email")]
    MissingMaintainerEmail,

    #[error("registry {registry} requires a custom docker path")]
    MissingCustomDockerPath { registry: String },

    #[error("'{path}' is not a valid docker path for registry {registry}")]
    InvalidCustomDockerPath { registry: String, path: String },

    #[error("the following entry is already registered: {0}")]
    DuplicateEntry(String),

    #[error("version '{0}' must be valid and visible to be the default")]
    IneligibleDefaultVersion(String),

    #[error("file at '{0}' is not valid JSON")]
    MalformedTestParameterFile(String),
}

/// Invariant violations detected before commit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("published entry '{0}' would be left with no valid version")]
    PublishedWithoutValidVersion(String),

    #[error("an entry with key '{0}' already exists")]
    DuplicateNaturalKey(String),

    #[error("stub entry '{0}' must not own versions")]
    StubWithVersions(String),
}

/// Umbrella error for every catalog operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("refresh of entry {0} timed out")]
    RefreshTimeout(Uuid),

    #[error("refresh task for entry {0} panicked or was cancelled")]
    RefreshCancelled(Uuid),
}

impl CatalogError {
    /// Whether the caller can fix this failure by changing the request.
    ///
    /// Maps to the tri-state contract the transport layers consume: client
    /// errors and consistency errors are recoverable validation failures;
    /// everything else is a remote/unrecoverable failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CatalogError::Client(_) | CatalogError::Consistency(_)
        )
    }
}
