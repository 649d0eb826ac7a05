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

//! # Quayside
//!
//! Quayside is a catalog core that mirrors, in a local store, the state of
//! versioned workflow and tool descriptors hosted on external source-control
//! systems and container registries, and gates publishing on that mirrored
//! state: an entry is only ever publishable while at least one of its
//! versions holds descriptor content that actually validates.
//!
//! ## Architecture
//!
//! - [`models`]: entries, versions, source files, and the natural keys that
//!   identify them.
//! - [`store`]: the persistence seam — a [`store::CatalogStore`] trait with
//!   an in-memory reference backend; database backends live elsewhere.
//! - [`remote`]: contracts for the external collaborators (reference lister,
//!   descriptor oracle, DOI minter) plus retry at that boundary.
//! - [`reconciler`]: the refresh algorithm synchronizing local versions
//!   against the remote branch/tag list.
//! - [`paths`]: descriptor path edits and the dirty bit protecting manual
//!   overrides from bulk changes.
//! - [`lifecycle`]: the STUB/FULL/publish/freeze state machine and the
//!   registry-specific rules for tool entries.
//! - [`service`]: the [`service::CatalogService`] facade wiring it together
//!   with per-entry single-writer locking and a bounded refresh pool.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quayside::{CatalogConfig, CatalogService, MemoryCatalogStore};
//!
//! # async fn example(
//! #     lister: Arc<dyn quayside::remote::RemoteReferenceLister>,
//! #     oracle: Arc<dyn quayside::remote::DescriptorOracle>,
//! #     minter: Arc<dyn quayside::remote::DoiMinter>,
//! # ) -> Result<(), quayside::CatalogError> {
//! let store = Arc::new(MemoryCatalogStore::new());
//! let service = CatalogService::new(store, lister, oracle, minter, CatalogConfig::default());
//!
//! let summary = service.refresh_all().await;
//! println!("{} entries refreshed", summary.succeeded.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod paths;
pub mod reconciler;
pub mod remote;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::CatalogConfig;
pub use error::{CatalogError, ClientError, ConsistencyError};
pub use lifecycle::tool_rules::ToolRegistration;
pub use models::{
    ContainerRegistry, DescriptorLanguage, Entry, EntryAlias, EntryKey, EntryMode, EntryVariant,
    FileType, Provider, ReferenceStamp, RepoCoordinate, SourceControl, SourceFile, ToolSpec,
    Version,
};
pub use reconciler::RefreshReport;
pub use remote::{RemoteError, RetryPolicy};
pub use service::{CatalogService, PublishResult, RefreshSummary};
pub use store::{CatalogStore, MemoryCatalogStore};
