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

//! Runtime configuration for the catalog service.

use std::time::Duration;

use crate::remote::RetryPolicy;

/// Configuration for the catalog service.
///
/// # Construction
///
/// Use [`CatalogConfig::builder()`] to create a configuration:
///
/// ```rust,ignore
/// let config = CatalogConfig::builder()
///     .refresh_concurrency(8)
///     .remote_timeout(Duration::from_secs(60))
///     .build();
/// ```
///
/// Or use the default configuration:
///
/// ```rust,ignore
/// let config = CatalogConfig::default();
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CatalogConfig {
    refresh_concurrency: usize,
    remote_timeout: Duration,
    retry_policy: RetryPolicy,
    doi_credential: Option<String>,
}

impl CatalogConfig {
    /// Creates a new configuration builder with default values.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Width of the bulk-refresh worker pool.
    ///
    /// Sized to the rate limits of the remote hosts; each permit covers one
    /// entry's full reconciliation.
    pub fn refresh_concurrency(&self) -> usize {
        self.refresh_concurrency
    }

    /// Deadline for one entry's reconciliation, external calls included.
    pub fn remote_timeout(&self) -> Duration {
        self.remote_timeout
    }

    /// Backoff policy applied at the collaborator boundary.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Credential for the DOI registrar, if one is configured.
    pub fn doi_credential(&self) -> Option<&str> {
        self.doi_credential.as_deref()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfigBuilder::default().build()
    }
}

/// Builder for [`CatalogConfig`].
#[derive(Debug, Clone)]
pub struct CatalogConfigBuilder {
    refresh_concurrency: usize,
    remote_timeout: Duration,
    retry_policy: RetryPolicy,
    doi_credential: Option<String>,
}

impl Default for CatalogConfigBuilder {
    fn default() -> Self {
        Self {
            refresh_concurrency: 4,
            remote_timeout: Duration::from_secs(120),
            retry_policy: RetryPolicy::default(),
            doi_credential: None,
        }
    }
}

impl CatalogConfigBuilder {
    pub fn refresh_concurrency(mut self, permits: usize) -> Self {
        self.refresh_concurrency = permits.max(1);
        self
    }

    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn doi_credential(mut self, credential: impl Into<String>) -> Self {
        self.doi_credential = Some(credential.into());
        self
    }

    pub fn build(self) -> CatalogConfig {
        CatalogConfig {
            refresh_concurrency: self.refresh_concurrency,
            remote_timeout: self.remote_timeout,
            retry_policy: self.retry_policy,
            doi_credential: self.doi_credential,
        }
    }
}
