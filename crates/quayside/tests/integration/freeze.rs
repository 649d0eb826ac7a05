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

//! Frozen-version immutability and DOI issuance.

use crate::fixtures::{seed_hello_repo, service_with, test_config, CountingDoiMinter, FakeRemote};
use quayside::{
    CatalogConfig, CatalogError, ClientError, DescriptorLanguage, ReferenceStamp, RetryPolicy,
};
use std::time::Duration;

fn doi_config() -> CatalogConfig {
    CatalogConfig::builder()
        .retry_policy(RetryPolicy::none())
        .remote_timeout(Duration::from_secs(10))
        .doi_credential("zenodo-token")
        .build()
}

#[tokio::test]
async fn test_frozen_version_ignores_remote_changes() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo.clone(), DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();
    service.freeze_version(id, "master").await.unwrap();

    let frozen_before = service.entry(id).await.unwrap().version("master").cloned().unwrap();

    // The branch moves and its content changes underneath the catalog.
    remote.set_branch(&repo, "master", "0ddba11");
    remote.put_file(&repo, "master", "/Dockstore.cwl", "INVALID rewrite", &[]);
    service.refresh_entry(id).await.unwrap();

    let frozen_after = service.entry(id).await.unwrap().version("master").cloned().unwrap();
    assert_eq!(frozen_after.reference, frozen_before.reference);
    assert_eq!(frozen_after.source_files, frozen_before.source_files);
    assert!(frozen_after.valid);
    assert_eq!(
        frozen_before.reference,
        ReferenceStamp::Commit("c0ffee01".to_string())
    );
}

#[tokio::test]
async fn test_frozen_version_survives_reference_deletion() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo.clone(), DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();
    service.freeze_version(id, "master").await.unwrap();

    remote.remove_branch(&repo, "master");
    remote.remove_branch(&repo, "develop");
    let report = service.refresh_entry(id).await.unwrap();

    // Only the mutable version was dropped.
    assert_eq!(report.deleted, 1);
    let entry = service.entry(id).await.unwrap();
    assert!(entry.version("master").is_some());
    assert!(entry.version("develop").is_none());
}

#[tokio::test]
async fn test_frozen_version_rejects_path_override() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();
    service.freeze_version(id, "master").await.unwrap();

    let err = service
        .set_version_path(id, "master", "/elsewhere.cwl")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Client(ClientError::FrozenVersion(_))
    ));

    // Entry-level default changes skip it silently.
    let updated = service.update_default_path(id, "/new.cwl").await.unwrap();
    assert_eq!(updated, 3);
    let entry = service.entry(id).await.unwrap();
    assert_eq!(
        entry.version("master").unwrap().descriptor_path,
        "/Dockstore.cwl"
    );
}

#[tokio::test]
async fn test_freeze_is_idempotent() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    service.freeze_version(id, "master").await.unwrap();
    service.freeze_version(id, "master").await.unwrap();
    assert!(service.entry(id).await.unwrap().version("master").unwrap().frozen);
}

#[tokio::test]
async fn test_doi_preconditions_checked_in_order() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    // No DOI credential configured.
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    // Not frozen outranks the missing credential.
    let err = service.request_doi(id, "master").await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Client(ClientError::NotFrozen(_))
    ));

    service.freeze_version(id, "master").await.unwrap();
    let err = service.request_doi(id, "master").await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Client(ClientError::NoDoiCredential)
    ));
    assert_eq!(minter.mint_count(), 0);
}

#[tokio::test]
async fn test_doi_minted_once_and_replayed() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, doi_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();
    service.freeze_version(id, "master").await.unwrap();

    let doi = service.request_doi(id, "master").await.unwrap();
    assert!(doi.starts_with("10.5281/zenodo."));
    assert_eq!(
        service.entry(id).await.unwrap().version("master").unwrap().doi.as_deref(),
        Some(doi.as_str())
    );

    // A second request returns the recorded DOI without re-minting.
    let again = service.request_doi(id, "master").await.unwrap();
    assert_eq!(again, doi);
    assert_eq!(minter.mint_count(), 1);
}
