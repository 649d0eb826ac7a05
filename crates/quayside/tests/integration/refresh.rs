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

//! Refresh behavior: version-set reconciliation, idempotence, mode
//! transitions, and partial failure in bulk runs.

use std::time::Duration;

use tracing_test::traced_test;

use crate::fixtures::{
    hello_repo, seed_hello_repo, service_with, test_config, CountingDoiMinter, FakeRemote,
};
use quayside::{
    CatalogConfig, CatalogError, ClientError, DescriptorLanguage, EntryMode, RepoCoordinate,
    RetryPolicy, SourceControl,
};

#[tokio::test]
async fn test_refresh_builds_versions_and_promotes_to_full() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();

    let report = service.refresh_entry(id).await.unwrap();
    assert_eq!(report.created, 4);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.valid, 2);

    let entry = service.entry(id).await.unwrap();
    assert_eq!(entry.mode, EntryMode::Full);
    assert_eq!(entry.versions.len(), 4);
    assert_eq!(entry.versions.iter().filter(|v| v.valid).count(), 2);
    assert!(entry.version("master").unwrap().valid);
    assert!(entry.version("testBoth").unwrap().valid);
    assert!(!entry.version("testCWL").unwrap().valid);
    assert!(!entry.version("develop").unwrap().valid);
    assert!(entry.last_refreshed.is_some());
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();

    service.refresh_entry(id).await.unwrap();
    let first = service.entry(id).await.unwrap();

    let report = service.refresh_entry(id).await.unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.deleted, 0);

    let second = service.entry(id).await.unwrap();
    assert_eq!(first.versions.len(), second.versions.len());
    for before in &first.versions {
        let after = second.version(&before.name).unwrap();
        // Identity and user-visible state survive a no-change refresh.
        assert_eq!(before.id, after.id);
        assert_eq!(before.descriptor_path, after.descriptor_path);
        assert_eq!(before.valid, after.valid);
        assert_eq!(before.dirty_bit, after.dirty_bit);
        assert_eq!(before.source_files, after.source_files);
    }
}

#[tokio::test]
async fn test_refresh_drops_versions_whose_reference_disappeared() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo.clone(), DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();
    service.set_default_version(id, "master").await.unwrap();

    remote.remove_branch(&repo, "master");
    let report = service.refresh_entry(id).await.unwrap();

    assert_eq!(report.deleted, 1);
    let entry = service.entry(id).await.unwrap();
    assert!(entry.version("master").is_none());
    // The default pointed at the deleted version and was cleared.
    assert!(entry.actual_default_version.is_none());
}

#[tokio::test]
async fn test_refresh_demotes_emptied_entry_to_stub() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo.clone(), DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    for branch in ["master", "develop", "testBoth", "testCWL"] {
        remote.remove_branch(&repo, branch);
    }
    service.refresh_entry(id).await.unwrap();

    let entry = service.entry(id).await.unwrap();
    assert_eq!(entry.mode, EntryMode::Stub);
    assert!(entry.versions.is_empty());
}

#[traced_test]
#[tokio::test]
async fn test_bulk_refresh_reports_per_entry_failures() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let good_repo = seed_hello_repo(&remote);

    let bad_repo = RepoCoordinate::new(SourceControl::GitHub, "DockstoreTestUser2", "broken-repo");
    remote.set_branch(&bad_repo, "master", "deadbeef");
    remote.set_unavailable(&bad_repo, true);

    let good = service
        .register_workflow(good_repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    let bad = service
        .register_workflow(bad_repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();

    let summary = service.refresh_all().await;

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.succeeded.len(), 1);
    assert_eq!(summary.succeeded[0].0, good);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, bad);

    // The good entry refreshed despite its sibling's failure.
    assert_eq!(service.entry(good).await.unwrap().mode, EntryMode::Full);
    // The bad entry is untouched.
    assert_eq!(service.entry(bad).await.unwrap().mode, EntryMode::Stub);

    assert!(logs_contain("Bulk refresh finished"));
}

#[tokio::test]
async fn test_refresh_timeout_leaves_prior_state_unchanged() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let config = CatalogConfig::builder()
        .retry_policy(RetryPolicy::none())
        .remote_timeout(Duration::from_millis(50))
        .build();
    let service = service_with(&remote, &minter, config);
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();

    remote.set_list_delay(Duration::from_secs(5));
    let err = service.refresh_entry(id).await.unwrap_err();
    assert!(matches!(err, CatalogError::RefreshTimeout(_)));

    let entry = service.entry(id).await.unwrap();
    assert_eq!(entry.mode, EntryMode::Stub);
    assert!(entry.versions.is_empty());
    assert!(entry.last_refreshed.is_none());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    seed_hello_repo(&remote);

    service
        .register_workflow(hello_repo(), DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();

    let err = service
        .register_workflow(hello_repo(), DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    // The same repository under an alias is a distinct entry.
    service
        .register_workflow(hello_repo(), DescriptorLanguage::Cwl, None, Some("alt"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_test_parameter_files_survive_refresh() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    service
        .add_test_parameter_file(id, "master", "/test.cwl.json", r#"{"input": "hello"}"#)
        .await
        .unwrap();

    service.refresh_entry(id).await.unwrap();

    let entry = service.entry(id).await.unwrap();
    let master = entry.version("master").unwrap();
    assert!(master
        .test_parameter_files()
        .any(|f| f.path == "/test.cwl.json"));

    service
        .remove_test_parameter_file(id, "master", "/test.cwl.json")
        .await
        .unwrap();
    let entry = service.entry(id).await.unwrap();
    assert_eq!(
        entry.version("master").unwrap().test_parameter_files().count(),
        0
    );
}

#[tokio::test]
async fn test_malformed_test_parameter_file_rejected() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    let err = service
        .add_test_parameter_file(id, "master", "/test.json", "not json {")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Client(ClientError::MalformedTestParameterFile(_))
    ));
}
