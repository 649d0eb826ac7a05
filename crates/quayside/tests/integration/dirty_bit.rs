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

//! Descriptor-path overrides: per-version dirty bits versus the entry-level
//! default path.

use crate::fixtures::{seed_hello_repo, service_with, test_config, CountingDoiMinter, FakeRemote};
use quayside::{CatalogError, ClientError, DescriptorLanguage};

#[tokio::test]
async fn test_dirty_version_keeps_its_path_through_default_change() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);
    remote.put_file(&repo, "master", "/workflows/checker.cwl", "cwlVersion: v1.0", &[]);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    service
        .set_version_path(id, "master", "/workflows/checker.cwl")
        .await
        .unwrap();

    let entry = service.entry(id).await.unwrap();
    assert!(entry.version("master").unwrap().dirty_bit);

    let updated = service.update_default_path(id, "/other.cwl").await.unwrap();
    assert_eq!(updated, 3);

    let entry = service.entry(id).await.unwrap();
    assert_eq!(entry.default_descriptor_path, "/other.cwl");
    assert_eq!(
        entry.version("master").unwrap().descriptor_path,
        "/workflows/checker.cwl"
    );
    for name in ["develop", "testBoth", "testCWL"] {
        assert_eq!(entry.version(name).unwrap().descriptor_path, "/other.cwl");
    }
}

#[tokio::test]
async fn test_refresh_honors_dirty_path_override() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);
    remote.put_file(&repo, "develop", "/alt/Dockstore.cwl", "cwlVersion: v1.0", &[]);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    // develop had no descriptor at the default path.
    let entry = service.entry(id).await.unwrap();
    assert!(!entry.version("develop").unwrap().valid);

    service
        .set_version_path(id, "develop", "/alt/Dockstore.cwl")
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    let entry = service.entry(id).await.unwrap();
    let develop = entry.version("develop").unwrap();
    assert!(develop.valid);
    assert_eq!(
        develop.primary_descriptor().unwrap().path,
        "/alt/Dockstore.cwl"
    );
    // The override survived the refresh.
    assert!(develop.dirty_bit);
}

#[tokio::test]
async fn test_all_versions_dirty_makes_default_change_a_noop() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    for name in ["master", "develop", "testBoth", "testCWL"] {
        service
            .set_version_path(id, name, "/pinned.cwl")
            .await
            .unwrap();
    }

    let updated = service.update_default_path(id, "/new.cwl").await.unwrap();
    assert_eq!(updated, 0);

    let entry = service.entry(id).await.unwrap();
    assert_eq!(entry.default_descriptor_path, "/new.cwl");
    for version in &entry.versions {
        assert_eq!(version.descriptor_path, "/pinned.cwl");
    }
}

#[tokio::test]
async fn test_pointing_every_version_at_missing_file_blocks_publish() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();
    service.refresh_entry(id).await.unwrap();

    for name in ["master", "develop", "testBoth", "testCWL"] {
        service
            .set_version_path(id, name, "/does-not-exist.cwl")
            .await
            .unwrap();
    }
    service.refresh_entry(id).await.unwrap();

    let entry = service.entry(id).await.unwrap();
    assert!(!entry.has_valid_version());

    let err = service.publish(id, None, false).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Client(ClientError::NoValidVersions(_))
    ));
}

#[tokio::test]
async fn test_descriptor_language_locked_after_first_refresh() {
    let remote = FakeRemote::new();
    let minter = CountingDoiMinter::new();
    let service = service_with(&remote, &minter, test_config());
    let repo = seed_hello_repo(&remote);

    let id = service
        .register_workflow(repo, DescriptorLanguage::Cwl, None, None)
        .await
        .unwrap();

    // Fine before the entry ever talks to its remote.
    service
        .set_descriptor_language(id, DescriptorLanguage::Wdl)
        .await
        .unwrap();
    service
        .set_descriptor_language(id, DescriptorLanguage::Cwl)
        .await
        .unwrap();

    service.refresh_entry(id).await.unwrap();

    let err = service
        .set_descriptor_language(id, DescriptorLanguage::Wdl)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Client(ClientError::LanguageLocked)
    ));
}
