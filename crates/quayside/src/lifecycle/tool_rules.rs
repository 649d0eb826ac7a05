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

//! Registry-specific rules layered on the gatekeeper for tool entries.
//!
//! Container registries differ in ways the shared state machine does not
//! capture: some only host private images, some need an explicit docker path,
//! and private tools must name a maintainer. These rules run before a manual
//! tool registration is accepted and whenever privacy is flipped.

use crate::error::ClientError;
use crate::models::{
    ContainerRegistry, DescriptorLanguage, EntryAlias, EntryKey, Provider, RepoCoordinate,
    ToolSpec,
};

/// A manual tool registration request.
#[derive(Debug, Clone)]
pub struct ToolRegistration {
    pub registry: ContainerRegistry,
    pub namespace: String,
    pub name: String,
    /// Optional toolname distinguishing several entries on one image.
    pub toolname: Option<String>,
    /// Git repository holding the descriptors.
    pub git_coordinate: RepoCoordinate,
    pub language: DescriptorLanguage,
    pub descriptor_path: String,
    pub is_private: bool,
    pub maintainer_email: Option<String>,
    pub custom_docker_path: Option<String>,
}

impl ToolRegistration {
    /// The natural key this registration would occupy.
    pub fn entry_key(&self) -> EntryKey {
        EntryKey::new(
            Provider::Registry(self.registry),
            self.namespace.clone(),
            self.name.clone(),
            EntryAlias::from_name(self.toolname.as_deref()),
        )
    }

    /// The tool payload for the resulting entry.
    pub fn tool_spec(&self) -> ToolSpec {
        ToolSpec {
            registry: self.registry,
            git_coordinate: self.git_coordinate.clone(),
            is_private: self.is_private,
            maintainer_email: self.maintainer_email.clone(),
            custom_docker_path: self.custom_docker_path.clone(),
        }
    }
}

/// Validates registry rules for a manual registration.
///
/// Checked before any entry is created, so a rejected registration leaves
/// no state behind.
pub fn validate_registration(reg: &ToolRegistration) -> Result<(), ClientError> {
    if reg.registry.is_private_only() && !reg.is_private {
        return Err(ClientError::PrivateOnlyRegistry(reg.registry.to_string()));
    }

    if reg.is_private && normalized_email(reg.maintainer_email.as_deref()).is_none() {
        return Err(ClientError::MissingMaintainerEmail);
    }

    if reg.registry.requires_custom_path() {
        match reg.custom_docker_path.as_deref() {
            None => {
                return Err(ClientError::MissingCustomDockerPath {
                    registry: reg.registry.to_string(),
                })
            }
            Some(path) if !reg.registry.validate_custom_path(path) => {
                return Err(ClientError::InvalidCustomDockerPath {
                    registry: reg.registry.to_string(),
                    path: path.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Applies a privacy flip to a tool payload.
///
/// Going private requires a maintainer email from one of three sources, in
/// order: the request, the payload's existing email, or an email the
/// descriptor content declares. Going public never clears the email, and is
/// rejected outright on private-only registries.
pub fn set_privacy(
    spec: &mut ToolSpec,
    private: bool,
    supplied_email: Option<&str>,
    declared_email: Option<&str>,
) -> Result<(), ClientError> {
    if !private && spec.registry.is_private_only() {
        return Err(ClientError::PrivateOnlyRegistry(spec.registry.to_string()));
    }

    if private {
        let email = normalized_email(supplied_email)
            .or_else(|| normalized_email(spec.maintainer_email.as_deref()))
            .or_else(|| normalized_email(declared_email));
        match email {
            Some(email) => spec.maintainer_email = Some(email),
            None => return Err(ClientError::MissingMaintainerEmail),
        }
    } else if let Some(email) = normalized_email(supplied_email) {
        spec.maintainer_email = Some(email);
    }

    spec.is_private = private;
    Ok(())
}

fn normalized_email(email: Option<&str>) -> Option<String> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}
