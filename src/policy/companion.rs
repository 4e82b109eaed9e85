// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Companion pod manifest construction

use crate::config::Config;
use crate::constants::{annotations, companion, host_paths};
use crate::error::{PolicyHelperError, Result};
use crate::policy::identity::companion_ref;
use crate::types::PodRef;
use k8s_openapi::api::core::v1::{
    Container, HostPathVolumeSource, Pod, PodSpec, SecurityContext, Volume, VolumeMount,
};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Build the privileged companion pod that derives a policy for `target` on `node_name`.
pub fn build_companion_pod(target: &PodRef, node_name: &str, config: &Config) -> Result<Pod> {
    if target.name.is_empty() {
        return Err(PolicyHelperError::InvalidInput("target pod name is empty".to_string()));
    }
    if target.namespace.is_empty() {
        return Err(PolicyHelperError::InvalidInput(format!(
            "target pod {} has an empty namespace",
            target.name
        )));
    }
    if node_name.is_empty() {
        return Err(PolicyHelperError::InvalidInput(format!(
            "target pod {} is not scheduled on a node",
            target
        )));
    }

    let identity = companion_ref(target, &config.operator_namespace, config.naming_scheme);
    if identity.name.len() > companion::MAX_NAME_LEN {
        return Err(PolicyHelperError::InvalidInput(format!(
            "companion name for {} exceeds {} characters",
            target,
            companion::MAX_NAME_LEN
        )));
    }

    Ok(Pod {
        metadata: ObjectMeta {
            name: Some(identity.name),
            namespace: Some(identity.namespace),
            annotations: Some(BTreeMap::from([(
                annotations::OWNED_BY.to_string(),
                String::new(),
            )])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: companion::CONTAINER_NAME.to_string(),
                image: Some(config.helper_image.clone()),
                command: Some(vec![companion::COMMAND.to_string()]),
                args: Some(vec![
                    "--name".to_string(),
                    target.name.clone(),
                    "--namespace".to_string(),
                    target.namespace.clone(),
                ]),
                security_context: Some(SecurityContext {
                    privileged: Some(true),
                    ..Default::default()
                }),
                volume_mounts: Some(
                    host_paths::MOUNTS
                        .iter()
                        .map(|(name, path, _)| VolumeMount {
                            name: name.to_string(),
                            mount_path: path.to_string(),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }],
            node_name: Some(node_name.to_string()),
            restart_policy: Some(companion::RESTART_POLICY.to_string()),
            service_account_name: Some(config.service_account.clone()),
            volumes: Some(
                host_paths::MOUNTS
                    .iter()
                    .map(|(name, path, kind)| Volume {
                        name: name.to_string(),
                        host_path: Some(HostPathVolumeSource {
                            path: path.to_string(),
                            type_: Some(kind.to_string()),
                        }),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
        status: None,
    })
}
