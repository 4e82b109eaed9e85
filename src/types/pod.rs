// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{PolicyHelperError, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use std::fmt;

/// Namespaced identity of a pod
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity of an observed pod; fails for objects without a namespace
    pub fn from_pod(pod: &Pod) -> Result<Self> {
        let name = pod.name_any();
        let namespace = pod
            .namespace()
            .ok_or_else(|| PolicyHelperError::InvalidInput(format!("pod {} has no namespace", name)))?;
        Ok(Self { namespace, name })
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Runtime phase reported in `status.phase`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    pub fn parse(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Accessors for the parts of a pod the controller looks at
pub trait PodExt {
    fn phase(&self) -> PodPhase;
    fn node_name(&self) -> Option<&str>;
    fn has_annotation(&self, key: &str) -> bool;
}

impl PodExt for Pod {
    fn phase(&self) -> PodPhase {
        self.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map_or(PodPhase::Unknown, PodPhase::parse)
    }

    fn node_name(&self) -> Option<&str> {
        self.spec.as_ref().and_then(|s| s.node_name.as_deref())
    }

    fn has_annotation(&self, key: &str) -> bool {
        self.annotations().contains_key(key)
    }
}
