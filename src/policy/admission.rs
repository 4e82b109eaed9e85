// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decides what the controller does with an observed pod.

use crate::constants::annotations;
use crate::types::{PodExt, PodPhase};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::ResourceExt;
use std::fmt;
use std::str::FromStr;

/// Where the opt-in annotation is honoured
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptInScope {
    /// Only the pod's own annotations
    Pod,
    /// The pod's annotations, or its namespace's as a default for every pod in it
    #[default]
    PodOrNamespace,
}

impl OptInScope {
    /// Whether classification needs the pod's namespace
    pub fn needs_namespace(self) -> bool {
        self == Self::PodOrNamespace
    }
}

impl FromStr for OptInScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "pod" => Ok(Self::Pod),
            "pod-or-namespace" => Ok(Self::PodOrNamespace),
            other => anyhow::bail!("unknown opt-in scope '{}' (expected 'pod' or 'pod-or-namespace')", other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotOptedIn,
    NotRunning,
    AlreadyProcessed,
    NamespaceGone,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotOptedIn => "not opted in",
            Self::NotRunning => "not running",
            Self::AlreadyProcessed => "already processed",
            Self::NamespaceGone => "namespace gone",
        };
        f.write_str(reason)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Ignore(SkipReason),
    IsCompanion,
    NeedsPolicy,
}

/// Whether the pod is one of our companion pods
pub fn is_companion(pod: &Pod) -> bool {
    pod.has_annotation(annotations::OWNED_BY)
}

/// Classify a pod. Rules are evaluated in order: companion tag, opt-in, phase, processed marker.
///
/// `namespace` is only consulted under [`OptInScope::PodOrNamespace`].
pub fn classify(pod: &Pod, namespace: Option<&Namespace>, scope: OptInScope) -> Classification {
    if is_companion(pod) {
        return Classification::IsCompanion;
    }

    let namespace_opted_in = scope.needs_namespace()
        && namespace.is_some_and(|ns| ns.annotations().contains_key(annotations::GENERATE_POLICY));
    if !pod.has_annotation(annotations::GENERATE_POLICY) && !namespace_opted_in {
        return Classification::Ignore(SkipReason::NotOptedIn);
    }

    if pod.phase() != PodPhase::Running {
        return Classification::Ignore(SkipReason::NotRunning);
    }

    if pod.has_annotation(annotations::POLICY) {
        return Classification::Ignore(SkipReason::AlreadyProcessed);
    }

    Classification::NeedsPolicy
}
