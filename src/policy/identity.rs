// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deterministic companion pod naming.

use crate::constants::companion::{CONCAT_NAME_PREFIX, HASHED_NAME_PREFIX};
use crate::types::PodRef;
use sha1::{Digest, Sha1};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NamingScheme {
    /// `selinux-k8s-<sha1 hex of namespace/name>`
    #[default]
    Hashed,
    /// `selinux-k8s-for-<name>`; only unique while target names are unique cluster-wide
    Concat,
}

impl FromStr for NamingScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "hashed" => Ok(Self::Hashed),
            "concat" => Ok(Self::Concat),
            other => anyhow::bail!("unknown naming scheme '{}' (expected 'hashed' or 'concat')", other),
        }
    }
}

/// Name of the companion pod for the target `target_namespace/target_name`.
pub fn companion_name(target_name: &str, target_namespace: &str, scheme: NamingScheme) -> String {
    match scheme {
        NamingScheme::Hashed => {
            // '/' cannot appear in either part, so distinct pairs never share a digest input
            let mut hasher = Sha1::new();
            hasher.update(target_namespace.as_bytes());
            hasher.update(b"/");
            hasher.update(target_name.as_bytes());
            format!("{}{}", HASHED_NAME_PREFIX, hex::encode(hasher.finalize()))
        }
        NamingScheme::Concat => format!("{}{}", CONCAT_NAME_PREFIX, target_name),
    }
}

/// Full identity of the companion pod for `target`, placed in `operator_namespace`.
pub fn companion_ref(target: &PodRef, operator_namespace: &str, scheme: NamingScheme) -> PodRef {
    PodRef::new(
        operator_namespace,
        companion_name(&target.name, &target.namespace, scheme),
    )
}
