// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{companion, requeue};
use crate::kubernetes::events::EventFilter;
use crate::policy::{NamingScheme, OptInScope};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace companion pods are created in
    pub operator_namespace: String,
    pub opt_in_scope: OptInScope,
    pub naming_scheme: NamingScheme,
    pub helper_image: String,
    pub service_account: String,
    /// Watch events that trigger a reconciliation
    pub event_filter: EventFilter,
    pub annotate_requeue: Duration,
    pub error_requeue: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults for unset keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            operator_namespace: string("OPERATOR_NAMESPACE", companion::DEFAULT_NAMESPACE),
            opt_in_scope: parse(&lookup, "OPT_IN_SCOPE")?.unwrap_or_default(),
            naming_scheme: parse(&lookup, "COMPANION_NAMING")?.unwrap_or_default(),
            helper_image: string("HELPER_IMAGE", companion::DEFAULT_IMAGE),
            service_account: string("HELPER_SERVICE_ACCOUNT", companion::DEFAULT_SERVICE_ACCOUNT),
            event_filter: parse(&lookup, "WATCH_EVENTS")?.unwrap_or_default(),
            annotate_requeue: Duration::from_secs(
                parse(&lookup, "ANNOTATE_REQUEUE_SECS")?.unwrap_or(requeue::ANNOTATE_SECS),
            ),
            error_requeue: Duration::from_secs(
                parse(&lookup, "ERROR_REQUEUE_SECS")?.unwrap_or(requeue::ERROR_SECS),
            ),
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("invalid value '{}' for {}", raw, key))
        })
        .transpose()
}
