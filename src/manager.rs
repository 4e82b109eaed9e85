// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Startup routine running an explicit list of controllers.

use anyhow::{Context, Result};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use std::future::Future;
use tracing::{info, warn};

/// Controllers to run, in registration order
#[derive(Default)]
pub struct Manager {
    controllers: Vec<(&'static str, BoxFuture<'static, Result<()>>)>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(mut self, name: &'static str, controller: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.controllers.push((name, controller.boxed()));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.controllers.iter().map(|(name, _)| *name).collect()
    }

    /// Run every controller concurrently until they all finish or one fails
    pub async fn run(self) -> Result<()> {
        if self.controllers.is_empty() {
            warn!("No controllers registered");
            return Ok(());
        }
        info!("Starting controllers: {}", self.names().join(", "));

        try_join_all(self.controllers.into_iter().map(|(name, controller)| async move {
            controller
                .await
                .with_context(|| format!("controller {} failed", name))
        }))
        .await?;

        Ok(())
    }
}
