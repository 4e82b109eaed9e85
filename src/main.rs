// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use selinux_policy_helper::config::Config;
use selinux_policy_helper::manager::Manager;
use selinux_policy_helper::reconcilers::PodReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting SELinux policy helper operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: operator_namespace={}, opt_in_scope={:?}, naming_scheme={:?}",
        config.operator_namespace, config.opt_in_scope, config.naming_scheme
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let manager = Manager::new().add(
        "selinux-policy-helper-controller",
        PodReconciler::new(client, config).run(),
    );
    manager.run().await?;

    // This should never be reached as controllers run forever
    warn!("All controllers stopped unexpectedly");
    Ok(())
}
