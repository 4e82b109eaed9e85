// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod reconciler - provisions a policy helper pod for opted-in pods, records it on the
//! target once it exists and deletes helpers once they succeed.

use crate::config::Config;
use crate::constants::annotations;
use crate::error::{PolicyHelperError, Result};
use crate::kubernetes::{pod_triggers, ClusterGateway, KubeGateway};
use crate::policy::admission::is_companion;
use crate::policy::{build_companion_pod, classify, companion_ref, Classification, SkipReason};
use crate::types::{PodExt, PodPhase, PodRef};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    runtime::{controller::Action, Controller},
    Client, ResourceExt,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What a single reconciliation did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The pod no longer exists
    TargetGone,
    Ignored(SkipReason),
    /// A helper pod that has not finished yet
    CompanionPending,
    CompanionDeleted,
    /// A helper pod that failed; left in place for inspection
    CompanionFailed,
    /// The helper pod now exists; the target is annotated on the next pass
    CompanionCreated(PodRef),
    TargetAnnotated(PodRef),
}

pub struct PodReconciler<G = KubeGateway> {
    gateway: G,
    config: Config,
}

impl PodReconciler<KubeGateway> {
    pub fn new(client: Client, config: Config) -> Self {
        Self::with_gateway(KubeGateway::new(client), config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (reader, triggers) = pod_triggers(self.gateway.client(), self.config.event_filter);
        let context = Arc::new(self);

        Controller::for_stream(triggers, reader)
            .run(reconcile::<KubeGateway>, error_policy::<KubeGateway>, context)
            .for_each(|res| async move {
                match res {
                    Ok((pod, action)) => debug!("Reconciled pod {}: {:?}", pod.name, action),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

impl<G: ClusterGateway> PodReconciler<G> {
    pub fn with_gateway(gateway: G, config: Config) -> Self {
        Self { gateway, config }
    }

    /// Converge the cluster for one pod, reading everything fresh.
    #[instrument(skip(self, target), fields(pod = %target))]
    pub async fn reconcile_pod(&self, target: &PodRef) -> Result<Outcome> {
        let pod = match self.gateway.get_pod(target).await {
            Ok(pod) => pod,
            Err(e) if e.is_not_found() => {
                debug!("Could not find pod {}, it was deleted", target);
                return Ok(Outcome::TargetGone);
            }
            Err(e) => {
                warn!("Could not fetch pod {}: {}", target, e);
                return Err(e);
            }
        };

        let namespace = if is_companion(&pod) || !self.config.opt_in_scope.needs_namespace() {
            None
        } else {
            match self.gateway.get_namespace(&target.namespace).await {
                Ok(ns) => Some(ns),
                // The pod goes away together with its namespace
                Err(e) if e.is_not_found() => {
                    debug!("Namespace {} is gone, skipping pod {}", target.namespace, target);
                    return Ok(Outcome::Ignored(SkipReason::NamespaceGone));
                }
                Err(e) => return Err(e),
            }
        };

        match classify(&pod, namespace.as_ref(), self.config.opt_in_scope) {
            Classification::IsCompanion => self.handle_companion(target, &pod).await,
            Classification::Ignore(reason) => {
                debug!("Skipping pod {}: {}", target, reason);
                Ok(Outcome::Ignored(reason))
            }
            Classification::NeedsPolicy => self.provision_companion(target, pod).await,
        }
    }

    async fn handle_companion(&self, companion: &PodRef, pod: &Pod) -> Result<Outcome> {
        match pod.phase() {
            PodPhase::Succeeded => match self.gateway.delete_pod(companion).await {
                Ok(()) => {
                    info!("Deleted finished policy helper pod {}", companion);
                    Ok(Outcome::CompanionDeleted)
                }
                Err(e) if e.is_not_found() => {
                    debug!("Policy helper pod {} is already gone", companion);
                    Ok(Outcome::CompanionDeleted)
                }
                Err(e) => {
                    error!("Could not delete policy helper pod {}: {}", companion, e);
                    Err(e)
                }
            },
            PodPhase::Failed => {
                error!(
                    "Policy helper pod {} failed. Please check its logs to see why",
                    companion
                );
                Ok(Outcome::CompanionFailed)
            }
            _ => {
                debug!("Skipping policy helper pod {} since it's not done", companion);
                Ok(Outcome::CompanionPending)
            }
        }
    }

    /// Create the helper pod if it does not exist yet, otherwise record it on the target.
    async fn provision_companion(&self, target: &PodRef, pod: Pod) -> Result<Outcome> {
        let companion = companion_ref(
            target,
            &self.config.operator_namespace,
            self.config.naming_scheme,
        );

        match self.gateway.get_pod(&companion).await {
            Ok(_) => self.annotate_target(target, pod, companion).await,
            Err(e) if e.is_not_found() => self.create_companion(target, &pod, companion).await,
            Err(e) => Err(e),
        }
    }

    async fn create_companion(
        &self,
        target: &PodRef,
        pod: &Pod,
        companion: PodRef,
    ) -> Result<Outcome> {
        info!("Running policy helper {} for pod {}", companion, target);

        let node_name = pod.node_name().unwrap_or_default();
        let manifest = build_companion_pod(target, node_name, &self.config)?;
        match self.gateway.create_pod(&manifest).await {
            Ok(_) => Ok(Outcome::CompanionCreated(companion)),
            Err(e) if e.is_already_exists() => {
                debug!("Policy helper pod {} was created concurrently", companion);
                Ok(Outcome::CompanionCreated(companion))
            }
            Err(e) => {
                error!("Could not create policy helper pod {}: {}", companion, e);
                Err(e)
            }
        }
    }

    async fn annotate_target(
        &self,
        target: &PodRef,
        mut pod: Pod,
        companion: PodRef,
    ) -> Result<Outcome> {
        pod.annotations_mut()
            .insert(annotations::POLICY.to_string(), companion.to_string());

        match self.gateway.update_pod(&pod).await {
            Ok(_) => {
                info!("Annotated pod {} with policy helper {}", target, companion);
                Ok(Outcome::TargetAnnotated(companion))
            }
            Err(e) if e.is_not_found() => {
                debug!("Pod {} was deleted before it could be annotated", target);
                Ok(Outcome::TargetGone)
            }
            Err(e) => {
                warn!("Could not update target pod {}: {}", target, e);
                Err(e)
            }
        }
    }
}

async fn reconcile<G: ClusterGateway + 'static>(
    pod: Arc<Pod>,
    ctx: Arc<PodReconciler<G>>,
) -> Result<Action> {
    let target = PodRef::from_pod(&pod)?;

    match ctx.reconcile_pod(&target).await? {
        // The helper's own events never point back at the target, so come back for it
        Outcome::CompanionCreated(_) => Ok(Action::requeue(ctx.config.annotate_requeue)),
        _ => Ok(Action::await_change()),
    }
}

fn error_policy<G>(pod: Arc<Pod>, error: &PolicyHelperError, ctx: Arc<PodReconciler<G>>) -> Action {
    if error.is_retryable() {
        warn!("Reconciliation of pod {} failed, retrying: {}", pod.name_any(), error);
        Action::requeue(ctx.config.error_requeue)
    } else {
        error!("Reconciliation of pod {} failed: {}", pod.name_any(), error);
        Action::await_change()
    }
}
