// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read/write access to pods and namespaces

use crate::constants::OPERATOR_NAME;
use crate::error::{PolicyHelperError, Result};
use crate::types::PodRef;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

/// Cluster operations the reconciler needs.
///
/// Missing objects surface as [`PolicyHelperError::NotFound`], duplicate creates as
/// [`PolicyHelperError::AlreadyExists`] and stale updates as [`PolicyHelperError::Conflict`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    async fn get_pod(&self, pod: &PodRef) -> Result<Pod>;

    async fn get_namespace(&self, name: &str) -> Result<Namespace>;

    async fn create_pod(&self, pod: &Pod) -> Result<Pod>;

    /// Replace a pod. The pod's resourceVersion is used as a precondition.
    async fn update_pod(&self, pod: &Pod) -> Result<Pod>;

    async fn delete_pod(&self, pod: &PodRef) -> Result<()>;
}

/// [`ClusterGateway`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    #[instrument(skip(self, pod), fields(pod = %pod))]
    async fn get_pod(&self, pod: &PodRef) -> Result<Pod> {
        self.pods(&pod.namespace)
            .get(&pod.name)
            .await
            .map_err(|e| PolicyHelperError::from_api(e, "Pod", pod.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_namespace(&self, name: &str) -> Result<Namespace> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        namespaces
            .get(name)
            .await
            .map_err(|e| PolicyHelperError::from_api(e, "Namespace", name))
    }

    #[instrument(skip(self, pod), fields(pod = %pod.name_any()))]
    async fn create_pod(&self, pod: &Pod) -> Result<Pod> {
        let target = PodRef::from_pod(pod)?;
        let pp = PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        };
        let created = self
            .pods(&target.namespace)
            .create(&pp, pod)
            .await
            .map_err(|e| PolicyHelperError::from_api(e, "Pod", target.to_string()))?;
        debug!("Created pod {}", target);
        Ok(created)
    }

    #[instrument(skip(self, pod), fields(pod = %pod.name_any()))]
    async fn update_pod(&self, pod: &Pod) -> Result<Pod> {
        let target = PodRef::from_pod(pod)?;
        let pp = PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        };
        self.pods(&target.namespace)
            .replace(&target.name, &pp, pod)
            .await
            .map_err(|e| PolicyHelperError::from_api(e, "Pod", target.to_string()))
    }

    #[instrument(skip(self, pod), fields(pod = %pod))]
    async fn delete_pod(&self, pod: &PodRef) -> Result<()> {
        self.pods(&pod.namespace)
            .delete(&pod.name, &DeleteParams::default())
            .await
            .map_err(|e| PolicyHelperError::from_api(e, "Pod", pod.to_string()))?;
        debug!("Deleted pod {}", pod);
        Ok(())
    }
}
