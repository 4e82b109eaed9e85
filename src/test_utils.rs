// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes HTTP API, an in-memory cluster and object builders.

use crate::config::Config;
use crate::error::{PolicyHelperError, Result as GatewayResult};
use crate::kubernetes::{ClusterGateway, EventFilter};
use crate::policy::{NamingScheme, OptInScope};
use crate::types::PodRef;
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{Namespace, Pod, PodSpec, PodStatus};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request method and path.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// `(method, path)` of every request received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&(method, path))
            .cloned()
            .unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));

        Box::pin(async move {
            let (status, body) = response;
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Configuration used across tests: companions go to `operator-ns`
pub fn test_config() -> Config {
    Config {
        operator_namespace: "operator-ns".to_string(),
        opt_in_scope: OptInScope::PodOrNamespace,
        naming_scheme: NamingScheme::Hashed,
        helper_image: crate::constants::companion::DEFAULT_IMAGE.to_string(),
        service_account: crate::constants::companion::DEFAULT_SERVICE_ACCOUNT.to_string(),
        event_filter: EventFilter::updates_only(),
        annotate_requeue: Duration::from_secs(5),
        error_requeue: Duration::from_secs(60),
    }
}

pub fn make_pod(
    namespace: &str,
    name: &str,
    annotations: &[(&str, &str)],
    phase: &str,
    node_name: Option<&str>,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: (!annotations.is_empty()).then(|| to_map(annotations)),
            ..Default::default()
        },
        spec: Some(PodSpec {
            node_name: node_name.map(str::to_string),
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
    }
}

pub fn make_namespace(name: &str, annotations: &[(&str, &str)]) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: (!annotations.is_empty()).then(|| to_map(annotations)),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Create a mock pod JSON response
pub fn pod_json(namespace: &str, name: &str, phase: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1",
            "uid": "test-uid"
        },
        "spec": {
            "containers": [],
            "nodeName": "node-a"
        },
        "status": {
            "phase": phase
        }
    })
    .to_string()
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a failure Status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

pub fn conflict_json(name: &str) -> String {
    status_json(
        409,
        "Conflict",
        &format!(
            "Operation cannot be fulfilled on pods \"{}\": the object has been modified",
            name
        ),
    )
}

/// A gateway call recorded by [`FakeCluster`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    GetPod(PodRef),
    GetNamespace(String),
    CreatePod(PodRef),
    UpdatePod(PodRef),
    DeletePod(PodRef),
}

#[derive(Default)]
struct FakeState {
    pods: BTreeMap<PodRef, Pod>,
    namespaces: BTreeMap<String, Namespace>,
    calls: Vec<Call>,
    version: u64,
}

impl FakeState {
    fn stamp(&mut self, mut pod: Pod) -> Pod {
        self.version += 1;
        pod.metadata.resource_version = Some(self.version.to_string());
        pod
    }
}

/// In-memory [`ClusterGateway`] with API server semantics for not found, already exists and
/// resourceVersion conflicts.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<FakeState>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pod(self, pod: Pod) -> Self {
        self.put_pod(pod);
        self
    }

    pub fn with_namespace(self, namespace: Namespace) -> Self {
        self.state
            .lock()
            .unwrap()
            .namespaces
            .insert(namespace.name_any(), namespace);
        self
    }

    /// Store a pod as if another client wrote it, bumping its resourceVersion
    pub fn put_pod(&self, pod: Pod) {
        let key = PodRef::from_pod(&pod).unwrap();
        let mut state = self.state.lock().unwrap();
        let pod = state.stamp(pod);
        state.pods.insert(key, pod);
    }

    pub fn set_phase(&self, pod: &PodRef, phase: &str) {
        let mut current = self.pod(pod).unwrap();
        current.status = Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        });
        self.put_pod(current);
    }

    pub fn remove_namespace(&self, name: &str) {
        self.state.lock().unwrap().namespaces.remove(name);
    }

    pub fn pod(&self, pod: &PodRef) -> Option<Pod> {
        self.state.lock().unwrap().pods.get(pod).cloned()
    }

    pub fn pods_in(&self, namespace: &str) -> Vec<Pod> {
        self.state
            .lock()
            .unwrap()
            .pods
            .iter()
            .filter(|(key, _)| key.namespace == namespace)
            .map(|(_, pod)| pod.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls excluding reads
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::GetPod(_) | Call::GetNamespace(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ClusterGateway for FakeCluster {
    async fn get_pod(&self, pod: &PodRef) -> GatewayResult<Pod> {
        self.record(Call::GetPod(pod.clone()));
        self.pod(pod).ok_or_else(|| PolicyHelperError::NotFound {
            kind: "Pod",
            name: pod.to_string(),
        })
    }

    async fn get_namespace(&self, name: &str) -> GatewayResult<Namespace> {
        self.record(Call::GetNamespace(name.to_string()));
        self.state
            .lock()
            .unwrap()
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| PolicyHelperError::NotFound {
                kind: "Namespace",
                name: name.to_string(),
            })
    }

    async fn create_pod(&self, pod: &Pod) -> GatewayResult<Pod> {
        let key = PodRef::from_pod(pod)?;
        self.record(Call::CreatePod(key.clone()));
        let mut state = self.state.lock().unwrap();
        if state.pods.contains_key(&key) {
            return Err(PolicyHelperError::AlreadyExists {
                kind: "Pod",
                name: key.to_string(),
            });
        }
        let created = state.stamp(pod.clone());
        state.pods.insert(key, created.clone());
        Ok(created)
    }

    async fn update_pod(&self, pod: &Pod) -> GatewayResult<Pod> {
        let key = PodRef::from_pod(pod)?;
        self.record(Call::UpdatePod(key.clone()));
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.pods.get(&key) else {
            return Err(PolicyHelperError::NotFound {
                kind: "Pod",
                name: key.to_string(),
            });
        };
        if stored.metadata.resource_version != pod.metadata.resource_version {
            return Err(PolicyHelperError::Conflict {
                kind: "Pod",
                name: key.to_string(),
                message: "the object has been modified".to_string(),
            });
        }
        let updated = state.stamp(pod.clone());
        state.pods.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete_pod(&self, pod: &PodRef) -> GatewayResult<()> {
        self.record(Call::DeletePod(pod.clone()));
        self.state
            .lock()
            .unwrap()
            .pods
            .remove(pod)
            .map(|_| ())
            .ok_or_else(|| PolicyHelperError::NotFound {
                kind: "Pod",
                name: pod.to_string(),
            })
    }
}
