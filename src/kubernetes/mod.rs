// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes plumbing: API access and the pod watch stream.

pub mod events;
pub mod gateway;

pub use events::{pod_triggers, EventFilter, EventKind};
pub use gateway::{ClusterGateway, KubeGateway};
