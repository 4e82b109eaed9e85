// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod identity and phase helpers shared by the policy logic and reconcilers.

pub mod pod;

pub use pod::{PodExt, PodPhase, PodRef};
