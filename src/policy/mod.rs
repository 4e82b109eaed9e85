// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pure decision logic: admission, companion naming and companion manifests.

pub mod admission;
pub mod companion;
pub mod identity;

pub use admission::{classify, Classification, OptInScope, SkipReason};
pub use companion::build_companion_pod;
pub use identity::{companion_name, companion_ref, NamingScheme};
