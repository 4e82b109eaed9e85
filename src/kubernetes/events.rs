// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod watch stream and the event-type filter applied before reconciliation.

use futures::{future, Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::{
    runtime::{
        reflector::{self, ObjectRef, Store},
        watcher, WatchStreamExt,
    },
    Api, Client, Resource,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::HashSet;
use std::str::FromStr;

/// Kind of change a watch event represents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Create,
    Update,
    Delete,
    Generic,
}

/// Which event kinds are allowed through to the reconciler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventFilter {
    pub on_create: bool,
    pub on_update: bool,
    pub on_delete: bool,
    pub on_generic: bool,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            on_create: true,
            on_update: true,
            on_delete: true,
            on_generic: true,
        }
    }

    pub const fn updates_only() -> Self {
        Self {
            on_create: false,
            on_update: true,
            on_delete: false,
            on_generic: false,
        }
    }

    pub fn admits(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Create => self.on_create,
            EventKind::Update => self.on_update,
            EventKind::Delete => self.on_delete,
            EventKind::Generic => self.on_generic,
        }
    }

    /// Whether a classified event passes. Relists and init markers (`None`) always pass.
    pub fn admits_kind(&self, kind: Option<EventKind>) -> bool {
        kind.map_or(true, |kind| self.admits(kind))
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::updates_only()
    }
}

/// Parses a comma separated list such as `create,update`
impl FromStr for EventFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut filter = Self {
            on_create: false,
            on_update: false,
            on_delete: false,
            on_generic: false,
        };
        for kind in s.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            match kind {
                "create" => filter.on_create = true,
                "update" => filter.on_update = true,
                "delete" => filter.on_delete = true,
                "generic" => filter.on_generic = true,
                "all" => filter = Self::all(),
                other => anyhow::bail!("unknown event kind '{}'", other),
            }
        }
        Ok(filter)
    }
}

/// Tells live additions apart from updates by remembering which objects the watch has seen.
///
/// A kube watcher reports both as `Apply`. Objects listed during (re)initialisation are
/// returned as `None`: a relist follows a restart or a desync, so it may carry changes the
/// watch missed and is never filtered.
pub struct EventClassifier<K: Resource<DynamicType = ()>> {
    seen: HashSet<ObjectRef<K>>,
}

impl<K: Resource<DynamicType = ()>> Default for EventClassifier<K> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }
}

impl<K: Resource<DynamicType = ()>> EventClassifier<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, event: &watcher::Event<K>) -> Option<EventKind> {
        match event {
            watcher::Event::Init => {
                self.seen.clear();
                None
            }
            watcher::Event::InitApply(obj) => {
                self.seen.insert(ObjectRef::from_obj(obj));
                None
            }
            watcher::Event::InitDone => None,
            watcher::Event::Apply(obj) => {
                if self.seen.insert(ObjectRef::from_obj(obj)) {
                    Some(EventKind::Create)
                } else {
                    Some(EventKind::Update)
                }
            }
            watcher::Event::Delete(obj) => {
                self.seen.remove(&ObjectRef::from_obj(obj));
                Some(EventKind::Delete)
            }
        }
    }
}

/// Watch all pods, keeping `Store` complete while only yielding objects whose events pass `filter`.
pub fn pod_triggers(
    client: Client,
    filter: EventFilter,
) -> (
    Store<Pod>,
    impl Stream<Item = Result<Pod, watcher::Error>> + Send + 'static,
) {
    let pods: Api<Pod> = Api::all(client);
    let (reader, writer) = reflector::store();

    let mut classifier = EventClassifier::new();

    let triggers = watcher(pods, WatcherConfig::default())
        .default_backoff()
        .reflect(writer)
        .filter(move |event| {
            future::ready(match event {
                Ok(event) => filter.admits_kind(classifier.classify(event)),
                Err(_) => true,
            })
        })
        .touched_objects();

    (reader, triggers)
}
