// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyHelperError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("Conflict writing {kind} {name}: {message}")]
    Conflict {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PolicyHelperError {
    /// Classify an API error for the resource `kind`/`name` into the error taxonomy.
    pub fn from_api(err: kube::Error, kind: &'static str, name: impl Into<String>) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 404 => Self::NotFound {
                kind,
                name: name.into(),
            },
            kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
                Self::AlreadyExists {
                    kind,
                    name: name.into(),
                }
            }
            kube::Error::Api(resp) if resp.code == 409 => Self::Conflict {
                kind,
                name: name.into(),
                message: resp.message,
            },
            other => Self::KubeError(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Whether the trigger layer should requeue the reconciliation after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::KubeError(_))
    }
}

pub type Result<T> = std::result::Result<T, PolicyHelperError>;
