// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by the policy helper
pub mod annotations {
    /// Opts a pod (or every pod in an annotated namespace) into policy generation
    pub const GENERATE_POLICY: &str = "generate-selinux-policy";
    /// Set on a target pod once its companion exists; holds `namespace/name` of the companion
    pub const POLICY: &str = "selinux-policy";
    /// Type tag on companion pods, always empty
    pub const OWNED_BY: &str = "owned-by-selinux-policy-helper";
}

/// The operator name used as field manager on writes
pub const OPERATOR_NAME: &str = "selinux-policy-helper";

/// Companion pod defaults
pub mod companion {
    /// Prefix for hashed companion names
    pub const HASHED_NAME_PREFIX: &str = "selinux-k8s-";
    /// Prefix for concatenated companion names
    pub const CONCAT_NAME_PREFIX: &str = "selinux-k8s-for-";
    pub const CONTAINER_NAME: &str = "selinux-k8s";
    pub const COMMAND: &str = "selinuxk8s";
    pub const DEFAULT_IMAGE: &str = "quay.io/jaosorior/selinux-k8s:latest";
    pub const DEFAULT_SERVICE_ACCOUNT: &str = "selinux-policy-helper-operator";
    pub const DEFAULT_NAMESPACE: &str = "selinux-policy-helper-operator";
    pub const RESTART_POLICY: &str = "Never";
    /// Longest name the API server accepts for a pod (DNS subdomain)
    pub const MAX_NAME_LEN: usize = 253;
}

/// Host paths mounted into every companion pod
pub mod host_paths {
    /// `(volume name, host path, hostPath type)`, mounted at the same path in the container
    pub const MOUNTS: [(&str, &str, &str); 5] = [
        ("fsselinux", "/sys/fs/selinux", "Directory"),
        ("etcselinux", "/etc/selinux", "Directory"),
        ("varlibselinux", "/var/lib/selinux", "Directory"),
        ("varruncrio", "/var/run/crio", "Directory"),
        ("crictlyaml", "/etc/crictl.yaml", "File"),
    ];
}

/// Requeue configuration
pub mod requeue {
    /// Delay before the annotate pass once a companion was created
    pub const ANNOTATE_SECS: u64 = 5;
    /// Delay before retrying after a retryable error
    pub const ERROR_SECS: u64 = 60;
}
