//! Per-service authentication policy.
//!
//! Resolved when the server is assembled: each RPC service name maps to a
//! policy, and the auth layer consults the table once per inbound call.

use std::collections::HashMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ServicePolicy {
    /// Run the full authentication chain.
    #[default]
    RequiresAuth,
    /// Skip authentication; the request passes through unchanged.
    Public,
}

#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    services: HashMap<String, ServicePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, service: impl Into<String>, policy: ServicePolicy) -> Self {
        self.services.insert(service.into(), policy);
        self
    }

    pub fn public(self, service: impl Into<String>) -> Self {
        self.with(service, ServicePolicy::Public)
    }

    pub fn requires_auth(self, service: impl Into<String>) -> Self {
        self.with(service, ServicePolicy::RequiresAuth)
    }

    /// Unknown services require authentication.
    pub fn policy_for(&self, service: &str) -> ServicePolicy {
        self.services.get(service).copied().unwrap_or_default()
    }

    /// Resolve the policy for a gRPC request path (`/<service>/<method>`).
    pub fn policy_for_path(&self, path: &str) -> ServicePolicy {
        match split_rpc_path(path) {
            Some((service, _)) => self.policy_for(service),
            None => ServicePolicy::RequiresAuth,
        }
    }
}

/// Split `/<service>/<method>` into its parts.
pub fn split_rpc_path(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix('/')?;
    let (service, method) = rest.split_once('/')?;
    if service.is_empty() || method.is_empty() || method.contains('/') {
        return None;
    }
    Some((service, method))
}
