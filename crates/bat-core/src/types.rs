//! Records parsed out of ciao-cli list output.
//!
//! Everything here is a transient snapshot of cluster state. Identity lives
//! in the cluster's own UUIDs; records are discarded after the assertion
//! that wanted them.

use serde::{Deserialize, Serialize};

/// Instance status value that marks a launch as complete.
pub const INSTANCE_ACTIVE: &str = "active";

/// A workload template describing an instance's image and resource shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    pub uuid: String,
    pub image_uuid: String,
    /// CPU count, kept as the raw string the CLI printed.
    pub cpus: String,
    /// Memory size, kept as the raw string the CLI printed.
    pub mem: String,
}

/// An isolated ownership scope within the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub uuid: String,
    pub name: String,
}

/// A created instance as reported by `instance list -detail`.
///
/// Status is free-form text; the harness only ever compares it against
/// [`INSTANCE_ACTIVE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub uuid: String,
    pub status: String,
    pub ip: String,
    pub mac: String,
    pub node_uuid: String,
    pub image_uuid: String,
    pub tenant_uuid: String,
}

impl Instance {
    pub fn is_active(&self) -> bool {
        self.status == INSTANCE_ACTIVE
    }
}

/// A per-tenant network concierge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cnci {
    pub uuid: String,
    pub tenant_uuid: String,
    pub ip: String,
}

/// Node counts from `node status`, kept as the raw tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub total: String,
    pub ready: String,
}

impl NodeStatus {
    /// The cluster is ready when every node is. The comparison is over the
    /// raw tokens, so `"05"` and `"5"` do not count as equal.
    pub fn is_ready(&self) -> bool {
        self.total == self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::{Instance, NodeStatus};

    fn mk_instance(status: &str) -> Instance {
        Instance {
            uuid: "inst-1".to_string(),
            status: status.to_string(),
            ip: "172.16.0.2".to_string(),
            mac: "02".to_string(),
            node_uuid: "node-1".to_string(),
            image_uuid: "img-1".to_string(),
            tenant_uuid: "ten-1".to_string(),
        }
    }

    #[test]
    fn instance_is_active_only_for_active_status() {
        assert!(mk_instance("active").is_active());
        assert!(!mk_instance("pending").is_active());
        assert!(!mk_instance("exited").is_active());
        assert!(!mk_instance("Active").is_active());
    }

    #[test]
    fn node_status_ready_when_tokens_match() {
        let status = NodeStatus {
            total: "5".to_string(),
            ready: "5".to_string(),
        };
        assert!(status.is_ready());
    }

    #[test]
    fn node_status_not_ready_when_counts_differ() {
        let status = NodeStatus {
            total: "5".to_string(),
            ready: "4".to_string(),
        };
        assert!(!status.is_ready());
    }

    #[test]
    fn node_status_compares_tokens_not_numbers() {
        let status = NodeStatus {
            total: "05".to_string(),
            ready: "5".to_string(),
        };
        assert!(!status.is_ready());
    }
}
