use std::collections::BTreeMap;
use std::time::Duration;

use bat_core::{Cnci, Credentials, Instance, NodeStatus, Tenant, Workload};

use crate::command::{CiaoCli, CliOutput};
use crate::error::ClientError;
use crate::parse::{
    parse_cncis, parse_created_uuids, parse_instances, parse_node_status, parse_tenants,
    parse_workloads,
};

/// Typed facade over the ciao-cli surface the harness exercises.
///
/// One client holds one credential role; callers build a user client and an
/// admin client and pick per operation. Each method issues a fixed argument
/// vector and hands the captured stdout to the matching parser, so the text
/// format stays isolated here and in [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiaoClient {
    pub cli: CiaoCli,
    credentials: Credentials,
    timeout: Duration,
}

impl CiaoClient {
    pub fn new(cli: CiaoCli, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            cli,
            credentials,
            timeout,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn run(&self, args: &[&str]) -> Result<CliOutput, ClientError> {
        self.cli.run(&self.credentials, self.timeout, args)
    }

    pub fn workloads(&self) -> Result<Vec<Workload>, ClientError> {
        let output = self.run(&["workload", "list"])?;
        Ok(parse_workloads(&output.stdout_lines())?)
    }

    pub fn tenants(&self) -> Result<Vec<Tenant>, ClientError> {
        let output = self.run(&["tenant", "list", "-all"])?;
        Ok(parse_tenants(&output.stdout_lines())?)
    }

    pub fn instances(&self) -> Result<Vec<Instance>, ClientError> {
        let output = self.run(&["instance", "list", "-detail"])?;
        Ok(parse_instances(&output.stdout_lines())?)
    }

    /// A single instance, looked up in the full listing. Every call
    /// re-fetches; instance records are never cached.
    pub fn instance(&self, uuid: &str) -> Result<Option<Instance>, ClientError> {
        Ok(self
            .instances()?
            .into_iter()
            .find(|instance| instance.uuid == uuid))
    }

    pub fn instance_statuses(&self) -> Result<BTreeMap<String, String>, ClientError> {
        Ok(self
            .instances()?
            .into_iter()
            .map(|instance| (instance.uuid, instance.status))
            .collect())
    }

    pub fn cncis(&self) -> Result<Vec<Cnci>, ClientError> {
        let output = self.run(&["node", "list", "-cnci"])?;
        Ok(parse_cncis(&output.stdout_lines())?)
    }

    pub fn node_status(&self) -> Result<NodeStatus, ClientError> {
        let output = self.run(&["node", "status"])?;
        Ok(parse_node_status(&output.stdout_lines())?)
    }

    /// Create `count` instances of a workload; returns the UUIDs the CLI
    /// reported as created.
    pub fn launch_instances(
        &self,
        workload_uuid: &str,
        count: u32,
    ) -> Result<Vec<String>, ClientError> {
        let count_arg = count.to_string();
        let output = self.run(&[
            "instance",
            "add",
            "-workload",
            workload_uuid,
            "-instances",
            &count_arg,
        ])?;
        Ok(parse_created_uuids(&output.stdout_lines())?)
    }

    pub fn delete_instance(&self, uuid: &str) -> Result<(), ClientError> {
        self.run(&["instance", "delete", "-instance", uuid])?;
        Ok(())
    }

    /// Delete every instance of the tenant. The raw output is returned so
    /// the caller can apply the acknowledgment-marker check.
    pub fn delete_all_instances(&self) -> Result<CliOutput, ClientError> {
        self.run(&["instance", "delete", "-all"])
    }
}
