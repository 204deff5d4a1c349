//! Scenario operations composing the client, parsers, and polling.
//!
//! Every client failure collapses into a boolean outcome here. The captured
//! diagnostic text rides along for the report and the run log; it is never
//! re-parsed.

use bat_client::{CiaoClient, ClientError};
use bat_core::HarnessConfig;
use rand::Rng;

use crate::poll::poll_until;

/// Acknowledgment prefix printed by `instance delete -all`. The success
/// check is a literal prefix comparison on stdout.
pub const DELETE_ACK_MARKER: &str = "os-delete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub ok: bool,
    pub diagnostics: Vec<String>,
}

impl ScenarioOutcome {
    pub fn pass() -> Self {
        Self {
            ok: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            ok: false,
            diagnostics: vec![diagnostic.into()],
        }
    }

    /// Fold a client error into a failed outcome, keeping any captured
    /// command output as diagnostic text.
    pub fn from_error(context: &str, err: &ClientError) -> Self {
        let mut diagnostics = vec![format!("{context}: {err}")];
        if let ClientError::CommandFailed { stdout, stderr, .. } = err {
            if !stdout.trim().is_empty() {
                diagnostics.push(format!("stdout: {}", stdout.trim_end()));
            }
            if !stderr.trim().is_empty() {
                diagnostics.push(format!("stderr: {}", stderr.trim_end()));
            }
        }
        Self {
            ok: false,
            diagnostics,
        }
    }
}

/// Drives the acceptance scenarios against one cluster, through a user
/// client for tenant-scoped operations and an admin client for
/// cluster-scoped ones.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    pub user: CiaoClient,
    pub admin: CiaoClient,
    pub config: HarnessConfig,
}

impl ScenarioRunner {
    pub fn new(user: CiaoClient, admin: CiaoClient, config: HarnessConfig) -> Self {
        Self {
            user,
            admin,
            config,
        }
    }

    pub fn tenants_listed(&self) -> ScenarioOutcome {
        match self.admin.tenants() {
            Ok(tenants) if tenants.is_empty() => ScenarioOutcome::fail("tenant listing is empty"),
            Ok(_) => ScenarioOutcome::pass(),
            Err(err) => ScenarioOutcome::from_error("tenant list", &err),
        }
    }

    pub fn cluster_ready(&self) -> ScenarioOutcome {
        match self.admin.node_status() {
            Ok(status) if status.is_ready() => ScenarioOutcome::pass(),
            Ok(status) => ScenarioOutcome::fail(format!(
                "cluster not ready: {} of {} nodes ready",
                status.ready, status.total
            )),
            Err(err) => ScenarioOutcome::from_error("node status", &err),
        }
    }

    pub fn workloads_listed(&self) -> ScenarioOutcome {
        match self.user.workloads() {
            Ok(workloads) if workloads.is_empty() => {
                ScenarioOutcome::fail("workload listing is empty")
            }
            Ok(_) => ScenarioOutcome::pass(),
            Err(err) => ScenarioOutcome::from_error("workload list", &err),
        }
    }

    pub fn cncis_listed(&self) -> ScenarioOutcome {
        match self.admin.cncis() {
            Ok(cncis) if cncis.is_empty() => ScenarioOutcome::fail("no CNCI present"),
            Ok(_) => ScenarioOutcome::pass(),
            Err(err) => ScenarioOutcome::from_error("cnci list", &err),
        }
    }

    pub fn instance_count_is(&self, expected: usize) -> ScenarioOutcome {
        match self.user.instances() {
            Ok(instances) if instances.len() == expected => ScenarioOutcome::pass(),
            Ok(instances) => ScenarioOutcome::fail(format!(
                "expected {expected} instances, found {}",
                instances.len()
            )),
            Err(err) => ScenarioOutcome::from_error("instance list", &err),
        }
    }

    /// Create `count` instances of a workload and poll each created UUID to
    /// active.
    pub fn launch_workload(&self, workload_uuid: &str, count: u32) -> ScenarioOutcome {
        let created = match self.user.launch_instances(workload_uuid, count) {
            Ok(created) => created,
            Err(err) => return ScenarioOutcome::from_error("instance add", &err),
        };
        self.wait_for_instances(&created)
    }

    /// Poll each instance to active in turn, failing fast on the first one
    /// that misses its budget. Later instances are not waited for.
    pub fn wait_for_instances(&self, uuids: &[String]) -> ScenarioOutcome {
        for uuid in uuids {
            let active = poll_until(
                self.config.poll_interval(),
                self.config.cluster_poll_attempts,
                || self.instance_is_active(uuid),
            );
            if !active {
                return ScenarioOutcome::fail(format!(
                    "instance {uuid} did not reach active within {} attempts",
                    self.config.cluster_poll_attempts
                ));
            }
        }
        ScenarioOutcome::pass()
    }

    /// Launch one instance of every workload, in listing order, aborting on
    /// the first failure. An empty workload listing is itself a failure.
    pub fn launch_all_workloads(&self, count_per_workload: u32) -> ScenarioOutcome {
        let workloads = match self.user.workloads() {
            Ok(workloads) => workloads,
            Err(err) => return ScenarioOutcome::from_error("workload list", &err),
        };
        if workloads.is_empty() {
            return ScenarioOutcome::fail("no workloads defined");
        }

        for workload in &workloads {
            let outcome = self.launch_workload(&workload.uuid, count_per_workload);
            if !outcome.ok {
                return outcome;
            }
        }
        ScenarioOutcome::pass()
    }

    /// Launch instances of one workload picked uniformly at random.
    pub fn launch_random_workload(&self, count: u32) -> ScenarioOutcome {
        let workloads = match self.user.workloads() {
            Ok(workloads) => workloads,
            Err(err) => return ScenarioOutcome::from_error("workload list", &err),
        };
        if workloads.is_empty() {
            return ScenarioOutcome::fail("no workloads defined");
        }

        let index = rand::thread_rng().gen_range(0..workloads.len());
        self.launch_workload(&workloads[index].uuid, count)
    }

    /// Delete every instance, require the acknowledgment marker, then poll
    /// until the instance listing is observed empty.
    pub fn delete_all_instances(&self) -> ScenarioOutcome {
        let output = match self.user.delete_all_instances() {
            Ok(output) => output,
            Err(err) => return ScenarioOutcome::from_error("instance delete", &err),
        };

        if !output.stdout.starts_with(DELETE_ACK_MARKER) {
            let first_line = output.stdout.lines().next().unwrap_or_default();
            return ScenarioOutcome::fail(format!(
                "delete acknowledgment missing, output began: {first_line:?}"
            ));
        }

        let emptied = poll_until(
            self.config.poll_interval(),
            self.config.cluster_poll_attempts,
            || {
                self.user
                    .instances()
                    .map(|instances| instances.is_empty())
                    .unwrap_or(false)
            },
        );
        if emptied {
            ScenarioOutcome::pass()
        } else {
            ScenarioOutcome::fail(format!(
                "instances still listed after {} attempts",
                self.config.cluster_poll_attempts
            ))
        }
    }

    fn instance_is_active(&self, uuid: &str) -> bool {
        match self.user.instance(uuid) {
            Ok(Some(instance)) => instance.is_active(),
            // Listing errors are treated as "not yet" and retried; only the
            // attempt budget ends the wait.
            Ok(None) | Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use bat_client::{CiaoCli, CiaoClient, ClientError};
    use bat_core::{Credentials, HarnessConfig};

    use super::{ScenarioOutcome, ScenarioRunner};

    // Stateful stub: records instance-add invocations in a counter file and
    // fails the add for workload wl-2, so fail-fast behavior is observable.
    const FAIL_SECOND_STUB: &str = r#"#!/bin/sh
case "$1 $2" in
"workload list")
    for id in wl-1 wl-2 wl-3; do
        printf 'Workload\n'
        printf '    Name: %s\n' "$id"
        printf '    UUID: %s\n' "$id"
        printf '    Image UUID: img-1\n'
        printf '    CPUs: 2\n'
        printf '    Mem: 512 MB\n'
    done
    ;;
"instance add")
    echo "$4" >> "$BAT_STUB_STATE/adds"
    if [ "$4" = "wl-2" ]; then
        echo "no quota left" >&2
        exit 1
    fi
    printf 'Created new (pending) instance: inst-%s\n' "$4"
    ;;
"instance list")
    if [ -s "$BAT_STUB_STATE/adds" ]; then
        last=$(tail -n 1 "$BAT_STUB_STATE/adds")
        printf 'Instance\n'
        printf '    UUID: inst-%s\n' "$last"
        printf '    Status: active\n'
        printf '    Private IP: 172.16.0.2\n'
        printf '    MAC Address: 02:00:ac:10:00:02\n'
        printf '    CN UUID: node-1\n'
        printf '    Image UUID: img-1\n'
        printf '    Tenant UUID: ten-1\n'
    fi
    ;;
esac
exit 0
"#;

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("bat-scenario-{prefix}-{now}"));
        fs::create_dir_all(&path).expect("create temp dir");
        path
    }

    fn write_stub(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("ciao-cli");
        fs::write(&path, script).expect("write stub");
        let mut perms = fs::metadata(&path).expect("stub metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod stub");
        path
    }

    fn mk_runner(dir: &Path, script: &str) -> ScenarioRunner {
        let stub = write_stub(dir, script);
        let base = BTreeMap::from([
            (
                "PATH".to_string(),
                std::env::var("PATH").unwrap_or_default(),
            ),
            (
                "BAT_STUB_STATE".to_string(),
                dir.to_string_lossy().into_owned(),
            ),
        ]);
        let credentials = Credentials::user(&base);
        let config = HarnessConfig {
            cluster_poll_attempts: 3,
            poll_interval_secs: 0,
            launch_settle_secs: 0,
            teardown_settle_secs: 0,
            ..HarnessConfig::default()
        };
        let timeout = Duration::from_secs(5);
        ScenarioRunner::new(
            CiaoClient::new(CiaoCli::new(stub.clone()), credentials.clone(), timeout),
            CiaoClient::new(CiaoCli::new(stub), credentials, timeout),
            config,
        )
    }

    #[test]
    fn launch_all_workloads_fails_fast_on_the_second_workload() {
        let dir = unique_temp_dir("fail-fast");
        let runner = mk_runner(&dir, FAIL_SECOND_STUB);

        let outcome = runner.launch_all_workloads(1);
        assert!(!outcome.ok);

        // wl-1 and wl-2 were attempted; wl-3 never was.
        let adds = fs::read_to_string(dir.join("adds")).expect("adds recorded");
        let attempted: Vec<&str> = adds.lines().collect();
        assert_eq!(attempted, vec!["wl-1", "wl-2"]);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn failed_add_keeps_stderr_as_diagnostics() {
        let dir = unique_temp_dir("diagnostics");
        let runner = mk_runner(&dir, FAIL_SECOND_STUB);

        let outcome = runner.launch_workload("wl-2", 1);
        assert!(!outcome.ok);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|line| line.contains("no quota left")));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn launch_workload_waits_for_active_instances() {
        let dir = unique_temp_dir("active");
        let runner = mk_runner(&dir, FAIL_SECOND_STUB);

        let outcome = runner.launch_workload("wl-1", 1);
        assert!(outcome.ok, "diagnostics: {:?}", outcome.diagnostics);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_workload_listing_fails_both_launch_scenarios() {
        let dir = unique_temp_dir("empty");
        let runner = mk_runner(&dir, "#!/bin/sh\nexit 0\n");

        let all = runner.launch_all_workloads(1);
        assert!(!all.ok);
        assert!(all.diagnostics[0].contains("no workloads defined"));

        let random = runner.launch_random_workload(1);
        assert!(!random.ok);
        assert!(random.diagnostics[0].contains("no workloads defined"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn delete_all_requires_the_acknowledgment_marker() {
        let dir = unique_temp_dir("no-ack");
        let runner = mk_runner(&dir, "#!/bin/sh\nprintf 'deleted everything\\n'\nexit 0\n");

        let outcome = runner.delete_all_instances();
        assert!(!outcome.ok);
        assert!(outcome.diagnostics[0].contains("delete acknowledgment missing"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn delete_all_polls_until_the_listing_is_empty() {
        let dir = unique_temp_dir("ack");
        // delete prints the marker; the instance listing is always empty.
        let stub = r#"#!/bin/sh
case "$1 $2" in
"instance delete") printf 'os-delete instances requested\n' ;;
esac
exit 0
"#;
        let runner = mk_runner(&dir, stub);

        let outcome = runner.delete_all_instances();
        assert!(outcome.ok, "diagnostics: {:?}", outcome.diagnostics);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn instance_that_never_activates_exhausts_the_budget() {
        let dir = unique_temp_dir("never-active");
        // instance add succeeds but the listing never shows the instance.
        let stub = r#"#!/bin/sh
case "$1 $2" in
"instance add") printf 'Created new (pending) instance: inst-1\n' ;;
esac
exit 0
"#;
        let runner = mk_runner(&dir, stub);

        let outcome = runner.launch_workload("wl-1", 1);
        assert!(!outcome.ok);
        assert!(outcome.diagnostics[0].contains("did not reach active within 3 attempts"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn cluster_ready_reports_the_node_counts_on_failure() {
        let dir = unique_temp_dir("not-ready");
        let stub = r#"#!/bin/sh
case "$1 $2" in
"node status")
    printf 'Total Nodes 5\n'
    printf '    Ready 4\n'
    ;;
esac
exit 0
"#;
        let runner = mk_runner(&dir, stub);

        let outcome = runner.cluster_ready();
        assert!(!outcome.ok);
        assert!(outcome.diagnostics[0].contains("4 of 5 nodes ready"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn from_error_attaches_captured_output() {
        let err = ClientError::CommandFailed {
            command: "ciao-cli instance add".to_string(),
            status: Some(1),
            stdout: "partial create".to_string(),
            stderr: "quota exceeded".to_string(),
        };

        let outcome = ScenarioOutcome::from_error("instance add", &err);
        assert!(!outcome.ok);
        assert_eq!(outcome.diagnostics.len(), 3);
        assert!(outcome.diagnostics[1].contains("partial create"));
        assert!(outcome.diagnostics[2].contains("quota exceeded"));
    }
}
