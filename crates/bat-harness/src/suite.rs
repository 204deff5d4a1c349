//! The fixed acceptance case list and the runner that drives it.
//!
//! Cases run in a fixed order but stand alone: each asserts one scenario
//! outcome against the shared cluster, and cleanup runs after every case
//! whether it passed or not.

use std::thread;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bat_core::{RunEvent, RunEventKind};

use crate::run_log::JsonlRunLog;
use crate::scenario::{ScenarioOutcome, ScenarioRunner};

#[derive(Debug, Clone, Copy)]
pub struct CaseSpec {
    pub name: &'static str,
    pub description: &'static str,
    run: fn(&ScenarioRunner) -> ScenarioOutcome,
}

/// The acceptance cases, in report order.
pub const CASES: [CaseSpec; 7] = [
    CaseSpec {
        name: "get_tenants",
        description: "all tenants are listed",
        run: case_get_tenants,
    },
    CaseSpec {
        name: "cluster_status",
        description: "every node reports ready",
        run: case_cluster_status,
    },
    CaseSpec {
        name: "get_workloads",
        description: "workload templates are listed",
        run: case_get_workloads,
    },
    CaseSpec {
        name: "start_all_workloads",
        description: "one instance of every workload reaches active",
        run: case_start_all_workloads,
    },
    CaseSpec {
        name: "get_cncis",
        description: "a CNCI is discoverable after a launch",
        run: case_get_cncis,
    },
    CaseSpec {
        name: "get_instances",
        description: "a single launch is listed exactly once",
        run: case_get_instances,
    },
    CaseSpec {
        name: "delete_all_instances",
        description: "no instances remain after delete-all",
        run: case_delete_all_instances,
    },
];

fn case_get_tenants(runner: &ScenarioRunner) -> ScenarioOutcome {
    runner.tenants_listed()
}

fn case_cluster_status(runner: &ScenarioRunner) -> ScenarioOutcome {
    runner.cluster_ready()
}

fn case_get_workloads(runner: &ScenarioRunner) -> ScenarioOutcome {
    runner.workloads_listed()
}

fn case_start_all_workloads(runner: &ScenarioRunner) -> ScenarioOutcome {
    runner.launch_all_workloads(1)
}

fn case_get_cncis(runner: &ScenarioRunner) -> ScenarioOutcome {
    let launched = runner.launch_random_workload(1);
    if !launched.ok {
        return launched;
    }
    runner.cncis_listed()
}

fn case_get_instances(runner: &ScenarioRunner) -> ScenarioOutcome {
    let launched = runner.launch_random_workload(1);
    if !launched.ok {
        return launched;
    }
    thread::sleep(runner.config.launch_settle());
    runner.instance_count_is(1)
}

fn case_delete_all_instances(runner: &ScenarioRunner) -> ScenarioOutcome {
    let launched = runner.launch_random_workload(1);
    if !launched.ok {
        return launched;
    }
    let deleted = runner.delete_all_instances();
    if !deleted.ok {
        return deleted;
    }
    runner.instance_count_is(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub description: String,
    pub passed: bool,
    pub diagnostics: Vec<String>,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub cases: Vec<CaseResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SuiteResult {
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|case| case.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|case| case.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|case| !case.passed).count()
    }
}

/// Run every case in order, with unconditional cleanup and a settle wait
/// between cases.
pub fn run_suite(runner: &ScenarioRunner, log: &JsonlRunLog) -> SuiteResult {
    let started_at = Utc::now();
    log_event(
        log,
        RunEventKind::SuiteStarted {
            cases: CASES.len(),
            cli_binary: runner.user.cli.binary.display().to_string(),
        },
    );

    let mut cases = Vec::with_capacity(CASES.len());
    for case in &CASES {
        eprintln!("[bat] running {}", case.name);
        log_event(
            log,
            RunEventKind::CaseStarted {
                name: case.name.to_string(),
            },
        );

        let start = Instant::now();
        let outcome = (case.run)(runner);
        let duration_secs = start.elapsed().as_secs_f64();

        if outcome.ok {
            eprintln!("[bat] {} passed", case.name);
        } else {
            eprintln!("[bat] {} FAILED", case.name);
            for line in &outcome.diagnostics {
                eprintln!("[bat]   {line}");
            }
        }
        log_event(
            log,
            RunEventKind::CaseFinished {
                name: case.name.to_string(),
                passed: outcome.ok,
                diagnostics: outcome.diagnostics.clone(),
            },
        );

        // Cleanup runs whether the case passed or not.
        let cleanup = runner.delete_all_instances();
        if !cleanup.ok {
            eprintln!("[bat] cleanup after {} left instances behind", case.name);
        }
        log_event(
            log,
            RunEventKind::TeardownFinished {
                name: case.name.to_string(),
                clean: cleanup.ok,
            },
        );
        thread::sleep(runner.config.teardown_settle());

        cases.push(CaseResult {
            name: case.name.to_string(),
            description: case.description.to_string(),
            passed: outcome.ok,
            diagnostics: outcome.diagnostics,
            duration_secs,
        });
    }

    let result = SuiteResult {
        cases,
        started_at,
        finished_at: Utc::now(),
    };
    log_event(
        log,
        RunEventKind::SuiteFinished {
            passed: result.passed_count(),
            failed: result.failed_count(),
        },
    );
    eprintln!(
        "[bat] suite finished: {} passed, {} failed",
        result.passed_count(),
        result.failed_count()
    );
    result
}

fn log_event(log: &JsonlRunLog, kind: RunEventKind) {
    // The run log is best-effort; a broken log never fails the suite.
    if let Err(err) = log.append(&RunEvent::now(kind)) {
        eprintln!("[bat] run log write failed: {err}");
    }
}
