//! Suite lifecycle events, written to the JSONL run log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    SuiteStarted {
        cases: usize,
        cli_binary: String,
    },
    CaseStarted {
        name: String,
    },
    CaseFinished {
        name: String,
        passed: bool,
        diagnostics: Vec<String>,
    },
    TeardownFinished {
        name: String,
        clean: bool,
    },
    SuiteFinished {
        passed: usize,
        failed: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEvent {
    pub at: DateTime<Utc>,
    pub kind: RunEventKind,
}

impl RunEvent {
    pub fn now(kind: RunEventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }
}
