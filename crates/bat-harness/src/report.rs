//! TAP output for a suite run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::suite::SuiteResult;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the suite as a TAP document: the plan first, then one result line
/// per case in order. Diagnostics of failed cases become comment lines.
pub fn render_tap(suite: &SuiteResult) -> String {
    let mut out = format!("1..{}\n", suite.cases.len());
    for (index, case) in suite.cases.iter().enumerate() {
        let number = index + 1;
        if case.passed {
            out.push_str(&format!("ok {number} - {}\n", case.name));
        } else {
            out.push_str(&format!("not ok {number} - {}\n", case.name));
            out.push_str(&format!("# {}\n", case.description));
            for line in &case.diagnostics {
                out.push_str(&format!("# {line}\n"));
            }
        }
    }
    out
}

pub fn write_report(path: &Path, suite: &SuiteResult) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, render_tap(suite)).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{render_tap, write_report};
    use crate::suite::{CaseResult, SuiteResult};

    fn mk_suite() -> SuiteResult {
        SuiteResult {
            cases: vec![
                CaseResult {
                    name: "get_tenants".to_string(),
                    description: "all tenants are listed".to_string(),
                    passed: true,
                    diagnostics: Vec::new(),
                    duration_secs: 0.4,
                },
                CaseResult {
                    name: "cluster_status".to_string(),
                    description: "every node reports ready".to_string(),
                    passed: false,
                    diagnostics: vec!["cluster not ready: 4 of 5 nodes ready".to_string()],
                    duration_secs: 0.2,
                },
            ],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn plan_line_comes_first() {
        let tap = render_tap(&mk_suite());
        assert!(tap.starts_with("1..2\n"));
    }

    #[test]
    fn cases_are_numbered_in_order() {
        let tap = render_tap(&mk_suite());
        let lines: Vec<&str> = tap.lines().collect();

        assert_eq!(lines[1], "ok 1 - get_tenants");
        assert_eq!(lines[2], "not ok 2 - cluster_status");
    }

    #[test]
    fn failed_cases_carry_diagnostics_as_comments() {
        let tap = render_tap(&mk_suite());

        assert!(tap.contains("# every node reports ready"));
        assert!(tap.contains("# cluster not ready: 4 of 5 nodes ready"));
        // Passing cases add no comment lines.
        assert!(!tap.contains("# all tenants are listed"));
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/report.tap");

        write_report(&path, &mk_suite()).expect("write report");

        let body = std::fs::read_to_string(&path).expect("read report");
        assert_eq!(body, render_tap(&mk_suite()));
    }
}
