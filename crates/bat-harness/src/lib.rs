//! BAT harness crate: polling primitives, acceptance scenarios, the fixed
//! suite, and its TAP/JSONL reporting.

pub mod poll;
pub mod report;
pub mod run_log;
pub mod scenario;
pub mod suite;

pub use poll::*;
pub use report::*;
pub use run_log::*;
pub use scenario::*;
pub use suite::*;

#[cfg(test)]
mod tests {
    use super::{JsonlRunLog, ScenarioOutcome, ScenarioRunner, SuiteResult, CASES};
    use std::any::TypeId;

    #[test]
    fn crate_root_reexports_harness_types() {
        let _ = TypeId::of::<ScenarioOutcome>();
        let _ = TypeId::of::<ScenarioRunner>();
        let _ = TypeId::of::<SuiteResult>();
        let _ = TypeId::of::<JsonlRunLog>();
        assert_eq!(CASES.len(), 7);
    }
}
