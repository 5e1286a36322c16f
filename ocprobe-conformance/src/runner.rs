//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Hierarchical test runner.
//!
//! Every test runs a closure that receives a handle to its own `Test`. The
//! closure can record non-fatal errors and keep going, return
//! `Failure::Fatal` to end the test right away, or return `Failure::Skip`.
//! A failed test marks all of its ancestors as failed, but never prevents its
//! siblings from running.

use std::time::{Duration, Instant};

use tracing::{error, info, info_span, warn};

// Reason a test ended early.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Failure {
    Fatal(String),
    Skip(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

// Result of a single test.
#[derive(Clone, Debug)]
pub struct TestResult {
    // Names of the test and of all its ancestors, outermost first.
    pub path: Vec<String>,
    pub outcome: Outcome,
    pub messages: Vec<String>,
    pub duration: Duration,
}

// Results of every test, in the order they started.
#[derive(Clone, Debug, Default)]
pub struct Report {
    pub results: Vec<TestResult>,
}

// Handle to the running test.
#[derive(Debug)]
pub struct Test<'a> {
    path: Vec<String>,
    report: &'a mut Report,
    messages: Vec<String>,
    failed: bool,
}

#[derive(Debug, Default)]
pub struct Runner {
    report: Report,
}

// ===== impl Failure =====

impl Failure {
    pub fn fatal(msg: impl Into<String>) -> Failure {
        Failure::Fatal(msg.into())
    }

    pub fn skip(msg: impl Into<String>) -> Failure {
        Failure::Skip(msg.into())
    }
}

// ===== impl Outcome =====

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Passed => write!(f, "PASS"),
            Outcome::Failed => write!(f, "FAIL"),
            Outcome::Skipped => write!(f, "SKIP"),
        }
    }
}

// ===== impl TestResult =====

impl TestResult {
    pub fn name(&self) -> String {
        self.path.join("/")
    }
}

// ===== impl Report =====

impl Report {
    // Returns whether any test failed.
    pub fn failed(&self) -> bool {
        self.results
            .iter()
            .any(|result| result.outcome == Outcome::Failed)
    }

    // Looks up a test by the names of its path.
    pub fn get(&self, path: &[&str]) -> Option<&TestResult> {
        self.results.iter().find(|result| result.path == path)
    }

    // Returns the first test whose name is `name`, at any depth.
    pub fn find(&self, name: &str) -> Option<&TestResult> {
        self.results
            .iter()
            .find(|result| result.path.last().is_some_and(|last| last == name))
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome == outcome)
            .count()
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for result in &self.results {
            let indent = "    ".repeat(result.path.len().saturating_sub(1));
            writeln!(
                f,
                "{indent}--- {}: {} ({:.2}s)",
                result.outcome,
                result.name(),
                result.duration.as_secs_f64()
            )?;
            for msg in &result.messages {
                writeln!(f, "{indent}    {msg}")?;
            }
        }
        writeln!(
            f,
            "{} passed, {} failed, {} skipped",
            self.count(Outcome::Passed),
            self.count(Outcome::Failed),
            self.count(Outcome::Skipped)
        )
    }
}

// ===== impl Test =====

impl Test<'_> {
    // Runs a nested test. Returns whether it didn't fail.
    pub fn run<F>(&mut self, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Test<'_>) -> Result<(), Failure>,
    {
        let mut path = self.path.clone();
        path.push(name.to_owned());

        let span = info_span!("test", %name);
        let _span_guard = span.enter();
        info!("running");

        // Reserve the entry so that parents are listed before children.
        let index = self.report.results.len();
        self.report.results.push(TestResult {
            path: path.clone(),
            outcome: Outcome::Passed,
            messages: vec![],
            duration: Duration::ZERO,
        });

        let start = Instant::now();
        let mut test = Test {
            path,
            report: &mut *self.report,
            messages: vec![],
            failed: false,
        };
        let result = f(&mut test);
        let Test {
            mut messages,
            failed,
            ..
        } = test;

        let outcome = match result {
            Ok(()) if failed => Outcome::Failed,
            Ok(()) => Outcome::Passed,
            Err(Failure::Fatal(msg)) => {
                error!(%msg, "fatal failure");
                messages.push(msg);
                Outcome::Failed
            }
            Err(Failure::Skip(msg)) => {
                info!(%msg, "skipped");
                messages.push(msg);
                if failed {
                    Outcome::Failed
                } else {
                    Outcome::Skipped
                }
            }
        };
        info!(%outcome, "finished");

        let entry = &mut self.report.results[index];
        entry.outcome = outcome;
        entry.messages = messages;
        entry.duration = start.elapsed();

        if outcome == Outcome::Failed {
            self.failed = true;
        }
        outcome != Outcome::Failed
    }

    // Records a non-fatal failure.
    pub fn error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!(%msg, "test error");
        self.messages.push(msg);
        self.failed = true;
    }

    // Records an informational message.
    pub fn log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!(%msg);
        self.messages.push(msg);
    }

    // Records a non-fatal failure unless the condition holds.
    pub fn check(&mut self, cond: bool, msg: impl Into<String>) -> bool {
        if !cond {
            self.error(msg);
        }
        cond
    }

    pub fn failed(&self) -> bool {
        self.failed
    }
}

// ===== impl Runner =====

impl Runner {
    pub fn new() -> Runner {
        Runner::default()
    }

    // Runs a top-level test. Returns whether it didn't fail.
    pub fn run<F>(&mut self, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Test<'_>) -> Result<(), Failure>,
    {
        let mut root = Test {
            path: vec![],
            report: &mut self.report,
            messages: vec![],
            failed: false,
        };
        root.run(name, f)
    }

    pub fn finish(self) -> Report {
        self.report
    }
}

// ===== global functions =====

// Ends the running test unless the condition holds.
pub fn ensure(cond: bool, msg: impl Into<String>) -> Result<(), Failure> {
    if cond { Ok(()) } else { Err(Failure::Fatal(msg.into())) }
}

// ===== From/TryFrom conversion methods =====

impl From<ocprobe_gnmi::Error> for Failure {
    fn from(error: ocprobe_gnmi::Error) -> Failure {
        error.log();
        Failure::Fatal(format!("failed due to {error}"))
    }
}

impl From<ocprobe_otg::Error> for Failure {
    fn from(error: ocprobe_otg::Error) -> Failure {
        error.log();
        Failure::Fatal(format!("failed due to {error}"))
    }
}

impl From<ocprobe_openconfig::Error> for Failure {
    fn from(error: ocprobe_openconfig::Error) -> Failure {
        error.log();
        Failure::Fatal(format!("failed to build configuration: {error}"))
    }
}

impl From<ocprobe_session::Error> for Failure {
    fn from(error: ocprobe_session::Error) -> Failure {
        error.log();
        Failure::Fatal(error.to_string())
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_marks_ancestors() {
        let mut runner = Runner::new();
        let mut ran_sibling = false;
        runner.run("top", |t| {
            t.run("child", |t| {
                t.run("grandchild", |_| Err(Failure::fatal("boom")));
                Ok(())
            });
            t.run("sibling", |_| {
                ran_sibling = true;
                Ok(())
            });
            Ok(())
        });
        let report = runner.finish();

        assert!(ran_sibling);
        assert!(report.failed());
        assert_eq!(report.results[0].name(), "top");
        assert_eq!(report.results[2].name(), "top/child/grandchild");
        assert_eq!(report.results[2].messages, ["boom"]);
        let child = report.get(&["top", "child"]).unwrap();
        assert_eq!(child.outcome, Outcome::Failed);
        assert_eq!(report.find("sibling").unwrap().outcome, Outcome::Passed);
        assert_eq!(report.find("top").unwrap().outcome, Outcome::Failed);
    }

    #[test]
    fn non_fatal_errors_continue() {
        let mut runner = Runner::new();
        let mut reached = false;
        runner.run("top", |t| {
            t.check(1 + 1 == 3, "arithmetic");
            t.log("still running");
            reached = true;
            Ok(())
        });
        let report = runner.finish();

        assert!(reached);
        let result = report.find("top").unwrap();
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.messages, ["arithmetic", "still running"]);
    }

    #[test]
    fn skipped() {
        let mut runner = Runner::new();
        runner.run("top", |t| {
            t.run("skipped", |_| Err(Failure::skip("not supported")));
            Ok(())
        });
        let report = runner.finish();

        assert!(!report.failed());
        assert_eq!(report.find("skipped").unwrap().outcome, Outcome::Skipped);
        assert_eq!(report.find("top").unwrap().outcome, Outcome::Passed);
        assert_eq!(report.count(Outcome::Skipped), 1);
        assert!(report.to_string().contains("--- SKIP: top/skipped"));
    }

    #[test]
    fn ensure_condition() {
        assert_eq!(ensure(true, "unused"), Ok(()));
        assert_eq!(ensure(false, "broken"), Err(Failure::fatal("broken")));
    }
}
