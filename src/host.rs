//! Test host.
//!
//! Assertions talk to the running test through [`TestHandle`]: fail immediately, mark
//! helper frames, run named sub-tests with their own handle, and register cleanup
//! hooks. Any runner can implement it. [`TestContext`] is the reference
//! implementation used by [`run`], which lets plain `#[test]` functions host
//! table-driven sub-tests:
//!
//! ```rust
//! use verdict::{host, Assert};
//!
//! let outcome = host::run("arithmetic", |t| {
//!     let a = Assert::new(t);
//!     a.that(2 + 2).equals(4);
//! });
//! assert!(outcome.passed());
//! ```
//!
//! A fatal failure unwinds with a private payload that only the runner boundary
//! catches, so the rest of the test body is skipped while cleanup hooks still run.

pub mod report;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::env;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

/// Cleanup hook run when a test concludes.
pub type CleanupHook = Box<dyn FnOnce(&dyn TestHandle)>;

/// Capabilities a test runner provides to assertions.
pub trait TestHandle {
    /// Full name of the running test, sub-tests joined with `/`.
    fn name(&self) -> &str;

    /// Records `message` as a failure and stops the current test body.
    fn fatal(&self, message: &str) -> !;

    /// Marks the calling frame as an assertion helper.
    ///
    /// Failure locations are already reported at the user's call site through
    /// `#[track_caller]`, so runners without frame bookkeeping can ignore this.
    fn helper(&self) {}

    /// Runs `body` as an isolated sub-test named `name`; returns whether it passed.
    fn run(&self, name: &str, body: &mut dyn FnMut(&dyn TestHandle)) -> bool;

    /// Registers `hook` to run when this test concludes.
    fn cleanup(&self, hook: CleanupHook);
}

/// Unwind payload of a fatal failure.
struct FatalStop;

/// Host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub use_colors: bool,
    /// Only sub-tests whose full name contains this substring run; others are skipped.
    pub filter: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            filter: env::var("VERDICT_FILTER").ok().filter(|f| !f.is_empty()),
        }
    }
}

impl HostConfig {
    /// Colourless and unfiltered; independent of the environment.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// True if the test named `name` should run under the configured filter.
    ///
    /// Ancestors of a matching test are selected too, so the filter can name a
    /// nested sub-test.
    pub fn selects(&self, name: &str) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => {
                name.contains(filter.as_str()) || filter.starts_with(&format!("{name}/"))
            }
        }
    }
}

/// Final state of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

/// Result tree of a test and its sub-tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub status: Status,
    pub failures: Vec<String>,
    pub subtests: Vec<Outcome>,
}

/// Tally of statuses over an outcome tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.status == Status::Passed
    }

    pub fn failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// Finds a test by full name or by its path below this one.
    pub fn find(&self, path: &str) -> Option<&Outcome> {
        if self.name == path || self.name.ends_with(&format!("/{path}")) {
            return Some(self);
        }
        self.subtests.iter().find_map(|sub| sub.find(path))
    }

    /// Every failure message in the tree, depth first.
    pub fn all_failures(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.failures.iter().map(String::as_str).collect();
        for sub in &self.subtests {
            out.extend(sub.all_failures());
        }
        out
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        self.tally(&mut counts);
        counts
    }

    fn tally(&self, counts: &mut Counts) {
        match self.status {
            Status::Passed => counts.passed += 1,
            Status::Failed => counts.failed += 1,
            Status::Skipped => counts.skipped += 1,
        }
        for sub in &self.subtests {
            sub.tally(counts);
        }
    }

    /// Panics with the rendered report if this test failed.
    #[track_caller]
    pub fn assert_passed(&self) {
        if self.failed() {
            panic!("{}", report::render(self, &HostConfig::plain()));
        }
    }
}

/// Reference [`TestHandle`] implementation.
///
/// Sub-tests run sequentially on the calling thread. Cleanup hooks run in reverse
/// registration order once the body has finished or stopped.
pub struct TestContext {
    name: String,
    config: HostConfig,
    failures: RefCell<Vec<String>>,
    cleanups: RefCell<Vec<CleanupHook>>,
    subtests: RefCell<Vec<Outcome>>,
    skipped: Cell<bool>,
}

impl TestContext {
    pub fn new(name: impl Into<String>, config: HostConfig) -> Self {
        Self {
            name: name.into(),
            config,
            failures: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            subtests: RefCell::new(Vec::new()),
            skipped: Cell::new(false),
        }
    }

    /// Runs `body` against this context, then its cleanup hooks, and returns the
    /// outcome.
    pub fn execute(self, body: impl FnOnce(&dyn TestHandle)) -> Outcome {
        tracing::debug!(test = %self.name, "running");
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| body(&self))) {
            self.record_panic(payload);
        }
        self.run_cleanups();
        let outcome = self.into_outcome();
        tracing::debug!(test = %outcome.name, status = ?outcome.status, "finished");
        outcome
    }

    fn skip(self) -> Outcome {
        tracing::debug!(test = %self.name, "skipped by filter");
        self.skipped.set(true);
        self.into_outcome()
    }

    fn record_panic(&self, payload: Box<dyn Any + Send>) {
        // The message of a fatal stop was recorded before unwinding.
        if payload.is::<FatalStop>() {
            return;
        }
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        self.failures
            .borrow_mut()
            .push(format!("panicked: {message}"));
    }

    fn run_cleanups(&self) {
        loop {
            let hook = self.cleanups.borrow_mut().pop();
            let Some(hook) = hook else {
                break;
            };
            tracing::trace!(test = %self.name, "running cleanup hook");
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(self))) {
                self.record_panic(payload);
            }
        }
    }

    fn into_outcome(self) -> Outcome {
        let failures = self.failures.into_inner();
        let subtests = self.subtests.into_inner();
        let status = if !failures.is_empty() || subtests.iter().any(Outcome::failed) {
            Status::Failed
        } else if self.skipped.get() {
            Status::Skipped
        } else {
            Status::Passed
        };
        Outcome {
            name: self.name,
            status,
            failures,
            subtests,
        }
    }
}

impl TestHandle for TestContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn fatal(&self, message: &str) -> ! {
        self.failures.borrow_mut().push(message.to_string());
        // resume_unwind skips the panic hook, so a fatal stop prints nothing.
        panic::resume_unwind(Box::new(FatalStop))
    }

    fn run(&self, name: &str, body: &mut dyn FnMut(&dyn TestHandle)) -> bool {
        let child = TestContext::new(format!("{}/{}", self.name, name), self.config.clone());
        let outcome = if self.config.selects(&child.name) {
            child.execute(|t| body(t))
        } else {
            child.skip()
        };
        let passed = !outcome.failed();
        self.subtests.borrow_mut().push(outcome);
        passed
    }

    fn cleanup(&self, hook: CleanupHook) {
        self.cleanups.borrow_mut().push(hook);
    }
}

/// Runs `body` as a top-level test with the default configuration.
pub fn run(name: &str, body: impl FnOnce(&dyn TestHandle)) -> Outcome {
    run_with(&HostConfig::default(), name, body)
}

/// Runs `body` as a top-level test with `config`.
pub fn run_with(config: &HostConfig, name: &str, body: impl FnOnce(&dyn TestHandle)) -> Outcome {
    TestContext::new(name, config.clone()).execute(body)
}
