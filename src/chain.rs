//! Fluent assertions.
//!
//! [`Assert`] is bound to a test handle; [`Assert::that`] binds an actual value and
//! returns a [`Chain`] whose methods each run one check:
//!
//! ```rust
//! use verdict::{host, Assert};
//!
//! let outcome = host::run("greeting", |t| {
//!     let a = Assert::new(t);
//!     a.that("hello 123 world")
//!         .is_not_empty()
//!         .contains("123")
//!         .matches_regexp("[1-3]+");
//! });
//! assert!(outcome.passed());
//! ```
//!
//! A failing check reports through [`TestHandle::fatal`] and never returns. A chain
//! on which no check ever runs is itself reported when its test concludes.

mod faults;

use std::cell::Cell;
use std::panic::Location;
use std::rc::Rc;

use regex::Regex;

use crate::compare::{self, CompareConfig};
use crate::failure::Failure;
use crate::format::{self, line_diff, pretty};
use crate::host::TestHandle;
use crate::table;
use crate::value::{Inspect, Value};

/// Assertion entry point bound to one test handle.
pub struct Assert<'t> {
    handle: &'t dyn TestHandle,
    config: CompareConfig,
}

impl<'t> Assert<'t> {
    pub fn new(handle: &'t dyn TestHandle) -> Self {
        Self::with_config(handle, CompareConfig::default())
    }

    pub fn with_config(handle: &'t dyn TestHandle, config: CompareConfig) -> Self {
        Self { handle, config }
    }

    pub fn handle(&self) -> &'t dyn TestHandle {
        self.handle
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Starts a chain on `actual`.
    ///
    /// Registers a cleanup hook that fails the test if no check runs on the chain.
    #[track_caller]
    pub fn that(&self, actual: impl Inspect) -> Chain<'t> {
        let created_at = Location::caller();
        let actual = actual.to_value();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let rendered = format::format(&actual);
        self.handle.cleanup(Box::new(move |t: &dyn TestHandle| {
            if !flag.get() {
                let failure = Failure::UnusedAssertion {
                    created_at: created_at.to_string(),
                    actual: rendered,
                };
                t.fatal(&failure.to_string());
            }
        }));
        Chain {
            handle: self.handle,
            actual,
            ran,
            config: self.config,
        }
    }

    /// Runs `body` as a named sub-test with its own `Assert`; returns whether it passed.
    pub fn run(&self, name: &str, body: impl FnOnce(&Assert<'_>)) -> bool {
        let config = self.config;
        let mut body = Some(body);
        self.handle.run(name, &mut |t: &dyn TestHandle| {
            if let Some(body) = body.take() {
                body(&Assert::with_config(t, config));
            }
        })
    }

    /// Runs one sub-test per entry of `rows`; see [`table::run`].
    pub fn table<T: Inspect + ?Sized>(&self, rows: &T, body: impl FnMut(&Assert<'_>, usize)) {
        table::run_with_config(self.handle, rows, self.config, body);
    }
}

/// One assertion session: a handle, an actual value and whether a check has run.
pub struct Chain<'t> {
    handle: &'t dyn TestHandle,
    actual: Value,
    ran: Rc<Cell<bool>>,
    config: CompareConfig,
}

impl<'t> Chain<'t> {
    pub fn actual(&self) -> &Value {
        &self.actual
    }

    /// Whether any check has run on this chain.
    pub fn has_run(&self) -> bool {
        self.ran.get()
    }

    fn begin(&self) {
        self.ran.set(true);
        self.handle.helper();
    }

    #[track_caller]
    fn fail(&self, failure: Failure) -> ! {
        let location = Location::caller();
        tracing::debug!(
            test = self.handle.name(),
            assertion = failure.assertion(),
            %location,
            "assertion failed"
        );
        self.handle.fatal(&format!("{failure}\n    at {location}"))
    }

    fn rendered(&self) -> String {
        format::format(&self.actual)
    }

    fn type_mismatch(&self, assertion: &'static str, wanted: &str) -> Failure {
        Failure::TypeMismatch {
            assertion,
            reason: format!("expected {wanted}, got {}", self.actual.type_name()),
            actual: self.rendered(),
            expected: None,
        }
    }

    fn value_mismatch(
        &self,
        assertion: &'static str,
        reason: impl Into<String>,
        expected: Option<String>,
    ) -> Failure {
        Failure::ValueMismatch {
            assertion,
            reason: reason.into(),
            actual: self.rendered(),
            expected,
        }
    }

    #[track_caller]
    pub fn is_true(&self) -> &Self {
        self.expect_bool("is_true", true)
    }

    #[track_caller]
    pub fn is_false(&self) -> &Self {
        self.expect_bool("is_false", false)
    }

    #[track_caller]
    fn expect_bool(&self, assertion: &'static str, wanted: bool) -> &Self {
        self.begin();
        match self.actual {
            Value::Bool(b) if b == wanted => self,
            Value::Bool(b) => self.fail(self.value_mismatch(
                assertion,
                format!("expected {wanted}, got {b}"),
                None,
            )),
            _ => self.fail(self.type_mismatch(assertion, "a bool")),
        }
    }

    #[track_caller]
    pub fn is_nil(&self) -> &Self {
        self.begin();
        if self.actual.is_nil() {
            return self;
        }
        self.fail(self.value_mismatch("is_nil", "expected nil", None))
    }

    #[track_caller]
    pub fn is_not_nil(&self) -> &Self {
        self.begin();
        if !self.actual.is_nil() {
            return self;
        }
        self.fail(self.value_mismatch("is_not_nil", "expected a non-nil value", None))
    }

    /// Structural equality; see [`compare::compare`].
    #[track_caller]
    pub fn equals(&self, expected: impl Inspect) -> &Self {
        self.begin();
        let expected = expected.to_value();
        let mismatches = compare::compare(&self.actual, &expected, &self.config);
        if mismatches.is_empty() {
            return self;
        }
        self.fail(Failure::StructuralMismatch {
            assertion: "equals",
            mismatches,
            actual: self.rendered(),
            expected: format::format(&expected),
            diff: line_diff(&pretty(&self.actual), &pretty(&expected)),
        })
    }

    #[track_caller]
    pub fn does_not_equal(&self, unexpected: impl Inspect) -> &Self {
        self.begin();
        let unexpected = unexpected.to_value();
        if !compare::equal(&self.actual, &unexpected, &self.config) {
            return self;
        }
        self.fail(self.value_mismatch(
            "does_not_equal",
            "expected values to differ",
            Some(format::format(&unexpected)),
        ))
    }

    #[track_caller]
    pub fn is_empty(&self) -> &Self {
        self.expect_emptiness("is_empty", true)
    }

    #[track_caller]
    pub fn is_not_empty(&self) -> &Self {
        self.expect_emptiness("is_not_empty", false)
    }

    #[track_caller]
    fn expect_emptiness(&self, assertion: &'static str, want_empty: bool) -> &Self {
        self.begin();
        let Some(len) = self.actual.len() else {
            self.fail(self.type_mismatch(assertion, "a slice, array, string or map"))
        };
        if (len == 0) == want_empty {
            return self;
        }
        let reason = if want_empty {
            format!("expected an empty value, got length {len}")
        } else {
            "expected a non-empty value".to_string()
        };
        self.fail(self.value_mismatch(assertion, reason, None))
    }

    /// Substring search for text; element-wise structural equality for slices and
    /// arrays.
    #[track_caller]
    pub fn contains(&self, expected: impl Inspect) -> &Self {
        self.begin();
        let expected = expected.to_value();
        if self.containment("contains", &expected) {
            return self;
        }
        self.fail(self.value_mismatch(
            "contains",
            "expected value is not contained",
            Some(format::format(&expected)),
        ))
    }

    #[track_caller]
    pub fn does_not_contain(&self, unexpected: impl Inspect) -> &Self {
        self.begin();
        let unexpected = unexpected.to_value();
        if !self.containment("does_not_contain", &unexpected) {
            return self;
        }
        self.fail(self.value_mismatch(
            "does_not_contain",
            "value is contained",
            Some(format::format(&unexpected)),
        ))
    }

    #[track_caller]
    fn containment(&self, assertion: &'static str, expected: &Value) -> bool {
        match &self.actual {
            Value::Text(haystack) => match expected {
                Value::Text(needle) => haystack.contains(needle.as_str()),
                other => self.fail(Failure::TypeMismatch {
                    assertion,
                    reason: format!(
                        "cannot mix string and non-string: expected is {}",
                        other.type_name()
                    ),
                    actual: self.rendered(),
                    expected: Some(format::format(other)),
                }),
            },
            Value::Sequence(items) => items
                .iter()
                .flatten()
                .any(|item| compare::equal(item, expected, &self.config)),
            Value::Array(items) => items
                .iter()
                .any(|item| compare::equal(item, expected, &self.config)),
            _ => self.fail(self.type_mismatch(assertion, "a string, slice or array")),
        }
    }

    /// Passes if `pattern` matches anywhere in the actual text.
    #[track_caller]
    pub fn matches_regexp(&self, pattern: &str) -> &Self {
        self.begin();
        if pattern.is_empty() {
            self.fail(self.value_mismatch("matches_regexp", "pattern must not be empty", None));
        }
        let Value::Text(text) = &self.actual else {
            self.fail(self.type_mismatch("matches_regexp", "a string"))
        };
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => self.fail(self.value_mismatch(
                "matches_regexp",
                format!("invalid pattern: {err}"),
                Some(format::indent(pattern)),
            )),
        };
        if re.is_match(text) {
            return self;
        }
        self.fail(self.value_mismatch(
            "matches_regexp",
            "text does not match pattern",
            Some(format::indent(pattern)),
        ))
    }
}
