mod common;

use common::{only_failure, quiet};
use thiserror::Error;
use verdict::value::Inspect;
use verdict::{error_of, Assert, ErrorValue, Fault, Structure};

#[derive(Debug, Error)]
#[error("not found: {0}")]
struct NotFound(&'static str);

impl Fault for NotFound {}

#[derive(Debug, Error)]
#[error("lookup failed")]
struct Lookup {
    #[source]
    cause: NotFound,
}

impl Fault for Lookup {
    fn wrapped(&self) -> Option<&dyn Fault> {
        Some(&self.cause)
    }
}

#[derive(Debug, Error)]
#[error("storage unavailable")]
struct Unavailable;

impl Fault for Unavailable {}

/// Declares itself equivalent to any [`Unavailable`].
#[derive(Debug, Error)]
#[error("disk offline")]
struct DiskOffline;

impl Fault for DiskOffline {
    fn satisfies_equivalence(&self, target: &ErrorValue) -> bool {
        target.message() == Unavailable.to_string()
    }
}

#[derive(Debug, Error)]
#[error("quota exceeded")]
struct Quota {
    limit: u32,
}

impl Fault for Quota {
    fn structure(&self) -> Option<Structure> {
        Some(Structure::new("quota", "quota exceeded").parameter("limit", self.limit.to_value()))
    }
}

fn find(user: &'static str) -> Result<u32, Lookup> {
    Err(Lookup {
        cause: NotFound(user),
    })
}

#[test]
fn wrapped_errors_match_their_causes() {
    quiet("wrapped", |t| {
        let a = Assert::new(t);
        let err = error_of(find("ada"));
        a.that(&err)
            .is_not_nil()
            .is_error(Some(&ErrorValue::new(NotFound("ada"))))
            .matches_all_errors(&[
                ErrorValue::new(NotFound("ada")),
                ErrorValue::new(Lookup {
                    cause: NotFound("ada"),
                }),
            ]);
    })
    .assert_passed();
}

#[test]
fn success_is_no_error() {
    quiet("success", |t| {
        let a = Assert::new(t);
        a.that(error_of(Ok::<u8, NotFound>(1))).is_not_error().is_nil();
        a.that(error_of(Ok::<u8, NotFound>(1))).matches_all_errors(&[]);
    })
    .assert_passed();
}

#[test]
fn equivalence_is_declared_by_the_actual_error() {
    quiet("equivalent", |t| {
        Assert::new(t)
            .that(ErrorValue::new(DiskOffline))
            .is_error(Some(&ErrorValue::new(Unavailable)));
    })
    .assert_passed();
}

#[test]
fn std_errors_match_by_value() {
    let parse = "x".parse::<i32>().unwrap_err();
    quiet("std", |t| {
        Assert::new(t)
            .that(ErrorValue::new(parse.clone()))
            .is_error(Some(&ErrorValue::new(parse)));
    })
    .assert_passed();
}

#[test]
fn missing_error_is_reported() {
    let outcome = quiet("missing", |t| {
        Assert::new(t)
            .that(error_of(Ok::<u8, NotFound>(1)))
            .is_error(Some(&ErrorValue::new(NotFound("x"))));
    });
    let failure = only_failure(&outcome);
    assert!(failure.starts_with(
        "is_error: expected an error, got nil\nACTUAL:\n    nil\nEXPECTED:\n    not found: x"
    ));
}

#[test]
fn unexpected_error_uses_structured_rendering() {
    let outcome = quiet("quota", |t| {
        Assert::new(t)
            .that(ErrorValue::new(Quota { limit: 5 }))
            .is_not_error();
    });
    let failure = only_failure(&outcome);
    assert!(
        failure.starts_with(
            "is_error: expected no error\nACTUAL:\n    \
             kind: quota\n    \
             message: quota exceeded\n    \
             parameters:\n        \
             limit: 5\nEXPECTED:\n    nil"
        ),
        "{failure}"
    );
}

#[test]
fn non_error_actual_is_a_type_mismatch() {
    let outcome = quiet("kind", |t| {
        Assert::new(t).that("boom").is_error(None);
    });
    assert!(only_failure(&outcome).starts_with("is_error: type mismatch: expected an error, got string"));
}

#[test]
fn unmatched_errors_are_listed_with_status() {
    let outcome = quiet("all", |t| {
        Assert::new(t)
            .that(error_of(find("ada")))
            .matches_all_errors(&[ErrorValue::new(NotFound("ada")), ErrorValue::new(Unavailable)]);
    });
    let failure = only_failure(&outcome);
    assert!(failure.starts_with(
        "matches_all_errors: not all expected errors matched\n\
         ACTUAL:\n    lookup failed\n\
         EXPECTED:\n    matched: not found: ada\n    unmatched: storage unavailable"
    ));
}

#[test]
fn repeated_expectations_are_each_checked() {
    quiet("repeat", |t| {
        let expected = ErrorValue::from(NotFound("ada"));
        Assert::new(t)
            .that(error_of(find("ada")))
            .matches_all_errors(&[expected.clone(), expected]);
    })
    .assert_passed();
}
