//! Assertion failure reasons.
//!
//! Every failed assertion is described by one [`Failure`] and reported once through
//! the host's fatal primitive. Messages are self-contained: whenever two operands were
//! compared, both renderings are included.

use thiserror::Error;

/// Why an assertion failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// The actual value is not a kind the assertion accepts.
    #[error("{assertion}: type mismatch: {reason}\nACTUAL:\n{actual}{}", section("EXPECTED", .expected))]
    TypeMismatch {
        assertion: &'static str,
        reason: String,
        actual: String,
        expected: Option<String>,
    },
    /// The actual value has the right kind but the wrong value.
    #[error("{assertion}: {reason}\nACTUAL:\n{actual}{}", section("EXPECTED", .expected))]
    ValueMismatch {
        assertion: &'static str,
        reason: String,
        actual: String,
        expected: Option<String>,
    },
    /// A structural comparison found differing leaves.
    #[error(
        "{assertion}: values are not equal:\n{}\nACTUAL:\n{actual}\nEXPECTED:\n{expected}{}",
        bullets(.mismatches),
        section("DIFF (-expected +actual)", .diff)
    )]
    StructuralMismatch {
        assertion: &'static str,
        mismatches: Vec<String>,
        actual: String,
        expected: String,
        diff: Option<String>,
    },
    /// Some of several expected errors were not found in the actual error.
    #[error("{assertion}: not all expected errors matched\nACTUAL:\n{actual}\nEXPECTED:\n{}", .statuses.join("\n"))]
    UnmatchedErrors {
        assertion: &'static str,
        actual: String,
        statuses: Vec<String>,
    },
    /// An assertion was created and never ran a check.
    #[error("unused assertion created at {created_at}: no check was ever run on it\nACTUAL:\n{actual}")]
    UnusedAssertion { created_at: String, actual: String },
}

impl Failure {
    pub fn assertion(&self) -> &'static str {
        match self {
            Failure::TypeMismatch { assertion, .. }
            | Failure::ValueMismatch { assertion, .. }
            | Failure::StructuralMismatch { assertion, .. }
            | Failure::UnmatchedErrors { assertion, .. } => *assertion,
            Failure::UnusedAssertion { .. } => "unused",
        }
    }
}

fn section(title: &str, body: &Option<String>) -> String {
    match body {
        Some(body) => format!("\n{title}:\n{body}"),
        None => String::new(),
    }
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  * {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_mismatch_lists_every_difference() {
        let failure = Failure::StructuralMismatch {
            assertion: "equals",
            mismatches: vec!["Name: John != Sam".into(), "Age: 1 != 2".into()],
            actual: "    a".into(),
            expected: "    b".into(),
            diff: None,
        };
        let text = failure.to_string();
        assert!(text.contains("  * Name: John != Sam\n  * Age: 1 != 2"));
        assert!(text.contains("ACTUAL:\n    a\nEXPECTED:\n    b"));
        assert!(!text.contains("DIFF"));
    }

    #[test]
    fn optional_expected_section() {
        let failure = Failure::ValueMismatch {
            assertion: "is_true",
            reason: "expected true, got false".into(),
            actual: "    false".into(),
            expected: None,
        };
        assert_eq!(
            failure.to_string(),
            "is_true: expected true, got false\nACTUAL:\n    false"
        );
    }
}
