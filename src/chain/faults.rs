//! Error assertions.

use super::Chain;
use crate::failure::Failure;
use crate::fault::ErrorValue;
use crate::format::indent;
use crate::value::Value;

fn render(error: Option<&ErrorValue>) -> String {
    match error {
        Some(e) => indent(&e.render()),
        None => indent("nil"),
    }
}

impl<'t> Chain<'t> {
    /// The actual value as an error; nil and nil pointers are `None`.
    #[track_caller]
    fn actual_error(&self, assertion: &'static str) -> Option<&ErrorValue> {
        match self.actual.resolve() {
            Value::Error(e) => Some(e),
            v if v.is_nil() => None,
            _ => self.fail(self.type_mismatch(assertion, "an error")),
        }
    }

    /// Is-a check of the actual error against `expected`; `None` expects no error.
    ///
    /// Passes when both are absent, or when `expected` appears in the actual error's
    /// wrap chain or is declared equivalent by one of its links.
    #[track_caller]
    pub fn is_error(&self, expected: Option<&ErrorValue>) -> &Self {
        self.begin();
        let actual = self.actual_error("is_error");
        let reason = match (actual, expected) {
            (None, None) => return self,
            (Some(a), Some(e)) if a.is(e) => return self,
            (None, Some(_)) => "expected an error, got nil",
            (Some(_), None) => "expected no error",
            (Some(_), Some(_)) => "error does not match",
        };
        self.fail(Failure::ValueMismatch {
            assertion: "is_error",
            reason: reason.to_string(),
            actual: render(actual),
            expected: Some(render(expected)),
        })
    }

    #[track_caller]
    pub fn is_not_error(&self) -> &Self {
        self.is_error(None)
    }

    /// Checks every expected error independently against the same actual error.
    ///
    /// No expected errors means no error is expected; a single one behaves like
    /// [`Chain::is_error`]. Repeated expectations are checked again, not merged.
    #[track_caller]
    pub fn matches_all_errors(&self, expected: &[ErrorValue]) -> &Self {
        match expected {
            [] => self.is_error(None),
            [single] => self.is_error(Some(single)),
            many => {
                self.begin();
                let actual = self.actual_error("matches_all_errors");
                let mut all_matched = true;
                let statuses: Vec<String> = many
                    .iter()
                    .map(|e| {
                        let matched = actual.is_some_and(|a| a.is(e));
                        all_matched &= matched;
                        let status = if matched { "matched" } else { "unmatched" };
                        format!("    {status}: {e}")
                    })
                    .collect();
                if all_matched {
                    return self;
                }
                self.fail(Failure::UnmatchedErrors {
                    assertion: "matches_all_errors",
                    actual: render(actual),
                    statuses,
                })
            }
        }
    }
}
