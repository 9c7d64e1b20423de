//! Structural equality.
//!
//! [`compare`] walks two [`Value`]s in lockstep and returns one description per
//! differing leaf, prefixed with the path to that leaf:
//!
//! ```text
//! Name: John != Sam
//! Messages.slice[1].Body: Hello != Greetings
//! Tags: <nil map> != map[]
//! ```
//!
//! Configuration is an explicit [`CompareConfig`] value passed to every call, so
//! concurrent comparisons never share mutable settings.

use std::fmt::Display;

use crate::format::plain;
use crate::value::{Field, Kind, Value};

const NO_VALUE: &str = "<no value>";
const NO_KEY: &str = "<does not have key>";

/// Settings for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareConfig {
    /// Compare record fields marked as unexported.
    pub compare_unexported: bool,
    /// Stop recording after this many differences.
    pub max_diff: usize,
    /// Stop descending below this depth; `None` walks everything.
    pub max_depth: Option<usize>,
    /// Decimal places floats are rounded to before comparing.
    pub float_precision: u32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            compare_unexported: true,
            max_diff: 10,
            max_depth: None,
            float_precision: 10,
        }
    }
}

/// Compares `actual` against `expected` and returns the ordered mismatch list.
///
/// An empty list means the values are equal. A nil `expected` matches a nil or
/// nil-pointer `actual` without walking either side.
pub fn compare(actual: &Value, expected: &Value, config: &CompareConfig) -> Vec<String> {
    if expected.is_nil() && actual.is_nil() {
        return Vec::new();
    }
    let mut walker = Walker {
        config,
        path: Vec::new(),
        diffs: Vec::new(),
    };
    walker.walk(actual, expected, 0);
    walker.diffs
}

/// True when [`compare`] finds no mismatch.
pub fn equal(actual: &Value, expected: &Value, config: &CompareConfig) -> bool {
    compare(actual, expected, config).is_empty()
}

struct Walker<'c> {
    config: &'c CompareConfig,
    path: Vec<String>,
    diffs: Vec<String>,
}

impl Walker<'_> {
    fn full(&self) -> bool {
        self.diffs.len() >= self.config.max_diff
    }

    fn record(&mut self, actual: impl Display, expected: impl Display) {
        if self.full() {
            return;
        }
        let line = if self.path.is_empty() {
            format!("{actual} != {expected}")
        } else {
            format!("{}: {actual} != {expected}", self.path.join("."))
        };
        self.diffs.push(line);
    }

    fn record_at(&mut self, segment: String, actual: impl Display, expected: impl Display) {
        self.path.push(segment);
        self.record(actual, expected);
        self.path.pop();
    }

    fn nested(&mut self, segment: String, actual: &Value, expected: &Value, depth: usize) {
        self.path.push(segment);
        self.walk(actual, expected, depth + 1);
        self.path.pop();
    }

    fn walk(&mut self, actual: &Value, expected: &Value, depth: usize) {
        if self.full() {
            return;
        }
        if self.config.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        match (actual, expected) {
            (Value::Nil, Value::Nil) => {}
            (Value::Pointer { target: a, .. }, Value::Pointer { target: b, .. }) => {
                match (a, b) {
                    (None, None) => {}
                    (Some(a), Some(b)) => self.walk(a, b, depth),
                    _ => self.record(plain(actual), plain(expected)),
                }
            }
            (Value::Bool(a), Value::Bool(b)) => {
                if a != b {
                    self.record(a, b);
                }
            }
            (Value::Int(a), Value::Int(b)) => {
                if a != b {
                    self.record(a, b);
                }
            }
            (Value::Uint(a), Value::Uint(b)) => {
                if a != b {
                    self.record(a, b);
                }
            }
            (Value::Int(a), Value::Uint(b)) | (Value::Uint(b), Value::Int(a)) => {
                if u64::try_from(*a).ok() != Some(*b) {
                    self.record(plain(actual), plain(expected));
                }
            }
            (Value::Float(a), Value::Float(b)) => {
                if !self.float_eq(*a, *b) {
                    self.record(a, b);
                }
            }
            (Value::Char(a), Value::Char(b)) => {
                if a != b {
                    self.record(a, b);
                }
            }
            (Value::Text(a), Value::Text(b)) => {
                if a != b {
                    self.record(a, b);
                }
            }
            (Value::Sequence(a), Value::Sequence(b)) => match (a, b) {
                (Some(a), Some(b)) => self.elements("slice", a, b, depth),
                (None, None) => {}
                _ => self.record(plain(actual), plain(expected)),
            },
            (Value::Array(a), Value::Array(b)) => self.elements("array", a, b, depth),
            (Value::Mapping(a), Value::Mapping(b)) => match (a, b) {
                (Some(a), Some(b)) => self.entries(a, b, depth),
                (None, None) => {}
                _ => self.record(plain(actual), plain(expected)),
            },
            (
                Value::Record {
                    type_name: ta,
                    fields: fa,
                },
                Value::Record {
                    type_name: tb,
                    fields: fb,
                },
            ) => {
                if ta != tb {
                    self.record(ta, tb);
                } else {
                    self.fields(fa, fb, depth);
                }
            }
            (Value::Error(a), Value::Error(b)) => {
                let (a, b) = (a.message(), b.message());
                if a != b {
                    self.record(a, b);
                }
            }
            (a, b) if a.kind() == Kind::Nil || b.kind() == Kind::Nil => {
                self.record(plain(a), plain(b))
            }
            (a, b) => self.record(a.type_name(), b.type_name()),
        }
    }

    fn float_eq(&self, a: f64, b: f64) -> bool {
        if a == b || (a.is_nan() && b.is_nan()) {
            return true;
        }
        if !a.is_finite() || !b.is_finite() {
            return false;
        }
        // Scaling by 10^precision overflows for large magnitudes; fixed-point
        // renderings do not.
        let precision = self.config.float_precision as usize;
        format!("{a:.precision$}") == format!("{b:.precision$}")
    }

    fn elements(&mut self, kind: &str, actual: &[Value], expected: &[Value], depth: usize) {
        for i in 0..actual.len().max(expected.len()) {
            if self.full() {
                break;
            }
            let segment = format!("{kind}[{i}]");
            match (actual.get(i), expected.get(i)) {
                (Some(a), Some(b)) => self.nested(segment, a, b, depth),
                (Some(a), None) => self.record_at(segment, plain(a), NO_VALUE),
                (None, Some(b)) => self.record_at(segment, NO_VALUE, plain(b)),
                (None, None) => {}
            }
        }
    }

    fn entries(&mut self, actual: &[(Value, Value)], expected: &[(Value, Value)], depth: usize) {
        let find = |entries: &[(Value, Value)], key: &str| {
            entries
                .iter()
                .position(|(k, _)| plain(k) == key)
                .map(|i| entries[i].1.clone())
        };
        for (key, value) in actual {
            let key = plain(key);
            let segment = format!("map[{key}]");
            match find(expected, &key) {
                Some(other) => self.nested(segment, value, &other, depth),
                None => self.record_at(segment, plain(value), NO_KEY),
            }
        }
        for (key, value) in expected {
            let key = plain(key);
            if find(actual, &key).is_none() {
                self.record_at(format!("map[{key}]"), NO_KEY, plain(value));
            }
        }
    }

    fn fields(&mut self, actual: &[Field], expected: &[Field], depth: usize) {
        let unexported = self.config.compare_unexported;
        let visible = |f: &&Field| f.exported || unexported;
        for field in actual.iter().filter(visible) {
            match expected.iter().find(|f| f.name == field.name) {
                Some(other) => self.nested(field.name.clone(), &field.value, &other.value, depth),
                None => self.record_at(field.name.clone(), plain(&field.value), NO_VALUE),
            }
        }
        for field in expected.iter().filter(visible) {
            if !actual.iter().any(|f| f.name == field.name) {
                self.record_at(field.name.clone(), NO_VALUE, plain(&field.value));
            }
        }
    }
}
