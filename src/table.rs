//! Table-driven sub-tests.
//!
//! A table is a slice, `Vec` or array of records, each with a `Name` text field that
//! names its sub-test. [`build`] validates the table and returns the named entries;
//! [`run`] executes one sub-test per entry.
//!
//! Validation errors come in two flavours. A table of the wrong shape (not a
//! sequence, an element that is not a record, a missing or non-text `Name` field) is
//! reported alone and immediately. Naming problems inside a well-shaped table (empty
//! or duplicate names) are collected and reported together, one line per entry.
//!
//! ```rust
//! use verdict::value::{Inspect, Record, Value};
//! use verdict::{host, table};
//!
//! struct Case {
//!     name: &'static str,
//!     input: i32,
//!     doubled: i32,
//! }
//!
//! impl Inspect for Case {
//!     fn to_value(&self) -> Value {
//!         Record::new("Case").field("Name", self.name).finish()
//!     }
//! }
//!
//! let cases = [
//!     Case { name: "one", input: 1, doubled: 2 },
//!     Case { name: "two", input: 2, doubled: 4 },
//! ];
//! let outcome = host::run("doubling", |t| {
//!     table::run(t, &cases, |a, i| {
//!         a.that(cases[i].input * 2).equals(cases[i].doubled);
//!     });
//! });
//! assert!(outcome.passed());
//! assert_eq!(outcome.subtests.len(), 2);
//! ```

use std::collections::HashMap;

use miette::Diagnostic;
use thiserror::Error;

use crate::chain::Assert;
use crate::compare::CompareConfig;
use crate::fault::Fault;
use crate::format::MARGIN;
use crate::host::TestHandle;
use crate::value::{Inspect, Value};

/// Field every table record must carry.
pub const NAME_FIELD: &str = "Name";

/// A validated table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    /// Position of the row in the input table.
    pub index: usize,
}

/// Table validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TableError {
    #[error("table must be a slice or array of structs, got {found}")]
    #[diagnostic(
        code(verdict::table::invalid_container),
        help("pass a Vec, slice or array of records")
    )]
    InvalidContainerType { found: String },

    #[error("table[{index}]: entry must be a struct, got {found}")]
    #[diagnostic(code(verdict::table::invalid_element))]
    InvalidElementType { index: usize, found: String },

    #[error("table[{index}]: {type_name} has no `Name` field")]
    #[diagnostic(
        code(verdict::table::missing_name_field),
        help("add a `Name` field holding the sub-test name")
    )]
    MissingNameField { index: usize, type_name: String },

    #[error("table[{index}]: `Name` field of {type_name} must be a string, got {found}")]
    #[diagnostic(code(verdict::table::non_string_name))]
    NonStringNameField {
        index: usize,
        type_name: String,
        found: String,
    },

    #[error("{}", render_entries(.0))]
    #[diagnostic(
        code(verdict::table::invalid_entries),
        help("every entry needs a unique, non-empty `Name`")
    )]
    Entries(Vec<EntryError>),
}

impl TableError {
    /// Structural errors concern the table's shape and are never aggregated.
    pub fn is_structural(&self) -> bool {
        !matches!(self, TableError::Entries(_))
    }

    /// The aggregated per-entry errors; empty for structural errors.
    pub fn entries(&self) -> &[EntryError] {
        match self {
            TableError::Entries(errors) => errors,
            _ => &[],
        }
    }
}

impl TableError {
    /// The fatal message for a rejected table: the error, then its diagnostic code
    /// and help.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        if let Some(code) = self.code() {
            out.push_str(&format!("\n{MARGIN}code: {code}"));
        }
        if let Some(help) = self.help() {
            out.push_str(&format!("\n{MARGIN}help: {help}"));
        }
        out
    }
}

impl Fault for TableError {}

/// A naming problem in one table entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("table[{index}]: `Name` must not be empty")]
    MissingNameValue { index: usize },

    #[error("table[{index}]: duplicate `Name` {name:?}, first used by table[{first}]")]
    DuplicateNameValue {
        index: usize,
        first: usize,
        name: String,
    },
}

impl EntryError {
    pub fn index(&self) -> usize {
        match self {
            EntryError::MissingNameValue { index } | EntryError::DuplicateNameValue { index, .. } => {
                *index
            }
        }
    }
}

fn render_entries(errors: &[EntryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validates `table` and returns its entries in input order.
pub fn build<T: Inspect + ?Sized>(table: &T) -> Result<Vec<TableEntry>, TableError> {
    build_value(&table.to_value())
}

/// [`build`] over an already inspected value.
pub fn build_value(table: &Value) -> Result<Vec<TableEntry>, TableError> {
    let rows: &[Value] = match table.resolve() {
        Value::Sequence(items) => items.as_deref().unwrap_or_default(),
        Value::Array(items) => items,
        other => {
            return Err(TableError::InvalidContainerType {
                found: other.type_name(),
            })
        }
    };

    let mut entries = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match entry_name(index, row)? {
            Some(name) => entries.push(TableEntry { name, index }),
            None => errors.push(EntryError::MissingNameValue { index }),
        }
    }

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for entry in &entries {
        match first_seen.get(entry.name.as_str()) {
            Some(&first) => errors.push(EntryError::DuplicateNameValue {
                index: entry.index,
                first,
                name: entry.name.clone(),
            }),
            None => {
                first_seen.insert(&entry.name, entry.index);
            }
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(EntryError::index);
        tracing::debug!(errors = errors.len(), "table has invalid entries");
        return Err(TableError::Entries(errors));
    }
    tracing::debug!(entries = entries.len(), "table validated");
    Ok(entries)
}

/// The `Name` of one row: `Ok(None)` when it is empty, `Err` when the row is malformed.
fn entry_name(index: usize, row: &Value) -> Result<Option<String>, TableError> {
    let Value::Record { type_name, .. } = row.resolve() else {
        return Err(TableError::InvalidElementType {
            index,
            found: row.type_name(),
        });
    };
    let Some(field) = row.resolve().field(NAME_FIELD) else {
        return Err(TableError::MissingNameField {
            index,
            type_name: type_name.clone(),
        });
    };
    match field.value.resolve() {
        Value::Text(name) if name.is_empty() => Ok(None),
        Value::Text(name) => Ok(Some(name.clone())),
        other => Err(TableError::NonStringNameField {
            index,
            type_name: type_name.clone(),
            found: other.type_name(),
        }),
    }
}

/// Validates `table` and runs `body(assert, index)` in one named sub-test per entry.
///
/// A validation error fails the calling test through [`TestHandle::fatal`] before
/// any sub-test starts.
pub fn run<T: Inspect + ?Sized>(
    handle: &dyn TestHandle,
    table: &T,
    body: impl FnMut(&Assert<'_>, usize),
) {
    run_with_config(handle, table, CompareConfig::default(), body);
}

pub(crate) fn run_with_config<T: Inspect + ?Sized>(
    handle: &dyn TestHandle,
    table: &T,
    config: CompareConfig,
    mut body: impl FnMut(&Assert<'_>, usize),
) {
    handle.helper();
    let entries = match build(table) {
        Ok(entries) => entries,
        Err(err) => handle.fatal(&err.report()),
    };
    for entry in &entries {
        tracing::trace!(test = handle.name(), entry = %entry.name, index = entry.index, "starting entry");
        handle.run(&entry.name, &mut |t: &dyn TestHandle| {
            body(&Assert::with_config(t, config), entry.index)
        });
    }
}
