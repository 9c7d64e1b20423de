//! Verdict: fluent assertions and table-driven sub-tests.
//!
//! - [`chain`]: `Assert` / `Chain`, the assertion engine.
//! - [`table`]: validation and execution of table-driven sub-tests.
//! - [`host`]: the `TestHandle` contract and a reference runner.
//! - [`value`], [`format`], [`compare`], [`fault`]: introspection, rendering,
//!   structural equality and error matching underneath the assertions.

pub use crate::chain::{Assert, Chain};
pub use crate::compare::CompareConfig;
pub use crate::failure::Failure;
pub use crate::fault::{error_of, ErrorValue, Fault, Structure};
pub use crate::host::{HostConfig, Outcome, Status, TestContext, TestHandle};
pub use crate::table::{EntryError, TableEntry, TableError};
pub use crate::value::{Inspect, Record, Value};

pub mod chain;
pub mod compare;
pub mod failure;
pub mod fault;
pub mod format;
pub mod host;
pub mod table;
pub mod value;

/// Everything a test module usually needs.
pub mod prelude {
    pub use crate::chain::{Assert, Chain};
    pub use crate::fault::{error_of, ErrorValue, Fault, Structure};
    pub use crate::host::{self, TestHandle};
    pub use crate::table;
    pub use crate::value::{Inspect, Record, Value};
}
