//! Error values and "is-a" matching.
//!
//! Errors enter assertions as [`ErrorValue`], a cheap shared handle around any type
//! implementing [`Fault`]. `Fault` is the capability interface an error type opts into:
//! every method has a default, so `impl Fault for MyError {}` is enough for plain
//! equality matching. Types can additionally declare equivalence to other errors,
//! expose a typed wrap chain, or describe themselves with the kind/message/parameters
//! convention used for structured rendering.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::format;
use crate::value::Value;

/// Longest wrap chain walked before giving up; guards against cyclic `source()` links.
const MAX_CHAIN: usize = 64;

/// An error type that can take part in error assertions.
pub trait Fault: Error + Send + Sync + 'static {
    /// Declares this error equivalent to `target` even when the two are not equal.
    fn satisfies_equivalence(&self, _target: &ErrorValue) -> bool {
        false
    }

    /// The kind/message/parameters description of this error, if it follows that
    /// convention.
    fn structure(&self) -> Option<Structure> {
        None
    }

    /// The next link of the wrap chain when it is itself a [`Fault`].
    ///
    /// When this returns `None` the chain continues through [`Error::source`], whose
    /// links only take part in plain equality.
    fn wrapped(&self) -> Option<&dyn Fault> {
        None
    }
}

/// Structured description of an error.
#[derive(Debug, Clone)]
pub struct Structure {
    pub kind: String,
    pub message: String,
    pub parameters: Vec<(String, Value)>,
}

impl Structure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.push((name.into(), value));
        self
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "kind: {}", self.kind)?;
        writeln!(f, "message: {}", self.message)?;
        if self.parameters.is_empty() {
            return write!(f, "parameters: (none)");
        }
        write!(f, "parameters:")?;
        for (name, value) in &self.parameters {
            write!(f, "\n    {}: {}", name, format::plain(value))?;
        }
        Ok(())
    }
}

/// A shared handle to an error under test.
#[derive(Clone)]
pub struct ErrorValue(Arc<dyn Fault>);

impl ErrorValue {
    pub fn new(error: impl Fault) -> Self {
        Self(Arc::new(error))
    }

    pub fn get(&self) -> &dyn Fault {
        &*self.0
    }

    pub fn message(&self) -> String {
        self.0.to_string()
    }

    /// Renders the structured form when the error provides one, else the message.
    pub fn render(&self) -> String {
        match self.0.structure() {
            Some(structure) => structure.to_string(),
            None => self.message(),
        }
    }

    /// Is-a matching: true if `target` equals any link of this error's wrap chain, or
    /// any link declares itself equivalent to `target`.
    ///
    /// Two links are equal when they are the same allocation or render identically
    /// with `Debug`.
    pub fn is(&self, target: &ErrorValue) -> bool {
        let target_addr = Arc::as_ptr(&target.0) as *const ();
        let target_debug = format!("{:?}", target.0);
        self.links().into_iter().any(|link| {
            link.addr() == target_addr
                || link.debug() == target_debug
                || matches!(link, Link::Fault(f) if f.satisfies_equivalence(target))
        })
    }

    fn links(&self) -> Vec<Link<'_>> {
        let mut links = Vec::new();
        let mut current = Link::Fault(self.get());
        loop {
            links.push(current);
            let next = match current {
                Link::Fault(f) => match f.wrapped() {
                    Some(inner) => Some(Link::Fault(inner)),
                    None => f.source().map(Link::Plain),
                },
                Link::Plain(e) => e.source().map(Link::Plain),
            };
            match next {
                Some(next) if links.len() < MAX_CHAIN => current = next,
                _ => break,
            }
        }
        links
    }
}

#[derive(Clone, Copy)]
enum Link<'a> {
    Fault(&'a dyn Fault),
    Plain(&'a (dyn Error + 'static)),
}

impl Link<'_> {
    fn addr(&self) -> *const () {
        match *self {
            Link::Fault(f) => f as *const dyn Fault as *const (),
            Link::Plain(e) => e as *const dyn Error as *const (),
        }
    }

    fn debug(&self) -> String {
        match self {
            Link::Fault(f) => format!("{f:?}"),
            Link::Plain(e) => format!("{e:?}"),
        }
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl<E: Fault> From<E> for ErrorValue {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// The error of `result` as an [`ErrorValue`], or `None` on success.
pub fn error_of<T, E: Fault>(result: Result<T, E>) -> Option<ErrorValue> {
    result.err().map(ErrorValue::new)
}

impl Fault for std::io::Error {}
impl Fault for std::fmt::Error {}
impl Fault for std::num::ParseIntError {}
impl Fault for std::num::ParseFloatError {}
impl Fault for std::str::Utf8Error {}
impl Fault for std::string::FromUtf8Error {}
impl Fault for regex::Error {}
