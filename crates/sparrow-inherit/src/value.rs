//! Field values
//!
//! Values are cheap to clone. Cloning a [`Value::Record`] copies the handle,
//! not the record, so a record stored in two places is the same record.

use crate::arena::RecordId;
use crate::engine::InheritanceEngine;
use std::fmt;
use std::sync::Arc;

/// Signature of a host function stored in a record field
///
/// Receives the engine (read-only), the receiver record and the call arguments.
pub type NativeFnPtr = dyn Fn(&InheritanceEngine, RecordId, &[Value]) -> Value + Send + Sync;

/// Host function value
#[derive(Clone)]
pub struct NativeFn(Arc<NativeFnPtr>);

impl NativeFn {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&InheritanceEngine, RecordId, &[Value]) -> Value + Send + Sync + 'static,
    {
        NativeFn(Arc::new(f))
    }

    /// Invoke the function
    pub fn call(&self, engine: &InheritanceEngine, receiver: RecordId, args: &[Value]) -> Value {
        (self.0)(engine, receiver, args)
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({:p})", Arc::as_ptr(&self.0))
    }
}

/// Engine-provided methods installed on standard prototypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `getDelegate()`: the receiver's delegate, `null` when it has none
    GetDelegate,
    /// `create(spec?, copyDelegate?)`: classical create from the receiver
    Create,
}

impl Builtin {
    /// Field name the builtin is installed under
    pub fn field_name(&self) -> &'static str {
        match self {
            Builtin::GetDelegate => "getDelegate",
            Builtin::Create => "create",
        }
    }
}

/// A record field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// String
    Str(String),
    /// Handle to a record in the same engine
    Record(RecordId),
    /// Host function
    Function(NativeFn),
    /// Engine builtin method
    Builtin(Builtin),
}

impl Value {
    /// Wrap a closure as a function value
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&InheritanceEngine, RecordId, &[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Function(NativeFn::new(f))
    }

    /// Short type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Record(_) => "record",
            Value::Function(_) | Value::Builtin(_) => "function",
        }
    }

    /// Record handle, if this is a record
    pub fn as_record(&self) -> Option<RecordId> {
        match self {
            Value::Record(id) => Some(*id),
            _ => None,
        }
    }

    /// Number, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrowed string, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean, if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True for host functions and builtins
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Record(id) => write!(f, "{}", id),
            Value::Function(_) => write!(f, "[function]"),
            Value::Builtin(b) => write!(f, "[builtin {}]", b.field_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::Record(id)
    }
}
