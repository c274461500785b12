//! Sparrow inheritance helpers
//!
//! Classical and prototypal inheritance over a small dynamic record model:
//! - Records: string-keyed fields plus an explicit delegate link
//! - Classical create: copy a parent's fields, carry over its delegate
//! - Prototypal bind: make an existing record the delegate of a new one
//! - Delegate table: identifier → delegate, so delegates can be found again
//! - Counted maps: records whose delegate tracks how many keys they hold
//!
//! ```
//! use sparrow_inherit::{InheritanceEngine, Record, Value};
//!
//! let mut engine = InheritanceEngine::new();
//! let parent = engine.insert(Record::new().with("name", "john")).unwrap();
//! let spec = engine.insert(Record::new().with("age", 28)).unwrap();
//!
//! let child = engine.classical_create(parent, Some(spec), true).unwrap();
//! assert_eq!(engine.record(child).unwrap().field_names(), vec!["age", "name"]);
//! assert!(!engine.get_delegate(child).unwrap().is_root());
//! assert_eq!(engine.get(child, "name").unwrap(), Some(&Value::from("john")));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod arena;
pub mod engine;
pub mod global;
pub mod id;
pub mod map;
pub mod record;
pub mod table;
pub mod value;

pub use arena::{EngineId, RecordArena, RecordId};
pub use engine::{
    BindKind, ChainKind, Delegate, EngineOptions, EngineStats, InheritanceEngine, ProtoRefPolicy,
};
pub use id::{IdGenerator, IdOptions};
pub use record::Record;
pub use table::DelegateTable;
pub use value::{Builtin, NativeFn, Value};

/// Inheritance errors
#[derive(Debug, thiserror::Error)]
pub enum InheritError {
    /// Argument is not a live record of this engine, or has the wrong shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No unused identifier could be produced or honored
    #[error("Identifier collision: {0}")]
    IdentifierCollision(String),

    /// Method call on a missing or non-callable field
    #[error("Not callable: {0}")]
    NotCallable(String),

    /// Record limit reached
    #[error("Record limit of {limit} exceeded")]
    RecordLimitExceeded {
        /// Configured maximum
        limit: usize,
    },
}

/// Inheritance result
pub type InheritResult<T> = Result<T, InheritError>;
