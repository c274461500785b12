//! Record arena
//!
//! Records live in a flat vector owned by one engine and are addressed by
//! [`RecordId`]. Delegate links are ids into the same arena, and a delegate
//! must already exist when a record pointing at it is allocated, so every
//! chain is acyclic and ends at a record with no delegate.

use crate::record::Record;
use crate::value::Value;
use crate::{InheritError, InheritResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an engine's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    /// Create a new unique engine ID
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        EngineId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a record inside a specific engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    engine: EngineId,
    index: u32,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record#{}:{}", self.engine.as_u64(), self.index)
    }
}

/// Storage for all records of one engine
#[derive(Debug)]
pub struct RecordArena {
    engine: EngineId,
    records: Vec<Record>,
    /// Maximum number of records (None = unlimited)
    max_records: Option<usize>,
}

impl RecordArena {
    /// Create an empty arena
    pub fn new(max_records: Option<usize>) -> Self {
        Self {
            engine: EngineId::new(),
            records: Vec::new(),
            max_records,
        }
    }

    /// Identity of the arena; changes on [`RecordArena::clear`]
    pub fn engine_id(&self) -> EngineId {
        self.engine
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record has been allocated
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail unless `additional` more records fit under the limit
    pub fn ensure_capacity(&self, additional: usize) -> InheritResult<()> {
        if let Some(limit) = self.max_records {
            if self.records.len() + additional > limit {
                return Err(InheritError::RecordLimitExceeded { limit });
            }
        }
        Ok(())
    }

    /// Store a record and return its handle
    ///
    /// The record's delegate, if any, must be a live record of this arena.
    pub fn alloc(&mut self, record: Record) -> InheritResult<RecordId> {
        self.ensure_capacity(1)?;
        if let Some(delegate) = record.delegate() {
            self.check(delegate)?;
        }
        let index = u32::try_from(self.records.len())
            .map_err(|_| InheritError::RecordLimitExceeded { limit: u32::MAX as usize })?;
        self.records.push(record);
        Ok(RecordId {
            engine: self.engine,
            index,
        })
    }

    /// Validate that `id` names a live record of this arena
    pub fn check(&self, id: RecordId) -> InheritResult<()> {
        self.get(id).map(|_| ())
    }

    /// Borrow a record
    pub fn get(&self, id: RecordId) -> InheritResult<&Record> {
        if id.engine != self.engine {
            return Err(InheritError::InvalidArgument(format!(
                "{} belongs to another engine",
                id
            )));
        }
        self.records
            .get(id.index as usize)
            .ok_or_else(|| InheritError::InvalidArgument(format!("{} is not a live record", id)))
    }

    /// Mutably borrow a record
    pub fn get_mut(&mut self, id: RecordId) -> InheritResult<&mut Record> {
        self.check(id)?;
        self.records
            .get_mut(id.index as usize)
            .ok_or_else(|| InheritError::InvalidArgument(format!("{} is not a live record", id)))
    }

    /// Walk `id` and its delegates, nearest first
    pub fn chain(&self, id: RecordId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(id),
        }
    }

    /// Field lookup: own fields first, then the delegate chain
    pub fn lookup(&self, id: RecordId, name: &str) -> Option<&Value> {
        self.chain(id).find_map(|record| record.get_own(name))
    }

    /// Nearest `proto_ref` along the chain
    pub fn resolve_proto_ref(&self, id: RecordId) -> Option<&str> {
        self.chain(id).find_map(Record::proto_ref)
    }

    /// True when the class-chain marker is found on a delegate but not on
    /// the record itself.
    pub fn inherits_class_chain(&self, id: RecordId) -> bool {
        let mut chain = self.chain(id);
        match chain.next() {
            Some(own) if !own.is_class_chain() => chain.any(Record::is_class_chain),
            _ => false,
        }
    }

    /// Drop every record and take a new identity, invalidating old handles
    pub fn clear(&mut self) {
        self.records.clear();
        self.engine = EngineId::new();
    }
}

/// Iterator over a delegate chain
pub struct Chain<'a> {
    arena: &'a RecordArena,
    next: Option<RecordId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let record = self.arena.get(id).ok()?;
        self.next = record.delegate();
        Some(record)
    }
}
