//! Counted maps
//!
//! A counted map is a record bound prototypally to a metadata record holding
//! `count`, the number of keys the map owns. Keys must go through
//! [`InheritanceEngine::map_set`] and [`InheritanceEngine::map_remove`] for
//! the count to stay accurate.

use crate::arena::RecordId;
use crate::engine::InheritanceEngine;
use crate::record::Record;
use crate::value::Value;
use crate::{InheritError, InheritResult};

const COUNT: &str = "count";

impl InheritanceEngine {
    /// Create a counted map holding a copy of `spec`'s own fields
    pub fn create_map(&mut self, spec: RecordId) -> InheritResult<RecordId> {
        let count = self.record(spec)?.len();
        // Metadata record plus the bound map.
        self.ensure_capacity(2)?;
        let meta = self.insert(Record::new().with(COUNT, count as f64))?;
        self.prototypal_bind(meta, spec)
    }

    /// Set `key`, bumping the count when the key is new
    pub fn map_set(
        &mut self,
        map: RecordId,
        key: &str,
        value: impl Into<Value>,
    ) -> InheritResult<()> {
        let (meta, count) = self.map_meta(map)?;
        let added = !self.has_own(map, key)?;
        self.set(map, key, value)?;
        if added {
            self.set(meta, COUNT, count + 1.0)?;
        }
        Ok(())
    }

    /// Remove `key`, returning whether it was present
    pub fn map_remove(&mut self, map: RecordId, key: &str) -> InheritResult<bool> {
        let (meta, count) = self.map_meta(map)?;
        if self.delete(map, key)?.is_none() {
            return Ok(false);
        }
        self.set(meta, COUNT, (count - 1.0).max(0.0))?;
        Ok(true)
    }

    /// Number of keys the map holds
    pub fn map_count(&self, map: RecordId) -> InheritResult<usize> {
        let (_, count) = self.map_meta(map)?;
        Ok(count as usize)
    }

    fn map_meta(&self, map: RecordId) -> InheritResult<(RecordId, f64)> {
        let not_a_map = || InheritError::InvalidArgument(format!("{} is not a counted map", map));
        let meta = self.get_delegate(map)?.as_record().ok_or_else(not_a_map)?;
        let count = self
            .record(meta)?
            .get_own(COUNT)
            .and_then(Value::as_number)
            .ok_or_else(not_a_map)?;
        Ok((meta, count))
    }
}
