//! Records: string-keyed field maps with an optional delegate

use crate::arena::RecordId;
use crate::value::Value;
use rustc_hash::FxHashMap;

/// A structured object value
///
/// Besides the user fields a record carries two bookkeeping slots, kept out of
/// the field map so they never show up among the own fields:
///
/// - `proto_ref`: key into the delegate table
/// - `class_chain`: marker set on standard prototypes built by `classical_create`
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: FxHashMap<String, Value>,
    delegate: Option<RecordId>,
    proto_ref: Option<String>,
    class_chain: bool,
}

impl Record {
    /// Create an empty record with no delegate
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builder-style `proto_ref` assignment
    pub fn with_proto_ref(mut self, proto_ref: impl Into<String>) -> Self {
        self.proto_ref = Some(proto_ref.into());
        self
    }

    /// Builder-style class-chain marker
    ///
    /// A record marked this way owns the marker instead of inheriting it, so
    /// the engine does not treat it as one of its own products.
    pub fn with_class_chain(mut self) -> Self {
        self.class_chain = true;
        self
    }

    /// Insert or replace an own field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove an own field
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Own field by name
    pub fn get_own(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether the field is set directly on this record
    pub fn has_own(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over own fields in unspecified order
    pub fn own_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Own field names, sorted
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of own fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no own fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Direct delegate link
    pub fn delegate(&self) -> Option<RecordId> {
        self.delegate
    }

    /// Own `proto_ref` slot
    pub fn proto_ref(&self) -> Option<&str> {
        self.proto_ref.as_deref()
    }

    /// Whether this record owns the class-chain marker
    pub fn is_class_chain(&self) -> bool {
        self.class_chain
    }

    /// Shallow copy of `other`'s own fields over this record's; `other` wins.
    pub(crate) fn merge_fields_from(&mut self, other: &Record) {
        for (name, value) in &other.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }

    pub(crate) fn set_delegate(&mut self, delegate: Option<RecordId>) {
        self.delegate = delegate;
    }

    pub(crate) fn set_proto_ref(&mut self, proto_ref: String) {
        self.proto_ref = Some(proto_ref);
    }
}
