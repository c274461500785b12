//! Inheritance engine
//!
//! Owns the record arena, the delegate table and the identifier generator,
//! and implements the two ways of deriving a record from another one:
//!
//! - [`InheritanceEngine::classical_create`] copies the parent's own fields
//!   and carries its delegate over (or synthesizes a standard prototype).
//! - [`InheritanceEngine::prototypal_bind`] makes an existing record the
//!   delegate of a new one.
//!
//! Both register the delegate in the table so that
//! [`InheritanceEngine::get_delegate`] can find it again from the record's
//! `proto_ref`.

use crate::arena::{EngineId, RecordArena, RecordId};
use crate::id::{IdGenerator, IdOptions};
use crate::record::Record;
use crate::table::DelegateTable;
use crate::value::{Builtin, Value};
use crate::{InheritError, InheritResult};

/// Result of a delegate lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegate {
    /// No delegate was ever attached
    Root,
    /// The delegate record
    Record(RecordId),
}

impl Delegate {
    /// True for the root sentinel
    pub fn is_root(&self) -> bool {
        matches!(self, Delegate::Root)
    }

    /// The delegate record, if any
    pub fn as_record(&self) -> Option<RecordId> {
        match self {
            Delegate::Root => None,
            Delegate::Record(id) => Some(*id),
        }
    }
}

impl From<Delegate> for Value {
    fn from(delegate: Delegate) -> Self {
        match delegate {
            Delegate::Root => Value::Null,
            Delegate::Record(id) => Value::Record(id),
        }
    }
}

/// Where `prototypal_bind` takes the table key from when binding a plain
/// delegate directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtoRefPolicy {
    /// Always generate a fresh identifier
    #[default]
    AlwaysFresh,
    /// Use the child spec's own `proto_ref` when it has one
    ///
    /// Two binds sharing a hand-picked identifier for different delegates are
    /// rejected instead of aliasing.
    HonorCaller,
}

/// How `classical_create` links the new record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// Share the parent's current delegate through an intermediate record
    Nested {
        /// The parent's current delegate
        delegate: RecordId,
    },
    /// Synthesize a new standard prototype
    Fresh,
}

/// How `prototypal_bind` links the new record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindKind {
    /// Delegate is an engine product; go through an intermediate record
    Nested,
    /// Delegate is a plain record; link it directly
    Direct,
}

/// Options for creating an engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Identifier generator settings
    pub ids: IdOptions,

    /// Identifiers to try before giving up on a collision
    pub max_id_attempts: usize,

    /// Key policy for direct prototypal binds
    pub proto_ref_policy: ProtoRefPolicy,

    /// Maximum number of records (None = unlimited)
    pub max_records: Option<usize>,

    /// Seed for the identifier suffix RNG (None = entropy)
    pub id_seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ids: IdOptions::default(),
            max_id_attempts: 3,
            proto_ref_policy: ProtoRefPolicy::default(),
            max_records: None,
            id_seed: None,
        }
    }
}

impl EngineOptions {
    /// Options with a record limit
    pub fn with_record_limit(max_records: usize) -> Self {
        Self {
            max_records: Some(max_records),
            ..Default::default()
        }
    }

    /// Options with a proto_ref policy
    pub fn with_policy(proto_ref_policy: ProtoRefPolicy) -> Self {
        Self {
            proto_ref_policy,
            ..Default::default()
        }
    }
}

/// Engine statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Records in the arena
    pub records: usize,
    /// Entries in the delegate table
    pub delegates: usize,
}

/// Record store plus the classical/prototypal inheritance operations
#[derive(Debug)]
pub struct InheritanceEngine {
    options: EngineOptions,
    ids: IdGenerator,
    table: DelegateTable,
    arena: RecordArena,
}

impl InheritanceEngine {
    /// Create an engine with default options
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Create an engine with custom options
    pub fn with_options(options: EngineOptions) -> Self {
        let ids = match options.id_seed {
            Some(seed) => IdGenerator::with_seed(options.ids, seed),
            None => IdGenerator::with_options(options.ids),
        };
        Self {
            ids,
            table: DelegateTable::new(),
            arena: RecordArena::new(options.max_records),
            options,
        }
    }

    /// Options this engine was built with
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Current arena identity
    pub fn id(&self) -> EngineId {
        self.arena.engine_id()
    }

    /// Record and table sizes
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            records: self.arena.len(),
            delegates: self.table.len(),
        }
    }

    /// Drop every record and table entry
    ///
    /// Handles issued before the reset are rejected afterwards.
    pub fn reset(&mut self) {
        tracing::warn!(
            records = self.arena.len(),
            delegates = self.table.len(),
            "resetting inheritance engine"
        );
        self.arena.clear();
        self.table.clear();
    }

    // ===== Records =====

    /// Store a user-built record
    pub fn insert(&mut self, record: Record) -> InheritResult<RecordId> {
        for (_, value) in record.own_fields() {
            self.check_value(value)?;
        }
        self.arena.alloc(record)
    }

    /// Borrow a record
    pub fn record(&self, id: RecordId) -> InheritResult<&Record> {
        self.arena.get(id)
    }

    /// Field lookup through the delegate chain
    pub fn get(&self, id: RecordId, name: &str) -> InheritResult<Option<&Value>> {
        self.arena.check(id)?;
        Ok(self.arena.lookup(id, name))
    }

    /// Whether the field resolves on the record or any delegate
    pub fn has_field(&self, id: RecordId, name: &str) -> InheritResult<bool> {
        Ok(self.get(id, name)?.is_some())
    }

    /// Whether the field is an own field
    pub fn has_own(&self, id: RecordId, name: &str) -> InheritResult<bool> {
        Ok(self.arena.get(id)?.has_own(name))
    }

    /// Write an own field, returning the previous own value
    pub fn set(
        &mut self,
        id: RecordId,
        name: &str,
        value: impl Into<Value>,
    ) -> InheritResult<Option<Value>> {
        let value = value.into();
        self.check_value(&value)?;
        Ok(self.arena.get_mut(id)?.insert(name, value))
    }

    /// Remove an own field
    pub fn delete(&mut self, id: RecordId, name: &str) -> InheritResult<Option<Value>> {
        Ok(self.arena.get_mut(id)?.remove(name))
    }

    /// Fail unless `additional` more records fit under the record limit
    pub(crate) fn ensure_capacity(&self, additional: usize) -> InheritResult<()> {
        self.arena.ensure_capacity(additional)
    }

    /// Record handles stored in values must come from this engine
    fn check_value(&self, value: &Value) -> InheritResult<()> {
        match value {
            Value::Record(id) => self.arena.check(*id),
            _ => Ok(()),
        }
    }

    // ===== Delegates =====

    /// Delegate registered under the record's (own or inherited) `proto_ref`
    ///
    /// A record with no delegate link is at the end of its chain and always
    /// reports [`Delegate::Root`], even when it owns a `proto_ref`.
    pub fn get_delegate(&self, id: RecordId) -> InheritResult<Delegate> {
        if self.arena.get(id)?.delegate().is_none() {
            return Ok(Delegate::Root);
        }
        let delegate = self
            .arena
            .resolve_proto_ref(id)
            .and_then(|proto_ref| self.table.get(proto_ref));
        Ok(match delegate {
            Some(delegate) => Delegate::Record(delegate),
            None => Delegate::Root,
        })
    }

    /// Decide how `classical_create` would link a record derived from `parent`
    pub fn chain_kind(&self, parent: RecordId, copy_delegate: bool) -> InheritResult<ChainKind> {
        let current = self.get_delegate(parent)?;
        if !copy_delegate || !self.arena.inherits_class_chain(parent) {
            return Ok(ChainKind::Fresh);
        }
        let has_accessor = self
            .arena
            .lookup(parent, Builtin::GetDelegate.field_name())
            .map_or(false, Value::is_callable);
        Ok(match current {
            Delegate::Record(delegate) if has_accessor => ChainKind::Nested { delegate },
            _ => ChainKind::Fresh,
        })
    }

    /// Decide how `prototypal_bind` would link a record to `delegate`
    pub fn bind_kind(&self, delegate: RecordId) -> InheritResult<BindKind> {
        self.arena.check(delegate)?;
        Ok(if self.arena.inherits_class_chain(delegate) {
            BindKind::Nested
        } else {
            BindKind::Direct
        })
    }

    /// Classical inheritance
    ///
    /// The new record owns a shallow copy of `parent`'s own fields overlaid
    /// with `child`'s own fields. When `parent` came out of this engine and
    /// `copy_delegate` is set, the new record shares `parent`'s delegate;
    /// otherwise it gets a fresh standard prototype exposing `getDelegate` and
    /// `create`.
    pub fn classical_create(
        &mut self,
        parent: RecordId,
        child: Option<RecordId>,
        copy_delegate: bool,
    ) -> InheritResult<RecordId> {
        self.arena.check(parent)?;
        if let Some(child) = child {
            self.arena.check(child)?;
        }
        let kind = self.chain_kind(parent, copy_delegate)?;
        self.arena.ensure_capacity(2)?;
        let proto_ref = self.fresh_id()?;

        let mut base = Record::new();
        base.merge_fields_from(self.arena.get(parent)?);
        if let Some(child) = child {
            base.merge_fields_from(self.arena.get(child)?);
        }

        let link = match kind {
            ChainKind::Nested { delegate } => self.link_through(&proto_ref, delegate)?,
            ChainKind::Fresh => self.standard_prototype(&proto_ref)?,
        };
        base.set_delegate(Some(link));
        let id = self.arena.alloc(base)?;

        tracing::debug!(record = %id, parent = %parent, ?kind, %proto_ref, "classical create");
        Ok(id)
    }

    /// Prototypal inheritance
    ///
    /// The new record owns a copy of `child`'s own fields and delegates to
    /// `delegate`, through an intermediate record when `delegate` is itself an
    /// engine product.
    pub fn prototypal_bind(
        &mut self,
        delegate: RecordId,
        child: RecordId,
    ) -> InheritResult<RecordId> {
        self.arena.check(child)?;
        let kind = self.bind_kind(delegate)?;

        let mut record = Record::new();
        record.merge_fields_from(self.arena.get(child)?);

        let proto_ref = match kind {
            BindKind::Nested => {
                self.arena.ensure_capacity(2)?;
                let proto_ref = self.fresh_id()?;
                let link = self.link_through(&proto_ref, delegate)?;
                record.set_delegate(Some(link));
                proto_ref
            }
            BindKind::Direct => {
                self.arena.ensure_capacity(1)?;
                let proto_ref = self.direct_proto_ref(child, delegate)?;
                if !self.table.contains(&proto_ref) {
                    let fresh = self.table.register(&proto_ref, delegate);
                    debug_assert!(fresh);
                }
                record.set_proto_ref(proto_ref.clone());
                record.set_delegate(Some(delegate));
                proto_ref
            }
        };
        let id = self.arena.alloc(record)?;

        tracing::debug!(record = %id, delegate = %delegate, ?kind, %proto_ref, "prototypal bind");
        Ok(id)
    }

    /// Call a method found on `receiver` or its delegates
    ///
    /// `create` takes an optional record spec and an optional copy flag (only
    /// an explicit `false` disables delegate copying). `getDelegate` returns
    /// `null` for the root sentinel.
    pub fn call_method(
        &mut self,
        receiver: RecordId,
        name: &str,
        args: &[Value],
    ) -> InheritResult<Value> {
        self.arena.check(receiver)?;
        let method = self
            .arena
            .lookup(receiver, name)
            .cloned()
            .ok_or_else(|| {
                InheritError::NotCallable(format!("{} has no field `{}`", receiver, name))
            })?;

        match method {
            Value::Builtin(Builtin::GetDelegate) => Ok(self.get_delegate(receiver)?.into()),
            Value::Builtin(Builtin::Create) => {
                let spec = match args.first() {
                    None | Some(Value::Null) => None,
                    Some(Value::Record(id)) => Some(*id),
                    Some(other) => {
                        return Err(InheritError::InvalidArgument(format!(
                            "create expects a record spec, got {}",
                            other.type_name()
                        )))
                    }
                };
                let copy_delegate = !matches!(args.get(1), Some(Value::Bool(false)));
                Ok(Value::Record(self.classical_create(receiver, spec, copy_delegate)?))
            }
            Value::Function(f) => Ok(f.call(self, receiver, args)),
            other => Err(InheritError::NotCallable(format!(
                "`{}` is a {}",
                name,
                other.type_name()
            ))),
        }
    }

    // ===== Construction helpers =====

    /// Identifier not yet used as a table key
    fn fresh_id(&mut self) -> InheritResult<String> {
        let attempts = self.options.max_id_attempts.max(1);
        for attempt in 1..=attempts {
            let id = self.ids.next_id();
            if !self.table.contains(&id) {
                return Ok(id);
            }
            tracing::warn!(%id, attempt, "identifier collision, regenerating");
        }
        Err(InheritError::IdentifierCollision(format!(
            "no free identifier after {} attempts",
            attempts
        )))
    }

    /// Key for a direct bind under the configured policy
    fn direct_proto_ref(&mut self, child: RecordId, delegate: RecordId) -> InheritResult<String> {
        if self.options.proto_ref_policy == ProtoRefPolicy::HonorCaller {
            if let Some(supplied) = self.arena.get(child)?.proto_ref() {
                return match self.table.get(supplied) {
                    Some(existing) if existing != delegate => {
                        Err(InheritError::IdentifierCollision(format!(
                            "proto_ref `{}` already names {}",
                            supplied, existing
                        )))
                    }
                    _ => Ok(supplied.to_string()),
                };
            }
        }
        self.fresh_id()
    }

    /// Intermediate `{proto_ref}` record delegating to `delegate`, with
    /// `delegate` registered under `proto_ref`
    fn link_through(&mut self, proto_ref: &str, delegate: RecordId) -> InheritResult<RecordId> {
        let mut intermediate = Record::new().with_proto_ref(proto_ref);
        intermediate.set_delegate(Some(delegate));
        let link = self.arena.alloc(intermediate)?;
        let fresh = self.table.register(proto_ref, delegate);
        debug_assert!(fresh, "proto_ref `{}` registered twice", proto_ref);
        Ok(link)
    }

    /// Standard prototype carrying the class-chain marker and the builtins,
    /// registered under its own `proto_ref`
    fn standard_prototype(&mut self, proto_ref: &str) -> InheritResult<RecordId> {
        let prototype = Record::new()
            .with(
                Builtin::GetDelegate.field_name(),
                Value::Builtin(Builtin::GetDelegate),
            )
            .with(Builtin::Create.field_name(), Value::Builtin(Builtin::Create))
            .with_proto_ref(proto_ref)
            .with_class_chain();
        let link = self.arena.alloc(prototype)?;
        let fresh = self.table.register(proto_ref, link);
        debug_assert!(fresh, "proto_ref `{}` registered twice", proto_ref);
        Ok(link)
    }
}

impl Default for InheritanceEngine {
    fn default() -> Self {
        Self::new()
    }
}
