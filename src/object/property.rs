//! Property slots and the selector-keyed tables that hold them.
//!
//! A [`Property`] pairs a getter with an optional setter. Settability is
//! purely structural: a slot is settable exactly when it was built with a
//! setter, and the dispatch layer never needs to special-case individual
//! selectors. Mutable scalar slots are backed by shared atomic cells so the
//! owning object and the accessor closures observe the same state without
//! ownership cycles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use crate::Result;
use crate::types::{PropertyValue, Selector};

/// How a property produces its current value.
pub enum ReadAccessor {
    /// Value fixed at object construction.
    Fixed(PropertyValue),
    /// Value computed on demand from shared state.
    Computed(Box<dyn Fn() -> PropertyValue + Send + Sync>),
}

/// Applies a decoded value to the owning object's state.
pub type WriteAccessor = Box<dyn Fn(PropertyValue) + Send + Sync>;

/// One property slot: a getter plus an optional setter.
pub struct Property {
    read: ReadAccessor,
    write: Option<WriteAccessor>,
}

impl Property {
    /// Read-only slot with a value fixed at construction.
    pub fn fixed(value: impl Into<PropertyValue>) -> Self {
        Self { read: ReadAccessor::Fixed(value.into()), write: None }
    }

    /// Read-only slot whose value is computed on each read.
    pub fn computed<G>(getter: G) -> Self
    where
        G: Fn() -> PropertyValue + Send + Sync + 'static,
    {
        Self { read: ReadAccessor::Computed(Box::new(getter)), write: None }
    }

    /// Settable slot with explicit getter and setter.
    pub fn read_write<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn() -> PropertyValue + Send + Sync + 'static,
        S: Fn(PropertyValue) + Send + Sync + 'static,
    {
        Self {
            read: ReadAccessor::Computed(Box::new(getter)),
            write: Some(Box::new(setter)),
        }
    }

    /// Settable u32 slot backed by a shared atomic cell.
    pub fn shared_u32(cell: Arc<AtomicU32>) -> Self {
        let read_cell = Arc::clone(&cell);
        Self::read_write(
            move || PropertyValue::UInt32(read_cell.load(Ordering::Acquire)),
            move |value| {
                if let Some(v) = value.as_u32() {
                    cell.store(v, Ordering::Release);
                }
            },
        )
    }

    /// Settable i32 slot backed by a shared atomic cell.
    pub fn shared_i32(cell: Arc<AtomicI32>) -> Self {
        let read_cell = Arc::clone(&cell);
        Self::read_write(
            move || PropertyValue::Int32(read_cell.load(Ordering::Acquire)),
            move |value| {
                if let Some(v) = value.as_i32() {
                    cell.store(v, Ordering::Release);
                }
            },
        )
    }

    /// Whether this slot accepts writes.
    pub fn is_settable(&self) -> bool {
        self.write.is_some()
    }

    /// The slot's current value.
    pub fn value(&self) -> PropertyValue {
        match &self.read {
            ReadAccessor::Fixed(value) => value.clone(),
            ReadAccessor::Computed(getter) => getter(),
        }
    }

    /// Serialized size of the current value in bytes.
    ///
    /// Sizes are a function of the value's type, so this is stable across
    /// reads even for computed slots.
    pub fn data_size(&self) -> usize {
        self.value().wire_size()
    }

    /// Encode the current value into `dest`, returning the bytes written.
    pub fn read_into(&self, dest: &mut [u8]) -> Result<usize> {
        self.value().encode_into(dest)
    }

    /// Decode `src` and apply it through the setter.
    ///
    /// Silent no-op for read-only slots. The decode type is taken from the
    /// slot's current value, so a settable slot always round-trips its own
    /// wire shape.
    pub fn write_from(&self, src: &[u8]) -> Result<()> {
        let Some(setter) = &self.write else {
            return Ok(());
        };
        let value = PropertyValue::decode(self.value().property_type(), src)?;
        setter(value);
        Ok(())
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("type", &self.value().property_type())
            .field("settable", &self.is_settable())
            .finish()
    }
}

/// Selector-keyed set of property slots for one object.
#[derive(Debug, Default)]
pub struct PropertyTable {
    entries: HashMap<Selector, Property>,
}

impl PropertyTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the slot for `selector`.
    pub fn insert(&mut self, selector: Selector, property: Property) {
        self.entries.insert(selector, property);
    }

    /// Look up the slot for `selector`.
    pub fn get(&self, selector: Selector) -> Option<&Property> {
        self.entries.get(&selector)
    }

    /// Whether a slot exists for `selector`.
    pub fn contains(&self, selector: Selector) -> bool {
        self.entries.contains_key(&selector)
    }

    /// Number of slots in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All selectors with a slot, in no particular order.
    pub fn selectors(&self) -> impl Iterator<Item = Selector> + '_ {
        self.entries.keys().copied()
    }
}
