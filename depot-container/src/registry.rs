//! Service registry: stores one entry per identifier.
//!
//! The registry maps [`Identifier`] to an [`Implementation`] and the
//! [`Tag`] it was registered with. It owns the override rule; lookups and
//! materialization live on [`Container`](crate::container::Container).

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ContainerError, TypeMismatchError};
use crate::function::{FunctionWrapper, LazyFunction};
use crate::key::Identifier;
use crate::object::{LazyObject, ObjectWrapper};
use crate::tag::{Tag, TypeTag};

/// What an identifier is bound to.
///
/// Either a plain shared value, or a lazy wrapper the container
/// materializes on `use_`. Wrappers convert with `.into()`.
pub struct Implementation {
    pub(crate) kind: Kind,
}

pub(crate) enum Kind {
    Value {
        value: Arc<dyn Any + Send + Sync>,
        produces: TypeTag,
    },
    Object(Box<dyn LazyObject>),
    Function(Box<dyn LazyFunction>),
}

impl Implementation {
    /// A plain value, moved into a shared handle.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// A plain value the caller already shares.
    ///
    /// Resolving returns this very `Arc`.
    pub fn shared<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            kind: Kind::Value {
                value,
                produces: TypeTag::of::<T>(),
            },
        }
    }

    /// Returns `true` for lazy wrappers.
    pub fn is_lazy(&self) -> bool {
        !matches!(self.kind, Kind::Value { .. })
    }

    /// The Rust type `resolve`/`use_` hand out for this implementation.
    ///
    /// For object wrappers this is the constructed type, for function
    /// wrappers the [`Invocation`](crate::function::Invocation).
    pub fn produces(&self) -> TypeTag {
        match &self.kind {
            Kind::Value { produces, .. } => *produces,
            Kind::Object(wrapper) => wrapper.produces(),
            Kind::Function(wrapper) => wrapper.produces(),
        }
    }

    /// Short label for logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            Kind::Value { .. } => "value",
            Kind::Object(_) => "object",
            Kind::Function(_) => "function",
        }
    }
}

impl<T: Send + Sync + 'static> From<ObjectWrapper<T>> for Implementation {
    fn from(wrapper: ObjectWrapper<T>) -> Self {
        Self {
            kind: Kind::Object(Box::new(wrapper)),
        }
    }
}

impl<O: 'static> From<FunctionWrapper<O>> for Implementation {
    fn from(wrapper: FunctionWrapper<O>) -> Self {
        Self {
            kind: Kind::Function(Box::new(wrapper)),
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Implementation::{}({})", self.kind_name(), self.produces())
    }
}

/// One registry slot.
#[derive(Debug)]
pub(crate) struct Entry {
    pub implementation: Implementation,
    pub tag: Tag,
    /// Set when the slot was first seeded without a type. Such a slot
    /// accepts every later registration, whatever tag it records.
    pub untyped_origin: bool,
}

/// Stores all service entries.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: HashMap<Identifier, Entry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `implementation` under `id`, applying the override rule.
    ///
    /// A new identifier is stored unconditionally. An existing entry is
    /// replaced wholesale if its tag [accepts](Tag::accepts) `tag`, or if
    /// the slot was first seeded untyped. The replacement records `tag`
    /// but keeps the slot's untyped origin.
    ///
    /// # Errors
    /// Returns [`ContainerError::TypeMismatch`] if the existing entry is
    /// committed to another type. The entry is left untouched.
    pub fn insert(
        &mut self,
        id: Identifier,
        implementation: Implementation,
        tag: Tag,
    ) -> Result<(), ContainerError> {
        let untyped_origin = match self.entries.get(&id) {
            Some(Entry {
                tag: Tag::Known(registered),
                untyped_origin: false,
                ..
            }) if !Tag::Known(*registered).accepts(&tag) => {
                let registered = *registered;
                warn!(id = %id, registered = %registered, attempted = %tag, "Rejected override");
                return Err(ContainerError::TypeMismatch(TypeMismatchError {
                    id,
                    registered,
                    attempted: tag,
                }));
            }
            Some(entry) => {
                debug!(
                    id = %id,
                    from = %entry.tag,
                    to = %tag,
                    kind = implementation.kind_name(),
                    lenient = entry.untyped_origin,
                    "Overrode service"
                );
                entry.untyped_origin
            }
            None => {
                debug!(id = %id, tag = %tag, kind = implementation.kind_name(), "Registered service");
                tag.is_unknown()
            }
        };

        self.entries.insert(
            id,
            Entry {
                implementation,
                tag,
                untyped_origin,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn get_key_value(&self, id: &str) -> Option<(&Identifier, &Entry)> {
        self.entries.get_key_value(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&Identifier> {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        ids
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Entry)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestService;
    struct AnotherService;

    fn known<T: 'static>() -> Tag {
        Tag::Known(TypeTag::of::<T>())
    }

    fn value_of(registry: &Registry, id: &str) -> Option<&'static str> {
        match &registry.get(id)?.implementation.kind {
            Kind::Value { value, .. } => value.downcast_ref::<&'static str>().copied(),
            _ => None,
        }
    }

    #[test]
    fn insert_and_get() {
        let mut reg = Registry::new();
        reg.insert("Svc".into(), Implementation::value("first"), known::<TestService>())
            .unwrap();
        assert!(reg.contains("Svc"));
        assert_eq!(value_of(&reg, "Svc"), Some("first"));
    }

    #[test]
    fn same_tag_overrides() {
        let mut reg = Registry::new();
        reg.insert("Svc".into(), Implementation::value("first"), known::<TestService>())
            .unwrap();
        reg.insert("Svc".into(), Implementation::value("second"), known::<TestService>())
            .unwrap();
        assert_eq!(value_of(&reg, "Svc"), Some("second"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn different_tag_fails_without_side_effect() {
        let mut reg = Registry::new();
        reg.insert("Svc".into(), Implementation::value("first"), known::<TestService>())
            .unwrap();
        let err = reg
            .insert("Svc".into(), Implementation::value("second"), known::<AnotherService>())
            .unwrap_err();

        assert!(matches!(err, ContainerError::TypeMismatch(_)));
        assert_eq!(value_of(&reg, "Svc"), Some("first"));
        assert_eq!(reg.get("Svc").map(|e| e.tag), Some(known::<TestService>()));
    }

    #[test]
    fn untyped_slot_accepts_any_tag_forever() {
        let mut reg = Registry::new();
        reg.insert("Svc".into(), Implementation::value("seed"), Tag::Unknown)
            .unwrap();
        reg.insert("Svc".into(), Implementation::value("typed"), known::<AnotherService>())
            .unwrap();
        assert_eq!(value_of(&reg, "Svc"), Some("typed"));
        assert_eq!(reg.get("Svc").map(|e| e.tag), Some(known::<AnotherService>()));

        // A slot seeded untyped stays open after a typed override.
        reg.insert("Svc".into(), Implementation::value("retyped"), known::<TestService>())
            .unwrap();
        assert_eq!(value_of(&reg, "Svc"), Some("retyped"));
        assert_eq!(reg.get("Svc").map(|e| e.tag), Some(known::<TestService>()));
        assert!(reg.get("Svc").is_some_and(|e| e.untyped_origin));
    }

    #[test]
    fn typed_slot_never_becomes_lenient() {
        let mut reg = Registry::new();
        reg.insert("Svc".into(), Implementation::value("typed"), known::<TestService>())
            .unwrap();
        reg.insert("Svc".into(), Implementation::value("again"), known::<TestService>())
            .unwrap();
        assert!(reg.get("Svc").is_some_and(|e| !e.untyped_origin));
        assert!(reg
            .insert("Svc".into(), Implementation::value("other"), known::<AnotherService>())
            .is_err());
    }

    #[test]
    fn known_tag_rejects_untyped_replacement() {
        let mut reg = Registry::new();
        reg.insert("Svc".into(), Implementation::value("typed"), known::<TestService>())
            .unwrap();
        assert!(reg
            .insert("Svc".into(), Implementation::value("seed"), Tag::Unknown)
            .is_err());
    }

    #[test]
    fn identifiers_are_sorted() {
        let mut reg = Registry::new();
        for id in ["b", "c", "a"] {
            reg.insert(id.into(), Implementation::value(0u8), Tag::Unknown)
                .unwrap();
        }
        let ids: Vec<_> = reg.identifiers().into_iter().map(Identifier::as_str).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(reg.iter().count(), 3);
    }

    #[test]
    fn implementation_kinds() {
        let value = Implementation::value(1u32);
        assert!(!value.is_lazy());
        assert_eq!(value.produces(), TypeTag::of::<u32>());
        assert_eq!(value.kind_name(), "value");
        assert_eq!(value.produces().name(), "u32");
    }
}
