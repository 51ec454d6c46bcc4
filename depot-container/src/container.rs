//! # The Container
//!
//! A registry of services keyed by [`Identifier`], with identity-checked
//! overrides and lazy wrappers.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──register()──> Container
//!   (ordered seed)                  │
//!                         resolve() │ use_()
//!                                   ▼
//!                 plain value ── Arc<T> ── object / function wrapper
//!                                           (materialized per call)
//! ```
//!
//! # Examples
//! ```rust
//! use depot_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct TestService;
//! impl TestService {
//!     fn value(&self) -> &'static str { "Hello, Depot!" }
//! }
//!
//! struct AnotherService;
//!
//! let mut container = Container::new();
//! container.register_typed("TestService", TestService).unwrap();
//!
//! let service: Arc<TestService> = container.resolve("TestService").unwrap();
//! assert_eq!(service.value(), "Hello, Depot!");
//!
//! // Same type: the override is accepted.
//! container.register_typed("TestService", TestService).unwrap();
//!
//! // Another type under the same identifier is rejected.
//! let err = container
//!     .register("TestService", Implementation::value(AnotherService), TypeTag::of::<AnotherService>())
//!     .unwrap_err();
//! assert!(matches!(err, ContainerError::TypeMismatch(_)));
//! ```

use std::any::{Any, type_name};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use depot_support::rendering::suggest_similar;
use tracing::{debug, info, instrument, trace};

use crate::error::{ContainerError, NotFoundError, Result};
use crate::key::Identifier;
use crate::registry::{Entry, Implementation, Kind, Registry};
use crate::tag::{Tag, TypeTag};

const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// SeedEntry
// ============================================================

/// One entry of a seed mapping: an implementation and an optional type.
///
/// Seeding without a type leaves the identifier uncommitted, so any later
/// registration may replace it.
#[derive(Debug)]
pub struct SeedEntry {
    implementation: Implementation,
    tag: Option<TypeTag>,
}

impl SeedEntry {
    /// An untyped entry.
    pub fn new(implementation: impl Into<Implementation>) -> Self {
        Self {
            implementation: implementation.into(),
            tag: None,
        }
    }

    /// An untyped plain value.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Implementation::value(value))
    }

    /// Commits the entry to `T`.
    pub fn with_type<T: ?Sized + 'static>(self) -> Self {
        self.with_tag(TypeTag::of::<T>())
    }

    /// Commits the entry to `tag`.
    pub fn with_tag(mut self, tag: TypeTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn tag(&self) -> Option<TypeTag> {
        self.tag
    }
}

impl From<Implementation> for SeedEntry {
    fn from(implementation: Implementation) -> Self {
        Self::new(implementation)
    }
}

// ============================================================
// ContainerBuilder
// ============================================================

/// Seeds a [`Container`] from an ordered list of entries.
///
/// Entries are applied in insertion order with the same override rule as
/// [`Container::register`]. The first type mismatch fails the whole build.
///
/// # Examples
/// ```rust
/// use depot_container::prelude::*;
///
/// struct Clock;
///
/// let container = Container::builder()
///     .typed("Clock", Clock)
///     .value("Greeting", "hello")
///     .build()
///     .unwrap();
///
/// assert_eq!(container.len(), 2);
/// assert_eq!(container.tag_of("Greeting"), Some(Tag::Unknown));
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    entries: Vec<(Identifier, SeedEntry)>,
    eager_validation: bool,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Check lazy object wrappers for argument completeness during
    /// [`build()`](Self::build), before anything is used.
    pub fn eager_validation(mut self, enabled: bool) -> Self {
        self.eager_validation = enabled;
        self
    }

    /// Adds one seed entry.
    pub fn entry(mut self, id: impl Into<Identifier>, entry: impl Into<SeedEntry>) -> Self {
        self.entries.push((id.into(), entry.into()));
        self
    }

    /// Adds an untyped plain value.
    pub fn value<T: Send + Sync + 'static>(self, id: impl Into<Identifier>, value: T) -> Self {
        self.entry(id, SeedEntry::value(value))
    }

    /// Adds a plain value committed to its own type.
    pub fn typed<T: Send + Sync + 'static>(self, id: impl Into<Identifier>, value: T) -> Self {
        self.entry(id, SeedEntry::value(value).with_type::<T>())
    }

    /// Adds every entry of an ordered mapping.
    pub fn seed<I, K>(mut self, seed: I) -> Self
    where
        I: IntoIterator<Item = (K, SeedEntry)>,
        K: Into<Identifier>,
    {
        self.entries
            .extend(seed.into_iter().map(|(id, entry)| (id.into(), entry)));
        self
    }

    /// Builds the container.
    ///
    /// # Errors
    /// The first [`ContainerError::TypeMismatch`] among the seed entries.
    /// With eager validation, also the first
    /// [`ContainerError::MissingConstruction`] or
    /// [`ContainerError::ParameterMismatch`] in seed order.
    #[instrument(skip(self), name = "container_build", fields(entries = self.entries.len()))]
    pub fn build(self) -> Result<Container> {
        let ContainerBuilder {
            entries,
            eager_validation,
        } = self;
        info!(eager_validation, "Building container");

        let mut registry = Registry::new();
        let mut order = Vec::with_capacity(entries.len());

        for (id, entry) in entries {
            order.push(id.clone());
            registry.insert(id, entry.implementation, Tag::from(entry.tag))?;
        }

        let container = Container { registry };

        if eager_validation {
            let mut seen = HashSet::new();
            for id in order.iter().filter(|id| seen.insert(*id)) {
                container.verify_entry(id)?;
            }
            debug!("Lazy objects verified");
        }

        info!(registered = container.len(), "Container built");
        Ok(container)
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Service registry with identity-checked overrides.
///
/// Single-owner and synchronous: registration takes `&mut self`, lookups
/// take `&self`. There is no internal locking.
#[derive(Default)]
pub struct Container {
    registry: Registry,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Builds a container from an ordered seed mapping.
    ///
    /// Shorthand for `Container::builder().seed(seed).build()`.
    pub fn create<I, K>(seed: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, SeedEntry)>,
        K: Into<Identifier>,
    {
        Self::builder().seed(seed).build()
    }

    /// Binds `id` to `implementation`, committed to `tag`.
    ///
    /// An unregistered identifier is stored unconditionally. A registered
    /// one is replaced only if it was registered with the same tag, or
    /// first seeded without one. A slot seeded without a type keeps
    /// accepting any registration.
    ///
    /// # Errors
    /// [`ContainerError::TypeMismatch`] if `id` is committed to another
    /// type. The existing entry stays in place.
    pub fn register(
        &mut self,
        id: impl Into<Identifier>,
        implementation: impl Into<Implementation>,
        tag: TypeTag,
    ) -> Result<()> {
        self.registry
            .insert(id.into(), implementation.into(), Tag::Known(tag))
    }

    /// Binds `id` to a plain value committed to `T`.
    pub fn register_typed<T: Send + Sync + 'static>(
        &mut self,
        id: impl Into<Identifier>,
        value: T,
    ) -> Result<()> {
        self.register(id, Implementation::value(value), TypeTag::of::<T>())
    }

    /// Returns the plain value stored under `id`.
    ///
    /// Never materializes lazy wrappers.
    ///
    /// # Errors
    /// - [`ContainerError::NotFound`] if `id` has no entry
    /// - [`ContainerError::LazyEntry`] if `id` holds a lazy wrapper
    /// - [`ContainerError::WrongType`] if the value is not a `T`
    pub fn resolve<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        trace!(id, "Resolving");
        let (id, entry) = self.lookup(id)?;

        match &entry.implementation.kind {
            Kind::Value { value, .. } => downcast(id, &entry.implementation, Arc::clone(value)),
            Kind::Object(_) | Kind::Function(_) => Err(ContainerError::LazyEntry {
                id: id.clone(),
                kind: entry.implementation.kind_name(),
            }),
        }
    }

    /// Returns the service under `id`, materializing lazy wrappers.
    ///
    /// - plain value: the stored `Arc`
    /// - object wrapper: a newly constructed instance, every call
    /// - function wrapper: its [`Invocation`](crate::function::Invocation);
    ///   the function itself is not called
    ///
    /// # Errors
    /// - [`ContainerError::NotFound`] if `id` has no entry
    /// - [`ContainerError::WrongType`] if the entry does not produce a `T`
    /// - [`ContainerError::MissingConstruction`] /
    ///   [`ContainerError::ParameterMismatch`] for incomplete object arguments
    /// - [`ContainerError::Raised`] carrying a constructor's own error
    pub fn use_<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        trace!(id, "Using");
        let (id, entry) = self.lookup(id)?;
        let implementation = &entry.implementation;

        // Checked up front so a wrong request never runs a constructor.
        if !implementation.produces().is::<T>() {
            return Err(wrong_type::<T>(id, implementation));
        }

        let value = match &implementation.kind {
            Kind::Value { value, .. } => Arc::clone(value),
            Kind::Object(wrapper) => wrapper.materialize(id)?,
            Kind::Function(wrapper) => wrapper.invocation(),
        };
        downcast(id, implementation, value)
    }

    /// Checks every lazy object wrapper's arguments without constructing.
    ///
    /// Entries are checked in identifier order; the first failure wins.
    pub fn verify(&self) -> Result<()> {
        for (id, _) in self.registry.iter() {
            self.verify_entry(id)?;
        }
        Ok(())
    }

    fn verify_entry(&self, id: &Identifier) -> Result<()> {
        match self.registry.get(id.as_str()).map(|entry| &entry.implementation.kind) {
            Some(Kind::Object(wrapper)) => wrapper.check(id),
            _ => Ok(()),
        }
    }

    /// Returns `true` if `id` has an entry.
    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Returns the tag `id` is registered with.
    pub fn tag_of(&self, id: &str) -> Option<Tag> {
        self.registry.get(id).map(|entry| entry.tag)
    }

    /// Returns all identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&Identifier> {
        self.registry.identifiers()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn lookup(&self, id: &str) -> Result<(&Identifier, &Entry)> {
        self.registry
            .get_key_value(id)
            .ok_or_else(|| {
                let known = self.registry.identifiers();
                ContainerError::NotFound(NotFoundError {
                    id: Identifier::from(id.to_string()),
                    suggestions: suggest_similar(id, &known, MAX_SUGGESTIONS),
                })
            })
    }
}

fn downcast<T: Send + Sync + 'static>(
    id: &Identifier,
    implementation: &Implementation,
    value: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| wrong_type::<T>(id, implementation))
}

fn wrong_type<T>(id: &Identifier, implementation: &Implementation) -> ContainerError {
    ContainerError::WrongType {
        id: id.clone(),
        expected: type_name::<T>(),
        found: implementation.produces().name(),
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, SeedEntry};
    pub use crate::arguments::{Arguments, IntoArguments};
    pub use crate::error::{BoxError, ContainerError, Result};
    pub use crate::function::{Callable, FunctionWrapper, Invocation, func};
    pub use crate::key::Identifier;
    pub use crate::object::{Constructible, Constructor, ObjectWrapper, Parameter, object, object_from};
    pub use crate::registry::Implementation;
    pub use crate::tag::{Tag, TypeTag};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
