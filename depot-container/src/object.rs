//! Lazy object construction.
//!
//! An [`ObjectWrapper`] pairs a [`Constructor`] with an optional argument
//! list. Nothing is built when the wrapper is created or registered; the
//! container materializes it on every `use_`, producing a fresh instance
//! each time.
//!
//! Before calling the constructor the wrapper checks that the supplied
//! arguments satisfy the declared [`Parameter`]s:
//!
//! | declared required | `construct` called | outcome                         |
//! |-------------------|--------------------|---------------------------------|
//! | 0                 | no                 | constructed with no arguments   |
//! | > 0               | no                 | `MissingConstruction`           |
//! | any               | yes, incomplete    | `ParameterMismatch`             |
//! | any               | yes, complete      | constructed with the arguments  |
//!
//! A constructor's own failure is returned as [`ContainerError::Raised`]
//! with the original error inside.
//!
//! # Examples
//! ```
//! use depot_container::prelude::*;
//!
//! struct Pool {
//!     url: String,
//!     size: u32,
//! }
//!
//! impl Constructible for Pool {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![
//!             Parameter::required::<String>("url"),
//!             Parameter::optional::<u32>("size"),
//!         ]
//!     }
//!
//!     fn construct(args: &Arguments) -> std::result::Result<Self, BoxError> {
//!         Ok(Pool {
//!             url: args.value(0)?,
//!             size: args.get::<u32>(1).copied().unwrap_or(4),
//!         })
//!     }
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register("Pool", object::<Pool>().construct(("postgres://db".to_string(),)), TypeTag::of::<Pool>())
//!     .unwrap();
//!
//! let pool = container.use_::<Pool>("Pool").unwrap();
//! assert_eq!(pool.url, "postgres://db");
//! assert_eq!(pool.size, 4);
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::arguments::{Arguments, IntoArguments};
use crate::error::{
    BoxError, ContainerError, MismatchDetail, MissingConstructionError, ParameterMismatchError,
    Result,
};
use crate::key::Identifier;
use crate::tag::TypeTag;

/// One declared constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    name: &'static str,
    tag: TypeTag,
    required: bool,
}

impl Parameter {
    /// A mandatory parameter of type `T`.
    pub fn required<T: 'static>(name: &'static str) -> Self {
        Self {
            name,
            tag: TypeTag::of::<T>(),
            required: true,
        }
    }

    /// A parameter of type `T` the constructor can default.
    pub fn optional<T: 'static>(name: &'static str) -> Self {
        Self {
            name,
            tag: TypeTag::of::<T>(),
            required: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A type the container knows how to build from [`Arguments`].
///
/// `parameters` declares the argument contract; the default is none, so
/// a type that needs no input only implements `construct`.
pub trait Constructible: Sized + Send + Sync + 'static {
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    /// Builds an instance. Arguments already satisfy [`parameters`](Self::parameters).
    fn construct(args: &Arguments) -> std::result::Result<Self, BoxError>;
}

type BuildFn<T> = Arc<dyn Fn(&Arguments) -> std::result::Result<T, BoxError> + Send + Sync>;

/// A constructor: declared parameters plus the function that builds `T`.
pub struct Constructor<T> {
    parameters: Arc<[Parameter]>,
    build: BuildFn<T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Builds a constructor from a closure and its parameter list.
    pub fn new(
        parameters: impl IntoIterator<Item = Parameter>,
        build: impl Fn(&Arguments) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
            build: Arc::new(build),
        }
    }

    /// The parameterless constructor of a `Default` type.
    pub fn from_default() -> Self
    where
        T: Default,
    {
        Self::new(std::iter::empty(), |_| Ok(T::default()))
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of parameters without a default.
    pub fn required(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }
}

impl<T: Constructible> Constructor<T> {
    /// The constructor declared by `T`'s [`Constructible`] impl.
    pub fn of() -> Self {
        Self::new(T::parameters(), T::construct)
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            parameters: Arc::clone(&self.parameters),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("target", &type_name::<T>())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Deferred construction of `T`.
pub struct ObjectWrapper<T> {
    ctor: Constructor<T>,
    supplied: Option<Arguments>,
}

/// Wraps `T`'s [`Constructible`] constructor without arguments.
pub fn object<T: Constructible>() -> ObjectWrapper<T> {
    object_from(Constructor::of())
}

/// Wraps an explicit constructor without arguments.
pub fn object_from<T: Send + Sync + 'static>(ctor: Constructor<T>) -> ObjectWrapper<T> {
    ObjectWrapper {
        ctor,
        supplied: None,
    }
}

impl<T: Send + Sync + 'static> ObjectWrapper<T> {
    /// Returns a new wrapper carrying `args` as the construction arguments.
    ///
    /// Nothing is constructed; the arguments are checked when the wrapper
    /// is materialized.
    pub fn construct(&self, args: impl IntoArguments) -> Self {
        Self {
            ctor: self.ctor.clone(),
            supplied: Some(args.into_arguments()),
        }
    }

    /// Arguments supplied through [`construct`](Self::construct), if any.
    pub fn supplied(&self) -> Option<&Arguments> {
        self.supplied.as_ref()
    }

    pub fn constructor(&self) -> &Constructor<T> {
        &self.ctor
    }

    /// The tag naming `T`, for registering the wrapper.
    pub fn tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    /// Checks the supplied arguments against the declared parameters.
    ///
    /// # Errors
    /// [`ContainerError::MissingConstruction`] or
    /// [`ContainerError::ParameterMismatch`], naming `id`.
    pub fn check(&self, id: &Identifier) -> Result<()> {
        let required = self.ctor.required();

        let Some(args) = &self.supplied else {
            if required == 0 {
                return Ok(());
            }
            return Err(ContainerError::MissingConstruction(MissingConstructionError {
                id: id.clone(),
                target: TypeTag::of::<T>(),
                required,
            }));
        };

        self.mismatch(args)
            .map_or(Ok(()), |detail| {
                Err(ContainerError::ParameterMismatch(ParameterMismatchError {
                    id: id.clone(),
                    target: TypeTag::of::<T>(),
                    detail,
                }))
            })
    }

    fn mismatch(&self, args: &Arguments) -> Option<MismatchDetail> {
        let params = self.ctor.parameters();
        let supplied = args.len();
        let required = self.ctor.required();

        // A required parameter may follow an optional one.
        if supplied < required || params.iter().skip(supplied).any(Parameter::is_required) {
            return Some(MismatchDetail::TooFew { required, supplied });
        }
        if supplied > params.len() {
            return Some(MismatchDetail::TooMany {
                declared: params.len(),
                supplied,
            });
        }

        params
            .iter()
            .zip(args.tags())
            .enumerate()
            .find(|(_, (param, found))| param.tag != *found)
            .map(|(index, (param, found))| MismatchDetail::WrongType {
                index,
                parameter: param.name,
                expected: param.tag,
                found,
            })
    }

    /// Validates and builds a new instance.
    ///
    /// Every call runs the constructor again.
    pub fn materialize(&self, id: &Identifier) -> Result<T> {
        self.check(id)?;
        trace!(id = %id, target = type_name::<T>(), "Constructing lazy object");

        let empty;
        let args = match &self.supplied {
            Some(args) => args,
            None => {
                empty = Arguments::new();
                &empty
            }
        };
        (self.ctor.build)(args).map_err(ContainerError::Raised)
    }
}

impl<T> Clone for ObjectWrapper<T> {
    fn clone(&self) -> Self {
        Self {
            ctor: self.ctor.clone(),
            supplied: self.supplied.clone(),
        }
    }
}

impl<T> fmt::Debug for ObjectWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectWrapper")
            .field("ctor", &self.ctor)
            .field("supplied", &self.supplied)
            .finish()
    }
}

/// Object-safe view of an [`ObjectWrapper`] stored in the registry.
pub(crate) trait LazyObject: Send + Sync {
    fn produces(&self) -> TypeTag;
    fn check(&self, id: &Identifier) -> Result<()>;
    fn materialize(&self, id: &Identifier) -> Result<Arc<dyn Any + Send + Sync>>;
}

impl<T: Send + Sync + 'static> LazyObject for ObjectWrapper<T> {
    fn produces(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn check(&self, id: &Identifier) -> Result<()> {
        ObjectWrapper::check(self, id)
    }

    fn materialize(&self, id: &Identifier) -> Result<Arc<dyn Any + Send + Sync>> {
        let instance = ObjectWrapper::materialize(self, id)?;
        Ok(Arc::new(instance))
    }
}
