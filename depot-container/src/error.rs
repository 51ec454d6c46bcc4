//! Error types for Depot container operations.
//!
//! Registry and wrapper violations are values of [`ContainerError`] with
//! a primary message followed by indented context lines. Failures raised
//! by user constructors pass through [`ContainerError::Raised`] untouched.

use std::fmt;

use crate::key::Identifier;
use crate::tag::{Tag, TypeTag};

/// Boxed error raised by user code (constructors, argument extraction).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all Depot operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Identifier has no entry.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// Override attempted with a different type tag.
    #[error("{}", .0)]
    TypeMismatch(TypeMismatchError),

    /// Lazy object needs arguments but `construct` was never applied.
    #[error("{}", .0)]
    MissingConstruction(MissingConstructionError),

    /// Lazy object was given an incomplete or ill-typed argument list.
    #[error("{}", .0)]
    ParameterMismatch(ParameterMismatchError),

    /// `resolve` was called on an entry that only `use_` can materialize.
    #[error(
        "{id} is registered lazily ({kind}) and cannot be resolved directly\n  Hint: Use .use_::<T>({id:?}) to materialize it"
    )]
    LazyEntry { id: Identifier, kind: &'static str },

    /// The caller asked for a different Rust type than the entry produces.
    #[error("{id} provides {found}, not {expected}")]
    WrongType {
        id: Identifier,
        expected: &'static str,
        found: &'static str,
    },

    /// Failure raised by a user constructor, passed through verbatim.
    #[error(transparent)]
    Raised(BoxError),
}

impl ContainerError {
    /// Returns the user error carried by [`ContainerError::Raised`].
    pub fn raised(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ContainerError::Raised(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Unwraps the user error, or gives `self` back if this is a registry error.
    pub fn into_raised(self) -> std::result::Result<BoxError, Self> {
        match self {
            ContainerError::Raised(err) => Ok(err),
            other => Err(other),
        }
    }

    /// Returns the identifier the error is about, if it has one.
    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            ContainerError::NotFound(e) => Some(&e.id),
            ContainerError::TypeMismatch(e) => Some(&e.id),
            ContainerError::MissingConstruction(e) => Some(&e.id),
            ContainerError::ParameterMismatch(e) => Some(&e.id),
            ContainerError::LazyEntry { id, .. } | ContainerError::WrongType { id, .. } => Some(id),
            ContainerError::Raised(_) => None,
        }
    }
}

/// No entry exists for the requested identifier.
#[derive(Debug)]
pub struct NotFoundError {
    pub id: Identifier,
    /// Registered identifiers that look like the requested one.
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service not found for identifier: {}", self.id)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: Did you forget to call .register({:?}, ...)?",
            self.id.as_str()
        )
    }
}

/// Registration tried to replace an entry committed to another type.
#[derive(Debug)]
pub struct TypeMismatchError {
    pub id: Identifier,
    /// Tag of the entry that stays in place.
    pub registered: TypeTag,
    /// Tag of the rejected registration.
    pub attempted: Tag,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type mismatch: {} is already registered with a different type",
            self.id
        )?;
        write!(f, "\n  Registered as: {}", self.registered)?;
        write!(f, "\n  Attempted:     {}", self.attempted)
    }
}

/// Lazy object has required parameters and no argument list.
#[derive(Debug)]
pub struct MissingConstructionError {
    pub id: Identifier,
    /// Type the wrapper constructs.
    pub target: TypeTag,
    /// Number of mandatory constructor parameters.
    pub required: usize,
}

impl MissingConstructionError {
    pub const MESSAGE: &'static str =
        "there is a required parameter and it was not constructed! Use the object(class).construct(...)";
}

impl fmt::Display for MissingConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MESSAGE)?;
        write!(
            f,
            "\n  Service: {} ({} takes {} required parameter{})",
            self.id,
            self.target,
            self.required,
            if self.required == 1 { "" } else { "s" },
        )
    }
}

/// What exactly was wrong with a supplied argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchDetail {
    /// Fewer arguments than required parameters.
    TooFew { required: usize, supplied: usize },
    /// More arguments than declared parameters.
    TooMany { declared: usize, supplied: usize },
    /// An argument's type differs from its parameter's.
    WrongType {
        index: usize,
        parameter: &'static str,
        expected: TypeTag,
        found: TypeTag,
    },
}

impl fmt::Display for MismatchDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchDetail::TooFew { required, supplied } => {
                write!(f, "expected at least {required} arguments, got {supplied}")
            }
            MismatchDetail::TooMany { declared, supplied } => {
                write!(f, "expected at most {declared} arguments, got {supplied}")
            }
            MismatchDetail::WrongType {
                index,
                parameter,
                expected,
                found,
            } => write!(
                f,
                "argument {index} ({parameter}) expects {expected}, got {found}"
            ),
        }
    }
}

/// Lazy object was constructed with arguments that break its parameter contract.
#[derive(Debug)]
pub struct ParameterMismatchError {
    pub id: Identifier,
    pub target: TypeTag,
    pub detail: MismatchDetail,
}

impl ParameterMismatchError {
    pub const MESSAGE: &'static str = "there is a missing required parameter! Either adjust the required parameters or correct the construction of the class.";
}

impl fmt::Display for ParameterMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MESSAGE)?;
        write!(f, "\n  Service: {} ({}): {}", self.id, self.target, self.detail)
    }
}

/// Failure extracting a typed constructor argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("no argument at position {index}")]
    Missing { index: usize },

    #[error("argument {index} is {found}, not {expected}")]
    WrongType {
        index: usize,
        expected: TypeTag,
        found: TypeTag,
    },
}

/// Convenient Result type for Depot operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
