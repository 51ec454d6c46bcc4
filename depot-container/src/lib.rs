//! Core container implementation for Depot.

pub mod arguments;
pub mod container;
pub mod error;
pub mod function;
pub mod key;
pub mod object;
pub mod registry;
pub mod tag;

pub use container::{Container, ContainerBuilder, SeedEntry, prelude};
pub use error::{BoxError, ContainerError, Result};
pub use key::Identifier;
pub use tag::{Tag, TypeTag};
