//! # Depot: a typed service registry for Rust
//!
//! Binds identifiers to implementations, lets an identifier be overridden
//! only by a registration of the same type, and defers construction of
//! objects and invocation of functions until they are used.
//!
//! ```rust
//! use depot::prelude::*;
//!
//! struct Clock;
//!
//! fn add(a: i32, b: i32) -> i32 { a + b }
//!
//! let container = Container::builder()
//!     .typed("Clock", Clock)
//!     .entry("Add", SeedEntry::new(func(add, (2, 3))))
//!     .build()
//!     .unwrap();
//!
//! let add = container.use_::<Invocation<i32>>("Add").unwrap();
//! assert_eq!(add.invoke(), 5);
//! ```

pub use depot_container::*;
pub use depot_support::*;
