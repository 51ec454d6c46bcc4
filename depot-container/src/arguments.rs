//! Type-erased construction arguments.
//!
//! [`Arguments`] is the ordered list handed to
//! [`ObjectWrapper::construct`](crate::object::ObjectWrapper::construct).
//! Each value remembers its [`TypeTag`] so the list can be checked against
//! a constructor's declared parameters before anything is built. Values are
//! shared, so the same list can feed any number of constructions.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ArgumentError;
use crate::tag::TypeTag;

/// One construction argument.
#[derive(Clone)]
pub struct Argument {
    value: Arc<dyn Any + Send + Sync>,
    tag: TypeTag,
}

impl Argument {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            tag: TypeTag::of::<T>(),
        }
    }

    #[inline]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Argument({})", self.tag)
    }
}

/// Ordered, type-erased argument list.
///
/// # Examples
/// ```
/// use depot_container::arguments::{Arguments, IntoArguments};
///
/// let args = ("postgres://localhost".to_string(), 5432u16).into_arguments();
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get::<u16>(1), Some(&5432));
/// assert_eq!(args.value::<String>(0).unwrap(), "postgres://localhost");
/// ```
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.push(Argument::new(value));
        self
    }

    pub fn push<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.push(Argument::new(value));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows argument `index` as `T`.
    ///
    /// Returns `None` if the position is empty or holds another type.
    /// Constructors read trailing optional parameters this way: an omitted
    /// one is an empty position. A supplied argument of the wrong type is
    /// rejected before the constructor runs.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    /// Clones argument `index` out as `T`.
    ///
    /// # Errors
    /// [`ArgumentError::Missing`] if there is no argument at `index`,
    /// [`ArgumentError::WrongType`] if it holds another type.
    pub fn value<T: Clone + 'static>(&self, index: usize) -> Result<T, ArgumentError> {
        let arg = self
            .values
            .get(index)
            .ok_or(ArgumentError::Missing { index })?;

        arg.downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ArgumentError::WrongType {
                index,
                expected: TypeTag::of::<T>(),
                found: arg.tag(),
            })
    }

    /// Tags of all arguments, in order.
    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.values.iter().map(Argument::tag)
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tags()).finish()
    }
}

impl FromIterator<Argument> for Arguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Conversion into an [`Arguments`] list.
///
/// Implemented for [`Arguments`] itself and for tuples of up to six
/// values; `()` is the explicit empty list.
pub trait IntoArguments {
    fn into_arguments(self) -> Arguments;
}

impl IntoArguments for Arguments {
    fn into_arguments(self) -> Arguments {
        self
    }
}

macro_rules! impl_into_arguments {
    ($($name:ident),*) => {
        impl<$($name),*> IntoArguments for ($($name,)*)
        where
            $($name: Send + Sync + 'static,)*
        {
            #[allow(non_snake_case)]
            fn into_arguments(self) -> Arguments {
                let ($($name,)*) = self;
                Arguments {
                    values: vec![$(Argument::new($name)),*],
                }
            }
        }
    };
}

impl_into_arguments!();
impl_into_arguments!(A);
impl_into_arguments!(A, B);
impl_into_arguments!(A, B, C);
impl_into_arguments!(A, B, C, D);
impl_into_arguments!(A, B, C, D, E);
impl_into_arguments!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_is_empty() {
        assert!(().into_arguments().is_empty());
    }

    #[test]
    fn tuple_keeps_order_and_types() {
        let args = ("a".to_string(), 7i32, true).into_arguments();
        let tags: Vec<_> = args.tags().collect();
        assert_eq!(
            tags,
            vec![TypeTag::of::<String>(), TypeTag::of::<i32>(), TypeTag::of::<bool>()]
        );
    }

    #[test]
    fn single_element_tuple() {
        let args = ("only",).into_arguments();
        assert_eq!(args.len(), 1);
        assert_eq!(args.get::<&str>(0), Some(&"only"));
    }

    #[test]
    fn value_reports_missing() {
        let args = Arguments::new().with(1u8);
        assert_eq!(args.value::<u8>(3), Err(ArgumentError::Missing { index: 3 }));
    }

    #[test]
    fn value_reports_wrong_type() {
        let args = Arguments::new().with(1u8);
        assert_eq!(
            args.value::<String>(0),
            Err(ArgumentError::WrongType {
                index: 0,
                expected: TypeTag::of::<String>(),
                found: TypeTag::of::<u8>(),
            })
        );
    }

    #[test]
    fn clones_share_values() {
        let args = Arguments::new().with(String::from("shared"));
        let copy = args.clone();
        let a = args.get::<String>(0).map(|s| s as *const String);
        let b = copy.get::<String>(0).map(|s| s as *const String);
        assert_eq!(a, b);
    }

    #[test]
    fn push_and_collect() {
        let mut args = Arguments::new();
        args.push(1u32);
        let collected: Arguments = args.values.iter().cloned().chain([Argument::new(2u32)]).collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(format!("{collected:?}"), "[TypeTag(u32), TypeTag(u32)]");
    }
}
