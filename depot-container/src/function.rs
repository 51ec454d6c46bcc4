//! Lazy function invocation.
//!
//! [`func`] pairs a callable with its complete argument tuple. The
//! container never calls it: `use_` hands back an [`Invocation`], and the
//! function runs only when the caller invokes that. Whatever the function
//! returns, including its own `Err`, goes to the caller of
//! [`Invocation::invoke`].
//!
//! # Examples
//! ```
//! use depot_container::prelude::*;
//!
//! fn divide(a: i32, b: i32) -> std::result::Result<i32, String> {
//!     if b == 0 { Err("division by zero".into()) } else { Ok(a / b) }
//! }
//!
//! let mut container = Container::new();
//! let wrapper = func(divide, (4, 0));
//! let tag = wrapper.tag();
//! container.register("Divide", wrapper, tag).unwrap();
//!
//! // Looking the function up never runs it.
//! let invocation = container
//!     .use_::<Invocation<std::result::Result<i32, String>>>("Divide")
//!     .unwrap();
//!
//! assert_eq!(invocation.invoke(), Err("division by zero".to_string()));
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::tag::TypeTag;

/// A function callable with an argument tuple.
///
/// Implemented for every `Fn` of up to six parameters, taking the
/// parameters as a tuple in declaration order.
pub trait Callable<Args>: Send + Sync + 'static {
    type Output;

    fn call(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($name:ident),*) => {
        impl<Func, Out, $($name),*> Callable<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Out + Send + Sync + 'static,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn call(&self, args: ($($name,)*)) -> Out {
                let ($($name,)*) = args;
                (self)($($name),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A);
impl_callable!(A, B);
impl_callable!(A, B, C);
impl_callable!(A, B, C, D);
impl_callable!(A, B, C, D, E);
impl_callable!(A, B, C, D, E, F);

type Thunk<O> = Arc<dyn Fn() -> O + Send + Sync>;

/// Deferred call of a function producing `O`.
///
/// Immutable once built: the argument list is fixed by [`func`].
pub struct FunctionWrapper<O> {
    thunk: Thunk<O>,
    callable: &'static str,
}

/// Pairs `f` with the arguments it will be called with.
///
/// The arguments are cloned into every call.
pub fn func<F, Args>(f: F, args: Args) -> FunctionWrapper<F::Output>
where
    F: Callable<Args>,
    Args: Clone + Send + Sync + 'static,
    F::Output: 'static,
{
    FunctionWrapper {
        thunk: Arc::new(move || f.call(args.clone())),
        callable: type_name::<F>(),
    }
}

impl<O: 'static> FunctionWrapper<O> {
    /// The capability handed out by `use_`.
    pub fn invocation(&self) -> Invocation<O> {
        Invocation {
            thunk: Arc::clone(&self.thunk),
            callable: self.callable,
        }
    }

    /// The tag naming [`Invocation<O>`], for registering the wrapper.
    pub fn tag(&self) -> TypeTag {
        TypeTag::of::<Invocation<O>>()
    }
}

impl<O> Clone for FunctionWrapper<O> {
    fn clone(&self) -> Self {
        Self {
            thunk: Arc::clone(&self.thunk),
            callable: self.callable,
        }
    }
}

impl<O> fmt::Debug for FunctionWrapper<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionWrapper")
            .field("callable", &self.callable)
            .finish()
    }
}

/// A ready-to-call function with its arguments bound.
pub struct Invocation<O> {
    thunk: Thunk<O>,
    callable: &'static str,
}

impl<O> Invocation<O> {
    /// Calls the function. Each call runs it once.
    pub fn invoke(&self) -> O {
        trace!(callable = self.callable, "Invoking lazy function");
        (self.thunk)()
    }
}

impl<O> Clone for Invocation<O> {
    fn clone(&self) -> Self {
        Self {
            thunk: Arc::clone(&self.thunk),
            callable: self.callable,
        }
    }
}

impl<O> fmt::Debug for Invocation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("callable", &self.callable)
            .finish()
    }
}

/// Object-safe view of a [`FunctionWrapper`] stored in the registry.
pub(crate) trait LazyFunction: Send + Sync {
    fn produces(&self) -> TypeTag;
    fn invocation(&self) -> Arc<dyn Any + Send + Sync>;
}

impl<O: 'static> LazyFunction for FunctionWrapper<O> {
    fn produces(&self) -> TypeTag {
        TypeTag::of::<Invocation<O>>()
    }

    fn invocation(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::new(FunctionWrapper::invocation(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn building_does_not_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let wrapper = func(
            {
                let calls = calls.clone();
                move |a: u32, b: u32| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    a + b
                }
            },
            (4, 5),
        );

        let invocation = wrapper.invocation();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(invocation.invoke(), 9);
        assert_eq!(invocation.invoke(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failure_reaches_invoker() {
        let wrapper = func(
            |_: i32, _: i32| -> std::result::Result<(), String> { Err("boom".into()) },
            (4, 5),
        );
        assert_eq!(wrapper.invocation().invoke(), Err("boom".to_string()));
    }

    #[test]
    fn zero_arity() {
        let wrapper = func(|| "ready", ());
        assert_eq!(wrapper.invocation().invoke(), "ready");
    }

    #[test]
    fn owned_arguments_are_cloned_per_call() {
        let wrapper = func(|mut v: Vec<u8>| {
            v.push(0);
            v.len()
        }, (vec![1u8, 2],));
        let invocation = wrapper.invocation();
        assert_eq!(invocation.invoke(), 3);
        assert_eq!(invocation.invoke(), 3);
    }

    #[test]
    fn tag_names_invocation() {
        let wrapper = func(|a: u8| a, (1u8,));
        assert_eq!(wrapper.tag(), TypeTag::of::<Invocation<u8>>());
        assert!(format!("{wrapper:?}").contains("FunctionWrapper"));
    }
}
