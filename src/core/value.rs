//! Function-valued configuration
//!
//! Configuration may hold a plain value, a synchronous function or an
//! asynchronous function in the same slot. `ConfigFn::evaluate` always
//! normalizes to a future so callers have one code path.

use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::rc::Rc;

/// Shared, pointer-compared function handle.
pub struct Callback<F: ?Sized>(pub Rc<F>);

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<F: ?Sized> Deref for Callback<F> {
    type Target = F;
    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F: ?Sized> PartialEq for Callback<F> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Static value | sync function | async function.
pub enum ConfigFn<A, R> {
    Value(R),
    Sync(Callback<dyn Fn(A) -> R>),
    Async(Callback<dyn Fn(A) -> LocalBoxFuture<'static, R>>),
}

impl<A: 'static, R: Clone + 'static> ConfigFn<A, R> {
    pub fn value(value: R) -> Self {
        Self::Value(value)
    }

    pub fn sync(f: impl Fn(A) -> R + 'static) -> Self {
        Self::Sync(Callback(Rc::new(f)))
    }

    pub fn future<Fut>(f: impl Fn(A) -> Fut + 'static) -> Self
    where
        Fut: Future<Output = R> + 'static,
    {
        Self::Async(Callback(Rc::new(move |arg| f(arg).boxed_local())))
    }

    pub fn evaluate(&self, arg: A) -> LocalBoxFuture<'static, R> {
        match self {
            Self::Value(v) => future::ready(v.clone()).boxed_local(),
            Self::Sync(f) => future::ready((f.0)(arg)).boxed_local(),
            Self::Async(f) => (f.0)(arg),
        }
    }
}

/// Evaluate any config slot to its value.
pub async fn evaluate_config_value<A: 'static, R: Clone + 'static>(slot: &ConfigFn<A, R>, arg: A) -> R {
    slot.evaluate(arg).await
}

impl<A, R: Clone> Clone for ConfigFn<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(v) => Self::Value(v.clone()),
            Self::Sync(f) => Self::Sync(f.clone()),
            Self::Async(f) => Self::Async(f.clone()),
        }
    }
}

impl<A, R: PartialEq> PartialEq for ConfigFn<A, R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Sync(a), Self::Sync(b)) => a == b,
            (Self::Async(a), Self::Async(b)) => a == b,
            _ => false,
        }
    }
}

impl<A, R> fmt::Debug for ConfigFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("ConfigFn::Value"),
            Self::Sync(_) => f.write_str("ConfigFn::Sync"),
            Self::Async(_) => f.write_str("ConfigFn::Async"),
        }
    }
}

/// A hook slot. JSON configuration can only ever produce `Invalid` here,
/// since functions are attached programmatically.
pub enum Hook<F: ?Sized> {
    Unset,
    Set(Callback<F>),
    Invalid(Value),
}

impl<F: ?Sized> Default for Hook<F> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        match self {
            Self::Unset => Self::Unset,
            Self::Set(f) => Self::Set(f.clone()),
            Self::Invalid(v) => Self::Invalid(v.clone()),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Hook::Unset"),
            Self::Set(_) => f.write_str("Hook::Set"),
            Self::Invalid(v) => write!(f, "Hook::Invalid({})", v),
        }
    }
}

impl<'de, F: ?Sized> Deserialize<'de> for Hook<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Self::Unset,
            other => Self::Invalid(other),
        })
    }
}
