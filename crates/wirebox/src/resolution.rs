//! Value model for resolution outcomes
//!
//! A dependency graph may mix instantly-available values and values that
//! only exist after an await point. Everything the engine hands around is
//! therefore one of two shapes:
//!
//! ```text
//! Resolution::Ready(Instance)        value exists now
//! Resolution::Deferred(Deferred<_>)  value exists after an await
//! ```
//!
//! Deferred values are [`Shared`] boxed futures, so the memoized slot of a
//! declaration and every caller can await the same computation without
//! re-running it.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, Shared};
use futures::{Future, FutureExt};

use crate::error::{Error, Result};

/// A resolved dependency value.
///
/// Instances are reference-counted and type-erased; typed access goes
/// through [`Arc::downcast`] (see [`ResolvedArgs`] and the typed accessors
/// on the injector).
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A value that becomes available after an await point.
///
/// Cloning is cheap and every clone observes the same computation.
pub type Deferred<T> = Shared<BoxFuture<'static, T>>;

/// Wrap a future into a shareable deferred value.
pub fn deferred<T, F>(future: F) -> Deferred<T>
where
    T: Clone,
    F: Future<Output = T> + Send + 'static,
{
    future.boxed().shared()
}

/// Wrap an already-available value into a fulfilled deferred value.
pub fn settled<T>(value: T) -> Deferred<T>
where
    T: Clone + Send + 'static,
{
    future::ready(value).boxed().shared()
}

/// Outcome of resolving one dependency: available now, or after an await.
#[derive(Clone)]
pub enum Resolution {
    /// The value is available synchronously
    Ready(Instance),
    /// The value becomes available once the deferred computation fulfills
    Deferred(Deferred<Instance>),
}

impl Resolution {
    /// Wrap a concrete value as a ready resolution.
    pub fn ready<T: Any + Send + Sync>(value: T) -> Self {
        Self::Ready(Arc::new(value))
    }

    /// Whether this resolution still has an await point ahead of it.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Demand the value synchronously.
    ///
    /// Deferred resolutions fail with [`Error::SyncResolution`] naming the
    /// qualifier that was being resolved.
    pub fn into_sync(self, qualifier: &str) -> Result<Instance> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Deferred(_) => Err(Error::sync_resolution(qualifier)),
        }
    }

    /// Uniform asynchronous view: ready values become fulfilled futures.
    pub fn into_deferred(self) -> Deferred<Instance> {
        match self {
            Self::Ready(value) => settled(value),
            Self::Deferred(value) => value,
        }
    }

    /// Await the value, whichever shape it currently has.
    pub async fn await_value(self) -> Instance {
        match self {
            Self::Ready(value) => value,
            Self::Deferred(value) => value.await,
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Resolution::Ready"),
            Self::Deferred(_) => f.write_str("Resolution::Deferred"),
        }
    }
}

/// Positional argument list handed to a factory.
///
/// Arguments arrive in declared parameter order, already unwrapped to
/// concrete instances. The downcast helpers panic on a type mismatch: a
/// factory reading an argument as the wrong type is a registration bug, not
/// a runtime condition.
pub struct ResolvedArgs {
    values: Vec<Instance>,
}

impl ResolvedArgs {
    pub(crate) fn new(values: Vec<Instance>) -> Self {
        Self { values }
    }

    /// Number of resolved arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the factory takes no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw type-erased argument at `index`.
    pub fn instance(&self, index: usize) -> &Instance {
        &self.values[index]
    }

    /// Argument at `index` as a shared `Arc<T>`.
    pub fn arc<T: Any + Send + Sync>(&self, index: usize) -> Arc<T> {
        let instance = self.values.get(index).cloned().unwrap_or_else(|| {
            panic!(
                "factory requested argument {index} but only {} were resolved",
                self.values.len()
            )
        });
        instance
            .downcast::<T>()
            .unwrap_or_else(|_| panic!("factory argument {index} is not a `{}`", type_name::<T>()))
    }

    /// Argument at `index` as an owned clone of `T`.
    pub fn value<T: Any + Send + Sync + Clone>(&self, index: usize) -> T {
        self.arc::<T>(index).as_ref().clone()
    }

    /// Collection argument at `index`, each element downcast to `T`.
    pub fn collection<T: Any + Send + Sync>(&self, index: usize) -> Vec<Arc<T>> {
        let elements = self.arc::<Vec<Instance>>(index);
        elements
            .iter()
            .enumerate()
            .map(|(position, element)| {
                element.clone().downcast::<T>().unwrap_or_else(|_| {
                    panic!(
                        "element {position} of collection argument {index} is not a `{}`",
                        type_name::<T>()
                    )
                })
            })
            .collect()
    }
}
