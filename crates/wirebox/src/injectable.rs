//! Injectables - registered producible types
//!
//! An injectable couples a factory with the descriptor the engine needs to
//! wire it: ordered parameters, alias names, and the interface chain used by
//! type qualifiers. Each injectable owns a memoized instance slot:
//!
//! ```text
//! Empty ──getInstance──▶ Pending ──factory──▶ Ready(value)
//!                           │                     ▲
//!                           └──▶ Deferred(fut) ───┘  (settles on fulfillment)
//! ```
//!
//! `Pending` doubles as the in-progress sentinel: a re-entrant lookup during
//! resolution observes it and treats the declaration as temporarily
//! unavailable. That is deliberate - dependency cycles degrade to empty
//! lookups instead of deadlocking (see the registry docs).

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures::{Future, FutureExt};
use tracing::trace;

use crate::error::Result;
use crate::injector::Injector;
use crate::key::TypeKey;
use crate::parameter::Parameter;
use crate::qualifier::IntoQualifier;
use crate::resolution::{deferred, Deferred, Instance, Resolution, ResolvedArgs};

/// Factory invoked with the resolved argument list.
pub type Factory = Arc<dyn Fn(ResolvedArgs) -> Resolution + Send + Sync>;

/// Memoization states of a declaration's instance slot.
enum Slot {
    /// Never requested
    Empty,
    /// Resolution started and has not settled; doubles as the in-progress
    /// sentinel observed by re-entrant lookups
    Pending,
    /// Settled to a concrete value
    Ready(Instance),
    /// Settled to a deferred value; overwritten with `Ready` on fulfillment
    Deferred(Deferred<Instance>),
}

/// One registered producible type: factory, parameters, aliases, interfaces,
/// and the memoized instance slot.
pub struct Injectable {
    produced: TypeKey,
    interfaces: Vec<TypeKey>,
    names: Vec<String>,
    parameters: Vec<Parameter>,
    factory: Factory,
    slot: Mutex<Slot>,
}

impl Injectable {
    /// Declaration built from a synchronous factory producing `T`.
    pub fn of<T, F>(parameters: Vec<Parameter>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(ResolvedArgs) -> T + Send + Sync + 'static,
    {
        Self::with_factory(
            TypeKey::of::<T>(),
            parameters,
            Arc::new(move |args| Resolution::Ready(Arc::new(factory(args)))),
        )
    }

    /// Declaration built from an asynchronous factory producing `T`.
    ///
    /// The produced value is always deferred; this is how await points enter
    /// a dependency graph in the first place.
    pub fn of_async<T, F, Fut>(parameters: Vec<Parameter>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(ResolvedArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::with_factory(
            TypeKey::of::<T>(),
            parameters,
            Arc::new(move |args| {
                Resolution::Deferred(deferred(
                    factory(args).map(|value| Arc::new(value) as Instance),
                ))
            }),
        )
    }

    /// Declaration wrapping an already-constructed value.
    ///
    /// Takes no parameters; the factory simply hands back the stored value,
    /// and the produced type is the value's own type.
    pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
        let instance: Instance = Arc::new(value);
        Self::with_factory(
            TypeKey::of::<T>(),
            Vec::new(),
            Arc::new(move |_args| Resolution::Ready(instance.clone())),
        )
    }

    fn with_factory(produced: TypeKey, parameters: Vec<Parameter>, factory: Factory) -> Self {
        Self {
            produced,
            interfaces: Vec::new(),
            names: Vec::new(),
            parameters,
            factory,
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Add an alias this declaration answers to.
    pub fn named(mut self, alias: impl Into<String>) -> Self {
        self.names.push(alias.into());
        self
    }

    /// Declare `I` (typically a `dyn Trait`) as an interface of the produced
    /// type, making this declaration matchable wherever `I` is required.
    pub fn implements<I: ?Sized + 'static>(mut self) -> Self {
        self.interfaces.push(TypeKey::of::<I>());
        self
    }

    /// Key of the produced type.
    pub fn produced(&self) -> TypeKey {
        self.produced
    }

    /// Declared interface chain, in declaration order.
    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    /// Registered aliases.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Ordered factory parameters.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Whether `name` is among the registered aliases.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|alias| alias == name)
    }

    /// Whether the produced type or any declared interface equals `key`.
    ///
    /// The chain is walked in declaration order, produced type first, and
    /// the walk stops at the first match.
    pub fn produces(&self, key: TypeKey) -> bool {
        self.produced == key || self.interfaces.iter().any(|interface| *interface == key)
    }

    /// Whether this declaration matches the given qualifier, type, or alias.
    pub fn qualifies_as(&self, qualifier: impl IntoQualifier) -> bool {
        qualifier.into_qualifier().matches(self)
    }

    /// Wire and invoke the factory, without touching the memo slot.
    ///
    /// Every parameter starts resolving before any is awaited. When none of
    /// the resolved arguments is deferred the factory runs synchronously;
    /// otherwise the arguments are awaited together, in declared order, and
    /// the factory output is one deferred value.
    pub fn create_instance(&self, injector: &Injector) -> Result<Resolution> {
        trace!("Creating instance of {}", self.produced);
        let resolved = self
            .parameters
            .iter()
            .map(|parameter| parameter.resolve(injector))
            .collect::<Result<Vec<_>>>()?;

        if resolved.iter().any(Resolution::is_deferred) {
            let factory = Arc::clone(&self.factory);
            let arguments: Vec<_> = resolved.into_iter().map(Resolution::into_deferred).collect();
            return Ok(Resolution::Deferred(deferred(async move {
                let values = futures::future::join_all(arguments).await;
                factory(ResolvedArgs::new(values)).await_value().await
            })));
        }

        let values: Vec<Instance> = resolved
            .into_iter()
            .filter_map(|resolution| match resolution {
                Resolution::Ready(value) => Some(value),
                Resolution::Deferred(_) => None,
            })
            .collect();
        Ok((self.factory)(ResolvedArgs::new(values)))
    }

    /// Memoized instance access.
    ///
    /// `Ok(None)` is the in-progress sentinel: resolution of this
    /// declaration has started and not settled, so the caller must treat it
    /// as temporarily unavailable. The first call flips the slot to pending,
    /// runs [`Self::create_instance`], and stores the outcome. A deferred
    /// outcome is wrapped so that fulfillment settles the slot with the
    /// concrete value; later calls then get the plain value without another
    /// await.
    pub fn get_instance(self: Arc<Self>, injector: &Injector) -> Result<Option<Resolution>> {
        {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Pending => return Ok(None),
                Slot::Ready(value) => return Ok(Some(Resolution::Ready(value.clone()))),
                Slot::Deferred(value) => return Ok(Some(Resolution::Deferred(value.clone()))),
                Slot::Empty => *slot = Slot::Pending,
            }
        }

        // A failed resolution leaves the slot pending; there is no recovery
        // layer, so the declaration stays invisible to later lookups.
        let created = self.create_instance(injector)?;

        let stored = match created {
            Resolution::Ready(value) => {
                *self.lock_slot() = Slot::Ready(value.clone());
                Resolution::Ready(value)
            }
            Resolution::Deferred(inner) => {
                let cell = Arc::downgrade(&self);
                let settling = deferred(async move {
                    let value = inner.await;
                    settle(&cell, value.clone());
                    value
                });
                *self.lock_slot() = Slot::Deferred(settling.clone());
                Resolution::Deferred(settling)
            }
        };
        Ok(Some(stored))
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Overwrite the slot with the fulfilled value, if the declaration is still
/// alive. A dropped registry just skips the write-back.
fn settle(cell: &Weak<Injectable>, value: Instance) {
    if let Some(declaration) = cell.upgrade() {
        trace!("Settled deferred instance of {}", declaration.produced);
        *declaration.lock_slot() = Slot::Ready(value);
    }
}

impl fmt::Debug for Injectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injectable")
            .field("produced", &self.produced)
            .field("names", &self.names)
            .field("interfaces", &self.interfaces)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}
