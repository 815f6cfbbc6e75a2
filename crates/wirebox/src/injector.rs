//! Injector - the process-wide declaration registry
//!
//! The injector owns every registered [`Injectable`] in insertion order and
//! exposes the lookup surface of the engine:
//!
//! ```text
//! get / get_all          value or deferred, as the graph requires
//! get_sync / get_all_sync   synchronous or Error::SyncResolution
//! get_async / get_all_async uniform deferred view
//! create / create_sync / create_async   unregistered, unmemoized wiring
//! ```
//!
//! Registration order is preserved and is the tie-break order whenever a
//! qualifier matches more than one declaration. A declaration that is mid-
//! resolution (its slot holds the in-progress sentinel) is invisible to
//! sibling lookups: `get_all` drops it rather than surfacing the sentinel,
//! which is also why dependency cycles degrade to empty lookups instead of
//! erroring.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::injectable::Injectable;
use crate::qualifier::{IntoQualifier, Qualifier};
use crate::resolution::{deferred, Deferred, Instance, Resolution};

/// Insertion-ordered registry of declarations with qualifier lookup.
///
/// Create one per process (or per test) and register everything up front;
/// declarations are never replaced or removed. All lookup entry points
/// accept a [`Qualifier`], an alias string, or a
/// [`TypeKey`](crate::key::TypeKey).
#[derive(Default)]
pub struct Injector {
    declarations: RwLock<Vec<Arc<Injectable>>>,
}

impl Injector {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration.
    ///
    /// Never replaces or merges: registering the same type twice yields two
    /// independently matchable declarations, in registration order.
    pub fn register(&self, injectable: Injectable) {
        debug!(
            "Registered declaration for {} (aliases: [{}])",
            injectable.produced(),
            injectable.names().join(", ")
        );
        self.write_declarations().push(Arc::new(injectable));
    }

    /// Resolve every declaration the qualifier matches.
    ///
    /// Results come back in registration order. Declarations whose slot
    /// holds the in-progress sentinel are dropped from the result.
    pub fn get_all(&self, qualifier: impl IntoQualifier) -> Result<Vec<Resolution>> {
        let qualifier = qualifier.into_qualifier();
        let matches = self.matching(&qualifier);
        trace!(
            "Qualifier `{}` matched {} declaration(s)",
            qualifier,
            matches.len()
        );
        let mut results = Vec::with_capacity(matches.len());
        for declaration in matches {
            if let Some(resolution) = declaration.get_instance(self)? {
                results.push(resolution);
            }
        }
        Ok(results)
    }

    /// Resolve exactly one declaration.
    ///
    /// Zero matches fail with [`Error::NotFound`], more than one with
    /// [`Error::Ambiguous`]; both name the qualifier.
    pub fn get(&self, qualifier: impl IntoQualifier) -> Result<Resolution> {
        let qualifier = qualifier.into_qualifier();
        let mut results = self.get_all(&qualifier)?;
        match results.len() {
            1 => Ok(results.remove(0)),
            0 => Err(Error::not_found(qualifier.label())),
            count => Err(Error::ambiguous(qualifier.label(), count)),
        }
    }

    /// Resolve exactly one declaration, demanding a synchronous value.
    ///
    /// A deferred result fails with [`Error::SyncResolution`]: the caller's
    /// assumption that the dependency subgraph is synchronous was wrong.
    pub fn get_sync(&self, qualifier: impl IntoQualifier) -> Result<Instance> {
        let qualifier = qualifier.into_qualifier();
        self.get(&qualifier)?.into_sync(qualifier.label())
    }

    /// Resolve every match, demanding synchronous values for all of them.
    pub fn get_all_sync(&self, qualifier: impl IntoQualifier) -> Result<Vec<Instance>> {
        let qualifier = qualifier.into_qualifier();
        self.get_all(&qualifier)?
            .into_iter()
            .map(|resolution| resolution.into_sync(qualifier.label()))
            .collect()
    }

    /// Resolve exactly one declaration as a deferred value, wrapping ready
    /// values in already-fulfilled futures.
    pub fn get_async(&self, qualifier: impl IntoQualifier) -> Result<Deferred<Instance>> {
        Ok(self.get(qualifier)?.into_deferred())
    }

    /// Resolve every match as one deferred collection, awaited together.
    pub fn get_all_async(&self, qualifier: impl IntoQualifier) -> Result<Deferred<Vec<Instance>>> {
        let elements: Vec<_> = self
            .get_all(qualifier)?
            .into_iter()
            .map(Resolution::into_deferred)
            .collect();
        Ok(deferred(future::join_all(elements)))
    }

    /// Wire up a caller-supplied declaration without registering or
    /// memoizing it: a fresh instance on every call.
    pub fn create(&self, injectable: &Injectable) -> Result<Resolution> {
        injectable.create_instance(self)
    }

    /// [`Self::create`], demanding a synchronous value.
    pub fn create_sync(&self, injectable: &Injectable) -> Result<Instance> {
        self.create(injectable)?
            .into_sync(injectable.produced().name())
    }

    /// [`Self::create`] as a deferred value.
    pub fn create_async(&self, injectable: &Injectable) -> Result<Deferred<Instance>> {
        Ok(self.create(injectable)?.into_deferred())
    }

    /// Typed synchronous lookup: resolve one match and downcast to `T`.
    pub fn get_sync_as<T: Any + Send + Sync>(
        &self,
        qualifier: impl IntoQualifier,
    ) -> Result<Arc<T>> {
        let qualifier = qualifier.into_qualifier();
        downcast::<T>(self.get_sync(&qualifier)?, qualifier.label())
    }

    /// Typed synchronous multi-lookup, in registration order.
    pub fn get_all_sync_as<T: Any + Send + Sync>(
        &self,
        qualifier: impl IntoQualifier,
    ) -> Result<Vec<Arc<T>>> {
        let qualifier = qualifier.into_qualifier();
        self.get_all_sync(&qualifier)?
            .into_iter()
            .map(|instance| downcast::<T>(instance, qualifier.label()))
            .collect()
    }

    /// Typed asynchronous lookup: await the single match and downcast.
    pub async fn get_async_as<T: Any + Send + Sync>(
        &self,
        qualifier: impl IntoQualifier,
    ) -> Result<Arc<T>> {
        let qualifier = qualifier.into_qualifier();
        let instance = self.get_async(&qualifier)?.await;
        downcast::<T>(instance, qualifier.label())
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.read_declarations().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read_declarations().is_empty()
    }

    /// Whether any declaration matches the qualifier. Does not resolve.
    pub fn contains(&self, qualifier: impl IntoQualifier) -> bool {
        !self.matching(&qualifier.into_qualifier()).is_empty()
    }

    /// Descriptive listing of every registered declaration, in order.
    pub fn declarations(&self) -> Vec<DeclarationInfo> {
        self.read_declarations()
            .iter()
            .map(|declaration| DeclarationInfo {
                produced: declaration.produced().name(),
                aliases: declaration.names().to_vec(),
                interfaces: declaration
                    .interfaces()
                    .iter()
                    .map(|key| key.name())
                    .collect(),
            })
            .collect()
    }

    /// Declarations matching `qualifier`, cloned out so no lock is held
    /// while instances resolve (resolution re-enters the registry).
    fn matching(&self, qualifier: &Qualifier) -> Vec<Arc<Injectable>> {
        self.read_declarations()
            .iter()
            .filter(|declaration| qualifier.matches(declaration))
            .cloned()
            .collect()
    }

    fn read_declarations(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<Injectable>>> {
        self.declarations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_declarations(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<Injectable>>> {
        self.declarations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn downcast<T: Any + Send + Sync>(instance: Instance, qualifier: &str) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch(qualifier, type_name::<T>()))
}

/// Description of one registered declaration, for listings and diagnostics.
#[derive(Debug, Clone)]
pub struct DeclarationInfo {
    /// Produced type name
    pub produced: &'static str,
    /// Registered aliases
    pub aliases: Vec<String>,
    /// Declared interface names
    pub interfaces: Vec<&'static str>,
}

impl fmt::Display for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registered declarations:")?;
        for info in self.declarations() {
            write!(f, "  - {}", info.produced)?;
            if !info.aliases.is_empty() {
                write!(f, " (aliases: {})", info.aliases.join(", "))?;
            }
            if !info.interfaces.is_empty() {
                write!(f, " (interfaces: {})", info.interfaces.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
