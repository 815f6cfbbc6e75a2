//! Parameters - factory argument descriptors
//!
//! A parameter describes one argument of a declaration's factory: the target
//! type key, an optional qualifier, and whether the argument is a collection
//! of matches rather than a single dependency.
//!
//! Collection parameters must carry a qualifier: the element type of a
//! collection is not recoverable from the erased argument descriptor, so a
//! bare collection would have nothing to select by. That violation is
//! rejected when the parameter is built, not at first resolution.

use std::fmt;
use std::sync::Arc;

use futures::future;

use crate::error::{Error, Result};
use crate::injector::Injector;
use crate::key::TypeKey;
use crate::qualifier::{IntoQualifier, Qualifier};
use crate::resolution::{deferred, Instance, Resolution};

/// One factory argument: target type, optional qualifier, collection flag.
#[derive(Clone)]
pub struct Parameter {
    target: TypeKey,
    qualifier: Option<Qualifier>,
    collection: bool,
}

impl Parameter {
    /// Single dependency on `T`, looked up by type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            target: TypeKey::of::<T>(),
            qualifier: None,
            collection: false,
        }
    }

    /// Single dependency on `T`, looked up through an explicit qualifier.
    pub fn qualified<T: ?Sized + 'static>(qualifier: impl IntoQualifier) -> Self {
        Self {
            target: TypeKey::of::<T>(),
            qualifier: Some(qualifier.into_qualifier()),
            collection: false,
        }
    }

    /// Collection of every `T` the qualifier matches.
    pub fn collection_of<T: ?Sized + 'static>(qualifier: impl IntoQualifier) -> Self {
        Self {
            target: TypeKey::of::<T>(),
            qualifier: Some(qualifier.into_qualifier()),
            collection: true,
        }
    }

    /// Descriptor-driven constructor for generic registration paths.
    ///
    /// Fails with [`Error::InvalidArgument`] when `collection` is set
    /// without a qualifier.
    pub fn try_new(
        target: TypeKey,
        qualifier: Option<Qualifier>,
        collection: bool,
    ) -> Result<Self> {
        if collection && qualifier.is_none() {
            return Err(Error::invalid_argument(format!(
                "collection parameter `{target}` requires a qualifier"
            )));
        }
        Ok(Self {
            target,
            qualifier,
            collection,
        })
    }

    /// Target type key.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    /// Explicit qualifier, if one was supplied.
    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    /// Whether this argument collects every match.
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    /// The qualifier used for lookup: the explicit one, or the target type.
    fn effective_qualifier(&self) -> Qualifier {
        match &self.qualifier {
            Some(qualifier) => qualifier.clone(),
            None => Qualifier::for_key(self.target),
        }
    }

    /// Resolve this argument through the registry.
    ///
    /// Single parameters delegate to the registry's single-match lookup.
    /// Collection parameters gather every match; if any element is deferred
    /// the whole argument becomes one deferred collection whose elements are
    /// awaited together.
    pub fn resolve(&self, injector: &Injector) -> Result<Resolution> {
        let qualifier = self.effective_qualifier();
        if !self.collection {
            return injector.get(&qualifier);
        }

        let matches = injector.get_all(&qualifier)?;
        if matches.iter().any(Resolution::is_deferred) {
            let elements: Vec<_> = matches.into_iter().map(Resolution::into_deferred).collect();
            Ok(Resolution::Deferred(deferred(async move {
                let values = future::join_all(elements).await;
                Arc::new(values) as Instance
            })))
        } else {
            let values: Vec<Instance> = matches
                .into_iter()
                .filter_map(|resolution| match resolution {
                    Resolution::Ready(value) => Some(value),
                    Resolution::Deferred(_) => None,
                })
                .collect();
            Ok(Resolution::Ready(Arc::new(values)))
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("target", &self.target)
            .field(
                "qualifier",
                &self.qualifier.as_ref().map(Qualifier::label),
            )
            .field("collection", &self.collection)
            .finish()
    }
}
