//! Qualifiers - composable declaration predicates
//!
//! A qualifier selects declarations out of the registry. The two primitive
//! forms mirror the two ways a dependency can be asked for:
//!
//! - by alias: [`Qualifier::named`] matches declarations registered under
//!   that alias;
//! - by type: [`Qualifier::of`] / [`Qualifier::for_key`] match declarations
//!   whose produced type or any declared interface equals the queried key.
//!
//! Qualifiers are immutable and close under `and` / `or` / `and_not` /
//! `or_not`; combinators build new values and compose the textual labels
//! used in diagnostics.

use std::fmt;
use std::sync::Arc;

use crate::injectable::Injectable;
use crate::key::TypeKey;

type Predicate = Arc<dyn Fn(&Injectable) -> bool + Send + Sync>;

/// A named, composable predicate over registered declarations.
#[derive(Clone)]
pub struct Qualifier {
    label: Arc<str>,
    predicate: Predicate,
}

impl Qualifier {
    /// Build a qualifier from an arbitrary predicate.
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Injectable) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into().into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Match declarations registered under `alias`.
    pub fn named(alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let label = alias.clone();
        Self::new(label, move |declaration| declaration.has_name(&alias))
    }

    /// Match declarations producing `T` or declaring it as an interface.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::for_key(TypeKey::of::<T>())
    }

    /// Match declarations producing `key` or declaring it as an interface.
    pub fn for_key(key: TypeKey) -> Self {
        Self::new(key.name(), move |declaration| declaration.produces(key))
    }

    /// Test one declaration. Pure, no side effects.
    pub fn matches(&self, declaration: &Injectable) -> bool {
        (self.predicate)(declaration)
    }

    /// The diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Both this qualifier and `other` match.
    pub fn and(&self, other: impl IntoQualifier) -> Qualifier {
        self.combine(other.into_qualifier(), "and", |a, b| a && b)
    }

    /// Either this qualifier or `other` matches.
    pub fn or(&self, other: impl IntoQualifier) -> Qualifier {
        self.combine(other.into_qualifier(), "or", |a, b| a || b)
    }

    /// This qualifier matches and `other` does not.
    pub fn and_not(&self, other: impl IntoQualifier) -> Qualifier {
        self.combine(other.into_qualifier(), "and not", |a, b| a && !b)
    }

    /// This qualifier matches or `other` does not.
    pub fn or_not(&self, other: impl IntoQualifier) -> Qualifier {
        self.combine(other.into_qualifier(), "or not", |a, b| a || !b)
    }

    fn combine(&self, other: Qualifier, operator: &str, merge: fn(bool, bool) -> bool) -> Qualifier {
        let label = format!("({} {operator} {})", self.label, other.label);
        let left = self.predicate.clone();
        let right = other.predicate;
        Qualifier::new(label, move |declaration| {
            merge(left(declaration), right(declaration))
        })
    }
}

impl fmt::Debug for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qualifier({})", self.label)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Conversion into a [`Qualifier`], accepted by every lookup entry point.
///
/// Converting an existing qualifier is the identity; strings become alias
/// qualifiers; type keys become produced-type qualifiers.
pub trait IntoQualifier {
    /// Perform the conversion.
    fn into_qualifier(self) -> Qualifier;
}

impl IntoQualifier for Qualifier {
    fn into_qualifier(self) -> Qualifier {
        self
    }
}

impl IntoQualifier for &Qualifier {
    fn into_qualifier(self) -> Qualifier {
        self.clone()
    }
}

impl IntoQualifier for &str {
    fn into_qualifier(self) -> Qualifier {
        Qualifier::named(self)
    }
}

impl IntoQualifier for String {
    fn into_qualifier(self) -> Qualifier {
        Qualifier::named(self)
    }
}

impl IntoQualifier for TypeKey {
    fn into_qualifier(self) -> Qualifier {
        Qualifier::for_key(self)
    }
}
