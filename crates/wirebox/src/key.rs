//! Runtime type identity
//!
//! The engine never inspects source metadata; every registration carries an
//! explicit descriptor built from [`TypeKey`] values. A key pairs the
//! `TypeId` used for matching with the type name used for diagnostics.
//!
//! Keys can be built for unsized types, so `dyn Trait` interfaces are valid
//! lookup targets alongside concrete types.

use std::any::{type_name, TypeId};
use std::fmt;

/// Identity of a producible or queryable type.
///
/// Two keys are equal when their `TypeId`s are equal; the stored name is
/// carried only for error messages and registry listings.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Build the key for `T`.
    ///
    /// `T` may be unsized, which makes trait objects usable as interface
    /// keys: `TypeKey::of::<dyn Greeter>()`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully-qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
