//! # wirebox
//!
//! Runtime dependency resolution: a registry of class/factory/value
//! declarations that produces fully-wired object graphs on demand.
//!
//! The engine reconciles four concerns inside one compact algorithm:
//!
//! - type- and name-based lookup with a boolean qualifier algebra,
//! - per-declaration singleton memoization,
//! - transparent sync/async duality (a graph may mix instantly-available
//!   and deferred values),
//! - safe failure when a caller demands synchronous results from an
//!   asynchronous graph.
//!
//! ## Architecture
//!
//! ```text
//! Injector (registry, lookup, singleton table)
//! ├── Qualifier  (composable declaration predicates)
//! ├── Parameter  (factory argument descriptors)
//! └── Injectable (factory + descriptor + memo slot)
//! ```
//!
//! Callers ask the [`Injector`] for a type or alias; matching declarations
//! resolve their parameters recursively through the same registry, invoke
//! their factory, and memoize the result - unwrapped to a synchronous value
//! or left deferred, depending on what the dependency subgraph required.
//!
//! ## Example
//!
//! ```
//! use wirebox::{Injectable, Injector, Parameter, ResolvedArgs};
//!
//! struct Greeting(String);
//! struct Banner(String);
//!
//! let injector = Injector::new();
//! injector.register(Injectable::from_value(Greeting("hello".into())));
//! injector.register(Injectable::of(
//!     vec![Parameter::of::<Greeting>()],
//!     |args: ResolvedArgs| Banner(format!("** {} **", args.arc::<Greeting>(0).0)),
//! ));
//!
//! let banner = injector.get_sync_as::<Banner>(wirebox::TypeKey::of::<Banner>()).unwrap();
//! assert_eq!(banner.0, "** hello **");
//! ```

pub mod error;
pub mod injectable;
pub mod injector;
pub mod key;
pub mod parameter;
pub mod qualifier;
pub mod resolution;

// Re-export the lookup surface at the crate root
pub use error::{Error, Result};
pub use injectable::{Factory, Injectable};
pub use injector::{DeclarationInfo, Injector};
pub use key::TypeKey;
pub use parameter::Parameter;
pub use qualifier::{IntoQualifier, Qualifier};
pub use resolution::{deferred, settled, Deferred, Instance, Resolution, ResolvedArgs};
