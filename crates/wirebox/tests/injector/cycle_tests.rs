//! Cycle tests
//!
//! Cyclic graphs do not deadlock and do not raise a dedicated cycle error:
//! a declaration that is mid-resolution holds the in-progress sentinel and
//! is simply invisible to lookups. These tests pin down the observable
//! consequences so the behavior does not change silently.

use std::sync::Arc;

use wirebox::{Error, Injectable, Injector, Parameter, ResolvedArgs, TypeKey};

use crate::test_utils::init_tracing;

struct Hub {
    spokes: Vec<Arc<Spoke>>,
}

struct Spoke {
    hubs: Vec<Arc<Hub>>,
}

#[test]
fn collection_cycles_resolve_the_inner_lookup_to_empty() {
    init_tracing();
    let injector = Injector::new();
    injector.register(
        Injectable::of(
            vec![Parameter::collection_of::<Spoke>("spokes")],
            |args: ResolvedArgs| Hub {
                spokes: args.collection::<Spoke>(0),
            },
        )
        .named("hubs"),
    );
    injector.register(
        Injectable::of(
            vec![Parameter::collection_of::<Hub>("hubs")],
            |args: ResolvedArgs| Spoke {
                hubs: args.collection::<Hub>(0),
            },
        )
        .named("spokes"),
    );

    let hub = injector.get_sync_as::<Hub>(TypeKey::of::<Hub>()).unwrap();

    // The outer lookup sees the completed spoke; the spoke, resolved while
    // the hub was still pending, saw an empty collection instead of a cycle
    // error.
    assert_eq!(hub.spokes.len(), 1);
    assert!(hub.spokes[0].hubs.is_empty());
}

struct Ping;
struct Pong;

#[test]
fn single_dependency_cycles_surface_not_found() {
    let injector = Injector::new();
    injector.register(
        Injectable::of(
            vec![Parameter::qualified::<Pong>("pong")],
            |_args: ResolvedArgs| Ping,
        )
        .named("ping"),
    );
    injector.register(
        Injectable::of(
            vec![Parameter::qualified::<Ping>("ping")],
            |_args: ResolvedArgs| Pong,
        )
        .named("pong"),
    );

    // The inner lookup for "ping" happens while "ping" is pending, so the
    // declaration is invisible and the single-match lookup reports absence.
    let err = injector.get("ping").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert!(err.to_string().contains("`ping`"));

    // The failed attempt leaves both slots pending; later lookups keep
    // reporting absence rather than retrying the factories.
    let err = injector.get("ping").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    let err = injector.get("pong").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
