//! Sync/async duality tests
//!
//! A graph stays synchronous until an async factory introduces an await
//! point; from there every dependent becomes deferred. Synchronous entry
//! points must refuse deferred results, asynchronous entry points must
//! accept both, and a fulfilled deferred value must settle back into the
//! memo slot so later synchronous reads succeed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wirebox::{Error, Injectable, Injector, Parameter, Resolution, ResolvedArgs, TypeKey};

use crate::test_utils::{init_tracing, AppConfig, HttpClient};

fn register_async_config(injector: &Injector) {
    injector.register(
        Injectable::of_async(Vec::new(), |_args: ResolvedArgs| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            AppConfig::local()
        })
        .named("config"),
    );
    injector.register(Injectable::of(
        vec![Parameter::of::<AppConfig>()],
        |args: ResolvedArgs| HttpClient {
            config: args.arc::<AppConfig>(0),
        },
    ));
}

#[tokio::test(start_paused = true)]
async fn sync_lookup_fails_when_the_graph_defers() {
    init_tracing();
    let injector = Injector::new();
    register_async_config(&injector);

    let err = injector.get_sync(TypeKey::of::<HttpClient>()).unwrap_err();
    assert!(matches!(err, Error::SyncResolution { .. }));

    // The same declaration resolves fine through the async entry point.
    let client = injector
        .get_async_as::<HttpClient>(TypeKey::of::<HttpClient>())
        .await
        .unwrap();
    assert_eq!(client.config.base_url, "http://localhost:9900");
}

#[tokio::test(start_paused = true)]
async fn fulfilled_deferred_values_settle_the_slot() {
    let injector = Injector::new();
    register_async_config(&injector);

    // Before fulfillment the slot holds a deferred value.
    let err = injector.get_sync("config").unwrap_err();
    assert!(matches!(err, Error::SyncResolution { .. }));

    let awaited = injector.get_async_as::<AppConfig>("config").await.unwrap();

    // After fulfillment the slot holds the concrete value.
    let settled = injector.get_sync_as::<AppConfig>("config").unwrap();
    assert!(Arc::ptr_eq(&awaited, &settled));
}

#[tokio::test(start_paused = true)]
async fn memoized_deferred_values_share_one_factory_run() {
    let injector = Injector::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    injector.register(
        Injectable::of_async(Vec::new(), move |_args: ResolvedArgs| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                AppConfig::local()
            }
        })
        .named("config"),
    );

    let first = injector.get_async("config").unwrap();
    let second = injector.get_async("config").unwrap();

    let (a, b) = futures::join!(first, second);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn async_view_wraps_ready_values() {
    let injector = Injector::new();
    injector.register(Injectable::from_value(AppConfig::local()).named("config"));

    // Still a synchronous resolution underneath
    assert!(matches!(
        injector.get("config").unwrap(),
        Resolution::Ready(_)
    ));

    let config = injector.get_async_as::<AppConfig>("config").await.unwrap();
    assert_eq!(config.base_url, "http://localhost:9900");
}

#[tokio::test(start_paused = true)]
async fn get_all_async_joins_mixed_graphs() {
    let injector = Injector::new();
    injector.register(Injectable::from_value(1_i32).named("n"));
    injector.register(
        Injectable::of_async(Vec::new(), |_args: ResolvedArgs| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            2_i32
        })
        .named("n"),
    );
    injector.register(Injectable::from_value(3_i32).named("n"));

    let numbers = injector.get_all_async("n").unwrap().await;
    let numbers: Vec<i32> = numbers
        .into_iter()
        .map(|n| *n.downcast::<i32>().ok().unwrap())
        .collect();
    // Registration order survives even though the middle value fulfilled last
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn deferred_collection_parameters_await_elements_together() {
    let injector = Injector::new();
    injector.register(Injectable::from_value(1_i32).named("n"));
    injector.register(
        Injectable::of_async(Vec::new(), |_args: ResolvedArgs| async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            2_i32
        })
        .named("n"),
    );
    injector.register(
        Injectable::of_async(Vec::new(), |_args: ResolvedArgs| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            3_i32
        })
        .named("n"),
    );
    injector.register(Injectable::of(
        vec![Parameter::collection_of::<i32>("n")],
        |args: ResolvedArgs| {
            let numbers: Vec<i32> = args.collection::<i32>(0).iter().map(|n| **n).collect();
            Ordered(numbers)
        },
    ));

    // One deferred element is enough to defer the whole collection.
    let err = injector.get_sync(TypeKey::of::<Ordered>()).unwrap_err();
    assert!(matches!(err, Error::SyncResolution { .. }));

    let ordered = injector
        .get_async_as::<Ordered>(TypeKey::of::<Ordered>())
        .await
        .unwrap();
    assert_eq!(ordered.0, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn factory_arguments_arrive_in_declared_order() {
    let injector = Injector::new();
    injector.register(
        Injectable::of_async(Vec::new(), |_args: ResolvedArgs| async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Slow("slow")
        })
        .named("slow"),
    );
    injector.register(
        Injectable::of_async(Vec::new(), |_args: ResolvedArgs| async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Fast("fast")
        })
        .named("fast"),
    );
    injector.register(Injectable::of(
        vec![
            Parameter::qualified::<Slow>("slow"),
            Parameter::qualified::<Fast>("fast"),
        ],
        |args: ResolvedArgs| Pair(args.arc::<Slow>(0).0, args.arc::<Fast>(1).0),
    ));

    let pair = injector
        .get_async_as::<Pair>(TypeKey::of::<Pair>())
        .await
        .unwrap();
    assert_eq!(pair.0, "slow");
    assert_eq!(pair.1, "fast");
}

struct Slow(&'static str);
struct Fast(&'static str);
struct Pair(&'static str, &'static str);

/// Collection elements in the order the factory received them.
struct Ordered(Vec<i32>);
