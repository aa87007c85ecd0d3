//! Async facade over the blocking pool

mod common;

use std::time::Duration;

use bcryptx::{AsyncBcrypter, Bcrypter, Error, TunerConfig};
use common::Recording;

fn bcrypter(limit: usize) -> AsyncBcrypter<Recording> {
    let config = TunerConfig::new()
        .with_quick_max_latency(Duration::from_millis(20))
        .with_strong_max_latency(Duration::from_millis(80))
        .with_concurrency_limit(limit);
    AsyncBcrypter::new(Bcrypter::with_primitive(config, Recording::default()))
}

#[tokio::test]
async fn test_generate_compare_inspect() {
    let bcx = bcrypter(2);
    let costs = bcx.tune().await.unwrap().costs;

    let quick = bcx.generate_quick("12345").await.unwrap();
    let strong = bcx.generate_strong("12345").await.unwrap();

    assert_eq!(bcx.validate_hash(&quick).unwrap(), costs.quick);
    assert!(bcx.compare(quick.clone(), "12345").await.is_ok());
    assert!(matches!(
        bcx.compare(quick.clone(), "spaceballs").await,
        Err(Error::Mismatch)
    ));
    assert!(bcx.is_cost_quick(quick.clone()).await.is_ok());
    assert!(bcx.is_cost_strong(strong).await.is_ok());
    assert!(bcx.is_cost_strong(quick).await.unwrap_err().is_low_cost());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_tasks_respect_gate() {
    let bcx = bcrypter(1);
    bcx.tune().await.unwrap();

    let a = tokio::spawn({
        let bcx = bcx.clone();
        async move { bcx.generate_quick("a").await }
    });
    let b = tokio::spawn({
        let bcx = bcx.clone();
        async move { bcx.generate_quick("b").await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let spans = bcx.blocking().primitive().spans();
    assert_eq!(spans.len(), 2);
    assert!(!spans[0].overlaps(&spans[1]));
}

#[tokio::test]
async fn test_lazy_tuning_from_async() {
    let bcx = bcrypter(2);
    let first = bcx.current_costs().await.unwrap();
    let second = bcx.current_costs().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(bcx.blocking().primitive().tuning_runs(), 1);
}

#[test]
fn test_queued_generation_leaves_blocking_pool_free() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .max_blocking_threads(2)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let bcx = bcrypter(1);
        bcx.tune().await.unwrap();
        let hash = bcx.generate_quick("12345").await.unwrap();

        let queued: Vec<_> = (0..64)
            .map(|i| {
                let bcx = bcx.clone();
                tokio::spawn(async move { bcx.generate_quick(format!("pw-{i}")).await })
            })
            .collect();

        // Queued generation waits as tasks, so a blocking thread is free to compare
        let compared =
            tokio::time::timeout(Duration::from_millis(200), bcx.compare(hash, "12345")).await;
        assert!(
            matches!(compared, Ok(Ok(()))),
            "compare stuck behind queued generation: {compared:?}"
        );

        for task in queued {
            task.await.unwrap().unwrap();
        }
        assert_eq!(bcx.blocking().primitive().spans().len(), 65);
    });
}
