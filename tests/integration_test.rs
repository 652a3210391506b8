use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use prio_pool::prelude::*;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Occupies the pool's only worker until the returned sender is used, so
/// that everything submitted meanwhile is ordered purely by the queue.
fn hold_single_worker(pool: &PriorityPool) -> Sender<()> {
    let (started_tx, started_rx) = bounded(0);
    let (release_tx, release_rx) = bounded::<()>(1);
    pool.submit(Priority::REALTIME, move || {
        started_tx.send(()).unwrap();
        release_rx.recv().unwrap();
    });
    started_rx.recv().unwrap();
    release_tx
}

/// Releases the held worker shortly after the caller has begun shutting
/// down, so the worker's next idle check already sees the stop flag.
fn release_later(release: Sender<()>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        release.send(()).unwrap();
    })
}

#[test]
fn test_two_tier_example_order() {
    init_tracing();
    let pool = PriorityPool::new(1).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    let release = hold_single_worker(&pool);

    let record = |tag: &'static str, value: f32| {
        let order = order.clone();
        move || {
            order.lock().push(tag);
            value
        }
    };

    let add = pool.submit(Priority(0), record("add", (1 + 2) as f32));
    let sub = pool.submit(Priority(0), record("sub", (3 - 2) as f32));
    let mul = pool.submit(Priority(1), record("mul", (2 * 3) as f32));
    let div = pool.submit(Priority(1), record("div", (8 / 2) as f32));
    assert_eq!(pool.pending_count(), 4);

    release.send(()).unwrap();

    assert_eq!(mul.get().unwrap(), 6.0);
    assert_eq!(div.get().unwrap(), 4.0);
    assert_eq!(add.get().unwrap(), 3.0);
    assert_eq!(sub.get().unwrap(), 1.0);
    assert_eq!(*order.lock(), vec!["mul", "div", "add", "sub"]);
}

#[test]
fn test_single_worker_dequeues_in_priority_then_fifo_order() {
    init_tracing();
    let pool = PriorityPool::new(1).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    let release = hold_single_worker(&pool);

    let mut priorities: Vec<u8> = (0..120).map(|i| (i % 6) as u8 * 40).collect();
    priorities.shuffle(&mut thread_rng());

    let handles: Vec<_> = priorities
        .iter()
        .enumerate()
        .map(|(seq, &p)| {
            let order = order.clone();
            pool.submit(Priority(p), move || order.lock().push((p, seq)))
        })
        .collect();

    release.send(()).unwrap();
    for handle in &handles {
        handle.get().unwrap();
    }

    let order = order.lock();
    assert_eq!(order.len(), priorities.len());
    for pair in order.windows(2) {
        let (p1, s1) = pair[0];
        let (p2, s2) = pair[1];
        assert!(p1 >= p2, "priority went up: {} then {}", p1, p2);
        if p1 == p2 {
            assert!(s1 < s2, "FIFO broken within priority {}", p1);
        }
    }
}

#[test]
fn test_every_unit_runs_exactly_once() {
    init_tracing();
    let pool = PriorityPool::new(4).unwrap();
    let seen = Arc::new(Mutex::new(HashSet::new()));
    let runs = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..1000u32)
        .map(|i| {
            let seen = seen.clone();
            let runs = runs.clone();
            pool.submit(Priority((i % 256) as u8), move || {
                runs.fetch_add(1, Ordering::SeqCst);
                assert!(seen.lock().insert(i), "unit {} ran twice", i);
                i
            })
        })
        .collect();

    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(handle.get().unwrap(), i as u32);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1000);
    assert_eq!(seen.lock().len(), 1000);
}

#[test]
fn test_concurrent_submitters() {
    let pool = Arc::new(PriorityPool::new(3).unwrap());
    let total = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4)
        .map(|t| {
            let pool = pool.clone();
            let total = total.clone();
            thread::spawn(move || {
                let handles: Vec<_> = (0..250)
                    .map(|i| {
                        let total = total.clone();
                        pool.submit(Priority(((t * 250 + i) % 256) as u8), move || {
                            total.fetch_add(1, Ordering::SeqCst);
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.get().unwrap();
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().unwrap();
    }
    assert_eq!(total.load(Ordering::SeqCst), 1000);
}

#[test]
fn test_callable_error_surfaces_unchanged() {
    let pool = PriorityPool::new(2).unwrap();

    let handle = pool.submit(Priority::NORMAL, || "not a number".parse::<u32>());
    let err = handle.get().unwrap().unwrap_err();

    assert_eq!(err, "not a number".parse::<u32>().unwrap_err());
}

#[test]
fn test_panic_surfaces_original_payload() {
    let pool = PriorityPool::new(1).unwrap();

    let handle = pool.submit(Priority::NORMAL, || -> u32 { panic!("division by zero") });
    let info = match handle.get() {
        Err(Error::Panicked(info)) => info,
        other => panic!("expected a panic, got {:?}", other),
    };
    assert_eq!(info.message(), "division by zero");

    let payload = info.into_payload();
    let resumed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        std::panic::resume_unwind(payload)
    }));
    let payload = resumed.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"division by zero"));

    // the worker survived
    assert_eq!(pool.submit(Priority::NORMAL, || 5).get().unwrap(), 5);
    assert_eq!(pool.panic_count(), 1);
}

#[test]
fn test_second_get_reports_consumed() {
    let pool = PriorityPool::new(1).unwrap();
    let handle = pool.submit(Priority::NORMAL, || vec![1, 2, 3]);

    assert_eq!(handle.get().unwrap(), vec![1, 2, 3]);
    assert!(matches!(handle.get(), Err(Error::AlreadyConsumed)));
}

#[test]
fn test_try_get_polls() {
    let pool = PriorityPool::new(1).unwrap();
    let release = hold_single_worker(&pool);

    let handle = pool.submit(Priority::NORMAL, || 11);
    assert!(handle.try_get().is_none());
    assert!(!handle.is_ready());

    release.send(()).unwrap();
    while !handle.is_ready() {
        thread::yield_now();
    }
    assert_eq!(handle.try_get().unwrap().unwrap(), 11);
    assert!(matches!(handle.try_get(), Some(Err(Error::AlreadyConsumed))));
}

#[test]
fn test_shutdown_abandons_queued_units() {
    init_tracing();
    let mut pool = PriorityPool::new(1).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));
    let release = hold_single_worker(&pool);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let ran = ran.clone();
            pool.submit(Priority::NORMAL, move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();
    assert_eq!(pool.pending_count(), 5);

    // a caller already blocked on a queued unit must be released too
    let waiter = {
        let (tx, rx) = bounded(1);
        let first = pool.submit(Priority::BACKGROUND, || 0);
        thread::spawn(move || tx.send(first.get().is_err()).unwrap());
        rx
    };

    let releaser = release_later(release);
    pool.shutdown();
    releaser.join().unwrap();

    for handle in &handles {
        assert!(matches!(handle.get(), Err(Error::Abandoned)));
    }
    assert!(waiter.recv().unwrap());
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(pool.pending_count(), 0);
    assert_eq!(pool.metrics().tasks_abandoned, 6);
}

#[test]
fn test_shutdown_releases_running_unit_waiting_on_queued_one() {
    let mut pool = PriorityPool::new(1).unwrap();
    let (started_tx, started_rx) = bounded(0);
    let (handle_tx, handle_rx) = bounded::<TaskHandle<u32>>(1);

    let waiter = pool.submit(Priority::REALTIME, move || {
        started_tx.send(()).unwrap();
        let queued = handle_rx.recv().unwrap();
        queued.get()
    });
    started_rx.recv().unwrap();

    handle_tx.send(pool.submit(Priority(0), || 7)).unwrap();

    let (done_tx, done_rx) = bounded(1);
    let stopper = thread::spawn(move || {
        pool.shutdown();
        done_tx.send(()).unwrap();
    });

    done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("shutdown never finished");
    stopper.join().unwrap();
    assert!(matches!(waiter.get().unwrap(), Err(Error::Abandoned)));
}

#[test]
fn test_drop_abandons_queued_units() {
    let pool = PriorityPool::new(1).unwrap();
    let release = hold_single_worker(&pool);
    let handle = pool.submit(Priority::LOW, || "late");

    let releaser = release_later(release);
    drop(pool);
    releaser.join().unwrap();

    assert!(handle.get().unwrap_err().is_abandoned());
}

#[test]
fn test_drain_policy_completes_everything() {
    let config = Config::builder()
        .num_threads(2)
        .shutdown_policy(ShutdownPolicy::Drain)
        .build()
        .unwrap();
    let pool = PriorityPool::with_config(&config).unwrap();

    let handles: Vec<_> = (0..200u64)
        .map(|i| pool.submit(Priority((i % 3) as u8), move || i))
        .collect();
    drop(pool);

    let sum: u64 = handles.iter().map(|h| h.get().unwrap()).sum();
    assert_eq!(sum, 199 * 200 / 2);
}

#[test]
fn test_dropping_handle_does_not_cancel() {
    let pool = PriorityPool::new(1).unwrap();
    let (tx, rx) = bounded(1);

    drop(pool.submit(Priority::NORMAL, move || tx.send("ran").unwrap()));

    assert_eq!(rx.recv().unwrap(), "ran");
}
