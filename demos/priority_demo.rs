//! Mixed callables at two priorities on a single-worker pool

use crossbeam_channel::bounded;
use prio_pool::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static STEP: AtomicUsize = AtomicUsize::new(0);

fn announce(op: &str, x: i64, y: i64) {
    let step = STEP.fetch_add(1, Ordering::SeqCst) + 1;
    println!("{}. {} x={} y={}", step, op, x, y);
    thread::sleep(Duration::from_micros(100));
}

fn add(x: i64, y: i64) -> i64 {
    announce("Add", x, y);
    x + y
}

struct Sub {
    y: i16,
}

impl Sub {
    fn call(&self, x: i16) -> i64 {
        announce("Sub", x.into(), self.y.into());
        i64::from(x - self.y)
    }
}

struct Mul;

impl Mul {
    fn mul(&self, x: i32, y: i32) -> i32 {
        announce("Mul", x.into(), y.into());
        x * y
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Priority Pool Demo ===\n");

    let pool = PriorityPool::new(1)?;

    // Keep the only worker busy while everything else is queued, so the run
    // order below is decided by priority alone.
    let (release_tx, release_rx) = bounded::<()>(1);
    pool.execute(Priority::REALTIME, move || {
        let _ = release_rx.recv();
    });

    let div = |x: i32, y: i32| -> f32 {
        announce("Div", x.into(), y.into());
        (x / y) as f32
    };

    let f1 = pool.submit_with(Priority(0), |(x, y): (i64, i64)| add(x, y), (1, 2));
    let f2 = pool.submit_with(Priority(0), move |x: i16| Sub { y: 2 }.call(x), 3);
    let f3 = pool.submit_with(Priority(1), move |(x, y): (i32, i32)| Mul.mul(x, y), (2, 3));
    let f4 = pool.submit_with(Priority(1), move |(x, y): (i32, i32)| div(x, y), (8, 2));

    println!("queued: {}", pool.pending_count());
    let _ = release_tx.send(());

    let add_result = f1.get()?;
    let sub_result = f2.get()?;
    let mul_result = f3.get()?;
    let div_result = f4.get()?;

    println!("====================");
    println!("+> {}", add_result);
    println!("-> {}", sub_result);
    println!("*> {}", mul_result);
    println!("/> {}", div_result);

    let snapshot = pool.metrics();
    println!(
        "\nexecuted {} tasks, avg queue wait {}us",
        snapshot.tasks_executed,
        snapshot.avg_wait_ns / 1_000
    );

    Ok(())
}
