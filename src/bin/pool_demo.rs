//! Runs an independent function over a range of values on a pool of workers
//! sized to the machine. Run it a few times: the output order changes,
//! because nothing orders the workers relative to each other.

use anyhow::{Context, Result};

use cosmo_viewer::pool::{WorkerPool, available_workers};

fn greet(worker: usize, value: u64) {
    println!(
        "Hello, I am worker {worker} of process {} printing value {value}",
        std::process::id()
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let n_workers = available_workers();
    let values: Vec<u64> = (1..=n_workers as u64).map(|v| v + 10).collect();

    println!("About to start:");

    // Workers are joined when `pool` goes out of scope, on error paths too.
    let pool = WorkerPool::new(n_workers, greet).context("starting worker pool")?;
    for scale in 1..=3u64 {
        let summary = pool
            .run_batch(values.iter().map(|v| v * scale))
            .with_context(|| format!("batch {scale}"))?;
        log::info!(
            "batch {scale}: {} of {} values handled, per worker {:?}",
            summary.completed,
            summary.dispatched,
            summary.per_worker
        );
        println!("------------");
    }
    pool.shutdown();

    println!("All done!");
    Ok(())
}
