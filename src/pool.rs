//! Fixed-size worker pool with scoped lifetime.
//!
//! Values are submitted by value over a bounded channel; each worker runs the
//! same task on whatever it receives. Nothing is returned to the caller
//! except an acknowledgement per value, which is how [`WorkerPool::run_batch`]
//! knows the batch has drained. Dropping the pool closes the job channel and
//! joins every worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("a worker pool needs at least one worker")]
    NoWorkers,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("all workers exited with {pending} values still pending")]
    Disconnected { pending: usize },
}

enum Ack {
    Done { worker: usize },
    Panicked { worker: usize, message: String },
}

/// Outcome of one drained batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub dispatched: usize,
    pub completed: usize,
    /// Values handled by each worker, indexed by worker id.
    pub per_worker: Vec<usize>,
}

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

pub struct WorkerPool<T> {
    jobs: Option<Sender<T>>,
    acks: Receiver<Ack>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `size` workers, each running `task(worker_id, value)` for every
    /// value it receives.
    pub fn new<F>(size: usize, task: F) -> Result<Self, PoolError>
    where
        F: Fn(usize, T) + Send + Sync + 'static,
    {
        if size == 0 {
            return Err(PoolError::NoWorkers);
        }
        let (job_tx, job_rx) = crossbeam_channel::bounded::<T>(size);
        let (ack_tx, ack_rx) = crossbeam_channel::unbounded();
        let task = Arc::new(task);

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let jobs = job_rx.clone();
            let acks = ack_tx.clone();
            let task = Arc::clone(&task);
            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker_loop(id, &jobs, &acks, task.as_ref()))?;
            workers.push(handle);
        }
        log::debug!("started {size} workers");

        Ok(Self {
            jobs: Some(job_tx),
            acks: ack_rx,
            workers,
        })
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Dispatch every value and block until all of them have been handled.
    ///
    /// A panicking task is reported as [`PoolError::WorkerPanicked`] once the
    /// rest of the batch has drained; that worker is gone afterwards.
    pub fn run_batch<I>(&self, values: I) -> Result<BatchSummary, PoolError>
    where
        I: IntoIterator<Item = T>,
    {
        let Some(jobs) = &self.jobs else {
            return Err(PoolError::Disconnected { pending: 0 });
        };

        let mut dispatched = 0;
        for value in values {
            if jobs.send(value).is_err() {
                break;
            }
            dispatched += 1;
        }

        let mut summary = BatchSummary {
            dispatched,
            completed: 0,
            per_worker: vec![0; self.workers.len()],
        };
        let mut failure = None;
        for received in 0..dispatched {
            match self.acks.recv() {
                Ok(Ack::Done { worker }) => {
                    summary.completed += 1;
                    summary.per_worker[worker] += 1;
                }
                Ok(Ack::Panicked { worker, message }) => {
                    log::error!("worker {worker} panicked: {message}");
                    failure.get_or_insert(PoolError::WorkerPanicked { worker, message });
                }
                Err(_) => {
                    failure.get_or_insert(PoolError::Disconnected {
                        pending: dispatched - received,
                    });
                    break;
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}

impl<T> WorkerPool<T> {
    /// Close the job channel and wait for every worker to exit.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        // Workers leave their receive loop once the sender is gone.
        self.jobs.take();
        for handle in self.workers.drain(..) {
            // Task panics are caught inside the worker, so a failed join
            // carries nothing worth reporting.
            let _ = handle.join();
        }
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.close();
            log::debug!("worker pool shut down");
        }
    }
}

fn worker_loop<T, F>(id: usize, jobs: &Receiver<T>, acks: &Sender<Ack>, task: &F)
where
    F: Fn(usize, T),
{
    for value in jobs.iter() {
        match panic::catch_unwind(AssertUnwindSafe(|| task(id, value))) {
            Ok(()) => {
                if acks.send(Ack::Done { worker: id }).is_err() {
                    return;
                }
            }
            Err(payload) => {
                let _ = acks.send(Ack::Panicked {
                    worker: id,
                    message: panic_message(payload.as_ref()),
                });
                return;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Number of available processing units, at least one.
pub fn available_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn zero_workers_is_an_error() {
        let err = WorkerPool::<u32>::new(0, |_, _| {}).err().unwrap();
        assert!(matches!(err, PoolError::NoWorkers));
    }

    #[test]
    fn every_value_runs_exactly_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pool = WorkerPool::new(4, move |_, v: u32| sink.lock().unwrap().push(v)).unwrap();

        let summary = pool.run_batch(0..50).unwrap();
        assert_eq!(summary.dispatched, 50);
        assert_eq!(summary.completed, 50);
        assert_eq!(summary.per_worker.iter().sum::<usize>(), 50);

        let mut values = seen.lock().unwrap().clone();
        values.sort_unstable();
        assert_eq!(values, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn batches_drain_before_returning() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let pool = WorkerPool::new(3, move |_, _: usize| {
            thread::sleep(std::time::Duration::from_millis(2));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        for batch in 1..=3 {
            pool.run_batch(0..7).unwrap();
            assert_eq!(count.load(Ordering::SeqCst), 7 * batch);
        }
        pool.shutdown();
    }

    #[test]
    fn empty_batch() {
        let pool = WorkerPool::new(2, |_, _: u8| {}).unwrap();
        let summary = pool.run_batch(Vec::new()).unwrap();
        assert_eq!(summary.dispatched, 0);
        assert_eq!(summary.completed, 0);
    }

    #[test]
    fn panicking_task_fails_the_batch() {
        let pool = WorkerPool::new(2, |_, v: u32| {
            if v == 3 {
                panic!("bad value {v}");
            }
        })
        .unwrap();
        match pool.run_batch(0..6) {
            Err(PoolError::WorkerPanicked { message, .. }) => {
                assert_eq!(message, "bad value 3");
            }
            other => panic!("expected worker panic, got {other:?}"),
        }
    }

    #[test]
    fn drop_joins_workers() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&count);
            let pool = WorkerPool::new(2, move |_, _: u8| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
            pool.run_batch([1, 2, 3]).unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
        // Only the test's own handle is left once the workers are joined.
        assert_eq!(Arc::strong_count(&count), 1);
    }
}
