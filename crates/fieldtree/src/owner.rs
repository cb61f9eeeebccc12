// crates/fieldtree/src/owner.rs
//! Single-owner execution context for state that must not be touched from
//! more than one thread.
//!
//! The owner thread builds its state itself, so the state (and the engine
//! inside it) never has to be `Send`. Other threads hand it closures through
//! a channel and block until the result comes back. Jobs run one at a time,
//! in the order they were queued.

use crate::error::OwnerError;
use crate::log::{LogContext, my_debug, my_error, my_info};
use crossbeam_channel::{self, Receiver, Sender};
use std::thread::{self, JoinHandle, ThreadId};

const CTX: LogContext = LogContext::new("owner", "run");

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

/// Handle to a thread that exclusively owns a value of type `S`.
pub struct Owner<S> {
    jobs: Option<Sender<Job<S>>>,
    thread: Option<JoinHandle<()>>,
    owner_id: ThreadId,
}

impl<S: 'static> Owner<S> {
    /// Spawns the owner thread and builds its state there.
    ///
    /// Blocks until `init` has run. If it fails, the thread exits and the
    /// error is returned.
    pub fn spawn<F, E>(name: &str, init: F) -> Result<Result<Self, E>, OwnerError>
    where
        F: FnOnce() -> Result<S, E> + Send + 'static,
        E: Send + 'static,
    {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job<S>>();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), E>>(1);

        let thread = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || match init() {
                Ok(state) => {
                    let _ = ready_tx.send(Ok(()));
                    drain(state, job_rx);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| OwnerError::SpawnFailed(e.to_string()))?;
        let owner_id = thread.thread().id();

        match ready_rx.recv() {
            Ok(Ok(())) => {
                my_info!(CTX, "Owner thread '{}' started", name);
                Ok(Ok(Self {
                    jobs: Some(job_tx),
                    thread: Some(thread),
                    owner_id,
                }))
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Ok(Err(e))
            }
            // `init` panicked.
            Err(_) => {
                let _ = thread.join();
                Err(OwnerError::Disconnected)
            }
        }
    }

    /// Runs `job` on the owner thread and waits for its result.
    ///
    /// Called from any other thread, the job is queued behind every job
    /// submitted before it. Called from the owner thread itself, it is
    /// refused with [`OwnerError::Reentrant`].
    pub fn run<R, F>(&self, job: F) -> Result<R, OwnerError>
    where
        R: Send + 'static,
        F: FnOnce(&mut S) -> R + Send + 'static,
    {
        if thread::current().id() == self.owner_id {
            return Err(OwnerError::Reentrant);
        }
        let jobs = self.jobs.as_ref().ok_or(OwnerError::Disconnected)?;
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        jobs.send(Box::new(move |state: &mut S| {
            let _ = reply_tx.send(job(state));
        }))
        .map_err(|_| OwnerError::Disconnected)?;
        reply_rx.recv().map_err(|_| OwnerError::Disconnected)
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner_id
    }

    /// Stops accepting jobs, waits for every queued job to finish, then drops
    /// the state on the owner thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender ends the drain loop once the queue is empty.
        self.jobs.take();
        if self.is_owner_thread() {
            // A job dropped the last handle; the drain loop ends on its own.
            self.thread.take();
            return;
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                my_error!(CTX, "Owner thread panicked");
            }
        }
    }
}

impl<S> Drop for Owner<S> {
    fn drop(&mut self) {
        self.jobs.take();
        if thread::current().id() == self.owner_id {
            return;
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn drain<S>(mut state: S, jobs: Receiver<Job<S>>) {
    while let Ok(job) = jobs.recv() {
        job(&mut state);
    }
    my_debug!(CTX, "Job queue closed; releasing owner state");
    drop(state);
}
