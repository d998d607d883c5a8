//! Thread-affine job execution.
//!
//! Components and their views are `Rc`-based and must only be touched on the
//! thread that owns them. [`AffinityExecutor`] is the bridge: any thread may
//! hand it a closure, and the owning thread drains those closures through its
//! [`JobPump`], lending each one a reference to the owned context.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::ContainerError;

type Job<C> = Box<dyn FnOnce(&C) + Send>;

/// Cloneable, `Send` handle for submitting work to the owning thread.
pub struct AffinityExecutor<C> {
    tx: Sender<Job<C>>,
}

impl<C> Clone for AffinityExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C> AffinityExecutor<C> {
    /// A new executor plus the pump its owning thread drains.
    #[must_use]
    pub fn new() -> (Self, JobPump<C>) {
        let (tx, rx) = channel();
        (Self { tx }, JobPump { rx })
    }

    /// Queue `job` for the owning thread. Fails once the pump is gone.
    pub fn submit(
        &self,
        job: impl FnOnce(&C) + Send + 'static,
    ) -> Result<(), ContainerError> {
        self.tx
            .send(Box::new(job))
            .map_err(|_| ContainerError::ExecutorShutDown)
    }

    /// Queue `job` and block until the owning thread has run it, returning
    /// its result.
    ///
    /// Must not be called from the owning thread itself: the call waits for
    /// the pump, and the pump would be waiting right back.
    pub fn execute<R: Send + 'static>(
        &self,
        job: impl FnOnce(&C) -> R + Send + 'static,
    ) -> Result<R, ContainerError> {
        let (done_tx, done_rx) = channel();
        self.submit(move |ctx| {
            // A dropped receiver means the caller stopped waiting.
            let _ = done_tx.send(job(ctx));
        })?;
        done_rx.recv().map_err(|_| ContainerError::ExecutorShutDown)
    }
}

/// Receiving end of an [`AffinityExecutor`], held by the owning thread.
pub struct JobPump<C> {
    rx: Receiver<Job<C>>,
}

impl<C> JobPump<C> {
    /// Run every job queued so far against `ctx`. Never blocks.
    pub fn run_pending(&self, ctx: &C) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job(ctx);
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    struct Ctx {
        answer: i64,
    }

    #[test]
    fn pending_jobs_run_against_the_owned_context() {
        let (executor, pump) = AffinityExecutor::<Ctx>::new();
        let ctx = Ctx { answer: 42 };

        let (tx, rx) = channel();
        executor
            .submit(move |ctx| {
                tx.send(ctx.answer).ok();
            })
            .unwrap();

        assert_eq!(pump.run_pending(&ctx), 1);
        assert_eq!(rx.recv().unwrap(), 42);
        assert_eq!(pump.run_pending(&ctx), 0, "queue drained");
    }

    #[test]
    fn execute_blocks_a_foreign_thread_until_the_owner_pumps() {
        let (executor, pump) = AffinityExecutor::<Ctx>::new();
        let ctx = Ctx { answer: 7 };

        let handle = thread::spawn(move || executor.execute(|ctx| ctx.answer * 2));

        // The foreign thread cannot finish until this thread runs the job.
        let mut ran = 0;
        while ran == 0 {
            ran = pump.run_pending(&ctx);
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(handle.join().unwrap().unwrap(), 14);
    }

    #[test]
    fn submit_after_pump_drop_reports_shutdown() {
        let (executor, pump) = AffinityExecutor::<Ctx>::new();
        drop(pump);
        let err = executor.submit(|_| {}).unwrap_err();
        assert!(matches!(err, ContainerError::ExecutorShutDown));
    }
}
