//! Background resource loading with explicit completion.
//!
//! Each resource gets a [`Pending`] handle backed by a worker thread. The
//! worker stores its result and then publishes readiness with a release
//! store; readers check readiness with an acquire load, so a handle that
//! reports ready always has its result visible. [`LoadSet`] groups handles
//! and acts as the "everything finished" barrier the renderer polls before
//! its first frame.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::{Result, anyhow};
use parking_lot::{Condvar, Mutex};

struct Slot<T> {
    ready: AtomicBool,
    result: Mutex<Option<Result<T>>>,
    done: Condvar,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, result: Result<T>) {
        let mut guard = self.result.lock();
        *guard = Some(result);
        self.ready.store(true, Ordering::Release);
        self.done.notify_all();
    }
}

/// Handle to a resource being produced on another thread.
pub struct Pending<T> {
    label: String,
    slot: Arc<Slot<T>>,
}

impl<T: Send + 'static> Pending<T> {
    /// Run `job` on a named worker thread. A panic inside the job is turned
    /// into an error result for this resource.
    pub fn spawn<F>(label: impl Into<String>, job: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let label = label.into();
        let slot = Arc::new(Slot::new());
        let worker = Arc::clone(&slot);
        let worker_label = label.clone();

        let spawned = thread::Builder::new()
            .name(format!("load:{label}"))
            .spawn(move || {
                log::debug!("Loading '{}'", worker_label);
                let result = panic::catch_unwind(AssertUnwindSafe(job))
                    .unwrap_or_else(|payload| Err(anyhow!("loader panicked: {}", panic_message(payload.as_ref()))));
                worker.complete(result);
            });

        if let Err(err) = spawned {
            slot.complete(Err(anyhow::Error::new(err).context("failed to spawn loader thread")));
        }

        Self { label, slot }
    }
}

impl<T> Pending<T> {
    /// Already-finished handle, for resources produced synchronously.
    pub fn ready(label: impl Into<String>, result: Result<T>) -> Self {
        let slot = Slot::new();
        slot.complete(result);
        Self {
            label: label.into(),
            slot: Arc::new(slot),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.slot.ready.load(Ordering::Acquire)
    }

    /// Block until the result is available and take it.
    pub fn wait(self) -> Result<T> {
        let mut guard = self.slot.result.lock();
        while guard.is_none() {
            self.slot.done.wait(&mut guard);
        }
        guard
            .take()
            .ok_or_else(|| anyhow!("result for '{}' already taken", self.label))?
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Barrier over a group of pending resources.
pub struct LoadSet<T> {
    pending: Vec<Pending<T>>,
}

impl<T> Default for LoadSet<T> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<T> LoadSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pending: Pending<T>) {
        self.pending.push(pending);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.pending.iter().filter(|p| p.is_ready()).count()
    }

    /// True once every resource finished, successfully or not.
    pub fn all_ready(&self) -> bool {
        self.pending.iter().all(Pending::is_ready)
    }

    /// Take every result, in insertion order, blocking on unfinished ones.
    pub fn finish(self) -> Vec<(String, Result<T>)> {
        self.pending
            .into_iter()
            .map(|p| {
                let label = p.label.clone();
                (label, p.wait())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn spawned_job_delivers_value() {
        let pending = Pending::spawn("answer", || Ok(42));
        assert_eq!(pending.label(), "answer");
        assert_eq!(pending.wait().expect("value"), 42);
    }

    #[test]
    fn barrier_waits_for_every_resource() {
        let (release, gate) = mpsc::channel::<()>();
        let mut set = LoadSet::new();
        set.push(Pending::ready("instant", Ok(1)));
        set.push(Pending::spawn("gated", move || {
            gate.recv()?;
            Ok(2)
        }));

        std::thread::sleep(Duration::from_millis(20));
        assert!(!set.all_ready());
        assert_eq!(set.completed(), 1);

        release.send(()).expect("worker alive");
        let results = set.finish();
        let values: Vec<i32> = results.into_iter().map(|(_, r)| r.expect("ok")).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn failures_count_as_completed() {
        let mut set: LoadSet<i32> = LoadSet::new();
        set.push(Pending::ready("missing", Err(anyhow!("file not found"))));
        assert!(set.all_ready());
        let (label, result) = set.finish().pop().expect("one entry");
        assert_eq!(label, "missing");
        assert!(result.is_err());
    }

    #[test]
    fn panicking_job_becomes_error() {
        let pending: Pending<i32> = Pending::spawn("boom", || panic!("corrupt data"));
        let err = pending.wait().unwrap_err();
        assert!(err.to_string().contains("corrupt data"), "{err}");
    }

    #[test]
    fn empty_set_is_ready() {
        let set: LoadSet<()> = LoadSet::new();
        assert!(set.all_ready());
        assert!(set.is_empty());
    }
}
