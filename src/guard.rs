//! The settlement guard: the two handles a leaf procedure settles through.
//!
//! Every fork of a leaf gets a fresh latch shared by one [`Reject`] and one
//! [`Resolve`]. The first call on either handle is forwarded to whoever forked
//! the computation, every later call on either handle is dropped without an
//! error. Handles can be cloned and moved to other tasks or threads; they all
//! keep pointing at the same latch.

use std::{fmt, marker::PhantomData, sync::Arc};

use parking_lot::Mutex;

use crate::{Outcome, Value};

pub(crate) type Sink = Box<dyn FnOnce(Outcome) + Send>;

pub(crate) struct Latch {
    sink: Mutex<Option<Sink>>,
}

impl Latch {
    pub(crate) fn new(sink: Sink) -> Arc<Self> {
        Arc::new(Self {
            sink: Mutex::new(Some(sink)),
        })
    }

    pub(crate) fn settle(&self, outcome: Outcome) {
        // the lock is released before the sink runs, re-entrant calls find it empty
        let sink = self.sink.lock().take();
        match sink {
            Some(sink) => sink(outcome),
            None => tracing::trace!(channel = ?outcome.channel, "dropped repeated settlement"),
        }
    }
}

/// Settles a fork on the failure channel.
pub struct Reject<E> {
    latch: Arc<Latch>,
    _error: PhantomData<fn(E)>,
}

/// Settles a fork on the success channel.
pub struct Resolve<T> {
    latch: Arc<Latch>,
    _value: PhantomData<fn(T)>,
}

pub(crate) fn handles<E, T>(sink: Sink) -> (Reject<E>, Resolve<T>) {
    let latch = Latch::new(sink);
    let reject = Reject {
        latch: Arc::clone(&latch),
        _error: PhantomData,
    };
    let resolve = Resolve {
        latch,
        _value: PhantomData,
    };
    (reject, resolve)
}

impl<E: Value> Reject<E> {
    /// Settles with `error`, unless this fork has already settled.
    pub fn reject(&self, error: E) {
        self.latch.settle(Outcome::failure(error))
    }
}

impl<T: Value> Resolve<T> {
    /// Settles with `value`, unless this fork has already settled.
    pub fn resolve(&self, value: T) {
        self.latch.settle(Outcome::success(value))
    }
}

impl<E> Clone for Reject<E> {
    fn clone(&self) -> Self {
        Self {
            latch: Arc::clone(&self.latch),
            _error: PhantomData,
        }
    }
}

impl<T> Clone for Resolve<T> {
    fn clone(&self) -> Self {
        Self {
            latch: Arc::clone(&self.latch),
            _value: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Reject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject").finish_non_exhaustive()
    }
}

impl<T> fmt::Debug for Resolve<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve").finish_non_exhaustive()
    }
}
