#![allow(dead_code)]

use std::sync::Arc;

use deferred::{Computation, Value};
use parking_lot::Mutex;

/// Every callback invocation one fork produced, in order.
pub struct Forked<E, T> {
    calls: Arc<Mutex<Vec<Result<T, E>>>>,
}

impl<E: Value, T: Value> Forked<E, T> {
    pub fn calls(&self) -> Vec<Result<T, E>> {
        self.calls.lock().clone()
    }
}

pub fn fork<E: Value, T: Value>(computation: &Computation<E, T>) -> Forked<E, T> {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (failures, successes) = (Arc::clone(&calls), Arc::clone(&calls));
    computation.fork(
        move |error| failures.lock().push(Err(error)),
        move |value| successes.lock().push(Ok(value)),
    );
    Forked { calls }
}

/// Forks and expects exactly one synchronous settlement.
pub fn settle_now<E: Value + std::fmt::Debug, T: Value + std::fmt::Debug>(
    computation: &Computation<E, T>,
) -> Result<T, E> {
    let mut calls = fork(computation).calls();
    assert_eq!(calls.len(), 1, "expected one settlement, got {calls:?}");
    calls.remove(0)
}

pub fn inc(x: i32) -> i32 {
    x + 1
}

/// Settles on a later tokio task.
pub fn tick<E: Value, T: Value>(value: T) -> Computation<E, T> {
    Computation::new(move |_, resolve| {
        let value = value.clone();
        drop(tokio::spawn(async move { resolve.resolve(value) }));
    })
}

/// Fails on a later tokio task.
pub fn tick_failure<E: Value, T: Value>(error: E) -> Computation<E, T> {
    Computation::new(move |reject, _| {
        let error = error.clone();
        drop(tokio::spawn(async move { reject.reject(error) }));
    })
}
