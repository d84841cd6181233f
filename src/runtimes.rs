//! Leaf computations backed by an async runtime.
//!
//! Each fork of these leaves builds a fresh future and spawns it; the future's
//! `Result` settles the fork. Forking returns right away and the drain loop
//! parks until the spawned task settles.

#[cfg(feature = "runtime-tokio")]
pub mod tokio {
    use std::time::Duration;

    use futures::Future;

    use crate::{Computation, Value};

    /// A leaf that spawns `make()` on the current tokio runtime on every fork.
    ///
    /// Forking outside of a tokio runtime panics, as `tokio::spawn` does.
    pub fn from_future<E, T, F>(make: impl Fn() -> F + Send + Sync + 'static) -> Computation<E, T>
    where
        E: Value,
        T: Value,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Computation::new(move |reject, resolve| {
            let future = make();
            drop(tokio::spawn(async move {
                match future.await {
                    Ok(value) => resolve.resolve(value),
                    Err(error) => reject.reject(error),
                }
            }))
        })
    }

    /// Succeeds with `value` once `delay` has passed.
    pub fn after<E: Value, T: Value>(delay: Duration, value: T) -> Computation<E, T> {
        from_future(move || {
            let value = value.clone();
            async move {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
        })
    }

    /// Fails with `error` once `delay` has passed.
    pub fn reject_after<E: Value, T: Value>(delay: Duration, error: E) -> Computation<E, T> {
        from_future(move || {
            let error = error.clone();
            async move {
                tokio::time::sleep(delay).await;
                Err(error)
            }
        })
    }
}

pub mod spawn {
    use futures::{task::SpawnExt, Future};

    use crate::{Computation, Value};

    /// Builds leaves on any [`Spawn`](futures::task::Spawn) executor, such as
    /// [`ThreadPool`](futures::executor::ThreadPool).
    pub trait Spawner {
        /// A leaf that spawns `make()` on this executor on every fork.
        fn computation<E, T, F>(&self, make: impl Fn() -> F + Send + Sync + 'static) -> Computation<E, T>
        where
            E: Value,
            T: Value,
            F: Future<Output = Result<T, E>> + Send + 'static;
    }

    impl<S> Spawner for S
    where
        S: futures::task::Spawn + Clone + Send + Sync + 'static,
    {
        fn computation<E, T, F>(&self, make: impl Fn() -> F + Send + Sync + 'static) -> Computation<E, T>
        where
            E: Value,
            T: Value,
            F: Future<Output = Result<T, E>> + Send + 'static,
        {
            let spawner = self.clone();
            Computation::new(move |reject, resolve| {
                let future = make();
                let spawned = spawner.spawn(async move {
                    match future.await {
                        Ok(value) => resolve.resolve(value),
                        Err(error) => reject.reject(error),
                    }
                });
                if let Err(error) = spawned {
                    // the handles went down with the future; the fork is abandoned
                    tracing::warn!(%error, "failed to spawn computation");
                }
            })
        }
    }
}
