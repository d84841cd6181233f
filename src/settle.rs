//! Awaiting a computation from `async` code.

use futures::{channel::oneshot, Future, FutureExt};
use thiserror::Error;

use crate::{Computation, Value};

/// Why [`Computation::settle`] did not produce a success value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettleError<E> {
    /// The computation settled on its failure channel.
    #[error("computation failed")]
    Failed(E),
    /// Every handle of the fork was dropped without settling it.
    #[error("computation was abandoned before it settled")]
    Abandoned,
}

impl<E> SettleError<E> {
    /// The failure value, or `None` if the fork was abandoned.
    pub fn into_failure(self) -> Option<E> {
        match self {
            SettleError::Failed(error) => Some(error),
            SettleError::Abandoned => None,
        }
    }
}

impl<E: Value, T: Value> Computation<E, T> {
    /// Forks now and returns a future of the settlement.
    ///
    /// ```
    /// use deferred::{Computation, SettleError};
    ///
    /// # futures::executor::block_on(async {
    /// let failed = Computation::<&str, i32>::fail("boom").map(|n| n + 1);
    /// assert_eq!(failed.settle().await, Err(SettleError::Failed("boom")));
    /// # });
    /// ```
    pub fn settle(&self) -> impl Future<Output = Result<T, SettleError<E>>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.fork_result(move |result| {
            // nobody awaiting is fine
            let _ = tx.send(result);
        });
        rx.map(|received| match received {
            Ok(result) => result.map_err(SettleError::Failed),
            Err(oneshot::Canceled) => Err(SettleError::Abandoned),
        })
    }
}
