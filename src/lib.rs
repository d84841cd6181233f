//! Deferred computations with two channels: a value of type
//! [`Computation<E, T>`] is work that will eventually settle, exactly once,
//! into either a failure `E` or a success `T`.
//!
//! Computations compose on both channels:
//!
//! - **Success channel** -- [map](Computation::map), [chain](Computation::chain)
//!   and [ap](Computation::ap).
//! - **Failure channel** -- [reject_map](Computation::reject_map) and
//!   [reject_chain](Computation::reject_chain).
//!
//! A failure skips every success-channel operator until something on the
//! failure channel picks it up, and a success skips the failure-channel ones.
//!
//! # Forking
//!
//! Composing never runs anything. Work only starts when a computation is
//! *forked*, by handing it the two callbacks it settles into:
//!
//! ```
//! use deferred::Computation;
//!
//! let answer = Computation::<String, i32>::new(|_reject, resolve| resolve.resolve(20))
//!     .map(|x| x * 2)
//!     .chain(|x| Computation::succeed(x + 2));
//!
//! answer.fork(|e| panic!("failed: {e}"), |x| assert_eq!(x, 42));
//! ```
//!
//! Exactly one of the two callbacks is called, exactly once, whatever the
//! underlying procedure does. A leaf that calls its handles several times only
//! has its first call heard.
//!
//! Computations are immutable. Every operator returns a new computation and
//! leaves the old one intact, so one computation can be the base of several
//! independent chains, and can be forked again and again.
//!
//! # Stack safety
//!
//! Chained steps are not nested closures calling each other. They are queued,
//! and a fork walks the queue in a loop. A chain of any length runs in constant
//! stack depth, both when every step settles on the spot and when every step
//! settles later from some other task or thread. That still holds when a step
//! returns a chain of its own, as a recursive definition does:
//!
//! ```
//! use deferred::Computation;
//!
//! fn countdown(n: u32) -> Computation<(), u32> {
//!     let leaf = Computation::new(move |_, resolve| resolve.resolve(n));
//!     if n == 0 {
//!         return leaf;
//!     }
//!     leaf.chain(|n| countdown(n - 1)).map(|n| n + 1)
//! }
//!
//! countdown(100_000).fork(|()| unreachable!(), |n| assert_eq!(n, 100_000));
//! ```
//!
//! Long chains built up front are covered too:
//!
//! ```
//! use deferred::Computation;
//!
//! let mut counter = Computation::<(), u32>::new(|_, resolve| resolve.resolve(0));
//! for _ in 0..100_000 {
//!     counter = counter.map(|n| n + 1);
//! }
//! counter.fork(|()| unreachable!(), |n| assert_eq!(n, 100_000));
//! ```
//!
//! # Async code
//!
//! [settle](Computation::settle) forks and returns a future of the result. The
//! [runtimes] module builds leaves out of futures spawned on an executor.

mod ap;
mod computation;
mod drain;
mod guard;
mod outcome;
mod sequence;
mod settle;

pub mod runtimes;

pub use ap::ap;
pub use computation::{fail, succeed, Computation};
pub use guard::{Reject, Resolve};
pub use settle::SettleError;

pub(crate) use outcome::Outcome;

/// What either channel can carry.
///
/// `Clone` lets an already settled computation hand its value to every fork;
/// `Send + Sync` lets a leaf settle from another thread.
pub trait Value: Clone + Send + Sync + 'static {}

impl<V: Clone + Send + Sync + 'static> Value for V {}
