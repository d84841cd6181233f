//! [`Computation`] and its operators.
//!
//! A computation is one of four shapes: a leaf wrapping a procedure, an eager
//! success, an eager failure, or a sequence of steps queued on one of those.
//! Every operator matches on the shape. Eager terminals take the fast path and
//! settle the operator right away; everything else is queued and left alone
//! until [`fork`](Computation::fork).

use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    drain,
    guard::{self, Reject, Resolve, Sink},
    outcome::{peek, unerase, Channel, Kept, Outcome, Stored},
    sequence::{Next, Sequence, StepPair},
    Value,
};

type Procedure = dyn Fn(Sink) + Send + Sync;

#[derive(Clone)]
pub(crate) enum Node {
    Leaf(Arc<Procedure>),
    Succeeded(Arc<dyn Stored>),
    Failed(Arc<dyn Stored>),
    Sequence(Sequence),
}

impl Node {
    pub(crate) fn fork(&self, sink: Sink) {
        match self {
            Node::Leaf(procedure) => procedure(sink),
            Node::Sequence(sequence) => drain::run(sequence, sink),
            Node::Succeeded(value) => sink(Outcome {
                channel: Channel::Success,
                value: value.erase(),
            }),
            Node::Failed(error) => sink(Outcome {
                channel: Channel::Failure,
                value: error.erase(),
            }),
        }
    }

    pub(crate) fn settled_outcome(&self) -> Option<Outcome> {
        match self {
            Node::Succeeded(value) => Some(Outcome {
                channel: Channel::Success,
                value: value.erase(),
            }),
            Node::Failed(error) => Some(Outcome {
                channel: Channel::Failure,
                value: error.erase(),
            }),
            Node::Leaf(_) | Node::Sequence(_) => None,
        }
    }
}

/// Work that settles, once, into either a failure `E` or a success `T`.
///
/// Building a computation never runs anything; only [`fork`](Self::fork) does.
/// Computations are immutable and cheap to clone, and every operator returns a
/// new one, so one computation can be the base of any number of independent
/// derived chains and can be forked any number of times.
///
/// ```
/// use deferred::Computation;
///
/// let parsed = Computation::<String, &str>::succeed("41")
///     .chain(|s| match s.parse::<i64>() {
///         Ok(n) => Computation::succeed(n),
///         Err(e) => Computation::fail(e.to_string()),
///     })
///     .map(|n| n + 1);
///
/// parsed.fork(|e| panic!("{e}"), |n| assert_eq!(n, 42));
/// ```
#[must_use]
pub struct Computation<E, T> {
    pub(crate) node: Node,
    _channels: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Clone for Computation<E, T> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<E, T> Computation<E, T> {
    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            node,
            _channels: PhantomData,
        }
    }
}

impl<E: Value, T: Value> Computation<E, T> {
    /// Wraps a procedure that settles through one of the two handles.
    ///
    /// The procedure runs on every fork, with a fresh pair of handles each
    /// time. Only the first call on either handle counts; the rest are
    /// dropped. The handles may be kept and called later, from any thread.
    ///
    /// ```
    /// use deferred::Computation;
    ///
    /// let noisy = Computation::<&str, i32>::new(|reject, resolve| {
    ///     resolve.resolve(1);
    ///     resolve.resolve(2);
    ///     reject.reject("ignored");
    /// });
    /// noisy.fork(|_| unreachable!(), |n| assert_eq!(n, 1));
    /// ```
    pub fn new(procedure: impl Fn(Reject<E>, Resolve<T>) + Send + Sync + 'static) -> Self {
        Self::from_node(Node::Leaf(Arc::new(move |sink: Sink| {
            let (reject, resolve) = guard::handles(sink);
            procedure(reject, resolve)
        })))
    }

    /// Already succeeded with `value`.
    pub fn succeed(value: T) -> Self {
        Self::from_node(Node::Succeeded(Arc::new(Kept(value))))
    }

    /// Already failed with `error`.
    pub fn fail(error: E) -> Self {
        Self::from_node(Node::Failed(Arc::new(Kept(error))))
    }

    /// Runs the computation. Exactly one of the two callbacks is called,
    /// exactly once, now or later.
    pub fn fork(
        &self,
        on_failure: impl FnOnce(E) + Send + 'static,
        on_success: impl FnOnce(T) + Send + 'static,
    ) {
        self.fork_result(move |result| match result {
            Ok(value) => on_success(value),
            Err(error) => on_failure(error),
        })
    }

    /// Like [`fork`](Self::fork), with both channels delivered as a `Result`.
    pub fn fork_result(&self, on_settled: impl FnOnce(Result<T, E>) + Send + 'static) {
        self.node
            .fork(Box::new(move |outcome: Outcome| on_settled(outcome.into_result())))
    }

    /// The value of an eagerly settled computation, without forking it.
    /// `None` for anything that has to run first.
    pub fn settled(&self) -> Option<Result<T, E>> {
        match &self.node {
            Node::Succeeded(value) => Some(Ok(peek(value.as_ref()))),
            Node::Failed(error) => Some(Err(peek(error.as_ref()))),
            Node::Leaf(_) | Node::Sequence(_) => None,
        }
    }

    /// Transforms the success value. On an eager success `f` runs right away.
    pub fn map<U: Value>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Computation<E, U> {
        match self.node {
            Node::Succeeded(value) => Computation::succeed(f(peek(value.as_ref()))),
            failed @ Node::Failed(_) => Computation::from_node(failed),
            node => queue(
                node,
                StepPair::on_success(move |value| Next::Ready(Outcome::success(f(unerase(value))))),
            ),
        }
    }

    /// Continues with the computation `f` builds from the success value.
    pub fn chain<U: Value>(
        self,
        f: impl Fn(T) -> Computation<E, U> + Send + Sync + 'static,
    ) -> Computation<E, U> {
        match self.node {
            failed @ Node::Failed(_) => Computation::from_node(failed),
            node => queue(
                node,
                StepPair::on_success(move |value| Next::Fork(f(unerase(value)).node)),
            ),
        }
    }

    /// Transforms the failure value. On an eager failure `f` runs right away.
    pub fn reject_map<F: Value>(self, f: impl Fn(E) -> F + Send + Sync + 'static) -> Computation<F, T> {
        match self.node {
            Node::Failed(error) => Computation::fail(f(peek(error.as_ref()))),
            succeeded @ Node::Succeeded(_) => Computation::from_node(succeeded),
            node => queue(
                node,
                StepPair::on_failure(move |error| Next::Ready(Outcome::failure(f(unerase(error))))),
            ),
        }
    }

    /// Continues with the computation `f` builds from the failure value, which
    /// may recover onto the success channel.
    pub fn reject_chain<F: Value>(
        self,
        f: impl Fn(E) -> Computation<F, T> + Send + Sync + 'static,
    ) -> Computation<F, T> {
        match self.node {
            succeeded @ Node::Succeeded(_) => Computation::from_node(succeeded),
            node => queue(
                node,
                StepPair::on_failure(move |error| Next::Fork(f(unerase(error)).node)),
            ),
        }
    }
}

fn queue<E, T>(node: Node, step: StepPair) -> Computation<E, T> {
    Computation::from_node(Sequence::extend(node, step))
}

impl<E: Value, T: Value> From<Result<T, E>> for Computation<E, T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::succeed(value),
            Err(error) => Self::fail(error),
        }
    }
}

impl<E, T> fmt::Debug for Computation<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::Leaf(_) => f.write_str("Computation::Leaf"),
            Node::Succeeded(_) => f.write_str("Computation::Succeeded"),
            Node::Failed(_) => f.write_str("Computation::Failed"),
            Node::Sequence(sequence) => f
                .debug_struct("Computation::Sequence")
                .field("steps", &sequence.len())
                .finish(),
        }
    }
}

/// Shorthand for [`Computation::succeed`].
pub fn succeed<E: Value, T: Value>(value: T) -> Computation<E, T> {
    Computation::succeed(value)
}

/// Shorthand for [`Computation::fail`].
pub fn fail<E: Value, T: Value>(error: E) -> Computation<E, T> {
    Computation::fail(error)
}
