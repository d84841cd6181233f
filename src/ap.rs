//! Applying a computed function to a computed value, running both at once.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{computation::Node, outcome::peek, Computation, Reject, Resolve, Value};

struct Pending<F, T> {
    function: Option<F>,
    value: Option<T>,
}

impl<F, T> Pending<F, T> {
    fn take_both(&mut self) -> Option<(F, T)> {
        if self.function.is_some() && self.value.is_some() {
            self.function.take().zip(self.value.take())
        } else {
            None
        }
    }
}

/// Applies the function `functions` settles with to the value `values`
/// settles with. See [`Computation::ap`].
pub fn ap<E, F, T, U>(functions: Computation<E, F>, values: Computation<E, T>) -> Computation<E, U>
where
    E: Value,
    F: Fn(T) -> U + Value,
    T: Value,
    U: Value,
{
    values.ap(functions)
}

impl<E: Value, T: Value> Computation<E, T> {
    /// Applies the function `functions` settles with to the value this
    /// computation settles with.
    ///
    /// Each fork starts both sides before either has to settle: this
    /// computation first, then `functions`. The result succeeds once both
    /// have succeeded. The first failure from either side settles it and any
    /// later failure is dropped.
    ///
    /// ```
    /// use deferred::Computation;
    ///
    /// let inc = Computation::<(), fn(i32) -> i32>::succeed(|x| x + 1);
    /// let ten = Computation::<(), i32>::new(|_, resolve| resolve.resolve(10));
    /// ten.ap(inc).fork(|()| unreachable!(), |n| assert_eq!(n, 11));
    /// ```
    pub fn ap<F, U>(self, functions: Computation<E, F>) -> Computation<E, U>
    where
        F: Fn(T) -> U + Value,
        U: Value,
    {
        if matches!(self.node, Node::Failed(_)) {
            return Computation::from_node(self.node);
        }
        if let (Node::Succeeded(value), Node::Succeeded(function)) = (&self.node, &functions.node) {
            let function: F = peek(function.as_ref());
            return Computation::succeed(function(peek(value.as_ref())));
        }

        Computation::new(move |reject: Reject<E>, resolve: Resolve<U>| {
            let pending = Arc::new(Mutex::new(Pending::<F, T> {
                function: None,
                value: None,
            }));

            let (value_pending, value_resolve) = (Arc::clone(&pending), resolve.clone());
            self.fork(
                {
                    let reject = reject.clone();
                    move |error| reject.reject(error)
                },
                move |value| {
                    let ready = {
                        let mut pending = value_pending.lock();
                        pending.value = Some(value);
                        pending.take_both()
                    };
                    if let Some((function, value)) = ready {
                        value_resolve.resolve(function(value));
                    }
                },
            );

            functions.fork(
                move |error| reject.reject(error),
                move |function| {
                    let ready = {
                        let mut pending = pending.lock();
                        pending.function = Some(function);
                        pending.take_both()
                    };
                    if let Some((function, value)) = ready {
                        resolve.resolve(function(value));
                    }
                },
            );
        })
    }
}
