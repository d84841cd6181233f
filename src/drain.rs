//! The trampoline that runs a [`Sequence`].
//!
//! Forking a sequence creates one [`Drain`] for that execution. It shares the
//! queue with every other execution and walks it with a private cursor, so
//! re-forking or forking concurrently never sees another run's progress.
//!
//! Every step is forked into a fresh [`Slot`]. If the step settled before its
//! fork call returned, the loop picks the outcome up and moves on without
//! recursing. If it did not, the drain parks itself in the slot and returns;
//! the late callback takes it out again and keeps looping on its own stack.
//! Either way the stack stays flat however many steps are queued.
//!
//! A step may hand back a sequence of its own. The drain does not fork it:
//! it saves its place in the current queue, takes on the inner root and
//! queue, and comes back to the saved place once the inner queue runs out.
//! Sequences nested through steps stay off the call stack the same way.

use std::{mem, sync::Arc};

use parking_lot::Mutex;

use crate::{
    computation::Node,
    guard::Sink,
    outcome::Outcome,
    sequence::{Next, Sequence, StepPair},
};

pub(crate) fn run(sequence: &Sequence, sink: Sink) {
    let drain = Drain {
        steps: Arc::clone(&sequence.steps),
        cursor: 0,
        frames: Vec::new(),
        sink,
    };
    drain.drive(Next::Fork(Node::clone(&sequence.root)));
}

struct Drain {
    steps: Arc<Vec<StepPair>>,
    cursor: usize,
    /// Outer queues waiting for the current one to run out.
    frames: Vec<(Arc<Vec<StepPair>>, usize)>,
    sink: Sink,
}

/// Where one forked step stands.
enum Slot {
    /// Forked, not settled yet, driver still inside the fork call.
    Armed,
    /// Settled before the driver came back for it.
    Settled(Outcome),
    /// The fork call returned first; the drain waits here for the callback.
    Parked(Drain),
    Spent,
}

/// Result of forking one step.
enum Progress {
    Settled(Drain, Outcome),
    Suspended,
}

impl Drain {
    fn is_drained(&self) -> bool {
        self.cursor == self.steps.len() && self.frames.is_empty()
    }

    fn drive(mut self, mut current: Next) {
        loop {
            let outcome = match current {
                Next::Fork(Node::Sequence(sequence)) => {
                    current = self.enter(sequence);
                    continue;
                }
                Next::Ready(outcome) if self.is_drained() => return (self.sink)(outcome),
                Next::Fork(node) if self.is_drained() => return node.fork(self.sink),
                Next::Ready(outcome) => outcome,
                Next::Fork(node) => match node.settled_outcome() {
                    Some(outcome) => outcome,
                    None => match self.step(&node) {
                        Progress::Settled(drain, outcome) => {
                            self = drain;
                            outcome
                        }
                        Progress::Suspended => return,
                    },
                },
            };
            current = self.advance(outcome);
        }
    }

    fn step(self, node: &Node) -> Progress {
        let slot = Arc::new(Mutex::new(Slot::Armed));
        let callback_slot = Arc::clone(&slot);
        node.fork(Box::new(move |outcome: Outcome| {
            let mut state = callback_slot.lock();
            let previous = mem::replace(&mut *state, Slot::Spent);
            match previous {
                Slot::Parked(mut drain) => {
                    drop(state);
                    tracing::trace!(cursor = drain.cursor, "drain resumed");
                    let next = drain.advance(outcome);
                    drain.drive(next);
                }
                _ => *state = Slot::Settled(outcome),
            }
        }));

        let mut state = slot.lock();
        let previous = mem::replace(&mut *state, Slot::Spent);
        let progress = match previous {
            Slot::Settled(outcome) => Progress::Settled(self, outcome),
            _ => {
                tracing::trace!(cursor = self.cursor, queued = self.steps.len(), "drain suspended");
                *state = Slot::Parked(self);
                Progress::Suspended
            }
        };
        progress
    }

    /// Switches to `sequence`'s queue, saving the current place unless the
    /// current queue has nothing left after it.
    fn enter(&mut self, sequence: Sequence) -> Next {
        let steps = mem::replace(&mut self.steps, sequence.steps);
        let cursor = mem::replace(&mut self.cursor, 0);
        if cursor < steps.len() {
            self.frames.push((steps, cursor));
        }
        Next::Fork(Node::clone(&sequence.root))
    }

    /// Moves past the next step that handles `outcome`'s channel and applies
    /// it. Steps for the other channel are skipped, and a queue that runs out
    /// hands over to the one saved below it. With nothing left to apply, the
    /// outcome itself is what the sequence settles with.
    fn advance(&mut self, outcome: Outcome) -> Next {
        loop {
            while let Some(step) = self.steps.get(self.cursor) {
                self.cursor += 1;
                if let Some(transform) = step.entry(outcome.channel) {
                    return transform(outcome.value);
                }
            }
            match self.frames.pop() {
                Some((steps, cursor)) => {
                    self.steps = steps;
                    self.cursor = cursor;
                }
                None => return Next::Ready(outcome),
            }
        }
    }
}
