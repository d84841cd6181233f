//! Queued steps waiting on a root computation.
//!
//! `map`, `chain`, `reject_map` and `reject_chain` never fork anything. On a
//! computation that hasn't settled eagerly they append a [`StepPair`] to a
//! [`Sequence`] anchored at the original, non-sequence root, so a long chain of
//! operators is one flat queue instead of sequences nested in sequences.
//!
//! The queue is shared between every computation value built from it. Appending
//! goes through [`Arc::make_mut`]: a queue nobody else holds is extended in
//! place, a queue shared with another value is copied first. A value that has
//! been handed out is therefore never changed by composing on a sibling.

use std::sync::Arc;

use crate::{
    computation::Node,
    outcome::{Channel, Erased, Outcome},
};

/// What a step produced: either a computation still to be forked, or an
/// outcome that is already known.
pub(crate) enum Next {
    Fork(Node),
    Ready(Outcome),
}

pub(crate) type Transform = Arc<dyn Fn(Erased) -> Next + Send + Sync>;

/// One queued step. Operators fill exactly one side; an empty side lets the
/// other channel pass through untouched.
#[derive(Clone)]
pub(crate) struct StepPair {
    on_failure: Option<Transform>,
    on_success: Option<Transform>,
}

impl StepPair {
    pub(crate) fn on_failure(transform: impl Fn(Erased) -> Next + Send + Sync + 'static) -> Self {
        Self {
            on_failure: Some(Arc::new(transform)),
            on_success: None,
        }
    }

    pub(crate) fn on_success(transform: impl Fn(Erased) -> Next + Send + Sync + 'static) -> Self {
        Self {
            on_failure: None,
            on_success: Some(Arc::new(transform)),
        }
    }

    pub(crate) fn entry(&self, channel: Channel) -> Option<&Transform> {
        match channel {
            Channel::Failure => self.on_failure.as_ref(),
            Channel::Success => self.on_success.as_ref(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct Sequence {
    pub(crate) root: Arc<Node>,
    pub(crate) steps: Arc<Vec<StepPair>>,
}

impl Sequence {
    /// Appends `step` after everything already queued on `current`.
    pub(crate) fn extend(current: Node, step: StepPair) -> Node {
        let sequence = match current {
            Node::Sequence(mut sequence) => {
                Arc::make_mut(&mut sequence.steps).push(step);
                sequence
            }
            root => Sequence {
                root: Arc::new(root),
                steps: Arc::new(vec![step]),
            },
        };
        Node::Sequence(sequence)
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }
}
