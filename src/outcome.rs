use std::any::Any;

use crate::Value;

/// A channel value with its type erased. Steps in one queue change the
/// channel types as they go, so the queue carries values in this form and the
/// typed surface puts the types back.
pub(crate) type Erased = Box<dyn Any + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Channel {
    Failure,
    Success,
}

/// How one fork settled.
pub(crate) struct Outcome {
    pub(crate) channel: Channel,
    pub(crate) value: Erased,
}

impl Outcome {
    pub(crate) fn failure<E: Value>(error: E) -> Self {
        Self {
            channel: Channel::Failure,
            value: Box::new(error),
        }
    }

    pub(crate) fn success<T: Value>(value: T) -> Self {
        Self {
            channel: Channel::Success,
            value: Box::new(value),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_value<V: Value>(self) -> V {
        unerase(self.value)
    }

    pub(crate) fn into_result<E: Value, T: Value>(self) -> Result<T, E> {
        match self.channel {
            Channel::Failure => Err(unerase(self.value)),
            Channel::Success => Ok(unerase(self.value)),
        }
    }
}

pub(crate) fn unerase<V: Value>(value: Erased) -> V {
    *value
        .downcast::<V>()
        .ok()
        .expect("channel carried a value of another type")
}

/// An eager terminal's value, kept so every fork can get its own copy.
pub(crate) trait Stored: Send + Sync {
    fn erase(&self) -> Erased;
    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct Kept<V>(pub(crate) V);

impl<V: Value> Stored for Kept<V> {
    fn erase(&self) -> Erased {
        Box::new(self.0.clone())
    }

    fn as_any(&self) -> &dyn Any {
        &self.0
    }
}

pub(crate) fn peek<V: Value>(stored: &dyn Stored) -> V {
    stored
        .as_any()
        .downcast_ref::<V>()
        .cloned()
        .expect("eager terminal holds a value of another type")
}
