//! The sequence descriptor.

use core::num::NonZeroU32;

/// The immutable configuration of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Descriptor<Value> {
    /// Whether the sequence wraps around to `restart` after exhausting its range.
    pub can_cycle: bool,
    /// The increment applied per allocation, its sign determines the direction.
    pub step: Value,
    /// The inclusive upper bound of legal values.
    pub max: Value,
    /// The inclusive lower bound of legal values.
    pub min: Value,
    /// The value the sequence resumes at after a cycle.
    pub restart: Value,
    /// The number of values pre-committed per upper bound advance.
    pub allocation_count: NonZeroU32,
}

impl<Value> Descriptor<Value> {
    /// Convert every value of the descriptor into another representation.
    ///
    /// Used to run the same configuration on a different value type, for instance
    /// to build an unbounded oracle from a native-width configuration.
    pub fn map<Other>(self, mut f: impl FnMut(Value) -> Other) -> Descriptor<Other> {
        let Self {
            can_cycle,
            step,
            max,
            min,
            restart,
            allocation_count,
        } = self;

        Descriptor {
            can_cycle,
            step: f(step),
            max: f(max),
            min: f(min),
            restart: f(restart),
            allocation_count,
        }
    }
}

/// The direction a sequence progresses in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The step is positive, values grow towards `max`.
    Ascending,
    /// The step is negative, values shrink towards `min`.
    Descending,
}
