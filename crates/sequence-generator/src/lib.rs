//! A reference model of a numeric sequence generator.
//!
//! The generator hands out successive values according to a step, an inclusive range,
//! an optional wraparound and a batch preallocation strategy. Along with the values it
//! publishes an upper bound: the highest value that is guaranteed to be allocated without
//! committing another batch.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use core::fmt::Debug;

use num_traits::{CheckedAdd, Signed};
use tracing::{debug, trace};

mod descriptor;

pub use descriptor::{Descriptor, Direction};


/// The amount of cached values below which the upper bound has to advance.
const MINIMUM_CACHED_VALUE_COUNT: u32 = 1;

/// An error that can happen when constructing a [`SequenceGenerator`].
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The step is zero, so the sequence would never progress.
    #[error("invalid argument: step must not be zero")]
    ZeroStep,
    /// The step is not strictly between the min and max values.
    #[error("invalid argument: step must be strictly between min and max")]
    StepOutOfRange,
    /// The restart value is outside of the `[min, max]` range.
    #[error("invalid argument: restart value must be within [min, max]")]
    RestartOutOfRange,
    /// The starting value is outside of the `[min, max]` range.
    #[error("invalid argument: starting value must be within [min, max]")]
    StartOutOfRange,
}

/// The sequence generator.
#[derive(Debug, Clone)]
pub struct SequenceGenerator<Value> {
    /// The sequence configuration.
    descriptor: Descriptor<Value>,
    /// The direction derived from the step sign.
    direction: Direction,
    /// The next value to hand out, [`None`] once the sequence is exhausted.
    current: Option<Value>,
    /// The highest value that can be handed out before another batch is committed.
    upper_bound: Option<Value>,
    /// The amount of values left in the current batch.
    remaining: u32,
}

impl<Value> SequenceGenerator<Value>
where
    Value: Signed + CheckedAdd + Ord + Clone + Debug,
{
    /// Create a new generator.
    ///
    /// Passing [`None`] as the `start` produces an already exhausted generator.
    pub fn new(start: Option<Value>, descriptor: Descriptor<Value>) -> Result<Self, Error> {
        let Descriptor {
            step,
            max,
            min,
            restart,
            ..
        } = &descriptor;

        if step.is_zero() {
            return Err(Error::ZeroStep);
        }
        if step <= min || step >= max {
            return Err(Error::StepOutOfRange);
        }
        if restart < min || restart > max {
            return Err(Error::RestartOutOfRange);
        }
        if let Some(start) = &start {
            if start < min || start > max {
                return Err(Error::StartOutOfRange);
            }
        }

        let direction = if step.is_positive() {
            Direction::Ascending
        } else {
            Direction::Descending
        };

        Ok(Self {
            descriptor,
            direction,
            upper_bound: start.clone(),
            current: start,
            remaining: MINIMUM_CACHED_VALUE_COUNT,
        })
    }

    /// Hand out the next value and advance the sequence.
    ///
    /// Returns [`None`] when the sequence is exhausted.
    pub fn get_next_value(&mut self) -> Option<Value> {
        let current = self.current.take()?;
        self.advance(&current);
        Some(current)
    }

    /// The highest value that is guaranteed to be allocated without committing another
    /// batch, or [`None`] when the sequence is exhausted.
    pub fn get_upper_bound(&self) -> Option<&Value> {
        self.upper_bound.as_ref()
    }

    /// The value the next call to [`Self::get_next_value`] will hand out.
    pub fn current_value(&self) -> Option<&Value> {
        self.current.as_ref()
    }

    /// Whether the sequence has run out of values.
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// The sequence configuration.
    pub fn descriptor(&self) -> &Descriptor<Value> {
        &self.descriptor
    }

    /// The direction of the sequence.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Compute the new current value from the one just handed out, and move the upper
    /// bound when the batch runs out.
    fn advance(&mut self, current: &Value) {
        let new_value = match self.bump(current) {
            Some(value) => value,
            None => {
                debug!(
                    message = "sequence exhausted",
                    last_value = ?current,
                );
                self.upper_bound = None;
                return;
            }
        };

        self.remaining -= 1;
        if self.remaining < MINIMUM_CACHED_VALUE_COUNT {
            self.refill();
        }

        self.current = Some(new_value);
    }

    /// Commit the next batch: move the upper bound by `allocation_count` bumps.
    fn refill(&mut self) {
        let allocation_count = self.descriptor.allocation_count.get();

        if let Some(mut upper_bound) = self.upper_bound.take() {
            for _ in 0..allocation_count {
                // A bound that can't progress anymore stays where it is.
                if let Some(bumped) = self.bump(&upper_bound) {
                    upper_bound = bumped;
                }
            }
            trace!(
                message = "upper bound advanced",
                upper_bound = ?upper_bound,
                allocation_count,
            );
            self.upper_bound = Some(upper_bound);
        }

        self.remaining = allocation_count;
    }

    /// Add the step to the `value`.
    ///
    /// Leaving the range yields the restart value for a cycling sequence and [`None`]
    /// otherwise, meaning no further progress is possible.
    fn bump(&self, value: &Value) -> Option<Value> {
        let stepped = value
            .checked_add(&self.descriptor.step)
            .filter(|value| !self.overflowed(value));

        match stepped {
            Some(value) => Some(value),
            None if self.descriptor.can_cycle => Some(self.descriptor.restart.clone()),
            None => None,
        }
    }

    /// Whether the `value` is past the end of the range in the sequence direction.
    fn overflowed(&self, value: &Value) -> bool {
        match self.direction {
            Direction::Ascending => value > &self.descriptor.max,
            Direction::Descending => value < &self.descriptor.min,
        }
    }
}
