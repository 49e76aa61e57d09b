//! Parallel simulation of a sequence allocator against the reference model.
//!
//! The [`Vetter`] drives the reference [`SequenceGenerator`] and an allocator under test
//! with the same requests, and checks that every handed out value and every published
//! upper bound are exactly the same.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use core::fmt::{Debug, Display};

use num_traits::{CheckedAdd, Signed, ToPrimitive};
use sequence_generator::SequenceGenerator;
use tracing::{debug, error, trace};


/// An allocator that is checked against the reference model.
pub trait AllocatorUnderTest {
    /// The error the allocator fails with, exhaustion included.
    type Error: Debug + Display;

    /// Hand out the current value and advance.
    fn current_value_and_advance(&mut self) -> Result<i64, Self::Error>;

    /// The upper bound the allocator has persisted, if any.
    fn value_on_disk(&self) -> Option<i64>;
}

/// A mismatch between the reference model and the allocator under test.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VetError<E> {
    /// The upper bounds differ before the request.
    #[error("bump {bump}: upper bound before the request is {actual:?}, expected {expected:?}")]
    UpperBoundBefore {
        /// The request index.
        bump: u64,
        /// The upper bound of the reference model.
        expected: Option<i64>,
        /// The upper bound of the allocator.
        actual: Option<i64>,
    },
    /// The upper bounds differ after the request.
    #[error("bump {bump}: upper bound after the request is {actual:?}, expected {expected:?}")]
    UpperBoundAfter {
        /// The request index.
        bump: u64,
        /// The upper bound of the reference model.
        expected: Option<i64>,
        /// The upper bound of the allocator.
        actual: Option<i64>,
    },
    /// The values differ.
    #[error("bump {bump}: got value {actual}, expected {expected}")]
    Value {
        /// The request index.
        bump: u64,
        /// The value of the reference model.
        expected: i64,
        /// The value of the allocator.
        actual: i64,
    },
    /// The reference model is exhausted but the allocator still handed out a value.
    #[error("bump {bump}: got value {actual}, expected the sequence to be exhausted")]
    NotExhausted {
        /// The request index.
        bump: u64,
        /// The value of the allocator.
        actual: i64,
    },
    /// The allocator failed while the reference model still had a value.
    #[error("bump {bump}: allocator failed: {error}")]
    Allocator {
        /// The request index.
        bump: u64,
        /// The allocator error.
        error: E,
    },
    /// The reference model produced a value that does not fit into 64 bits.
    #[error("bump {bump}: reference value does not fit into 64 bits")]
    Narrowing {
        /// The request index.
        bump: u64,
    },
}

/// Drives the reference model and the allocator under test in lockstep.
#[derive(Debug)]
pub struct Vetter<Value, A> {
    /// The reference model.
    oracle: SequenceGenerator<Value>,
    /// The allocator under test.
    allocator: A,
    /// The amount of requests issued so far.
    bumps: u64,
}

impl<Value, A> Vetter<Value, A>
where
    Value: Signed + CheckedAdd + Ord + Clone + Debug + ToPrimitive,
    A: AllocatorUnderTest,
{
    /// Pair the reference model with the allocator under test.
    pub fn new(oracle: SequenceGenerator<Value>, allocator: A) -> Self {
        Self {
            oracle,
            allocator,
            bumps: 0,
        }
    }

    /// The reference model.
    pub fn oracle(&self) -> &SequenceGenerator<Value> {
        &self.oracle
    }

    /// The allocator under test.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// The amount of requests issued so far.
    pub fn bumps(&self) -> u64 {
        self.bumps
    }

    /// Issue one request to both sides and compare the outcomes.
    ///
    /// Returns the value handed out, or [`None`] if both sides are exhausted.
    pub fn vet_bump(&mut self) -> Result<Option<i64>, VetError<A::Error>> {
        let bump = self.bumps;
        self.bumps += 1;

        let result = self.vet(bump);
        if let Err(err) = &result {
            error!(message = "sequence vetting failed", error = %err);
        }
        result
    }

    /// Issue `count` requests, stopping at the first mismatch.
    pub fn vet_bumps(&mut self, count: u64) -> Result<Vec<Option<i64>>, VetError<A::Error>> {
        (0..count).map(|_| self.vet_bump()).collect()
    }

    /// The request logic.
    fn vet(&mut self, bump: u64) -> Result<Option<i64>, VetError<A::Error>> {
        self.compare_upper_bounds(bump, |bump, expected, actual| {
            VetError::UpperBoundBefore {
                bump,
                expected,
                actual,
            }
        })?;

        let value = self
            .oracle
            .get_next_value()
            .map(|value| value.to_i64().ok_or(VetError::Narrowing { bump }))
            .transpose()?;

        trace!(
            message = "vetting bump",
            bump,
            expected_value = ?value,
            expected_upper_bound = ?self.oracle.get_upper_bound(),
        );

        match value {
            Some(expected) => {
                let actual = self
                    .allocator
                    .current_value_and_advance()
                    .map_err(|error| VetError::Allocator { bump, error })?;
                if actual != expected {
                    return Err(VetError::Value {
                        bump,
                        expected,
                        actual,
                    });
                }
            }
            None => match self.allocator.current_value_and_advance() {
                Ok(actual) => return Err(VetError::NotExhausted { bump, actual }),
                Err(error) => debug!(message = "allocator exhausted", bump, error = %error),
            },
        }

        self.compare_upper_bounds(bump, |bump, expected, actual| {
            VetError::UpperBoundAfter {
                bump,
                expected,
                actual,
            }
        })?;

        Ok(value)
    }

    /// Check that both sides publish the same upper bound.
    fn compare_upper_bounds(
        &self,
        bump: u64,
        mismatch: impl FnOnce(u64, Option<i64>, Option<i64>) -> VetError<A::Error>,
    ) -> Result<(), VetError<A::Error>> {
        let expected = self.oracle_upper_bound(bump)?;
        let actual = self.allocator.value_on_disk();
        if expected != actual {
            return Err(mismatch(bump, expected, actual));
        }
        Ok(())
    }

    /// The upper bound of the reference model narrowed to 64 bits.
    fn oracle_upper_bound(&self, bump: u64) -> Result<Option<i64>, VetError<A::Error>> {
        self.oracle
            .get_upper_bound()
            .map(|value| value.to_i64().ok_or(VetError::Narrowing { bump }))
            .transpose()
    }
}

/// The error a native-width [`SequenceGenerator`] fails with when used as an
/// [`AllocatorUnderTest`].
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("sequence generator exhausted")]
pub struct Exhausted;

impl AllocatorUnderTest for SequenceGenerator<i64> {
    type Error = Exhausted;

    fn current_value_and_advance(&mut self) -> Result<i64, Self::Error> {
        self.get_next_value().ok_or(Exhausted)
    }

    fn value_on_disk(&self) -> Option<i64> {
        self.get_upper_bound().copied()
    }
}
