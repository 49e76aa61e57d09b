//! Range size policy for sequence preallocation.
//!
//! A sequence commits its values in ranges: the bigger the range, the less often the next
//! safe starting point has to be persisted. This crate decides how big those ranges are.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use core::num::NonZeroU32;

use num::{bigint::ToBigInt, Signed};
use tracing::debug;

mod registry;
mod setting;

pub use registry::Registry;
pub use setting::Setting;

/// The range size used when nothing else is configured.
pub const DEFAULT_RANGE_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(value) => value,
    None => unreachable!(),
};

/// An error that can happen while resolving a preallocator.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The configured range size is negative.
    #[error("missing preallocator: negative range size {0}")]
    NegativeRangeSize(num::BigInt),
    /// The configured range size does not fit into a 32-bit signed integer.
    #[error("missing preallocator: range size {0} is too large")]
    RangeSizeTooLarge(num::BigInt),
    /// There is no preallocator registered under the configured name.
    #[error("missing preallocator: unknown preallocator {0}")]
    UnknownPreallocator(String),
}

/// Decides how many values a sequence commits at once.
pub trait Preallocator: Send + Sync {
    /// The size of the next range to commit for the given sequence.
    fn next_range_size(&self, schema: &str, sequence: &str) -> NonZeroU32;
}

/// The preallocator used when nothing is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPreallocator;

impl Preallocator for DefaultPreallocator {
    fn next_range_size(&self, _schema: &str, _sequence: &str) -> NonZeroU32 {
        DEFAULT_RANGE_SIZE
    }
}

/// A preallocator that always commits ranges of the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRangeSize(pub NonZeroU32);

impl Preallocator for FixedRangeSize {
    fn next_range_size(&self, _schema: &str, _sequence: &str) -> NonZeroU32 {
        self.0
    }
}

/// Fit the `requested` range size to the range of the sequence.
///
/// If covering the requested amount of steps would take more than the whole `[min, max]`
/// range, preallocation is stifled and each range holds a single value.
pub fn fit_range_size<Value: ToBigInt>(
    requested: NonZeroU32,
    step: &Value,
    min: &Value,
    max: &Value,
) -> NonZeroU32 {
    let (Some(step), Some(min), Some(max)) = (step.to_bigint(), min.to_bigint(), max.to_bigint())
    else {
        return NonZeroU32::MIN;
    };

    let span = max - min;
    let reach = step.abs() * requested.get();

    if reach > span {
        NonZeroU32::MIN
    } else {
        requested
    }
}

/// Compute the allocation count for the given sequence.
pub fn allocation_count<P, Value>(
    preallocator: &P,
    schema: &str,
    sequence: &str,
    step: &Value,
    min: &Value,
    max: &Value,
) -> NonZeroU32
where
    P: Preallocator + ?Sized,
    Value: ToBigInt,
{
    let requested = preallocator.next_range_size(schema, sequence);
    let fitted = fit_range_size(requested, step, min, max);

    if fitted != requested {
        debug!(
            message = "range size truncated",
            schema,
            sequence,
            requested = requested.get(),
            fitted = fitted.get(),
        );
    }

    fitted
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;

    mock! {
        pub Preallocator {}
        impl Preallocator for Preallocator {
            fn next_range_size(&self, schema: &str, sequence: &str) -> NonZeroU32;
        }
    }

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn fit_range_size_logic() {
        let tests = [
            // Fits
            (100, 1i64, i64::from(i32::MIN), i64::from(i32::MAX), 100),
            (100, 200, i64::from(i16::MIN), i64::from(i16::MAX), 100),
            (100, -200, i64::from(i16::MIN), i64::from(i16::MAX), 100),
            (100, 200, i64::MIN, i64::MAX, 100),
            // - exactly the whole range
            (10, 10, 0, 100, 10),
            // Stifled
            // - the step is so large that a single range would overflow the type
            (100, (i64::MAX / 100) * 3, i64::MIN, i64::MAX, 1),
            // - a step spanning most of the range
            (100, 99, 0, 100, 1),
            (100, i64::from(i16::MAX) - 1, i64::from(i16::MIN), i64::from(i16::MAX), 1),
            // - more values requested than the range holds
            (3 * i16::MAX as u32, 1, i64::from(i16::MIN), i64::from(i16::MAX), 1),
            (11, 10, 0, 100, 1),
        ];

        for (requested, step, min, max, expected) in tests {
            let actual = fit_range_size(nz(requested), &step, &min, &max);
            assert_eq!(
                actual,
                nz(expected),
                "{requested} {step} {min} {max}"
            );
        }
    }

    #[test]
    fn allocation_count_asks_the_preallocator() {
        let mut preallocator = MockPreallocator::new();
        preallocator
            .expect_next_range_size()
            .withf(|schema, sequence| schema == "APP" && sequence == "SEQ_08")
            .times(1)
            .return_const(nz(7));

        let count = allocation_count(&preallocator, "APP", "SEQ_08", &1i32, &i32::MIN, &i32::MAX);

        assert_eq!(count, nz(7));
    }

    #[test]
    fn allocation_count_truncates() {
        let count = allocation_count(
            &FixedRangeSize(nz(3 * i16::MAX as u32)),
            "APP",
            "SEQ_09_05",
            &1i16,
            &i16::MIN,
            &i16::MAX,
        );

        assert_eq!(count, NonZeroU32::MIN);
    }

    #[test]
    fn default_preallocator() {
        assert_eq!(DefaultPreallocator.next_range_size("APP", "SEQ"), nz(100));
    }
}
