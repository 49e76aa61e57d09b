//! The preallocator setting.

use core::{num::NonZeroU32, str::FromStr};

use num::{BigInt, Signed, ToPrimitive, Zero};

use crate::Error;

/// The configured preallocation policy of a database.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Setting {
    /// Use the default range size.
    #[default]
    Default,
    /// Commit ranges of a fixed size.
    RangeSize(NonZeroU32),
    /// Use the preallocator registered under the given name.
    Named(String),
}

impl Setting {
    /// Parse the setting from an optional property value, treating an absent value as
    /// [`Setting::Default`].
    pub fn from_property(value: Option<&str>) -> Result<Self, Error> {
        value.map_or(Ok(Self::Default), str::parse)
    }
}

impl FromStr for Setting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Default);
        }

        let number: BigInt = match s.parse() {
            Ok(number) => number,
            Err(_) => return Ok(Self::Named(s.to_owned())),
        };

        if number.is_zero() {
            return Ok(Self::Default);
        }
        if number.is_negative() {
            return Err(Error::NegativeRangeSize(number));
        }

        // Range sizes have to fit into a 32-bit signed integer.
        number
            .to_i32()
            .and_then(|value| u32::try_from(value).ok())
            .and_then(NonZeroU32::new)
            .map(Self::RangeSize)
            .ok_or(Error::RangeSizeTooLarge(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn parse() {
        let tests = [
            // Ok
            ("", Ok(Setting::Default)),
            ("   ", Ok(Setting::Default)),
            ("0", Ok(Setting::Default)),
            ("30", Ok(Setting::RangeSize(nz(30)))),
            (" 7 ", Ok(Setting::RangeSize(nz(7)))),
            ("98301", Ok(Setting::RangeSize(nz(98301)))),
            ("2147483647", Ok(Setting::RangeSize(nz(i32::MAX as u32)))),
            (
                "com.example.LegalAllocator",
                Ok(Setting::Named("com.example.LegalAllocator".to_owned())),
            ),
            // Errors
            ("-1", Err(Error::NegativeRangeSize(BigInt::from(-1)))),
            (
                "2147483648",
                Err(Error::RangeSizeTooLarge(BigInt::from(2147483648u64))),
            ),
            (
                "9223372036854775806",
                Err(Error::RangeSizeTooLarge(BigInt::from(i64::MAX - 1))),
            ),
        ];

        for (input, expected) in tests {
            let actual: Result<Setting, _> = input.parse();
            assert_eq!(actual, expected, "{input:?}");
        }
    }

    #[test]
    fn absent_property_is_default() {
        assert_eq!(Setting::from_property(None), Ok(Setting::Default));
        assert_eq!(
            Setting::from_property(Some("12")),
            Ok(Setting::RangeSize(nz(12)))
        );
    }
}
