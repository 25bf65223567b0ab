//! Splitting fixed-point readings (hundredths of a unit) into integer and
//! fraction components for the console. Pure and stateless.

use core::fmt;

/// Integer-and-fraction view of a hundredths-scaled value.
///
/// The fraction keeps the historical 4-digit display scale: the remainder
/// in hundredths multiplied by 100, so `12345` splits into `123` and
/// `4500` ("123.4500"). The last two digits are always zero because the
/// source data carries only two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedParts {
    pub negative: bool,
    /// Truncating division by 100; signed.
    pub integer: i32,
    /// Remainder scaled to 4 digits, always in 0..=9900.
    pub fraction: u16,
}

pub fn split_centi(value: i32) -> FixedParts {
    FixedParts {
        negative: value < 0,
        integer: value / 100,
        fraction: ((value % 100).unsigned_abs() * 100) as u16,
    }
}

impl fmt::Display for FixedParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The integer part alone loses the sign for -0.xx values.
        if self.negative && self.integer == 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:04}", self.integer, self.fraction)
    }
}
