// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

use crate::error::{FixedPointError, ParseDecimalError};
use std::fmt;
use std::str::FromStr;

/// Largest number of fractional digits a [`Decimal`] carries
pub const MAX_SCALE: u32 = 28;

/// Largest magnitude of a [`Decimal`] mantissa (28 nines)
pub const MAX_MANTISSA: i128 = 9_999_999_999_999_999_999_999_999_999;

/// 5^16, so that `raw / 2^16 == raw * 5^16 / 10^16` exactly
const FIVE_POW_FRAC: i128 = 152_587_890_625;

const Q16_FRAC_DIGITS: u32 = 16;
const Q16_FRAC_BITS: u32 = 16;

/// Base-10 decimal number `mantissa * 10^-scale`
///
/// ## Notes
///
/// * Always stored normalized: no trailing zeros in the mantissa while `scale > 0`,
///   so derived equality and hashing compare numeric values
/// * Every Q16.16 value has an exact representation (at most 16 fractional digits),
///   which makes text produced through this type identical on every host
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Self = Self { mantissa: 0, scale: 0 };
    pub const ONE: Self = Self { mantissa: 1, scale: 0 };

    /// ## Create a decimal from a mantissa and a base-10 scale
    ///
    /// ### Arguments
    ///
    /// * `mantissa` - The unscaled digits, `|mantissa| <= MAX_MANTISSA`
    /// * `scale` - The number of fractional digits, `scale <= MAX_SCALE`
    ///
    /// ### Returns
    ///
    /// The normalized decimal, or `FixedPointError::Overflow` when either bound is exceeded
    pub fn new(mantissa: i128, scale: u32) -> Result<Self, FixedPointError> {
        if scale > MAX_SCALE || mantissa.unsigned_abs() > MAX_MANTISSA as u128 {
            return Err(FixedPointError::Overflow);
        }
        Ok(Self::normalized(mantissa, scale))
    }

    #[inline]
    fn normalized(mut mantissa: i128, mut scale: u32) -> Self {
        if mantissa == 0 {
            return Self::ZERO;
        }
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Self { mantissa, scale }
    }

    #[inline] pub const fn mantissa(&self) -> i128 { self.mantissa }
    #[inline] pub const fn scale(&self) -> u32 { self.scale }
    #[inline] pub const fn is_zero(&self) -> bool { self.mantissa == 0 }
    #[inline] pub const fn is_negative(&self) -> bool { self.mantissa < 0 }

    /// Exact decimal expansion of a Q16.16 raw value
    pub(crate) fn from_q16_raw(raw: i32) -> Self {
        Self::normalized(raw as i128 * FIVE_POW_FRAC, Q16_FRAC_DIGITS)
    }

    /// round_half_away_from_zero(self * 2^16), range-checked into `i32`
    pub(crate) fn to_q16_raw(self) -> Result<i32, FixedPointError> {
        let num = self.mantissa << Q16_FRAC_BITS;
        let den = 10i128.pow(self.scale);

        let q = num / den;
        let r = num % den;
        // r carries the sign of num, so stepping by signum rounds away from zero
        let q = if r.unsigned_abs() * 2 >= den as u128 { q + num.signum() } else { q };

        i32::try_from(q).map_err(|_| FixedPointError::Overflow)
    }

    /// ## Round to at most `digits` fractional digits, ties away from zero
    ///
    /// Uses the same rule as the parser applies to digits past the decimal capacity
    pub fn round_dp(self, digits: u32) -> Self {
        if digits >= self.scale {
            return self;
        }
        let divisor = 10i128.pow(self.scale - digits);
        let q = self.mantissa / divisor;
        let r = self.mantissa % divisor;
        let q = if r.unsigned_abs() * 2 >= divisor as u128 { q + self.mantissa.signum() } else { q };
        Self::normalized(q, digits)
    }
}

impl From<i32> for Decimal {
    #[inline]
    fn from(value: i32) -> Self {
        Self::normalized(value as i128, 0)
    }
}

impl From<i64> for Decimal {
    #[inline]
    fn from(value: i64) -> Self {
        Self::normalized(value as i128, 0)
    }
}

impl TryFrom<Decimal> for i64 {
    type Error = FixedPointError;

    /// Truncates toward zero
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let whole = value.mantissa / 10i128.pow(value.scale);
        i64::try_from(whole).map_err(|_| FixedPointError::IntegerConversionError)
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Parses invariant-format decimal text: optional sign, ASCII digits with optional
    /// `,` group separators in the integer part, optional `.` followed by digits.
    /// Fractional digits beyond the 28-digit capacity are rounded half away from zero.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.trim_matches(|c: char| c.is_ascii_whitespace());
        if src.is_empty() {
            return Err(ParseDecimalError::Empty);
        }

        let (negative, body) = match src.as_bytes()[0] {
            b'-' => (true, &src[1..]),
            b'+' => (false, &src[1..]),
            _ => (false, src),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseDecimalError::InvalidDigit);
        }

        let mut mantissa: i128 = 0;
        let mut prev_was_digit = false;
        for (idx, byte) in int_part.bytes().enumerate() {
            match byte {
                b'0'..=b'9' => {
                    mantissa = mantissa * 10 + (byte - b'0') as i128;
                    if mantissa > MAX_MANTISSA {
                        return Err(ParseDecimalError::Overflow);
                    }
                    prev_was_digit = true;
                }
                // separators only between digits
                b',' if prev_was_digit && idx + 1 < int_part.len() => prev_was_digit = false,
                _ => return Err(ParseDecimalError::InvalidDigit),
            }
        }

        let mut scale = 0u32;
        let mut first_dropped: Option<u8> = None;
        for byte in frac_part.bytes() {
            if !byte.is_ascii_digit() {
                return Err(ParseDecimalError::InvalidDigit);
            }
            let digit = byte - b'0';
            if first_dropped.is_some() {
                continue;
            }
            let next = mantissa * 10 + digit as i128;
            if scale < MAX_SCALE && next <= MAX_MANTISSA {
                mantissa = next;
                scale += 1;
            } else {
                first_dropped = Some(digit);
            }
        }

        if matches!(first_dropped, Some(d) if d >= 5) {
            mantissa += 1;
            if mantissa > MAX_MANTISSA {
                // carried into a new digit; 10^28 ends in zero so this is exact
                if scale == 0 {
                    return Err(ParseDecimalError::Overflow);
                }
                mantissa /= 10;
                scale -= 1;
            }
        }

        if negative {
            mantissa = -mantissa;
        }
        Ok(Self::normalized(mantissa, scale))
    }
}

impl fmt::Display for Decimal {
    /// Without a precision the output is the trimmed exact value. `{:.N}` rounds half away
    /// from zero to `N` fractional digits and always prints exactly `N` of them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match f.precision() {
            Some(p) => self.round_dp(p.min(MAX_SCALE as usize) as u32),
            None => *self,
        };
        let frac_digits = f.precision().unwrap_or(value.scale as usize);

        let magnitude = value.mantissa.unsigned_abs();
        let divisor = 10u128.pow(value.scale);
        let int_part = magnitude / divisor;
        let frac_part = magnitude % divisor;

        let mut body = int_part.to_string();
        if frac_digits > 0 {
            body.push('.');
            if value.scale > 0 {
                body.push_str(&format!("{:0width$}", frac_part, width = value.scale as usize));
            }
            body.extend(core::iter::repeat('0').take(frac_digits - value.scale as usize));
        }
        // pad_integral honours width, fill and sign flags but never truncates to the precision
        f.pad_integral(!value.is_negative(), "", &body)
    }
}
