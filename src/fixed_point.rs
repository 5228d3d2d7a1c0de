// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

use crate::{decimal::Decimal, error::FixedPointError, utils::extract_from_raw_bytes};
use std::fmt;
use std::str::FromStr;

/// Signed Q15.16 fixed-point numerical type (the Q16.16 format: a 32-bit raw integer
/// whose value is `raw / 2^16`)
///
/// ## Fields
///
/// * `0` - The Q15.16 value represented as an i32
///
/// ## Notes
///
/// * Uses an i64 intermediate type for multiplication and division
/// * sign bit, 15 integer bits, 16 fractional bits
/// * Range: [-32768, 32768), fractional resolution = 2^-16 ≈ 1.5259 * 10^-5
/// * Every bit pattern is a finite value; equality, ordering and hashing are those of the raw integer
/// * Arithmetic operators panic on overflow, the `checked_*` methods return the same failures as errors.
///   Negation, shifts, `increment` and `decrement` operate on the raw bits and are never checked
/// * Interchange byte order is little-endian
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct SQ15x16(pub i32);

impl SQ15x16 {
    pub const FRAC_BITS: u32 = 16;
    pub const SCALE: i32 = 1 << Self::FRAC_BITS;
    const FRAC_MASK: i32 = Self::SCALE - 1;

    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::SCALE);
    pub const NEG_ONE: Self = Self(-Self::SCALE);
    pub const HALF: Self = Self(Self::SCALE / 2);
    /// Smallest positive value, one raw unit
    pub const EPSILON: Self = Self(1);

    /// π rounded to Q16.16
    pub const PI: Self = Self(205_887);
    /// e rounded to Q16.16
    pub const E: Self = Self(178_145);

    #[inline] pub const fn new(raw: i32) -> Self { Self(raw) }
    #[inline] pub const fn from_raw(raw: i32) -> Self { Self(raw) }
    #[inline] pub const fn into_raw(self) -> i32 { self.0 }
    #[inline] pub const fn from_bits(bits: i32) -> Self { Self(bits) }
    #[inline] pub const fn to_bits(self) -> i32 { self.0 }

    /// ## Convert an integer to fixed-point
    ///
    /// ### Arguments
    ///
    /// * `value` - The integer value, must lie in [-32768, 32767]
    ///
    /// ### Returns
    ///
    /// `value << 16`, or `FixedPointError::Overflow` if the shift would lose high bits
    #[inline]
    pub const fn from_int(value: i32) -> Result<Self, FixedPointError> {
        let raw = value.wrapping_shl(Self::FRAC_BITS);
        if raw >> Self::FRAC_BITS != value {
            return Err(FixedPointError::Overflow);
        }
        Ok(Self(raw))
    }

    /// Integer part, truncated toward zero.
    ///
    /// Negative values get a `0xFFFF` bias before the arithmetic shift so the shift does not floor.
    #[inline]
    pub const fn to_i32(self) -> i32 {
        (self.0 + ((self.0 >> 31) & Self::FRAC_MASK)) >> Self::FRAC_BITS
    }

    /// ## Convert a double to fixed-point
    ///
    /// round_half_away_from_zero(value * 2^16): the product gets `+0.5` when non-negative and
    /// `-0.5` when negative, then is truncated toward zero.
    ///
    /// ### Returns
    ///
    /// `FixedPointError::Overflow` for non-finite input or a result outside the raw range
    pub fn from_f64(value: f64) -> Result<Self, FixedPointError> {
        if !value.is_finite() {
            tracing::trace!(value, "rejected non-finite float for fixed-point conversion");
            return Err(FixedPointError::Overflow);
        }

        let product = value * Self::SCALE as f64;
        let biased = if product >= 0.0 { product + 0.5 } else { product - 0.5 };
        let truncated = biased.trunc();

        if truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
            tracing::trace!(value, "float outside fixed-point range");
            return Err(FixedPointError::Overflow);
        }
        Ok(Self(truncated as i32))
    }

    /// Single-precision input is widened to `f64` (exact) before scaling
    #[inline]
    pub fn from_f32(value: f32) -> Result<Self, FixedPointError> {
        Self::from_f64(value as f64)
    }

    #[inline] pub fn to_f64(self) -> f64 { self.0 as f64 / Self::SCALE as f64 }
    #[inline] pub fn to_f32(self) -> f32 { self.to_f64() as f32 }

    /// Exact base-10 expansion of this value
    #[inline]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from_q16_raw(self.0)
    }

    /// round_half_away_from_zero(value * 2^16)
    #[inline]
    pub fn from_decimal(value: Decimal) -> Result<Self, FixedPointError> {
        value.to_q16_raw().map(Self)
    }

    // --- checked arithmetic, storage domain ---
    #[inline] pub fn checked_add(self, rhs: Self) -> Result<Self, FixedPointError> { self.0.checked_add(rhs.0).map(Self).ok_or(FixedPointError::Overflow) }
    #[inline] pub fn checked_sub(self, rhs: Self) -> Result<Self, FixedPointError> { self.0.checked_sub(rhs.0).map(Self).ok_or(FixedPointError::Overflow) }
    #[inline] pub fn checked_mul_int(self, rhs: i32) -> Result<Self, FixedPointError> { self.0.checked_mul(rhs).map(Self).ok_or(FixedPointError::Overflow) }

    /// Negation that reports `MIN` instead of wrapping
    #[inline]
    pub fn checked_neg(self) -> Result<Self, FixedPointError> {
        self.0.checked_neg().map(Self).ok_or(FixedPointError::Overflow)
    }

    // --- widening arithmetic, into the i64 domain ---

    /// ## Multiply two fixed-point values
    ///
    /// The full 64-bit product must have bits 47 and up equal to its sign, otherwise the
    /// result cannot be narrowed back. The product is rounded to nearest with ties away
    /// from zero: bias `0x8000` when non-negative, `0x8000 - 1` when negative, then an
    /// arithmetic shift right by 16.
    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Result<Self, FixedPointError> {
        let product: i64 = self.0 as i64 * rhs.0 as i64;

        let high = product >> 47;
        if high != 0 && high != -1 {
            return Err(FixedPointError::Overflow);
        }

        // (product >> 63) is 0 or -1
        let bias: i64 = 0x8000 + (product >> 63);
        let shifted = (product + bias) >> Self::FRAC_BITS;

        // products just under 2^47 round up to 2^31
        i32::try_from(shifted).map(Self).map_err(|_| FixedPointError::Overflow)
    }

    /// ## Divide two fixed-point values
    ///
    /// `(a << 16) / b` in 64 bits, truncating toward zero, then range-checked.
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Result<Self, FixedPointError> {
        if rhs.0 == 0 {
            return Err(FixedPointError::DivideByZero);
        }

        let num: i64 = (self.0 as i64) << Self::FRAC_BITS;
        let q: i64 = num / rhs.0 as i64;
        i32::try_from(q).map(Self).map_err(|_| FixedPointError::Overflow)
    }

    /// Raw remainder; the shared scale cancels so `a % b` on raw values is the fixed-point
    /// remainder. Takes the sign of the dividend.
    #[inline]
    pub fn checked_rem(self, rhs: Self) -> Result<Self, FixedPointError> {
        if rhs.0 == 0 {
            return Err(FixedPointError::DivideByZero);
        }
        // MIN % -1 is exactly zero
        Ok(Self(self.0.wrapping_rem(rhs.0)))
    }

    /// Adds one unit (`raw + 2^16`) without an overflow check
    #[inline] pub const fn increment(self) -> Self { Self(self.0.wrapping_add(Self::SCALE)) }
    /// Subtracts one unit (`raw - 2^16`) without an overflow check
    #[inline] pub const fn decrement(self) -> Self { Self(self.0.wrapping_sub(Self::SCALE)) }

    // --- sign helpers ---
    #[inline] pub const fn is_negative(&self) -> bool { self.0 < 0 }
    #[inline] pub const fn is_positive(&self) -> bool { self.0 > 0 }
    #[inline] pub const fn is_zero(&self) -> bool { self.0 == 0 }

    /// Unchecked like negation: `MIN.abs()` is `MIN`
    #[inline] pub const fn abs(self) -> Self { Self(self.0.wrapping_abs()) }

    #[inline]
    pub fn checked_abs(self) -> Result<Self, FixedPointError> {
        self.0.checked_abs().map(Self).ok_or(FixedPointError::Overflow)
    }

    /// `ONE`, `ZERO` or `NEG_ONE`
    #[inline]
    pub const fn signum(self) -> Self {
        match self.0 {
            0 => Self::ZERO,
            r if r > 0 => Self::ONE,
            _ => Self::NEG_ONE,
        }
    }

    // --- rounding to whole units ---

    /// Largest whole value `<= self`
    #[inline] pub const fn floor(self) -> Self { Self(self.0 & !Self::FRAC_MASK) }

    /// Whole part toward zero
    #[inline]
    pub const fn trunc(self) -> Self {
        Self(self.to_i32() << Self::FRAC_BITS)
    }

    /// Fractional part with the sign of `self`
    #[inline]
    pub const fn fract(self) -> Self {
        Self(self.0 - self.trunc().0)
    }

    /// Smallest whole value `>= self`
    #[inline]
    pub fn ceil(self) -> Result<Self, FixedPointError> {
        let raw = (self.0 as i64 + Self::FRAC_MASK as i64) & !(Self::FRAC_MASK as i64);
        i32::try_from(raw).map(Self).map_err(|_| FixedPointError::Overflow)
    }

    /// Nearest whole value, ties away from zero
    #[inline]
    pub fn round(self) -> Result<Self, FixedPointError> {
        let raw = self.0 as i64;
        let bias = 0x8000 + (raw >> 63);
        let rounded = (raw + bias) & !(Self::FRAC_MASK as i64);
        i32::try_from(rounded).map(Self).map_err(|_| FixedPointError::Overflow)
    }

    // --- wire encoding ---
    #[inline] pub const fn to_le_bytes(self) -> [u8; 4] { self.0.to_le_bytes() }
    #[inline] pub const fn from_le_bytes(bytes: [u8; 4]) -> Self { Self(i32::from_le_bytes(bytes)) }
    #[inline] pub const fn to_be_bytes(self) -> [u8; 4] { self.0.to_be_bytes() }
    #[inline] pub const fn from_be_bytes(bytes: [u8; 4]) -> Self { Self(i32::from_be_bytes(bytes)) }

    /// ## Decode a little-endian value from a slice of exactly 4 bytes
    ///
    /// ### Returns
    ///
    /// `FixedPointError::RangeError` if the slice length is not 4
    #[inline]
    pub fn try_from_le_slice(bytes: &[u8]) -> Result<Self, FixedPointError> {
        let word: [u8; 4] = extract_from_raw_bytes(bytes, 0..bytes.len())?;
        Ok(Self::from_le_bytes(word))
    }

    /// Decode the little-endian value stored at `offset` inside a larger buffer
    #[inline]
    pub fn read_le_at(bytes: &[u8], offset: usize) -> Result<Self, FixedPointError> {
        let end = offset.checked_add(4).ok_or(FixedPointError::RangeError)?;
        let word: [u8; 4] = extract_from_raw_bytes(bytes, offset..end)?;
        Ok(Self::from_le_bytes(word))
    }

    #[track_caller]
    #[inline]
    fn expect_op(result: Result<Self, FixedPointError>, overflow_msg: &'static str) -> Self {
        match result {
            Ok(value) => value,
            Err(FixedPointError::DivideByZero) => panic!("division by zero"),
            Err(_) => panic!("{}", overflow_msg),
        }
    }
}

// ---- conversions ----

impl core::convert::From<i8> for SQ15x16 {
    #[inline]
    fn from(v: i8) -> Self {
        Self((v as i32) << Self::FRAC_BITS)
    }
}

impl core::convert::From<u8> for SQ15x16 {
    #[inline]
    fn from(v: u8) -> Self {
        Self((v as i32) << Self::FRAC_BITS)
    }
}

impl core::convert::From<i16> for SQ15x16 {
    #[inline]
    fn from(v: i16) -> Self {
        Self((v as i32) << Self::FRAC_BITS)
    }
}

impl core::convert::TryFrom<i32> for SQ15x16 {
    type Error = FixedPointError;

    #[inline]
    fn try_from(v: i32) -> Result<Self, Self::Error> {
        Self::from_int(v)
    }
}

impl core::convert::TryFrom<u16> for SQ15x16 {
    type Error = FixedPointError;

    #[inline]
    fn try_from(v: u16) -> Result<Self, Self::Error> {
        Self::from_int(v as i32)
    }
}

impl core::convert::TryFrom<i64> for SQ15x16 {
    type Error = FixedPointError;

    #[inline]
    fn try_from(v: i64) -> Result<Self, Self::Error> {
        let short: i32 = <_ as core::convert::TryFrom<i64>>::try_from(v)
            .map_err(|_| FixedPointError::Overflow)?;
        Self::from_int(short)
    }
}

impl core::convert::TryFrom<u32> for SQ15x16 {
    type Error = FixedPointError;

    #[inline]
    fn try_from(v: u32) -> Result<Self, Self::Error> {
        let short: i32 = <_ as core::convert::TryFrom<u32>>::try_from(v)
            .map_err(|_| FixedPointError::Overflow)?;
        Self::from_int(short)
    }
}

impl core::convert::TryFrom<u64> for SQ15x16 {
    type Error = FixedPointError;

    #[inline]
    fn try_from(v: u64) -> Result<Self, Self::Error> {
        let short: i32 = <_ as core::convert::TryFrom<u64>>::try_from(v)
            .map_err(|_| FixedPointError::Overflow)?;
        Self::from_int(short)
    }
}

impl core::convert::TryFrom<f64> for SQ15x16 {
    type Error = FixedPointError;
    #[inline] fn try_from(v: f64) -> Result<Self, Self::Error> { Self::from_f64(v) }
}

impl core::convert::TryFrom<f32> for SQ15x16 {
    type Error = FixedPointError;
    #[inline] fn try_from(v: f32) -> Result<Self, Self::Error> { Self::from_f32(v) }
}

impl core::convert::TryFrom<Decimal> for SQ15x16 {
    type Error = FixedPointError;
    #[inline] fn try_from(v: Decimal) -> Result<Self, Self::Error> { Self::from_decimal(v) }
}

impl core::convert::From<SQ15x16> for f64 {
    #[inline] fn from(v: SQ15x16) -> Self { v.to_f64() }
}

impl core::convert::From<SQ15x16> for f32 {
    #[inline] fn from(v: SQ15x16) -> Self { v.to_f32() }
}

impl core::convert::From<SQ15x16> for Decimal {
    #[inline] fn from(v: SQ15x16) -> Self { v.to_decimal() }
}

// ---- operator impls (PANIC on overflow, see the checked_* methods) ----

impl core::ops::Add<SQ15x16> for SQ15x16 {
    type Output = Self;

    #[track_caller]
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::expect_op(self.checked_add(rhs), "addition overflow")
    }
}

impl core::ops::Sub<SQ15x16> for SQ15x16 {
    type Output = Self;

    #[track_caller]
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::expect_op(self.checked_sub(rhs), "subtraction overflow")
    }
}

impl core::ops::Mul<SQ15x16> for SQ15x16 {
    type Output = Self;

    #[track_caller]
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::expect_op(self.checked_mul(rhs), "multiplication overflow")
    }
}

impl core::ops::Mul<i32> for SQ15x16 {
    type Output = Self;

    #[track_caller]
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::expect_op(self.checked_mul_int(rhs), "multiplication overflow")
    }
}

impl core::ops::Mul<SQ15x16> for i32 {
    type Output = SQ15x16;

    #[track_caller]
    #[inline]
    fn mul(self, rhs: SQ15x16) -> SQ15x16 {
        SQ15x16::expect_op(rhs.checked_mul_int(self), "multiplication overflow")
    }
}

impl core::ops::Div<SQ15x16> for SQ15x16 {
    type Output = Self;

    #[track_caller]
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self::expect_op(self.checked_div(rhs), "division overflow")
    }
}

impl core::ops::Rem<SQ15x16> for SQ15x16 {
    type Output = Self;

    #[track_caller]
    #[inline]
    fn rem(self, rhs: Self) -> Self {
        Self::expect_op(self.checked_rem(rhs), "division overflow")
    }
}

impl core::ops::Neg for SQ15x16 {
    type Output = Self;
    #[inline] fn neg(self) -> Self { Self(self.0.wrapping_neg()) }
}

impl core::ops::Neg for &SQ15x16 {
    type Output = SQ15x16;
    #[inline] fn neg(self) -> SQ15x16 { -*self }
}

// ---- Assign variants ----

impl core::ops::AddAssign<SQ15x16> for SQ15x16 {
    #[track_caller] #[inline] fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}
impl core::ops::SubAssign<SQ15x16> for SQ15x16 {
    #[track_caller] #[inline] fn sub_assign(&mut self, rhs: Self) { *self = *self - rhs; }
}
impl core::ops::MulAssign<SQ15x16> for SQ15x16 {
    #[track_caller] #[inline] fn mul_assign(&mut self, rhs: Self) { *self = *self * rhs; }
}
impl core::ops::MulAssign<i32> for SQ15x16 {
    #[track_caller] #[inline] fn mul_assign(&mut self, rhs: i32) { *self = *self * rhs; }
}
impl core::ops::DivAssign<SQ15x16> for SQ15x16 {
    #[track_caller] #[inline] fn div_assign(&mut self, rhs: Self) { *self = *self / rhs; }
}
impl core::ops::RemAssign<SQ15x16> for SQ15x16 {
    #[track_caller] #[inline] fn rem_assign(&mut self, rhs: Self) { *self = *self % rhs; }
}

// Shifts act on the raw bits with no overflow or rounding check; the count is taken mod 32.

impl core::ops::Shl<u32> for SQ15x16 {
    type Output = Self;
    #[inline] fn shl(self, shift: u32) -> Self { Self(self.0.wrapping_shl(shift)) }
}

impl core::ops::Shr<u32> for SQ15x16 {
    type Output = Self;
    #[inline] fn shr(self, shift: u32) -> Self { Self(self.0.wrapping_shr(shift)) }
}

impl core::ops::Shl<usize> for SQ15x16 {
    type Output = Self;
    #[inline] fn shl(self, shift: usize) -> Self { Self(self.0.wrapping_shl(shift as u32)) }
}

impl core::ops::Shr<usize> for SQ15x16 {
    type Output = Self;
    #[inline] fn shr(self, shift: usize) -> Self { Self(self.0.wrapping_shr(shift as u32)) }
}

impl core::ops::ShlAssign<u32> for SQ15x16 {
    #[inline] fn shl_assign(&mut self, shift: u32) { *self = *self << shift; }
}

impl core::ops::ShrAssign<u32> for SQ15x16 {
    #[inline] fn shr_assign(&mut self, shift: u32) { *self = *self >> shift; }
}

impl core::ops::ShlAssign<usize> for SQ15x16 {
    #[inline] fn shl_assign(&mut self, shift: usize) { *self = *self << shift; }
}

impl core::ops::ShrAssign<usize> for SQ15x16 {
    #[inline] fn shr_assign(&mut self, shift: usize) { *self = *self >> shift; }
}

impl core::iter::Sum for SQ15x16 {
    #[track_caller]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl<'a> core::iter::Sum<&'a SQ15x16> for SQ15x16 {
    #[track_caller]
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + *v)
    }
}

// ---- text, always through the base-10 intermediate ----

impl fmt::Display for SQ15x16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_decimal(), f)
    }
}

impl FromStr for SQ15x16 {
    type Err = FixedPointError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let decimal: Decimal = src.parse().map_err(|err| {
            tracing::debug!(input = src, error = %err, "rejected fixed-point text");
            FixedPointError::Parse(err)
        })?;
        Self::from_decimal(decimal)
    }
}

// Optional: bytemuck
#[cfg(feature = "bytemuck")]
unsafe impl bytemuck::Zeroable for SQ15x16 {}
#[cfg(feature = "bytemuck")]
unsafe impl bytemuck::Pod for SQ15x16 {}

// Optional: serde
#[cfg(feature = "serde")]
impl serde::Serialize for SQ15x16 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        serde::Serialize::serialize(&self.0, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SQ15x16 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: serde::Deserializer<'de>
    {
        <i32 as serde::Deserialize>::deserialize(deserializer).map(Self)
    }
}

// Optional: borsh (little-endian i32)
#[cfg(feature = "borsh")]
impl borsh::BorshSerialize for SQ15x16 {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> Result<(), std::io::Error> {
        borsh::BorshSerialize::serialize(&self.0, writer)
    }
}

#[cfg(feature = "borsh")]
impl borsh::BorshDeserialize for SQ15x16 {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> Result<Self, std::io::Error> {
        let raw: i32 = borsh::BorshDeserialize::deserialize_reader(reader)?;
        Ok(Self(raw))
    }
}
