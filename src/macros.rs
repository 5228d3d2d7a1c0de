// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

/// Compile-time `SQ15x16` literal, rounded half away from zero.
///
/// Out-of-range literals and zero denominators fail to compile.
///
/// ```
/// use fixed_q16::{sq15x16, SQ15x16};
///
/// const THREE_HALVES: SQ15x16 = sq15x16!(3 / 2);
/// const MINUS_TWO: SQ15x16 = sq15x16!(-2);
///
/// assert_eq!(THREE_HALVES.into_raw(), 98_304);
/// assert_eq!(MINUS_TWO, SQ15x16::NEG_ONE * 2);
/// ```
#[macro_export]
macro_rules! sq15x16 {
    ($num:literal / $den:literal) => {{
        const VAL: i32 = $crate::macros::__private::ratio_raw($num as i64, $den as i64);
        $crate::fixed_point::SQ15x16::new(VAL)
    }};
    ($int:literal) => {{
        const VAL: i32 = $crate::macros::__private::ratio_raw($int as i64, 1);
        $crate::fixed_point::SQ15x16::new(VAL)
    }};
}

pub use crate::sq15x16;

#[doc(hidden)]
pub mod __private {
    /// round_half_away_from_zero((num << 16) / den), panicking (at compile time in const
    /// position) when the result leaves the raw range
    pub const fn ratio_raw(num: i64, den: i64) -> i32 {
        if den == 0 {
            panic!("sq15x16!: zero denominator");
        }

        let n = (num as i128) << 16;
        let d = den as i128;
        let q = n / d;
        let r = n % d;

        let abs_r = if r < 0 { -r } else { r };
        let abs_d = if d < 0 { -d } else { d };
        let away = if (n < 0) != (d < 0) { -1 } else { 1 };
        let v = if abs_r * 2 >= abs_d { q + away } else { q };

        if v < i32::MIN as i128 || v > i32::MAX as i128 {
            panic!("sq15x16!: value out of range");
        }
        v as i32
    }
}
