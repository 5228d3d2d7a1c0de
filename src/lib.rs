// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

//! Deterministic Q16.16 fixed-point arithmetic.
//!
//! [`SQ15x16`] stores a value as `raw / 2^16` in a single `i32`. Arithmetic is integer-only,
//! overflow is reported instead of wrapped, and text goes through an exact base-10
//! [`Decimal`] so the same value prints and parses identically on every host.

pub mod error;
pub mod macros;
pub mod decimal;
pub mod fixed_point;
mod utils;

pub use decimal::Decimal;
pub use error::{FixedPointError, ParseDecimalError};
pub use fixed_point::SQ15x16;
