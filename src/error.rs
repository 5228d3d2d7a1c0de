// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised by checked fixed-point operations and conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FixedPointError {
    /// The exact result does not fit in the Q16.16 range
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivideByZero,

    #[error("invalid decimal text: {0}")]
    Parse(#[from] ParseDecimalError),

    /// A byte buffer had the wrong length for the encoding
    #[error("byte range does not match the encoded width")]
    RangeError,

    #[error("value does not fit in the target integer type")]
    IntegerConversionError,
}

/// Reasons a string fails to parse as a base-10 decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    #[error("empty string")]
    Empty,

    #[error("invalid digit found in string")]
    InvalidDigit,

    /// Integer digits exceed the 28-digit decimal capacity
    #[error("number too large to fit in a decimal")]
    Overflow,
}
