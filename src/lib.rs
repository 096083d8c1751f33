//! Arbitrary-precision integers and correctly rounded scaled numbers
//!
//! This library provides an unbounded integer type and two scaled-integer
//! number types built on it, sharing a single rounding engine:
//!
//! - **`BigInteger`**: sign-magnitude integer of unbounded size
//!   - 16-bit word storage, Karatsuba multiply and square, Knuth division
//!   - Minimal two's-complement byte interchange
//!
//! - **`DecimalFraction`**: `mantissa × 10^exponent`
//!   - Exact decimal arithmetic: 0.1 + 0.2 is exactly 0.3
//!   - Scientific, engineering and plain string forms
//!
//! - **`BigFloat`**: `mantissa × 2^exponent`
//!   - Exact conversion from and to `f32`/`f64`
//!
//! ## Rounding
//!
//! Every context-taking operation rounds its result through a
//! [`PrecisionContext`]: precision in radix digits (0 for unlimited), one of the
//! nine [`Rounding`] modes, an optional exponent range and optional exponent
//! clamping. Exceptional conditions (inexact, rounded, subnormal, underflow,
//! overflow, clamped) are reported through [`Flags`] by the `*_with_flags`
//! variants; they are never errors.
//!
//! ## Example
//!
//! ```rust
//! use radixnum::{DecimalFraction, PrecisionContext};
//!
//! let a: DecimalFraction = "0.1".parse().unwrap();
//! let b: DecimalFraction = "0.2".parse().unwrap();
//! let sum = a.add(&b, &PrecisionContext::unlimited()).unwrap();
//! assert_eq!(sum.to_string(), "0.3");
//!
//! let third = DecimalFraction::from_i64(1)
//!     .divide(&DecimalFraction::from_i64(3), &PrecisionContext::decimal64())
//!     .unwrap();
//! assert_eq!(third.to_string(), "0.3333333333333333");
//! ```

#![no_std]
#![cfg_attr(test, allow(unused_imports))]

#[cfg(test)]
extern crate std;

extern crate alloc;

mod big_float;
mod big_integer;
mod context;
mod decimal_fraction;
mod fast_integer;
mod float_bits;
mod mutable_number;
mod radix_math;
mod shift_accumulator;

pub use big_float::{BigFloat, BinaryHelper};
pub use big_integer::BigInteger;
pub use context::{Flags, PrecisionContext, Rounding};
pub use decimal_fraction::{DecimalFraction, DecimalHelper};
pub use fast_integer::FastInteger;
pub use mutable_number::MutableNumber;
pub use radix_math::{RadixHelper, RadixMath};
pub use shift_accumulator::{BitShiftAccumulator, DigitShiftAccumulator, ShiftAccumulator};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalError {
    #[error("invalid numeric format")]
    InvalidFormat,

    #[error("argument must not be negative")]
    NegativeArgument,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result has a nonterminating expansion in this radix")]
    NonTerminatingExpansion,

    #[error("precision loss would occur")]
    PrecisionLoss,

    #[error("exponent cannot be reached within the context precision")]
    ExponentUnreachable,

    #[error("integer quotient has more digits than the context precision")]
    DivisionImpossible,

    #[error("exponent is outside the context's exponent range")]
    ExponentOutOfRange,

    #[error("overflow: value too large to represent")]
    Overflow,

    #[error("value is not finite")]
    NotFinite,

    #[error("operation requires a context with bounded precision")]
    InvalidContext,
}

pub type Result<T> = core::result::Result<T, DecimalError>;
