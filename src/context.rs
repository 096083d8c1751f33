use core::fmt;

use bitflags::bitflags;

use crate::{BigInteger, DecimalError};

/// How a result is rounded when digits must be discarded.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Rounding {
    /// Away from zero.
    Up,
    /// Toward zero.
    Down,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// To nearest, ties away from zero.
    HalfUp,
    /// To nearest, ties toward zero.
    HalfDown,
    /// To nearest, ties to the even neighbour.
    #[default]
    HalfEven,
    /// Any discard is an error.
    Unnecessary,
    /// Away from zero if the kept last digit is 0 or half the radix, otherwise
    /// toward zero.
    ZeroFiveUp,
}

bitflags! {
    /// Conditions raised while rounding. Operations only ever set bits.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Flags: u32 {
        const INEXACT = 0b000001;
        const ROUNDED = 0b000010;
        const SUBNORMAL = 0b000100;
        const UNDERFLOW = 0b001000;
        const OVERFLOW = 0b010000;
        const CLAMPED = 0b100000;
    }
}

/// Precision, rounding and exponent limits for an arithmetic operation.
///
/// A precision of zero means unlimited. Contexts are plain values: every
/// `with_*` method returns an independent copy with one setting changed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PrecisionContext {
    precision: BigInteger,
    precision_in_bits: bool,
    rounding: Rounding,
    e_min: BigInteger,
    e_max: BigInteger,
    has_exponent_range: bool,
    clamp_normal_exponents: bool,
    has_flags: bool,
}

// ============================================================================
// Presets
// ============================================================================

impl PrecisionContext {
    /// Unlimited precision, no exponent range, `HalfUp` rounding.
    pub fn unlimited() -> Self {
        Self {
            precision: BigInteger::zero(),
            precision_in_bits: false,
            rounding: Rounding::HalfUp,
            e_min: BigInteger::zero(),
            e_max: BigInteger::zero(),
            has_exponent_range: false,
            clamp_normal_exponents: false,
            has_flags: false,
        }
    }

    /// `precision` digits (0 for unlimited), `HalfUp` rounding, no exponent range.
    pub fn for_precision(precision: u32) -> Self {
        Self::unlimited().with_precision(precision)
    }

    /// Unlimited precision with the given rounding.
    pub fn for_rounding(rounding: Rounding) -> Self {
        Self::unlimited().with_rounding(rounding)
    }

    pub fn for_precision_and_rounding(precision: u32, rounding: Rounding) -> Self {
        Self::for_precision(precision).with_rounding(rounding)
    }

    /// Nine digits, `HalfUp`, exponents -999..=999.
    pub fn basic() -> Self {
        Self::for_precision_and_rounding(9, Rounding::HalfUp).with_exponent_range(-999, 999)
    }

    /// IEEE 754 decimal32 interchange parameters.
    pub fn decimal32() -> Self {
        Self::interchange(7, -95, 96)
    }

    /// IEEE 754 decimal64 interchange parameters.
    pub fn decimal64() -> Self {
        Self::interchange(16, -383, 384)
    }

    /// IEEE 754 decimal128 interchange parameters.
    pub fn decimal128() -> Self {
        Self::interchange(34, -6143, 6144)
    }

    /// 96-bit coefficient with exponents -28..=0, as used by .NET `System.Decimal`.
    ///
    /// With a precision in bits, the exponent range bounds the exponent itself
    /// rather than the adjusted exponent.
    pub fn cli_decimal() -> Self {
        Self::for_precision_and_rounding(96, Rounding::HalfEven)
            .with_precision_in_bits(true)
            .with_exponent_range(-28, 0)
            .with_exponent_clamp(true)
    }

    /// IEEE 754 binary32 parameters, for radix-2 values.
    pub fn binary32() -> Self {
        Self::for_precision_and_rounding(24, Rounding::HalfEven).with_exponent_range(-126, 127)
    }

    /// IEEE 754 binary64 parameters, for radix-2 values.
    pub fn binary64() -> Self {
        Self::for_precision_and_rounding(53, Rounding::HalfEven).with_exponent_range(-1022, 1023)
    }

    fn interchange(precision: u32, e_min: i32, e_max: i32) -> Self {
        Self::for_precision_and_rounding(precision, Rounding::HalfEven)
            .with_exponent_range(e_min, e_max)
            .with_exponent_clamp(true)
    }
}

impl Default for PrecisionContext {
    fn default() -> Self {
        Self::unlimited()
    }
}

// ============================================================================
// Builders
// ============================================================================

impl PrecisionContext {
    #[must_use]
    pub fn with_rounding(&self, rounding: Rounding) -> Self {
        Self {
            rounding,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_precision(&self, precision: u32) -> Self {
        Self {
            precision: BigInteger::from_u64(precision as u64),
            ..self.clone()
        }
    }

    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `precision` is negative.
    pub fn with_big_precision(&self, precision: &BigInteger) -> crate::Result<Self> {
        if precision.is_negative() {
            return Err(DecimalError::NegativeArgument);
        }
        Ok(Self {
            precision: precision.clone(),
            ..self.clone()
        })
    }

    /// Counts the precision in bits rather than radix digits.
    #[must_use]
    pub fn with_precision_in_bits(&self, in_bits: bool) -> Self {
        Self {
            precision_in_bits: in_bits,
            ..self.clone()
        }
    }

    /// # Panics
    /// Panics if `e_min > e_max`.
    #[must_use]
    pub fn with_exponent_range(&self, e_min: i32, e_max: i32) -> Self {
        assert!(e_min <= e_max, "exponent range is empty");
        Self {
            e_min: BigInteger::from_i32(e_min),
            e_max: BigInteger::from_i32(e_max),
            has_exponent_range: true,
            ..self.clone()
        }
    }

    /// # Errors
    /// Returns `DecimalError::InvalidContext` if `e_min > e_max`.
    pub fn with_big_exponent_range(
        &self,
        e_min: &BigInteger,
        e_max: &BigInteger,
    ) -> crate::Result<Self> {
        if e_min > e_max {
            return Err(DecimalError::InvalidContext);
        }
        Ok(Self {
            e_min: e_min.clone(),
            e_max: e_max.clone(),
            has_exponent_range: true,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn with_unlimited_exponents(&self) -> Self {
        Self {
            has_exponent_range: false,
            ..self.clone()
        }
    }

    /// Enables flag recording for the `*_with_flags` operations.
    #[must_use]
    pub fn with_blank_flags(&self) -> Self {
        Self {
            has_flags: true,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_no_flags(&self) -> Self {
        Self {
            has_flags: false,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_exponent_clamp(&self, clamp: bool) -> Self {
        Self {
            clamp_normal_exponents: clamp,
            ..self.clone()
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl PrecisionContext {
    #[inline]
    pub fn precision(&self) -> &BigInteger {
        &self.precision
    }

    #[inline]
    pub fn precision_in_bits(&self) -> bool {
        self.precision_in_bits
    }

    #[inline]
    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    #[inline]
    pub fn e_min(&self) -> &BigInteger {
        &self.e_min
    }

    #[inline]
    pub fn e_max(&self) -> &BigInteger {
        &self.e_max
    }

    #[inline]
    pub fn has_exponent_range(&self) -> bool {
        self.has_exponent_range
    }

    #[inline]
    pub fn clamp_normal_exponents(&self) -> bool {
        self.clamp_normal_exponents
    }

    #[inline]
    pub fn has_flags(&self) -> bool {
        self.has_flags
    }

    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.precision.is_zero()
    }

    /// Whether a value with this exponent can be represented.
    ///
    /// With a range, the exponent must not exceed `e_max` and, under a
    /// bounded precision, a full-precision value at this exponent must not have
    /// its top digit below `e_min`.
    pub fn exponent_within_range(&self, exponent: &BigInteger) -> bool {
        if !self.has_exponent_range {
            return true;
        }
        if exponent > &self.e_max {
            return false;
        }
        if self.precision.is_zero() {
            return true;
        }
        let top = exponent.add(&self.precision).subtract(&BigInteger::one());
        top >= self.e_min
    }
}

impl fmt::Debug for PrecisionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PrecisionContext");
        s.field("precision", &format_args!("{}", self.precision));
        if self.precision_in_bits {
            s.field("precision_in_bits", &true);
        }
        s.field("rounding", &self.rounding);
        if self.has_exponent_range {
            s.field("e_min", &format_args!("{}", self.e_min));
            s.field("e_max", &format_args!("{}", self.e_max));
        }
        s.field("clamp_normal_exponents", &self.clamp_normal_exponents)
            .field("has_flags", &self.has_flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::format;

    use super::*;

    #[test]
    fn test_with_returns_independent_copy() {
        let base = PrecisionContext::for_precision(5);
        let changed = base.with_rounding(Rounding::Floor).with_blank_flags();
        assert_eq!(base.rounding(), Rounding::HalfUp);
        assert!(!base.has_flags());
        assert_eq!(changed.rounding(), Rounding::Floor);
        assert!(changed.has_flags());
        assert_eq!(changed.precision(), &BigInteger::from_i32(5));
        assert!(!changed.with_no_flags().has_flags());
    }

    #[test]
    fn test_exponent_within_range() {
        let ctx = PrecisionContext::for_precision(5).with_exponent_range(-10, 10);
        assert!(ctx.exponent_within_range(&BigInteger::from_i32(10)));
        assert!(!ctx.exponent_within_range(&BigInteger::from_i32(11)));
        // -14 + 5 - 1 == -10
        assert!(ctx.exponent_within_range(&BigInteger::from_i32(-14)));
        assert!(!ctx.exponent_within_range(&BigInteger::from_i32(-15)));

        let unlimited_precision = ctx.with_precision(0);
        assert!(unlimited_precision.exponent_within_range(&BigInteger::from_i32(-1000)));
        assert!(!unlimited_precision.exponent_within_range(&BigInteger::from_i32(11)));

        let open = ctx.with_unlimited_exponents();
        assert!(open.exponent_within_range(&BigInteger::from_i32(1_000_000)));
    }

    #[test]
    fn test_big_builders_validate() {
        let ctx = PrecisionContext::unlimited();
        assert_eq!(
            ctx.with_big_precision(&BigInteger::from_i32(-1)).err(),
            Some(DecimalError::NegativeArgument)
        );
        assert_eq!(
            ctx.with_big_exponent_range(&BigInteger::from_i32(3), &BigInteger::from_i32(2))
                .err(),
            Some(DecimalError::InvalidContext)
        );
        let ranged = ctx
            .with_big_exponent_range(&BigInteger::from_i32(-3), &BigInteger::from_i32(2))
            .unwrap();
        assert!(ranged.has_exponent_range());
    }

    #[test]
    #[should_panic(expected = "exponent range is empty")]
    fn test_empty_exponent_range_panics() {
        let _ = PrecisionContext::unlimited().with_exponent_range(1, 0);
    }

    #[test]
    fn test_presets() {
        let d64 = PrecisionContext::decimal64();
        assert_eq!(d64.precision(), &BigInteger::from_i32(16));
        assert_eq!(d64.rounding(), Rounding::HalfEven);
        assert!(d64.clamp_normal_exponents());
        assert_eq!(d64.e_max(), &BigInteger::from_i32(384));

        let cli = PrecisionContext::cli_decimal();
        assert!(cli.precision_in_bits());
        assert_eq!(cli.e_min(), &BigInteger::from_i32(-28));

        assert!(PrecisionContext::default().is_unlimited());
        assert_eq!(PrecisionContext::basic().e_min(), &BigInteger::from_i32(-999));
    }

    #[test]
    fn test_flags_accumulate() {
        let mut flags = Flags::default();
        assert!(flags.is_empty());
        flags |= Flags::INEXACT | Flags::ROUNDED;
        flags |= Flags::ROUNDED;
        assert_eq!(flags, Flags::INEXACT | Flags::ROUNDED);
        assert!(!flags.contains(Flags::OVERFLOW));
    }

    #[test]
    fn test_debug_format() {
        let s = format!("{:?}", PrecisionContext::basic());
        assert!(s.contains("precision: 9"));
        assert!(s.contains("e_max: 999"));
    }
}
