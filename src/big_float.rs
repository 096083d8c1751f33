use core::cmp::Ordering;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::decimal_fraction::DecimalHelper;
use crate::float_bits::{self, FloatParts};
use crate::radix_math::{facade_ops, gate_flags, require};
use crate::{
    BigInteger, BitShiftAccumulator, DecimalError, DecimalFraction, FastInteger, Flags,
    PrecisionContext, RadixHelper, RadixMath,
};

/// Arbitrary-precision binary float: `mantissa × 2^exponent`.
///
/// Like [`DecimalFraction`], equality is structural and numeric ordering is
/// [`compare_to`](Self::compare_to).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigFloat {
    mantissa: BigInteger,
    exponent: BigInteger,
}

/// Radix-2 primitives for [`RadixMath`].
#[derive(Copy, Clone, Debug, Default)]
pub struct BinaryHelper;

static MATH: RadixMath<BinaryHelper> = RadixMath::new(BinaryHelper);

impl RadixHelper for BinaryHelper {
    type Value = BigFloat;
    type Accumulator = BitShiftAccumulator;

    #[inline]
    fn radix(&self) -> u32 {
        2
    }

    #[inline]
    fn mantissa<'a>(&self, value: &'a BigFloat) -> &'a BigInteger {
        &value.mantissa
    }

    #[inline]
    fn exponent<'a>(&self, value: &'a BigFloat) -> &'a BigInteger {
        &value.exponent
    }

    fn create_new(&self, mantissa: BigInteger, exponent: BigInteger) -> BigFloat {
        BigFloat::new(mantissa, exponent)
    }

    fn create_shift_accumulator_with_digits(
        &self,
        magnitude: &BigInteger,
        last: u32,
        older: bool,
    ) -> crate::Result<BitShiftAccumulator> {
        BitShiftAccumulator::with_digits(magnitude, last, older)
    }

    fn digit_length(&self, magnitude: &BigInteger) -> FastInteger {
        FastInteger::from_usize(magnitude.bit_length().max(1))
    }

    fn multiply_by_radix_power(&self, magnitude: &BigInteger, power: u32) -> BigInteger {
        magnitude.shift_left(power as i32)
    }

    fn has_terminating_radix_expansion(
        &self,
        numerator: &BigInteger,
        denominator: &BigInteger,
    ) -> bool {
        if numerator.is_zero() {
            return true;
        }
        let Ok(reduced) = denominator.abs().divide(&numerator.gcd(denominator)) else {
            return false;
        };
        // A power of two has a single set bit.
        reduced.lowest_set_bit() == Some(reduced.bit_length() - 1)
    }
}

// ============================================================================
// Construction
// ============================================================================

impl BigFloat {
    pub fn new(mantissa: BigInteger, exponent: BigInteger) -> Self {
        Self { mantissa, exponent }
    }

    pub fn zero() -> Self {
        Self::new(BigInteger::zero(), BigInteger::zero())
    }

    pub fn from_i64(value: i64) -> Self {
        Self::new(BigInteger::from_i64(value), BigInteger::zero())
    }

    pub fn from_big_integer(value: &BigInteger) -> Self {
        Self::new(value.clone(), BigInteger::zero())
    }

    fn from_parts(parts: FloatParts) -> Self {
        let mantissa = BigInteger::from_u64(parts.mantissa);
        Self::new(
            if parts.negative {
                mantissa.negate()
            } else {
                mantissa
            },
            BigInteger::from_i32(parts.exponent),
        )
    }

    /// Exact value of a finite `f64`. Negative zero becomes zero.
    ///
    /// # Errors
    /// Returns `DecimalError::NotFinite` for NaN and infinities.
    pub fn from_f64(value: f64) -> crate::Result<Self> {
        Ok(Self::from_parts(float_bits::decompose_f64(value)?))
    }

    /// Exact value of a finite `f32`. Negative zero becomes zero.
    ///
    /// # Errors
    /// Returns `DecimalError::NotFinite` for NaN and infinities.
    pub fn from_f32(value: f32) -> crate::Result<Self> {
        Ok(Self::from_parts(float_bits::decompose_f32(value)?))
    }

    /// Converts a decimal, rounding per `ctx` when the binary expansion is
    /// longer than its precision.
    ///
    /// # Errors
    /// Under unlimited precision, `NonTerminatingExpansion` unless the value
    /// is a dyadic rational. `Overflow` if the result exceeds the context's
    /// exponent range.
    pub fn from_decimal_fraction(
        value: &DecimalFraction,
        ctx: &PrecisionContext,
    ) -> crate::Result<Self> {
        require(Self::from_decimal_fraction_with_flags(
            value,
            ctx,
            &mut Flags::empty(),
        ))
    }

    pub fn from_decimal_fraction_with_flags(
        value: &DecimalFraction,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<Self>> {
        let zero = FastInteger::from_i32(0);
        let exponent = FastInteger::from_big(value.exponent());
        if exponent.signum() >= 0 {
            let scaled = DecimalHelper.rescale_by_exponent_diff(value.mantissa(), &exponent, &zero)?;
            return Self::from_big_integer(&scaled).plus_with_flags(ctx, flags);
        }
        // m × 10^-k = m / 10^k
        let denominator =
            DecimalHelper.rescale_by_exponent_diff(&BigInteger::one(), &exponent, &zero)?;
        Self::from_big_integer(value.mantissa()).divide_with_flags(
            &Self::from_big_integer(&denominator),
            ctx,
            flags,
        )
    }
}

// ============================================================================
// Accessors and Predicates
// ============================================================================

impl BigFloat {
    #[inline]
    pub fn mantissa(&self) -> &BigInteger {
        &self.mantissa
    }

    #[inline]
    pub fn exponent(&self) -> &BigInteger {
        &self.exponent
    }

    #[inline]
    pub fn signum(&self) -> i32 {
        self.mantissa.signum()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn compare_to(&self, other: &Self) -> Ordering {
        MATH.compare_to(self, other)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl BigFloat {
    facade_ops! {
        MATH;
        unary {
            /// Rounds to the context's precision in bits and its exponent range.
            round_to_precision, round_to_precision_with_flags;
            /// Same as `round_to_precision`; binary precision is already in bits.
            round_to_binary_precision, round_to_binary_precision_with_flags;
            plus, plus_with_flags;
            abs, abs_with_flags;
            negate, negate_with_flags;
            /// Rounds, then strips trailing zero bits from the mantissa.
            reduce, reduce_with_flags;
            round_to_integral_exact, round_to_integral_exact_with_flags;
        }
        binary {
            add, add_with_flags;
            subtract, subtract_with_flags;
            multiply, multiply_with_flags;
            /// Quotient to the context's precision. Under unlimited precision a
            /// divisor with an odd factor left after reduction is an error.
            divide, divide_with_flags;
            divide_to_integer_natural_scale, divide_to_integer_natural_scale_with_flags;
            divide_to_integer_zero_scale, divide_to_integer_zero_scale_with_flags;
            remainder, remainder_with_flags;
            remainder_near, remainder_near_with_flags;
            quantize, quantize_with_flags;
            min, min_with_flags;
            max, max_with_flags;
        }
    }

    pub fn multiply_and_add(
        &self,
        multiplicand: &Self,
        augend: &Self,
        ctx: &PrecisionContext,
    ) -> crate::Result<Self> {
        require(self.multiply_and_add_with_flags(multiplicand, augend, ctx, &mut Flags::empty()))
    }

    pub fn multiply_and_add_with_flags(
        &self,
        multiplicand: &Self,
        augend: &Self,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<Self>> {
        gate_flags(ctx, flags, |sink| {
            MATH.multiply_and_add(self, multiplicand, augend, ctx, sink)
        })
    }

    pub fn divide_to_exponent(
        &self,
        divisor: &Self,
        exponent: &BigInteger,
        ctx: &PrecisionContext,
    ) -> crate::Result<Self> {
        require(self.divide_to_exponent_with_flags(divisor, exponent, ctx, &mut Flags::empty()))
    }

    pub fn divide_to_exponent_with_flags(
        &self,
        divisor: &Self,
        exponent: &BigInteger,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<Self>> {
        gate_flags(ctx, flags, |sink| {
            MATH.divide_to_exponent(self, divisor, exponent, ctx, sink)
        })
    }

    pub fn round_to_exponent_exact(
        &self,
        exponent: &BigInteger,
        ctx: &PrecisionContext,
    ) -> crate::Result<Self> {
        require(self.round_to_exponent_exact_with_flags(exponent, ctx, &mut Flags::empty()))
    }

    pub fn round_to_exponent_exact_with_flags(
        &self,
        exponent: &BigInteger,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<Self>> {
        gate_flags(ctx, flags, |sink| {
            MATH.round_to_exponent_exact(self, exponent, ctx, sink)
        })
    }

    pub fn next_plus(&self, ctx: &PrecisionContext) -> crate::Result<Self> {
        require(MATH.next_plus(self, ctx))
    }

    pub fn next_minus(&self, ctx: &PrecisionContext) -> crate::Result<Self> {
        require(MATH.next_minus(self, ctx))
    }

    pub fn next_toward(&self, target: &Self, ctx: &PrecisionContext) -> crate::Result<Self> {
        require(self.next_toward_with_flags(target, ctx, &mut Flags::empty()))
    }

    pub fn next_toward_with_flags(
        &self,
        target: &Self,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<Self>> {
        gate_flags(ctx, flags, |sink| MATH.next_toward(self, target, ctx, sink))
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl BigFloat {
    /// Integer part, truncated toward zero.
    ///
    /// # Errors
    /// Returns `DecimalError::Overflow` if a positive exponent does not fit an `i32`.
    pub fn to_big_integer(&self) -> crate::Result<BigInteger> {
        if self.exponent.signum() >= 0 {
            let shift = self.exponent.to_i32().ok_or(DecimalError::Overflow)?;
            return Ok(self.mantissa.shift_left(shift));
        }
        let Some(shift) = self.exponent.negate().to_i32() else {
            return Ok(BigInteger::zero());
        };
        let magnitude = self.mantissa.abs().shift_right(shift);
        Ok(if self.mantissa.is_negative() {
            magnitude.negate()
        } else {
            magnitude
        })
    }

    /// Nearest `f64`, rounded half-even; overflow gives an infinity.
    pub fn to_f64(&self) -> f64 {
        match self.to_float_parts(&PrecisionContext::binary64()) {
            Some(parts) => float_bits::compose_f64(parts),
            None if self.signum() < 0 => f64::NEG_INFINITY,
            None => f64::INFINITY,
        }
    }

    /// Nearest `f32`, rounded half-even; overflow gives an infinity.
    pub fn to_f32(&self) -> f32 {
        match self.to_float_parts(&PrecisionContext::binary32()) {
            Some(parts) => float_bits::compose_f32(parts),
            None if self.signum() < 0 => f32::NEG_INFINITY,
            None => f32::INFINITY,
        }
    }

    /// Rounds into an interchange context; `None` on overflow.
    fn to_float_parts(&self, ctx: &PrecisionContext) -> Option<FloatParts> {
        let mut flags = Flags::empty();
        let rounded = MATH.round_to_precision(self, ctx, &mut flags).ok()??;
        let magnitude = rounded.mantissa.abs().to_i64()?;
        Some(FloatParts {
            negative: rounded.mantissa.is_negative(),
            mantissa: magnitude as u64,
            exponent: rounded.exponent.to_i32()?,
        })
    }
}

impl fmt::Display for BigFloat {
    /// Exact decimal value. Exponents too large to expand are written as
    /// `mantissa` and `p` followed by the binary exponent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DecimalFraction::from_big_float(self) {
            Ok(d) => fmt::Display::fmt(&d, f),
            Err(_) => write!(f, "{}p{}", self.mantissa, self.exponent),
        }
    }
}

impl fmt::Debug for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("BigFloat")
                .field("mantissa", &format_args!("{}", self.mantissa))
                .field("exponent", &format_args!("{}", self.exponent))
                .finish()
        } else {
            write!(f, "BigFloat({}p{})", self.mantissa, self.exponent)
        }
    }
}

impl Default for BigFloat {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<f64> for BigFloat {
    type Error = DecimalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for BigFloat {
    type Error = DecimalError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::from_f32(value)
    }
}

// ============================================================================
// Serde Support
// ============================================================================

// Always the (mantissa, exponent) pair: the decimal display form of a binary
// value does not parse back to the same pair.
#[cfg(feature = "serde")]
impl Serialize for BigFloat {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (&self.mantissa, &self.exponent).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BigFloat {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (mantissa, exponent) = <(BigInteger, BigInteger)>::deserialize(deserializer)?;
        Ok(Self::new(mantissa, exponent))
    }
}
