use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::ops::Neg;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::radix_math::{facade_ops, gate_flags, require};
use crate::{
    BigFloat, BigInteger, DecimalError, DigitShiftAccumulator, FastInteger, Flags,
    PrecisionContext, RadixHelper, RadixMath, ShiftAccumulator,
};

/// Arbitrary-precision decimal number: `mantissa × 10^exponent`.
///
/// Equality and hashing are structural, so `1.0` and `1` are different values
/// that [`compare_to`](Self::compare_to) reports as numerically equal.
///
/// # Examples
///
/// ```
/// use radixnum::{DecimalFraction, PrecisionContext, Rounding};
///
/// let price: DecimalFraction = "19.99".parse().unwrap();
/// let qty = DecimalFraction::from_i64(3);
/// let ctx = PrecisionContext::for_precision_and_rounding(4, Rounding::HalfEven);
/// assert_eq!(price.multiply(&qty, &ctx).unwrap().to_string(), "59.97");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DecimalFraction {
    mantissa: BigInteger,
    exponent: BigInteger,
}

/// Radix-10 primitives for [`RadixMath`].
#[derive(Copy, Clone, Debug, Default)]
pub struct DecimalHelper;

static MATH: RadixMath<DecimalHelper> = RadixMath::new(DecimalHelper);

/// Most zeros `to_plain_string` pads with before switching to exponent form.
const PLAIN_PADDING_LIMIT: usize = 1 << 20;

const POW10: [u64; 20] = {
    let mut table = [1u64; 20];
    let mut i = 1;
    while i < table.len() {
        table[i] = table[i - 1] * 10;
        i += 1;
    }
    table
};

const POW5: [u64; 28] = {
    let mut table = [1u64; 28];
    let mut i = 1;
    while i < table.len() {
        table[i] = table[i - 1] * 5;
        i += 1;
    }
    table
};

/// `5^n`, from the table when small and by squaring `5^27` otherwise.
pub(crate) fn pow5(n: u32) -> BigInteger {
    let top = (POW5.len() - 1) as u32;
    if n <= top {
        return BigInteger::from_u64(POW5[n as usize]);
    }
    let mut result = BigInteger::from_u64(POW5[(n % top) as usize]);
    let mut base = BigInteger::from_u64(POW5[top as usize]);
    let mut chunks = n / top;
    while chunks > 0 {
        if chunks & 1 == 1 {
            result = result.multiply(&base);
        }
        chunks >>= 1;
        if chunks > 0 {
            base = base.multiply(&base);
        }
    }
    result
}

impl RadixHelper for DecimalHelper {
    type Value = DecimalFraction;
    type Accumulator = DigitShiftAccumulator;

    #[inline]
    fn radix(&self) -> u32 {
        10
    }

    #[inline]
    fn mantissa<'a>(&self, value: &'a DecimalFraction) -> &'a BigInteger {
        &value.mantissa
    }

    #[inline]
    fn exponent<'a>(&self, value: &'a DecimalFraction) -> &'a BigInteger {
        &value.exponent
    }

    fn create_new(&self, mantissa: BigInteger, exponent: BigInteger) -> DecimalFraction {
        DecimalFraction::new(mantissa, exponent)
    }

    fn create_shift_accumulator_with_digits(
        &self,
        magnitude: &BigInteger,
        last: u32,
        older: bool,
    ) -> crate::Result<DigitShiftAccumulator> {
        DigitShiftAccumulator::with_digits(magnitude, last, older)
    }

    fn digit_length(&self, magnitude: &BigInteger) -> FastInteger {
        FastInteger::from_usize(magnitude.digit_count())
    }

    fn multiply_by_radix_power(&self, magnitude: &BigInteger, power: u32) -> BigInteger {
        if power == 0 || magnitude.is_zero() {
            return magnitude.clone();
        }
        if (power as usize) < POW10.len() {
            return magnitude.multiply(&BigInteger::from_u64(POW10[power as usize]));
        }
        // 10^n = 5^n * 2^n
        magnitude.multiply(&pow5(power)).shift_left(power as i32)
    }

    fn has_terminating_radix_expansion(
        &self,
        numerator: &BigInteger,
        denominator: &BigInteger,
    ) -> bool {
        if numerator.is_zero() {
            return true;
        }
        let Ok(mut reduced) = denominator.abs().divide(&numerator.gcd(denominator)) else {
            return false;
        };
        if let Some(twos) = reduced.lowest_set_bit() {
            reduced = reduced.shift_right(twos as i32);
        }
        let five = BigInteger::from_i32(5);
        while let Ok((q, r)) = reduced.div_rem(&five) {
            if !r.is_zero() {
                break;
            }
            reduced = q;
        }
        reduced == BigInteger::one()
    }
}

// ============================================================================
// Construction
// ============================================================================

impl DecimalFraction {
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

    /// Parses `[+-]?digits[.digits][(e|E)[+-]?digits]`.
    ///
    /// The exponent is the written exponent minus the number of fraction
    /// digits, so `"1.50"` keeps its trailing zero as mantissa 150, exponent -2.
    ///
    /// # Errors
    /// Returns `DecimalError::InvalidFormat` for anything outside the grammar,
    /// including whitespace and empty digit runs.
    pub fn from_string(s: &str) -> crate::Result<Self> {
        let bytes = s.as_bytes();
        let digit_run = |mut pos: usize| {
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            pos
        };

        let mut pos = 0;
        let negative = match bytes.first() {
            Some(b'-') => {
                pos = 1;
                true
            }
            Some(b'+') => {
                pos = 1;
                false
            }
            _ => false,
        };

        let mut digits = String::with_capacity(bytes.len() + 1);
        if negative {
            digits.push('-');
        }
        let int_end = digit_run(pos);
        if int_end == pos {
            return Err(DecimalError::InvalidFormat);
        }
        digits.push_str(&s[pos..int_end]);
        pos = int_end;

        let mut fraction_len = 0u64;
        if bytes.get(pos) == Some(&b'.') {
            let frac_end = digit_run(pos + 1);
            if frac_end == pos + 1 {
                return Err(DecimalError::InvalidFormat);
            }
            digits.push_str(&s[pos + 1..frac_end]);
            fraction_len = (frac_end - pos - 1) as u64;
            pos = frac_end;
        }

        let mut exponent = BigInteger::zero();
        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            pos += 1;
            let exp_negative = match bytes.get(pos) {
                Some(b'-') => {
                    pos += 1;
                    true
                }
                Some(b'+') => {
                    pos += 1;
                    false
                }
                _ => false,
            };
            let exp_end = digit_run(pos);
            if exp_end == pos {
                return Err(DecimalError::InvalidFormat);
            }
            exponent = BigInteger::from_string(&s[pos..exp_end])?;
            if exp_negative {
                exponent = exponent.negate();
            }
            pos = exp_end;
        }

        if pos != bytes.len() {
            return Err(DecimalError::InvalidFormat);
        }
        let mantissa = BigInteger::from_string(&digits)?;
        Ok(Self::new(
            mantissa,
            exponent.subtract(&BigInteger::from(fraction_len)),
        ))
    }

    /// Exact value of a finite `f64`.
    ///
    /// # Errors
    /// Returns `DecimalError::NotFinite` for NaN and infinities.
    pub fn from_f64(value: f64) -> crate::Result<Self> {
        Self::from_big_float(&BigFloat::from_f64(value)?)
    }

    /// Exact value of a finite `f32`.
    ///
    /// # Errors
    /// Returns `DecimalError::NotFinite` for NaN and infinities.
    pub fn from_f32(value: f32) -> crate::Result<Self> {
        Self::from_big_float(&BigFloat::from_f32(value)?)
    }

    /// Exact decimal value of a binary float. `m × 2^-k` is written as
    /// `m × 5^k × 10^-k`.
    ///
    /// # Errors
    /// Returns `DecimalError::Overflow` if the binary exponent does not fit an `i32`.
    pub fn from_big_float(value: &BigFloat) -> crate::Result<Self> {
        let exponent = value.exponent().to_i32().ok_or(DecimalError::Overflow)?;
        if exponent >= 0 {
            return Ok(Self::new(
                value.mantissa().shift_left(exponent),
                BigInteger::zero(),
            ));
        }
        let k = exponent.unsigned_abs();
        Ok(Self::new(
            value.mantissa().multiply(&pow5(k)),
            BigInteger::from_i32(exponent),
        ))
    }
}

// ============================================================================
// Accessors and Predicates
// ============================================================================

impl DecimalFraction {
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

    /// Numeric comparison: `1.0` and `1` are equal here but not under `==`.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        MATH.compare_to(self, other)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl DecimalFraction {
    facade_ops! {
        MATH;
        unary {
            /// Rounds to the context's precision and exponent range.
            round_to_precision, round_to_precision_with_flags;
            /// Rounds so the mantissa fits in the context's precision counted in bits.
            round_to_binary_precision, round_to_binary_precision_with_flags;
            /// Rounds into the context; the unary plus of decimal arithmetic.
            plus, plus_with_flags;
            /// Absolute value, rounded.
            abs, abs_with_flags;
            /// Negation, rounded.
            negate, negate_with_flags;
            /// Rounds, then removes trailing zeros from the mantissa.
            reduce, reduce_with_flags;
            /// Rounds to an integer, keeping larger exponents as they are.
            round_to_integral_exact, round_to_integral_exact_with_flags;
        }
        binary {
            add, add_with_flags;
            subtract, subtract_with_flags;
            multiply, multiply_with_flags;
            /// Quotient to the context's precision. Under unlimited precision a
            /// nonterminating quotient is an error.
            divide, divide_with_flags;
            /// Truncated integer quotient with its exponent as close to
            /// `self.exponent - other.exponent` as the digits allow.
            divide_to_integer_natural_scale, divide_to_integer_natural_scale_with_flags;
            /// Truncated integer quotient at exponent 0.
            divide_to_integer_zero_scale, divide_to_integer_zero_scale_with_flags;
            /// `self - trunc(self / other) * other`.
            remainder, remainder_with_flags;
            /// `self - round_half_even(self / other) * other`.
            remainder_near, remainder_near_with_flags;
            /// Re-expresses `self` with the exponent of `other`.
            quantize, quantize_with_flags;
            /// Numerically smaller operand, rounded.
            min, min_with_flags;
            /// Numerically larger operand, rounded.
            max, max_with_flags;
        }
    }

    /// `self * multiplicand + augend` with a single rounding.
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

    /// Quotient rounded to exactly `exponent`.
    ///
    /// # Errors
    /// `ExponentUnreachable` if the quotient needs more digits than the
    /// precision allows, `ExponentOutOfRange` if the context rejects `exponent`.
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

    /// Rounds to `exponent` using the context's rounding, ignoring its precision.
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

    /// Smallest value in the context greater than `self`.
    pub fn next_plus(&self, ctx: &PrecisionContext) -> crate::Result<Self> {
        require(MATH.next_plus(self, ctx))
    }

    /// Largest value in the context less than `self`.
    pub fn next_minus(&self, ctx: &PrecisionContext) -> crate::Result<Self> {
        require(MATH.next_minus(self, ctx))
    }

    /// The neighbour of `self` toward `target`, or `self` if they are equal.
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

impl DecimalFraction {
    /// Integer part, truncated toward zero.
    ///
    /// # Errors
    /// Returns `DecimalError::Overflow` if a positive exponent is too large to expand.
    pub fn to_big_integer(&self) -> crate::Result<BigInteger> {
        if self.exponent.signum() >= 0 {
            return DecimalHelper.rescale_by_exponent_diff(
                &self.mantissa,
                &FastInteger::from_big(&self.exponent),
                &FastInteger::from_i32(0),
            );
        }
        let mut shift = FastInteger::from_big(&self.exponent);
        shift.negate();
        let mut acc = DigitShiftAccumulator::new(&self.mantissa.abs())?;
        acc.shift_right(&shift);
        let magnitude = acc.shifted_int();
        Ok(if self.mantissa.is_negative() {
            magnitude.negate()
        } else {
            magnitude
        })
    }

    /// Nearest `f64`, rounded half-even; out-of-range values become infinite
    /// or zero.
    pub fn to_f64(&self) -> f64 {
        let v = match self.to_binary(&PrecisionContext::binary64(), 330) {
            Ok(b) => return b.to_f64(),
            Err(true) => f64::INFINITY,
            Err(false) => 0.0,
        };
        if self.signum() < 0 { -v } else { v }
    }

    /// Nearest `f32`, rounded half-even; out-of-range values become infinite
    /// or zero.
    pub fn to_f32(&self) -> f32 {
        let v = match self.to_binary(&PrecisionContext::binary32(), 50) {
            Ok(b) => return b.to_f32(),
            Err(true) => f32::INFINITY,
            Err(false) => 0.0,
        };
        if self.signum() < 0 { -v } else { v }
    }

    /// Rounds into a binary context, or reports whether the value is beyond
    /// `decimal_limit` decimal orders of magnitude (`true` for overflow).
    fn to_binary(&self, ctx: &PrecisionContext, decimal_limit: i32) -> Result<BigFloat, bool> {
        if self.is_zero() {
            return Ok(BigFloat::zero());
        }
        let adjusted = self
            .exponent
            .add(&BigInteger::from(self.mantissa.digit_count() as u64 - 1));
        if adjusted > BigInteger::from_i32(decimal_limit) {
            return Err(true);
        }
        if adjusted < BigInteger::from_i32(-decimal_limit) {
            return Err(false);
        }
        let mut flags = Flags::empty();
        match BigFloat::from_decimal_fraction_with_flags(self, &ctx.with_blank_flags(), &mut flags)
        {
            Ok(Some(b)) => Ok(b),
            _ => Err(true),
        }
    }
}

// ============================================================================
// String Formatting
// ============================================================================

impl DecimalFraction {
    /// Like `to_string`, but exponents in scientific form are multiples of three.
    pub fn to_engineering_string(&self) -> String {
        self.layout(true)
    }

    /// Never uses exponential notation, unless writing the value out would
    /// take more than `PLAIN_PADDING_LIMIT` padding zeros; such values use the
    /// scientific form of `to_string`.
    pub fn to_plain_string(&self) -> String {
        let padding = self
            .exponent
            .abs()
            .to_i64()
            .and_then(|e| usize::try_from(e).ok())
            .filter(|&e| e <= PLAIN_PADDING_LIMIT);
        let Some(padding) = padding else {
            return self.layout(false);
        };
        let digits = self.mantissa.abs().to_string();
        let mut out = String::with_capacity(digits.len() + 2);
        if self.mantissa.is_negative() {
            out.push('-');
        }
        match self.exponent.signum() {
            0 => out.push_str(&digits),
            1 => {
                out.push_str(&digits);
                if !self.is_zero() {
                    out.extend(core::iter::repeat_n('0', padding));
                }
            }
            _ => push_with_point(&mut out, &digits, padding),
        }
        out
    }

    fn layout(&self, engineering: bool) -> String {
        let digits = self.mantissa.abs().to_string();
        let len = digits.len();
        let mut out = String::with_capacity(len + 8);
        if self.mantissa.is_negative() {
            out.push('-');
        }
        let mut adjusted = self.exponent.add(&BigInteger::from((len - 1) as u64));

        if self.exponent.signum() <= 0 && adjusted >= BigInteger::from_i32(-6) {
            // -exponent <= len + 5 here
            let scale = self.exponent.negate().to_i64().unwrap_or(0) as usize;
            push_with_point(&mut out, &digits, scale);
            return out;
        }

        if !engineering {
            out.push_str(&digits[..1]);
            if len > 1 {
                out.push('.');
                out.push_str(&digits[1..]);
            }
        } else {
            let three = BigInteger::from_i32(3);
            let offset = adjusted
                .modulo(&three)
                .ok()
                .and_then(|r| r.to_i32())
                .unwrap_or(0);
            adjusted = adjusted.subtract(&BigInteger::from_i32(offset));
            let lead = offset as usize + 1;
            if self.is_zero() {
                match lead {
                    1 => out.push('0'),
                    2 => {
                        out.push_str("0.00");
                        adjusted = adjusted.add(&three);
                    }
                    _ => {
                        out.push_str("0.0");
                        adjusted = adjusted.add(&three);
                    }
                }
            } else if lead >= len {
                out.push_str(&digits);
                out.extend(core::iter::repeat_n('0', lead - len));
            } else {
                out.push_str(&digits[..lead]);
                out.push('.');
                out.push_str(&digits[lead..]);
            }
        }

        if !adjusted.is_zero() {
            out.push('E');
            if !adjusted.is_negative() {
                out.push('+');
            }
            out.push_str(&adjusted.to_string());
        }
        out
    }
}

/// Writes `digits` with `scale` of them after the decimal point.
fn push_with_point(out: &mut String, digits: &str, scale: usize) {
    if scale == 0 {
        out.push_str(digits);
    } else if digits.len() > scale {
        let (int, frac) = digits.split_at(digits.len() - scale);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else {
        out.push_str("0.");
        out.extend(core::iter::repeat_n('0', scale - digits.len()));
        out.push_str(digits);
    }
}

impl fmt::Display for DecimalFraction {
    /// Scientific notation when the exponent is positive or the adjusted
    /// exponent is below -6, plain notation otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.layout(false))
    }
}

impl fmt::Debug for DecimalFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("DecimalFraction")
                .field("mantissa", &format_args!("{}", self.mantissa))
                .field("exponent", &format_args!("{}", self.exponent))
                .finish()
        } else {
            write!(f, "DecimalFraction({})", self)
        }
    }
}

impl FromStr for DecimalFraction {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

impl Default for DecimalFraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for DecimalFraction {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<i32> for DecimalFraction {
    fn from(value: i32) -> Self {
        Self::from_i64(value as i64)
    }
}

impl From<BigInteger> for DecimalFraction {
    fn from(value: BigInteger) -> Self {
        Self::new(value, BigInteger::zero())
    }
}

impl TryFrom<f64> for DecimalFraction {
    type Error = DecimalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for DecimalFraction {
    type Error = DecimalError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::from_f32(value)
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

// Exact arithmetic under an unlimited context. Only an exponent gap wider
// than `i32` can fail.
macro_rules! exact_binop {
    (impl $imp:ident, $method:ident, $op:ident) => {
        impl<'a> core::ops::$imp<&'a DecimalFraction> for &'a DecimalFraction {
            type Output = DecimalFraction;

            fn $method(self, rhs: &'a DecimalFraction) -> DecimalFraction {
                DecimalFraction::$op(self, rhs, &PrecisionContext::unlimited())
                    .expect("exponent difference too large for exact arithmetic")
            }
        }

        impl core::ops::$imp for DecimalFraction {
            type Output = DecimalFraction;

            fn $method(self, rhs: DecimalFraction) -> DecimalFraction {
                core::ops::$imp::$method(&self, &rhs)
            }
        }
    };
}

exact_binop!(impl Add, add, add);
exact_binop!(impl Sub, sub, subtract);
exact_binop!(impl Mul, mul, multiply);

impl Neg for &DecimalFraction {
    type Output = DecimalFraction;

    fn neg(self) -> DecimalFraction {
        DecimalFraction::new(self.mantissa.negate(), self.exponent.clone())
    }
}

impl Neg for DecimalFraction {
    type Output = DecimalFraction;

    fn neg(self) -> DecimalFraction {
        -&self
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for DecimalFraction {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            (&self.mantissa, &self.exponent).serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for DecimalFraction {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_string(&s).map_err(de::Error::custom)
        } else {
            let (mantissa, exponent) = <(BigInteger, BigInteger)>::deserialize(deserializer)?;
            Ok(Self::new(mantissa, exponent))
        }
    }
}




#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let d = DecimalFraction::from_str("123.450").unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#""123.450""#);
    }

    #[test]
    fn test_deserialize() {
        let d: DecimalFraction = serde_json::from_str(r#""1.5E+3""#).unwrap();
        assert_eq!(d, DecimalFraction::from_str("1.5E+3").unwrap());
    }

    #[test]
    fn test_deserialize_invalid() {
        assert!(serde_json::from_str::<DecimalFraction>(r#""1.""#).is_err());
    }

    #[test]
    fn test_bincode_round_trip() {
        let original = DecimalFraction::from_str("-98765.4321E-50").unwrap();
        let bytes = bincode::serialize(&original).unwrap();
        let back: DecimalFraction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(original, back);
    }
}
