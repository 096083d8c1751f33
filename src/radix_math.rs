use core::cmp::Ordering;

use crate::{
    BigInteger, DecimalError, FastInteger, Flags, PrecisionContext, Rounding, ShiftAccumulator,
};

/// Under unlimited precision, division checks for a nonterminating expansion
/// after every this many quotient digits.
const NONTERMINATING_CHECK_THRESHOLD: i32 = 5;

/// Representation-specific primitives for a `mantissa * radix^exponent` type.
pub trait RadixHelper {
    type Value: Clone;
    type Accumulator: ShiftAccumulator;

    fn radix(&self) -> u32;

    fn sign(&self, value: &Self::Value) -> i32 {
        self.mantissa(value).signum()
    }

    fn mantissa<'a>(&self, value: &'a Self::Value) -> &'a BigInteger;

    fn exponent<'a>(&self, value: &'a Self::Value) -> &'a BigInteger;

    fn create_new(&self, mantissa: BigInteger, exponent: BigInteger) -> Self::Value;

    fn create_shift_accumulator(&self, magnitude: &BigInteger) -> crate::Result<Self::Accumulator> {
        self.create_shift_accumulator_with_digits(magnitude, 0, false)
    }

    fn create_shift_accumulator_with_digits(
        &self,
        magnitude: &BigInteger,
        last: u32,
        older: bool,
    ) -> crate::Result<Self::Accumulator>;

    /// Radix digits in a magnitude; zero has one digit.
    fn digit_length(&self, magnitude: &BigInteger) -> FastInteger;

    /// `magnitude * radix^power`. `power` must not exceed `i32::MAX`.
    fn multiply_by_radix_power(&self, magnitude: &BigInteger, power: u32) -> BigInteger;

    /// Scales `mantissa` by `radix^|e1 - e2|`.
    ///
    /// # Errors
    /// Returns `DecimalError::Overflow` if the exponent gap does not fit an `i32`.
    fn rescale_by_exponent_diff(
        &self,
        mantissa: &BigInteger,
        e1: &FastInteger,
        e2: &FastInteger,
    ) -> crate::Result<BigInteger> {
        let mut diff = e1.clone();
        diff.subtract(e2);
        if diff.signum() < 0 {
            diff.negate();
        }
        if mantissa.is_zero() || diff.is_value_zero() {
            return Ok(mantissa.clone());
        }
        if !diff.can_fit_in_i32() {
            log::debug!("radix power {} is too large to materialize", diff);
            return Err(DecimalError::Overflow);
        }
        Ok(self.multiply_by_radix_power(mantissa, diff.as_i32() as u32))
    }

    /// Whether `numerator / denominator` has a finite expansion in this radix.
    fn has_terminating_radix_expansion(
        &self,
        numerator: &BigInteger,
        denominator: &BigInteger,
    ) -> bool;
}

/// The rounding and arithmetic engine shared by the radix-10 and radix-2 types.
///
/// Every operation takes the context to round into and a flag set to record
/// conditions in, and returns `Ok(None)` when an overflow leaves no finite
/// result under the context's rounding mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct RadixMath<H> {
    helper: H,
}

impl<H> RadixMath<H> {
    pub const fn new(helper: H) -> Self {
        Self { helper }
    }

    pub fn helper(&self) -> &H {
        &self.helper
    }
}

// ============================================================================
// Facade Plumbing
// ============================================================================

/// Runs an engine operation for a `*_with_flags` facade method. Conditions
/// reach `flags` only when the context has flags enabled; without them an
/// overflow with no finite result becomes an error.
pub(crate) fn gate_flags<T>(
    ctx: &PrecisionContext,
    flags: &mut Flags,
    op: impl FnOnce(&mut Flags) -> crate::Result<Option<T>>,
) -> crate::Result<Option<T>> {
    if ctx.has_flags() {
        return op(flags);
    }
    let mut scratch = Flags::empty();
    match op(&mut scratch)? {
        Some(value) => Ok(Some(value)),
        None => Err(DecimalError::Overflow),
    }
}

pub(crate) fn require<T>(result: crate::Result<Option<T>>) -> crate::Result<T> {
    result?.ok_or(DecimalError::Overflow)
}

/// Generates the `op` / `op_with_flags` method pairs a facade type exposes
/// for the engine's one- and two-operand operations.
macro_rules! facade_ops {
    (
        $math:expr;
        unary { $( $(#[$udoc:meta])* $uop:ident, $uflags:ident; )* }
        binary { $( $(#[$bdoc:meta])* $bop:ident, $bflags:ident; )* }
    ) => {
        $(
            $(#[$udoc])*
            pub fn $uop(&self, ctx: &$crate::PrecisionContext) -> $crate::Result<Self> {
                $crate::radix_math::require(self.$uflags(ctx, &mut $crate::Flags::empty()))
            }

            $(#[$udoc])*
            ///
            /// Records conditions in `flags` if the context has flags enabled.
            pub fn $uflags(
                &self,
                ctx: &$crate::PrecisionContext,
                flags: &mut $crate::Flags,
            ) -> $crate::Result<Option<Self>> {
                $crate::radix_math::gate_flags(ctx, flags, |sink| $math.$uop(self, ctx, sink))
            }
        )*
        $(
            $(#[$bdoc])*
            pub fn $bop(&self, other: &Self, ctx: &$crate::PrecisionContext) -> $crate::Result<Self> {
                $crate::radix_math::require(self.$bflags(other, ctx, &mut $crate::Flags::empty()))
            }

            $(#[$bdoc])*
            ///
            /// Records conditions in `flags` if the context has flags enabled.
            pub fn $bflags(
                &self,
                other: &Self,
                ctx: &$crate::PrecisionContext,
                flags: &mut $crate::Flags,
            ) -> $crate::Result<Option<Self>> {
                $crate::radix_math::gate_flags(ctx, flags, |sink| $math.$bop(self, other, ctx, sink))
            }
        )*
    };
}

pub(crate) use facade_ops;

/// Context limits resolved once per rounding.
struct Limits {
    precision: FastInteger,
    bounded: bool,
    in_bits: bool,
    ranged: bool,
    e_min: FastInteger,
    e_max: FastInteger,
    e_tiny: FastInteger,
    e_top: FastInteger,
}

impl Limits {
    fn new(ctx: &PrecisionContext, radix: u32) -> Self {
        let precision = FastInteger::from_big(ctx.precision());
        let in_bits = ctx.precision_in_bits() && radix != 2;
        // A bit precision does not translate to radix digits, so exponent
        // bounds then apply to the exponent itself.
        let range_digits = if in_bits {
            FastInteger::from_i32(1)
        } else {
            precision.clone()
        };
        let e_min = FastInteger::from_big(ctx.e_min());
        let e_max = FastInteger::from_big(ctx.e_max());
        let mut e_tiny = e_min.clone();
        e_tiny.subtract(&range_digits).increment();
        let mut e_top = e_max.clone();
        e_top.subtract(&range_digits).increment();
        Self {
            bounded: !precision.is_value_zero(),
            precision,
            in_bits,
            ranged: ctx.has_exponent_range(),
            e_min,
            e_max,
            e_tiny,
            e_top,
        }
    }
}

/// Decides whether a truncated value moves one unit away from zero.
fn round_up(
    rounding: Rounding,
    last: u32,
    older: bool,
    negative: bool,
    kept_last_digit: u32,
    radix: u32,
) -> crate::Result<bool> {
    if last == 0 && !older {
        return Ok(false);
    }
    let half = radix / 2;
    Ok(match rounding {
        Rounding::Up => true,
        Rounding::Down => false,
        Rounding::Ceiling => !negative,
        Rounding::Floor => negative,
        Rounding::HalfUp => last >= half,
        Rounding::HalfDown => last > half || (last == half && older),
        Rounding::HalfEven => {
            last > half || (last == half && (older || kept_last_digit % 2 == 1))
        }
        Rounding::ZeroFiveUp => kept_last_digit == 0 || kept_last_digit == half,
        Rounding::Unnecessary => return Err(DecimalError::PrecisionLoss),
    })
}

/// Shifts off decimal digits until the kept value fits in `precision` bits.
fn shift_to_bits<A: ShiftAccumulator>(acc: &mut A, precision: &FastInteger) {
    if !precision.can_fit_in_i32() {
        return;
    }
    let bits_allowed = precision.as_i32() as usize;
    loop {
        let bits = acc.shifted_int().bit_length();
        if bits <= bits_allowed {
            break;
        }
        // 10^k <= 2^(excess - 1) keeps each jump from overshooting.
        let excess = bits - bits_allowed;
        let digits = ((excess - 1) * 3 / 10).max(1);
        acc.shift_right_int(i32::try_from(digits).unwrap_or(i32::MAX));
    }
}

impl<H: RadixHelper> RadixMath<H> {
    fn parts(&self, value: &H::Value) -> (BigInteger, FastInteger) {
        (
            self.helper.mantissa(value).clone(),
            FastInteger::from_big(self.helper.exponent(value)),
        )
    }

    fn build(&self, mantissa: BigInteger, exponent: &FastInteger) -> H::Value {
        self.helper.create_new(mantissa, exponent.to_big_integer())
    }

    fn scale(&self, magnitude: &BigInteger, power: &FastInteger) -> crate::Result<BigInteger> {
        self.helper
            .rescale_by_exponent_diff(magnitude, power, &FastInteger::from_i32(0))
    }

    fn radix_big(&self) -> BigInteger {
        BigInteger::from(self.helper.radix())
    }

    fn last_digit(&self, value: &BigInteger) -> u32 {
        if self.helper.radix() == 2 {
            return !value.is_even() as u32;
        }
        value
            .remainder(&self.radix_big())
            .ok()
            .and_then(|r| r.to_i32())
            .map_or(0, |d| d as u32)
    }

    /// Exact `ma * radix^ea + mb * radix^eb` at the smaller exponent.
    fn exact_sum(
        &self,
        ma: &BigInteger,
        ea: &FastInteger,
        mb: &BigInteger,
        eb: &FastInteger,
    ) -> crate::Result<(BigInteger, FastInteger)> {
        Ok(match ea.compare_to(eb) {
            Ordering::Equal => (ma.add(mb), ea.clone()),
            Ordering::Greater => (
                self.helper.rescale_by_exponent_diff(ma, ea, eb)?.add(mb),
                eb.clone(),
            ),
            Ordering::Less => (
                ma.add(&self.helper.rescale_by_exponent_diff(mb, ea, eb)?),
                ea.clone(),
            ),
        })
    }

    fn finish(
        &self,
        mantissa: &BigInteger,
        exponent: FastInteger,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        self.round_magnitude(
            mantissa.is_negative(),
            &mantissa.abs(),
            exponent,
            0,
            false,
            ctx,
            flags,
        )
    }

    // ========================================================================
    // Rounding
    // ========================================================================

    /// Rounds `±magnitude * radix^exponent` into the context. `last` and
    /// `older` describe digits already discarded below `magnitude`.
    #[allow(clippy::too_many_arguments)]
    fn round_magnitude(
        &self,
        negative: bool,
        magnitude: &BigInteger,
        exponent: FastInteger,
        last: u32,
        older: bool,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let radix = self.helper.radix();
        let limits = Limits::new(ctx, radix);
        let mut acc = self
            .helper
            .create_shift_accumulator_with_digits(magnitude, last, older)?;

        let mut adjusted = exponent.clone();
        adjusted
            .add(&self.helper.digit_length(magnitude))
            .decrement();
        let mut exp = exponent;
        if limits.bounded {
            if limits.in_bits {
                shift_to_bits(&mut acc, &limits.precision);
            } else {
                acc.shift_to_digits(&limits.precision);
            }
            exp.add(acc.discarded_digit_count());
        }

        let mut subnormal = false;
        if limits.bounded && limits.ranged && !magnitude.is_zero() {
            subnormal = if limits.in_bits {
                exp < limits.e_min
            } else {
                adjusted < limits.e_min
            };
            if subnormal && exp < limits.e_tiny {
                let mut extra = limits.e_tiny.clone();
                extra.subtract(&exp);
                acc.shift_right(&extra);
                exp = limits.e_tiny.clone();
            }
        }

        let last = acc.last_discarded_digit();
        let older = acc.older_discarded_digits();
        let inexact = last != 0 || older;
        let mut kept = acc.shifted_int();
        if inexact && round_up(ctx.rounding(), last, older, negative, self.last_digit(&kept), radix)?
        {
            kept = kept.add(&BigInteger::one());
            if limits.bounded && limits.in_bits {
                if FastInteger::from_usize(kept.bit_length()) > limits.precision {
                    // The carry crossed a power of two; round the carried value again.
                    *flags |= Flags::INEXACT | Flags::ROUNDED;
                    return self.round_magnitude(negative, &kept, exp, 0, false, ctx, flags);
                }
            } else if limits.bounded && self.helper.digit_length(&kept) > limits.precision {
                kept = kept.divide(&self.radix_big())?;
                exp.increment();
            }
        }

        if inexact {
            *flags |= Flags::INEXACT | Flags::ROUNDED;
        } else if acc.discarded_digit_count().signum() > 0 {
            *flags |= Flags::ROUNDED;
        }
        if subnormal {
            *flags |= Flags::SUBNORMAL;
            if inexact {
                *flags |= Flags::UNDERFLOW;
            }
        }

        if limits.ranged && !kept.is_zero() {
            let mut top = exp.clone();
            if !limits.in_bits {
                top.add(&self.helper.digit_length(&kept)).decrement();
            }
            if top > limits.e_max {
                return self.overflow(negative, &limits, ctx.rounding(), flags);
            }
            if limits.bounded && ctx.clamp_normal_exponents() && exp > limits.e_top {
                let mut fold = exp.clone();
                fold.subtract(&limits.e_top);
                log::trace!("clamping exponent {} down by {}", exp, fold);
                kept = self.scale(&kept, &fold)?;
                exp = limits.e_top.clone();
                *flags |= Flags::CLAMPED;
            }
        }

        if limits.ranged && kept.is_zero() {
            let high = if limits.bounded && ctx.clamp_normal_exponents() {
                &limits.e_top
            } else {
                &limits.e_max
            };
            if exp > *high {
                exp = high.clone();
                *flags |= Flags::CLAMPED;
            } else if limits.bounded && exp < limits.e_tiny {
                exp = limits.e_tiny.clone();
                *flags |= Flags::CLAMPED;
            }
        }

        let mantissa = if negative { kept.negate() } else { kept };
        Ok(Some(self.build(mantissa, &exp)))
    }

    /// Result of a rounding whose exponent exceeds the range: the largest
    /// finite magnitude for roundings toward zero, otherwise no value.
    fn overflow(
        &self,
        negative: bool,
        limits: &Limits,
        rounding: Rounding,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        *flags |= Flags::OVERFLOW | Flags::INEXACT | Flags::ROUNDED;
        let toward_zero = match rounding {
            Rounding::Down | Rounding::ZeroFiveUp => true,
            Rounding::Floor => !negative,
            Rounding::Ceiling => negative,
            Rounding::Unnecessary => return Err(DecimalError::PrecisionLoss),
            Rounding::Up | Rounding::HalfUp | Rounding::HalfDown | Rounding::HalfEven => false,
        };
        if !toward_zero || !limits.bounded || !limits.precision.can_fit_in_i32() {
            log::debug!("overflow under {:?} rounding has no finite result", rounding);
            return Ok(None);
        }
        let digits = limits.precision.as_i32();
        let one = BigInteger::one();
        let largest = if limits.in_bits {
            one.shift_left(digits).subtract(&one)
        } else {
            self.helper
                .multiply_by_radix_power(&one, digits as u32)
                .subtract(&one)
        };
        let mantissa = if negative { largest.negate() } else { largest };
        Ok(Some(self.build(mantissa, &limits.e_top)))
    }

    pub fn round_to_precision(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (m, e) = self.parts(value);
        self.finish(&m, e, ctx, flags)
    }

    /// Rounds with the context's precision counted in bits.
    pub fn round_to_binary_precision(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        self.round_to_precision(value, &ctx.with_precision_in_bits(true), flags)
    }

    pub fn plus(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        self.round_to_precision(value, ctx, flags)
    }

    pub fn abs(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (m, e) = self.parts(value);
        self.finish(&m.abs(), e, ctx, flags)
    }

    pub fn negate(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (m, e) = self.parts(value);
        self.finish(&m.negate(), e, ctx, flags)
    }

    /// Rounds to exactly `exponent`, or the value's own exponent if that is
    /// already larger. Precision is ignored; inexact results are flagged.
    pub fn round_to_exponent_exact(
        &self,
        value: &H::Value,
        exponent: &BigInteger,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let target = FastInteger::from_big(exponent);
        let (m, e) = self.parts(value);
        if e >= target {
            return Ok(Some(value.clone()));
        }
        let mut shift = target.clone();
        shift.subtract(&e);
        let mut acc = self.helper.create_shift_accumulator(&m.abs())?;
        acc.shift_right(&shift);
        if !m.is_zero() {
            *flags |= Flags::ROUNDED;
        }
        self.round_magnitude(
            m.is_negative(),
            &acc.shifted_int(),
            target,
            acc.last_discarded_digit(),
            acc.older_discarded_digits(),
            &ctx.with_precision(0),
            flags,
        )
    }

    pub fn round_to_integral_exact(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        self.round_to_exponent_exact(value, &BigInteger::zero(), ctx, flags)
    }

    // ========================================================================
    // Addition and Multiplication
    // ========================================================================

    pub fn add(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        self.add_parts(ma, ea, mb, eb, ctx, flags)
    }

    pub fn subtract(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        self.add_parts(ma, ea, mb.negate(), eb, ctx, flags)
    }

    fn add_parts(
        &self,
        ma: BigInteger,
        ea: FastInteger,
        mb: BigInteger,
        eb: FastInteger,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        if ea == eb {
            return self.finish(&ma.add(&mb), ea, ctx, flags);
        }
        let (mh, eh, mut ml, mut el) = if ea > eb {
            (ma, ea, mb, eb)
        } else {
            (mb, eb, ma, ea)
        };
        let precision = FastInteger::from_big(ctx.precision());
        if !precision.is_value_zero() && !mh.is_zero() {
            let len_h = self.helper.digit_length(&mh.abs());
            let mut gap = eh.clone();
            gap.subtract(&el);
            if ml.is_zero() {
                // Only the high operand's own digits can survive rounding.
                let mut room = precision.clone();
                room.subtract(&len_h);
                if room.signum() < 0 {
                    room = FastInteger::from_i32(0);
                }
                let shift = FastInteger::min(&gap, &room);
                if shift < gap {
                    *flags |= Flags::ROUNDED;
                }
                let scaled = self.scale(&mh, &shift)?;
                let mut e = eh;
                e.subtract(&shift);
                return self.finish(&scaled, e, ctx, flags);
            }
            // Below min(eh, eh + len_h - precision) - 3 the low operand only
            // contributes a sticky nonzero digit.
            let mut rounding_edge = eh.clone();
            rounding_edge.add(&len_h).subtract(&precision);
            let mut sticky = FastInteger::min(&eh, &rounding_edge);
            sticky.subtract_int(3);
            let mut low_top = el.clone();
            low_top
                .add(&self.helper.digit_length(&ml.abs()))
                .decrement();
            if low_top < sticky {
                log::trace!(
                    "far-apart add: low operand at exponent {} replaced by a unit at {}",
                    el,
                    sticky
                );
                ml = BigInteger::from_i32(ml.signum());
                el = sticky;
            }
        }
        let (sum, e) = self.exact_sum(&mh, &eh, &ml, &el)?;
        self.finish(&sum, e, ctx, flags)
    }

    pub fn multiply(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, mut ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        ea.add(&eb);
        self.finish(&ma.multiply(&mb), ea, ctx, flags)
    }

    /// `a * b + c` with a single rounding.
    pub fn multiply_and_add(
        &self,
        a: &H::Value,
        b: &H::Value,
        c: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, mut ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        let (mc, ec) = self.parts(c);
        ea.add(&eb);
        self.add_parts(ma.multiply(&mb), ea, mc, ec, ctx, flags)
    }

    // ========================================================================
    // Division
    // ========================================================================

    /// Divides to the context's precision. Exact quotients keep the exponent
    /// closest to `ea - eb`.
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor, and `NonTerminatingExpansion`
    /// under unlimited precision when the quotient never terminates.
    pub fn divide(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, mut ideal) = self.parts(a);
        let (mb, eb) = self.parts(b);
        if mb.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        ideal.subtract(&eb);
        if ma.is_zero() {
            return self.finish(&ma, ideal, ctx, flags);
        }
        let negative = ma.is_negative() != mb.is_negative();
        let (na, nb) = (ma.abs(), mb.abs());
        let radix = self.radix_big();
        let limits = Limits::new(ctx, self.helper.radix());

        // Line the operands up so that divisor <= dividend < divisor * radix.
        let mut adjust = self.helper.digit_length(&nb);
        adjust.subtract(&self.helper.digit_length(&na));
        let (mut dividend, divisor) = if adjust.signum() > 0 {
            (self.scale(&na, &adjust)?, nb.clone())
        } else {
            let mut lift = adjust.clone();
            lift.negate();
            (na.clone(), self.scale(&nb, &lift)?)
        };
        if dividend < divisor {
            dividend = dividend.multiply(&radix);
            adjust.increment();
        }

        let mut quotient = BigInteger::zero();
        let mut digits = FastInteger::from_i32(0);
        loop {
            let mut digit = 0u32;
            while dividend >= divisor {
                dividend = dividend.subtract(&divisor);
                digit += 1;
            }
            quotient = quotient.multiply(&radix).add(&BigInteger::from(digit));
            digits.increment();
            if dividend.is_zero() && adjust.signum() >= 0 {
                break;
            }
            if limits.bounded {
                let full = if limits.in_bits {
                    FastInteger::from_usize(quotient.bit_length()) > limits.precision
                } else {
                    digits >= limits.precision
                };
                if full {
                    break;
                }
            } else if digits
                .clone()
                .mod_int(NONTERMINATING_CHECK_THRESHOLD)
                .is_value_zero()
                && !self.helper.has_terminating_radix_expansion(&na, &nb)
            {
                log::debug!("{} / {} does not terminate in radix {}", na, nb, radix);
                return Err(DecimalError::NonTerminatingExpansion);
            }
            dividend = dividend.multiply(&radix);
            adjust.increment();
        }

        let (last, older) = if dividend.is_zero() {
            (0, false)
        } else {
            let (d, r) = dividend.multiply(&radix).div_rem(&divisor)?;
            (d.to_i32().map_or(0, |d| d as u32), !r.is_zero())
        };
        let mut exp = ideal;
        exp.subtract(&adjust);
        self.round_magnitude(negative, &quotient, exp, last, older, ctx, flags)
    }

    /// Truncated quotient magnitude of `a / b` at exponent `target`, with the
    /// remainder summarized as a synthetic (last, older) digit pair.
    #[allow(clippy::too_many_arguments)]
    fn quotient_at_exponent(
        &self,
        ma: &BigInteger,
        ea: &FastInteger,
        mb: &BigInteger,
        eb: &FastInteger,
        target: &FastInteger,
        precision: &FastInteger,
    ) -> crate::Result<(bool, BigInteger, u32, bool)> {
        if mb.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        let negative = ma.is_negative() != mb.is_negative();
        let (na, nb) = (ma.abs(), mb.abs());
        let len_a = self.helper.digit_length(&na);
        let mut shift = ea.clone();
        shift.subtract(eb).subtract(target);

        let (numerator, denominator) = if shift.signum() >= 0 {
            if !precision.is_value_zero() && !na.is_zero() {
                let mut min_digits = len_a;
                min_digits
                    .subtract(&self.helper.digit_length(&nb))
                    .add(&shift);
                if min_digits > *precision {
                    return Err(DecimalError::ExponentUnreachable);
                }
            }
            (self.scale(&na, &shift)?, nb)
        } else {
            let mut lift = shift;
            lift.negate();
            if lift > len_a {
                // numerator < radix^len_a <= denominator / radix
                return Ok((negative, BigInteger::zero(), 0, !na.is_zero()));
            }
            let denominator = self.scale(&nb, &lift)?;
            (na, denominator)
        };

        let (q, rem) = numerator.div_rem(&denominator)?;
        let half = self.helper.radix() / 2;
        let (last, older) = if rem.is_zero() {
            (0, false)
        } else {
            match rem.shift_left(1).cmp(&denominator) {
                Ordering::Less => (0, true),
                Ordering::Equal => (half, false),
                Ordering::Greater => (half, true),
            }
        };
        Ok((negative, q, last, older))
    }

    /// Rounds a quotient or quantized magnitude that must land on `target`.
    #[allow(clippy::too_many_arguments)]
    fn round_to_fixed_exponent(
        &self,
        negative: bool,
        magnitude: &BigInteger,
        target: FastInteger,
        last: u32,
        older: bool,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let fixed = ctx.with_exponent_clamp(false);
        let result =
            self.round_magnitude(negative, magnitude, target.clone(), last, older, &fixed, flags)?;
        match result {
            Some(v) if FastInteger::from_big(self.helper.exponent(&v)) != target => {
                Err(DecimalError::ExponentUnreachable)
            }
            other => Ok(other),
        }
    }

    /// Divides and rounds to exactly `exponent`.
    ///
    /// # Errors
    /// `ExponentOutOfRange` if the context rejects `exponent`, and
    /// `ExponentUnreachable` if the quotient needs more digits than the
    /// precision allows.
    pub fn divide_to_exponent(
        &self,
        a: &H::Value,
        b: &H::Value,
        exponent: &BigInteger,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        if !ctx.exponent_within_range(exponent) {
            return Err(DecimalError::ExponentOutOfRange);
        }
        let target = FastInteger::from_big(exponent);
        let (ma, ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        let precision = FastInteger::from_big(ctx.precision());
        let (negative, q, last, older) =
            self.quotient_at_exponent(&ma, &ea, &mb, &eb, &target, &precision)?;
        self.round_to_fixed_exponent(negative, &q, target, last, older, ctx, flags)
    }

    /// Integer part of `a / b`, rounded with `rounding`, as a signed mantissa
    /// at exponent 0.
    fn integer_quotient(
        &self,
        (ma, ea): (&BigInteger, &FastInteger),
        (mb, eb): (&BigInteger, &FastInteger),
        rounding: Rounding,
        precision: &FastInteger,
    ) -> crate::Result<(bool, BigInteger)> {
        let zero = FastInteger::from_i32(0);
        let (negative, mut q, last, older) = self
            .quotient_at_exponent(ma, ea, mb, eb, &zero, precision)
            .map_err(|e| match e {
                DecimalError::ExponentUnreachable => DecimalError::DivisionImpossible,
                other => other,
            })?;
        let radix = self.helper.radix();
        if round_up(rounding, last, older, negative, self.last_digit(&q), radix)? {
            q = q.add(&BigInteger::one());
        }
        if !precision.is_value_zero() && self.helper.digit_length(&q) > *precision {
            return Err(DecimalError::DivisionImpossible);
        }
        Ok((negative, q))
    }

    /// Truncated integer quotient, with trailing zeros traded toward the
    /// exponent `ea - eb`.
    ///
    /// # Errors
    /// `DivisionImpossible` if the integer quotient needs more digits than the
    /// precision.
    pub fn divide_to_integer_natural_scale(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        let precision = FastInteger::from_big(ctx.precision());
        let (negative, mut q) =
            self.integer_quotient((&ma, &ea), (&mb, &eb), Rounding::Down, &precision)?;
        let mut ideal = ea;
        ideal.subtract(&eb);

        let mut exp = FastInteger::from_i32(0);
        if q.is_zero() {
            exp = ideal;
        } else if ideal.signum() > 0 {
            let radix = self.radix_big();
            while exp < ideal {
                let (d, r) = q.div_rem(&radix)?;
                if !r.is_zero() {
                    break;
                }
                q = d;
                exp.increment();
            }
        } else if ideal.signum() < 0 {
            let mut room = ideal.clone();
            room.negate();
            if !precision.is_value_zero() {
                let mut free = precision.clone();
                free.subtract(&self.helper.digit_length(&q));
                room = FastInteger::min(&room, &FastInteger::max(&free, &FastInteger::from_i32(0)));
            }
            q = self.scale(&q, &room)?;
            exp.subtract(&room);
        }
        let mantissa = if negative { q.negate() } else { q };
        self.finish(&mantissa, exp, ctx, flags)
    }

    /// Truncated integer quotient at exponent 0.
    pub fn divide_to_integer_zero_scale(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let down = ctx.with_rounding(Rounding::Down);
        self.divide_to_exponent(a, b, &BigInteger::zero(), &down, flags)
            .map_err(|e| match e {
                DecimalError::ExponentUnreachable => DecimalError::DivisionImpossible,
                other => other,
            })
    }

    /// `a - trunc(a / b) * b`.
    pub fn remainder(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        self.remainder_with(a, b, Rounding::Down, ctx, flags)
    }

    /// `a - round(a / b) * b` with the quotient rounded half-even.
    pub fn remainder_near(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        self.remainder_with(a, b, Rounding::HalfEven, ctx, flags)
    }

    fn remainder_with(
        &self,
        a: &H::Value,
        b: &H::Value,
        rounding: Rounding,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let (ma, ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        let precision = FastInteger::from_big(ctx.precision());
        let (negative, q) = self.integer_quotient((&ma, &ea), (&mb, &eb), rounding, &precision)?;
        let product = q.multiply(&mb);
        let product = if negative { product } else { product.negate() };
        let (r, e) = self.exact_sum(&ma, &ea, &product, &eb)?;
        self.finish(&r, e, ctx, flags)
    }

    // ========================================================================
    // Quantization
    // ========================================================================

    /// Re-expresses `value` at exactly the exponent of `other`.
    ///
    /// # Errors
    /// `ExponentOutOfRange` if the context rejects the target exponent, and
    /// `ExponentUnreachable` if the result cannot hold it within the precision.
    pub fn quantize(
        &self,
        value: &H::Value,
        other: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let target_exponent = self.helper.exponent(other);
        if !ctx.exponent_within_range(target_exponent) {
            return Err(DecimalError::ExponentOutOfRange);
        }
        let target = FastInteger::from_big(target_exponent);
        let (m, e) = self.parts(value);
        let negative = m.is_negative();
        let magnitude = m.abs();
        let precision = FastInteger::from_big(ctx.precision());

        if e > target {
            let mut shift = e;
            shift.subtract(&target);
            if !magnitude.is_zero() && !precision.is_value_zero() {
                let mut slack = precision;
                slack.add_int(10);
                if shift > slack {
                    return Err(DecimalError::ExponentUnreachable);
                }
            }
            let scaled = self.scale(&magnitude, &shift)?;
            let mut scratch = Flags::empty();
            let result =
                self.round_to_fixed_exponent(negative, &scaled, target, 0, false, ctx, &mut scratch)?;
            return Ok(self.quantize_flags(result, scratch, ctx, flags));
        }

        let mut shift = target.clone();
        shift.subtract(&e);
        let mut acc = self.helper.create_shift_accumulator(&magnitude)?;
        acc.shift_right(&shift);
        let mut scratch = Flags::empty();
        if !magnitude.is_zero() && shift.signum() > 0 {
            scratch |= Flags::ROUNDED;
        }
        let result = self.round_to_fixed_exponent(
            negative,
            &acc.shifted_int(),
            target,
            acc.last_discarded_digit(),
            acc.older_discarded_digits(),
            ctx,
            &mut scratch,
        )?;
        Ok(self.quantize_flags(result, scratch, ctx, flags))
    }

    /// Quantize never signals underflow, and its subnormal signal depends on
    /// the rounded result rather than the operand.
    fn quantize_flags(
        &self,
        result: Option<H::Value>,
        scratch: Flags,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> Option<H::Value> {
        *flags |= scratch - (Flags::SUBNORMAL | Flags::UNDERFLOW);
        if let Some(v) = &result {
            if self.is_subnormal(v, ctx) {
                *flags |= Flags::SUBNORMAL;
            }
        }
        result
    }

    /// Whether a nonzero value's adjusted exponent is below `e_min`.
    fn is_subnormal(&self, value: &H::Value, ctx: &PrecisionContext) -> bool {
        let (m, mut adjusted) = self.parts(value);
        if m.is_zero() || !ctx.has_exponent_range() {
            return false;
        }
        adjusted
            .add(&self.helper.digit_length(&m.abs()))
            .decrement();
        adjusted < FastInteger::from_big(ctx.e_min())
    }

    /// Rounds, then strips trailing zero digits. Zero reduces to exponent 0.
    pub fn reduce(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let Some(rounded) = self.round_to_precision(value, ctx, flags)? else {
            return Ok(None);
        };
        let (mut m, mut e) = self.parts(&rounded);
        if m.is_zero() {
            return self.finish(&m, FastInteger::from_i32(0), ctx, flags);
        }
        let radix = self.radix_big();
        loop {
            let (d, r) = m.div_rem(&radix)?;
            if !r.is_zero() {
                break;
            }
            m = d;
            e.increment();
        }
        self.finish(&m, e, ctx, flags)
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Numeric comparison; `1.0` and `1` compare equal.
    pub fn compare_to(&self, a: &H::Value, b: &H::Value) -> Ordering {
        let (ma, ea) = self.parts(a);
        let (mb, eb) = self.parts(b);
        let (sa, sb) = (ma.signum(), mb.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        if ea == eb {
            return ma.cmp(&mb);
        }
        let (na, nb) = (ma.abs(), mb.abs());
        let mut adj_a = ea.clone();
        adj_a.add(&self.helper.digit_length(&na));
        let mut adj_b = eb.clone();
        adj_b.add(&self.helper.digit_length(&nb));
        let magnitude_order = match adj_a.compare_to(&adj_b) {
            Ordering::Equal => {
                // Equal adjusted exponents bound the gap by the digit lengths.
                let mut gap = ea.clone();
                gap.subtract(&eb);
                if gap.signum() > 0 {
                    self.helper
                        .multiply_by_radix_power(&na, gap.as_i32() as u32)
                        .cmp(&nb)
                } else {
                    gap.negate();
                    na.cmp(&self.helper.multiply_by_radix_power(&nb, gap.as_i32() as u32))
                }
            }
            other => other,
        };
        if sa < 0 {
            magnitude_order.reverse()
        } else {
            magnitude_order
        }
    }

    /// Numerically smaller operand, rounded. Equal values prefer the
    /// smaller exponent when positive.
    pub fn min(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let chosen = match self.compare_to(a, b) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal => self.pick_by_exponent(a, b, false),
        };
        self.round_to_precision(chosen, ctx, flags)
    }

    /// Numerically larger operand, rounded. Equal values prefer the larger
    /// exponent when positive.
    pub fn max(
        &self,
        a: &H::Value,
        b: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let chosen = match self.compare_to(a, b) {
            Ordering::Greater => a,
            Ordering::Less => b,
            Ordering::Equal => self.pick_by_exponent(a, b, true),
        };
        self.round_to_precision(chosen, ctx, flags)
    }

    fn pick_by_exponent<'a>(&self, a: &'a H::Value, b: &'a H::Value, larger: bool) -> &'a H::Value {
        let a_larger = self.helper.exponent(a) >= self.helper.exponent(b);
        let positive = self.helper.sign(a) >= 0;
        if a_larger == (larger == positive) { a } else { b }
    }

    // ========================================================================
    // Neighbours
    // ========================================================================

    /// Smallest representable value greater than `value`.
    ///
    /// # Errors
    /// `InvalidContext` under unlimited precision, or for zero without an
    /// exponent range.
    pub fn next_plus(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
    ) -> crate::Result<Option<H::Value>> {
        self.next_step(value, true, ctx)
    }

    /// Largest representable value less than `value`.
    ///
    /// # Errors
    /// `InvalidContext` under unlimited precision, or for zero without an
    /// exponent range.
    pub fn next_minus(
        &self,
        value: &H::Value,
        ctx: &PrecisionContext,
    ) -> crate::Result<Option<H::Value>> {
        self.next_step(value, false, ctx)
    }

    fn next_step(
        &self,
        value: &H::Value,
        up: bool,
        ctx: &PrecisionContext,
    ) -> crate::Result<Option<H::Value>> {
        if ctx.precision().is_zero() {
            return Err(DecimalError::InvalidContext);
        }
        let limits = Limits::new(ctx, self.helper.radix());
        let (m, e) = self.parts(value);
        // A unit two digits below both the operand's last digit and the last
        // digit the precision keeps, so it never reaches the next grid point.
        let quantum = if m.is_zero() {
            if !limits.ranged {
                return Err(DecimalError::InvalidContext);
            }
            let mut q = limits.e_tiny.clone();
            q.decrement();
            q
        } else {
            let mut kept_edge = e.clone();
            kept_edge
                .add(&self.helper.digit_length(&m.abs()))
                .subtract(&limits.precision);
            let mut q = FastInteger::min(&e, &kept_edge);
            q.subtract_int(2);
            q
        };
        let unit = BigInteger::from_i32(if up { 1 } else { -1 });
        let (sum, exp) = self.exact_sum(&m, &e, &unit, &quantum)?;
        let rounding = if up { Rounding::Ceiling } else { Rounding::Floor };
        let mut scratch = Flags::empty();
        self.finish(&sum, exp, &ctx.with_rounding(rounding), &mut scratch)
    }

    /// The neighbour of `value` in the direction of `target`, or `value`
    /// itself when they are equal.
    pub fn next_toward(
        &self,
        value: &H::Value,
        target: &H::Value,
        ctx: &PrecisionContext,
        flags: &mut Flags,
    ) -> crate::Result<Option<H::Value>> {
        let result = match self.compare_to(value, target) {
            Ordering::Equal => return Ok(Some(value.clone())),
            Ordering::Less => self.next_plus(value, ctx)?,
            Ordering::Greater => self.next_minus(value, ctx)?,
        };
        match &result {
            None => *flags |= Flags::OVERFLOW | Flags::INEXACT | Flags::ROUNDED,
            Some(v) if ctx.has_exponent_range() => {
                let (m, mut adjusted) = self.parts(v);
                adjusted
                    .add(&self.helper.digit_length(&m.abs()))
                    .decrement();
                if m.is_zero() || adjusted < FastInteger::from_big(ctx.e_min()) {
                    *flags |= Flags::SUBNORMAL
                        | Flags::UNDERFLOW
                        | Flags::INEXACT
                        | Flags::ROUNDED;
                    if m.is_zero() {
                        *flags |= Flags::CLAMPED;
                    }
                }
            }
            Some(_) => {}
        }
        Ok(result)
    }
}
