use crate::{BigInteger, DecimalError, FastInteger};

/// Right-shifting cursor over a non-negative magnitude that remembers what it
/// threw away.
///
/// After any sequence of shifts, [`last_discarded_digit`] is the most recently
/// removed digit (or bit) and [`older_discarded_digits`] reports whether any
/// digit removed before it was nonzero. Rounding decisions are made from that
/// pair and the parity of the kept value alone.
///
/// [`last_discarded_digit`]: ShiftAccumulator::last_discarded_digit
/// [`older_discarded_digits`]: ShiftAccumulator::older_discarded_digits
pub trait ShiftAccumulator {
    fn shifted_int(&self) -> BigInteger;

    fn shifted_fast_int(&self) -> FastInteger;

    fn last_discarded_digit(&self) -> u32;

    fn older_discarded_digits(&self) -> bool;

    fn discarded_digit_count(&self) -> &FastInteger;

    /// Digits (or bits) in the current shifted value. Zero has a length of 1.
    fn digit_length(&self) -> FastInteger;

    /// Discards the low `digits` digits. Non-positive amounts do nothing.
    fn shift_right(&mut self, digits: &FastInteger);

    fn shift_right_int(&mut self, digits: i32);

    /// Shifts right until at most `digits` digits remain. Never grows the value.
    fn shift_to_digits(&mut self, digits: &FastInteger) {
        let length = self.digit_length();
        if length.compare_to(digits).is_gt() {
            let mut excess = length;
            excess.subtract(digits);
            self.shift_right(&excess);
        }
    }

    fn shift_to_digits_int(&mut self, digits: i32) {
        self.shift_to_digits(&FastInteger::from_i32(digits));
    }
}

#[derive(Clone, Debug)]
enum Shifted {
    Small(i32),
    Big(BigInteger),
}

impl Shifted {
    fn new(magnitude: &BigInteger) -> crate::Result<Self> {
        if magnitude.is_negative() {
            return Err(DecimalError::NegativeArgument);
        }
        Ok(match magnitude.to_i32() {
            Some(v) => Shifted::Small(v),
            None => Shifted::Big(magnitude.clone()),
        })
    }

    fn from_big(value: BigInteger) -> Self {
        match value.to_i32() {
            Some(v) => Shifted::Small(v),
            None => Shifted::Big(value),
        }
    }

    fn to_big(&self) -> BigInteger {
        match self {
            Shifted::Small(v) => BigInteger::from_i32(*v),
            Shifted::Big(b) => b.clone(),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Shifted::Small(v) => *v == 0,
            Shifted::Big(b) => b.is_zero(),
        }
    }
}

/// State shared by both accumulators.
#[derive(Clone, Debug)]
struct Discards {
    shifted: Shifted,
    count: FastInteger,
    last: u32,
    older: bool,
}

impl Discards {
    fn new(magnitude: &BigInteger, last: u32, older: bool) -> crate::Result<Self> {
        Ok(Self {
            shifted: Shifted::new(magnitude)?,
            count: FastInteger::from_i32(0),
            last,
            older,
        })
    }

    /// Folds the current last digit into the older flag ahead of a new shift.
    fn retire_last(&mut self) {
        self.older |= self.last != 0;
    }

    /// Discards every remaining digit when a shift reaches past the top. The
    /// last discarded digit is then a leading zero.
    fn discard_all(&mut self, digits: &FastInteger) {
        self.retire_last();
        self.older |= !self.shifted.is_zero();
        self.last = 0;
        self.shifted = Shifted::Small(0);
        self.count.add(digits);
    }
}

// ============================================================================
// Binary
// ============================================================================

/// Shift accumulator over bits, backing radix-2 rounding.
#[derive(Clone, Debug)]
pub struct BitShiftAccumulator {
    state: Discards,
}

impl BitShiftAccumulator {
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `magnitude` is negative.
    pub fn new(magnitude: &BigInteger) -> crate::Result<Self> {
        Self::with_digits(magnitude, 0, false)
    }

    /// Starts from a magnitude whose lower discarded bits are already known.
    ///
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `magnitude` is negative.
    pub fn with_digits(magnitude: &BigInteger, last: u32, older: bool) -> crate::Result<Self> {
        Ok(Self {
            state: Discards::new(magnitude, last, older)?,
        })
    }
}

impl ShiftAccumulator for BitShiftAccumulator {
    fn shifted_int(&self) -> BigInteger {
        self.state.shifted.to_big()
    }

    fn shifted_fast_int(&self) -> FastInteger {
        match &self.state.shifted {
            Shifted::Small(v) => FastInteger::from_i32(*v),
            Shifted::Big(b) => FastInteger::from_big(b),
        }
    }

    fn last_discarded_digit(&self) -> u32 {
        self.state.last
    }

    fn older_discarded_digits(&self) -> bool {
        self.state.older
    }

    fn discarded_digit_count(&self) -> &FastInteger {
        &self.state.count
    }

    fn digit_length(&self) -> FastInteger {
        let bits = match &self.state.shifted {
            Shifted::Small(v) => (32 - v.leading_zeros()) as usize,
            Shifted::Big(b) => b.bit_length(),
        };
        FastInteger::from_usize(bits.max(1))
    }

    fn shift_right(&mut self, digits: &FastInteger) {
        if digits.signum() <= 0 {
            return;
        }
        if digits.can_fit_in_i32() {
            self.shift_right_int(digits.as_i32());
        } else {
            self.state.discard_all(digits);
        }
    }

    fn shift_right_int(&mut self, bits: i32) {
        if bits <= 0 {
            return;
        }
        let n = bits as usize;
        let state = &mut self.state;
        match state.shifted.clone() {
            Shifted::Small(v) => {
                if n > 31 {
                    state.discard_all(&FastInteger::from_i32(bits));
                    return;
                }
                state.retire_last();
                state.last = ((v >> (n - 1)) & 1) as u32;
                state.older |= v & ((1 << (n - 1)) - 1) != 0;
                state.shifted = Shifted::Small(v >> n);
            }
            Shifted::Big(b) => {
                if n > b.bit_length() {
                    state.discard_all(&FastInteger::from_i32(bits));
                    return;
                }
                state.retire_last();
                state.last = b.test_bit(n - 1) as u32;
                state.older |= b.lowest_set_bit().is_some_and(|low| low < n - 1);
                state.shifted = Shifted::from_big(b.shift_right(bits));
            }
        }
        state.count.add_int(bits);
    }
}

// ============================================================================
// Decimal
// ============================================================================

/// Shift accumulator over decimal digits, backing radix-10 rounding.
#[derive(Clone, Debug)]
pub struct DigitShiftAccumulator {
    state: Discards,
}

impl DigitShiftAccumulator {
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `magnitude` is negative.
    pub fn new(magnitude: &BigInteger) -> crate::Result<Self> {
        Self::with_digits(magnitude, 0, false)
    }

    /// Starts from a magnitude whose lower discarded digits are already known.
    ///
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `magnitude` is negative.
    pub fn with_digits(magnitude: &BigInteger, last: u32, older: bool) -> crate::Result<Self> {
        Ok(Self {
            state: Discards::new(magnitude, last, older)?,
        })
    }

    fn shift_small(&mut self, value: i32, digits: usize) {
        let state = &mut self.state;
        let mut v = value;
        for _ in 0..digits {
            state.retire_last();
            state.last = (v % 10) as u32;
            v /= 10;
        }
        state.shifted = Shifted::Small(v);
    }

    /// Shifts a big value by dividing off up to four digits at a time. Only
    /// the highest dropped digit is kept exactly.
    fn shift_big(&mut self, value: &BigInteger, digits: usize) {
        const CHUNKS: [u16; 5] = [1, 10, 100, 1_000, 10_000];
        let state = &mut self.state;
        state.retire_last();
        let mut kept = value.clone();
        let mut remaining = digits;
        while remaining > 1 {
            let step = (remaining - 1).min(4);
            let (q, r) = kept.div_rem_word(CHUNKS[step]);
            state.older |= r != 0;
            kept = q;
            remaining -= step;
        }
        let (q, r) = kept.div_rem_word(10);
        state.last = r as u32;
        state.shifted = Shifted::from_big(q);
    }
}

impl ShiftAccumulator for DigitShiftAccumulator {
    fn shifted_int(&self) -> BigInteger {
        self.state.shifted.to_big()
    }

    fn shifted_fast_int(&self) -> FastInteger {
        match &self.state.shifted {
            Shifted::Small(v) => FastInteger::from_i32(*v),
            Shifted::Big(b) => FastInteger::from_big(b),
        }
    }

    fn last_discarded_digit(&self) -> u32 {
        self.state.last
    }

    fn older_discarded_digits(&self) -> bool {
        self.state.older
    }

    fn discarded_digit_count(&self) -> &FastInteger {
        &self.state.count
    }

    fn digit_length(&self) -> FastInteger {
        let digits = match &self.state.shifted {
            Shifted::Small(v) => small_digit_count(*v),
            Shifted::Big(b) => b.digit_count(),
        };
        FastInteger::from_usize(digits)
    }

    fn shift_right(&mut self, digits: &FastInteger) {
        if digits.signum() <= 0 {
            return;
        }
        if digits.can_fit_in_i32() {
            self.shift_right_int(digits.as_i32());
        } else {
            self.state.discard_all(digits);
        }
    }

    fn shift_right_int(&mut self, digits: i32) {
        if digits <= 0 {
            return;
        }
        let n = digits as usize;
        match self.state.shifted.clone() {
            Shifted::Small(v) => {
                if n > small_digit_count(v) {
                    self.state.discard_all(&FastInteger::from_i32(digits));
                    return;
                }
                self.shift_small(v, n);
            }
            Shifted::Big(b) => {
                if n > b.digit_count() {
                    self.state.discard_all(&FastInteger::from_i32(digits));
                    return;
                }
                self.shift_big(&b, n);
            }
        }
        self.state.count.add_int(digits);
    }
}

fn small_digit_count(value: i32) -> usize {
    let mut v = value.unsigned_abs();
    let mut count = 1;
    while v >= 10 {
        v /= 10;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use std::string::ToString;

    use super::*;

    fn big(s: &str) -> BigInteger {
        s.parse().unwrap()
    }

    #[test]
    fn test_rejects_negative_magnitude() {
        assert_eq!(
            DigitShiftAccumulator::new(&BigInteger::from_i32(-5)).err(),
            Some(DecimalError::NegativeArgument)
        );
        assert_eq!(
            BitShiftAccumulator::new(&BigInteger::from_i32(-5)).err(),
            Some(DecimalError::NegativeArgument)
        );
    }

    #[test]
    fn test_digit_shift_small() {
        let mut acc = DigitShiftAccumulator::new(&BigInteger::from_i32(123_456)).unwrap();
        acc.shift_right_int(2);
        assert_eq!(acc.shifted_int(), BigInteger::from_i32(1234));
        assert_eq!(acc.last_discarded_digit(), 5);
        assert!(acc.older_discarded_digits());
        assert_eq!(acc.discarded_digit_count().as_i32(), 2);
        assert_eq!(acc.digit_length().as_i32(), 4);
    }

    #[test]
    fn test_digit_shift_merges_previous_discards() {
        let mut acc = DigitShiftAccumulator::with_digits(&BigInteger::from_i32(1200), 3, false)
            .unwrap();
        acc.shift_right_int(1);
        assert_eq!(acc.last_discarded_digit(), 0);
        assert!(acc.older_discarded_digits());

        let mut acc = DigitShiftAccumulator::with_digits(&BigInteger::from_i32(15), 0, true)
            .unwrap();
        acc.shift_right_int(1);
        assert_eq!(acc.last_discarded_digit(), 5);
        assert!(acc.older_discarded_digits());
    }

    #[test]
    fn test_digit_shift_big_in_chunks() {
        let mut acc = DigitShiftAccumulator::new(&big("12345678901234567890123")).unwrap();
        acc.shift_right_int(5);
        assert_eq!(acc.shifted_int(), big("123456789012345678"));
        assert_eq!(acc.last_discarded_digit(), 9);
        assert!(acc.older_discarded_digits());
        acc.shift_to_digits_int(3);
        assert_eq!(acc.shifted_int(), BigInteger::from_i32(123));
        assert_eq!(acc.last_discarded_digit(), 4);
        assert_eq!(acc.discarded_digit_count().as_i32(), 20);
    }

    #[test]
    fn test_digit_shift_big_tracks_sticky_digits() {
        let mut acc = DigitShiftAccumulator::new(&big("1000000000000000000000000000000")).unwrap();
        acc.shift_right_int(12);
        assert_eq!(acc.shifted_int(), big("1000000000000000000"));
        assert_eq!(acc.last_discarded_digit(), 0);
        assert!(!acc.older_discarded_digits());

        // Only the lowest of 26 dropped digits is nonzero.
        let mut acc = DigitShiftAccumulator::new(&big("50000000000000000000000001")).unwrap();
        acc.shift_right_int(26);
        assert_eq!(acc.shifted_int(), BigInteger::zero());
        assert_eq!(acc.last_discarded_digit(), 5);
        assert!(acc.older_discarded_digits());

        let mut acc = DigitShiftAccumulator::with_digits(&big("98765432109876543210"), 3, false)
            .unwrap();
        acc.shift_right_int(6);
        assert_eq!(acc.shifted_int(), big("98765432109876"));
        assert_eq!(acc.last_discarded_digit(), 5);
        assert!(acc.older_discarded_digits());
    }

    #[test]
    fn test_digit_shift_past_top() {
        let mut acc = DigitShiftAccumulator::new(&BigInteger::from_i32(5)).unwrap();
        acc.shift_right_int(1);
        assert_eq!(acc.last_discarded_digit(), 5);
        assert!(!acc.older_discarded_digits());

        let mut acc = DigitShiftAccumulator::new(&BigInteger::from_i32(5)).unwrap();
        acc.shift_right_int(2);
        assert_eq!(acc.last_discarded_digit(), 0);
        assert!(acc.older_discarded_digits());
        assert!(acc.shifted_int().is_zero());

        let mut huge = FastInteger::from_i32(i32::MAX);
        huge.multiply(4);
        let mut acc = DigitShiftAccumulator::new(&big("99999999999999999999")).unwrap();
        acc.shift_right(&huge);
        assert!(acc.shifted_int().is_zero());
        assert_eq!(acc.last_discarded_digit(), 0);
        assert!(acc.older_discarded_digits());
        assert_eq!(acc.discarded_digit_count().to_string(), "8589934588");
    }

    #[test]
    fn test_shift_to_digits_never_grows() {
        let mut acc = DigitShiftAccumulator::new(&BigInteger::from_i32(42)).unwrap();
        acc.shift_to_digits_int(5);
        assert_eq!(acc.shifted_int(), BigInteger::from_i32(42));
        assert!(acc.discarded_digit_count().is_value_zero());
    }

    #[test]
    fn test_bit_shift() {
        // 0b1011_0110
        let mut acc = BitShiftAccumulator::new(&BigInteger::from_i32(0xB6)).unwrap();
        acc.shift_right_int(2);
        assert_eq!(acc.shifted_int(), BigInteger::from_i32(0x2D));
        assert_eq!(acc.last_discarded_digit(), 1);
        assert!(!acc.older_discarded_digits());
        acc.shift_to_digits_int(3);
        assert_eq!(acc.shifted_int(), BigInteger::from_i32(5));
        assert_eq!(acc.last_discarded_digit(), 1);
        assert!(acc.older_discarded_digits());
        assert_eq!(acc.digit_length().as_i32(), 3);
    }

    #[test]
    fn test_bit_shift_big() {
        let value = BigInteger::one().shift_left(100).add(&BigInteger::one().shift_left(39));
        let mut acc = BitShiftAccumulator::new(&value).unwrap();
        acc.shift_right_int(40);
        assert_eq!(acc.shifted_int(), BigInteger::one().shift_left(60));
        assert_eq!(acc.last_discarded_digit(), 1);
        assert!(!acc.older_discarded_digits());
        assert_eq!(acc.digit_length().as_i32(), 61);
    }
}
