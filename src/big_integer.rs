use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Neg, Shl, Shr};
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::DecimalError;

/// Arbitrary-precision signed integer.
///
/// The magnitude is stored as 16-bit words, least significant first. The word
/// buffer is always sized to one of the rounded capacities (2, 4, 8, then powers
/// of two) so the recursive multiply and square kernels can split operands in
/// half without special-casing odd lengths. Only the first `word_count` words
/// are significant.
///
/// Values are immutable: every operation returns a new `BigInteger`.
#[derive(Clone)]
pub struct BigInteger {
    words: Vec<u16>,
    word_count: usize,
    negative: bool,
}

/// Below this many words the recursive kernels fall back to schoolbook loops.
const RECURSION_LIMIT: usize = 16;

/// Largest power of ten that fits in a word, used for chunked string conversion.
const CHUNK_RADIX: u16 = 10_000;
const CHUNK_DIGITS: usize = 4;

// ============================================================================
// Construction
// ============================================================================

impl BigInteger {
    /// Zero.
    pub fn zero() -> Self {
        Self {
            words: vec![0; 2],
            word_count: 0,
            negative: false,
        }
    }

    /// One.
    pub fn one() -> Self {
        Self::from_i32(1)
    }

    /// Ten.
    pub fn ten() -> Self {
        Self::from_i32(10)
    }

    /// Creates a `BigInteger` from a 32-bit integer.
    pub fn from_i32(value: i32) -> Self {
        Self::from_i64(value as i64)
    }

    /// Creates a `BigInteger` from a 64-bit integer.
    pub fn from_i64(value: i64) -> Self {
        Self::from_u64_with_sign(value.unsigned_abs(), value < 0)
    }

    /// Creates a `BigInteger` from an unsigned 64-bit integer.
    pub fn from_u64(value: u64) -> Self {
        Self::from_u64_with_sign(value, false)
    }

    fn from_u64_with_sign(mut value: u64, negative: bool) -> Self {
        let mut words = vec![0u16; 4];
        let mut i = 0;
        while value != 0 {
            words[i] = value as u16;
            value >>= 16;
            i += 1;
        }
        Self::from_words(words, negative)
    }

    /// Freezes a scratch magnitude buffer into a value, trimming the significant
    /// word count and shortening the buffer to its rounded capacity.
    pub(crate) fn from_words(mut words: Vec<u16>, negative: bool) -> Self {
        let word_count = count_words(&words);
        let capacity = round_up_size(word_count);
        words.resize(capacity, 0);
        words.shrink_to(capacity);
        Self {
            words,
            word_count,
            negative: negative && word_count != 0,
        }
    }

    /// The significant words of the magnitude, least significant first.
    pub(crate) fn magnitude_words(&self) -> &[u16] {
        &self.words[..self.word_count]
    }

    /// Parses a decimal string of the form `-?[0-9]+`.
    ///
    /// No leading `+`, no surrounding whitespace, at least one digit.
    ///
    /// # Errors
    /// Returns `DecimalError::InvalidFormat` for any other input.
    pub fn from_string(s: &str) -> crate::Result<Self> {
        let bytes = s.as_bytes();
        let (negative, digits) = match bytes.first() {
            Some(b'-') => (true, &bytes[1..]),
            Some(_) => (false, bytes),
            None => return Err(DecimalError::InvalidFormat),
        };
        if digits.is_empty() {
            return Err(DecimalError::InvalidFormat);
        }

        let mut words: Vec<u16> = Vec::with_capacity(round_up_size(digits.len() / 4 + 1));
        // Leading partial chunk first so the rest come in full groups of four.
        let head = digits.len() % CHUNK_DIGITS;
        let (first, rest) = digits.split_at(head);
        let mut chunks = rest.chunks(CHUNK_DIGITS);
        let mut pending = if first.is_empty() {
            chunks.next()
        } else {
            Some(first)
        };

        while let Some(chunk) = pending {
            let mut value: u16 = 0;
            let mut scale: u16 = 1;
            for &byte in chunk {
                let digit = byte.wrapping_sub(b'0');
                if digit > 9 {
                    return Err(DecimalError::InvalidFormat);
                }
                value = value * 10 + digit as u16;
                scale *= 10;
            }
            multiply_add_small(&mut words, scale, value);
            pending = chunks.next();
        }

        Ok(Self::from_words(words, negative))
    }

    /// Creates a `BigInteger` from a two's-complement byte buffer.
    ///
    /// An empty buffer is zero. The sign is taken from the high bit of the most
    /// significant byte.
    pub fn from_bytes(bytes: &[u8], little_endian: bool) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }
        let mut le: Vec<u8> = bytes.to_vec();
        if !little_endian {
            le.reverse();
        }
        let negative = le[le.len() - 1] & 0x80 != 0;
        if negative {
            // Two's complement back to the magnitude.
            let mut carry = true;
            for b in le.iter_mut() {
                *b = !*b;
                if carry {
                    let (v, overflow) = b.overflowing_add(1);
                    *b = v;
                    carry = overflow;
                }
            }
            if carry {
                le.push(1);
            }
        }
        let mut words = vec![0u16; le.len().div_ceil(2)];
        for (i, &b) in le.iter().enumerate() {
            words[i / 2] |= (b as u16) << ((i % 2) * 8);
        }
        Self::from_words(words, negative)
    }
}

impl Default for BigInteger {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i32> for BigInteger {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl From<i64> for BigInteger {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<u32> for BigInteger {
    fn from(value: u32) -> Self {
        Self::from_u64(value as u64)
    }
}

impl From<u64> for BigInteger {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for BigInteger {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

// ============================================================================
// Predicates and Accessors
// ============================================================================

impl BigInteger {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.word_count == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns -1, 0 or 1.
    #[inline]
    pub fn signum(&self) -> i32 {
        if self.word_count == 0 {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    #[inline]
    pub fn is_even(&self) -> bool {
        self.word_count == 0 || self.words[0] & 1 == 0
    }

    /// Number of bits needed to hold the value in two's complement, excluding
    /// the sign bit. Zero and -1 have a bit length of 0.
    pub fn bit_length(&self) -> usize {
        let bits = magnitude_bit_length(self.magnitude_words());
        if self.negative {
            // -2^k needs one bit fewer than its magnitude.
            match self.lowest_set_bit() {
                Some(low) if low + 1 == bits => bits - 1,
                _ => bits,
            }
        } else {
            bits
        }
    }

    /// Index of the lowest set bit, or `None` for zero.
    pub fn lowest_set_bit(&self) -> Option<usize> {
        self.magnitude_words()
            .iter()
            .position(|&w| w != 0)
            .map(|i| i * 16 + self.words[i].trailing_zeros() as usize)
    }

    /// Tests bit `index` of the two's-complement representation.
    pub fn test_bit(&self, index: usize) -> bool {
        if !self.negative {
            return magnitude_bit(self.magnitude_words(), index);
        }
        // -x == !(x - 1): bits below the lowest set bit of x are 0, the lowest
        // set bit itself is 1, and everything above is inverted.
        match self.lowest_set_bit() {
            Some(low) if index < low => false,
            Some(low) if index == low => true,
            _ => !magnitude_bit(self.magnitude_words(), index),
        }
    }

    /// Number of bytes in the minimal two's-complement encoding.
    pub fn byte_count(&self) -> usize {
        self.bit_length() / 8 + 1
    }

    /// Number of decimal digits in the magnitude; zero has one digit.
    pub fn digit_count(&self) -> usize {
        if self.word_count <= 4 {
            let mut value = magnitude_to_u64(self.magnitude_words());
            let mut count = 1;
            while value >= 10 {
                value /= 10;
                count += 1;
            }
            return count;
        }
        let s = self.abs().to_string();
        s.len()
    }

    pub fn can_fit_in_i32(&self) -> bool {
        self.to_i32().is_some()
    }

    /// Converts to `i32`, returning `None` if the value does not fit.
    pub fn to_i32(&self) -> Option<i32> {
        self.to_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// Converts to `i64`, returning `None` if the value does not fit.
    pub fn to_i64(&self) -> Option<i64> {
        if self.word_count > 4 {
            return None;
        }
        let mag = magnitude_to_u64(self.magnitude_words());
        if self.negative {
            if mag <= i64::MAX as u64 + 1 {
                Some((mag as i64).wrapping_neg())
            } else {
                None
            }
        } else {
            i64::try_from(mag).ok()
        }
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl BigInteger {
    pub fn negate(&self) -> Self {
        let mut result = self.clone();
        result.negative = !self.negative && self.word_count != 0;
        result
    }

    pub fn abs(&self) -> Self {
        let mut result = self.clone();
        result.negative = false;
        result
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn add(&self, other: &Self) -> Self {
        if other.is_zero() {
            return self.clone();
        }
        if self.is_zero() {
            return other.clone();
        }
        let a = self.magnitude_words();
        let b = other.magnitude_words();
        if self.negative == other.negative {
            return Self::from_words(add_magnitudes(a, b), self.negative);
        }
        match compare_magnitudes(a, b) {
            Ordering::Equal => Self::zero(),
            Ordering::Greater => Self::from_words(subtract_magnitudes(a, b), self.negative),
            Ordering::Less => Self::from_words(subtract_magnitudes(b, a), other.negative),
        }
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn subtract(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn multiply(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let a = self.magnitude_words();
        let b = other.magnitude_words();
        let product = if a == b {
            square_magnitude(a)
        } else {
            multiply_magnitudes(a, b)
        };
        Self::from_words(product, self.negative != other.negative)
    }

    /// Truncating division and remainder. The quotient rounds toward zero and
    /// the remainder takes the sign of the dividend.
    ///
    /// # Errors
    /// Returns `DecimalError::DivisionByZero` if `divisor` is zero.
    pub fn div_rem(&self, divisor: &Self) -> crate::Result<(Self, Self)> {
        if divisor.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok((Self::zero(), Self::zero()));
        }
        let (q, r) = div_rem_magnitudes(self.magnitude_words(), divisor.magnitude_words());
        Ok((
            Self::from_words(q, self.negative != divisor.negative),
            Self::from_words(r, self.negative),
        ))
    }

    /// Truncating division by a nonzero word. The remainder is the magnitude's.
    pub(crate) fn div_rem_word(&self, divisor: u16) -> (Self, u16) {
        debug_assert!(divisor != 0);
        let mut q = self.magnitude_words().to_vec();
        let r = divide_in_place_small(&mut q, divisor);
        (Self::from_words(q, self.negative), r)
    }

    /// Truncating division.
    ///
    /// # Errors
    /// Returns `DecimalError::DivisionByZero` if `divisor` is zero.
    pub fn divide(&self, divisor: &Self) -> crate::Result<Self> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    /// Remainder of truncating division; has the sign of `self`.
    ///
    /// # Errors
    /// Returns `DecimalError::DivisionByZero` if `divisor` is zero.
    pub fn remainder(&self, divisor: &Self) -> crate::Result<Self> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Mathematical modulus: the result is always in `[0, divisor)`.
    ///
    /// # Errors
    /// Returns `DecimalError::DivisionByZero` for a zero divisor and
    /// `DecimalError::NegativeArgument` for a negative one.
    pub fn modulo(&self, divisor: &Self) -> crate::Result<Self> {
        if divisor.is_negative() {
            return Err(DecimalError::NegativeArgument);
        }
        let r = self.remainder(divisor)?;
        if r.is_negative() {
            Ok(r.add(divisor))
        } else {
            Ok(r)
        }
    }

    /// Greatest common divisor of the absolute values.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.magnitude_words().to_vec();
        let mut b = other.magnitude_words().to_vec();
        while count_words(&b) != 0 {
            let (_, r) = div_rem_magnitudes(&a[..count_words(&a)], &b[..count_words(&b)]);
            a = b;
            b = r;
        }
        Self::from_words(a, false)
    }

    /// Raises `self` to a non-negative power.
    ///
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `exponent` is negative.
    pub fn pow(&self, exponent: i32) -> crate::Result<Self> {
        if exponent < 0 {
            return Err(DecimalError::NegativeArgument);
        }
        let mut exp = exponent as u32;
        let mut result = Self::one();
        let mut base = self.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.multiply(&base);
            }
            exp >>= 1;
            if exp > 0 {
                base = base.multiply(&base);
            }
        }
        Ok(result)
    }

    /// Floor of the square root, by Newton iteration.
    ///
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `self` is negative.
    pub fn sqrt(&self) -> crate::Result<Self> {
        self.sqrt_rem().map(|(s, _)| s)
    }

    /// Floor square root `s` together with `self - s*s`.
    ///
    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `self` is negative.
    pub fn sqrt_rem(&self) -> crate::Result<(Self, Self)> {
        if self.negative {
            return Err(DecimalError::NegativeArgument);
        }
        if self.is_zero() {
            return Ok((Self::zero(), Self::zero()));
        }
        // Start above the root so the iteration decreases monotonically.
        let bits = self.bit_length();
        let mut x = Self::one().shift_left(bits.div_ceil(2) as i32);
        loop {
            let y = x.add(&self.divide(&x)?).shift_right(1);
            if y >= x {
                break;
            }
            x = y;
        }
        let rem = self.subtract(&x.multiply(&x));
        Ok((x, rem))
    }
}

// ============================================================================
// Shifts
// ============================================================================

impl BigInteger {
    /// Multiplies by `2^bits`. A negative amount shifts right instead.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn shift_left(&self, bits: i32) -> Self {
        if bits == 0 || self.is_zero() {
            return self.clone();
        }
        if bits < 0 {
            if bits == i32::MIN {
                // -i32::MIN overflows; shifting right by i32::MAX bits clears
                // every magnitude this type can hold anyway.
                return self.shift_right(i32::MAX).shift_right(1);
            }
            return self.shift_right(-bits);
        }
        let shifted = shift_magnitude_left(self.magnitude_words(), bits as usize);
        Self::from_words(shifted, self.negative)
    }

    /// Arithmetic shift right: divides by `2^bits`, rounding toward negative
    /// infinity. A negative amount shifts left instead.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn shift_right(&self, bits: i32) -> Self {
        if bits == 0 || self.is_zero() {
            return self.clone();
        }
        if bits < 0 {
            if bits == i32::MIN {
                return self.shift_left(i32::MAX).shift_left(1);
            }
            return self.shift_left(-bits);
        }
        if !self.negative {
            let shifted = shift_magnitude_right(self.magnitude_words(), bits as usize);
            return Self::from_words(shifted, false);
        }
        // floor(-x / 2^n) == -(((x - 1) >> n) + 1)
        let minus_one = subtract_magnitudes(self.magnitude_words(), &[1]);
        let shifted = shift_magnitude_right(&minus_one[..count_words(&minus_one)], bits as usize);
        let plus_one = add_magnitudes(&shifted[..count_words(&shifted)], &[1]);
        Self::from_words(plus_one, true)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl BigInteger {
    /// Minimal two's-complement encoding. Zero encodes as a single `0x00` byte.
    pub fn to_bytes(&self, little_endian: bool) -> Vec<u8> {
        let mag = self.magnitude_words();
        let mut bytes: Vec<u8> = Vec::with_capacity(mag.len() * 2 + 1);
        for &w in mag {
            bytes.push(w as u8);
            bytes.push((w >> 8) as u8);
        }
        bytes.push(0);

        if self.negative {
            let mut carry = true;
            for b in bytes.iter_mut() {
                *b = !*b;
                if carry {
                    let (v, overflow) = b.overflowing_add(1);
                    *b = v;
                    carry = overflow;
                }
            }
            while bytes.len() > 1
                && bytes[bytes.len() - 1] == 0xFF
                && bytes[bytes.len() - 2] & 0x80 != 0
            {
                bytes.pop();
            }
        } else {
            while bytes.len() > 1
                && bytes[bytes.len() - 1] == 0
                && bytes[bytes.len() - 2] & 0x80 == 0
            {
                bytes.pop();
            }
        }

        if !little_endian {
            bytes.reverse();
        }
        bytes
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.pad_integral(true, "", "0");
        }
        // Peel off four decimal digits per division by 10000.
        let mut scratch = self.magnitude_words().to_vec();
        let mut len = scratch.len();
        let mut digits: Vec<u8> = Vec::with_capacity(len * 5);
        while len > 0 {
            let rem = divide_in_place_small(&mut scratch[..len], CHUNK_RADIX);
            len = count_words(&scratch[..len]);
            let mut chunk = rem;
            for i in 0..CHUNK_DIGITS {
                if len == 0 && chunk == 0 && i > 0 {
                    break;
                }
                digits.push(b'0' + (chunk % 10) as u8);
                chunk /= 10;
            }
        }
        while digits.len() > 1 && digits[digits.len() - 1] == b'0' {
            digits.pop();
        }
        digits.reverse();
        let s = String::from_utf8(digits).map_err(|_| fmt::Error)?;
        f.pad_integral(!self.negative, "", &s)
    }
}

impl fmt::Debug for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("BigInteger")
                .field("words", &self.magnitude_words())
                .field("negative", &self.negative)
                .finish()
        } else {
            write!(f, "BigInteger({})", self)
        }
    }
}

// ============================================================================
// Comparison and Hashing
// ============================================================================

impl PartialEq for BigInteger {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative && self.magnitude_words() == other.magnitude_words()
    }
}

impl Eq for BigInteger {}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.signum(), other.signum()) {
            (a, b) if a != b => a.cmp(&b),
            (0, _) => Ordering::Equal,
            (1, _) => compare_magnitudes(self.magnitude_words(), other.magnitude_words()),
            _ => compare_magnitudes(other.magnitude_words(), self.magnitude_words()),
        }
    }
}

impl Hash for BigInteger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.negative.hash(state);
        self.magnitude_words().hash(state);
    }
}

// ============================================================================
// Operator Traits
// ============================================================================

macro_rules! forward_ref_binop {
    (impl $imp:ident, $method:ident, $body:expr) => {
        impl<'a> core::ops::$imp<&'a BigInteger> for &'a BigInteger {
            type Output = BigInteger;

            #[inline]
            fn $method(self, rhs: &'a BigInteger) -> BigInteger {
                $body(self, rhs)
            }
        }

        impl core::ops::$imp<BigInteger> for BigInteger {
            type Output = BigInteger;

            #[inline]
            fn $method(self, rhs: BigInteger) -> BigInteger {
                $body(&self, &rhs)
            }
        }
    };
}

forward_ref_binop!(impl Add, add, |a: &BigInteger, b: &BigInteger| BigInteger::add(a, b));
forward_ref_binop!(impl Sub, sub, |a: &BigInteger, b: &BigInteger| a.subtract(b));
forward_ref_binop!(impl Mul, mul, |a: &BigInteger, b: &BigInteger| a.multiply(b));
forward_ref_binop!(impl Div, div, |a: &BigInteger, b: &BigInteger| a
    .divide(b)
    .expect("attempt to divide by zero"));
forward_ref_binop!(impl Rem, rem, |a: &BigInteger, b: &BigInteger| a
    .remainder(b)
    .expect("attempt to calculate the remainder with a divisor of zero"));

impl Neg for BigInteger {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Neg for &BigInteger {
    type Output = BigInteger;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Shl<i32> for &BigInteger {
    type Output = BigInteger;

    fn shl(self, bits: i32) -> Self::Output {
        self.shift_left(bits)
    }
}

impl Shr<i32> for &BigInteger {
    type Output = BigInteger;

    fn shr(self, bits: i32) -> Self::Output {
        self.shift_right(bits)
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for BigInteger {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_bytes(&self.to_bytes(true))
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BigInteger {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_string(&s).map_err(de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Ok(Self::from_bytes(&bytes, true))
        }
    }
}

// ============================================================================
// Word Kernels
// ============================================================================

/// Rounds a word count up to the capacity schedule: 2, 4, 8, then powers of two.
fn round_up_size(n: usize) -> usize {
    if n <= 2 {
        2
    } else if n <= 4 {
        4
    } else if n <= 8 {
        8
    } else {
        n.next_power_of_two()
    }
}

fn count_words(words: &[u16]) -> usize {
    words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1)
}

fn magnitude_bit_length(words: &[u16]) -> usize {
    match words.last() {
        Some(&top) => (words.len() - 1) * 16 + (16 - top.leading_zeros() as usize),
        None => 0,
    }
}

fn magnitude_bit(words: &[u16], index: usize) -> bool {
    words
        .get(index / 16)
        .is_some_and(|&w| (w >> (index % 16)) & 1 == 1)
}

fn magnitude_to_u64(words: &[u16]) -> u64 {
    words
        .iter()
        .rev()
        .fold(0u64, |acc, &w| (acc << 16) | w as u64)
}

/// Compares two trimmed magnitudes.
fn compare_magnitudes(a: &[u16], b: &[u16]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

fn add_magnitudes(a: &[u16], b: &[u16]) -> Vec<u16> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut result = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u32;
    for (i, &w) in long.iter().enumerate() {
        let t = w as u32 + short.get(i).copied().unwrap_or(0) as u32 + carry;
        result.push(t as u16);
        carry = t >> 16;
    }
    result.push(carry as u16);
    result
}

/// `a - b`, where `a >= b`.
fn subtract_magnitudes(a: &[u16], b: &[u16]) -> Vec<u16> {
    let mut result = Vec::with_capacity(a.len());
    let mut borrow = 0i32;
    for (i, &w) in a.iter().enumerate() {
        let t = w as i32 - b.get(i).copied().unwrap_or(0) as i32 - borrow;
        result.push(t as u16);
        borrow = (t < 0) as i32;
    }
    debug_assert_eq!(borrow, 0, "subtract_magnitudes requires a >= b");
    result
}

/// Adds `src` into `dst` in place, propagating the carry through `dst`.
fn add_into(dst: &mut [u16], src: &[u16]) {
    let mut carry = 0u32;
    let mut i = 0;
    while i < src.len() || (carry != 0 && i < dst.len()) {
        let t = dst[i] as u32 + src.get(i).copied().unwrap_or(0) as u32 + carry;
        dst[i] = t as u16;
        carry = t >> 16;
        i += 1;
    }
}

/// Subtracts `src` from `dst` in place; the result must stay non-negative.
fn subtract_into(dst: &mut [u16], src: &[u16]) {
    let mut borrow = 0i32;
    let mut i = 0;
    while i < src.len() || (borrow != 0 && i < dst.len()) {
        let t = dst[i] as i32 - src.get(i).copied().unwrap_or(0) as i32 - borrow;
        dst[i] = t as u16;
        borrow = (t < 0) as i32;
        i += 1;
    }
}

/// `words = words * mul + add`, growing on carry.
fn multiply_add_small(words: &mut Vec<u16>, mul: u16, add: u16) {
    let mut carry = add as u32;
    for w in words.iter_mut() {
        let t = *w as u32 * mul as u32 + carry;
        *w = t as u16;
        carry = t >> 16;
    }
    if carry != 0 {
        words.push(carry as u16);
    }
}

/// Divides `words` by a single word in place and returns the remainder.
fn divide_in_place_small(words: &mut [u16], divisor: u16) -> u16 {
    let d = divisor as u32;
    let mut rem = 0u32;
    for w in words.iter_mut().rev() {
        let cur = (rem << 16) | *w as u32;
        *w = (cur / d) as u16;
        rem = cur % d;
    }
    rem as u16
}

fn shift_magnitude_left(words: &[u16], bits: usize) -> Vec<u16> {
    let word_shift = bits / 16;
    let bit_shift = bits % 16;
    let mut result = vec![0u16; words.len() + word_shift + 1];
    if bit_shift == 0 {
        result[word_shift..word_shift + words.len()].copy_from_slice(words);
    } else {
        let mut carry = 0u16;
        for (i, &w) in words.iter().enumerate() {
            result[i + word_shift] = (w << bit_shift) | carry;
            carry = w >> (16 - bit_shift);
        }
        result[words.len() + word_shift] = carry;
    }
    result
}

fn shift_magnitude_right(words: &[u16], bits: usize) -> Vec<u16> {
    let word_shift = bits / 16;
    if word_shift >= words.len() {
        return Vec::new();
    }
    let bit_shift = bits % 16;
    let src = &words[word_shift..];
    let mut result = vec![0u16; src.len()];
    if bit_shift == 0 {
        result.copy_from_slice(src);
    } else {
        for i in 0..src.len() {
            let high = src.get(i + 1).copied().unwrap_or(0);
            result[i] = (src[i] >> bit_shift) | (high << (16 - bit_shift));
        }
    }
    result
}

// ============================================================================
// Multiplication Kernels
// ============================================================================

/// Schoolbook multiply into a zeroed `result` of at least `a.len() + b.len()` words.
fn baseline_multiply(result: &mut [u16], a: &[u16], b: &[u16]) {
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        let mut carry = 0u32;
        for (j, &bj) in b.iter().enumerate() {
            let t = ai as u32 * bj as u32 + result[i + j] as u32 + carry;
            result[i + j] = t as u16;
            carry = t >> 16;
        }
        result[i + b.len()] = carry as u16;
    }
}

fn baseline_multiply2(result: &mut [u16], a: &[u16], b: &[u16]) {
    let x = a[0] as u64 | (a[1] as u64) << 16;
    let y = b[0] as u64 | (b[1] as u64) << 16;
    let p = x * y;
    result[0] = p as u16;
    result[1] = (p >> 16) as u16;
    result[2] = (p >> 32) as u16;
    result[3] = (p >> 48) as u16;
}

fn baseline_multiply4(result: &mut [u16], a: &[u16], b: &[u16]) {
    let x = magnitude_to_u64(&a[..4]) as u128;
    let y = magnitude_to_u64(&b[..4]) as u128;
    let p = x * y;
    for (i, w) in result[..8].iter_mut().enumerate() {
        *w = (p >> (16 * i)) as u16;
    }
}

fn baseline_multiply8(result: &mut [u16], a: &[u16], b: &[u16]) {
    multiply_u64_limbs::<2>(result, a, b);
}

fn baseline_multiply16(result: &mut [u16], a: &[u16], b: &[u16]) {
    multiply_u64_limbs::<4>(result, a, b);
}

/// Schoolbook multiply of `4 * L`-word operands as `L` 64-bit limbs each,
/// writing `8 * L` words.
fn multiply_u64_limbs<const L: usize>(result: &mut [u16], a: &[u16], b: &[u16]) {
    let x: [u64; L] = core::array::from_fn(|i| magnitude_to_u64(&a[4 * i..4 * i + 4]));
    let y: [u64; L] = core::array::from_fn(|i| magnitude_to_u64(&b[4 * i..4 * i + 4]));
    let mut acc = [0u64; 8];
    for i in 0..L {
        let mut carry = 0u128;
        for j in 0..L {
            let t = x[i] as u128 * y[j] as u128 + acc[i + j] as u128 + carry;
            acc[i + j] = t as u64;
            carry = t >> 64;
        }
        acc[i + L] = carry as u64;
    }
    for (k, limb) in acc[..2 * L].iter().enumerate() {
        for s in 0..4 {
            result[4 * k + s] = (limb >> (16 * s)) as u16;
        }
    }
}

/// Schoolbook square of `a` into a zeroed `result` of `2 * a.len()` words.
/// Each cross product is computed once and doubled.
fn baseline_square(result: &mut [u16], a: &[u16]) {
    let n = a.len();
    for i in 0..n {
        if a[i] == 0 {
            continue;
        }
        let mut carry = 0u32;
        for j in (i + 1)..n {
            let t = a[i] as u32 * a[j] as u32 + result[i + j] as u32 + carry;
            result[i + j] = t as u16;
            carry = t >> 16;
        }
        result[i + n] = carry as u16;
    }
    let mut shifted_out = 0u16;
    for w in result[..2 * n].iter_mut() {
        let next = *w >> 15;
        *w = (*w << 1) | shifted_out;
        shifted_out = next;
    }
    let mut carry = 0u32;
    for i in 0..n {
        let sq = a[i] as u32 * a[i] as u32;
        let t = result[2 * i] as u32 + (sq & 0xFFFF) + carry;
        result[2 * i] = t as u16;
        carry = t >> 16;
        let t = result[2 * i + 1] as u32 + (sq >> 16) + carry;
        result[2 * i + 1] = t as u16;
        carry = t >> 16;
    }
}

/// `|x - y|` for equal-length word slices, and whether `x < y`.
fn abs_difference(x: &[u16], y: &[u16]) -> (Vec<u16>, bool) {
    let less = x.iter().rev().cmp(y.iter().rev()) == Ordering::Less;
    let (big, small) = if less { (y, x) } else { (x, y) };
    let mut diff = big.to_vec();
    subtract_into(&mut diff, small);
    (diff, less)
}

/// Karatsuba multiply of two equal power-of-two-length operands.
/// Returns exactly `2 * n` words.
fn recursive_multiply(a: &[u16], b: &[u16]) -> Vec<u16> {
    let n = a.len();
    debug_assert_eq!(n, b.len());
    let mut result = vec![0u16; 2 * n];
    if n <= RECURSION_LIMIT || n % 2 != 0 {
        match n {
            2 => baseline_multiply2(&mut result, a, b),
            4 => baseline_multiply4(&mut result, a, b),
            8 => baseline_multiply8(&mut result, a, b),
            16 => baseline_multiply16(&mut result, a, b),
            _ => baseline_multiply(&mut result, a, b),
        }
        return result;
    }

    let h = n / 2;
    let (a0, a1) = a.split_at(h);
    let (b0, b1) = b.split_at(h);
    let low = recursive_multiply(a0, b0);
    let high = recursive_multiply(a1, b1);
    let (da, a_less) = abs_difference(a0, a1);
    let (db, b_less) = abs_difference(b1, b0);
    let cross = recursive_multiply(&da, &db);

    // a0*b1 + a1*b0 == low + high + (a0 - a1)(b1 - b0)
    let mut middle = vec![0u16; n + 1];
    add_into(&mut middle, &low);
    add_into(&mut middle, &high);
    if a_less == b_less {
        add_into(&mut middle, &cross);
    } else {
        subtract_into(&mut middle, &cross);
    }

    result[..n].copy_from_slice(&low);
    result[n..].copy_from_slice(&high);
    add_into(&mut result[h..], &middle);
    result
}

/// Recursive square of a power-of-two-length operand. Returns `2 * n` words.
fn recursive_square(a: &[u16]) -> Vec<u16> {
    let n = a.len();
    let mut result = vec![0u16; 2 * n];
    if n <= RECURSION_LIMIT || n % 2 != 0 {
        baseline_square(&mut result, a);
        return result;
    }

    let h = n / 2;
    let (a0, a1) = a.split_at(h);
    let low = recursive_square(a0);
    let high = recursive_square(a1);
    let (d, _) = abs_difference(a0, a1);
    let cross = recursive_square(&d);

    // 2*a0*a1 == low + high - (a0 - a1)^2
    let mut middle = vec![0u16; n + 1];
    add_into(&mut middle, &low);
    add_into(&mut middle, &high);
    subtract_into(&mut middle, &cross);

    result[..n].copy_from_slice(&low);
    result[n..].copy_from_slice(&high);
    add_into(&mut result[h..], &middle);
    result
}

fn padded(words: &[u16], len: usize) -> Vec<u16> {
    let mut v = vec![0u16; len];
    v[..words.len()].copy_from_slice(words);
    v
}

/// Tiles the short operand against successive slices of the long one.
fn asymmetric_multiply(short: &[u16], long: &[u16], n: usize) -> Vec<u16> {
    let short = padded(short, n);
    let tiles = long.len().div_ceil(n);
    let mut result = vec![0u16; tiles * n + n];
    for (i, chunk) in long.chunks(n).enumerate() {
        let product = recursive_multiply(&short, &padded(chunk, n));
        add_into(&mut result[i * n..], &product);
    }
    result
}

fn multiply_magnitudes(a: &[u16], b: &[u16]) -> Vec<u16> {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.len() == 1 {
        let mut result = long.to_vec();
        multiply_add_small(&mut result, short[0], 0);
        return result;
    }
    let n = round_up_size(short.len());
    if round_up_size(long.len()) == n {
        recursive_multiply(&padded(short, n), &padded(long, n))
    } else {
        asymmetric_multiply(short, long, n)
    }
}

fn square_magnitude(a: &[u16]) -> Vec<u16> {
    let n = round_up_size(a.len());
    recursive_square(&padded(a, n))
}

// ============================================================================
// Division Kernels
// ============================================================================

/// Estimates a quotient word from the top three words of the running
/// remainder and the top two words of the normalized divisor. The estimate is
/// at most one too large.
fn estimate_quotient(u2: u16, u1: u16, u0: u16, v1: u16, v0: u16) -> u64 {
    let num = (u2 as u64) << 16 | u1 as u64;
    let mut qhat = num / v1 as u64;
    let mut rhat = num % v1 as u64;
    while qhat > 0xFFFF || qhat * v0 as u64 > ((rhat << 16) | u0 as u64) {
        qhat -= 1;
        rhat += v1 as u64;
        if rhat > 0xFFFF {
            break;
        }
    }
    qhat
}

/// Divides the four-word value `(r1, r0, u1, u0)` by the two-word divisor
/// `(v1, v0)`. The top two words must be less than the divisor, so the
/// quotient fits in two words.
fn divide_four_by_two(r: u32, u1: u16, u0: u16, v: u32) -> (u32, u32) {
    let num = (r as u64) << 32 | (u1 as u64) << 16 | u0 as u64;
    let v = v as u64;
    ((num / v) as u32, (num % v) as u32)
}

/// Quotient and remainder by a two-word divisor, two dividend words per step.
fn divide_by_two_words(a: &[u16], v: u32) -> (Vec<u16>, Vec<u16>) {
    let mut q = vec![0u16; a.len() + 1];
    let mut r = 0u32;
    let mut j = a.len();
    if j % 2 == 1 {
        j -= 1;
        let (qw, rw) = divide_four_by_two(0, 0, a[j], v);
        q[j] = qw as u16;
        r = rw;
    }
    while j >= 2 {
        j -= 2;
        let (qw, rw) = divide_four_by_two(r, a[j + 1], a[j], v);
        q[j] = qw as u16;
        q[j + 1] = (qw >> 16) as u16;
        r = rw;
    }
    (q, u64_to_words(r as u64))
}

/// `u -= q * v` over `v.len() + 1` words. Returns true if the result went
/// negative, meaning `q` was one too large.
fn multiply_subtract(u: &mut [u16], v: &[u16], q: u64) -> bool {
    let n = v.len();
    let mut carry = 0u64;
    let mut borrow = 0i64;
    for i in 0..n {
        let p = q * v[i] as u64 + carry;
        carry = p >> 16;
        let t = u[i] as i64 - (p & 0xFFFF) as i64 + borrow;
        u[i] = t as u16;
        borrow = t >> 16;
    }
    let t = u[n] as i64 - carry as i64 + borrow;
    u[n] = t as u16;
    t < 0
}

/// Adds the divisor back after an overestimated quotient word.
fn correct_quotient_estimate(u: &mut [u16], v: &[u16]) {
    let n = v.len();
    let mut carry = 0u32;
    for i in 0..n {
        let t = u[i] as u32 + v[i] as u32 + carry;
        u[i] = t as u16;
        carry = t >> 16;
    }
    u[n] = u[n].wrapping_add(carry as u16);
}

/// Quotient and remainder of two trimmed magnitudes; `b` must be nonzero.
fn div_rem_magnitudes(a: &[u16], b: &[u16]) -> (Vec<u16>, Vec<u16>) {
    if compare_magnitudes(a, b) == Ordering::Less {
        return (Vec::new(), a.to_vec());
    }
    if b.len() == 1 {
        let mut q = a.to_vec();
        let r = divide_in_place_small(&mut q, b[0]);
        return (q, vec![r]);
    }
    if a.len() <= 4 {
        let x = magnitude_to_u64(a);
        let y = magnitude_to_u64(b);
        return (u64_to_words(x / y), u64_to_words(x % y));
    }
    if b.len() == 2 {
        return divide_by_two_words(a, b[0] as u32 | (b[1] as u32) << 16);
    }

    let n = b.len();
    let m = a.len() - n;
    let shift = b[n - 1].leading_zeros() as usize;
    let normalized = shift_magnitude_left(b, shift);
    let v = &normalized[..n];
    let mut u = shift_magnitude_left(a, shift);
    u.truncate(a.len() + 1);
    let mut q = vec![0u16; m + 1];

    for j in (0..=m).rev() {
        let mut qhat = estimate_quotient(u[j + n], u[j + n - 1], u[j + n - 2], v[n - 1], v[n - 2]);
        if multiply_subtract(&mut u[j..=j + n], v, qhat) {
            qhat -= 1;
            correct_quotient_estimate(&mut u[j..=j + n], v);
        }
        q[j] = qhat as u16;
    }

    let r = shift_magnitude_right(&u[..n], shift);
    (q, r)
}

fn u64_to_words(mut value: u64) -> Vec<u16> {
    let mut words = Vec::with_capacity(4);
    while value != 0 {
        words.push(value as u16);
        value >>= 16;
    }
    words
}

#[cfg(test)]
mod tests {
    use std::string::ToString;
    use std::vec;

    use super::*;

    fn big(s: &str) -> BigInteger {
        BigInteger::from_string(s).unwrap()
    }

    #[test]
    fn test_zero_invariants() {
        let z = BigInteger::zero();
        assert!(z.is_zero());
        assert!(!z.is_negative());
        assert_eq!(z.signum(), 0);
        assert_eq!(z.negate(), z);
        assert_eq!(big("-0"), z);
        assert!(!big("-0").is_negative());
    }

    #[test]
    fn test_capacity_schedule() {
        assert_eq!(round_up_size(0), 2);
        assert_eq!(round_up_size(3), 4);
        assert_eq!(round_up_size(5), 8);
        assert_eq!(round_up_size(9), 16);
        assert_eq!(round_up_size(17), 32);
        let v = big("123456789012345678901234567890");
        assert_eq!(v.words.len(), round_up_size(v.word_count));
        assert_ne!(v.words[v.word_count - 1], 0);
    }

    #[test]
    fn test_shrinks_after_subtraction() {
        let a = big("1000000000000000000000000000000000000000000000000");
        let b = a.subtract(&BigInteger::one());
        let c = a.subtract(&b);
        assert_eq!(c, BigInteger::one());
        assert_eq!(c.words.len(), 2);
    }

    #[test]
    fn test_add_subtract_signs() {
        assert_eq!(big("5").add(&big("-7")), big("-2"));
        assert_eq!(big("-5").add(&big("7")), big("2"));
        assert_eq!(big("-5").add(&big("-7")), big("-12"));
        assert_eq!(big("5").subtract(&big("5")), BigInteger::zero());
        assert_eq!(big("65535").add(&big("1")), big("65536"));
        assert_eq!(big("65536").subtract(&big("1")), big("65535"));
    }

    #[test]
    fn test_multiply_scenario() {
        let a = big("1234567890123456789");
        let b = big("987654321");
        assert_eq!(a.multiply(&b), big("1219326311248285321112635269"));
        assert_eq!(a.negate().multiply(&b), big("-1219326311248285321112635269"));
    }

    #[test]
    fn test_multiply_by_one_and_zero() {
        let a = big("-98765432109876543210987654321");
        assert_eq!(a.multiply(&BigInteger::one()), a);
        assert_eq!(a.multiply(&BigInteger::zero()), BigInteger::zero());
    }

    #[test]
    fn test_karatsuba_matches_schoolbook() {
        // 40 words each forces the recursive path.
        let a: Vec<u16> = (0..40u32).map(|i| (i * 7919 + 13) as u16).collect();
        let b: Vec<u16> = (0..40u32).map(|i| (i * 104_729 + 7) as u16).collect();
        let mut expected = vec![0u16; 80];
        baseline_multiply(&mut expected, &a, &b);
        let got = multiply_magnitudes(&a, &b);
        assert_eq!(&got[..count_words(&got)], &expected[..count_words(&expected)]);
    }

    #[test]
    fn test_unrolled_kernels_match_schoolbook() {
        for n in [8usize, 16] {
            let a: Vec<u16> = (0..n as u32).map(|i| 0xFFFF - i as u16).collect();
            let b: Vec<u16> = (0..n as u32).map(|i| (i * 50_021 + 3) as u16).collect();
            let mut expected = vec![0u16; 2 * n];
            baseline_multiply(&mut expected, &a, &b);
            let mut got = vec![0u16; 2 * n];
            if n == 8 {
                baseline_multiply8(&mut got, &a, &b);
            } else {
                baseline_multiply16(&mut got, &a, &b);
            }
            assert_eq!(got, expected, "{n}-word kernel");
            assert_eq!(recursive_multiply(&a, &b), expected);
        }
    }

    #[test]
    fn test_two_word_divisor() {
        let a = big("340282366920938463463374607431768211455"); // 2^128 - 1
        let b = big("4294967291");
        let (q, r) = a.div_rem(&b).unwrap();
        let expected = u128::MAX / 4_294_967_291;
        assert_eq!(q, big(&expected.to_string()));
        assert_eq!(r, big(&(u128::MAX % 4_294_967_291).to_string()));
        let (q, r) = big("-18446744073709551616123").div_rem(&big("65537")).unwrap();
        assert_eq!(q.multiply(&big("65537")).add(&r), big("-18446744073709551616123"));
        assert!(r.is_negative());
        assert_eq!(divide_four_by_two(0x1234, 0xABCD, 0xEF01, 0x0001_0000), (0x1234_ABCD, 0xEF01));
    }

    #[test]
    fn test_asymmetric_matches_schoolbook() {
        let a: Vec<u16> = (0..5u32).map(|i| (i * 31 + 65_000) as u16).collect();
        let b: Vec<u16> = (0..70u32).map(|i| (i * 977 + 1) as u16).collect();
        let mut expected = vec![0u16; 75];
        baseline_multiply(&mut expected, &a, &b);
        let got = multiply_magnitudes(&a, &b);
        assert_eq!(&got[..count_words(&got)], &expected[..count_words(&expected)]);
    }

    #[test]
    fn test_square_matches_multiply() {
        let a: Vec<u16> = (0..64u32).map(|i| (i * 40_503 + 11) as u16).collect();
        let mut expected = vec![0u16; 128];
        baseline_multiply(&mut expected, &a, &a);
        let got = square_magnitude(&a);
        assert_eq!(&got[..count_words(&got)], &expected[..count_words(&expected)]);
        let x = big("-340282366920938463463374607431768211455");
        assert_eq!(x.multiply(&x), x.multiply(&x.abs()).negate());
    }

    #[test]
    fn test_div_rem_truncates() {
        let (q, r) = BigInteger::from_i32(-7).div_rem(&BigInteger::from_i32(2)).unwrap();
        assert_eq!(q, BigInteger::from_i32(-3));
        assert_eq!(r, BigInteger::from_i32(-1));
        let (q, r) = BigInteger::from_i32(7).div_rem(&BigInteger::from_i32(-2)).unwrap();
        assert_eq!(q, BigInteger::from_i32(-3));
        assert_eq!(r, BigInteger::from_i32(1));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            big("10").div_rem(&BigInteger::zero()),
            Err(DecimalError::DivisionByZero)
        );
        assert_eq!(big("10").modulo(&BigInteger::zero()), Err(DecimalError::DivisionByZero));
    }

    #[test]
    fn test_long_division() {
        let a = big("123456789012345678901234567890123456789012345678901234567890");
        let b = big("98765432109876543210987");
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q.multiply(&b).add(&r), a);
        assert!(r.abs() < b.abs());
        assert_eq!(q, big("1249999988609375000142391093749550070"));
        assert_eq!(r, big("29599966484956903948800"));
    }

    #[test]
    fn test_division_needs_correction() {
        // Divisor with a top word that makes the first estimate overshoot.
        let b = BigInteger::from_words(vec![0xFFFF, 0x0000, 0x8000], false);
        let a = BigInteger::from_words(vec![0x0000, 0xFFFF, 0xFFFF, 0x7FFF, 0x0000, 0x8000], false);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q.multiply(&b).add(&r), a);
        assert!(r < b);
    }

    #[test]
    fn test_modulo() {
        assert_eq!(big("-7").modulo(&big("3")).unwrap(), big("2"));
        assert_eq!(big("7").modulo(&big("3")).unwrap(), big("1"));
        assert_eq!(big("7").modulo(&big("-3")), Err(DecimalError::NegativeArgument));
    }

    #[test]
    fn test_gcd() {
        assert_eq!(big("-48").gcd(&big("18")), big("6"));
        assert_eq!(big("0").gcd(&big("-5")), big("5"));
        assert_eq!(big("0").gcd(&big("0")), BigInteger::zero());
    }

    #[test]
    fn test_pow() {
        assert_eq!(BigInteger::ten().pow(20).unwrap(), big("100000000000000000000"));
        assert_eq!(big("-2").pow(3).unwrap(), big("-8"));
        assert_eq!(big("7").pow(0).unwrap(), BigInteger::one());
        assert_eq!(big("7").pow(-1), Err(DecimalError::NegativeArgument));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(BigInteger::from_i32(100).sqrt().unwrap(), BigInteger::from_i32(10));
        assert_eq!(BigInteger::from_i32(99).sqrt().unwrap(), BigInteger::from_i32(9));
        assert_eq!(BigInteger::one().sqrt().unwrap(), BigInteger::one());
        let (s, r) = big("1000000000000000000000000000001").sqrt_rem().unwrap();
        assert_eq!(s, big("1000000000000000"));
        assert_eq!(r, big("1"));
        assert_eq!(big("-4").sqrt(), Err(DecimalError::NegativeArgument));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(big("1").shift_left(100), BigInteger::from(2u64).pow(100).unwrap());
        assert_eq!(big("1024").shift_right(3), big("128"));
        assert_eq!(big("1024").shift_left(-3), big("128"));
        assert_eq!(big("-5").shift_right(1), big("-3"));
        assert_eq!(big("-1").shift_right(10), big("-1"));
        assert_eq!(big("-4").shift_right(1), big("-2"));
        assert_eq!(big("5").shift_right(64), BigInteger::zero());
        assert_eq!(big("5").shift_left(i32::MIN), BigInteger::zero());
        assert_eq!(big("-5").shift_left(i32::MIN), big("-1"));
    }

    #[test]
    fn test_bits() {
        assert_eq!(big("0").bit_length(), 0);
        assert_eq!(big("255").bit_length(), 8);
        assert_eq!(big("256").bit_length(), 9);
        assert_eq!(big("-1").bit_length(), 0);
        assert_eq!(big("-128").bit_length(), 7);
        assert_eq!(big("-129").bit_length(), 8);
        assert!(big("5").test_bit(0));
        assert!(!big("5").test_bit(1));
        // -6 = ...11111010
        assert!(!big("-6").test_bit(0));
        assert!(big("-6").test_bit(1));
        assert!(!big("-6").test_bit(2));
        assert!(big("-6").test_bit(3));
        assert!(big("-6").test_bit(200));
        assert_eq!(big("40").lowest_set_bit(), Some(3));
        assert_eq!(big("0").lowest_set_bit(), None);
    }

    #[test]
    fn test_to_bytes() {
        assert_eq!(BigInteger::zero().to_bytes(true), vec![0x00]);
        assert_eq!(big("127").to_bytes(true), vec![0x7F]);
        assert_eq!(big("128").to_bytes(true), vec![0x80, 0x00]);
        assert_eq!(big("-128").to_bytes(true), vec![0x80]);
        assert_eq!(big("-129").to_bytes(true), vec![0x7F, 0xFF]);
        assert_eq!(big("-1").to_bytes(false), vec![0xFF]);
        assert_eq!(big("65535").to_bytes(false), vec![0x00, 0xFF, 0xFF]);
        assert_eq!(big("-32768").byte_count(), 2);
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(BigInteger::from_bytes(&[], true), BigInteger::zero());
        assert_eq!(BigInteger::from_bytes(&[0x80], true), big("-128"));
        assert_eq!(BigInteger::from_bytes(&[0x00, 0x80], false), big("128"));
        assert_eq!(BigInteger::from_bytes(&[0xFF, 0xFF, 0xFF], true), big("-1"));
        assert_eq!(BigInteger::from_bytes(&[0x00, 0x00, 0x00, 0x80], true), big("-2147483648"));
    }

    #[test]
    fn test_string_round_trip() {
        for s in [
            "0",
            "1",
            "-1",
            "9999",
            "10000",
            "100000000",
            "-100020003000400050006",
            "340282366920938463463374607431768211456",
        ] {
            assert_eq!(big(s).to_string(), s);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in ["", "-", "+1", " 1", "1 ", "12a", "1.0", "--1"] {
            assert_eq!(BigInteger::from_string(s), Err(DecimalError::InvalidFormat), "{s:?}");
        }
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(big("0").digit_count(), 1);
        assert_eq!(big("-999").digit_count(), 3);
        assert_eq!(big("1000").digit_count(), 4);
        assert_eq!(big("123456789012345678901234567890").digit_count(), 30);
    }

    #[test]
    fn test_machine_conversions() {
        assert_eq!(BigInteger::from_i64(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(BigInteger::from_i64(i64::MAX).to_i64(), Some(i64::MAX));
        assert_eq!(BigInteger::from_u64(u64::MAX).to_i64(), None);
        assert_eq!(BigInteger::from_i64(i32::MIN as i64).to_i32(), Some(i32::MIN));
        assert!(!BigInteger::from_i64(i32::MAX as i64 + 1).can_fit_in_i32());
    }

    #[test]
    fn test_ordering_and_operators() {
        assert!(big("-10") < big("-9"));
        assert!(big("-1") < big("0"));
        assert!(big("100000000000000000000") > big("99999999999999999999"));
        let a = big("12");
        let b = big("5");
        assert_eq!(&a + &b, big("17"));
        assert_eq!(&a - &b, big("7"));
        assert_eq!(&a * &b, big("60"));
        assert_eq!(&a / &b, big("2"));
        assert_eq!(&a % &b, big("2"));
        assert_eq!(-&a, big("-12"));
        assert_eq!(&a << 2, big("48"));
        assert_eq!(&a >> 2, big("3"));
        assert_eq!(a.clone() * b.clone() - big("60"), BigInteger::zero());
        assert_eq!(a + b, big("17"));
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(std::format!("{:?}", big("-42")), "BigInteger(-42)");
        assert_eq!(std::format!("{:>6}", big("-42")), "   -42");
    }
}
