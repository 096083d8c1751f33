use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::{BigInteger, DecimalError};

/// Non-negative integer with growable 32-bit limbs, mutated in place.
///
/// This is the intermediate representation a [`crate::FastInteger`] moves to
/// when a positive value outgrows `i32`. It supports only the handful of
/// operations the rounding engine performs on exponents and digit counts.
#[derive(Clone, Debug)]
pub struct MutableNumber {
    limbs: Vec<u32>,
    limb_count: usize,
}

impl MutableNumber {
    pub fn zero() -> Self {
        Self {
            limbs: vec![0; 2],
            limb_count: 0,
        }
    }

    pub fn from_u64(value: u64) -> Self {
        let mut number = Self {
            limbs: vec![value as u32, (value >> 32) as u32],
            limb_count: 2,
        };
        number.trim();
        number
    }

    /// # Errors
    /// Returns `DecimalError::NegativeArgument` if `value` is negative.
    pub fn from_big(value: &BigInteger) -> crate::Result<Self> {
        if value.is_negative() {
            return Err(DecimalError::NegativeArgument);
        }
        let words = value.magnitude_words();
        let mut limbs = vec![0u32; words.len().div_ceil(2).max(2)];
        for (i, &w) in words.iter().enumerate() {
            limbs[i / 2] |= (w as u32) << ((i % 2) * 16);
        }
        let mut number = Self {
            limb_count: limbs.len(),
            limbs,
        };
        number.trim();
        Ok(number)
    }

    pub fn to_big_integer(&self) -> BigInteger {
        let mut words = Vec::with_capacity(self.limb_count * 2);
        for &limb in &self.limbs[..self.limb_count] {
            words.push(limb as u16);
            words.push((limb >> 16) as u16);
        }
        BigInteger::from_words(words, false)
    }

    fn trim(&mut self) {
        while self.limb_count > 0 && self.limbs[self.limb_count - 1] == 0 {
            self.limb_count -= 1;
        }
    }

    fn ensure_len(&mut self, len: usize) {
        if self.limbs.len() < len {
            self.limbs.resize(len, 0);
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limb_count == 0
    }

    pub fn can_fit_in_i32(&self) -> bool {
        self.limb_count == 0 || (self.limb_count == 1 && self.limbs[0] <= i32::MAX as u32)
    }

    /// The value as `i32`, or `None` if it does not fit.
    pub fn to_i32(&self) -> Option<i32> {
        if self.can_fit_in_i32() {
            Some(if self.limb_count == 0 {
                0
            } else {
                self.limbs[0] as i32
            })
        } else {
            None
        }
    }

    /// Multiplies in place by a small non-negative factor.
    pub fn multiply(&mut self, factor: u32) -> &mut Self {
        if factor == 0 {
            self.limb_count = 0;
            return self;
        }
        let mut carry = 0u64;
        for limb in &mut self.limbs[..self.limb_count] {
            let t = *limb as u64 * factor as u64 + carry;
            *limb = t as u32;
            carry = t >> 32;
        }
        if carry != 0 {
            self.ensure_len(self.limb_count + 1);
            self.limbs[self.limb_count] = carry as u32;
            self.limb_count += 1;
        }
        self
    }

    pub fn add(&mut self, value: u32) -> &mut Self {
        let mut carry = value as u64;
        let mut i = 0;
        while carry != 0 {
            self.ensure_len(i + 1);
            if i >= self.limb_count {
                self.limbs[i] = 0;
                self.limb_count = i + 1;
            }
            let t = self.limbs[i] as u64 + carry;
            self.limbs[i] = t as u32;
            carry = t >> 32;
            i += 1;
        }
        self
    }

    pub fn add_number(&mut self, other: &MutableNumber) -> &mut Self {
        let len = self.limb_count.max(other.limb_count);
        self.ensure_len(len + 1);
        for limb in &mut self.limbs[self.limb_count..=len] {
            *limb = 0;
        }
        let mut carry = 0u64;
        for i in 0..len {
            let o = if i < other.limb_count { other.limbs[i] } else { 0 };
            let t = self.limbs[i] as u64 + o as u64 + carry;
            self.limbs[i] = t as u32;
            carry = t >> 32;
        }
        self.limbs[len] = carry as u32;
        self.limb_count = len + 1;
        self.trim();
        self
    }

    /// Subtracts `other` in place. The caller guarantees `self >= other`.
    pub fn subtract_number(&mut self, other: &MutableNumber) -> &mut Self {
        debug_assert!(self.compare_to(other) != Ordering::Less);
        let mut borrow = 0i64;
        for i in 0..self.limb_count {
            let o = if i < other.limb_count { other.limbs[i] } else { 0 };
            let t = self.limbs[i] as i64 - o as i64 - borrow;
            self.limbs[i] = t as u32;
            borrow = (t < 0) as i64;
        }
        self.trim();
        self
    }

    /// Subtracts a small value in place. The caller guarantees `self >= value`.
    pub fn subtract_u32(&mut self, value: u32) -> &mut Self {
        self.subtract_number(&Self::from_u64(value as u64))
    }

    pub fn compare_to(&self, other: &MutableNumber) -> Ordering {
        self.limb_count.cmp(&other.limb_count).then_with(|| {
            self.limbs[..self.limb_count]
                .iter()
                .rev()
                .cmp(other.limbs[..other.limb_count].iter().rev())
        })
    }

    pub fn compare_to_u32(&self, value: u32) -> Ordering {
        self.compare_to(&Self::from_u64(value as u64))
    }
}
