use core::cmp::Ordering;
use core::fmt;

use crate::{BigInteger, MutableNumber};

/// Signed integer cursor that stays allocation-free while its value fits an
/// `i32`.
///
/// The rounding engine keeps exponents, precisions and digit counts in
/// `FastInteger`s and updates them in place. On overflow the value is promoted:
/// positive results move to a [`MutableNumber`], anything that needs a sign or
/// an arbitrary magnitude moves to a [`BigInteger`]. Promotion never reverses,
/// except through [`FastInteger::mod_int`], whose result always fits a machine
/// word.
///
/// Mutating methods return `&mut Self` so calls can be chained. Use `clone()`
/// where two logical values must not share one cursor.
#[derive(Clone)]
pub struct FastInteger {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Small(i32),
    Medium(MutableNumber),
    Large(BigInteger),
}

impl FastInteger {
    pub fn from_i32(value: i32) -> Self {
        Self {
            repr: Repr::Small(value),
        }
    }

    pub fn from_usize(value: usize) -> Self {
        match i32::try_from(value) {
            Ok(v) => Self::from_i32(v),
            Err(_) => Self::from_big(&BigInteger::from_u64(value as u64)),
        }
    }

    pub fn from_big(value: &BigInteger) -> Self {
        let repr = match value.to_i32() {
            Some(v) => Repr::Small(v),
            None => Repr::Large(value.clone()),
        };
        Self { repr }
    }

    pub fn to_big_integer(&self) -> BigInteger {
        match &self.repr {
            Repr::Small(v) => BigInteger::from_i32(*v),
            Repr::Medium(m) => m.to_big_integer(),
            Repr::Large(b) => b.clone(),
        }
    }

    fn set_large(&mut self, value: BigInteger) {
        if !matches!(self.repr, Repr::Large(_)) {
            log::trace!("promoting FastInteger {} to BigInteger", self);
        }
        self.repr = Repr::Large(value);
    }

    pub fn can_fit_in_i32(&self) -> bool {
        match &self.repr {
            Repr::Small(_) => true,
            Repr::Medium(m) => m.can_fit_in_i32(),
            Repr::Large(b) => b.can_fit_in_i32(),
        }
    }

    /// The value as `i32`.
    ///
    /// # Panics
    /// Panics if the value does not fit; check [`Self::can_fit_in_i32`] first.
    pub fn as_i32(&self) -> i32 {
        match &self.repr {
            Repr::Small(v) => *v,
            Repr::Medium(m) => m.to_i32().expect("FastInteger value does not fit in i32"),
            Repr::Large(b) => b.to_i32().expect("FastInteger value does not fit in i32"),
        }
    }

    pub fn signum(&self) -> i32 {
        match &self.repr {
            Repr::Small(v) => v.signum(),
            Repr::Medium(m) => !m.is_zero() as i32,
            Repr::Large(b) => b.signum(),
        }
    }

    #[inline]
    pub fn is_value_zero(&self) -> bool {
        self.signum() == 0
    }

    // ========================================================================
    // In-place arithmetic
    // ========================================================================

    pub fn add(&mut self, other: &FastInteger) -> &mut Self {
        if let (Repr::Small(a), Repr::Small(b)) = (&self.repr, &other.repr) {
            let (a, b) = (*a, *b);
            self.add_small(a, b);
            return self;
        }
        if let Repr::Medium(m) = &mut self.repr {
            match &other.repr {
                Repr::Small(b) if *b >= 0 => {
                    m.add(*b as u32);
                    return self;
                }
                Repr::Small(b) if m.compare_to_u32(b.unsigned_abs()) != Ordering::Less => {
                    m.subtract_u32(b.unsigned_abs());
                    return self;
                }
                Repr::Medium(o) => {
                    m.add_number(o);
                    return self;
                }
                _ => {}
            }
        }
        let sum = self.to_big_integer().add(&other.to_big_integer());
        self.set_large(sum);
        self
    }

    fn add_small(&mut self, a: i32, b: i32) {
        match a.checked_add(b) {
            Some(v) => self.repr = Repr::Small(v),
            None if a > 0 => {
                let mut m = MutableNumber::from_u64(a as u64);
                m.add(b as u32);
                log::trace!("promoting FastInteger {} to MutableNumber", a);
                self.repr = Repr::Medium(m);
            }
            None => self.set_large(BigInteger::from_i64(a as i64 + b as i64)),
        }
    }

    pub fn subtract(&mut self, other: &FastInteger) -> &mut Self {
        if let (Repr::Small(a), Repr::Small(b)) = (&self.repr, &other.repr) {
            let (a, b) = (*a, *b);
            match a.checked_sub(b) {
                Some(v) => self.repr = Repr::Small(v),
                None if a >= 0 => {
                    // b is negative here, so the difference is a positive overflow.
                    let mut m = MutableNumber::from_u64(a as u64);
                    m.add(b.unsigned_abs());
                    log::trace!("promoting FastInteger {} to MutableNumber", a);
                    self.repr = Repr::Medium(m);
                }
                None => self.set_large(BigInteger::from_i64(a as i64 - b as i64)),
            }
            return self;
        }
        if let (Repr::Medium(m), Repr::Medium(o)) = (&mut self.repr, &other.repr) {
            if m.compare_to(o) != Ordering::Less {
                m.subtract_number(o);
                return self;
            }
        }
        let mut negated = other.clone();
        negated.negate();
        self.add(&negated)
    }

    pub fn add_int(&mut self, value: i32) -> &mut Self {
        self.add(&FastInteger::from_i32(value))
    }

    pub fn subtract_int(&mut self, value: i32) -> &mut Self {
        self.subtract(&FastInteger::from_i32(value))
    }

    pub fn add_big(&mut self, value: &BigInteger) -> &mut Self {
        self.add(&FastInteger::from_big(value))
    }

    pub fn subtract_big(&mut self, value: &BigInteger) -> &mut Self {
        self.subtract(&FastInteger::from_big(value))
    }

    pub fn increment(&mut self) -> &mut Self {
        self.add_int(1)
    }

    pub fn decrement(&mut self) -> &mut Self {
        self.subtract_int(1)
    }

    pub fn multiply(&mut self, factor: i32) -> &mut Self {
        match &mut self.repr {
            Repr::Small(a) => match a.checked_mul(factor) {
                Some(v) => *a = v,
                None if (*a > 0) == (factor > 0) => {
                    let mut m = MutableNumber::from_u64(a.unsigned_abs() as u64);
                    m.multiply(factor.unsigned_abs());
                    log::trace!("promoting FastInteger {} to MutableNumber", a);
                    self.repr = Repr::Medium(m);
                }
                None => {
                    let product = BigInteger::from_i64(*a as i64 * factor as i64);
                    self.set_large(product);
                }
            },
            Repr::Medium(m) if factor >= 0 => {
                m.multiply(factor as u32);
            }
            _ => {
                let product = self.to_big_integer().multiply(&BigInteger::from_i32(factor));
                self.set_large(product);
            }
        }
        self
    }

    pub fn negate(&mut self) -> &mut Self {
        match &mut self.repr {
            Repr::Small(v) if *v != i32::MIN => *v = -*v,
            _ => {
                let negated = self.to_big_integer().negate();
                self.set_large(negated);
            }
        }
        self
    }

    /// Truncating division by a small divisor.
    ///
    /// # Panics
    /// Panics if `divisor` is zero.
    pub fn divide(&mut self, divisor: i32) -> &mut Self {
        assert!(divisor != 0, "attempt to divide by zero");
        match &mut self.repr {
            Repr::Small(v) if !(*v == i32::MIN && divisor == -1) => *v /= divisor,
            _ => {
                let quotient = self
                    .to_big_integer()
                    .div_rem(&BigInteger::from_i32(divisor))
                    .map(|(q, _)| q)
                    .unwrap_or_default();
                self.set_large(quotient);
            }
        }
        self
    }

    /// Replaces the value with its truncating remainder modulo `divisor`. The
    /// result always fits, so this returns to the small representation.
    ///
    /// # Panics
    /// Panics if `divisor` is zero.
    pub fn mod_int(&mut self, divisor: i32) -> &mut Self {
        assert!(divisor != 0, "attempt to calculate the remainder with a divisor of zero");
        let rem = match &self.repr {
            Repr::Small(v) => v.wrapping_rem(divisor),
            _ => self
                .to_big_integer()
                .remainder(&BigInteger::from_i32(divisor))
                .ok()
                .and_then(|r| r.to_i32())
                .unwrap_or(0),
        };
        self.repr = Repr::Small(rem);
        self
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    pub fn compare_to(&self, other: &FastInteger) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Small(a), Repr::Small(b)) => a.cmp(b),
            (Repr::Medium(a), Repr::Medium(b)) => a.compare_to(b),
            _ => self.to_big_integer().cmp(&other.to_big_integer()),
        }
    }

    pub fn compare_to_int(&self, value: i32) -> Ordering {
        match &self.repr {
            Repr::Small(a) => a.cmp(&value),
            // Medium values are non-negative and exceed i32::MAX unless they fit.
            Repr::Medium(m) => match m.to_i32() {
                Some(v) => v.cmp(&value),
                None => Ordering::Greater,
            },
            Repr::Large(b) => b.cmp(&BigInteger::from_i32(value)),
        }
    }

    pub fn compare_to_big(&self, value: &BigInteger) -> Ordering {
        self.to_big_integer().cmp(value)
    }

    pub fn min(a: &FastInteger, b: &FastInteger) -> FastInteger {
        if a.compare_to(b) == Ordering::Greater {
            b.clone()
        } else {
            a.clone()
        }
    }

    pub fn max(a: &FastInteger, b: &FastInteger) -> FastInteger {
        if a.compare_to(b) == Ordering::Less {
            b.clone()
        } else {
            a.clone()
        }
    }
}

impl PartialEq for FastInteger {
    fn eq(&self, other: &Self) -> bool {
        self.compare_to(other) == Ordering::Equal
    }
}

impl Eq for FastInteger {}

impl PartialOrd for FastInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FastInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

impl fmt::Display for FastInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Small(v) => fmt::Display::fmt(v, f),
            _ => fmt::Display::fmt(&self.to_big_integer(), f),
        }
    }
}

impl fmt::Debug for FastInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.repr {
            Repr::Small(_) => "Small",
            Repr::Medium(_) => "Medium",
            Repr::Large(_) => "Large",
        };
        write!(f, "FastInteger::{}({})", kind, self)
    }
}
