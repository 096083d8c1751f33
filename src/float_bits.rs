use crate::DecimalError;

/// A finite float as `(-1)^negative × mantissa × 2^exponent`.
///
/// Decomposition strips trailing zero bits, so a nonzero mantissa is odd and
/// zero is always `(negative, 0, 0)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FloatParts {
    pub negative: bool,
    pub mantissa: u64,
    pub exponent: i32,
}

/// Bit layout of an IEEE 754 binary interchange format.
#[derive(Copy, Clone)]
struct Layout {
    fraction_bits: u32,
    exponent_bits: u32,
}

const BINARY64: Layout = Layout {
    fraction_bits: 52,
    exponent_bits: 11,
};

const BINARY32: Layout = Layout {
    fraction_bits: 23,
    exponent_bits: 8,
};

impl Layout {
    const fn bias(self) -> i32 {
        (1 << (self.exponent_bits - 1)) - 1
    }

    const fn max_biased(self) -> u64 {
        (1 << self.exponent_bits) - 1
    }

    const fn fraction_mask(self) -> u64 {
        (1 << self.fraction_bits) - 1
    }

    /// Exponent of the least significant mantissa bit for subnormals and the
    /// smallest normal binade.
    const fn min_exponent(self) -> i32 {
        1 - self.bias() - self.fraction_bits as i32
    }

    fn decompose(self, bits: u64) -> crate::Result<FloatParts> {
        let negative = (bits >> (self.fraction_bits + self.exponent_bits)) & 1 == 1;
        let biased = (bits >> self.fraction_bits) & self.max_biased();
        let fraction = bits & self.fraction_mask();
        if biased == self.max_biased() {
            return Err(DecimalError::NotFinite);
        }
        let (mut mantissa, mut exponent) = if biased == 0 {
            (fraction, self.min_exponent())
        } else {
            (
                fraction | (1 << self.fraction_bits),
                self.min_exponent() + biased as i32 - 1,
            )
        };
        if mantissa == 0 {
            return Ok(FloatParts {
                negative,
                mantissa: 0,
                exponent: 0,
            });
        }
        let zeros = mantissa.trailing_zeros();
        mantissa >>= zeros;
        exponent += zeros as i32;
        Ok(FloatParts {
            negative,
            mantissa,
            exponent,
        })
    }

    /// Packs parts already rounded to the format's precision and exponent
    /// range. Exponents past the largest binade give infinity.
    fn compose(self, parts: FloatParts) -> u64 {
        let sign = (parts.negative as u64) << (self.fraction_bits + self.exponent_bits);
        if parts.mantissa == 0 {
            return sign;
        }
        let width = 64 - parts.mantissa.leading_zeros();
        let room = (self.fraction_bits + 1).saturating_sub(width) as i32;
        // Negative when the exponent sits below the subnormal range; the
        // bits shifted out must then be zero.
        let shift = room.min(parts.exponent - self.min_exponent());
        let mantissa = if shift >= 0 {
            parts.mantissa << shift
        } else {
            parts.mantissa.checked_shr(shift.unsigned_abs()).unwrap_or(0)
        };
        let exponent = parts.exponent - shift;
        if mantissa >> self.fraction_bits == 0 {
            return sign | mantissa;
        }
        let biased = (exponent - self.min_exponent() + 1) as u64;
        if biased >= self.max_biased() {
            return sign | (self.max_biased() << self.fraction_bits);
        }
        sign | (biased << self.fraction_bits) | (mantissa & self.fraction_mask())
    }
}

/// # Errors
/// Returns `DecimalError::NotFinite` for NaN and infinities.
pub(crate) fn decompose_f64(value: f64) -> crate::Result<FloatParts> {
    BINARY64.decompose(value.to_bits())
}

pub(crate) fn compose_f64(parts: FloatParts) -> f64 {
    f64::from_bits(BINARY64.compose(parts))
}

/// # Errors
/// Returns `DecimalError::NotFinite` for NaN and infinities.
pub(crate) fn decompose_f32(value: f32) -> crate::Result<FloatParts> {
    BINARY32.decompose(value.to_bits() as u64)
}

pub(crate) fn compose_f32(parts: FloatParts) -> f32 {
    f32::from_bits(BINARY32.compose(parts) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(negative: bool, mantissa: u64, exponent: i32) -> FloatParts {
        FloatParts {
            negative,
            mantissa,
            exponent,
        }
    }

    #[test]
    fn test_decompose_f64() {
        assert_eq!(decompose_f64(1.0).unwrap(), parts(false, 1, 0));
        assert_eq!(decompose_f64(-6.0).unwrap(), parts(true, 3, 1));
        assert_eq!(decompose_f64(0.375).unwrap(), parts(false, 3, -3));
        assert_eq!(decompose_f64(-0.0).unwrap(), parts(true, 0, 0));
        assert_eq!(decompose_f64(5e-324).unwrap(), parts(false, 1, -1074));
        assert_eq!(
            decompose_f64(f64::MAX).unwrap(),
            parts(false, (1 << 53) - 1, 971)
        );
        assert_eq!(decompose_f64(f64::NAN), Err(DecimalError::NotFinite));
        assert_eq!(decompose_f64(f64::NEG_INFINITY), Err(DecimalError::NotFinite));
    }

    #[test]
    fn test_decompose_f32() {
        assert_eq!(decompose_f32(1.5).unwrap(), parts(false, 3, -1));
        assert_eq!(decompose_f32(f32::MIN_POSITIVE).unwrap(), parts(false, 1, -126));
        assert_eq!(decompose_f32(1e-45).unwrap(), parts(false, 1, -149));
        assert_eq!(decompose_f32(f32::INFINITY), Err(DecimalError::NotFinite));
    }

    #[test]
    fn test_compose_normalizes() {
        assert_eq!(compose_f64(parts(false, 1, 0)), 1.0);
        assert_eq!(compose_f64(parts(true, 3, 1)), -6.0);
        assert_eq!(compose_f64(parts(false, 1, -1074)), 5e-324);
        assert_eq!(compose_f64(parts(false, 1, -1022)), f64::MIN_POSITIVE);
        assert_eq!(compose_f64(parts(false, 4, -1076)), 5e-324);
        assert_eq!(compose_f64(parts(false, 1, 1024)), f64::INFINITY);
        assert_eq!(compose_f64(parts(true, 0, 0)).to_bits(), (-0.0f64).to_bits());
        assert_eq!(compose_f32(parts(false, 3, -1)), 1.5);
        assert_eq!(compose_f32(parts(true, 1, 128)), f32::NEG_INFINITY);
    }

    #[test]
    fn test_round_trip_edge_values() {
        for v in [
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
            f64::EPSILON,
            0.1,
            -123456.789,
            1e-310,
        ] {
            assert_eq!(compose_f64(decompose_f64(v).unwrap()), v);
        }
        for v in [f32::MAX, f32::MIN_POSITIVE, 0.1f32, -1e-40f32] {
            assert_eq!(compose_f32(decompose_f32(v).unwrap()), v);
        }
    }
}
