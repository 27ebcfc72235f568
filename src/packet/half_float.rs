//! # Half-Float Codec
//!
//! Conversion between `f32` and IEEE-754 binary16 bit patterns, used to
//! shrink each control channel to 16 bits on the wire.
//!
//! Both directions work purely on bit patterns (`to_bits` / `from_bits`),
//! never through numeric casts.
//!
//! **Layout**: 1 sign bit, 5 exponent bits (bias 15), 10 mantissa bits.

/// Difference between the single (127) and half (15) exponent biases
const EXPONENT_REBIAS: u32 = 112;

/// Rounding bias added before discarding the low 13 mantissa bits
const ROUNDING_BIAS: u32 = 0x0000_1000;

/// Pattern every overflowing input saturates to (sign bit applied separately)
pub const HALF_SATURATED: u16 = 0x7FFF;

/// Largest finite half-float value (65504.0)
pub const HALF_MAX_FINITE: u16 = 0x7BFF;

/// Convert a half-float bit pattern to `f32`
///
/// Exponent 31 is not special-cased: it is re-biased like any other normal
/// exponent, so `0x7C00` decodes to `65536.0` rather than infinity.
///
/// # Examples
///
/// ```
/// use airbit_remote::packet::half_float::half_to_f32;
///
/// assert_eq!(half_to_f32(0x3C00), 1.0);
/// assert_eq!(half_to_f32(0xD1A0), -45.0);
/// ```
pub fn half_to_f32(half: u16) -> f32 {
    let half = half as u32;
    let sign = (half & 0x8000) << 16;
    let exponent = (half & 0x7C00) >> 10;
    let mantissa = (half & 0x03FF) << 13;

    let bits = if exponent != 0 {
        ((exponent + EXPONENT_REBIAS) << 23) | mantissa
    } else if mantissa != 0 {
        // Subnormal half: promote to a normal single using the bit width
        // of the mantissa. `width` is the biased exponent `mantissa` would
        // have as an f32.
        let width = 158 - mantissa.leading_zeros();
        ((width - 37) << 23) | ((mantissa << (150 - width)) & 0x007F_E000)
    } else {
        0
    };

    f32::from_bits(sign | bits)
}

/// Convert an `f32` to a half-float bit pattern
///
/// Rounds to nearest on the discarded bits. Values too small for a half
/// subnormal flush to signed zero; values whose exponent exceeds the half
/// range saturate to `0x7FFF` with the sign preserved.
///
/// # Examples
///
/// ```
/// use airbit_remote::packet::half_float::f32_to_half;
///
/// assert_eq!(f32_to_half(1.0), 0x3C00);
/// assert_eq!(f32_to_half(100.0), 0x5640);
/// ```
pub fn f32_to_half(value: f32) -> u16 {
    let bits = value.to_bits().wrapping_add(ROUNDING_BIAS);
    let exponent = (bits & 0x7F80_0000) >> 23;
    let mantissa = bits & 0x007F_FFFF;

    let mut half = (bits & 0x8000_0000) >> 16;

    if exponent > EXPONENT_REBIAS {
        half |= (((exponent - EXPONENT_REBIAS) << 10) & 0x7C00) | (mantissa >> 13);
    } else if exponent > 101 {
        half |= (((0x007F_F000 + mantissa) >> (125 - exponent)) + 1) >> 1;
    }

    if exponent > 143 {
        half |= HALF_SATURATED as u32;
    }

    half as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Largest relative error of a round-trip for normal halves (2^-11)
    const HALF_EPSILON: f32 = 1.0 / 2048.0;

    #[test]
    fn test_zero() {
        assert_eq!(f32_to_half(0.0), 0x0000);
        assert_eq!(half_to_f32(0x0000), 0.0);
        assert!(half_to_f32(0x0000).is_sign_positive());
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        let half = f32_to_half(-0.0);
        assert_eq!(half, 0x8000);

        let back = half_to_f32(half);
        assert_eq!(back, 0.0);
        assert!(back.is_sign_negative());
    }

    #[test]
    fn test_exactly_representable_values() {
        for (value, bits) in [
            (1.0f32, 0x3C00u16),
            (0.5, 0x3800),
            (-45.0, 0xD1A0),
            (45.0, 0x51A0),
            (100.0, 0x5640),
            (50.0, 0x5240),
            (-10.0, 0xC900),
            (20.0, 0x4D00),
            (5.0, 0x4500),
        ] {
            assert_eq!(f32_to_half(value), bits, "encoding {}", value);
            assert_eq!(half_to_f32(bits), value, "decoding 0x{:04X}", bits);
        }
    }

    #[test]
    fn test_round_trip_within_half_precision() {
        for value in [0.1f32, -0.3, 3.14159, 12.345, -33.3, 99.99, 1234.5, -0.007] {
            let back = half_to_f32(f32_to_half(value));
            let error = ((back - value) / value).abs();
            assert!(
                error <= HALF_EPSILON,
                "{} came back as {} (relative error {})",
                value,
                back,
                error
            );
        }
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 0.1 sits between 0x2E66 and 0x2E67, closer to the former
        assert_eq!(f32_to_half(0.1), 0x2E66);

        // 1 + 2^-11 is exactly halfway between 1.0 and the next half; the
        // bias rounds it up
        assert_eq!(f32_to_half(1.0 + 1.0 / 2048.0), 0x3C01);
    }

    #[test]
    fn test_smallest_normal() {
        let smallest_normal = f32::from_bits(113 << 23); // 2^-14
        assert_eq!(f32_to_half(smallest_normal), 0x0400);
        assert_eq!(half_to_f32(0x0400), smallest_normal);
    }

    #[test]
    fn test_smallest_subnormal() {
        let smallest = f32::from_bits(103 << 23); // 2^-24
        assert_eq!(f32_to_half(smallest), 0x0001);
        assert_eq!(half_to_f32(0x0001), smallest);
        assert_eq!(half_to_f32(0x8001), -smallest);
    }

    #[test]
    fn test_largest_subnormal() {
        let largest = 1023.0 * f32::from_bits(103 << 23); // 1023 * 2^-24
        assert_eq!(half_to_f32(0x03FF), largest);
        assert_eq!(f32_to_half(largest), 0x03FF);
    }

    #[test]
    fn test_subnormal_boundary() {
        // 2^-25 is halfway to the smallest subnormal and rounds up
        assert_eq!(f32_to_half(f32::from_bits(102 << 23)), 0x0001);

        // 2^-26 flushes to zero, keeping the sign
        assert_eq!(f32_to_half(f32::from_bits(101 << 23)), 0x0000);
        assert_eq!(f32_to_half(-f32::from_bits(101 << 23)), 0x8000);
    }

    #[test]
    fn test_largest_finite() {
        assert_eq!(f32_to_half(65504.0), HALF_MAX_FINITE);
        assert_eq!(half_to_f32(HALF_MAX_FINITE), 65504.0);
        assert_eq!(f32_to_half(-65504.0), 0x8000 | HALF_MAX_FINITE);
    }

    #[test]
    fn test_exponent_143_produces_infinity_pattern() {
        // 65520 rounds past the largest finite half but its exponent is
        // still 143, so it is not caught by saturation
        assert_eq!(f32_to_half(65520.0), 0x7C00);
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(f32_to_half(1.0e6), 0x7FFF);
        assert_eq!(f32_to_half(-1.0e6), 0xFFFF);
        assert_eq!(f32_to_half(f32::INFINITY), 0x7FFF);
        assert_eq!(f32_to_half(f32::NEG_INFINITY), 0xFFFF);
    }

    #[test]
    fn test_exponent_31_decodes_as_finite() {
        assert_eq!(half_to_f32(0x7C00), 65536.0);
        assert_eq!(half_to_f32(0x7FFF), 131008.0);
        assert_eq!(half_to_f32(0xFFFF), -131008.0);
    }

    #[test]
    fn test_nan_behaviour_is_pinned_not_guaranteed() {
        // NaN handling is not an IEEE conversion: it lands on the saturated
        // pattern. This only pins the current behaviour.
        assert_eq!(f32_to_half(f32::NAN), 0x7FFF);
    }

    #[test]
    fn test_all_finite_halves_round_trip_exactly() {
        for half in 0u16..=0xFFFF {
            let exponent = (half >> 10) & 0x1F;
            if exponent == 0x1F {
                continue;
            }
            let value = half_to_f32(half);
            assert_eq!(f32_to_half(value), half, "0x{:04X} -> {}", half, value);
        }
    }
}
