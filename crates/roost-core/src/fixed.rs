use fixed::types::I32F32;

/// Q32.32 fixed-point: used for speed multipliers so duration math is
/// deterministic across platforms.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for configuration, never in the tick loop.
///
/// Out-of-range values saturate and NaN becomes zero.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::checked_from_num(v).unwrap_or(if v > 0.0 {
        Fixed64::MAX
    } else {
        Fixed64::MIN
    })
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Divide a whole tick count by a speed multiplier, flooring the result.
///
/// A non-positive multiplier is treated as 1 so a bad configuration value
/// never stalls a machine forever. The result is at least 1 whenever
/// `ticks > 0`.
pub fn scale_ticks(ticks: u32, speed: Fixed64) -> u32 {
    if ticks == 0 {
        return 0;
    }
    let speed = if speed <= Fixed64::ZERO {
        Fixed64::ONE
    } else {
        speed
    };
    let scaled = Fixed64::from_num(ticks)
        .checked_div(speed)
        .unwrap_or(Fixed64::MAX);
    let whole: i64 = scaled.to_num();
    whole.clamp(1, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn out_of_range_values_saturate() {
        assert_eq!(f64_to_fixed64(1e12), Fixed64::MAX);
        assert_eq!(f64_to_fixed64(-1e12), Fixed64::MIN);
        assert_eq!(f64_to_fixed64(f64::INFINITY), Fixed64::MAX);
        assert_eq!(f64_to_fixed64(f64::NEG_INFINITY), Fixed64::MIN);
        assert_eq!(f64_to_fixed64(f64::NAN), Fixed64::ZERO);
    }

    #[test]
    fn scale_ticks_with_saturated_speed() {
        assert_eq!(scale_ticks(6000, f64_to_fixed64(1e12)), 1);
    }

    #[test]
    fn scale_ticks_by_double_speed() {
        assert_eq!(scale_ticks(6000, f64_to_fixed64(2.0)), 3000);
    }

    #[test]
    fn scale_ticks_floors() {
        assert_eq!(scale_ticks(10, f64_to_fixed64(3.0)), 3);
    }

    #[test]
    fn scale_ticks_never_below_one() {
        assert_eq!(scale_ticks(1, f64_to_fixed64(50.0)), 1);
        assert_eq!(scale_ticks(0, f64_to_fixed64(1.0)), 0);
    }

    #[test]
    fn scale_ticks_ignores_non_positive_speed() {
        assert_eq!(scale_ticks(400, Fixed64::ZERO), 400);
        assert_eq!(scale_ticks(400, f64_to_fixed64(-2.0)), 400);
    }
}
