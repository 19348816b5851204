//! Vehicle emission model
//!
//! Derives the per-source emission rate and effective release height from the
//! vehicle's ground speed. Empirical fits from the reference exhaust model:
//! emissions ramp up above cruising speed, and exhaust momentum lifts the
//! plume with a hard floor of 2 m.

/// Speed above which emissions start to climb (m/s)
const HIGH_SPEED_THRESHOLD: f64 = 20.0;
/// Extra emission fraction per m/s above the threshold
const HIGH_SPEED_SLOPE: f64 = 0.05;
/// Minimum effective release height (m)
const PLUME_RISE_FLOOR: f64 = 2.0;
/// Plume rise gained per m/s of vehicle speed
const PLUME_RISE_SLOPE: f64 = 0.15;
/// Plume rise of a stationary vehicle before the floor is applied (m)
const PLUME_RISE_OFFSET: f64 = 0.5;

/// Emission rate of one vehicle (g/s).
///
/// `base_emission` is the configured rate of an idling vehicle,
/// `emission_factor` the global fleet multiplier. Monotonically
/// non-decreasing in speed: constant up to 20 m/s, then +5% per m/s.
pub fn emission_rate(speed: f64, base_emission: f64, emission_factor: f64) -> f64 {
    let speed_factor = if speed > HIGH_SPEED_THRESHOLD {
        1.0 + HIGH_SPEED_SLOPE * (speed - HIGH_SPEED_THRESHOLD)
    } else {
        1.0
    };
    base_emission * speed_factor * emission_factor
}

/// Effective release height of the exhaust plume (m).
///
/// Grows linearly with speed, never below [`PLUME_RISE_FLOOR`].
pub fn plume_rise(speed: f64) -> f64 {
    (PLUME_RISE_SLOPE * speed + PLUME_RISE_OFFSET).max(PLUME_RISE_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_emission_flat_below_threshold() {
        let base = 0.1;
        assert_relative_eq!(emission_rate(0.0, base, 1.0), base);
        assert_relative_eq!(emission_rate(10.0, base, 1.0), base);
        assert_relative_eq!(emission_rate(20.0, base, 1.0), base);
    }

    #[test]
    fn test_emission_ramps_above_threshold() {
        // 30 m/s: 1 + 0.05 * 10 = 1.5x base
        assert_relative_eq!(emission_rate(30.0, 0.1, 1.0), 0.15);
        // Global factor scales linearly
        assert_relative_eq!(emission_rate(30.0, 0.1, 2.0), 0.30);
    }

    #[test]
    fn test_emission_monotone_in_speed() {
        let mut previous = 0.0;
        for step in 0..200 {
            let speed = f64::from(step) * 0.5;
            let rate = emission_rate(speed, 0.1, 1.0);
            assert!(
                rate >= previous,
                "emission rate decreased at speed {speed}: {rate} < {previous}"
            );
            previous = rate;
        }
    }

    #[test]
    fn test_plume_rise_floor() {
        // Below ~10 m/s the linear fit sits under the floor
        assert_relative_eq!(plume_rise(0.0), 2.0);
        assert_relative_eq!(plume_rise(5.0), 2.0);
        assert_relative_eq!(plume_rise(10.0), 2.0);
        for step in 0..100 {
            let speed = f64::from(step) * 0.7;
            assert!(plume_rise(speed) >= 2.0);
        }
    }

    #[test]
    fn test_plume_rise_linear_above_floor() {
        assert_relative_eq!(plume_rise(20.0), 3.5);
        assert_relative_eq!(plume_rise(30.0), 5.0);
    }
}
