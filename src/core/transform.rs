use crate::types::{RadarError, RadarResult, SweepGrid};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Floor in dB assigned to non-positive linear values
pub const MIN_DECIBEL: f64 = -50.0;

/// Convert a logarithmic dBZ value to linear reflectivity.
pub fn idecibel<T: Float>(dbz: T) -> T {
    let ten = T::from(10.0).unwrap();
    ten.powf(dbz / ten)
}

/// Convert linear reflectivity to dBZ, flooring non-positive values.
pub fn decibel<T: Float>(z: T) -> T {
    let ten = T::from(10.0).unwrap();
    if z > T::zero() {
        ten * z.log10()
    } else {
        T::from(MIN_DECIBEL).unwrap()
    }
}

/// dBZ to linear reflectivity over a whole sweep.
pub fn idecibel_sweep(sweep: &SweepGrid) -> SweepGrid {
    sweep.mapv(idecibel)
}

/// Linear reflectivity to dBZ over a whole sweep.
pub fn decibel_sweep(sweep: &SweepGrid) -> SweepGrid {
    sweep.mapv(decibel)
}

/// Z-R power-law coefficients, z = a * r^b.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZrParams {
    pub a: f64,
    pub b: f64,
}

impl Default for ZrParams {
    fn default() -> Self {
        // Marshall-Palmer
        Self { a: 200.0, b: 1.6 }
    }
}

impl ZrParams {
    pub fn validate(&self) -> RadarResult<()> {
        if !self.a.is_finite() || self.a <= 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "Z-R coefficient a must be positive and finite, got {}",
                self.a
            )));
        }
        if !self.b.is_finite() || self.b <= 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "Z-R exponent b must be positive and finite, got {}",
                self.b
            )));
        }
        Ok(())
    }
}

/// Linear reflectivity to rain rate in mm/h; non-positive Z maps to zero.
pub fn z_to_rainrate(z: f64, params: &ZrParams) -> f64 {
    if z > 0.0 {
        (z / params.a).powf(1.0 / params.b)
    } else {
        0.0
    }
}

/// Rain rate in mm/h back to linear reflectivity.
pub fn rainrate_to_z(rate: f64, params: &ZrParams) -> f64 {
    if rate > 0.0 {
        params.a * rate.powf(params.b)
    } else {
        0.0
    }
}

/// Z-R conversion over a whole sweep.
pub fn z_to_rainrate_sweep(sweep: &SweepGrid, params: &ZrParams) -> RadarResult<SweepGrid> {
    params.validate()?;
    log::debug!(
        "Converting {}x{} sweep to rain rate with Z-R a={} b={}",
        sweep.nrows(),
        sweep.ncols(),
        params.a,
        params.b
    );
    Ok(sweep.mapv(|z| z_to_rainrate(z, params)))
}

/// Accumulated depth in mm for a rain rate held over an interval.
pub fn rainrate_to_depth(rate_mm_h: f64, interval_s: f64) -> RadarResult<f64> {
    if !interval_s.is_finite() || interval_s <= 0.0 {
        return Err(RadarError::InvalidConfig(format!(
            "accumulation interval must be positive, got {} s",
            interval_s
        )));
    }
    Ok(rate_mm_h * interval_s / 3600.0)
}

/// Depth accumulation over a whole sweep of rain rates.
pub fn rainrate_to_depth_sweep(rates: &SweepGrid, interval_s: f64) -> RadarResult<SweepGrid> {
    if !interval_s.is_finite() || interval_s <= 0.0 {
        return Err(RadarError::InvalidConfig(format!(
            "accumulation interval must be positive, got {} s",
            interval_s
        )));
    }
    Ok(rates.mapv(|r| r * interval_s / 3600.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_decibel_known_values() {
        assert_relative_eq!(decibel(100.0), 20.0, epsilon = 1e-10);
        assert_relative_eq!(decibel(1.0), 0.0, epsilon = 1e-10);
        assert_relative_eq!(idecibel(20.0), 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_decibel_floors_non_positive() {
        assert_relative_eq!(decibel(0.0), MIN_DECIBEL);
        assert_relative_eq!(decibel(-3.0), MIN_DECIBEL);
    }

    #[test]
    fn test_decibel_round_trip() {
        for &dbz in &[-20.0, 0.0, 15.5, 35.0, 59.9] {
            assert_relative_eq!(decibel(idecibel(dbz)), dbz, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_decibel_works_in_single_precision() {
        let z: f32 = idecibel(30.0_f32);
        assert_relative_eq!(z, 1000.0, epsilon = 1e-2);
    }

    #[test]
    fn test_marshall_palmer_known_values() {
        let params = ZrParams::default();
        // z = 200 * 1^1.6
        assert_relative_eq!(z_to_rainrate(200.0, &params), 1.0, epsilon = 1e-10);
        assert_relative_eq!(rainrate_to_z(1.0, &params), 200.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zr_round_trip() {
        let params = ZrParams::default();
        for &rate in &[0.1, 1.0, 5.0, 30.0, 110.0] {
            let z = rainrate_to_z(rate, &params);
            assert_relative_eq!(z_to_rainrate(z, &params), rate, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_reflectivity_gives_zero_rain() {
        let params = ZrParams::default();
        assert_eq!(z_to_rainrate(0.0, &params), 0.0);
    }

    #[test]
    fn test_zr_sweep_rejects_bad_params() {
        let sweep = arr2(&[[100.0, 200.0]]);
        let bad = ZrParams { a: 0.0, b: 1.6 };
        assert!(z_to_rainrate_sweep(&sweep, &bad).is_err());
    }

    #[test]
    fn test_depth_accumulation() {
        // 5 mm/h over one hour is 5 mm; over 5 minutes it is 5/12 mm.
        assert_relative_eq!(rainrate_to_depth(5.0, 3600.0).unwrap(), 5.0);
        assert_relative_eq!(
            rainrate_to_depth(5.0, 300.0).unwrap(),
            5.0 / 12.0,
            epsilon = 1e-10
        );
        assert!(rainrate_to_depth(5.0, 0.0).is_err());
    }

    #[test]
    fn test_depth_sweep() {
        let rates = arr2(&[[6.0, 12.0], [0.0, 3.0]]);
        let depth = rainrate_to_depth_sweep(&rates, 600.0).unwrap();
        assert_relative_eq!(depth[[0, 0]], 1.0, epsilon = 1e-10);
        assert_relative_eq!(depth[[0, 1]], 2.0, epsilon = 1e-10);
        assert_relative_eq!(depth[[1, 1]], 0.5, epsilon = 1e-10);
    }
}
