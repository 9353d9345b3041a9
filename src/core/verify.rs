//! Verification metrics for radar rainfall estimates against gage references.
//!
//! All metrics take paired reference and estimate slices and return a scalar.

use crate::types::{RadarError, RadarResult};

fn check_pairs(reference: &[f64], estimate: &[f64]) -> RadarResult<()> {
    if reference.is_empty() {
        return Err(RadarError::InvalidInput(
            "verification requires at least one sample pair".to_string(),
        ));
    }
    if reference.len() != estimate.len() {
        return Err(RadarError::InvalidInput(format!(
            "reference and estimate lengths differ: {} vs {}",
            reference.len(),
            estimate.len()
        )));
    }
    Ok(())
}

/// Mean error (bias). Positive means the estimate runs high.
pub fn mean_error(reference: &[f64], estimate: &[f64]) -> RadarResult<f64> {
    check_pairs(reference, estimate)?;
    let n = reference.len() as f64;
    Ok(reference
        .iter()
        .zip(estimate)
        .map(|(r, e)| e - r)
        .sum::<f64>()
        / n)
}

/// Mean Absolute Error. Range: [0, inf), 0 = perfect.
pub fn mae(reference: &[f64], estimate: &[f64]) -> RadarResult<f64> {
    check_pairs(reference, estimate)?;
    let n = reference.len() as f64;
    Ok(reference
        .iter()
        .zip(estimate)
        .map(|(r, e)| (e - r).abs())
        .sum::<f64>()
        / n)
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(reference: &[f64], estimate: &[f64]) -> RadarResult<f64> {
    check_pairs(reference, estimate)?;
    let n = reference.len() as f64;
    let mse = reference
        .iter()
        .zip(estimate)
        .map(|(r, e)| (e - r).powi(2))
        .sum::<f64>()
        / n;
    Ok(mse.sqrt())
}

/// Pearson correlation coefficient. Returns 0 when either series is constant.
pub fn pearson_corr(reference: &[f64], estimate: &[f64]) -> RadarResult<f64> {
    check_pairs(reference, estimate)?;
    let n = reference.len() as f64;
    let mean_r: f64 = reference.iter().sum::<f64>() / n;
    let mean_e: f64 = estimate.iter().sum::<f64>() / n;
    let std_r = (reference.iter().map(|r| (r - mean_r).powi(2)).sum::<f64>() / n).sqrt();
    let std_e = (estimate.iter().map(|e| (e - mean_e).powi(2)).sum::<f64>() / n).sqrt();

    if std_r == 0.0 || std_e == 0.0 {
        return Ok(0.0);
    }
    Ok(reference
        .iter()
        .zip(estimate)
        .map(|(r, e)| (r - mean_r) * (e - mean_e))
        .sum::<f64>()
        / (n * std_r * std_e))
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect; negative
/// infinity when the reference is constant.
pub fn nash_sutcliffe(reference: &[f64], estimate: &[f64]) -> RadarResult<f64> {
    check_pairs(reference, estimate)?;
    let n = reference.len() as f64;
    let mean_r: f64 = reference.iter().sum::<f64>() / n;
    let numerator: f64 = reference
        .iter()
        .zip(estimate)
        .map(|(r, e)| (r - e).powi(2))
        .sum();
    let denominator: f64 = reference.iter().map(|r| (r - mean_r).powi(2)).sum();
    if denominator == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(1.0 - numerator / denominator)
}
