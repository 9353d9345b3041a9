use crate::types::{GateMask, RadarError, RadarResult, SweepGrid};
use ndarray::{ArrayView1, ArrayViewMut1, Axis};

/// Replace clutter-flagged gates by interpolating along each beam.
///
/// Flagged gates between two valid neighbors get the linear interpolation of
/// those neighbors by gate index; flagged runs at either end of the beam take
/// the nearest valid value. A beam with no valid gate at all is zero-filled,
/// which downstream stages read as no signal.
pub fn fill_flagged_gates(sweep: &SweepGrid, mask: &GateMask) -> RadarResult<SweepGrid> {
    if sweep.dim() != mask.dim() {
        return Err(RadarError::InvalidInput(format!(
            "clutter mask shape {:?} does not match sweep shape {:?}",
            mask.dim(),
            sweep.dim()
        )));
    }
    let (n_beams, n_gates) = sweep.dim();
    if n_beams == 0 || n_gates == 0 {
        return Err(RadarError::InvalidInput(format!(
            "sweep must contain at least one beam and one gate, got {}x{}",
            n_beams, n_gates
        )));
    }

    let flagged = mask.iter().filter(|&&f| f).count();
    log::debug!(
        "Infilling {} flagged gates over {} beams x {} gates",
        flagged,
        n_beams,
        n_gates
    );

    let mut filled = sweep.clone();
    for (beam_idx, (row, mask_row)) in filled
        .axis_iter_mut(Axis(0))
        .zip(mask.axis_iter(Axis(0)))
        .enumerate()
    {
        fill_beam(row, mask_row, beam_idx);
    }
    Ok(filled)
}

fn fill_beam(mut row: ArrayViewMut1<f64>, mask: ArrayView1<bool>, beam_idx: usize) {
    let n = row.len();

    if mask.iter().all(|&f| f) {
        log::warn!("beam {} is fully flagged, zero-filling", beam_idx);
        row.fill(0.0);
        return;
    }
    if !mask.iter().any(|&f| f) {
        return;
    }

    // Nearest valid gate at or before / at or after each position.
    let mut prev_valid: Vec<Option<usize>> = vec![None; n];
    let mut next_valid: Vec<Option<usize>> = vec![None; n];
    let mut last = None;
    for i in 0..n {
        if !mask[i] {
            last = Some(i);
        }
        prev_valid[i] = last;
    }
    last = None;
    for i in (0..n).rev() {
        if !mask[i] {
            last = Some(i);
        }
        next_valid[i] = last;
    }

    for i in 0..n {
        if !mask[i] {
            continue;
        }
        row[i] = match (prev_valid[i], next_valid[i]) {
            (Some(lo), Some(hi)) => {
                let weight = (i - lo) as f64 / (hi - lo) as f64;
                row[lo] * (1.0 - weight) + row[hi] * weight
            }
            (Some(lo), None) => row[lo],
            (None, Some(hi)) => row[hi],
            (None, None) => unreachable!("beam has at least one valid gate"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_interior_gap_is_interpolated() {
        let sweep = arr2(&[[10.0, 999.0, 999.0, 40.0]]);
        let mask = arr2(&[[false, true, true, false]]);
        let filled = fill_flagged_gates(&sweep, &mask).unwrap();
        assert_relative_eq!(filled[[0, 1]], 20.0, epsilon = 1e-10);
        assert_relative_eq!(filled[[0, 2]], 30.0, epsilon = 1e-10);
    }

    #[test]
    fn test_edge_gaps_take_nearest_valid() {
        let sweep = arr2(&[[999.0, 999.0, 12.0, 30.0, 999.0]]);
        let mask = arr2(&[[true, true, false, false, true]]);
        let filled = fill_flagged_gates(&sweep, &mask).unwrap();
        assert_relative_eq!(filled[[0, 0]], 12.0);
        assert_relative_eq!(filled[[0, 1]], 12.0);
        assert_relative_eq!(filled[[0, 4]], 30.0);
    }

    #[test]
    fn test_fully_flagged_beam_is_zero_filled() {
        let sweep = arr2(&[[5.0, 6.0], [7.0, 8.0]]);
        let mask = arr2(&[[true, true], [false, false]]);
        let filled = fill_flagged_gates(&sweep, &mask).unwrap();
        assert_eq!(filled[[0, 0]], 0.0);
        assert_eq!(filled[[0, 1]], 0.0);
        // Untouched beam passes through.
        assert_eq!(filled[[1, 0]], 7.0);
        assert_eq!(filled[[1, 1]], 8.0);
    }

    #[test]
    fn test_unflagged_sweep_passes_through() {
        let sweep = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let mask = arr2(&[[false, false], [false, false]]);
        let filled = fill_flagged_gates(&sweep, &mask).unwrap();
        assert_eq!(filled, sweep);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let sweep = arr2(&[[1.0, 2.0]]);
        let mask = arr2(&[[false, false, false]]);
        assert!(matches!(
            fill_flagged_gates(&sweep, &mask),
            Err(RadarError::InvalidInput(_))
        ));
    }
}
