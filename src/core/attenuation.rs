use crate::types::{BeamProfile, RadarError, RadarResult, Sweep, SweepGrid};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Default power-law coefficient for C-band (linear Z to one-way dB/km)
pub const DEFAULT_COEFF_A: f64 = 1.67e-4;

/// Default power-law exponent for C-band
pub const DEFAULT_EXP_B: f64 = 0.7;

/// Converts a one-way attenuation rate in dB/km and a gate spacing in meters
/// into the two-way attenuation across one gate: 1e-3 (meters to km) times 2
/// (out and back along the path).
pub const TWO_WAY_DB_PER_KM_PER_M: f64 = 2.0e-3;

/// Default clamp on cumulative two-way PIA in dB
pub const DEFAULT_MAX_PIA_DB: f64 = 20.0;

/// Gate-by-gate attenuation correction parameters.
///
/// The update rule per gate i is
/// `k_i = a * z_i^b` with `z_i = beam[i] + pia[i-1]`, then
/// `pia[i] = pia[i-1] + k_i * gate_spacing * unit_factor`.
/// The correction is additive in the caller's input unit system: with beams
/// in linear Z and the default coefficients, `k` is a one-way dB/km rate and
/// `pia` accumulates two-way dB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttenuationParams {
    /// Power-law coefficient a in k = a * z^b
    pub a: f64,
    /// Power-law exponent b
    pub b: f64,
    /// Range gate spacing in meters
    pub gate_spacing: f64,
    /// Fixed factor reconciling the attenuation-rate unit with the gate
    /// spacing unit. 2.0e-3 for dB/km rates over meter spacings, two-way.
    pub unit_factor: f64,
    /// Clamp on the specific attenuation used at each gate
    pub max_specific_attenuation: Option<f64>,
    /// Clamp on the cumulative path-integrated attenuation
    pub max_pia: Option<f64>,
}

impl Default for AttenuationParams {
    fn default() -> Self {
        Self {
            a: DEFAULT_COEFF_A,
            b: DEFAULT_EXP_B,
            gate_spacing: 1000.0,
            unit_factor: TWO_WAY_DB_PER_KM_PER_M,
            max_specific_attenuation: None,
            max_pia: Some(DEFAULT_MAX_PIA_DB),
        }
    }
}

impl AttenuationParams {
    /// Check coefficient, spacing and clamp bounds.
    pub fn validate(&self) -> RadarResult<()> {
        if !self.a.is_finite() || self.a <= 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "coefficient a must be positive and finite, got {}",
                self.a
            )));
        }
        if !self.b.is_finite() || self.b <= 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "exponent b must be positive and finite, got {}",
                self.b
            )));
        }
        if !self.gate_spacing.is_finite() || self.gate_spacing <= 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "gate spacing must be positive and finite, got {}",
                self.gate_spacing
            )));
        }
        if !self.unit_factor.is_finite() || self.unit_factor <= 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "unit factor must be positive and finite, got {}",
                self.unit_factor
            )));
        }
        if let Some(max_k) = self.max_specific_attenuation {
            if !max_k.is_finite() || max_k < 0.0 {
                return Err(RadarError::InvalidConfig(format!(
                    "max specific attenuation must be non-negative, got {}",
                    max_k
                )));
            }
        }
        if let Some(max_pia) = self.max_pia {
            if !max_pia.is_finite() || max_pia < 0.0 {
                return Err(RadarError::InvalidConfig(format!(
                    "max PIA must be non-negative, got {}",
                    max_pia
                )));
            }
        }
        Ok(())
    }
}

/// Correction result for a single beam
#[derive(Debug, Clone)]
pub struct BeamCorrection {
    /// Cumulative path-integrated attenuation per gate, non-decreasing
    pub pia: BeamProfile,
    /// Input reflectivity plus the PIA at each gate
    pub corrected: BeamProfile,
    /// Number of gates at which a stability clamp engaged
    pub clipped_gates: usize,
}

/// Correction result for a full sweep
#[derive(Debug, Clone)]
pub struct SweepCorrection {
    pub pia: SweepGrid,
    pub corrected: SweepGrid,
    /// Total clamped gates across all beams
    pub clipped_gates: usize,
}

/// Correct one beam for path-integrated attenuation.
///
/// The beam is reflectivity in linear units, ordered from the radar outward,
/// finite and non-negative (zero means no signal). The specific attenuation
/// at each gate is computed from the reflectivity already corrected by the
/// PIA of all closer gates, which is what makes the scheme recursive, and
/// also what makes it diverge without the clamps in [`AttenuationParams`].
/// Clamping is a normal outcome, reported via `clipped_gates`, never an
/// error.
pub fn correct_beam(
    beam: ArrayView1<f64>,
    params: &AttenuationParams,
) -> RadarResult<BeamCorrection> {
    params.validate()?;
    validate_beam(beam, 0)?;
    Ok(correct_beam_unchecked(beam, params))
}

/// Correct every beam of a sweep independently.
///
/// The whole sweep is validated up front; a malformed gate anywhere aborts
/// the call before any row is processed, so the output is never partial.
pub fn correct_sweep(
    sweep: &SweepGrid,
    params: &AttenuationParams,
) -> RadarResult<SweepCorrection> {
    validate_sweep(sweep, params)?;

    let (n_beams, n_gates) = sweep.dim();
    log::info!(
        "Correcting attenuation over {} beams x {} gates (sequential)",
        n_beams,
        n_gates
    );
    log::debug!("Correction parameters: {:?}", params);

    let rows: Vec<BeamCorrection> = sweep
        .axis_iter(Axis(0))
        .map(|beam| correct_beam_unchecked(beam, params))
        .collect();

    let result = assemble_sweep(rows, n_beams, n_gates);
    log::info!(
        "Attenuation correction completed, {} clamped gates",
        result.clipped_gates
    );
    Ok(result)
}

/// Row-parallel sweep correction.
///
/// Beams share no state, so each worker owns one input row and writes one
/// disjoint output row. The per-beam recursion itself stays sequential.
#[cfg(feature = "parallel")]
pub fn correct_sweep_parallel(
    sweep: &SweepGrid,
    params: &AttenuationParams,
) -> RadarResult<SweepCorrection> {
    use rayon::prelude::*;

    validate_sweep(sweep, params)?;

    let (n_beams, n_gates) = sweep.dim();
    log::info!(
        "Correcting attenuation over {} beams x {} gates (parallel)",
        n_beams,
        n_gates
    );

    let rows: Vec<BeamCorrection> = (0..n_beams)
        .into_par_iter()
        .map(|i| correct_beam_unchecked(sweep.row(i), params))
        .collect();

    let result = assemble_sweep(rows, n_beams, n_gates);
    log::info!(
        "Parallel attenuation correction completed, {} clamped gates",
        result.clipped_gates
    );
    Ok(result)
}

#[cfg(not(feature = "parallel"))]
pub fn correct_sweep_parallel(
    sweep: &SweepGrid,
    params: &AttenuationParams,
) -> RadarResult<SweepCorrection> {
    // Fallback when the parallel feature is disabled
    correct_sweep(sweep, params)
}

/// Pick the sequential or parallel path based on sweep size.
pub fn correct_sweep_auto(
    sweep: &SweepGrid,
    params: &AttenuationParams,
) -> RadarResult<SweepCorrection> {
    let (n_beams, n_gates) = sweep.dim();
    if n_beams * n_gates > 500_000 {
        correct_sweep_parallel(sweep, params)
    } else {
        correct_sweep(sweep, params)
    }
}

impl Sweep {
    /// Correct this sweep using its own gate spacing.
    pub fn correct(&self, params: &AttenuationParams) -> RadarResult<SweepCorrection> {
        let params = AttenuationParams {
            gate_spacing: self.metadata.gate_spacing_m,
            ..params.clone()
        };
        correct_sweep_auto(&self.data, &params)
    }
}

/// Left fold over the gates of one beam. Inputs are pre-validated.
fn correct_beam_unchecked(beam: ArrayView1<f64>, params: &AttenuationParams) -> BeamCorrection {
    let n = beam.len();
    let gate_step = params.gate_spacing * params.unit_factor;

    let mut pia = Array1::zeros(n);
    let mut corrected = Array1::zeros(n);
    let mut running = 0.0_f64;
    let mut clipped_gates = 0usize;

    for (i, &z_obs) in beam.iter().enumerate() {
        // Reflectivity at this gate after correction from all closer gates;
        // gate 0 has no upstream path to compensate.
        let z = z_obs + running;

        let mut k = params.a * z.powf(params.b);
        let mut clamped = false;
        if let Some(max_k) = params.max_specific_attenuation {
            if k > max_k {
                k = max_k;
                clamped = true;
            }
        }

        running += k * gate_step;
        if let Some(max_pia) = params.max_pia {
            if running > max_pia {
                running = max_pia;
                clamped = true;
            }
        }
        if clamped {
            clipped_gates += 1;
        }

        pia[i] = running;
        corrected[i] = z_obs + running;
    }

    BeamCorrection {
        pia,
        corrected,
        clipped_gates,
    }
}

fn validate_beam(beam: ArrayView1<f64>, beam_idx: usize) -> RadarResult<()> {
    if beam.is_empty() {
        return Err(RadarError::InvalidInput(format!(
            "beam {} is empty",
            beam_idx
        )));
    }
    for (gate, &z) in beam.iter().enumerate() {
        if !z.is_finite() || z < 0.0 {
            return Err(RadarError::InvalidInput(format!(
                "reflectivity at beam {} gate {} must be finite and non-negative, got {}",
                beam_idx, gate, z
            )));
        }
    }
    Ok(())
}

fn validate_sweep(sweep: &SweepGrid, params: &AttenuationParams) -> RadarResult<()> {
    params.validate()?;
    let (n_beams, n_gates) = sweep.dim();
    if n_beams == 0 || n_gates == 0 {
        return Err(RadarError::InvalidInput(format!(
            "sweep must contain at least one beam and one gate, got {}x{}",
            n_beams, n_gates
        )));
    }
    for (i, beam) in sweep.axis_iter(Axis(0)).enumerate() {
        validate_beam(beam, i)?;
    }
    Ok(())
}

fn assemble_sweep(rows: Vec<BeamCorrection>, n_beams: usize, n_gates: usize) -> SweepCorrection {
    let mut pia = Array2::zeros((n_beams, n_gates));
    let mut corrected = Array2::zeros((n_beams, n_gates));
    let mut clipped_gates = 0usize;

    for (i, row) in rows.into_iter().enumerate() {
        pia.row_mut(i).assign(&row.pia);
        corrected.row_mut(i).assign(&row.corrected);
        clipped_gates += row.clipped_gates;
    }

    SweepCorrection {
        pia,
        corrected,
        clipped_gates,
    }
}
