use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Real-valued radar sample (reflectivity, attenuation, rain rate)
pub type RadarReal = f64;

/// 2D sweep data array (azimuth beam x range gate)
pub type SweepGrid = Array2<RadarReal>;

/// 1D profile along a single beam, ordered from the radar outward
pub type BeamProfile = Array1<RadarReal>;

/// Per-gate boolean flags with the same layout as a SweepGrid
pub type GateMask = Array2<bool>;

/// Radar frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadarBand {
    S,
    C,
    X,
}

impl std::fmt::Display for RadarBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RadarBand::S => write!(f, "S"),
            RadarBand::C => write!(f, "C"),
            RadarBand::X => write!(f, "X"),
        }
    }
}

/// Acquisition metadata for one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepMetadata {
    /// Station identifier (e.g. WMO id or site name)
    pub site: String,
    pub band: RadarBand,
    /// Antenna elevation angle in degrees
    pub elevation_deg: f64,
    pub timestamp: DateTime<Utc>,
    /// Range gate spacing in meters
    pub gate_spacing_m: f64,
}

/// One full antenna rotation: reflectivity samples plus acquisition metadata.
///
/// Rows are azimuth beams in insertion order; columns are range gates with
/// index increasing monotonically with distance from the radar.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub metadata: SweepMetadata,
    pub data: SweepGrid,
}

impl Sweep {
    pub fn new(metadata: SweepMetadata, data: SweepGrid) -> RadarResult<Self> {
        if metadata.gate_spacing_m <= 0.0 || !metadata.gate_spacing_m.is_finite() {
            return Err(RadarError::InvalidConfig(format!(
                "gate spacing must be positive, got {}",
                metadata.gate_spacing_m
            )));
        }
        let (beams, gates) = data.dim();
        if beams == 0 || gates == 0 {
            return Err(RadarError::InvalidInput(format!(
                "sweep must contain at least one beam and one gate, got {}x{}",
                beams, gates
            )));
        }
        Ok(Self { metadata, data })
    }

    pub fn num_beams(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_gates(&self) -> usize {
        self.data.ncols()
    }
}

/// Error types for radar processing
#[derive(Debug, thiserror::Error)]
pub enum RadarError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for radar operations
pub type RadarResult<T> = Result<T, RadarError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ndarray::Array2;

    fn metadata() -> SweepMetadata {
        SweepMetadata {
            site: "deheia".to_string(),
            band: RadarBand::C,
            elevation_deg: 0.5,
            timestamp: Utc.with_ymd_and_hms(2021, 7, 14, 12, 0, 0).unwrap(),
            gate_spacing_m: 1000.0,
        }
    }

    #[test]
    fn test_sweep_construction() {
        let sweep = Sweep::new(metadata(), Array2::zeros((360, 128))).unwrap();
        assert_eq!(sweep.num_beams(), 360);
        assert_eq!(sweep.num_gates(), 128);
    }

    #[test]
    fn test_sweep_rejects_empty_grid() {
        let result = Sweep::new(metadata(), Array2::zeros((0, 128)));
        assert!(matches!(result, Err(RadarError::InvalidInput(_))));
    }

    #[test]
    fn test_sweep_rejects_bad_gate_spacing() {
        let mut meta = metadata();
        meta.gate_spacing_m = 0.0;
        let result = Sweep::new(meta, Array2::zeros((360, 128)));
        assert!(matches!(result, Err(RadarError::InvalidConfig(_))));
    }
}
