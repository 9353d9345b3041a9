//! Core radar rainfall processing modules

pub mod attenuation;
pub mod infill;
pub mod transform;
pub mod verify;

// Re-export main types
pub use attenuation::{
    correct_beam, correct_sweep, correct_sweep_auto, correct_sweep_parallel, AttenuationParams,
    BeamCorrection, SweepCorrection,
};
pub use infill::fill_flagged_gates;
pub use transform::{
    decibel, decibel_sweep, idecibel, idecibel_sweep, rainrate_to_depth, rainrate_to_depth_sweep,
    rainrate_to_z, z_to_rainrate, z_to_rainrate_sweep, ZrParams,
};
pub use verify::{mae, mean_error, nash_sutcliffe, pearson_corr, rmse};
