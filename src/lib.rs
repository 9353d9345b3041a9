//! rainscan: A Fast, Modular Weather-Radar Rainfall Processor
//!
//! This library processes polar weather-radar reflectivity sweeps into
//! attenuation-corrected rainfall products: clutter-gap infill, gate-by-gate
//! attenuation correction, Z-R conversion and verification against gage
//! references.

use numpy::{PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Convert PyReadonlyArray2 to ndarray Array2
fn numpy_to_array2<T>(arr: PyReadonlyArray2<T>) -> ndarray::Array2<T>
where
    T: Copy + numpy::Element,
{
    arr.as_array().to_owned()
}

/// Convert Array2<T> to numpy array
fn array2_to_numpy<T>(py: Python, arr: &ndarray::Array2<T>) -> PyResult<PyObject>
where
    T: numpy::Element + Copy,
{
    let numpy_array = arr.to_pyarray(py);
    Ok(numpy_array.into())
}

pub mod core;
pub mod types;

// Re-export main types
pub use types::{
    BeamProfile, GateMask, RadarBand, RadarError, RadarReal, RadarResult, Sweep, SweepGrid,
    SweepMetadata,
};

pub use crate::core::attenuation::{
    correct_beam, correct_sweep, correct_sweep_auto, correct_sweep_parallel, AttenuationParams,
    BeamCorrection, SweepCorrection, DEFAULT_COEFF_A, DEFAULT_EXP_B, DEFAULT_MAX_PIA_DB,
    TWO_WAY_DB_PER_KM_PER_M,
};
pub use crate::core::infill::fill_flagged_gates;
pub use crate::core::transform::ZrParams;

fn radar_error_to_py(err: RadarError) -> PyErr {
    PyValueError::new_err(format!("{}", err))
}

/// Gate-by-gate attenuation correction over a sweep of linear reflectivity.
#[pyfunction]
#[pyo3(signature = (
    sweep,
    a = DEFAULT_COEFF_A,
    b = DEFAULT_EXP_B,
    gate_spacing = 1000.0,
    unit_factor = TWO_WAY_DB_PER_KM_PER_M,
    max_specific_attenuation = None,
    max_pia = Some(DEFAULT_MAX_PIA_DB),
))]
fn correct_attenuation(
    py: Python,
    sweep: PyReadonlyArray2<f64>,
    a: f64,
    b: f64,
    gate_spacing: f64,
    unit_factor: f64,
    max_specific_attenuation: Option<f64>,
    max_pia: Option<f64>,
) -> PyResult<PyObject> {
    let grid = numpy_to_array2(sweep);
    let params = AttenuationParams {
        a,
        b,
        gate_spacing,
        unit_factor,
        max_specific_attenuation,
        max_pia,
    };

    let corrected = crate::core::attenuation::correct_sweep_auto(&grid, &params)
        .map_err(radar_error_to_py)?;

    let result = PyDict::new(py);
    result.set_item("pia", corrected.pia.to_pyarray(py))?;
    result.set_item("corrected", corrected.corrected.to_pyarray(py))?;
    result.set_item("clipped_gates", corrected.clipped_gates)?;
    Ok(result.into())
}

/// Convert a dBZ sweep to linear reflectivity.
#[pyfunction]
fn idecibel(py: Python, sweep: PyReadonlyArray2<f64>) -> PyResult<PyObject> {
    let grid = numpy_to_array2(sweep);
    array2_to_numpy(py, &crate::core::transform::idecibel_sweep(&grid))
}

/// Convert a linear-reflectivity sweep to dBZ.
#[pyfunction]
fn decibel(py: Python, sweep: PyReadonlyArray2<f64>) -> PyResult<PyObject> {
    let grid = numpy_to_array2(sweep);
    array2_to_numpy(py, &crate::core::transform::decibel_sweep(&grid))
}

/// Convert a linear-reflectivity sweep to rain rate in mm/h.
#[pyfunction]
#[pyo3(signature = (sweep, a = 200.0, b = 1.6))]
fn z_to_rainrate(py: Python, sweep: PyReadonlyArray2<f64>, a: f64, b: f64) -> PyResult<PyObject> {
    let grid = numpy_to_array2(sweep);
    let params = ZrParams { a, b };
    let rates =
        crate::core::transform::z_to_rainrate_sweep(&grid, &params).map_err(radar_error_to_py)?;
    array2_to_numpy(py, &rates)
}

/// Interpolate across clutter-flagged gates along each beam.
#[pyfunction]
fn fill_clutter_gates(
    py: Python,
    sweep: PyReadonlyArray2<f64>,
    mask: PyReadonlyArray2<bool>,
) -> PyResult<PyObject> {
    let grid = numpy_to_array2(sweep);
    let flags = numpy_to_array2(mask);
    let filled = crate::core::infill::fill_flagged_gates(&grid, &flags).map_err(radar_error_to_py)?;
    array2_to_numpy(py, &filled)
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(correct_attenuation, m)?)?;
    m.add_function(wrap_pyfunction!(idecibel, m)?)?;
    m.add_function(wrap_pyfunction!(decibel, m)?)?;
    m.add_function(wrap_pyfunction!(z_to_rainrate, m)?)?;
    m.add_function(wrap_pyfunction!(fill_clutter_gates, m)?)?;
    Ok(())
}
