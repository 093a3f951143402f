pub mod cleaning;
pub mod io;
pub mod learning;
pub mod physics;
#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Pythia Rust backend - solar observation cleaning and training data preparation
#[cfg(feature = "python")]
#[pymodule]
fn pythia_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Register midnight rotation helpers
    m.add_function(wrap_pyfunction!(python::nearest_midnight, m)?)?;
    m.add_function(wrap_pyfunction!(python::seconds_to_nearest_midnight, m)?)?;
    m.add_function(wrap_pyfunction!(python::longitude_at_nearest_midnight, m)?)?;

    // Register the differential rotation model
    m.add_function(wrap_pyfunction!(python::diff_rot, m)?)?;

    Ok(())
}
