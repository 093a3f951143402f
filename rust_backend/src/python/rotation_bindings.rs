use chrono::{Datelike, Timelike};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use qtty::{Degrees, Seconds};

use crate::cleaning::midnight_rotation::{self, DEFAULT_FORMAT};
use crate::physics::{self, FrameTime, RotationLaw, RotationModel};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn rotation_model(rot_type: &str, frame_time: &str) -> PyResult<RotationModel> {
    let law: RotationLaw = rot_type.parse().map_err(value_error)?;
    let frame: FrameTime = frame_time.parse().map_err(value_error)?;
    Ok(RotationModel::new(law, frame))
}

/// Datetime of the midnight nearest to `obsdate` (PyO3 binding)
#[pyfunction]
#[pyo3(signature = (obsdate, fmt=DEFAULT_FORMAT))]
pub fn nearest_midnight(py: Python, obsdate: &str, fmt: &str) -> PyResult<Py<PyAny>> {
    let midnight = midnight_rotation::nearest_midnight(obsdate, fmt).map_err(value_error)?;

    let datetime_cls = py.import("datetime")?.getattr("datetime")?;
    let py_dt = datetime_cls.call1((
        midnight.year(),
        midnight.month(),
        midnight.day(),
        midnight.hour(),
        midnight.minute(),
        midnight.second(),
    ))?;

    Ok(py_dt.unbind())
}

/// Signed seconds from `obsdate` to its nearest midnight (PyO3 binding)
#[pyfunction]
#[pyo3(signature = (obsdate, fmt=DEFAULT_FORMAT))]
pub fn seconds_to_nearest_midnight(obsdate: &str, fmt: &str) -> PyResult<f64> {
    midnight_rotation::seconds_to_nearest_midnight(obsdate, fmt)
        .map(|seconds| seconds.value())
        .map_err(value_error)
}

/// Longitude shift in degrees between `obsdate` and its nearest midnight (PyO3 binding)
#[pyfunction]
#[pyo3(signature = (obsdate, latitude, fmt=DEFAULT_FORMAT, rot_type="howard", frame_time="sidereal"))]
pub fn longitude_at_nearest_midnight(
    obsdate: &str,
    latitude: f64,
    fmt: &str,
    rot_type: &str,
    frame_time: &str,
) -> PyResult<f64> {
    let model = rotation_model(rot_type, frame_time)?;
    midnight_rotation::longitude_at_nearest_midnight(obsdate, Degrees::new(latitude), fmt, &model)
        .map(|longitude| longitude.value())
        .map_err(value_error)
}

/// Differential rotation in degrees after `duration` seconds at `latitude` degrees (PyO3 binding)
#[pyfunction]
#[pyo3(signature = (duration, latitude, rot_type="howard", frame_time="sidereal"))]
pub fn diff_rot(duration: f64, latitude: f64, rot_type: &str, frame_time: &str) -> PyResult<f64> {
    let model = rotation_model(rot_type, frame_time)?;
    Ok(physics::diff_rot(Seconds::new(duration), Degrees::new(latitude), &model).value())
}
