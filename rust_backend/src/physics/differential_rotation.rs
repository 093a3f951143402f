//! Solar differential rotation.
//!
//! Different heliographic latitudes rotate at different angular rates. The
//! rate is modelled as
//!
//! ```text
//! ω(φ) = A + B·sin²(φ) + C·sin⁴(φ)
//! ```
//!
//! with coefficients taken from one of the standard empirical laws. The
//! longitude shift over a duration `Δt` is `ω(φ)·Δt`, optionally corrected
//! for the Earth's orbital motion when a synodic frame is requested.

use std::fmt;
use std::str::FromStr;

use qtty::{Day, Degree, Degrees, Radians, Seconds};
use serde::{Deserialize, Serialize};

/// Mean angular velocity of the Earth around the Sun, in degrees per day.
const EARTH_ORBITAL_RATE_DEG_PER_DAY: f64 = 0.9856;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Error type for rotation model selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    #[error("unknown rotation law '{0}', expected one of howard, snodgrass, allen, rigid")]
    UnknownLaw(String),

    #[error("unknown frame time '{0}', expected sidereal or synodic")]
    UnknownFrame(String),
}

/// Capability that turns a duration at a given latitude into a longitude shift.
///
/// The midnight rotation helpers only compute the time offset and delegate
/// the physics to an implementation of this trait.
pub trait DifferentialRotation {
    /// Longitude travelled by a feature at `latitude` during `duration`.
    fn rotation(&self, duration: Seconds, latitude: Degrees) -> Degrees;
}

impl<F> DifferentialRotation for F
where
    F: Fn(Seconds, Degrees) -> Degrees,
{
    fn rotation(&self, duration: Seconds, latitude: Degrees) -> Degrees {
        self(duration, latitude)
    }
}

/// Empirical differential-rotation law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationLaw {
    /// Howard et al. (1990), Doppler measurements.
    #[default]
    Howard,
    /// Snodgrass & Ulrich (1990), Mt. Wilson magnetic features.
    Snodgrass,
    /// Allen, *Astrophysical Quantities*.
    Allen,
    /// Rigid body rotation, no latitude dependence.
    Rigid,
}

impl RotationLaw {
    pub const ALL: [RotationLaw; 4] = [
        RotationLaw::Howard,
        RotationLaw::Snodgrass,
        RotationLaw::Allen,
        RotationLaw::Rigid,
    ];

    /// Coefficients `(A, B, C)` of the law in degrees per day.
    pub fn coefficients(self) -> (f64, f64, f64) {
        match self {
            RotationLaw::Howard => (
                microrad_per_sec(2.894),
                microrad_per_sec(-0.428),
                microrad_per_sec(-0.370),
            ),
            RotationLaw::Snodgrass => (
                microrad_per_sec(2.851),
                microrad_per_sec(-0.343),
                microrad_per_sec(-0.474),
            ),
            RotationLaw::Allen => (14.44, -3.0, 0.0),
            RotationLaw::Rigid => (14.1844, 0.0, 0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RotationLaw::Howard => "howard",
            RotationLaw::Snodgrass => "snodgrass",
            RotationLaw::Allen => "allen",
            RotationLaw::Rigid => "rigid",
        }
    }
}

impl fmt::Display for RotationLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotationLaw {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "howard" => Ok(RotationLaw::Howard),
            "snodgrass" => Ok(RotationLaw::Snodgrass),
            "allen" => Ok(RotationLaw::Allen),
            "rigid" => Ok(RotationLaw::Rigid),
            _ => Err(RotationError::UnknownLaw(s.to_string())),
        }
    }
}

/// Reference frame in which the rotation is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameTime {
    /// Fixed with respect to the stars.
    #[default]
    Sidereal,
    /// As seen from the Earth, which moves along its orbit meanwhile.
    Synodic,
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameTime::Sidereal => f.write_str("sidereal"),
            FrameTime::Synodic => f.write_str("synodic"),
        }
    }
}

impl FromStr for FrameTime {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sidereal" => Ok(FrameTime::Sidereal),
            "synodic" => Ok(FrameTime::Synodic),
            _ => Err(RotationError::UnknownFrame(s.to_string())),
        }
    }
}

/// A rotation law evaluated in a given frame.
///
/// # Examples
///
/// ```
/// use pythia_rust::physics::{DifferentialRotation, RotationModel};
/// use qtty::{Degrees, Seconds};
///
/// let model = RotationModel::default();
/// let shift = model.rotation(Seconds::new(40378.0), Degrees::new(443.92976));
/// assert!((shift.value() - 4.87918286).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RotationModel {
    #[serde(default)]
    pub law: RotationLaw,
    #[serde(default)]
    pub frame: FrameTime,
}

impl RotationModel {
    pub fn new(law: RotationLaw, frame: FrameTime) -> Self {
        Self { law, frame }
    }

    /// Angular rate at `latitude` in degrees per day, before any frame correction.
    pub fn sidereal_rate(&self, latitude: Degrees) -> f64 {
        let (a, b, c) = self.law.coefficients();
        let sin2 = latitude.sin().powi(2);
        a + b * sin2 + c * sin2 * sin2
    }
}

impl DifferentialRotation for RotationModel {
    fn rotation(&self, duration: Seconds, latitude: Degrees) -> Degrees {
        let days = duration.to::<Day>().value();
        let mut shift = self.sidereal_rate(latitude) * days;
        if self.frame == FrameTime::Synodic {
            shift -= EARTH_ORBITAL_RATE_DEG_PER_DAY * days;
        }
        Degrees::new(shift).wrap_pos()
    }
}

/// Longitude shift at `latitude` after `duration`, wrapped to `[0°, 360°)`.
pub fn diff_rot(duration: Seconds, latitude: Degrees, model: &RotationModel) -> Degrees {
    model.rotation(duration, latitude)
}

fn microrad_per_sec(value: f64) -> f64 {
    Radians::new(value * 1e-6).to::<Degree>().value() * SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_howard_reference_value() {
        let shift = diff_rot(
            Seconds::new(40378.0),
            Degrees::new(443.92976),
            &RotationModel::default(),
        );
        assert_abs_diff_eq!(shift.value(), 4.87918286, epsilon = 1e-6);
    }

    #[test]
    fn test_rigid_ignores_latitude() {
        let model = RotationModel::new(RotationLaw::Rigid, FrameTime::Sidereal);
        let one_day = Seconds::new(SECONDS_PER_DAY);
        let equator = model.rotation(one_day, Degrees::new(0.0));
        let high = model.rotation(one_day, Degrees::new(60.0));
        assert_abs_diff_eq!(equator.value(), 14.1844, epsilon = 1e-9);
        assert_abs_diff_eq!(equator.value(), high.value(), epsilon = 1e-9);
    }

    #[test]
    fn test_equator_rotates_faster_than_poles() {
        for law in [RotationLaw::Howard, RotationLaw::Snodgrass, RotationLaw::Allen] {
            let model = RotationModel::new(law, FrameTime::Sidereal);
            assert!(
                model.sidereal_rate(Degrees::new(0.0)) > model.sidereal_rate(Degrees::new(60.0)),
                "{} should rotate faster at the equator",
                law
            );
        }
    }

    #[test]
    fn test_synodic_is_slower_than_sidereal() {
        let duration = Seconds::new(SECONDS_PER_DAY);
        let latitude = Degrees::new(15.0);
        let sidereal = RotationModel::new(RotationLaw::Allen, FrameTime::Sidereal);
        let synodic = RotationModel::new(RotationLaw::Allen, FrameTime::Synodic);
        let diff = sidereal.rotation(duration, latitude).value()
            - synodic.rotation(duration, latitude).value();
        assert_abs_diff_eq!(diff, EARTH_ORBITAL_RATE_DEG_PER_DAY, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_duration_wraps_to_positive_longitude() {
        let shift = diff_rot(
            Seconds::new(-42422.0),
            Degrees::new(0.0),
            &RotationModel::default(),
        );
        assert!(shift.value() > 350.0 && shift.value() < 360.0);
    }

    #[test]
    fn test_parse_law_and_frame() {
        assert_eq!("Snodgrass".parse::<RotationLaw>(), Ok(RotationLaw::Snodgrass));
        assert_eq!(" synodic ".parse::<FrameTime>(), Ok(FrameTime::Synodic));
        assert_eq!(
            "carrington".parse::<RotationLaw>(),
            Err(RotationError::UnknownLaw("carrington".to_string()))
        );
        assert!("lunar".parse::<FrameTime>().is_err());
    }

    #[test]
    fn test_every_law_parses_from_its_name() {
        for law in RotationLaw::ALL {
            assert_eq!(law.as_str().parse::<RotationLaw>(), Ok(law));
            assert_eq!(law.to_string().to_uppercase().parse::<RotationLaw>(), Ok(law));
        }
    }

    #[test]
    fn test_closure_as_rotation() {
        let constant = |_: Seconds, _: Degrees| Degrees::new(1.5);
        assert_eq!(constant.rotation(Seconds::new(1.0), Degrees::new(0.0)).value(), 1.5);
    }
}
