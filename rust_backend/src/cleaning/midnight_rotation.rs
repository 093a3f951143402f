//! Rotate an observation's coordinates to the nearest midnight.
//!
//! Observations taken during a day are aligned to a common epoch by
//! projecting their heliographic longitude to the nearest midnight. Times
//! before noon belong to the midnight that opened the day, times from noon
//! onwards to the one that closes it.

use chrono::format::{Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use qtty::{Degrees, Seconds};

use crate::physics::{DifferentialRotation, RotationModel};

/// Default `strftime` format of observation timestamps.
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result type for midnight rotation helpers
pub type MidnightResult<T> = Result<T, MidnightError>;

/// Error type for midnight rotation helpers
#[derive(Debug, thiserror::Error)]
pub enum MidnightError {
    #[error("cannot parse '{timestamp}' with format '{format}': {source}")]
    Parse {
        timestamp: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("no calendar day follows {0}")]
    OutOfRange(NaiveDateTime),
}

/// Parse `timestamp` using `format`.
///
/// Time fields absent from `format` read as zero, so a date-only format
/// yields the start of that day and `%H` alone yields the full hour. A
/// 12-hour `%I` without `%p` reads as AM.
pub fn parse_observation_time(timestamp: &str, format: &str) -> MidnightResult<NaiveDateTime> {
    let parse_error = |source: chrono::ParseError| MidnightError::Parse {
        timestamp: timestamp.to_string(),
        format: format.to_string(),
        source,
    };

    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, timestamp, StrftimeItems::new(format)).map_err(parse_error)?;

    if parsed.timestamp().is_none() {
        if parsed.hour_mod_12().is_none() {
            parsed.set_hour(0).map_err(parse_error)?;
        } else if parsed.hour_div_12().is_none() {
            parsed.set_ampm(false).map_err(parse_error)?;
        }
        if parsed.minute().is_none() {
            parsed.set_minute(0).map_err(parse_error)?;
        }
    }

    parsed.to_naive_datetime_with_offset(0).map_err(parse_error)
}

/// Midnight closest to `timestamp`.
///
/// Returns 00:00:00 of the same calendar day when the hour is before noon,
/// otherwise 00:00:00 of the next calendar day.
///
/// # Examples
///
/// ```
/// use pythia_rust::cleaning::midnight_rotation::{nearest_midnight, DEFAULT_FORMAT};
///
/// let midnight = nearest_midnight("2000-01-01 12:47:02", DEFAULT_FORMAT).unwrap();
/// assert_eq!(midnight.to_string(), "2000-01-02 00:00:00");
/// ```
pub fn nearest_midnight(timestamp: &str, format: &str) -> MidnightResult<NaiveDateTime> {
    let current = parse_observation_time(timestamp, format)?;
    midnight_of(current)
}

/// Signed time from `timestamp` to its nearest midnight.
///
/// Positive when midnight is still ahead (next day), negative when it has
/// already passed (same day).
pub fn seconds_to_nearest_midnight(timestamp: &str, format: &str) -> MidnightResult<Seconds> {
    let current = parse_observation_time(timestamp, format)?;
    let midnight = midnight_of(current)?;
    let delta = midnight - current;
    Ok(Seconds::new(delta.num_milliseconds() as f64 / 1000.0))
}

/// Longitude shift of a feature at `latitude` between `timestamp` and the
/// nearest midnight, as computed by `rotation`.
pub fn longitude_at_nearest_midnight<R>(
    timestamp: &str,
    latitude: Degrees,
    format: &str,
    rotation: &R,
) -> MidnightResult<Degrees>
where
    R: DifferentialRotation + ?Sized,
{
    let offset = seconds_to_nearest_midnight(timestamp, format)?;
    log::debug!(
        "Rotating latitude {} deg over {} s to the nearest midnight",
        latitude.value(),
        offset.value()
    );
    Ok(rotation.rotation(offset, latitude))
}

fn midnight_of(current: NaiveDateTime) -> MidnightResult<NaiveDateTime> {
    let date = if current.hour() >= 12 {
        current
            .date()
            .succ_opt()
            .ok_or(MidnightError::OutOfRange(current))?
    } else {
        current.date()
    };
    Ok(date.and_time(NaiveTime::MIN))
}

/// Midnight rotation with a fixed timestamp format and rotation model.
///
/// # Examples
///
/// ```
/// use pythia_rust::cleaning::MidnightRotation;
/// use qtty::Degrees;
///
/// let rotation = MidnightRotation::default();
/// let seconds = rotation.seconds_to_nearest_midnight("2000-01-01 11:47:02").unwrap();
/// assert_eq!(seconds.value(), -42422.0);
///
/// let longitude = rotation
///     .longitude_at_nearest_midnight("2000-01-01 12:47:02", Degrees::new(443.92976))
///     .unwrap();
/// assert!((longitude.value() - 4.87918286).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct MidnightRotation {
    format: String,
    model: RotationModel,
}

impl Default for MidnightRotation {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            model: RotationModel::default(),
        }
    }
}

impl MidnightRotation {
    pub fn new(format: impl Into<String>, model: RotationModel) -> Self {
        Self {
            format: format.into(),
            model,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_model(mut self, model: RotationModel) -> Self {
        self.model = model;
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn model(&self) -> &RotationModel {
        &self.model
    }

    pub fn nearest_midnight(&self, timestamp: &str) -> MidnightResult<NaiveDateTime> {
        nearest_midnight(timestamp, &self.format)
    }

    pub fn seconds_to_nearest_midnight(&self, timestamp: &str) -> MidnightResult<Seconds> {
        seconds_to_nearest_midnight(timestamp, &self.format)
    }

    pub fn longitude_at_nearest_midnight(
        &self,
        timestamp: &str,
        latitude: Degrees,
    ) -> MidnightResult<Degrees> {
        longitude_at_nearest_midnight(timestamp, latitude, &self.format, &self.model)
    }
}
