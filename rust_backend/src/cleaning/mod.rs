//! Observation cleaning helpers.
//!
//! # Modules
//!
//! - [`midnight_rotation`]: align an observation's longitude to the nearest midnight
//!
//! # Example
//!
//! ```no_run
//! use pythia_rust::cleaning::MidnightRotation;
//! use qtty::Degrees;
//!
//! let rotation = MidnightRotation::default();
//! let longitude = rotation
//!     .longitude_at_nearest_midnight("2000-01-01 12:47:02", Degrees::new(30.0))
//!     .expect("valid timestamp");
//! println!("{} deg", longitude.value());
//! ```

pub mod midnight_rotation;


pub use midnight_rotation::{
    longitude_at_nearest_midnight, nearest_midnight, seconds_to_nearest_midnight,
    MidnightError, MidnightResult, MidnightRotation, DEFAULT_FORMAT,
};
