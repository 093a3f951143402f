//! Solar physics models consumed by the coordinate helpers.
//!
//! # Modules
//!
//! - [`differential_rotation`]: empirical rotation laws and the
//!   [`DifferentialRotation`] capability used by the midnight rotation helpers

pub mod differential_rotation;

pub use differential_rotation::{
    diff_rot, DifferentialRotation, FrameTime, RotationError, RotationLaw, RotationModel,
};
