//! Python bindings for the pythia Rust backend.
//!
//! Enabled with the `python` feature. Functions are registered in the
//! `pythia_rust` Python module; angles are plain floats in degrees and
//! durations plain floats in seconds.
//!
//! - [`rotation_bindings`]: midnight rotation helpers and `diff_rot`

pub mod rotation_bindings;

#[cfg(test)]
mod rotation_bindings_tests;

pub use rotation_bindings::*;
