//! Table loading.
//!
//! Reads CSV and JSON files into polars `DataFrame`s with error context, so
//! a data module can be pointed at a file instead of an in-memory table.
//!
//! # Example
//!
//! ```no_run
//! use pythia_rust::io::loaders::TableLoader;
//! use std::path::Path;
//!
//! let df = TableLoader::load_from_file(Path::new("events.csv"))
//!     .expect("Failed to load");
//! println!("Loaded {} rows", df.height());
//! ```

pub mod loaders;


pub use loaders::{TableFormat, TableLoader};
