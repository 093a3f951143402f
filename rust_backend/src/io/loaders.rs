use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// On-disk format of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }
}

/// Unified interface for loading tables from CSV or JSON
pub struct TableLoader;

impl TableLoader {
    /// Load a table from a file (auto-detects CSV or JSON)
    pub fn load_from_file(path: &Path) -> Result<DataFrame> {
        match TableFormat::from_path(path)? {
            TableFormat::Csv => Self::load_csv(path),
            TableFormat::Json => Self::load_json(path),
        }
    }

    /// Load a table from a CSV file with a header row
    pub fn load_csv(csv_path: &Path) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(csv_path.into()))
            .with_context(|| format!("Cannot open '{}'", csv_path.display()))?
            .finish()
            .with_context(|| format!("Failed to parse CSV '{}'", csv_path.display()))?;

        log::debug!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            csv_path.display()
        );
        Ok(df)
    }

    /// Load a table from a JSON file holding an array of records
    pub fn load_json(json_path: &Path) -> Result<DataFrame> {
        let file = File::open(json_path)
            .with_context(|| format!("Cannot open '{}'", json_path.display()))?;
        let df = JsonReader::new(file)
            .finish()
            .with_context(|| format!("Failed to parse JSON '{}'", json_path.display()))?;

        log::debug!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            json_path.display()
        );
        Ok(df)
    }
}
