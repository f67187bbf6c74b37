//! Export recovered keys to files
//!
//! Four formats are supported: a text report, a JSON report, CSV and an
//! Electrum import file. Formats are written independently, so one failing
//! does not prevent or undo the others.

pub mod render;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use render::{render_csv, render_electrum, render_json, render_text, CSV_HEADER};

use crate::{common::current_timestamp, errors::ExportError, keys::RecoveredKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Text,
    Json,
    Csv,
    Electrum,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Text,
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Electrum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Electrum => "electrum",
        }
    }

    /// Output file name for a given base name
    pub fn file_name(&self, base_name: &str) -> String {
        match self {
            ExportFormat::Text => format!("{base_name}.txt"),
            ExportFormat::Json => format!("{base_name}.json"),
            ExportFormat::Csv => format!("{base_name}.csv"),
            ExportFormat::Electrum => format!("{base_name}_electrum.json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "electrum" => Ok(ExportFormat::Electrum),
            _ => Err(format!("Unknown export format: {s}")),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and what [`export_all`] writes
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub base_name: String,
    pub formats: Vec<ExportFormat>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            base_name: "recovered_wallet".to_string(),
            formats: ExportFormat::ALL.to_vec(),
        }
    }
}

impl ExportOptions {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = name.into();
        self
    }

    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn path_for(&self, format: ExportFormat) -> PathBuf {
        self.output_dir.join(format.file_name(&self.base_name))
    }
}

/// Result of writing one format
#[derive(Debug)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub result: Result<(), ExportError>,
}

impl ExportOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|e| ExportError::create_file(path, e))
}

pub fn export_to_text(keys: &[RecoveredKey], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_file(path, &render_text(keys, &current_timestamp()))?;
    tracing::info!(path = %path.display(), "Exported recovery results");
    Ok(())
}

pub fn export_to_json(keys: &[RecoveredKey], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_file(path, &render_json(keys, &current_timestamp())?)?;
    tracing::info!(path = %path.display(), "Exported recovery results to JSON");
    Ok(())
}

pub fn export_to_csv(keys: &[RecoveredKey], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_file(path, &render_csv(keys))?;
    tracing::info!(path = %path.display(), "Exported recovery results to CSV");
    Ok(())
}

pub fn export_to_electrum(keys: &[RecoveredKey], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_file(path, &render_electrum(keys)?)?;
    tracing::info!(path = %path.display(), "Exported Electrum import file");
    Ok(())
}

pub fn export(keys: &[RecoveredKey], format: ExportFormat, path: impl AsRef<Path>) -> Result<(), ExportError> {
    match format {
        ExportFormat::Text => export_to_text(keys, path),
        ExportFormat::Json => export_to_json(keys, path),
        ExportFormat::Csv => export_to_csv(keys, path),
        ExportFormat::Electrum => export_to_electrum(keys, path),
    }
}

/// Write every requested format. Each format succeeds or fails on its own
/// and files already written are left in place.
pub fn export_all(keys: &[RecoveredKey], options: &ExportOptions) -> Vec<ExportOutcome> {
    if let Err(e) = fs::create_dir_all(&options.output_dir) {
        tracing::warn!(dir = %options.output_dir.display(), "Cannot create output directory: {e}");
    }

    options
        .formats
        .iter()
        .map(|&format| {
            let path = options.path_for(format);
            let result = export(keys, format, &path);
            if let Err(e) = &result {
                tracing::warn!(format = %format, "Export failed: {e}");
            }
            ExportOutcome {
                format,
                path,
                result,
            }
        })
        .collect()
}
