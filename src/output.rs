/// JSON writer for the VWAP report
///
/// Layout: `{"SYMBOL": {"9": 12.34, "10": 12.5}, ...}` with hour buckets as
/// string keys and VWAP values as JSON numbers.

use crate::vwap::VwapReport;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialise report: {0}")]
    Json(#[from] serde_json::Error),
}

/// `<input file name>.json` in the current directory
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "vwap".into());
    name.push(".json");
    PathBuf::from(name)
}

pub fn write_report<W: Write>(writer: W, report: &VwapReport) -> Result<(), OutputError> {
    serde_json::to_writer(writer, report)?;
    Ok(())
}

pub fn write_report_file(path: &Path, report: &VwapReport) -> Result<(), OutputError> {
    let io_err = |source: io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_report(&mut writer, report)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}
