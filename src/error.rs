use thiserror::Error;

/// Exit codes reported by the command-line applications.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID_ARGUMENTS: i32 = 1;
pub const EXIT_BAD_FORMAT: i32 = 2;
pub const EXIT_UNEXPECTED_EXCEPTION: i32 = 3;
pub const EXIT_EMPTY_INTEROP: i32 = 4;
pub const EXIT_MISSING_RUNINFO_XML: i32 = 5;
pub const EXIT_MALFORMED_XML: i32 = 6;

#[derive(Error, Debug)]
pub enum RunPlotError {
    #[error("Unknown metric name: {0}")]
    UnknownMetricName(String),
    #[error("Index {index} out of bounds for {what} of length {len}")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Invalid q-score bin table: {0}")]
    InvalidBinTable(String),
    #[error("RunInfo.xml not found in run folder: {0}")]
    MissingRunInfoXml(String),
    #[error("Malformed RunInfo.xml: {0}")]
    MalformedXml(String),
    #[error("Bad metric file format in {path}: {reason}")]
    BadFormat { path: String, reason: String },
    #[error("No metric records found in the run folder")]
    EmptyInterop,
    #[error("Heatmap sized to zero while bins are present")]
    EmptyHeatmap,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize plot data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl RunPlotError {
    /// Map an error to the exit code contract of the applications.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunPlotError::UnknownMetricName(_) => EXIT_INVALID_ARGUMENTS,
            RunPlotError::IndexOutOfBounds { .. } => EXIT_INVALID_ARGUMENTS,
            RunPlotError::InvalidBinTable(_) => EXIT_INVALID_ARGUMENTS,
            RunPlotError::MissingRunInfoXml(_) => EXIT_MISSING_RUNINFO_XML,
            RunPlotError::MalformedXml(_) => EXIT_MALFORMED_XML,
            RunPlotError::BadFormat { .. } => EXIT_BAD_FORMAT,
            RunPlotError::EmptyInterop => EXIT_EMPTY_INTEROP,
            RunPlotError::EmptyHeatmap => EXIT_UNEXPECTED_EXCEPTION,
            RunPlotError::Io(_) => EXIT_UNEXPECTED_EXCEPTION,
            RunPlotError::Json(_) => EXIT_UNEXPECTED_EXCEPTION,
            RunPlotError::Csv(_) => EXIT_UNEXPECTED_EXCEPTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            RunPlotError::UnknownMetricName("foo".to_string()).exit_code(),
            EXIT_INVALID_ARGUMENTS
        );
        assert_eq!(
            RunPlotError::MissingRunInfoXml("/run".to_string()).exit_code(),
            EXIT_MISSING_RUNINFO_XML
        );
        assert_eq!(
            RunPlotError::MalformedXml("no layout".to_string()).exit_code(),
            EXIT_MALFORMED_XML
        );
        assert_eq!(
            RunPlotError::BadFormat {
                path: "InterOp/TileMetricsOut.bin".to_string(),
                reason: "truncated record".to_string(),
            }
            .exit_code(),
            EXIT_BAD_FORMAT
        );
        assert_eq!(RunPlotError::EmptyInterop.exit_code(), EXIT_EMPTY_INTEROP);
    }
}
