use thiserror::Error;

/// Every condition the pipeline reports back to its caller.
///
/// None of these are fatal to the running process: the caller shows the
/// message and keeps whatever results it already had.
#[derive(Debug, Error)]
pub enum NodeStatusError {
    #[error("Failed to read the file: {0}")]
    FileRead(#[source] std::io::Error),

    #[error(
        "Failed to process the Excel file. Please ensure it is a valid .xlsx or .xls file. ({0})"
    )]
    Decode(String),

    #[error("The Excel file is empty or could not be read.")]
    EmptyInput,

    #[error("{}", missing_column_message(.0))]
    MissingColumn(String),

    #[error(
        "No matching nodes found in the uploaded file. Ensure nodes start with prefixes like 'ATM-SUL', don't contain '-SW', etc."
    )]
    NoMatchingRows,

    #[error("Failed to generate snapshot image: {0}")]
    Snapshot(String),

    #[error("Nothing to export: {0}")]
    Export(String),

    #[error("Another operation is still running")]
    Busy,

    #[error("Invalid settings: {0}")]
    Config(String),
}

/// Column names carried by [`NodeStatusError::MissingColumn`].
pub const NODE_COLUMN: &str = "Node";
pub const PACKET_LOSS_COLUMN: &str = "PacketLoss";

fn missing_column_message(column: &str) -> String {
    if column == PACKET_LOSS_COLUMN {
        "The uploaded Excel file is missing a 'Packet loss' or '% Packet Loss' column.".to_string()
    } else {
        format!("The uploaded Excel file is missing the required '{column}' column.")
    }
}

pub type Result<T> = std::result::Result<T, NodeStatusError>;

impl From<calamine::Error> for NodeStatusError {
    fn from(err: calamine::Error) -> Self {
        NodeStatusError::Decode(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for NodeStatusError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        NodeStatusError::Export(err.to_string())
    }
}

impl From<image::ImageError> for NodeStatusError {
    fn from(err: image::ImageError) -> Self {
        NodeStatusError::Snapshot(err.to_string())
    }
}
