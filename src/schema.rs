use log::debug;

use crate::cell::RawRow;
use crate::error::{NODE_COLUMN, NodeStatusError, PACKET_LOSS_COLUMN, Result};

/// Header spellings accepted for the packet-loss column, compared after
/// trimming and lower-casing.
const PACKET_LOSS_SPELLINGS: [&str; 2] = ["packet loss", "% packet loss"];

/// Rows that passed the header checks, together with the exact name of the
/// packet-loss header found in the file.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedInput {
    pub rows: Vec<RawRow>,
    pub packet_loss_header: String,
}

/// Check the header set of the first row.
///
/// All rows are assumed to share one header set, so only the first row is
/// inspected.
pub fn validate(rows: Vec<RawRow>) -> Result<ValidatedInput> {
    let first = rows.first().ok_or(NodeStatusError::EmptyInput)?;

    if !first.contains(NODE_COLUMN) {
        return Err(NodeStatusError::MissingColumn(NODE_COLUMN.to_string()));
    }

    let packet_loss_header = find_packet_loss_header(first)
        .ok_or_else(|| NodeStatusError::MissingColumn(PACKET_LOSS_COLUMN.to_string()))?
        .to_string();

    debug!("using '{}' as the packet loss column", packet_loss_header);
    Ok(ValidatedInput {
        rows,
        packet_loss_header,
    })
}

/// First header, in column order, that names the packet-loss column.
pub fn find_packet_loss_header(row: &RawRow) -> Option<&str> {
    row.headers().find(|header| {
        let folded = header.trim().to_lowercase();
        PACKET_LOSS_SPELLINGS.contains(&folded.as_str())
    })
}
