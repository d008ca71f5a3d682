use log::info;

use crate::cell::RawRow;
use crate::config::Settings;
use crate::error::Result;
use crate::filter::NodeFilter;
use crate::normalizer::normalize;
use crate::record::NormalizedRecord;
use crate::schema::validate;
use crate::sort::sort_records;

/// Validate, filter, normalize and sort decoded rows.
///
/// Either the complete sorted record set is returned or the first stage
/// failure; later stages never run after a failure.
///
/// # Arguments
/// * `rows` - Decoded rows of the first sheet
/// * `settings` - Supplies the node allow-list
///
/// # Returns
/// * `Result<Vec<NormalizedRecord>>` - Records with DOWN nodes first
///
/// # Examples
/// ```
/// use node_status::{CellValue, RawRow, Settings, Status, process_rows};
///
/// let row: RawRow = vec![
///     ("Node", CellValue::from("BR-SUL-01")),
///     ("Packet Loss", CellValue::from("100%")),
/// ]
/// .into_iter()
/// .collect();
/// let records = process_rows(vec![row], &Settings::default()).unwrap();
/// assert_eq!(records[0].status(), Status::Down);
/// ```
pub fn process_rows(rows: Vec<RawRow>, settings: &Settings) -> Result<Vec<NormalizedRecord>> {
    let input = validate(rows)?;
    let filtered = NodeFilter::from_settings(settings).filter(input.rows)?;
    let records = sort_records(normalize(&filtered, &input.packet_loss_header));
    info!("pipeline produced {} records", records.len());
    Ok(records)
}
