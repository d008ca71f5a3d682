#![cfg(not(tarpaulin_include))]

use log::{debug, info, warn};
use rust_xlsxwriter::{Color, Format, Workbook};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{NodeStatusError, Result};
use crate::record::{NormalizedRecord, STATUS_FIELD};

/// A produced file: suggested name plus encoded content.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write the artifact under `dir` using its suggested name.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| NodeStatusError::Export(format!("{}: {}", path.display(), e)))?;
        info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Header row of the export: every key seen, in first-appearance order.
pub fn export_headers(records: &[NormalizedRecord]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for column in record.columns() {
            if !headers.contains(column) {
                headers.push(column.clone());
            }
        }
    }
    headers
}

/// Display width of each column: longest cell text or header, plus 2.
pub fn column_widths(headers: &[String], records: &[NormalizedRecord]) -> Vec<usize> {
    headers
        .iter()
        .map(|header| {
            let longest = records
                .iter()
                .map(|r| r.get(header).map_or(0, |v| v.chars().count()))
                .max()
                .unwrap_or(0);
            longest.max(header.chars().count()) + 2
        })
        .collect()
}

/// Cell style for a `Status` value; anything but UP/DOWN stays unstyled.
pub fn status_format(value: &str) -> Option<Format> {
    match value {
        "UP" => Some(
            Format::new()
                .set_background_color(Color::RGB(0xC6EFCE))
                .set_font_color(Color::RGB(0x006100)),
        ),
        "DOWN" => Some(
            Format::new()
                .set_background_color(Color::RGB(0xFFC7CE))
                .set_font_color(Color::RGB(0x9C0006)),
        ),
        _ => None,
    }
}

/// Encode the records as a single-sheet workbook with the Status column
/// coloured and every column sized to its content.
///
/// # Examples
/// ```no_run
/// use node_status::config::Settings;
/// use node_status::downloader::to_xlsx;
///
/// # fn run(records: &[node_status::record::NormalizedRecord]) -> node_status::error::Result<()> {
/// let artifact = to_xlsx(records, &Settings::default())?;
/// artifact.save_to(".")?;
/// # Ok(())
/// # }
/// ```
pub fn to_xlsx(records: &[NormalizedRecord], settings: &Settings) -> Result<Artifact> {
    if records.is_empty() {
        return Err(NodeStatusError::Export("no records to export".into()));
    }

    let headers = export_headers(records);
    let widths = column_widths(&headers, records);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&settings.sheet_name)?;

    let status_col = headers.iter().position(|h| h == STATUS_FIELD);
    if status_col.is_none() {
        warn!("could not find 'Status' column to apply styling");
    }

    let mut styled = 0;
    for (c, header) in headers.iter().enumerate() {
        let col = column_number(c)?;
        worksheet.write_string(0, col, header.as_str())?;

        for (r, record) in records.iter().enumerate() {
            let row = (r + 1) as u32;
            let Some(value) = record.get(header) else {
                continue;
            };
            let format = if Some(c) == status_col {
                status_format(value)
            } else {
                None
            };
            match format {
                Some(format) => {
                    worksheet.write_string_with_format(row, col, value, &format)?;
                    styled += 1;
                }
                None => {
                    worksheet.write_string(row, col, value)?;
                }
            }
        }

        worksheet.set_column_width(col, widths[c] as f64)?;
    }
    debug!("styled {} status cells", styled);

    let bytes = workbook.save_to_buffer()?;
    info!(
        "encoded {} records into {} ({} bytes)",
        records.len(),
        settings.workbook_file_name,
        bytes.len()
    );

    Ok(Artifact {
        file_name: settings.workbook_file_name.clone(),
        bytes,
    })
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index)
        .ok()
        .filter(|c| *c < 16_384)
        .ok_or_else(|| NodeStatusError::Export(format!("too many columns ({})", index + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn record(node: &str, status: Status, ip: &str, extra: &[(&str, &str)]) -> NormalizedRecord {
        let mut columns = vec!["Node".to_string()];
        columns.extend(extra.iter().map(|(k, _)| k.to_string()));
        NormalizedRecord::new(
            node.into(),
            status,
            ip.into(),
            "0%".into(),
            extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            columns,
        )
    }

    #[test]
    fn empty_record_set_is_an_export_error() {
        let err = to_xlsx(&[], &Settings::default()).unwrap_err();
        assert!(matches!(err, NodeStatusError::Export(_)));
    }

    #[test]
    fn headers_union_in_first_seen_order() {
        let records = vec![
            record("ATM-SUL-01", Status::Down, "N/A", &[]),
            record("ATM-SUL-02", Status::Up, "N/A", &[("Region", "South")]),
        ];
        assert_eq!(
            export_headers(&records),
            vec!["Node", "Status", "IP Address", "Packet loss", "Region"]
        );
    }

    #[test]
    fn widths_cover_longest_cell_or_header() {
        let records = vec![
            record("ATM-SUL-0001", Status::Down, "N/A", &[]),
            record("BR-1", Status::Up, "192.168.100.200", &[]),
        ];
        let headers = export_headers(&records);
        let widths = column_widths(&headers, &records);
        // Node, Status, IP Address, Packet loss
        assert_eq!(widths, vec![14, 8, 17, 13]);
    }

    #[test]
    fn status_styles() {
        assert!(status_format("UP").is_some());
        assert!(status_format("DOWN").is_some());
        assert!(status_format("").is_none());
        assert!(status_format("up").is_none());
    }

    #[test]
    fn workbook_reads_back() {
        let records = vec![
            record("ATM-SUL-01", Status::Down, "10.0.0.1", &[]),
            record("BR-ERB-02", Status::Up, "N/A", &[]),
        ];
        let artifact = to_xlsx(&records, &Settings::default()).unwrap();
        assert_eq!(artifact.file_name, "Modified_Node_Status.xlsx");

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(artifact.bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Modified Status".to_string()]);
        let range = workbook.worksheet_range("Modified Status").unwrap();
        assert_eq!(range.get_size(), (3, 4));
        assert_eq!(range.get((1, 1)), Some(&Data::String("DOWN".into())));
        assert_eq!(range.get((2, 2)), Some(&Data::String("N/A".into())));
    }
}
