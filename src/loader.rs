#![cfg(not(tarpaulin_include))]

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::{debug, info};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use crate::cell::{CellValue, RawRow};
use crate::error::{NodeStatusError, Result};

/// Read an uploaded spreadsheet and decode the rows of its first sheet.
///
/// The whole file is read before decoding starts. A read failure is reported
/// as [`NodeStatusError::FileRead`]; anything the decoder rejects is a
/// [`NodeStatusError::Decode`].
///
/// # Examples
/// ```no_run
/// # async fn run() -> node_status::error::Result<()> {
/// let rows = node_status::loader::load_rows("nodes.xlsx").await?;
/// println!("decoded {} rows", rows.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_rows(filepath: impl AsRef<Path>) -> Result<Vec<RawRow>> {
    let path = filepath.as_ref();
    check_extension(path)?;
    let bytes = read_upload(path).await?;
    decode_rows(bytes)
}

/// Read the complete byte buffer of an upload.
pub async fn read_upload(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(NodeStatusError::FileRead)?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Only spreadsheet files are accepted.
pub fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("xlsx") | Some("xls") | Some("xlsm") | Some("xlsb") | Some("ods") => Ok(()),
        Some(ext) => Err(NodeStatusError::Decode(format!(
            "Unsupported file extension: {ext}"
        ))),
        None => Err(NodeStatusError::Decode("File has no extension".into())),
    }
}

/// Decode spreadsheet bytes into rows keyed by the header row.
///
/// Row 1 of the first sheet supplies the headers. Empty and error cells are
/// left out of a row, and rows without any value are skipped.
///
/// # Arguments
/// * `bytes` - Complete file contents
///
/// # Returns
/// * `Result<Vec<RawRow>>` - Data rows in sheet order, or
///   `NodeStatusError::Decode` when the bytes are not a readable workbook
pub fn decode_rows(bytes: Vec<u8>) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| NodeStatusError::Decode("No sheets found in Excel file".into()))?;

    let range = workbook.worksheet_range(&sheet_name)?;

    let mut lines = range.rows();
    let Some(header_cells) = lines.next() else {
        info!("sheet '{}' is empty", sheet_name);
        return Ok(Vec::new());
    };
    let headers = header_names(header_cells);

    let mut rows = Vec::new();
    for line in lines {
        let row: RawRow = headers
            .iter()
            .zip(line.iter())
            .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.as_str(), v)))
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    info!(
        "decoded {} rows with {} columns from sheet '{}'",
        rows.len(),
        headers.len(),
        sheet_name
    );
    Ok(rows)
}

/// Turn the header line into unique keys: blank headers become `__EMPTY`,
/// repeats get a numeric suffix (`Name`, `Name_1`, `Name_2`, ...).
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut used = HashSet::new();
    cells
        .iter()
        .map(|cell| {
            let base = match cell_value(cell) {
                Some(value) => value.to_text(),
                None => "__EMPTY".to_string(),
            };
            let mut name = base.clone();
            let mut counter = 1;
            while used.contains(&name) {
                name = format!("{base}_{counter}");
                counter += 1;
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        build(worksheet);
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn decodes_headers_and_skips_empty_cells() {
        let bytes = workbook_bytes(|ws| {
            ws.write_string(0, 0, "Node").unwrap();
            ws.write_string(0, 1, "Packet Loss").unwrap();
            ws.write_string(0, 2, "IP Address").unwrap();
            ws.write_string(1, 0, "ATM-SUL-01").unwrap();
            ws.write_number(1, 1, 100).unwrap();
            ws.write_string(2, 0, "BR-ERB-02").unwrap();
            ws.write_string(2, 1, "0%").unwrap();
            ws.write_string(2, 2, "10.0.0.2").unwrap();
        });

        let rows = decode_rows(bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Packet Loss"), Some(&CellValue::Number(100.0)));
        assert!(!rows[0].contains("IP Address"));
        assert_eq!(rows[1].text_or("IP Address", "N/A"), "10.0.0.2");
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let bytes = workbook_bytes(|ws| {
            ws.write_string(0, 0, "Node").unwrap();
            ws.write_string(0, 1, "Node").unwrap();
            ws.write_string(0, 3, "Zone").unwrap();
            ws.write_string(1, 0, "a").unwrap();
            ws.write_string(1, 1, "b").unwrap();
            ws.write_string(1, 2, "c").unwrap();
            ws.write_string(1, 3, "d").unwrap();
        });

        let rows = decode_rows(bytes).unwrap();
        let headers: Vec<_> = rows[0].headers().collect();
        assert_eq!(headers, vec!["Node", "Node_1", "__EMPTY", "Zone"]);
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let bytes = workbook_bytes(|ws| {
            ws.write_string(0, 0, "Node").unwrap();
        });
        assert!(decode_rows(bytes).unwrap().is_empty());
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode_rows(b"definitely not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, NodeStatusError::Decode(_)));
    }

    #[test]
    fn extension_check() {
        assert!(check_extension(Path::new("nodes.XLSX")).is_ok());
        assert!(check_extension(Path::new("nodes.xls")).is_ok());
        assert!(matches!(
            check_extension(Path::new("nodes.csv")),
            Err(NodeStatusError::Decode(_))
        ));
        assert!(check_extension(Path::new("nodes")).is_err());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rows(dir.path().join("absent.xlsx")).await.unwrap_err();
        assert!(matches!(err, NodeStatusError::FileRead(_)));
    }
}
