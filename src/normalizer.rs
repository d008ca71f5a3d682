use log::debug;

use crate::cell::RawRow;
use crate::record::{IP_ADDRESS_FIELD, NODE_FIELD, NormalizedRecord, Status};

/// Derive the status from a packet-loss cell text.
///
/// All whitespace is removed first; only the exact texts `100%` and `100`
/// mean DOWN. `100.0%`, `99.9%` or an empty cell are UP.
///
/// # Examples
/// ```
/// use node_status::normalizer::classify;
/// use node_status::Status;
///
/// assert_eq!(classify(" 100 % "), Status::Down);
/// assert_eq!(classify("100.0%"), Status::Up);
/// ```
pub fn classify(packet_loss: &str) -> Status {
    let stripped: String = packet_loss
        .chars()
        .filter(|c| !is_js_whitespace(*c))
        .collect();

    if stripped == "100%" || stripped == "100" {
        Status::Down
    } else {
        Status::Up
    }
}

// browser whitespace: Unicode White_Space without NEL, plus the BOM
fn is_js_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Reshape one filtered row into a [`NormalizedRecord`].
pub fn normalize_row(row: &RawRow, packet_loss_header: &str) -> NormalizedRecord {
    let packet_loss = row
        .text_or(packet_loss_header, "0")
        .trim_matches(is_js_whitespace)
        .to_string();
    let status = classify(&packet_loss);

    let node = row
        .get(NODE_FIELD)
        .map(|value| value.to_text())
        .unwrap_or_default();
    let ip_address = row.text_or(IP_ADDRESS_FIELD, "N/A");

    let mut columns = Vec::with_capacity(row.len() + 2);
    let mut extra = Vec::new();
    for (header, value) in row.iter() {
        if header == packet_loss_header {
            continue;
        }
        columns.push(header.to_string());
        extra.push((header.to_string(), value.to_text()));
    }

    NormalizedRecord::new(node, status, ip_address, packet_loss, extra, columns)
}

/// Normalize every filtered row. Total: each row yields exactly one record.
pub fn normalize(rows: &[RawRow], packet_loss_header: &str) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = rows
        .iter()
        .map(|row| normalize_row(row, packet_loss_header))
        .collect();

    let down = records.iter().filter(|r| r.status() == Status::Down).count();
    debug!(
        "normalized {} records ({} DOWN, {} UP)",
        records.len(),
        down,
        records.len() - down
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn exact_text_classification() {
        for down in ["100", "100%", " 1 0 0 % ", "\t100\u{a0}%"] {
            assert_eq!(classify(down), Status::Down, "{down:?}");
        }
        for up in ["99%", "100.0%", "", "0", "99.99%", "1000"] {
            assert_eq!(classify(up), Status::Up, "{up:?}");
        }
    }

    #[test]
    fn next_line_is_not_whitespace() {
        assert_eq!(classify("100\u{85}"), Status::Up);
        assert_eq!(classify("\u{feff}100%"), Status::Down);
    }

    #[test]
    fn packet_loss_column_is_renamed() {
        let row: RawRow = vec![
            ("Node", CellValue::from("ATM-SUL-01")),
            ("% Packet Loss", CellValue::from(" 100 % ")),
            ("Site", CellValue::Number(7.0)),
        ]
        .into_iter()
        .collect();

        let record = normalize_row(&row, "% Packet Loss");
        assert_eq!(record.status(), Status::Down);
        assert_eq!(record.packet_loss(), "100 %");
        assert_eq!(record.ip_address(), "N/A");
        assert_eq!(record.get("% Packet Loss"), None);
        assert_eq!(record.get("Site"), Some("7"));
    }

    #[test]
    fn numeric_hundred_is_down_and_absent_loss_is_up() {
        let numeric: RawRow = vec![
            ("Node", CellValue::from("BR-SUL-1")),
            ("Packet loss", CellValue::Number(100.0)),
        ]
        .into_iter()
        .collect();
        let record = normalize_row(&numeric, "Packet loss");
        assert_eq!(record.status(), Status::Down);
        assert_eq!(record.packet_loss(), "100");

        let absent: RawRow = vec![("Node", CellValue::from("BR-SUL-2"))]
            .into_iter()
            .collect();
        let record = normalize_row(&absent, "Packet loss");
        assert_eq!(record.status(), Status::Up);
        assert_eq!(record.packet_loss(), "0");
    }

    #[test]
    fn same_text_same_status() {
        let rows: Vec<RawRow> = ["ATM-SUL-1", "ATM-SUL-2"]
            .iter()
            .map(|node| {
                vec![
                    ("Node", CellValue::from(*node)),
                    ("Packet loss", CellValue::from("100%")),
                ]
                .into_iter()
                .collect()
            })
            .collect();
        let records = normalize(&rows, "Packet loss");
        assert!(records.iter().all(|r| r.status() == Status::Down));
    }
}
