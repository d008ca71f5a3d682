use unicode_width::UnicodeWidthStr;

use crate::downloader::export_headers;
use crate::record::NormalizedRecord;

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{}{}", text, " ".repeat(fill))
}

/// Render the records as a plain-text table: one header line, a rule, then
/// one line per record. Columns are the export columns.
pub fn render_table(records: &[NormalizedRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let headers = export_headers(records);
    let widths: Vec<usize> = headers
        .iter()
        .map(|header| {
            records
                .iter()
                .filter_map(|r| r.get(header))
                .map(UnicodeWidthStr::width)
                .chain(std::iter::once(UnicodeWidthStr::width(header.as_str())))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for record in records {
        let line: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(record.get(h).unwrap_or(""), *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Print the table to stdout.
pub fn print_table(records: &[NormalizedRecord]) {
    print!("{}", render_table(records));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;

    #[test]
    fn aligns_columns() {
        let records = vec![NormalizedRecord::new(
            "ATM-SUL-01".into(),
            Status::Down,
            "N/A".into(),
            "100%".into(),
            vec![],
            vec!["Node".into()],
        )];

        let table = render_table(&records);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "Node        Status  IP Address  Packet loss");
        assert_eq!(lines[2], "ATM-SUL-01  DOWN    N/A         100%");
    }

    #[test]
    fn empty_is_blank() {
        assert!(render_table(&[]).is_empty());
    }
}
