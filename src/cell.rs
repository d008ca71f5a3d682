use serde::{Deserialize, Serialize};

/// A single decoded cell. Absence is modelled by the key being missing from
/// the [`RawRow`], never by a variant here.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Render the value the way the upload tool has always printed cells:
    /// integral numbers lose their fractional part, `-0` prints as `0`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => number_to_text(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Empty text, zero, NaN and `false` count as "no value" for the
    /// column fallbacks (`Node` -> "", packet loss -> "0", IP -> "N/A").
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Bool(b) => *b,
        }
    }
}

fn number_to_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // shortest digits, signed exponent: 1e+21, 1.5e-7
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

/// One decoded data row: header -> cell, in column order.
///
/// Headers are unique within a row; cells that were empty in the sheet are
/// simply not present.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    /// An empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a cell. A new header is appended after the
    /// existing ones; an existing header keeps its position.
    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        let header = header.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some((_, v)) => *v = value,
            None => self.cells.push((header, value)),
        }
    }

    /// The cell under `header`, if the sheet had a value there.
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(h, _)| h == header).map(|(_, v)| v)
    }

    /// Whether `header` has a value in this row.
    pub fn contains(&self, header: &str) -> bool {
        self.get(header).is_some()
    }

    /// Headers in column order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    /// Header/cell pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }

    /// Number of present cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Text of a cell with the upload tool's fallback: a missing or falsy
    /// cell yields `default`.
    pub fn text_or(&self, header: &str, default: &str) -> String {
        match self.get(header) {
            Some(value) if value.is_truthy() => value.to_text(),
            _ => default.to_string(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(CellValue::Number(100.0).to_text(), "100");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert_eq!(CellValue::Number(-0.0).to_text(), "0");
        assert_eq!(CellValue::Number(f64::INFINITY).to_text(), "Infinity");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(CellValue::Number(1e21).to_text(), "1e+21");
        assert_eq!(CellValue::Number(-2.5e22).to_text(), "-2.5e+22");
        assert_eq!(CellValue::Number(1e-7).to_text(), "1e-7");
        assert_eq!(CellValue::Number(1.5e-7).to_text(), "1.5e-7");
        assert_eq!(CellValue::Number(1e20).to_text(), "100000000000000000000");
        assert_eq!(CellValue::Number(0.000001).to_text(), "0.000001");
    }

    #[test]
    fn falsy_values_use_fallback() {
        let row: RawRow = vec![
            ("Node", CellValue::from("")),
            ("IP Address", CellValue::Number(0.0)),
            ("Packet Loss", CellValue::Bool(false)),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.text_or("Node", ""), "");
        assert_eq!(row.text_or("IP Address", "N/A"), "N/A");
        assert_eq!(row.text_or("Packet Loss", "0"), "0");
        assert_eq!(row.text_or("Missing", "N/A"), "N/A");
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut row = RawRow::new();
        row.insert("A", CellValue::from("1"));
        row.insert("B", CellValue::from("2"));
        row.insert("A", CellValue::from("3"));

        let headers: Vec<_> = row.headers().collect();
        assert_eq!(headers, vec!["A", "B"]);
        assert_eq!(row.get("A"), Some(&CellValue::from("3")));
    }
}
