use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Output field names.
pub const NODE_FIELD: &str = "Node";
pub const STATUS_FIELD: &str = "Status";
pub const IP_ADDRESS_FIELD: &str = "IP Address";
pub const PACKET_LOSS_FIELD: &str = "Packet loss";

/// Derived reachability of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "UP")]
    Up,
}

impl Status {
    /// `"DOWN"` or `"UP"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Down => "DOWN",
            Status::Up => "UP",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized node row.
///
/// The four well-known fields are typed; every other source column is kept
/// as text in `extra`. `columns` records the field order used by the table
/// and the workbook export.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRecord {
    node: String,
    status: Status,
    ip_address: String,
    packet_loss: String,
    extra: Vec<(String, String)>,
    columns: Vec<String>,
}

impl NormalizedRecord {
    /// Build a record. `source_columns` are the remaining source headers in
    /// order (packet-loss column already removed); well-known fields missing
    /// from it are appended as `Status`, `IP Address`, `Packet loss`.
    pub fn new(
        node: String,
        status: Status,
        ip_address: String,
        packet_loss: String,
        extra: Vec<(String, String)>,
        source_columns: Vec<String>,
    ) -> Self {
        let mut columns = source_columns;
        for field in [NODE_FIELD, STATUS_FIELD, IP_ADDRESS_FIELD, PACKET_LOSS_FIELD] {
            if !columns.iter().any(|c| c == field) {
                columns.push(field.to_string());
            }
        }
        // drop extras that collide with a typed field or were not listed
        let extra = extra
            .into_iter()
            .filter(|(k, _)| !is_typed_field(k) && columns.contains(k))
            .collect();

        Self {
            node,
            status,
            ip_address,
            packet_loss,
            extra,
            columns,
        }
    }

    /// Node name as it appeared in the sheet.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Derived status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// IP address text, `N/A` when the sheet had none.
    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    /// Trimmed packet-loss text the status was derived from.
    pub fn packet_loss(&self) -> &str {
        &self.packet_loss
    }

    /// The remaining source columns as text.
    pub fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Field names in display order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Text of a field by header name.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            NODE_FIELD => Some(&self.node),
            STATUS_FIELD => Some(self.status.as_str()),
            IP_ADDRESS_FIELD => Some(&self.ip_address),
            PACKET_LOSS_FIELD => Some(&self.packet_loss),
            _ => self
                .extra
                .iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// `(header, value)` pairs in display order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter_map(|c| self.get(c).map(|v| (c.as_str(), v)))
    }
}

fn is_typed_field(name: &str) -> bool {
    matches!(
        name,
        NODE_FIELD | STATUS_FIELD | IP_ADDRESS_FIELD | PACKET_LOSS_FIELD
    )
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (key, value) in self.fields() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
