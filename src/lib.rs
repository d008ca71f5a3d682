/*!
# Node Status

Turns a spreadsheet of network-node telemetry into an UP/DOWN status table
and re-exports it as a styled workbook or a PNG snapshot.

## Pipeline

Data flows strictly one way:

```text
file bytes -> decoded rows -> validated rows -> filtered rows
           -> normalized + classified records -> sorted records
           -> (table | workbook | snapshot)
```

- **loader**: reads the upload and decodes the first sheet into rows keyed
  by the header row
- **schema**: requires a `Node` column and a `Packet loss` / `% Packet Loss`
  column (the latter matched trimmed and case-insensitively)
- **filter**: keeps nodes starting with one of the site prefixes
  (`ATM-SUL`, `ATM-DUK`, `ATM-ERB`, `BR-SUL`, `BR-DUK`, `BR-ERB`) that do not
  contain `-SW`
- **normalizer**: a node is DOWN when its packet loss reads exactly `100%`
  or `100` once whitespace is removed, UP otherwise
- **sort**: DOWN before UP, then node name in locale order
- **downloader**: `Modified_Node_Status.xlsx` with a coloured Status column
  and auto-sized columns
- **snapshot**: `node_status_snapshot.png`, the node/status card drawn at 2x
  on a transparent background

## Session

[`session::Session`] holds the state shown to the user (records, current
error, snapshot, loading flag) and replaces it as a whole after each run.
Nothing is persisted between sessions.

## Modules

- **cell**: decoded cell values and rows
- **config**: settings with the default allow-list and output names
- **error**: reported error conditions
- **record**: status and normalized record types
- **collation**: locale-style string ordering
- **table**: plain-text table rendering
*/

pub mod cell;
pub mod collation;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod session;
pub mod snapshot;
pub mod sort;
pub mod table;

pub use cell::{CellValue, RawRow};
pub use config::Settings;
pub use error::{NodeStatusError, Result};
pub use pipeline::process_rows;
pub use record::{NormalizedRecord, Status};
pub use session::{Session, SessionState};
