use crate::utils::error::ReconError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Transaction channel being reconciled. The wire tag is what the service
/// expects in the `recon_type` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconCategory {
    #[serde(rename = "atm")]
    Atm,
    #[serde(rename = "tele")]
    TeleBirrOutgoing,
    #[serde(rename = "mpesa")]
    MPesa,
    #[serde(rename = "tele-incoming")]
    TeleBirrIncoming,
}

impl ReconCategory {
    pub const ALL: [ReconCategory; 4] = [
        ReconCategory::Atm,
        ReconCategory::TeleBirrOutgoing,
        ReconCategory::MPesa,
        ReconCategory::TeleBirrIncoming,
    ];

    pub fn as_tag(&self) -> &'static str {
        match self {
            ReconCategory::Atm => "atm",
            ReconCategory::TeleBirrOutgoing => "tele",
            ReconCategory::MPesa => "mpesa",
            ReconCategory::TeleBirrIncoming => "tele-incoming",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReconCategory::Atm => "ATM Transactions",
            ReconCategory::TeleBirrOutgoing => "Tele Birr Out going",
            ReconCategory::MPesa => "M Pesa Transactions",
            ReconCategory::TeleBirrIncoming => "Tele Birr Incoming",
        }
    }
}

impl fmt::Display for ReconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for ReconCategory {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReconCategory::ALL
            .into_iter()
            .find(|category| category.as_tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ReconError::UnknownCategory {
                value: s.to_string(),
            })
    }
}

/// An uploaded ledger: the file name the operator picked and its raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct LedgerFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl LedgerFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        let extension = std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("xls") => "application/vnd.ms-excel",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Debug for LedgerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// A single cell of a server row. Anything the service sends that is not a
/// string, a number or null is kept as its JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum CellValue {
    Text(String),
    Number(serde_json::Number),
    Absent,
}

impl CellValue {
    /// Absent, null, "" and any casing of "nan" carry no information.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Absent => true,
            CellValue::Text(text) => text.is_empty() || text.eq_ignore_ascii_case("nan"),
            CellValue::Number(_) => false,
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) => format_number(number),
            CellValue::Absent => String::new(),
        }
    }
}

fn format_number(number: &serde_json::Number) -> String {
    if let Some(i) = number.as_i64() {
        i.to_string()
    } else if let Some(u) = number.as_u64() {
        u.to_string()
    } else if let Some(f) = number.as_f64() {
        format_float(f)
    } else {
        number.to_string()
    }
}

/// Plain notation between 1e-6 and 1e21, exponent notation with an explicit
/// sign outside it (`1e+21`, `1.5e-7`). Display prints 250.0 as "250".
fn format_float(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        let exponent = format!("{:e}", f);
        return match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exponent,
        };
    }
    f.to_string()
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Absent,
            serde_json::Value::String(text) => CellValue::Text(text),
            serde_json::Value::Number(number) => CellValue::Number(number),
            serde_json::Value::Bool(flag) => CellValue::Text(flag.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<CellValue> for serde_json::Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Text(text) => serde_json::Value::String(text),
            CellValue::Number(number) => serde_json::Value::Number(number),
            CellValue::Absent => serde_json::Value::Null,
        }
    }
}

static ABSENT: CellValue = CellValue::Absent;

/// One record of a result set. Field order is the order the server sent;
/// lookups by name go through `positions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "serde_json::Map<String, serde_json::Value>",
    into = "serde_json::Map<String, serde_json::Value>"
)]
pub struct Row {
    fields: Vec<(String, CellValue)>,
    positions: HashMap<String, usize>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: CellValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: CellValue) {
        let field = field.into();
        match self.positions.get(&field) {
            Some(&index) => self.fields[index].1 = value,
            None => {
                self.positions.insert(field.clone(), self.fields.len());
                self.fields.push((field, value));
            }
        }
    }

    /// A field missing from this row reads as `Absent`.
    pub fn get(&self, field: &str) -> &CellValue {
        self.positions
            .get(field)
            .map(|&index| &self.fields[index].1)
            .unwrap_or(&ABSENT)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Row {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut row = Row::new();
        for (name, value) in map {
            row.insert(name, CellValue::from(value));
        }
        row
    }
}

impl From<Row> for serde_json::Map<String, serde_json::Value> {
    fn from(row: Row) -> Self {
        row.fields
            .into_iter()
            .map(|(name, value)| (name, serde_json::Value::from(value)))
            .collect()
    }
}

/// Count per reconciliation status label. The label vocabulary belongs to the
/// service, so unknown labels are kept rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryCounts(BTreeMap<String, u64>);

impl SummaryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, count: u64) -> Self {
        self.0.insert(label.into(), count);
        self
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Sum of every count, recomputed on each call.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

/// JSON body of a successful preview call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub summary: SummaryCounts,
    // Sent by the service, never rendered.
    #[serde(default)]
    pub preview_data: Vec<Row>,
    #[serde(default)]
    pub mismatches: Vec<Row>,
}

/// The outcome of one successful preview. A new preview replaces it whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub status: String,
    pub summary: SummaryCounts,
    pub rows: Vec<Row>,
}

impl From<ReconResponse> for ResultSet {
    fn from(response: ReconResponse) -> Self {
        Self {
            status: response.status,
            summary: response.summary,
            rows: response.mismatches,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Preview,
    Download,
}

impl RequestMode {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            RequestMode::Preview => "reconcile",
            RequestMode::Download => "reconcile/download",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMode::Preview => f.write_str("preview"),
            RequestMode::Download => f.write_str("download"),
        }
    }
}

/// Borrowed view of a validated submission: both ledgers and the category.
#[derive(Debug, Clone, Copy)]
pub struct ReconRequest<'a> {
    pub primary: &'a LedgerFile,
    pub secondary: &'a LedgerFile,
    pub category: ReconCategory,
}

/// A downloaded report after it was handed to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub filename: String,
    pub size_bytes: usize,
}
