//! Response types for the logger web API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CsiClientError, Result};

// =============================================================================
// Data Query Types
// =============================================================================

/// One field descriptor from a table header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Unit string; the device omits the key for unitless fields.
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    /// Aggregation the logger program applied (Avg, Min, Tot, ...).
    #[serde(default)]
    pub process: Option<String>,
}

/// Header of a `dataquery` JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableHead {
    pub fields: Vec<FieldDescriptor>,
}

/// One timestamped record. `vals` is aligned positionally to `head.fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub time: String,
    /// Record number; present on newer firmware only.
    #[serde(default)]
    pub no: Option<u64>,
    pub vals: Vec<serde_json::Value>,
}

/// Raw shape of a `dataquery` JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResponse {
    pub head: TableHead,
    #[serde(default)]
    pub data: Vec<Record>,
}

impl TableResponse {
    /// Names of all fields in header order.
    pub fn field_names(&self) -> Vec<String> {
        self.head.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Normalize the most recent record into a field -> reading map.
    ///
    /// Zips `head.fields[i].name` against `data[0].vals[i]`; a field with no
    /// `units` key gets an empty unit string, never an error.
    pub fn latest(&self) -> Result<TableData> {
        let record = self
            .data
            .first()
            .ok_or_else(|| CsiClientError::Decode("table returned no records".to_string()))?;

        let readings = self
            .head
            .fields
            .iter()
            .zip(record.vals.iter())
            .map(|(field, value)| {
                (
                    field.name.clone(),
                    Reading {
                        value: value.clone(),
                        units: field.units.clone().unwrap_or_default(),
                    },
                )
            })
            .collect();

        Ok(TableData {
            time: record.time.clone(),
            readings,
        })
    }
}

/// One measured value with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: serde_json::Value,
    pub units: String,
}

impl Reading {
    /// Get the value as f64 (for numeric readings)
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Get the value as string
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Normalized view of the most recent record of one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableData {
    /// Record timestamp as reported by the device.
    pub time: String,
    pub readings: BTreeMap<String, Reading>,
}

impl TableData {
    /// Look up one reading by field name.
    pub fn reading(&self, field: &str) -> Option<&Reading> {
        self.readings.get(field)
    }
}

/// Fan-out result across the configured tables.
///
/// Partial results are expected: a table that failed lands in `errors` and
/// never aborts the others.
#[derive(Debug, Default)]
pub struct MultiTableData {
    pub tables: BTreeMap<String, TableData>,
    pub errors: BTreeMap<String, CsiClientError>,
}

impl MultiTableData {
    /// Whether every configured table answered.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Symbol Browse Types
// =============================================================================

/// One symbol (table or field) reported by `browsesymbols`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, rename = "type")]
    pub symbol_type: Option<u32>,
}

/// Shape of a `browsesymbols` JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolList {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

// =============================================================================
// Clock Types
// =============================================================================

/// Shape of a `ClockCheck` JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockResponse {
    pub time: String,
}
