use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoanDataError;

/// Market convention the record is documented under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataStandard {
    #[default]
    Lma,
    Lsta,
    Aplma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Xml,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Xml, ExportFormat::Csv];

    /// Only JSON carries the full record; XML and CSV are summaries.
    pub fn is_lossless(&self) -> bool {
        matches!(self, ExportFormat::Json)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Csv => "csv",
        };
        f.write_str(s)
    }
}

impl FromStr for ExportFormat {
    type Err = LoanDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(LoanDataError::InvalidInput {
                field: "format".into(),
                reason: format!("unsupported export format '{other}' (expected json, xml or csv)"),
            }),
        }
    }
}

pub const DEFAULT_MAPPING_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interoperability {
    pub source_system: String,
    #[serde(default)]
    pub target_systems: Vec<String>,
    pub mapping_version: String,
    #[serde(default)]
    pub supported_formats: Vec<ExportFormat>,
}

impl Interoperability {
    pub fn for_source(source_system: impl Into<String>) -> Self {
        Self {
            source_system: source_system.into(),
            target_systems: Vec::new(),
            mapping_version: DEFAULT_MAPPING_VERSION.to_string(),
            supported_formats: ExportFormat::ALL.to_vec(),
        }
    }
}
