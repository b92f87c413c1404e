//! Interoperability exporter: multi-format serialization and the
//! compatibility report.

pub mod export;
pub mod report;

pub use export::{export_to_format, import_json, CSV_HEADER, XML_ROOT};
pub use report::{
    generate_interoperability_report, InteroperabilityReport, StandardCompatibility, REPORT_STANDARDS,
};
