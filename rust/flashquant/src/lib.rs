//! Label-free quantification of identified peptides.
//!
//! Isotopic envelopes traced from MS1 data are aggregated into
//! [`ChromatographicPeak`]s, one per elution event, together with the
//! identifications that explain them. Peaks that turn out to describe the same
//! event are merged, and every surviving peak is rendered as one row of a tab
//! separated report.

pub mod data_sources;
pub mod errors;
pub mod merge;
pub mod models;
pub mod report;
pub mod session;
pub mod utils;

pub use data_sources::{
    InputFormat,
    QuantInput,
};
pub use errors::{
    DataProcessingError,
    FlashQuantError,
    InputError,
    ReportError,
    Result,
};
pub use merge::merge_into;
pub use models::{
    ChromatographicPeak,
    Identification,
    IndexedPeak,
    IsotopicEnvelope,
    PeakStatus,
    ProteinGroup,
    SpectraFile,
};
pub use report::{
    ReportWriter,
    TSV_HEADER,
    format_row,
    to_tsv_line,
    write_report,
};
pub use session::{
    MergeGroup,
    QuantSession,
    SessionSummary,
};
