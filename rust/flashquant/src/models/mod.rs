mod chromatographic_peak;
mod identification;
mod indexed_peak;
mod isotopic_envelope;
mod protein_group;
mod spectra_file;

pub use chromatographic_peak::{
    ChromatographicPeak,
    PeakStatus,
};
pub use identification::Identification;
pub use indexed_peak::IndexedPeak;
pub use isotopic_envelope::IsotopicEnvelope;
pub use protein_group::ProteinGroup;
pub use spectra_file::SpectraFile;
