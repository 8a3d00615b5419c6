use super::indexed_peak::IndexedPeak;
use std::sync::Arc;

/// One time point of a peptide's isotope cluster at a single charge state.
#[derive(Debug, Clone)]
pub struct IsotopicEnvelope {
    indexed_peak: Arc<IndexedPeak>,
    pub charge_state: i32,
    pub retention_time: f64,
    pub intensity: f64,
}

impl IsotopicEnvelope {
    /// The retention time of the envelope is the one of the peak it points to.
    pub fn new(indexed_peak: Arc<IndexedPeak>, charge_state: i32, intensity: f64) -> Self {
        let retention_time = indexed_peak.retention_time;
        Self {
            indexed_peak,
            charge_state,
            retention_time,
            intensity,
        }
    }

    pub fn indexed_peak(&self) -> &Arc<IndexedPeak> {
        &self.indexed_peak
    }

    pub fn mz(&self) -> f64 {
        self.indexed_peak.mz
    }

    /// Address of the referenced peak, used to tell envelopes built on the
    /// same raw peak apart from structurally equal ones.
    pub(crate) fn peak_key(&self) -> *const IndexedPeak {
        Arc::as_ptr(&self.indexed_peak)
    }
}
