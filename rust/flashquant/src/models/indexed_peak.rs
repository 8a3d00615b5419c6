/// A centroided MS1 peak as stored in the peak index of a spectral file.
///
/// Peaks are owned by whoever built the index, envelopes only hold an
/// `Arc<IndexedPeak>` and compare those by pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPeak {
    pub mz: f64,
    pub intensity: f64,
    pub retention_time: f64,
    pub zero_based_ms1_scan_index: usize,
}

impl IndexedPeak {
    pub fn new(mz: f64, intensity: f64, retention_time: f64, zero_based_ms1_scan_index: usize) -> Self {
        Self {
            mz,
            intensity,
            retention_time,
            zero_based_ms1_scan_index,
        }
    }
}
