//! Consolidation of peaks that describe the same elution event.
//!
//! Which peaks belong together is decided upstream (retention time overlap,
//! shared raw peaks, ...). This module only performs the merge: the target
//! takes over the identifications and envelopes of every source and the
//! sources are voided. Voided peaks stay wherever the caller keeps them and
//! have to be filtered out before reporting.

use crate::errors::DataProcessingError;
use crate::models::ChromatographicPeak;
use tracing::debug;

impl ChromatographicPeak {
    /// Merges every peak in `sources` into `self`, in iteration order.
    ///
    /// Statistics are recomputed once, after all sources were absorbed.
    pub fn merge_with<'a>(
        &mut self,
        sources: impl IntoIterator<Item = &'a mut ChromatographicPeak>,
        integrate: bool,
    ) {
        for source in sources {
            self.absorb(source);
            source.void();
        }
        self.compute_statistics(integrate);
    }
}

/// Index based form of [`ChromatographicPeak::merge_with`] for peaks that live
/// in one collection.
///
/// Source indices equal to `target` are skipped. All indices are checked
/// before anything is touched, so on error the peaks are left as they were.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip(peaks), level = "trace")
)]
pub fn merge_into(
    peaks: &mut [ChromatographicPeak],
    target: usize,
    sources: &[usize],
    integrate: bool,
) -> Result<(), DataProcessingError> {
    let npeaks = peaks.len();
    if target >= npeaks {
        return Err(DataProcessingError::IndexOutOfBounds(target));
    }
    if let Some(&bad) = sources.iter().find(|&&idx| idx >= npeaks) {
        return Err(DataProcessingError::IndexOutOfBounds(bad));
    }

    for &source_idx in sources.iter().filter(|&&idx| idx != target) {
        let (target_peak, source_peak) = pair_mut(peaks, target, source_idx);
        debug!(
            "Merging peak {} ({} ids, {} envelopes) into peak {}",
            source_idx,
            source_peak.identifications().len(),
            source_peak.envelopes().len(),
            target,
        );
        target_peak.absorb(source_peak);
        source_peak.void();
    }
    peaks[target].compute_statistics(integrate);
    Ok(())
}

/// Two mutable references into the same slice, `a` and `b` must differ.
fn pair_mut<T>(slice: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "Cannot borrow the same element twice");
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Identification,
        IndexedPeak,
        IsotopicEnvelope,
        PeakStatus,
        SpectraFile,
    };
    use std::sync::Arc;

    struct Fixture {
        file: Arc<SpectraFile>,
        raw_peaks: Vec<Arc<IndexedPeak>>,
    }

    impl Fixture {
        fn new() -> Self {
            let raw_peaks = (0..6)
                .map(|i| {
                    Arc::new(IndexedPeak::new(
                        500.27,
                        100.0 * (i + 1) as f64,
                        10.0 + 0.1 * i as f64,
                        i,
                    ))
                })
                .collect();
            Self {
                file: Arc::new(SpectraFile::new("run1.mzML")),
                raw_peaks,
            }
        }

        fn id(&self, base: &str, modified: &str) -> Arc<Identification> {
            Arc::new(Identification::new(
                self.file.clone(),
                base,
                modified,
                998.53,
                10.2,
                2,
                vec![],
            ))
        }

        fn peak(&self, id: Arc<Identification>, raw_idx: &[usize]) -> ChromatographicPeak {
            let mut peak = ChromatographicPeak::new(id, false, self.file.clone());
            for &i in raw_idx {
                let raw = self.raw_peaks[i].clone();
                let intensity = raw.intensity;
                peak.add_envelope(IsotopicEnvelope::new(raw, 2, intensity));
            }
            peak
        }
    }

    #[test]
    fn test_merge_unions_and_voids() {
        let fx = Fixture::new();
        let shared_id = fx.id("PEPTIDE", "PEPTIDE");
        let mut a = fx.peak(shared_id.clone(), &[0, 1, 2]);
        let mut b = fx.peak(shared_id.clone(), &[2, 3]);
        b.identifications_push_for_test(fx.id("PEPTIDE", "PEPT[Oxidation]IDE"));

        a.merge_with([&mut b], true);

        // shared_id is only kept once, the oxidized one is new
        assert_eq!(a.identifications().len(), 2);
        assert!(Identification::same_identity(&a.identifications()[0], &shared_id));
        assert_eq!(a.num_distinct_base_sequences(), 1);
        assert_eq!(a.num_distinct_modified_sequences(), 2);

        // raw peak 2 is referenced by both, so only peak 3 is new
        assert_eq!(a.envelopes().len(), 4);
        assert_eq!(a.intensity(), 100.0 + 200.0 + 300.0 + 400.0);

        assert_eq!(b.intensity(), -1.0);
        assert_eq!(b.status(), PeakStatus::Voided);
        assert!(b.is_voided());
    }

    #[test]
    fn test_merge_distinct_records_with_same_sequence_are_kept() {
        let fx = Fixture::new();
        let mut a = fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[0]);
        let mut b = fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[1]);
        a.merge_with([&mut b], true);

        assert_eq!(a.identifications().len(), 2);
        assert_eq!(a.num_distinct_base_sequences(), 1);
        assert_eq!(a.num_distinct_modified_sequences(), 1);
    }

    #[test]
    fn test_merge_deduplicates_by_raw_peak_not_envelope() {
        let fx = Fixture::new();
        let mut a = fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[0]);
        let mut b = fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[]);
        // Separately built envelope on the same raw peak, different charge.
        b.add_envelope(IsotopicEnvelope::new(fx.raw_peaks[0].clone(), 3, 5.0));
        // Structurally equal raw peak, different allocation.
        let lookalike = Arc::new((*fx.raw_peaks[0]).clone());
        b.add_envelope(IsotopicEnvelope::new(lookalike, 2, 100.0));

        a.merge_with([&mut b], true);
        assert_eq!(a.envelopes().len(), 2);
    }

    #[test]
    fn test_merge_source_with_repeated_raw_peak_keeps_one() {
        let fx = Fixture::new();
        let mut a = fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[0]);
        let mut b = fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[4, 4]);
        assert_eq!(b.envelopes().len(), 2);

        a.merge_with([&mut b], true);
        assert_eq!(a.envelopes().len(), 2);
        assert_eq!(a.intensity(), 100.0 + 500.0);
    }

    #[test]
    fn test_merge_twice_does_not_duplicate_envelopes() {
        let fx = Fixture::new();
        let mut peaks = vec![
            fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[0, 1]),
            fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[1, 2, 3]),
        ];
        merge_into(&mut peaks, 0, &[1], true).unwrap();
        assert_eq!(peaks[0].envelopes().len(), 4);
        let ids_after_first = peaks[0].identifications().len();

        merge_into(&mut peaks, 0, &[1], true).unwrap();
        assert_eq!(peaks[0].envelopes().len(), 4);
        assert_eq!(peaks[0].identifications().len(), ids_after_first);
        assert!(peaks[1].is_voided());
    }

    #[test]
    fn test_merge_into_skips_target_and_handles_order() {
        let fx = Fixture::new();
        let mut peaks = vec![
            fx.peak(fx.id("AAAK", "AAAK"), &[0]),
            fx.peak(fx.id("CCCK", "CCCK"), &[1]),
            fx.peak(fx.id("DDDK", "DDDK"), &[2]),
        ];
        // Target sits after one of its sources.
        merge_into(&mut peaks, 1, &[0, 1, 2], false).unwrap();

        assert!(!peaks[1].is_voided());
        assert!(peaks[0].is_voided());
        assert!(peaks[2].is_voided());
        let bases = peaks[1].distinct_base_sequences();
        assert_eq!(bases, vec!["CCCK", "AAAK", "DDDK"]);
        // apex only mode, raw peak 2 is the most intense
        assert_eq!(peaks[1].intensity(), 300.0);
    }

    #[test]
    fn test_merge_with_no_sources_recomputes() {
        let fx = Fixture::new();
        let mut peaks = vec![fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[0, 1])];
        assert_eq!(peaks[0].intensity(), 0.0);
        merge_into(&mut peaks, 0, &[], true).unwrap();
        assert_eq!(peaks[0].intensity(), 300.0);
        assert!(!peaks[0].is_voided());
    }

    #[test]
    fn test_merge_into_out_of_bounds_is_untouched() {
        let fx = Fixture::new();
        let mut peaks = vec![
            fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[0]),
            fx.peak(fx.id("PEPTIDE", "PEPTIDE"), &[1]),
        ];
        let res = merge_into(&mut peaks, 0, &[1, 7], true);
        assert!(matches!(res, Err(DataProcessingError::IndexOutOfBounds(7))));
        assert!(!peaks[1].is_voided());
        assert_eq!(peaks[0].identifications().len(), 1);

        let res = merge_into(&mut peaks, 3, &[0], true);
        assert!(matches!(res, Err(DataProcessingError::IndexOutOfBounds(3))));
    }

    impl ChromatographicPeak {
        fn identifications_push_for_test(&mut self, id: Arc<Identification>) {
            let other = ChromatographicPeak::new(id, false, self.spectra_file().clone());
            self.absorb(&other);
        }
    }
}
