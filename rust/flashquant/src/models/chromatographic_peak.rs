use super::identification::Identification;
use super::isotopic_envelope::IsotopicEnvelope;
use super::spectra_file::SpectraFile;
use crate::utils::constants::VOIDED_INTENSITY;
use crate::utils::{
    ppm_error,
    to_mass,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Whether a peak still stands on its own or was absorbed by a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakStatus {
    #[default]
    Active,
    Voided,
}

/// A quantified elution event of one (or several ambiguous) peptides in one
/// spectral file.
///
/// The derived values (apex, intensity, mass error, charge state count) are
/// only valid after [`ChromatographicPeak::compute_statistics`] has been called
/// on the current envelope and identification sets. Nothing is updated
/// incrementally.
#[derive(Debug, Clone)]
pub struct ChromatographicPeak {
    spectra_file: Arc<SpectraFile>,
    is_mbr_feature: bool,
    identifications: Vec<Arc<Identification>>,
    envelopes: Vec<IsotopicEnvelope>,
    status: PeakStatus,

    /// Valley retention time where this peak was split from a neighbour.
    /// Zero means it was never split.
    pub split_rt: f64,

    // Derived
    intensity: f64,
    apex: Option<usize>,
    mass_error_ppm: f64,
    num_charge_states_observed: usize,
    num_distinct_base_sequences: usize,
    num_distinct_modified_sequences: usize,
}

impl ChromatographicPeak {
    /// A peak always starts from exactly one identification and no envelopes.
    pub fn new(
        identification: Arc<Identification>,
        is_mbr_feature: bool,
        spectra_file: Arc<SpectraFile>,
    ) -> Self {
        Self {
            spectra_file,
            is_mbr_feature,
            identifications: vec![identification],
            envelopes: Vec::new(),
            status: PeakStatus::Active,
            split_rt: 0.0,
            intensity: 0.0,
            apex: None,
            mass_error_ppm: f64::NAN,
            num_charge_states_observed: 0,
            num_distinct_base_sequences: 1,
            num_distinct_modified_sequences: 1,
        }
    }

    pub fn add_envelope(&mut self, envelope: IsotopicEnvelope) {
        self.envelopes.push(envelope);
    }

    pub fn extend_envelopes(&mut self, envelopes: impl IntoIterator<Item = IsotopicEnvelope>) {
        self.envelopes.extend(envelopes);
    }

    pub fn with_split_rt(self, split_rt: f64) -> Self {
        Self { split_rt, ..self }
    }

    pub fn compute_statistics(&mut self, integrate: bool) {
        // First envelope wins ties, so the apex depends on insertion order.
        let apex = self
            .envelopes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, env)| match best {
                Some((_, best_intensity)) if env.intensity <= best_intensity => best,
                _ => Some((i, env.intensity)),
            });

        let Some((apex_idx, apex_intensity)) = apex else {
            self.intensity = 0.0;
            self.mass_error_ppm = f64::NAN;
            self.num_charge_states_observed = 0;
            self.apex = None;
            return;
        };

        self.apex = Some(apex_idx);
        self.intensity = if integrate {
            self.envelopes.iter().map(|env| env.intensity).sum()
        } else {
            apex_intensity
        };

        let apex_env = &self.envelopes[apex_idx];
        let observed_mass = to_mass(apex_env.mz(), apex_env.charge_state);
        // NOTE: this is the smallest *signed* error, not the smallest magnitude.
        // Kept as-is so reports stay comparable with older runs.
        self.mass_error_ppm = self
            .identifications
            .iter()
            .map(|id| ppm_error(observed_mass, id.monoisotopic_mass))
            .reduce(f64::min)
            .unwrap_or(f64::NAN);

        self.num_charge_states_observed = self
            .envelopes
            .iter()
            .map(|env| env.charge_state)
            .collect::<HashSet<_>>()
            .len();
    }

    pub fn resolve_identifications(&mut self) {
        self.num_distinct_base_sequences = self.distinct_base_sequences().len();
        self.num_distinct_modified_sequences = self.distinct_modified_sequences().len();
    }

    /// Pulls in the identifications and envelopes of `other` without touching
    /// it. Envelopes whose raw peak is already referenced here are skipped.
    pub(crate) fn absorb(&mut self, other: &ChromatographicPeak) {
        for id in other.identifications.iter() {
            let already_present = self
                .identifications
                .iter()
                .any(|x| Identification::same_identity(x, id));
            if !already_present {
                self.identifications.push(id.clone());
            }
        }
        self.resolve_identifications();

        let mut seen_peaks: HashSet<_> = self.envelopes.iter().map(|env| env.peak_key()).collect();
        for env in other.envelopes.iter() {
            if seen_peaks.insert(env.peak_key()) {
                self.envelopes.push(env.clone());
            }
        }
    }

    pub(crate) fn void(&mut self) {
        self.status = PeakStatus::Voided;
        self.intensity = VOIDED_INTENSITY;
    }

    pub fn status(&self) -> PeakStatus {
        self.status
    }

    pub fn is_voided(&self) -> bool {
        self.status == PeakStatus::Voided
    }

    pub fn spectra_file(&self) -> &Arc<SpectraFile> {
        &self.spectra_file
    }

    pub fn is_mbr_feature(&self) -> bool {
        self.is_mbr_feature
    }

    pub fn identifications(&self) -> &[Arc<Identification>] {
        &self.identifications
    }

    /// The identification the peak was created from.
    pub fn seed_identification(&self) -> &Arc<Identification> {
        &self.identifications[0]
    }

    pub fn envelopes(&self) -> &[IsotopicEnvelope] {
        &self.envelopes
    }

    pub fn apex(&self) -> Option<&IsotopicEnvelope> {
        self.apex.map(|idx| &self.envelopes[idx])
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn mass_error_ppm(&self) -> f64 {
        self.mass_error_ppm
    }

    pub fn num_charge_states_observed(&self) -> usize {
        self.num_charge_states_observed
    }

    pub fn num_distinct_base_sequences(&self) -> usize {
        self.num_distinct_base_sequences
    }

    pub fn num_distinct_modified_sequences(&self) -> usize {
        self.num_distinct_modified_sequences
    }

    /// Distinct base sequences in the order they were first attached.
    pub fn distinct_base_sequences(&self) -> Vec<&str> {
        distinct_in_order(self.identifications.iter().map(|id| id.base_sequence.as_ref()))
    }

    /// Distinct modified sequences in the order they were first attached.
    pub fn distinct_modified_sequences(&self) -> Vec<&str> {
        distinct_in_order(
            self.identifications
                .iter()
                .map(|id| id.modified_sequence.as_ref()),
        )
    }

    /// Distinct protein group names of all identifications, sorted ignoring
    /// case. Names differing only in case are ordered bytewise.
    pub fn protein_group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .identifications
            .iter()
            .flat_map(|id| id.protein_groups().iter().map(|pg| pg.name.as_str()))
            .collect();
        names.sort_unstable_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        names.dedup();
        names
    }

    /// Earliest and latest envelope retention time, `None` when there is no apex.
    pub fn rt_bounds(&self) -> Option<(f64, f64)> {
        self.apex?;
        let bounds = self
            .envelopes
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), env| {
                (lo.min(env.retention_time), hi.max(env.retention_time))
            });
        Some(bounds)
    }
}

fn distinct_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items.filter(|x| seen.insert(*x)).collect()
}
