//! Batch driver: applies merge groups, computes statistics and hands out
//! the peaks that survive.
//!
//! Merges run one after the other since a merge needs exclusive access to
//! every peak it touches. Statistics are then computed for all active peaks
//! in parallel, each peak is owned by a single worker. All voiding is done
//! before the parallel pass starts.

use crate::errors::DataProcessingError;
use crate::merge::merge_into;
use crate::models::{
    ChromatographicPeak,
    IndexedPeak,
    SpectraFile,
};
use rayon::iter::{
    FromParallelIterator,
    IntoParallelIterator,
    IntoParallelRefIterator,
    IntoParallelRefMutIterator,
    ParallelIterator,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{
    debug,
    info,
    warn,
};

/// Peaks believed to be the same elution event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    pub target: usize,
    pub sources: Vec<usize>,
}

impl MergeGroup {
    /// The first member becomes the target, `None` for an empty group.
    pub fn from_members(members: Vec<usize>) -> Option<Self> {
        let (&target, rest) = members.split_first()?;
        Some(Self {
            target,
            sources: rest.to_vec(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub active: usize,
    pub voided: usize,
    pub mbr: usize,
    /// Active peaks without any envelope.
    pub unquantified: usize,
}

impl SessionSummary {
    fn reduce(mut self, other: Self) -> Self {
        self.active += other.active;
        self.voided += other.voided;
        self.mbr += other.mbr;
        self.unquantified += other.unquantified;
        self
    }

    fn fold(mut self, peak: &ChromatographicPeak) -> Self {
        if peak.is_voided() {
            self.voided += 1;
            return self;
        }
        self.active += 1;
        if peak.is_mbr_feature() {
            self.mbr += 1;
        }
        if peak.apex().is_none() {
            self.unquantified += 1;
        }
        self
    }
}

impl<'a> FromIterator<&'a ChromatographicPeak> for SessionSummary {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = &'a ChromatographicPeak>,
    {
        iter.into_iter()
            .fold(SessionSummary::default(), SessionSummary::fold)
    }
}

impl<'a> FromParallelIterator<&'a ChromatographicPeak> for SessionSummary {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = &'a ChromatographicPeak>,
    {
        par_iter
            .into_par_iter()
            .fold(SessionSummary::default, SessionSummary::fold)
            .reduce(SessionSummary::default, SessionSummary::reduce)
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} active peaks ({} MBR, {} without envelopes), {} voided by merges",
            self.active, self.mbr, self.unquantified, self.voided
        )
    }
}

#[derive(Debug, Clone)]
pub struct QuantSession {
    peaks: Vec<ChromatographicPeak>,
    merge_groups: Vec<MergeGroup>,
    // Where each voided peak ended up.
    absorbed_into: Vec<Option<usize>>,
}

impl QuantSession {
    pub fn new(peaks: Vec<ChromatographicPeak>, merge_groups: Vec<MergeGroup>) -> Self {
        let absorbed_into = vec![None; peaks.len()];
        Self {
            peaks,
            merge_groups,
            absorbed_into,
        }
    }

    pub fn peaks(&self) -> &[ChromatographicPeak] {
        &self.peaks
    }

    pub fn merge_groups(&self) -> &[MergeGroup] {
        &self.merge_groups
    }

    pub fn into_peaks(self) -> Vec<ChromatographicPeak> {
        self.peaks
    }

    /// Non-voided peaks, in input order.
    pub fn active_peaks(&self) -> impl Iterator<Item = &ChromatographicPeak> {
        self.peaks.iter().filter(|p| !p.is_voided())
    }

    pub fn summary(&self) -> SessionSummary {
        self.peaks.par_iter().collect()
    }

    /// Applies all merge groups, then computes statistics of every active peak.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip(self), level = "trace")
    )]
    pub fn consolidate(&mut self, integrate: bool) -> Result<SessionSummary, DataProcessingError> {
        let groups = std::mem::take(&mut self.merge_groups);
        for group in groups.iter() {
            self.apply_merge_group(group, integrate)?;
        }
        self.merge_groups = groups;

        self.compute_statistics(integrate);
        let summary = self.summary();
        if summary.unquantified > 0 {
            warn!("{} active peaks have no envelopes and report zero intensity", summary.unquantified);
        }
        info!("Consolidated peaks: {}", summary);
        Ok(summary)
    }

    /// Merges a group. Members already absorbed by an earlier group are
    /// replaced by the active peak that holds their content, so every raw
    /// signal stays in a single active peak.
    pub fn apply_merge_group(&mut self, group: &MergeGroup, integrate: bool) -> Result<(), DataProcessingError> {
        let members = || group.sources.iter().chain(std::iter::once(&group.target)).copied();
        if let Some(bad) = members().find(|&m| m >= self.peaks.len()) {
            return Err(DataProcessingError::IndexOutOfBounds(bad));
        }

        let target = self.final_owner(group.target);
        if target != group.target {
            debug!(
                "Merge target {} was already absorbed, merging into {} instead",
                group.target, target
            );
        }

        let mut owners: Vec<usize> = Vec::with_capacity(group.sources.len());
        for member in members() {
            let owner = self.final_owner(member);
            if owner != target && !owners.contains(&owner) {
                owners.push(owner);
            }
        }

        merge_into(&mut self.peaks, target, &owners, integrate)?;
        for idx in members().chain(owners.iter().copied()) {
            if idx != target {
                self.absorbed_into[idx] = Some(target);
            }
        }
        Ok(())
    }

    fn final_owner(&self, mut idx: usize) -> usize {
        // Chains are acyclic: a peak is only ever absorbed by an active one.
        while let Some(next) = self.absorbed_into[idx] {
            idx = next;
        }
        idx
    }

    /// Recomputes ambiguity counts and statistics of every active peak.
    pub fn compute_statistics(&mut self, integrate: bool) {
        self.peaks
            .par_iter_mut()
            .filter(|peak| !peak.is_voided())
            .for_each(|peak| {
                peak.resolve_identifications();
                peak.compute_statistics(integrate);
            });
    }

    /// Groups active peaks of the same file whose apex sits on the same raw
    /// peak. Only groups with more than one member are returned.
    ///
    /// Statistics have to be computed beforehand, peaks without an apex are
    /// never grouped.
    pub fn shared_apex_groups(&self) -> Vec<MergeGroup> {
        let mut group_of: HashMap<(*const SpectraFile, *const IndexedPeak), usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::new();

        for (i, peak) in self.peaks.iter().enumerate() {
            if peak.is_voided() {
                continue;
            }
            let Some(apex) = peak.apex() else {
                continue;
            };
            let key = (
                Arc::as_ptr(peak.spectra_file()),
                Arc::as_ptr(apex.indexed_peak()),
            );
            let group_idx = *group_of.entry(key).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[group_idx].push(i);
        }

        members
            .into_iter()
            .filter(|m| m.len() > 1)
            .filter_map(MergeGroup::from_members)
            .collect()
    }

    /// Merges every group found by [`QuantSession::shared_apex_groups`].
    /// Returns the number of groups merged.
    pub fn merge_shared_apexes(&mut self, integrate: bool) -> Result<usize, DataProcessingError> {
        let groups = self.shared_apex_groups();
        for group in groups.iter() {
            self.apply_merge_group(group, integrate)?;
        }
        if !groups.is_empty() {
            self.compute_statistics(integrate);
        }
        info!("Merged {} groups of peaks sharing an apex", groups.len());
        Ok(groups.len())
    }
}
