use super::protein_group::ProteinGroup;
use super::spectra_file::SpectraFile;
use crate::utils::to_mz;
use std::collections::HashSet;
use std::sync::Arc;

/// A single accepted peptide-spectrum match.
///
/// Identifications are shared as `Arc<Identification>` and two of them are the
/// same identification only if they are the same allocation (see
/// [`Identification::same_identity`]). Records with equal sequences coming from
/// different search results are kept apart on purpose, sequence level
/// uniqueness is counted separately by the peaks that hold them.
#[derive(Debug)]
pub struct Identification {
    pub spectra_file: Arc<SpectraFile>,
    pub base_sequence: Arc<str>,
    pub modified_sequence: Arc<str>,
    pub monoisotopic_mass: f64,
    pub ms2_retention_time_minutes: f64,
    pub charge_state: i32,
    protein_groups: Vec<Arc<ProteinGroup>>,
}

impl Identification {
    pub fn new(
        spectra_file: Arc<SpectraFile>,
        base_sequence: impl Into<Arc<str>>,
        modified_sequence: impl Into<Arc<str>>,
        monoisotopic_mass: f64,
        ms2_retention_time_minutes: f64,
        charge_state: i32,
        protein_groups: impl IntoIterator<Item = Arc<ProteinGroup>>,
    ) -> Self {
        let mut seen = HashSet::new();
        let protein_groups = protein_groups
            .into_iter()
            .filter(|pg| seen.insert(pg.name.clone()))
            .collect();

        Self {
            spectra_file,
            base_sequence: base_sequence.into(),
            modified_sequence: modified_sequence.into(),
            monoisotopic_mass,
            ms2_retention_time_minutes,
            charge_state,
            protein_groups,
        }
    }

    /// Protein groups this peptide maps to, one entry per distinct group.
    pub fn protein_groups(&self) -> &[Arc<ProteinGroup>] {
        &self.protein_groups
    }

    /// m/z of the precursor as it would be observed at the identified charge.
    pub fn theoretical_mz(&self) -> f64 {
        to_mz(self.monoisotopic_mass, self.charge_state)
    }

    pub fn same_identity(a: &Arc<Identification>, b: &Arc<Identification>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl std::fmt::Display for Identification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.modified_sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protein_groups_are_deduplicated_by_name() {
        let file = Arc::new(SpectraFile::new("run1.raw"));
        let pg1 = Arc::new(ProteinGroup::new("P12345", "GENE1", "Homo sapiens"));
        let pg1_again = Arc::new(ProteinGroup::new("P12345", "", ""));
        let pg2 = Arc::new(ProteinGroup::new("Q99999", "GENE2", "Homo sapiens"));

        let id = Identification::new(
            file,
            "PEPTIDE",
            "PEPT[Phospho]IDE",
            799.36,
            12.5,
            2,
            vec![pg1, pg2, pg1_again],
        );
        let names: Vec<&str> = id.protein_groups().iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["P12345", "Q99999"]);
        assert_eq!(id.to_string(), "PEPT[Phospho]IDE");
    }

    #[test]
    fn test_identity_is_by_allocation() {
        let file = Arc::new(SpectraFile::new("run1.raw"));
        let a = Arc::new(Identification::new(
            file.clone(),
            "PEPTIDE",
            "PEPTIDE",
            799.36,
            12.5,
            2,
            vec![],
        ));
        let b = Arc::new(Identification::new(
            file, "PEPTIDE", "PEPTIDE", 799.36, 12.5, 2, vec![],
        ));
        assert!(Identification::same_identity(&a, &a.clone()));
        assert!(!Identification::same_identity(&a, &b));
    }
}
