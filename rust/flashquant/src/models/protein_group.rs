use std::hash::{
    Hash,
    Hasher,
};

/// A group of proteins that a peptide can be assigned to.
///
/// NOTE: Two groups are the same group when their names match, gene name
/// and organism are just carried along for display.
#[derive(Debug, Clone)]
pub struct ProteinGroup {
    pub name: String,
    pub gene_name: String,
    pub organism: String,
}

impl ProteinGroup {
    pub fn new(
        name: impl Into<String>,
        gene_name: impl Into<String>,
        organism: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            gene_name: gene_name.into(),
            organism: organism.into(),
        }
    }
}

impl PartialEq for ProteinGroup {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ProteinGroup {}

impl Hash for ProteinGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
