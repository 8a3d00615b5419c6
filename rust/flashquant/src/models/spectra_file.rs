use std::path::{
    Path,
    PathBuf,
};

/// A spectral data file that peaks and identifications were extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpectraFile {
    path: PathBuf,
    filename_without_extension: String,
}

impl SpectraFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename_without_extension = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => path.to_string_lossy().to_string(),
        };
        Self {
            path,
            filename_without_extension,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename_without_extension(&self) -> &str {
        &self.filename_without_extension
    }
}
