use crate::errors::{
    InputError,
    ReferenceKind,
};
use crate::models::{
    ChromatographicPeak,
    Identification,
    IndexedPeak,
    IsotopicEnvelope,
    ProteinGroup,
    SpectraFile,
};
use crate::session::{
    MergeGroup,
    QuantSession,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufReader,
    Cursor,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use tracing::{
    debug,
    info,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectraFileEntry {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProteinGroupEntry {
    pub name: String,
    #[serde(default)]
    pub gene_name: String,
    #[serde(default)]
    pub organism: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentificationEntry {
    pub file: usize,
    pub base_sequence: String,
    pub modified_sequence: String,
    pub monoisotopic_mass: f64,
    pub ms2_retention_time_minutes: f64,
    pub charge_state: i32,
    #[serde(default)]
    pub protein_groups: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPeakEntry {
    pub mz: f64,
    pub intensity: f64,
    pub retention_time: f64,
    #[serde(default)]
    pub scan_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeEntry {
    pub peak: usize,
    pub charge_state: i32,
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub file: usize,
    pub identification: usize,
    #[serde(default)]
    pub is_mbr: bool,
    #[serde(default)]
    pub split_rt: f64,
    #[serde(default)]
    pub envelopes: Vec<EnvelopeEntry>,
}

/// Everything the upstream collaborators hand over for quantification.
///
/// All cross references are positions in the corresponding list. Every
/// identification and indexed peak entry turns into exactly one shared
/// allocation, so features pointing at the same entry share its identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuantInput {
    pub spectra_files: Vec<SpectraFileEntry>,
    #[serde(default)]
    pub protein_groups: Vec<ProteinGroupEntry>,
    pub identifications: Vec<IdentificationEntry>,
    pub indexed_peaks: Vec<IndexedPeakEntry>,
    pub features: Vec<FeatureEntry>,
    /// Candidate sets of features that describe one elution event, the
    /// first feature of each set is the merge target.
    #[serde(default)]
    pub merge_groups: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    JsonZstd,
    MessagePack,
    MessagePackZstd,
}

impl InputFormat {
    pub fn detect_from_path(path: &Path) -> Result<Self, InputError> {
        let path_str = path.to_string_lossy().to_lowercase();

        if path_str.ends_with(".msgpack.zst") {
            Ok(InputFormat::MessagePackZstd)
        } else if path_str.ends_with(".msgpack") {
            Ok(InputFormat::MessagePack)
        } else if path_str.ends_with(".json.zst") {
            Ok(InputFormat::JsonZstd)
        } else if path_str.ends_with(".json") {
            Ok(InputFormat::Json)
        } else {
            Self::detect_from_content(path)
        }
    }

    fn detect_from_content(path: &Path) -> Result<Self, InputError> {
        let file = std::fs::File::open(path).map_err(|e| InputError::FileReading {
            source: e,
            context: "Error opening file for format detection",
            path: PathBuf::from(path),
        })?;
        Self::detect_from_reader(BufReader::new(file))
    }

    /// Guesses the format from the leading bytes. For zstd frames the first
    /// decompressed bytes decide between JSON and MessagePack.
    pub fn detect_from_reader<R: Read>(mut reader: R) -> Result<Self, InputError> {
        let prefix = read_prefix(&mut reader)?;
        if !prefix.starts_with(&ZSTD_MAGIC) {
            return Ok(Self::detect_from_bytes(&prefix));
        }

        let decoder = zstd_decoder(Cursor::new(prefix).chain(reader))?;
        let decoded = read_prefix(decoder)?;
        match Self::detect_from_bytes(&decoded) {
            InputFormat::MessagePack => Ok(InputFormat::MessagePackZstd),
            _ => Ok(InputFormat::JsonZstd),
        }
    }

    // Raw msgpack maps start with 0x8X / 0xDE / 0xDF.
    fn detect_from_bytes(buffer: &[u8]) -> Self {
        match buffer.iter().copied().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') | None => InputFormat::Json,
            Some(_) => InputFormat::MessagePack,
        }
    }
}

impl QuantInput {
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let format = InputFormat::detect_from_path(path)?;
        Self::from_file_with_format(path, format)
    }

    pub fn from_file_with_format(path: &Path, format: InputFormat) -> Result<Self, InputError> {
        let file = std::fs::File::open(path).map_err(|e| InputError::FileReading {
            source: e,
            context: "Error opening quantification input",
            path: PathBuf::from(path),
        })?;
        let out = Self::from_reader(BufReader::new(file), format)?;
        info!(
            "Read {} features, {} identifications and {} indexed peaks from {}",
            out.features.len(),
            out.identifications.len(),
            out.indexed_peaks.len(),
            path.display()
        );
        Ok(out)
    }

    pub fn from_reader<R: Read>(reader: R, format: InputFormat) -> Result<Self, InputError> {
        match format {
            InputFormat::Json => Self::from_json_reader(reader),
            InputFormat::JsonZstd => Self::from_json_reader(zstd_decoder(reader)?),
            InputFormat::MessagePack => Self::from_msgpack_reader(reader),
            InputFormat::MessagePackZstd => Self::from_msgpack_reader(zstd_decoder(reader)?),
        }
    }

    fn from_json_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        serde_json::from_reader(reader).map_err(|e| InputError::Parsing {
            msg: e.to_string(),
            context: "Error parsing JSON input",
        })
    }

    fn from_msgpack_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        rmp_serde::from_read(reader).map_err(|e| InputError::Parsing {
            msg: e.to_string(),
            context: "Error parsing MessagePack input",
        })
    }

    /// Resolves all references and builds one peak per feature.
    ///
    /// Envelopes are added in the order they are listed, which is the order
    /// ties for the apex are broken in.
    pub fn build(self) -> Result<QuantSession, InputError> {
        let spectra_files: Vec<Arc<SpectraFile>> = self
            .spectra_files
            .into_iter()
            .map(|x| Arc::new(SpectraFile::new(x.path)))
            .collect();

        let protein_groups: Vec<Arc<ProteinGroup>> = self
            .protein_groups
            .into_iter()
            .map(|x| Arc::new(ProteinGroup::new(x.name, x.gene_name, x.organism)))
            .collect();

        let identifications = self
            .identifications
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let context = || format!("identification {}", i);
                let file = lookup(&spectra_files, entry.file, ReferenceKind::SpectraFile, context)?;
                let groups = entry
                    .protein_groups
                    .iter()
                    .map(|&pg| lookup(&protein_groups, pg, ReferenceKind::ProteinGroup, context))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Arc::new(Identification::new(
                    file,
                    entry.base_sequence,
                    entry.modified_sequence,
                    entry.monoisotopic_mass,
                    entry.ms2_retention_time_minutes,
                    entry.charge_state,
                    groups,
                )))
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        let indexed_peaks: Vec<Arc<IndexedPeak>> = self
            .indexed_peaks
            .into_iter()
            .map(|x| Arc::new(IndexedPeak::new(x.mz, x.intensity, x.retention_time, x.scan_index)))
            .collect();

        let peaks = self
            .features
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let context = || format!("feature {}", i);
                let file = lookup(&spectra_files, entry.file, ReferenceKind::SpectraFile, context)?;
                let id = lookup(
                    &identifications,
                    entry.identification,
                    ReferenceKind::Identification,
                    context,
                )?;
                let mut peak = ChromatographicPeak::new(id, entry.is_mbr, file).with_split_rt(entry.split_rt);
                for env in entry.envelopes {
                    let raw = lookup(&indexed_peaks, env.peak, ReferenceKind::IndexedPeak, context)?;
                    peak.add_envelope(IsotopicEnvelope::new(raw, env.charge_state, env.intensity));
                }
                Ok(peak)
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        let mut merge_groups = Vec::with_capacity(self.merge_groups.len());
        for (i, group) in self.merge_groups.into_iter().enumerate() {
            if let Some(&bad) = group.iter().find(|&&idx| idx >= peaks.len()) {
                return Err(InputError::DanglingReference {
                    kind: ReferenceKind::Feature,
                    index: bad,
                    context: format!("merge group {}", i),
                });
            }
            match MergeGroup::from_members(group) {
                Some(x) => merge_groups.push(x),
                None => debug!("Skipping empty merge group {}", i),
            }
        }

        Ok(QuantSession::new(peaks, merge_groups))
    }
}

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

fn read_prefix<R: Read>(reader: R) -> Result<Vec<u8>, InputError> {
    let mut prefix = Vec::with_capacity(8);
    reader
        .take(8)
        .read_to_end(&mut prefix)
        .map_err(|e| InputError::Parsing {
            msg: e.to_string(),
            context: "Error reading input header for format detection",
        })?;
    Ok(prefix)
}

fn zstd_decoder<R: Read>(reader: R) -> Result<impl Read, InputError> {
    zstd::Decoder::new(reader).map_err(|e| InputError::Parsing {
        msg: e.to_string(),
        context: "Error creating ZSTD decoder",
    })
}

fn lookup<T: Clone>(
    items: &[T],
    index: usize,
    kind: ReferenceKind,
    context: impl Fn() -> String,
) -> Result<T, InputError> {
    items
        .get(index)
        .cloned()
        .ok_or_else(|| InputError::DanglingReference {
            kind,
            index,
            context: context(),
        })
}
