use crate::errors::ReportError;
use crate::models::ChromatographicPeak;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{
    debug,
    info,
};

pub const TSV_HEADER: [&str; 21] = [
    "File Name",
    "Base Sequence",
    "Full Sequence",
    "Protein Group",
    "Peptide Monoisotopic Mass",
    "MS2 Retention Time",
    "Precursor Charge",
    "Theoretical MZ",
    "Peak intensity",
    "Peak RT Start",
    "Peak RT Apex",
    "Peak RT End",
    "Peak MZ",
    "Peak Charge",
    "Num Charge States Observed",
    "Peak Detection Type",
    "PSMs Mapped",
    "Base Sequences Mapped",
    "Full Sequences Mapped",
    "Peak Split Valley RT",
    "Peak Apex Mass Error (ppm)",
];

const MISSING: &str = "-";

/// Renders one peak as the 21 fields of a report row, in header order.
///
/// The peak is expected to have its statistics computed and not be voided,
/// neither is checked here.
pub fn format_row(peak: &ChromatographicPeak) -> Vec<String> {
    let first_id = peak.seed_identification();
    let mut row = Vec::with_capacity(TSV_HEADER.len());

    row.push(peak.spectra_file().filename_without_extension().to_string());
    row.push(peak.distinct_base_sequences().join("|"));
    row.push(peak.distinct_modified_sequences().join("|"));
    row.push(peak.protein_group_names().join(";"));
    row.push(first_id.monoisotopic_mass.to_string());
    if peak.is_mbr_feature() {
        row.push(String::new());
    } else {
        row.push(first_id.ms2_retention_time_minutes.to_string());
    }
    row.push(first_id.charge_state.to_string());
    row.push(first_id.theoretical_mz().to_string());
    row.push(peak.intensity().to_string());

    match (peak.apex(), peak.rt_bounds()) {
        (Some(apex), Some((rt_start, rt_end))) => {
            row.push(rt_start.to_string());
            row.push(apex.retention_time.to_string());
            row.push(rt_end.to_string());
            row.push(apex.mz().to_string());
            row.push(apex.charge_state.to_string());
        }
        _ => {
            row.extend(std::iter::repeat_n(MISSING.to_string(), 5));
        }
    }

    row.push(peak.num_charge_states_observed().to_string());
    row.push(detection_type(peak).to_string());
    row.push(peak.identifications().len().to_string());
    row.push(peak.num_distinct_base_sequences().to_string());
    row.push(peak.num_distinct_modified_sequences().to_string());
    row.push(peak.split_rt.to_string());
    row.push(peak.mass_error_ppm().to_string());
    row
}

/// The row as a single tab separated line, without a trailing newline.
pub fn to_tsv_line(peak: &ChromatographicPeak) -> String {
    format_row(peak).join("\t")
}

pub fn tsv_header_line() -> String {
    TSV_HEADER.join("\t")
}

fn detection_type(peak: &ChromatographicPeak) -> &'static str {
    if peak.is_mbr_feature() { "MBR" } else { "MSMS" }
}

/// Writes the header followed by one line per non-voided peak.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    nwritten: usize,
    nskipped: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Result<Self, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(TSV_HEADER)?;
        Ok(Self {
            writer,
            nwritten: 0,
            nskipped: 0,
        })
    }

    /// Returns whether the peak was written.
    pub fn add(&mut self, peak: &ChromatographicPeak) -> Result<bool, ReportError> {
        if peak.is_voided() {
            self.nskipped += 1;
            return Ok(false);
        }
        self.writer.write_record(format_row(peak))?;
        self.nwritten += 1;
        Ok(true)
    }

    pub fn nwritten(&self) -> usize {
        self.nwritten
    }

    pub fn finish(mut self) -> Result<W, ReportError> {
        debug!(
            "Finishing report with {} rows, {} voided peaks skipped",
            self.nwritten, self.nskipped
        );
        self.writer
            .flush()
            .map_err(|e| ReportError::Io { source: e, path: None })?;
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Io {
                source: std::io::Error::new(e.error().kind(), e.error().to_string()),
                path: None,
            })
    }
}

pub fn write_report<'a>(
    out_path: impl AsRef<Path>,
    peaks: impl IntoIterator<Item = &'a ChromatographicPeak>,
) -> Result<usize, ReportError> {
    let out_path = out_path.as_ref();
    let file = match File::create(out_path) {
        Ok(file) => file,
        Err(err) => {
            tracing::error!("Failed to open file {:?} with error: {}", out_path, err);
            return Err(ReportError::Io {
                source: err,
                path: Some(out_path.to_path_buf()),
            });
        }
    };
    let mut writer = ReportWriter::new(std::io::BufWriter::new(file))?;
    for peak in peaks {
        writer.add(peak)?;
    }
    let nwritten = writer.nwritten();
    writer.finish()?;
    info!("Wrote {} peaks to {}", nwritten, out_path.display());
    Ok(nwritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Identification,
        IndexedPeak,
        IsotopicEnvelope,
        ProteinGroup,
        SpectraFile,
    };
    use std::sync::Arc;

    fn build_peak(is_mbr: bool) -> ChromatographicPeak {
        let file = Arc::new(SpectraFile::new("/data/sample_A.raw"));
        let id = Arc::new(Identification::new(
            file.clone(),
            "PEPTIDE",
            "PEPTIDE",
            799.5,
            12.25,
            2,
            vec![
                Arc::new(ProteinGroup::new("Q2", "", "")),
                Arc::new(ProteinGroup::new("P1", "", "")),
            ],
        ));
        let mut peak = ChromatographicPeak::new(id, is_mbr, file);
        for (rt, intensity) in [(1.0, 10.0), (1.5, 50.0), (2.0, 30.0)] {
            let raw = Arc::new(IndexedPeak::new(400.75, intensity, rt, 0));
            peak.add_envelope(IsotopicEnvelope::new(raw, 2, intensity));
        }
        peak.compute_statistics(true);
        peak
    }

    #[test]
    fn test_header_has_21_columns() {
        assert_eq!(tsv_header_line().split('\t').count(), 21);
        assert!(tsv_header_line().starts_with("File Name\tBase Sequence\t"));
        assert!(tsv_header_line().ends_with("Peak Apex Mass Error (ppm)"));
    }

    #[test]
    fn test_msms_row() {
        let row = format_row(&build_peak(false));
        assert_eq!(row.len(), 21);
        assert_eq!(row[0], "sample_A");
        assert_eq!(row[1], "PEPTIDE");
        assert_eq!(row[2], "PEPTIDE");
        assert_eq!(row[3], "P1;Q2");
        assert_eq!(row[4], "799.5");
        assert_eq!(row[5], "12.25");
        assert_eq!(row[6], "2");
        assert_eq!(row[8], "90");
        assert_eq!(row[9], "1");
        assert_eq!(row[10], "1.5");
        assert_eq!(row[11], "2");
        assert_eq!(row[12], "400.75");
        assert_eq!(row[13], "2");
        assert_eq!(row[14], "1");
        assert_eq!(row[15], "MSMS");
        assert_eq!(row[16], "1");
        assert_eq!(row[17], "1");
        assert_eq!(row[18], "1");
        assert_eq!(row[19], "0");
    }

    #[test]
    fn test_mbr_row_blanks_ms2_rt() {
        let msms = format_row(&build_peak(false));
        let mbr = format_row(&build_peak(true));
        assert_eq!(mbr[5], "");
        assert_eq!(mbr[15], "MBR");
        // Everything else matches.
        for i in (0..21).filter(|&i| i != 5 && i != 15) {
            assert_eq!(msms[i], mbr[i], "column {}", TSV_HEADER[i]);
        }
    }

    #[test]
    fn test_row_without_envelopes() {
        let file = Arc::new(SpectraFile::new("sample_B.mzML"));
        let id = Arc::new(Identification::new(
            file.clone(),
            "PEPTIDE",
            "PEPTIDE",
            799.5,
            12.25,
            2,
            vec![],
        ));
        let mut peak = ChromatographicPeak::new(id, false, file);
        peak.compute_statistics(true);
        let line = to_tsv_line(&peak);
        let row: Vec<&str> = line.split('\t').collect();
        assert_eq!(row.len(), 21);
        assert_eq!(row[3], "");
        assert_eq!(row[8], "0");
        assert_eq!(&row[9..14], &["-", "-", "-", "-", "-"]);
        assert_eq!(row[14], "0");
        assert_eq!(row[20], "NaN");
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("QuantifiedPeaks.tsv");
        let mut kept = build_peak(false);
        let mut absorbed = build_peak(true);
        kept.merge_with([&mut absorbed], true);

        let nwritten = write_report(&out_path, [&kept, &absorbed]).unwrap();
        assert_eq!(nwritten, 1);

        let contents = std::fs::read_to_string(&out_path).unwrap();
        assert_eq!(
            contents,
            format!("{}\n{}\n", tsv_header_line(), to_tsv_line(&kept))
        );
    }

    #[test]
    fn test_write_report_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("missing").join("QuantifiedPeaks.tsv");
        let peak = build_peak(false);
        match write_report(&out_path, [&peak]) {
            Err(ReportError::Io { path, .. }) => assert_eq!(path, Some(out_path)),
            other => panic!("Expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_writer_skips_voided() {
        let mut kept = build_peak(false);
        let mut absorbed = build_peak(false);
        kept.merge_with([&mut absorbed], true);

        let mut writer = ReportWriter::new(Vec::new()).unwrap();
        assert!(writer.add(&kept).unwrap());
        assert!(!writer.add(&absorbed).unwrap());
        assert_eq!(writer.nwritten(), 1);
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], tsv_header_line());
        assert_eq!(lines[1], to_tsv_line(&kept));
    }
}
