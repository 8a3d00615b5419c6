use super::config::{
    AnalysisConfig,
    OutputConfig,
};
use crate::errors::CliError;
use flashquant::{
    QuantInput,
    QuantSession,
    write_report,
};
use indicatif::{
    ProgressIterator,
    ProgressStyle,
};
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub fn process_input(
    path: &Path,
    analysis: &AnalysisConfig,
    output: &OutputConfig,
) -> std::result::Result<(), CliError> {
    info!("Loading quantification input from {:?}", path);
    let st = Instant::now();
    let mut session = QuantInput::from_file(path)?.build()?;
    info!(
        "Built {} peaks with {} merge groups in {:?}",
        session.peaks().len(),
        session.merge_groups().len(),
        st.elapsed()
    );

    session.consolidate(analysis.integrate)?;
    if analysis.merge_shared_apex {
        session.merge_shared_apexes(analysis.integrate)?;
    }

    write_session(&session, output)?;
    println!("Finished quantification in {:?}", st.elapsed());
    Ok(())
}

fn write_session(session: &QuantSession, output: &OutputConfig) -> std::result::Result<(), CliError> {
    let out_path = output.report_path();
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(|e| CliError::Processing {
        source: e.to_string(),
    })?;

    let nwritten = write_report(&out_path, session.peaks().iter().progress_with_style(style))?;
    println!(
        "Wrote {} of {} peaks to {}",
        nwritten,
        session.peaks().len(),
        out_path.display()
    );
    Ok(())
}
