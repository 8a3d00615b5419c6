use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub integrate: bool,
    #[serde(default)]
    pub merge_shared_apex: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl OutputConfig {
    pub fn report_path(&self) -> PathBuf {
        self.directory.join("QuantifiedPeaks.tsv")
    }
}

impl Config {
    /// Command line values win over the ones in the file. Flags can only
    /// switch options on.
    pub fn apply_cli_overrides(&mut self, args: &Cli) {
        if let Some(input) = &args.input {
            self.input = Some(InputConfig {
                path: input.clone(),
            });
        }
        if let Some(output_dir) = &args.output_dir {
            self.output = Some(OutputConfig {
                directory: output_dir.clone(),
            });
        }
        self.analysis.integrate |= args.integrate;
        self.analysis.merge_shared_apex |= args.merge_shared_apex;
    }
}
