use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the quantification input bundle (will over-write the config file)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path to the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Sum all envelope intensities instead of using the apex only
    #[arg(long)]
    pub integrate: bool,

    /// Merge peaks in the same file whose apex is the same raw peak
    #[arg(long)]
    pub merge_shared_apex: bool,
}
