use std::path::PathBuf;

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// JSONL file with one request per line
    pub file: PathBuf,

    /// Write responses to this JSONL file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
