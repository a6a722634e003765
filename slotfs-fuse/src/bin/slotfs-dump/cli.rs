use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Backing file to inspect
    #[arg(long, short)]
    pub image: PathBuf,

    /// Also print page contents
    #[arg(long, short)]
    pub verbose: bool,
}
