use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use slotfs::SizeMode;

#[derive(Parser)]
pub struct Cli {
    /// Backing file to create
    #[arg(long, short)]
    pub image: PathBuf,

    /// Capacity of the entry pool, root included
    #[arg(long, default_value_t = 16)]
    pub max_entries: u32,

    /// Capacity of the block pool
    #[arg(long, default_value_t = 32)]
    pub max_blocks: u32,

    /// How file sizes are computed
    #[arg(long, value_enum, default_value_t = Mode::Explicit)]
    pub size_mode: Mode,

    /// Overwrite an existing image
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Each block stores its own length
    Explicit,
    /// A page ends at its first zero byte
    Terminated,
}

impl From<Mode> for SizeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Explicit => SizeMode::Explicit,
            Mode::Terminated => SizeMode::Terminated,
        }
    }
}
