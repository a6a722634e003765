mod cli;

use std::io;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use slotfs::{EntryKind, SlotFileSystem};
use slotfs_fuse::{BlockFile, to_io};

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dev = Arc::new(BlockFile::open_read_only(&cli.image)?);
    let fs = SlotFileSystem::open(dev).map_err(to_io)?;

    let geometry = fs.geometry();
    let usage = fs.usage().map_err(to_io)?;
    println!("image={:?}", cli.image);
    println!("size_mode={:?}", geometry.size_mode);
    println!("entries={}/{}", usage.used_entries, usage.max_entries);
    println!("blocks={}/{}", usage.used_blocks, usage.max_blocks);

    println!();
    for entry in fs.entries().map_err(to_io)? {
        let kind = match entry.kind {
            EntryKind::Directory => 'd',
            EntryKind::File => '-',
        };
        println!(
            "{kind} {:<8} {:?} parent={}",
            entry.id.to_string(),
            entry.name,
            entry.parent
        );
        if !entry.children.is_empty() {
            let children: Vec<_> = entry.children.iter().map(ToString::to_string).collect();
            println!("    children: {}", children.join(" "));
        }
        if !entry.blocks.is_empty() {
            let blocks: Vec<_> = entry
                .blocks
                .iter()
                .map(|(page, id)| format!("{page}:{id}"))
                .collect();
            println!("    pages: {}", blocks.join(" "));
        }
    }

    println!();
    for block in fs.blocks().map_err(to_io)? {
        println!(
            "{:<10} owner={} len={}",
            block.id.to_string(),
            block.owner,
            block.len
        );
        if cli.verbose {
            println!("    {:?}", String::from_utf8_lossy(&block.data));
        }
    }

    Ok(())
}
