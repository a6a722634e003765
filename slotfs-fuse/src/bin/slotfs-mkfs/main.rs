mod cli;

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use slotfs::{Geometry, SlotFileSystem};
use slotfs_fuse::{BlockFile, to_io};

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let geometry =
        Geometry::new(cli.max_entries, cli.max_blocks).with_size_mode(cli.size_mode.into());
    println!("image={:?}\ngeometry={geometry:?}", cli.image);

    let fd = {
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        if cli.force {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        options.open(&cli.image)?
    };
    // 整个文件先清零，容量即布局所需的字节数
    fd.set_len(geometry.device_size())?;

    let dev = Arc::new(BlockFile::new(fd)?);
    let fs = SlotFileSystem::format(dev, geometry).map_err(to_io)?;
    fs.sync().map_err(to_io)?;

    log::info!("{} bytes written to {:?}", geometry.device_size(), cli.image);
    Ok(())
}
