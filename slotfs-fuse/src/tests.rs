use std::io::Write;
use std::sync::Arc;

use slotfs::{Geometry, SizeMode, SlotFileSystem};
use tempfile::NamedTempFile;

use super::*;

fn image(geometry: Geometry) -> NamedTempFile {
    let image = NamedTempFile::new().unwrap();
    image.as_file().set_len(geometry.device_size()).unwrap();
    image
}

#[test]
fn block_file_round_trip() {
    let image = image(Geometry::new(1, 1));
    let dev = BlockFile::open(image.path()).unwrap();
    assert_eq!(dev.size(), Geometry::new(1, 1).device_size());

    dev.write_at(100, b"slot").unwrap();
    let mut buf = [0; 4];
    dev.read_at(100, &mut buf).unwrap();
    assert_eq!(&buf, b"slot");

    let end = dev.size();
    assert_eq!(
        dev.read_at(end - 2, &mut buf),
        Err(DevError::OutOfBounds {
            offset: end - 2,
            len: 4
        })
    );
}

#[test]
fn read_only_file() {
    let mut image = image(Geometry::new(1, 1));
    image.write_all(b"abc").unwrap();
    image.flush().unwrap();

    let dev = BlockFile::open_read_only(image.path()).unwrap();
    let mut buf = [0; 3];
    dev.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"abc");
    assert_eq!(dev.write_at(0, b"x"), Err(DevError::ReadOnly));
    assert_eq!(dev.sync(), Ok(()));
}

#[test]
fn volume_survives_reopen() {
    let geometry = Geometry::new(8, 8).with_size_mode(SizeMode::Terminated);
    let image = image(geometry);

    {
        let dev = Arc::new(BlockFile::open(image.path()).unwrap());
        let fs = SlotFileSystem::format(dev, geometry).unwrap();
        fs.mkdir("/etc").unwrap();
        fs.create("/etc/motd").unwrap();
        fs.write("/etc/motd", 0, b"hello").unwrap();
        fs.sync().unwrap();
    }

    let dev = Arc::new(BlockFile::open_read_only(image.path()).unwrap());
    let fs = SlotFileSystem::open(dev).unwrap();
    assert_eq!(fs.geometry(), geometry);
    assert_eq!(fs.read("/etc/motd", 0, 64).unwrap(), b"hello");
    assert_eq!(fs.create("/etc/issue"), Err(Error::Io(DevError::ReadOnly)));
}

#[test]
fn errno_mapping() {
    assert_eq!(errno(&Error::NotFound), libc::ENOENT);
    assert_eq!(errno(&Error::NotEmpty), libc::ENOTEMPTY);
    assert_eq!(errno(&Error::DirectoryFull), libc::ENOSPC);
    assert_eq!(errno(&Error::OutOfSpace), libc::ENOSPC);
    assert_eq!(errno(&Error::IsDirectory), libc::EISDIR);
    assert_eq!(errno(&Error::NotADirectory), libc::ENOTDIR);
    assert_eq!(errno(&Error::NameTooLong), libc::ENAMETOOLONG);
    assert_eq!(errno(&Error::AlreadyExists), libc::EEXIST);
    assert_eq!(errno(&Error::InvalidArgument), libc::EINVAL);
    assert_eq!(errno(&Error::InvalidRef), libc::EIO);
    assert_eq!(errno(&Error::Io(DevError::Medium)), libc::EIO);

    let err = to_io(Error::NotFound);
    assert_eq!(err.kind(), io::ErrorKind::Other);
    assert!(err.to_string().contains("no such file"));
}
