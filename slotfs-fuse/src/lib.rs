//! 宿主机侧的工具：以普通文件为后备设备，以及引擎错误到 errno 的映射。

#[cfg(test)]
mod tests;

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use slotfs::Error;
use slotfs_dev::{BackingDevice, DevError, check_range};

/// 以宿主机文件为介质的后备设备，容量即打开时的文件长度
#[derive(Debug)]
pub struct BlockFile {
    file: Mutex<File>,
    size: u64,
    read_only: bool,
}

impl BlockFile {
    pub fn new(file: File) -> io::Result<Self> {
        let size = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            size,
            read_only: false,
        })
    }

    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(OpenOptions::new().read(true).write(true).open(path)?)
    }

    /// 只读打开，所有写入都被拒绝
    pub fn open_read_only(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut dev = Self::new(File::open(path)?)?;
        dev.read_only = true;
        Ok(dev)
    }
}

impl BackingDevice for BlockFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), DevError> {
        check_range(self.size, offset, buf.len())?;
        let mut file = self.file.lock().map_err(|_| DevError::Medium)?;
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(buf))
            .map_err(|err| medium(err, offset))
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<(), DevError> {
        if self.read_only {
            return Err(DevError::ReadOnly);
        }
        check_range(self.size, offset, buf.len())?;
        let mut file = self.file.lock().map_err(|_| DevError::Medium)?;
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.write_all(buf))
            .map_err(|err| medium(err, offset))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn sync(&self) -> Result<(), DevError> {
        if self.read_only {
            return Ok(());
        }
        let file = self.file.lock().map_err(|_| DevError::Medium)?;
        file.sync_data().map_err(|err| medium(err, 0))
    }
}

fn medium(err: io::Error, offset: u64) -> DevError {
    log::error!("backing file failed at {offset:#x}: {err}");
    DevError::Medium
}

/// 引擎错误对应的 errno
pub fn errno(err: &Error) -> i32 {
    match err {
        Error::NotFound => libc::ENOENT,
        Error::NotEmpty => libc::ENOTEMPTY,
        Error::DirectoryFull | Error::OutOfSpace => libc::ENOSPC,
        Error::IsDirectory => libc::EISDIR,
        Error::NotADirectory => libc::ENOTDIR,
        Error::NameTooLong => libc::ENAMETOOLONG,
        Error::AlreadyExists => libc::EEXIST,
        Error::InvalidArgument => libc::EINVAL,
        Error::InvalidRef | Error::Corrupted | Error::InvalidGeometry | Error::Io(_) => libc::EIO,
    }
}

/// 把引擎错误包装成带 errno 的`io::Error`
pub fn to_io(err: Error) -> io::Error {
    io::Error::other(format!("{err} (errno {})", errno(&err)))
}
