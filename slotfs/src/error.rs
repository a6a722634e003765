use core::fmt;

use slotfs_dev::DevError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 路径中的某一项不存在
    NotFound,
    /// 删除非空目录
    NotEmpty,
    /// 目录的子项槽位用尽
    DirectoryFull,
    /// 槽位池用尽
    OutOfSpace,
    /// 对目录做数据读写
    IsDirectory,
    NotADirectory,
    AlreadyExists,
    NameTooLong,
    /// 空名、含`/`或`\0`的名字，移动根目录，或把目录移进自己的子树
    InvalidArgument,
    /// 越界或不一致的槽位引用，属于程序错误
    InvalidRef,
    /// 超级块或记录无法解码
    Corrupted,
    /// 卷的容量参数不合法，或设备装不下
    InvalidGeometry,
    Io(DevError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("no such file or directory"),
            Self::NotEmpty => f.write_str("directory not empty"),
            Self::DirectoryFull => f.write_str("directory has no free child slot"),
            Self::OutOfSpace => f.write_str("slot pool exhausted"),
            Self::IsDirectory => f.write_str("is a directory"),
            Self::NotADirectory => f.write_str("not a directory"),
            Self::AlreadyExists => f.write_str("entry already exists"),
            Self::NameTooLong => f.write_str("file name too long"),
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::InvalidRef => f.write_str("invalid slot reference"),
            Self::Corrupted => f.write_str("volume is corrupted or was written by another layout"),
            Self::InvalidGeometry => f.write_str("invalid volume geometry"),
            Self::Io(err) => write!(f, "device error: {err}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<DevError> for Error {
    #[inline]
    fn from(err: DevError) -> Self {
        Self::Io(err)
    }
}
