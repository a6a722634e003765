//! # 磁盘数据结构层
//!
//! slotfs 的磁盘布局：
//! 超级块 | 元数据项区域（max_entries 个槽位） | 数据块区域（max_blocks 个槽位）
//!
//! 所有整数均为小端序。两种记录的首字节都是占用标志，
//! 槽位池分配时只需读这一个字节。

mod super_block;
pub use super_block::{SizeMode, SuperBlock};

mod entry;
pub use entry::{DiskEntry, EntryKind};

mod block;
pub use block::DiskBlock;

use alloc::vec::Vec;

use binrw::io::Cursor;
use binrw::meta::{ReadEndian, WriteEndian};
use binrw::{BinRead, BinWrite};
use derive_more::{Display, From, Into};

use crate::{Error, Result};

/// 磁盘上表示“无引用”的哨兵值
///
/// 根目录占据 0 号槽位，所以不能拿 0 当空引用。
pub const NIL: u32 = u32::MAX;

/// 记录的首字节：占用标志
pub const USED_OFFSET: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[display(fmt = "entry#{}", _0)]
#[repr(transparent)]
pub struct EntryId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[display(fmt = "block#{}", _0)]
#[repr(transparent)]
pub struct BlockId(u32);

impl EntryId {
    /// 根目录永远在 0 号槽位
    pub const ROOT: Self = Self(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl BlockId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

#[inline]
pub fn decode_ref<T: From<u32>>(raw: u32) -> Option<T> {
    (raw != NIL).then(|| T::from(raw))
}

#[inline]
pub fn encode_ref<T: Into<u32>>(id: Option<T>) -> u32 {
    id.map_or(NIL, Into::into)
}

/// 能放进槽位池的定长记录
pub trait Record:
    for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()> + ReadEndian + WriteEndian
{
    /// 编码后的字节数
    const SIZE: usize;

    /// 记录所在槽位的ID类型
    type Id: Copy + From<u32> + Into<u32> + core::fmt::Display;

    fn is_used(&self) -> bool;
}

/// 从字节中解码出磁盘数据结构
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'a> BinRead<Args<'a> = ()> + ReadEndian,
{
    T::read(&mut Cursor::new(bytes)).map_err(|err| {
        log::error!("cannot decode {}: {err:?}", core::any::type_name::<T>());
        Error::Corrupted
    })
}

/// 把磁盘数据结构编码成字节
pub fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: for<'a> BinWrite<Args<'a> = ()> + WriteEndian,
{
    let mut cursor = Cursor::new(Vec::new());
    value.write(&mut cursor).map_err(|err| {
        log::error!("cannot encode {}: {err:?}", core::any::type_name::<T>());
        Error::Corrupted
    })?;
    Ok(cursor.into_inner())
}
