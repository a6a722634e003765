//! # 后备设备接口层
//!
//! slotfs 的全部数据都存放在一块扁平的后备介质里（通常是宿主机上的一个文件）。
//! [`BackingDevice`] 是对这种介质的抽象：按**字节偏移**读写任意长度的数据，
//! 上层的槽位池再在其上划分定长记录。

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod ram;

use core::any::Any;
use core::fmt;

pub use self::ram::RamDevice;

/// 后备设备驱动特质
pub trait BackingDevice: Send + Sync + Any {
    /// 从`offset`处读满`buf`
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), DevError>;

    /// 把`buf`整个写到`offset`处
    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<(), DevError>;

    /// 设备容量（字节）
    fn size(&self) -> u64;

    /// 把缓冲的写入落到介质上
    fn sync(&self) -> Result<(), DevError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevError {
    /// 访问越过了设备末尾
    OutOfBounds { offset: u64, len: usize },
    /// 介质本身读写失败
    Medium,
    /// 设备以只读方式打开
    ReadOnly,
}

impl fmt::Display for DevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, len } => {
                write!(f, "access of {len} bytes at {offset:#x} is out of bounds")
            }
            Self::Medium => f.write_str("backing medium failed"),
            Self::ReadOnly => f.write_str("backing device is read-only"),
        }
    }
}

impl core::error::Error for DevError {}

/// 检查`[offset, offset + len)`是否落在容量为`size`的设备内
#[inline]
pub fn check_range(size: u64, offset: u64, len: usize) -> Result<(), DevError> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(()),
        _ => Err(DevError::OutOfBounds { offset, len }),
    }
}
