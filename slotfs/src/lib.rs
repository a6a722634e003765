#![cfg_attr(not(test), no_std)]

extern crate alloc;

/* slotfs 的整体架构，自上而下 */

// 文件系统接口层：加锁后以路径或槽位ID完成各种操作
mod vfs;
pub use vfs::{BlockInfo, DirEntry, EntryInfo, SlotFileSystem, Stat, StatKind};

// 文件树操作层：创建、删除、改名、移动与状态查询
mod tree;

// 文件数据分页层：把文件的字节区间映射到一页页数据块上
mod pager;

// 元数据图层：路径解析与子项槽位管理
mod graph;

// 卷管理层：超级块、格式化与挂载
mod volume;
pub use volume::{Geometry, Usage};

// 槽位池层：定长记录的分配、释放与越界检查
mod pool;

// 磁盘数据结构层：表示磁盘上各记录的数据结构
mod layout;
pub use layout::{BlockId, EntryId, EntryKind, SizeMode};

mod error;
pub use error::{Error, Result};

pub mod path;

pub const MAGIC: u32 = 0x5107_f500;
/// 磁盘布局版本，布局有任何改动都要递增
pub const VERSION: u16 = 1;
/// 数据块的载荷大小，即一页的字节数
pub const PAGE_SIZE: usize = 1024;
/// 每个目录最多拥有的子项数
pub const CHILD_SLOTS: usize = 8;
/// 每个文件最多拥有的页数
pub const PAGE_SLOTS: usize = 8;
/// 文件名的最大字节数
pub const NAME_MAX: usize = 64;
/// 路径解析的最大深度
pub const MAX_DEPTH: usize = 64;
/// 单个文件能容纳的最大字节数
pub const MAX_FILE_SIZE: usize = PAGE_SIZE * PAGE_SLOTS;

type Page = [u8; PAGE_SIZE];
