use binrw::binrw;

use crate::{CHILD_SLOTS, MAGIC, NAME_MAX, PAGE_SIZE, PAGE_SLOTS, VERSION};

/// 文件大小的计算方式，格式化时选定并记录在超级块中
#[binrw]
#[brw(repr = u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    /// 每个数据块记录自己的有效长度，文件内容可以包含`\0`
    #[default]
    Explicit = 0,
    /// 页内第一个`\0`之前的字节才算数据，没有`\0`则整页有效
    Terminated = 1,
}

/// 超级块：
/// - 校验魔数与版本；
/// - 记录编译期常量，防止以不同布局读写同一个卷；
/// - 记录两个槽位池的容量
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    magic: u32,
    version: u16,
    pub size_mode: SizeMode,
    page_size: u32,
    child_slots: u32,
    page_slots: u32,
    name_max: u32,
    pub max_entries: u32,
    pub max_blocks: u32,
}

impl SuperBlock {
    /// 超级块在磁盘上占据的区域，编码后剩余的部分保持为零
    pub const SIZE: usize = 64;

    pub fn new(max_entries: u32, max_blocks: u32, size_mode: SizeMode) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            size_mode,
            page_size: PAGE_SIZE as u32,
            child_slots: CHILD_SLOTS as u32,
            page_slots: PAGE_SLOTS as u32,
            name_max: NAME_MAX as u32,
            max_entries,
            max_blocks,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC && self.version == VERSION
    }

    /// 卷的布局常量是否与当前程序一致
    pub fn matches_layout(&self) -> bool {
        self.page_size == PAGE_SIZE as u32
            && self.child_slots == CHILD_SLOTS as u32
            && self.page_slots == PAGE_SLOTS as u32
            && self.name_max == NAME_MAX as u32
    }
}
