use binrw::binrw;

use super::{BlockId, EntryId, Record, SizeMode};
use crate::{PAGE_SIZE, Page};

/// 文件的一页数据
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskBlock {
    #[br(map = |raw: u8| raw != 0)]
    #[bw(map = |used: &bool| u8::from(*used))]
    pub used: bool,
    /// 所属文件，只用于诊断，不参与遍历
    #[br(map = |raw: u32| EntryId::from(raw))]
    #[bw(map = |id: &EntryId| u32::from(*id))]
    pub owner: EntryId,
    /// 已写入的最远页内位置
    pub len: u32,
    pub payload: Page,
}

impl DiskBlock {
    /// 全零的新页
    pub fn new(owner: EntryId) -> Self {
        Self {
            used: true,
            owner,
            len: 0,
            payload: [0; PAGE_SIZE],
        }
    }

    /// 把`src`写到页内`cursor`处
    pub fn fill(&mut self, cursor: usize, src: &[u8]) {
        let end = cursor + src.len();
        assert!(end <= PAGE_SIZE);
        self.payload[cursor..end].copy_from_slice(src);
        self.len = self.len.max(end as u32);
    }

    /// 页内的有效数据长度
    pub fn data_len(&self, mode: SizeMode) -> usize {
        match mode {
            SizeMode::Explicit => (self.len as usize).min(PAGE_SIZE),
            SizeMode::Terminated => self
                .payload
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(PAGE_SIZE),
        }
    }
}

impl Record for DiskBlock {
    /// used + owner + len + payload
    const SIZE: usize = 1 + 4 + 4 + PAGE_SIZE;

    type Id = BlockId;

    #[inline]
    fn is_used(&self) -> bool {
        self.used
    }
}
