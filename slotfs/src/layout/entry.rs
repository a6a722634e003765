use binrw::binrw;

use super::{BlockId, EntryId, Record, decode_ref, encode_ref};
use crate::{CHILD_SLOTS, Error, NAME_MAX, PAGE_SLOTS, Result};

#[binrw]
#[brw(repr = u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    #[default]
    File = 0,
    Directory = 1,
}

/// 文件或目录的元数据项
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskEntry {
    #[br(map = |raw: u8| raw != 0)]
    #[bw(map = |used: &bool| u8::from(*used))]
    pub used: bool,
    pub kind: EntryKind,
    /// 以`\0`填充，名字本身不含`\0`
    name: [u8; NAME_MAX],
    /// 根目录的父目录就是它自己
    #[br(map = |raw: u32| EntryId::from(raw))]
    #[bw(map = |id: &EntryId| u32::from(*id))]
    pub parent: EntryId,
    /// 仅对目录有意义
    #[br(map = |raw: [u32; CHILD_SLOTS]| raw.map(decode_ref::<EntryId>))]
    #[bw(map = |ids: &[Option<EntryId>; CHILD_SLOTS]| (*ids).map(encode_ref))]
    pub children: [Option<EntryId>; CHILD_SLOTS],
    /// 仅对文件有意义，下标即页号
    #[br(map = |raw: [u32; PAGE_SLOTS]| raw.map(decode_ref::<BlockId>))]
    #[bw(map = |ids: &[Option<BlockId>; PAGE_SLOTS]| (*ids).map(encode_ref))]
    pub blocks: [Option<BlockId>; PAGE_SLOTS],
}

impl DiskEntry {
    /// 调用者需保证`name`已经过长度检查
    pub fn new(name: &str, kind: EntryKind, parent: EntryId) -> Self {
        let mut entry = Self {
            used: true,
            kind,
            name: [0; NAME_MAX],
            parent,
            children: [None; CHILD_SLOTS],
            blocks: [None; PAGE_SLOTS],
        };
        entry.set_name(name);
        entry
    }

    /// 名字不是合法的 UTF-8 时视为损坏
    pub fn name(&self) -> Result<&str> {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_MAX);
        core::str::from_utf8(&self.name[..len]).map_err(|err| {
            log::error!("entry name {:?} is not UTF-8: {err}", &self.name[..len]);
            Error::Corrupted
        })
    }

    pub fn set_name(&mut self, name: &str) {
        let bytes = name.as_bytes();
        assert!(bytes.len() <= NAME_MAX);
        self.name = [0; NAME_MAX];
        self.name[..bytes.len()].copy_from_slice(bytes);
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[inline]
    pub fn is_empty_dir(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// 第一个空闲的子项槽位
    #[inline]
    pub fn free_child_slot(&self) -> Option<usize> {
        self.children.iter().position(Option::is_none)
    }

    /// 子项`id`所在的槽位
    #[inline]
    pub fn child_slot(&self, id: EntryId) -> Option<usize> {
        self.children.iter().position(|&child| child == Some(id))
    }
}

impl Record for DiskEntry {
    /// used + kind + name + parent + children + blocks
    const SIZE: usize = 1 + 1 + NAME_MAX + 4 + 4 * CHILD_SLOTS + 4 * PAGE_SLOTS;

    type Id = EntryId;

    #[inline]
    fn is_used(&self) -> bool {
        self.used
    }
}
