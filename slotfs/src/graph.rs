//! # 元数据图层
//!
//! 目录树由元数据项组成，项与项之间以槽位ID互相引用：
//! 目录通过`children`指向子项，子项通过`parent`指回目录。

use alloc::string::String;
use alloc::vec::Vec;

use crate::layout::{DiskEntry, EntryId};
use crate::vfs::DirEntry;
use crate::volume::Volume;
use crate::{Error, MAX_DEPTH, Result};

impl Volume {
    /// 从根目录出发，依次匹配`segments`的前`depth`个分量
    ///
    /// `depth`为 0 时直接返回根目录；解析某路径的父目录时传入`segments.len() - 1`。
    pub fn resolve(&self, segments: &[&str], depth: usize) -> Result<EntryId> {
        if depth > segments.len() {
            return Err(Error::InvalidArgument);
        }
        if depth > MAX_DEPTH {
            log::debug!("path of {depth} components is too deep");
            return Err(Error::NotFound);
        }

        let mut current = EntryId::ROOT;
        for (i, segment) in segments[..depth].iter().enumerate() {
            let dir = self.entry(current)?;
            if !dir.is_dir() {
                log::debug!("{:?} is not a directory", segments[..i].join("/"));
                return Err(Error::NotADirectory);
            }
            current = self.find_child(&dir, segment)?.ok_or(Error::NotFound)?;
        }

        Ok(current)
    }

    /// 在目录的子项中寻找名为`name`的占用项
    pub fn find_child(&self, dir: &DiskEntry, name: &str) -> Result<Option<EntryId>> {
        debug_assert!(dir.is_dir());

        for child in dir.children.iter().flatten() {
            let entry = self.entries.read(self.dev(), *child)?;
            if entry.used && entry.name()? == name {
                return Ok(Some(*child));
            }
        }

        Ok(None)
    }

    /// 按槽位顺序列出目录的子项
    pub fn list(&self, dir_id: EntryId) -> Result<Vec<DirEntry>> {
        let dir = self.entry(dir_id)?;
        if !dir.is_dir() {
            return Err(Error::NotADirectory);
        }

        let mut list = Vec::with_capacity(dir.children.len());
        for &id in dir.children.iter().flatten() {
            let entry = self.entries.map(self.dev(), id, |entry| {
                entry.name().map(|name| DirEntry {
                    id,
                    kind: entry.kind,
                    name: String::from(name),
                })
            })??;
            list.push(entry);
        }
        Ok(list)
    }

    /// `ancestor`是否为`id`本身或其祖先
    pub fn is_ancestor(&self, ancestor: EntryId, mut id: EntryId) -> Result<bool> {
        // 每一步都换一个槽位，步数超过容量说明父链成环
        for _ in 0..=self.geometry().max_entries {
            if id == ancestor {
                return Ok(true);
            }
            if id == EntryId::ROOT {
                return Ok(false);
            }
            id = self.entry(id)?.parent;
        }

        log::error!("parent chain of {id} loops");
        Err(Error::InvalidRef)
    }
}
