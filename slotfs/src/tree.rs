//! # 文件树操作层
//!
//! 组合槽位池、元数据图与分页层，完成创建、删除、改名与移动。
//! 每个操作都会同时改写父子两条记录，调用者必须持有卷锁。

use alloc::vec;

use crate::layout::{DiskEntry, EntryId, EntryKind};
use crate::vfs::Stat;
use crate::volume::Volume;
use crate::{Error, NAME_MAX, Result};

impl Volume {
    /// 在目录`parent`下创建名为`name`的项
    pub fn create_entry(&self, parent: EntryId, name: &str, kind: EntryKind) -> Result<EntryId> {
        check_name(name)?;

        let mut dir = self.entry(parent)?;
        if !dir.is_dir() {
            return Err(Error::NotADirectory);
        }
        // 确认没有已创建的同名项
        if self.find_child(&dir, name)?.is_some() {
            return Err(Error::AlreadyExists);
        }
        let slot = dir.free_child_slot().ok_or(Error::DirectoryFull)?;

        let id = self
            .entries
            .allocate(self.dev(), &DiskEntry::new(name, kind, parent))?;

        dir.children[slot] = Some(id);
        if let Err(err) = self.store_entry(parent, &dir) {
            // 父目录没挂上，新项不能留在占用状态
            self.entries.free(self.dev(), id)?;
            return Err(err);
        }

        log::debug!("create {kind:?} {name:?} as {id} under {parent}");
        Ok(id)
    }

    /// 删除项及其数据
    ///
    /// `require_empty`时非空目录报错且不做任何修改；否则连同整棵子树一起删除。
    pub fn remove_entry(&self, id: EntryId, require_empty: bool) -> Result<()> {
        if id == EntryId::ROOT {
            return Err(Error::InvalidArgument);
        }

        let entry = self.entry(id)?;
        if entry.is_dir() && require_empty && !entry.is_empty_dir() {
            return Err(Error::NotEmpty);
        }

        let parent_id = entry.parent;
        let mut parent = self.entry(parent_id)?;
        let Some(slot) = parent.child_slot(id) else {
            log::error!("{id} is missing from its parent {parent_id}");
            return Err(Error::InvalidRef);
        };

        self.release_subtree(id, entry)?;

        parent.children[slot] = None;
        self.store_entry(parent_id, &parent)?;

        log::debug!("remove {id}");
        Ok(())
    }

    /// 只改名，父目录与数据块不变
    pub fn rename_entry(&self, id: EntryId, new_name: &str) -> Result<()> {
        check_name(new_name)?;
        if id == EntryId::ROOT {
            return Err(Error::InvalidArgument);
        }

        let mut entry = self.entry(id)?;
        if entry.name()? == new_name {
            return Ok(());
        }

        let parent = self.entry(entry.parent)?;
        if self.find_child(&parent, new_name)?.is_some() {
            return Err(Error::AlreadyExists);
        }

        log::debug!("rename {id}: {:?} -> {new_name:?}", entry.name()?);
        entry.set_name(new_name);
        self.store_entry(id, &entry)
    }

    /// 把项移动到`new_parent`下并改名为`new_name`
    ///
    /// 目标目录已有同名项时报错，不做覆盖。
    pub fn move_entry(&self, id: EntryId, new_parent: EntryId, new_name: &str) -> Result<()> {
        check_name(new_name)?;
        if id == EntryId::ROOT {
            return Err(Error::InvalidArgument);
        }

        let mut entry = self.entry(id)?;
        if entry.parent == new_parent {
            return self.rename_entry(id, new_name);
        }

        let mut dest = self.entry(new_parent)?;
        if !dest.is_dir() {
            return Err(Error::NotADirectory);
        }
        // 目录不能移进自己的子树
        if self.is_ancestor(id, new_parent)? {
            return Err(Error::InvalidArgument);
        }
        if self.find_child(&dest, new_name)?.is_some() {
            return Err(Error::AlreadyExists);
        }
        let dest_slot = dest.free_child_slot().ok_or(Error::DirectoryFull)?;

        let old_parent = entry.parent;
        let mut src = self.entry(old_parent)?;
        let Some(src_slot) = src.child_slot(id) else {
            log::error!("{id} is missing from its parent {old_parent}");
            return Err(Error::InvalidRef);
        };

        dest.children[dest_slot] = Some(id);
        self.store_entry(new_parent, &dest)?;
        src.children[src_slot] = None;
        self.store_entry(old_parent, &src)?;

        entry.parent = new_parent;
        entry.set_name(new_name);
        self.store_entry(id, &entry)?;

        log::debug!("move {id}: {old_parent} -> {new_parent} as {new_name:?}");
        Ok(())
    }

    pub fn stat_entry(&self, id: EntryId) -> Result<Stat> {
        let entry = self.entry(id)?;
        let (size, blocks) = match entry.kind {
            EntryKind::Directory => (0, 0),
            EntryKind::File => (self.file_size(&entry)?, self.file_blocks(&entry)?),
        };
        Ok(Stat::new(id, entry.kind, size as u64, blocks as u64))
    }

    pub fn is_empty_dir(&self, id: EntryId) -> Result<bool> {
        let entry = self.entry(id)?;
        if !entry.is_dir() {
            return Err(Error::NotADirectory);
        }
        Ok(entry.is_empty_dir())
    }
}

impl Volume {
    /// 释放`root`为根的子树：文件的数据块与所有元数据项
    fn release_subtree(&self, root: EntryId, entry: DiskEntry) -> Result<()> {
        let mut stack = vec![(root, entry)];
        while let Some((id, mut entry)) = stack.pop() {
            match entry.kind {
                EntryKind::File => self.release_pages(&mut entry)?,
                EntryKind::Directory => {
                    for &child in entry.children.iter().flatten() {
                        stack.push((child, self.entries.get(self.dev(), child)?));
                    }
                }
            }
            entry.used = false;
            self.store_entry(id, &entry)?;
        }
        Ok(())
    }
}

/// 名字不能为空，不能含`/`与`\0`，且不超过[`NAME_MAX`]字节
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\0']) {
        return Err(Error::InvalidArgument);
    }
    if name.len() > NAME_MAX {
        return Err(Error::NameTooLong);
    }
    Ok(())
}
