//! # 文件系统接口层
//!
//! 对外的入口。[`SlotFileSystem`]独占后备设备与一把自旋锁，
//! 每个公开操作从头到尾只加一次锁，因此分配、挂接、多页写入都不会被看到一半。
//! 不存在全局状态，不同实例之间互不相干。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use enumflags2::bitflags;
use slotfs_dev::BackingDevice;
use spin::Mutex;

use crate::layout::{BlockId, EntryId, EntryKind};
use crate::path::Path;
use crate::volume::{Geometry, Usage, Volume};
use crate::{Error, Result};

pub struct SlotFileSystem {
    volume: Mutex<Volume>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub id: EntryId,
    pub kind: StatKind,
    /// 文件字节数，目录恒为 0
    pub size: u64,
    /// 占用的数据块数，目录恒为 0
    pub blocks: u64,
}

#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatKind {
    DIR = 0o040000,
    #[default]
    FILE = 0o100000,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub name: String,
}

/// 占用中的元数据项快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub id: EntryId,
    pub kind: EntryKind,
    pub name: String,
    pub parent: EntryId,
    pub children: Vec<EntryId>,
    /// `(页号, 数据块)`
    pub blocks: Vec<(usize, BlockId)>,
}

/// 占用中的数据块快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub id: BlockId,
    pub owner: EntryId,
    pub len: u32,
    /// 按卷的大小模式截出的有效数据
    pub data: Vec<u8>,
}

impl Stat {
    pub(crate) fn new(id: EntryId, kind: EntryKind, size: u64, blocks: u64) -> Self {
        let kind = match kind {
            EntryKind::Directory => StatKind::DIR,
            EntryKind::File => StatKind::FILE,
        };
        Self {
            id,
            kind,
            size,
            blocks,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == StatKind::DIR
    }

    /// 文件类型位加上固定的权限位
    pub fn mode(&self) -> u32 {
        let perm = match self.kind {
            StatKind::DIR => 0o755,
            StatKind::FILE => 0o644,
        };
        self.kind as u32 | perm
    }
}

impl SlotFileSystem {
    /// 按`geometry`格式化设备，原有内容全部作废
    pub fn format(dev: Arc<dyn BackingDevice>, geometry: Geometry) -> Result<Self> {
        Volume::format(dev, geometry).map(Self::from_volume)
    }

    /// 挂载已格式化的设备
    pub fn open(dev: Arc<dyn BackingDevice>) -> Result<Self> {
        let volume = Volume::open(dev)?;
        log::info!("opened volume: {:?}", volume.geometry());
        Ok(Self::from_volume(volume))
    }

    #[inline]
    pub fn root(&self) -> EntryId {
        EntryId::ROOT
    }

    pub fn geometry(&self) -> Geometry {
        self.volume.lock().geometry()
    }

    pub fn usage(&self) -> Result<Usage> {
        self.volume.lock().usage()
    }

    pub fn sync(&self) -> Result<()> {
        let volume = self.volume.lock();
        volume.dev().sync()?;
        Ok(())
    }
}

// 以槽位ID为参数的操作
impl SlotFileSystem {
    /// 解析`segments`的前`depth`个分量
    pub fn resolve(&self, segments: &[&str], depth: usize) -> Result<EntryId> {
        self.volume.lock().resolve(segments, depth)
    }

    pub fn stat_entry(&self, id: EntryId) -> Result<Stat> {
        self.volume.lock().stat_entry(id)
    }

    pub fn list_children(&self, dir: EntryId) -> Result<Vec<DirEntry>> {
        self.volume.lock().list(dir)
    }

    pub fn is_empty_dir(&self, dir: EntryId) -> Result<bool> {
        self.volume.lock().is_empty_dir(dir)
    }

    pub fn create_entry(&self, parent: EntryId, name: &str, kind: EntryKind) -> Result<EntryId> {
        self.volume.lock().create_entry(parent, name, kind)
    }

    pub fn remove_entry(&self, id: EntryId, require_empty: bool) -> Result<()> {
        self.volume.lock().remove_entry(id, require_empty)
    }

    pub fn rename_entry(&self, id: EntryId, new_name: &str) -> Result<()> {
        self.volume.lock().rename_entry(id, new_name)
    }

    pub fn move_entry(&self, id: EntryId, new_parent: EntryId, new_name: &str) -> Result<()> {
        self.volume.lock().move_entry(id, new_parent, new_name)
    }

    pub fn read_range(&self, file: EntryId, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.volume.lock().read_range(file, offset, len)
    }

    pub fn write_range(&self, file: EntryId, offset: usize, buf: &[u8]) -> Result<usize> {
        self.volume.lock().write_range(file, offset, buf)
    }
}

// 以路径为参数的操作
impl SlotFileSystem {
    pub fn lookup(&self, path: &str) -> Result<EntryId> {
        let cmps = path.components();
        self.volume.lock().resolve(&cmps, cmps.len())
    }

    pub fn getattr(&self, path: &str) -> Result<Stat> {
        let volume = self.volume.lock();
        let cmps = path.components();
        let id = volume.resolve(&cmps, cmps.len())?;
        volume.stat_entry(id)
    }

    pub fn readdir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let volume = self.volume.lock();
        let cmps = path.components();
        let id = volume.resolve(&cmps, cmps.len())?;
        volume.list(id)
    }

    /// 创建空文件
    pub fn create(&self, path: &str) -> Result<EntryId> {
        self.make(path, EntryKind::File)
    }

    pub fn mkdir(&self, path: &str) -> Result<EntryId> {
        self.make(path, EntryKind::Directory)
    }

    /// 删除文件，目录要用[`Self::rmdir`]
    pub fn unlink(&self, path: &str) -> Result<()> {
        let volume = self.volume.lock();
        let id = resolve_removable(&volume, path)?;
        if volume.entry(id)?.is_dir() {
            return Err(Error::IsDirectory);
        }
        volume.remove_entry(id, true)
    }

    /// 删除空目录
    pub fn rmdir(&self, path: &str) -> Result<()> {
        let volume = self.volume.lock();
        let id = resolve_removable(&volume, path)?;
        if !volume.entry(id)?.is_dir() {
            return Err(Error::NotADirectory);
        }
        volume.remove_entry(id, true)
    }

    /// 同一目录内只改名，跨目录则移动
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let volume = self.volume.lock();
        let (from_dir, _) = from.parent_file().ok_or(Error::InvalidArgument)?;
        let (to_dir, to_name) = to.parent_file().ok_or(Error::InvalidArgument)?;

        let cmps = from.components();
        let id = volume.resolve(&cmps, cmps.len())?;
        let old_parent = volume.resolve(&from_dir, from_dir.len())?;
        let new_parent = volume.resolve(&to_dir, to_dir.len())?;

        if old_parent == new_parent {
            volume.rename_entry(id, to_name)
        } else {
            volume.move_entry(id, new_parent, to_name)
        }
    }

    pub fn read(&self, path: &str, offset: usize, len: usize) -> Result<Vec<u8>> {
        let volume = self.volume.lock();
        let cmps = path.components();
        let id = volume.resolve(&cmps, cmps.len())?;
        volume.read_range(id, offset, len)
    }

    pub fn write(&self, path: &str, offset: usize, buf: &[u8]) -> Result<usize> {
        let volume = self.volume.lock();
        let cmps = path.components();
        let id = volume.resolve(&cmps, cmps.len())?;
        volume.write_range(id, offset, buf)
    }
}

// 诊断
impl SlotFileSystem {
    /// 所有占用中的元数据项，按槽位升序
    pub fn entries(&self) -> Result<Vec<EntryInfo>> {
        let volume = self.volume.lock();
        let mut infos = Vec::new();
        for id in volume.entries.used_slots(volume.dev())? {
            let entry = volume.entries.get(volume.dev(), id)?;
            infos.push(EntryInfo {
                id,
                kind: entry.kind,
                name: String::from(entry.name()?),
                parent: entry.parent,
                children: entry.children.iter().flatten().copied().collect(),
                blocks: entry
                    .blocks
                    .iter()
                    .enumerate()
                    .filter_map(|(page, block)| block.map(|id| (page, id)))
                    .collect(),
            });
        }
        Ok(infos)
    }

    /// 所有占用中的数据块，按槽位升序
    pub fn blocks(&self) -> Result<Vec<BlockInfo>> {
        let volume = self.volume.lock();
        let mode = volume.size_mode();
        let mut infos = Vec::new();
        for id in volume.blocks.used_slots(volume.dev())? {
            let block = volume.blocks.get(volume.dev(), id)?;
            infos.push(BlockInfo {
                id,
                owner: block.owner,
                len: block.len,
                data: block.payload[..block.data_len(mode)].to_vec(),
            });
        }
        Ok(infos)
    }
}

impl SlotFileSystem {
    fn from_volume(volume: Volume) -> Self {
        Self {
            volume: Mutex::new(volume),
        }
    }

    fn make(&self, path: &str, kind: EntryKind) -> Result<EntryId> {
        let volume = self.volume.lock();
        // 根目录总是存在
        let (dir, name) = path.parent_file().ok_or(Error::AlreadyExists)?;
        let parent = volume.resolve(&dir, dir.len())?;
        volume.create_entry(parent, name, kind)
    }
}

fn resolve_removable(volume: &Volume, path: &str) -> Result<EntryId> {
    let cmps = path.components();
    if cmps.is_empty() {
        return Err(Error::InvalidArgument);
    }
    volume.resolve(&cmps, cmps.len())
}
