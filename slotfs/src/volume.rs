//! # 卷管理层
//!
//! 构建出磁盘的布局并使用：超级块之后依次是元数据项池和数据块池。

use alloc::sync::Arc;
use alloc::vec;

use slotfs_dev::BackingDevice;

use crate::layout::*;
use crate::pool::SlotPool;
use crate::{Error, Result};

/// 卷的运行时配置，格式化后保存在超级块中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub max_entries: u32,
    pub max_blocks: u32,
    pub size_mode: SizeMode,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(16, 32)
    }
}

impl Geometry {
    pub const fn new(max_entries: u32, max_blocks: u32) -> Self {
        Self {
            max_entries,
            max_blocks,
            size_mode: SizeMode::Explicit,
        }
    }

    pub const fn with_size_mode(self, size_mode: SizeMode) -> Self {
        Self { size_mode, ..self }
    }

    /// 按此配置格式化所需的设备字节数
    pub fn device_size(&self) -> u64 {
        SuperBlock::SIZE as u64
            + self.max_entries as u64 * DiskEntry::SIZE as u64
            + self.max_blocks as u64 * DiskBlock::SIZE as u64
    }

    fn validate(&self) -> Result<()> {
        // 槽位号要能放进 u32，且不能撞上空引用哨兵
        let valid = |n: u32| n >= 1 && n < NIL;
        if valid(self.max_entries) && valid(self.max_blocks) {
            Ok(())
        } else {
            Err(Error::InvalidGeometry)
        }
    }
}

/// 两个槽位池的占用情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub used_entries: u32,
    pub max_entries: u32,
    pub used_blocks: u32,
    pub max_blocks: u32,
}

pub struct Volume {
    dev: Arc<dyn BackingDevice>,
    geometry: Geometry,
    pub entries: SlotPool<DiskEntry>,
    pub blocks: SlotPool<DiskBlock>,
}

impl Volume {
    pub fn format(dev: Arc<dyn BackingDevice>, geometry: Geometry) -> Result<Self> {
        geometry.validate()?;
        if dev.size() < geometry.device_size() {
            log::error!(
                "device holds {} bytes, {} needed",
                dev.size(),
                geometry.device_size()
            );
            return Err(Error::InvalidGeometry);
        }

        let volume = Self::layout(dev, geometry);

        let super_block = SuperBlock::new(
            geometry.max_entries,
            geometry.max_blocks,
            geometry.size_mode,
        );
        let mut header = vec![0; SuperBlock::SIZE];
        let encoded = encode(&super_block)?;
        header[..encoded.len()].copy_from_slice(&encoded);
        volume.dev.write_at(0, &header)?;

        volume.entries.zeroize(volume.dev())?;
        volume.blocks.zeroize(volume.dev())?;

        // 根目录必定落在 0 号槽位
        let root = DiskEntry::new("/", EntryKind::Directory, EntryId::ROOT);
        let root_id = volume.entries.allocate(volume.dev(), &root)?;
        assert_eq!(root_id, EntryId::ROOT);
        volume.dev.sync()?;

        log::info!(
            "formatted volume: {} entries, {} blocks, {:?} sizes",
            geometry.max_entries,
            geometry.max_blocks,
            geometry.size_mode
        );
        Ok(volume)
    }

    pub fn open(dev: Arc<dyn BackingDevice>) -> Result<Self> {
        let mut header = [0; SuperBlock::SIZE];
        dev.read_at(0, &mut header).map_err(|err| {
            log::error!("cannot read superblock: {err}");
            Error::Corrupted
        })?;
        let super_block: SuperBlock = decode(&header)?;

        if !super_block.is_valid() {
            log::error!("bad magic or version: {super_block:?}");
            return Err(Error::Corrupted);
        }
        if !super_block.matches_layout() {
            log::error!("volume was written with another layout: {super_block:?}");
            return Err(Error::Corrupted);
        }

        let geometry = Geometry {
            max_entries: super_block.max_entries,
            max_blocks: super_block.max_blocks,
            size_mode: super_block.size_mode,
        };
        geometry.validate().map_err(|_| Error::Corrupted)?;
        if dev.size() < geometry.device_size() {
            log::error!("device is shorter than its superblock claims");
            return Err(Error::Corrupted);
        }

        let volume = Self::layout(dev, geometry);
        let root = volume.entries.read(volume.dev(), EntryId::ROOT)?;
        if !root.used || !root.is_dir() {
            log::error!("root directory is missing");
            return Err(Error::Corrupted);
        }
        Ok(volume)
    }

    #[inline]
    pub fn dev(&self) -> &dyn BackingDevice {
        self.dev.as_ref()
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    pub fn size_mode(&self) -> SizeMode {
        self.geometry.size_mode
    }

    /// 读出占用中的元数据项，空槽位视为不存在
    pub fn entry(&self, id: EntryId) -> Result<DiskEntry> {
        let entry = self.entries.read(self.dev(), id)?;
        if !entry.used {
            return Err(Error::NotFound);
        }
        Ok(entry)
    }

    #[inline]
    pub fn store_entry(&self, id: EntryId, entry: &DiskEntry) -> Result<()> {
        self.entries.write(self.dev(), id, entry)
    }

    pub fn usage(&self) -> Result<Usage> {
        Ok(Usage {
            used_entries: self.entries.used_slots(self.dev())?.len() as u32,
            max_entries: self.geometry.max_entries,
            used_blocks: self.blocks.used_slots(self.dev())?.len() as u32,
            max_blocks: self.geometry.max_blocks,
        })
    }
}

impl Volume {
    fn layout(dev: Arc<dyn BackingDevice>, geometry: Geometry) -> Self {
        let entries = SlotPool::<DiskEntry>::new(SuperBlock::SIZE as u64, geometry.max_entries);
        let blocks = SlotPool::new(entries.end(), geometry.max_blocks);

        Self {
            dev,
            geometry,
            entries,
            blocks,
        }
    }
}
