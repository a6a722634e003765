#![allow(dead_code)]

use std::sync::Arc;

use slotfs::{Geometry, SizeMode, SlotFileSystem};
use slotfs_dev::RamDevice;

pub fn device(geometry: Geometry) -> Arc<RamDevice> {
    Arc::new(RamDevice::new(geometry.device_size() as usize))
}

pub fn format(geometry: Geometry) -> (Arc<RamDevice>, SlotFileSystem) {
    let dev = device(geometry);
    let fs = SlotFileSystem::format(dev.clone(), geometry).unwrap();
    (dev, fs)
}

/// 16 个元数据项、32 个数据块
pub fn small() -> SlotFileSystem {
    format(Geometry::default()).1
}

pub fn with_mode(size_mode: SizeMode) -> SlotFileSystem {
    format(Geometry::default().with_size_mode(size_mode)).1
}
