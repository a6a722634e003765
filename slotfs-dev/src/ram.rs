use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::{BackingDevice, DevError, check_range};

/// 内存里的后备设备，容量在创建时固定
#[derive(Debug)]
pub struct RamDevice {
    data: Mutex<Vec<u8>>,
}

impl RamDevice {
    /// 创建`size`字节、全零的设备
    pub fn new(size: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; size]),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: Mutex::new(bytes),
        }
    }

    /// 复制出设备的全部内容
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl BackingDevice for RamDevice {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), DevError> {
        let data = self.data.lock();
        check_range(data.len() as u64, offset, buf.len())?;
        let start = offset as usize;
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<(), DevError> {
        let mut data = self.data.lock();
        check_range(data.len() as u64, offset, buf.len())?;
        let start = offset as usize;
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.lock().len() as u64
    }
}
