//! # 槽位池层
//!
//! 后备设备上一段连续的定长记录区。槽位以下标编号，
//! 字节偏移只在本层内部计算，不会外泄给上层。
//!
//! 分配时按偏移从小到大线性扫描，返回第一个占用标志为 0 的槽位；
//! 不维护空闲链表或位图，容量固定且很小，扫描的代价可以接受。

use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use slotfs_dev::BackingDevice;

use crate::layout::{Record, USED_OFFSET, decode, encode};
use crate::{Error, Result};

#[derive(Debug)]
pub struct SlotPool<R> {
    /// 池在设备上的起始偏移
    base: u64,
    /// 槽位个数
    capacity: u32,
    _record: PhantomData<R>,
}

impl<R: Record> SlotPool<R> {
    #[inline]
    pub const fn new(base: u64, capacity: u32) -> Self {
        Self {
            base,
            capacity,
            _record: PhantomData,
        }
    }

    /// 池所占区域的末偏移（不含）
    #[inline]
    pub fn end(&self) -> u64 {
        self.base + self.capacity as u64 * R::SIZE as u64
    }

    /// 找到第一个空闲槽位，写入`record`并标记占用，返回其ID
    ///
    /// `record`本身应当是新构造的，旧槽位里残留的字节会被整条覆盖。
    pub fn allocate(&self, dev: &dyn BackingDevice, record: &R) -> Result<R::Id> {
        debug_assert!(record.is_used());

        for slot in 0..self.capacity {
            if self.slot_used(dev, slot)? {
                continue;
            }

            let id = R::Id::from(slot);
            self.write(dev, id, record)?;
            log::debug!("allocate {id}");
            return Ok(id);
        }

        log::debug!("pool of {} slots is exhausted", self.capacity);
        Err(Error::OutOfSpace)
    }

    /// 清除占用标志，不移动其它槽位，也不清空内容
    pub fn free(&self, dev: &dyn BackingDevice, id: R::Id) -> Result<()> {
        let offset = self.offset(id)?;
        // 释放的槽位一定得处于占用状态
        if !self.slot_used(dev, id.into())? {
            log::error!("double free of {id}");
            return Err(Error::InvalidRef);
        }
        dev.write_at(offset + USED_OFFSET as u64, &[0])?;
        log::debug!("free {id}");
        Ok(())
    }

    /// 读出槽位里的记录，不论是否占用
    pub fn read(&self, dev: &dyn BackingDevice, id: R::Id) -> Result<R> {
        let offset = self.offset(id)?;
        let mut buf = vec![0; R::SIZE];
        dev.read_at(offset, &mut buf)?;
        decode(&buf)
    }

    pub fn write(&self, dev: &dyn BackingDevice, id: R::Id, record: &R) -> Result<()> {
        let offset = self.offset(id)?;
        let bytes = encode(record)?;
        debug_assert_eq!(bytes.len(), R::SIZE);
        dev.write_at(offset, &bytes)?;
        Ok(())
    }

    /// 读出处于占用状态的记录
    pub fn get(&self, dev: &dyn BackingDevice, id: R::Id) -> Result<R> {
        let record = self.read(dev, id)?;
        if !record.is_used() {
            log::error!("dangling reference to {id}");
            return Err(Error::InvalidRef);
        }
        Ok(record)
    }

    /// 读取占用中的记录并处理
    #[inline]
    pub fn map<V>(&self, dev: &dyn BackingDevice, id: R::Id, f: impl FnOnce(&R) -> V) -> Result<V> {
        self.get(dev, id).map(|record| f(&record))
    }

    /// 以某种方式修改占用中的记录，并写回
    pub fn map_mut<V>(
        &self,
        dev: &dyn BackingDevice,
        id: R::Id,
        f: impl FnOnce(&mut R) -> V,
    ) -> Result<V> {
        let mut record = self.get(dev, id)?;
        let value = f(&mut record);
        self.write(dev, id, &record)?;
        Ok(value)
    }

    /// 所有占用中的槽位，按偏移升序
    pub fn used_slots(&self, dev: &dyn BackingDevice) -> Result<Vec<R::Id>> {
        let mut slots = Vec::new();
        for slot in 0..self.capacity {
            if self.slot_used(dev, slot)? {
                slots.push(R::Id::from(slot));
            }
        }
        Ok(slots)
    }

    /// 把整个池清零
    pub fn zeroize(&self, dev: &dyn BackingDevice) -> Result<()> {
        let zeros = vec![0; R::SIZE];
        for slot in 0..self.capacity {
            dev.write_at(self.base + slot as u64 * R::SIZE as u64, &zeros)?;
        }
        Ok(())
    }
}

impl<R: Record> SlotPool<R> {
    /// 槽位的字节偏移；越界即为程序错误
    fn offset(&self, id: R::Id) -> Result<u64> {
        let slot: u32 = id.into();
        if slot >= self.capacity {
            log::error!("{id} is out of a pool of {} slots", self.capacity);
            return Err(Error::InvalidRef);
        }
        Ok(self.base + slot as u64 * R::SIZE as u64)
    }

    fn slot_used(&self, dev: &dyn BackingDevice, slot: u32) -> Result<bool> {
        let mut flag = [0];
        let offset = self.base + slot as u64 * R::SIZE as u64 + USED_OFFSET as u64;
        dev.read_at(offset, &mut flag)?;
        Ok(flag[0] != 0)
    }
}
