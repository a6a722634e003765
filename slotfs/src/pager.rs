//! # 文件数据分页层
//!
//! 文件的字节区间被切成一页页，第`i`页存放在`blocks[i]`指向的数据块中。
//! 页按下标直接寻址，数据块之间没有链表。
//!
//! - 页号 = 偏移 / [`PAGE_SIZE`]
//! - 页内偏移 = 偏移 % [`PAGE_SIZE`]

use alloc::vec::Vec;

use crate::layout::{DiskBlock, DiskEntry, EntryId, SizeMode};
use crate::volume::Volume;
use crate::{Error, PAGE_SIZE, PAGE_SLOTS, Result};

impl Volume {
    /// 文件大小，按页序遍历，遇到空引用或空闲块即停止
    ///
    /// - [`SizeMode::Explicit`]：最后一页的起始偏移加上它的有效长度，
    ///   前面的页不论写了多少都算整页；
    /// - [`SizeMode::Terminated`]：累加每页到第一个`\0`为止的长度。
    pub fn file_size(&self, file: &DiskEntry) -> Result<usize> {
        let mode = self.size_mode();
        let mut size = 0;
        for (page, block) in self.pages(file).enumerate() {
            let Some(block) = block? else {
                break;
            };
            size = match mode {
                SizeMode::Explicit => page * PAGE_SIZE + block.data_len(mode),
                SizeMode::Terminated => size + block.data_len(mode),
            };
        }
        Ok(size)
    }

    /// 文件占用的数据块数
    pub fn file_blocks(&self, file: &DiskEntry) -> Result<usize> {
        let mut count = 0;
        for id in file.blocks.iter().flatten() {
            if self.blocks.read(self.dev(), *id)?.used {
                count += 1;
            }
        }
        Ok(count)
    }

    /// 从`offset`处最多读出`len`字节
    ///
    /// 读取范围先被截断到文件大小；中途遇到缺失的页则提前结束，读到多少算多少。
    pub fn read_range(&self, file_id: EntryId, offset: usize, len: usize) -> Result<Vec<u8>> {
        let file = self.entry(file_id)?;
        if file.is_dir() {
            return Err(Error::IsDirectory);
        }

        let size = self.file_size(&file)?;
        let len = len.min(size.saturating_sub(offset));
        let mut buf = Vec::with_capacity(len);

        let mut start = offset;
        while buf.len() < len {
            let page = start / PAGE_SIZE;
            let cursor = start % PAGE_SIZE;
            let Some(block_id) = file.blocks.get(page).copied().flatten() else {
                break;
            };
            let block = self.blocks.read(self.dev(), block_id)?;
            if !block.used {
                break;
            }

            let n = (PAGE_SIZE - cursor).min(len - buf.len());
            buf.extend_from_slice(&block.payload[cursor..cursor + n]);
            start += n;
        }

        if buf.len() < len {
            log::debug!("short read of {file_id}: {} of {len} bytes", buf.len());
        }
        Ok(buf)
    }

    /// 把`buf`写到`offset`处，返回实际写入的字节数
    ///
    /// 缺页时分配新的数据块。超出最后一页的部分直接丢弃，不报错；
    /// 数据块用尽时已写入的页保留下来，返回已写的字节数，一个字节都没写成才报错。
    pub fn write_range(&self, file_id: EntryId, offset: usize, buf: &[u8]) -> Result<usize> {
        let mut file = self.entry(file_id)?;
        if file.is_dir() {
            return Err(Error::IsDirectory);
        }

        let outcome = self.write_pages(file_id, &mut file, offset, buf);
        // 无论成败，已经挂上的新块都要落盘
        self.store_entry(file_id, &file)?;

        match outcome {
            Ok(written) => Ok(written),
            Err((written, Error::OutOfSpace)) if written > 0 => {
                log::warn!("short write of {file_id}: {written} of {} bytes", buf.len());
                Ok(written)
            }
            Err((_, err)) => Err(err),
        }
    }

    /// 释放文件的全部数据块
    pub fn release_pages(&self, file: &mut DiskEntry) -> Result<()> {
        for slot in file.blocks.iter_mut() {
            if let Some(id) = slot.take() {
                self.blocks.free(self.dev(), id)?;
            }
        }
        Ok(())
    }
}

impl Volume {
    /// 按页序读出文件的数据块，空引用或空闲块为`None`
    fn pages<'a>(
        &'a self,
        file: &'a DiskEntry,
    ) -> impl Iterator<Item = Result<Option<DiskBlock>>> + 'a {
        file.blocks.iter().map(move |slot| match slot {
            Some(id) => self
                .blocks
                .read(self.dev(), *id)
                .map(|block| block.used.then_some(block)),
            None => Ok(None),
        })
    }

    /// 逐页写入；出错时带上已写入的字节数
    fn write_pages(
        &self,
        file_id: EntryId,
        file: &mut DiskEntry,
        offset: usize,
        buf: &[u8],
    ) -> core::result::Result<usize, (usize, Error)> {
        let end = offset.saturating_add(buf.len());
        let mut start = offset;
        let mut written = 0;

        while start < end {
            let page = start / PAGE_SIZE;
            if page >= PAGE_SLOTS {
                log::warn!("{file_id} reached its last page, {} bytes dropped", end - start);
                break;
            }

            let cursor = start % PAGE_SIZE;
            let n = (PAGE_SIZE - cursor).min(end - start);
            let src = &buf[written..written + n];

            match file.blocks[page] {
                Some(block_id) => {
                    self.blocks
                        .map_mut(self.dev(), block_id, |block| block.fill(cursor, src))
                        .map_err(|err| (written, err))?;
                }
                None => {
                    let mut block = DiskBlock::new(file_id);
                    block.fill(cursor, src);
                    let block_id = self
                        .blocks
                        .allocate(self.dev(), &block)
                        .map_err(|err| (written, err))?;
                    file.blocks[page] = Some(block_id);
                }
            }

            written += n;
            start += n;
        }

        Ok(written)
    }
}
