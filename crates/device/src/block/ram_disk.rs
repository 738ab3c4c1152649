//! 内存模拟块设备

use super::BlockDriver;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use sync::SpinLock;

/// 内存模拟的块设备
///
/// 用于测试和开发。可以注入读取故障，并统计块读取次数。
pub struct RamDisk {
    /// 存储数据
    data: SpinLock<Vec<u8>>,

    /// 块大小
    block_size: usize,

    /// 设备名
    name: String,

    /// 为 true 时所有读取失败
    faulty: AtomicBool,

    /// 成功读取的块数
    reads: AtomicUsize,
}

impl RamDisk {
    /// 创建指定大小的内存磁盘，内容全为 0
    pub fn new(name: &str, size: usize, block_size: usize) -> Arc<Self> {
        Self::from_bytes(name, vec![0u8; size], block_size)
    }

    /// 从字节数组创建
    ///
    /// 末尾不足一个块的字节不可寻址。
    pub fn from_bytes(name: &str, data: Vec<u8>, block_size: usize) -> Arc<Self> {
        Arc::new(Self {
            data: SpinLock::new(data),
            block_size,
            name: String::from(name),
            faulty: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        })
    }

    /// 在字节偏移 `offset` 处直接写入（绕过块对齐，用于构造镜像）
    ///
    /// 越界时返回 false 且不修改任何数据
    pub fn write_at(&self, offset: usize, bytes: &[u8]) -> bool {
        let mut data = self.data.lock();
        match offset.checked_add(bytes.len()) {
            Some(end) if end <= data.len() => {
                data[offset..end].copy_from_slice(bytes);
                true
            }
            _ => false,
        }
    }

    /// 设置读取故障注入
    pub fn set_faulty(&self, faulty: bool) {
        self.faulty.store(faulty, Ordering::Relaxed);
    }

    /// 已成功读取的块数
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl BlockDriver for RamDisk {
    fn get_id(&self) -> String {
        self.name.clone()
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> bool {
        if buf.len() != self.block_size || self.faulty.load(Ordering::Relaxed) {
            return false;
        }

        let data = self.data.lock();
        let Some(offset) = block_id.checked_mul(self.block_size) else {
            return false;
        };

        if offset
            .checked_add(self.block_size)
            .is_none_or(|end| end > data.len())
        {
            return false;
        }

        buf.copy_from_slice(&data[offset..offset + self.block_size]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn total_blocks(&self) -> usize {
        if self.block_size == 0 {
            return 0;
        }
        self.data.lock().len() / self.block_size
    }
}
