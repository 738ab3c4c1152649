//! 设备表
//!
//! 以设备标识为键保存块设备驱动，并把任意字节长度的扇区读取
//! 拆分为驱动能处理的整块读取。

use alloc::sync::Arc;
use alloc::vec::Vec;
use sync::SpinLock;

use super::{BlockDriver, SECTOR_SIZE, SectorError, SectorSource};

/// 块设备表
#[derive(Default)]
pub struct DeviceTable {
    devices: SpinLock<Vec<Arc<dyn BlockDriver>>>,
}

impl DeviceTable {
    /// 创建空设备表
    pub fn new() -> Self {
        Self {
            devices: SpinLock::new(Vec::new()),
        }
    }

    /// 注册块设备
    ///
    /// 标识重复或块大小为 0 时返回 [`SectorError::InvalidArgument`]
    pub fn register(&self, device: Arc<dyn BlockDriver>) -> Result<(), SectorError> {
        if device.block_size() == 0 {
            return Err(SectorError::InvalidArgument);
        }

        let id = device.get_id();
        let mut devices = self.devices.lock();
        if devices.iter().any(|d| d.get_id() == id) {
            return Err(SectorError::InvalidArgument);
        }

        log::debug!("device: register {} ({} blocks)", id, device.total_blocks());
        devices.push(device);
        Ok(())
    }

    /// 注销块设备，返回被移除的驱动
    pub fn unregister(&self, id: &str) -> Option<Arc<dyn BlockDriver>> {
        let mut devices = self.devices.lock();
        let index = devices.iter().position(|d| d.get_id() == id)?;
        Some(devices.remove(index))
    }

    /// 按标识查找块设备
    pub fn find(&self, id: &str) -> Option<Arc<dyn BlockDriver>> {
        self.devices
            .lock()
            .iter()
            .find(|d| d.get_id() == id)
            .cloned()
    }

    /// 已注册设备数
    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    /// 设备表是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SectorSource for DeviceTable {
    fn read(&self, device: &str, sector: u64, buf: &mut [u8]) -> Result<(), SectorError> {
        // 先取出 Arc 再读，读期间不持有表锁
        let driver = self.find(device).ok_or(SectorError::NoDevice)?;
        if buf.is_empty() {
            return Ok(());
        }

        let block_size = driver.block_size();
        let capacity = driver
            .total_blocks()
            .checked_mul(block_size)
            .ok_or(SectorError::OutOfRange)?;
        let start = sector
            .checked_mul(SECTOR_SIZE as u64)
            .and_then(|b| usize::try_from(b).ok())
            .ok_or(SectorError::OutOfRange)?;
        let end = start
            .checked_add(buf.len())
            .ok_or(SectorError::OutOfRange)?;
        if end > capacity {
            return Err(SectorError::OutOfRange);
        }

        let mut block = Vec::new();
        block
            .try_reserve_exact(block_size)
            .map_err(|_| SectorError::NoMemory)?;
        block.resize(block_size, 0);
        let mut pos = start;
        while pos < end {
            let block_id = pos / block_size;
            let in_block = pos % block_size;
            let len = (block_size - in_block).min(end - pos);

            if !driver.read_block(block_id, &mut block) {
                log::warn!("device: {} failed to read block {}", device, block_id);
                return Err(SectorError::Io);
            }

            let dst = pos - start;
            buf[dst..dst + len].copy_from_slice(&block[in_block..in_block + len]);
            pos += len;
        }

        Ok(())
    }
}
