//! 块设备模块
//!
//! 包含扇区读取原语、块设备驱动接口和实现

mod ram_disk;
mod table;

use alloc::string::String;

pub use ram_disk::RamDisk;
pub use table::DeviceTable;

/// 扇区大小（字节），所有偏移计算都以此为单位
pub const SECTOR_SIZE: usize = 512;

/// 扇区读取错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorError {
    /// 设备标识未注册
    NoDevice,
    /// 读取范围超出设备容量
    OutOfRange,
    /// 驱动报告读取失败
    Io,
    /// 中转缓冲区分配失败
    NoMemory,
    /// 参数无效（例如块大小为 0、重复注册）
    InvalidArgument,
}

/// 扇区读取原语
///
/// 同步、不可取消：调用返回时读取已经完成或失败。
pub trait SectorSource: Send + Sync {
    /// 从 `device` 的第 `sector` 个扇区开始读取 `buf.len()` 字节
    ///
    /// # 参数：
    /// * `device` - 设备标识
    /// * `sector` - 起始扇区号（以 [`SECTOR_SIZE`] 为单位）
    /// * `buf` - 目标缓冲区，其长度即读取字节数，不要求按扇区对齐
    fn read(&self, device: &str, sector: u64, buf: &mut [u8]) -> Result<(), SectorError>;
}

/// 块设备驱动程序接口
///
/// 文件系统核心只读取设备，因此驱动只需提供按块读取。
pub trait BlockDriver: Send + Sync {
    /// 获取此设备的唯一标识符
    fn get_id(&self) -> String;

    /// 读取块设备数据
    /// # 参数：
    /// * `block_id` - 块设备的块号
    /// * `buf` - 用于存储读取数据的缓冲区，长度必须等于块大小
    /// # 返回值：
    /// 如果读取成功则返回 true，否则返回 false
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> bool;

    /// 获取块大小（字节）
    fn block_size(&self) -> usize;

    /// 获取总块数
    fn total_blocks(&self) -> usize;
}
