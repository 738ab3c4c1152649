//! 块设备层
//!
//! 此 crate 为文件系统核心提供“从设备 D 的扇区 S 处读取 N 字节”这一原语：
//!
//! - [`SectorSource`] trait - 扇区读取接口，文件系统只依赖它
//! - [`BlockDriver`] trait - 按块寻址的块设备驱动接口
//! - [`DeviceTable`] - 按设备标识路由到已注册驱动的 [`SectorSource`] 实现
//! - [`RamDisk`] - 内存模拟块设备
//!
//! 扇区大小固定为 [`SECTOR_SIZE`]（512 字节），与驱动自身的块大小无关。

#![no_std]

extern crate alloc;

pub mod block;

pub use block::{BlockDriver, DeviceTable, RamDisk, SECTOR_SIZE, SectorError, SectorSource};
