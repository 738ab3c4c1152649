//! NTFS 卷挂载与表项读取

use alloc::string::String;
use alloc::sync::Arc;

use device::{SectorError, SectorSource, SECTOR_SIZE};
use log::{debug, warn};
use vfs::{FileSystem, FsError, InodeMetadata};

use super::layout::{entry_buffer, BootSector, MetadataEntry, OEM_ID};
use crate::config::{ATTR_DATA, ATTR_STANDARD_INFORMATION, ENTRY_SIZE, ROOT_ENTRY};
use crate::owned_name;

/// 1601-01-01 到 1970-01-01 的秒数
const NT_EPOCH_OFFSET: u64 = 11_644_473_600;

/// NT 时间（自 1601 年起的 100ns 计数）转换为 Unix 秒，早于 1970 的时间记为 0
pub fn nt_to_unix(ticks: u64) -> u64 {
    (ticks / 10_000_000).saturating_sub(NT_EPOCH_OFFSET)
}

/// 扇区读取失败统一视为 I/O 错误，缓冲区分配失败除外
fn sector_error(e: SectorError) -> FsError {
    match e {
        SectorError::NoMemory => FsError::AllocationFailure,
        _ => FsError::ReadError,
    }
}

/// 已挂载的只读 NTFS 卷
///
/// 不缓存任何表项：每次查找都会重新从设备读取。
pub struct ForeignVolume {
    source: Arc<dyn SectorSource>,
    device: String,
    boot: BootSector,
    mft_start: u64,
}

impl ForeignVolume {
    /// 读取并校验 `device` 的引导扇区
    pub fn mount(source: Arc<dyn SectorSource>, device: &str) -> Result<Self, FsError> {
        let mut raw = [0u8; SECTOR_SIZE];
        source.read(device, 0, &mut raw).map_err(|e| {
            warn!("ntfs: {}: failed to read boot sector: {:?}", device, e);
            sector_error(e)
        })?;

        let boot = BootSector::parse(&raw);
        if !boot.is_valid() {
            warn!(
                "ntfs: {}: bad end-of-sector marker {:#06x}",
                device, boot.end_of_sector_marker
            );
            return Err(FsError::InvalidBootSector);
        }
        if boot.oem_id != OEM_ID {
            warn!("ntfs: {}: unexpected OEM id {:?}", device, boot.oem_id);
        }
        let mft_start = boot.mft_start_sector().ok_or_else(|| {
            warn!("ntfs: {}: metadata table start overflows", device);
            FsError::InvalidBootSector
        })?;

        debug!("ntfs: mounted {} (metadata table at sector {})", device, mft_start);
        Ok(Self {
            source,
            device: owned_name(device)?,
            boot,
            mft_start,
        })
    }

    /// 设备名
    pub fn device(&self) -> &str {
        &self.device
    }

    /// 引导扇区快照
    pub fn boot_sector(&self) -> &BootSector {
        &self.boot
    }

    /// 元数据表起始扇区
    pub fn mft_start(&self) -> u64 {
        self.mft_start
    }

    /// 读取编号为 `index` 的元数据表项
    pub fn read_entry(&self, index: u64) -> Result<MetadataEntry, FsError> {
        let offset = index
            .checked_mul(ENTRY_SIZE as u64)
            .ok_or(FsError::InvalidArgument)?;
        let sector = self
            .mft_start
            .checked_add(offset / SECTOR_SIZE as u64)
            .ok_or(FsError::InvalidArgument)?;

        let mut buf = entry_buffer()?;
        self.source
            .read(&self.device, sector, &mut buf)
            .map_err(|e| {
                warn!("ntfs: {}: failed to read entry {}: {:?}", self.device, index, e);
                sector_error(e)
            })?;
        debug!("ntfs: {}: read entry {} at sector {}", self.device, index, sector);
        MetadataEntry::parse(index, buf)
    }

    /// 将表项 `index` 的常驻 `$DATA` 内容复制到 `buf`，返回复制的字节数
    ///
    /// `buf` 必须能容纳属性声明的整个长度（含头部），否则返回 [`FsError::BufferTooSmall`]。
    pub fn read_entry_data(&self, index: u64, buf: &mut [u8]) -> Result<usize, FsError> {
        let entry = self.read_entry(index)?;
        let attr = entry.find_attribute(ATTR_DATA)?;
        if attr.is_non_resident() {
            return Err(FsError::NonResidentUnsupported);
        }
        if attr.length() as usize > buf.len() {
            return Err(FsError::BufferTooSmall);
        }
        let data = attr.resident_data()?;
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    /// 将路径解析为表项编号
    // TODO: 通过目录索引属性（$INDEX_ROOT / $INDEX_ALLOCATION）逐级解析路径
    pub fn resolve(&self, _path: &str) -> Result<u64, FsError> {
        Ok(ROOT_ENTRY)
    }

    /// 读取路径对应文件的内容
    pub fn read_file(&self, path: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        self.read_entry_data(self.resolve(path)?, buf)
    }

    /// 获取路径对应表项的元数据
    ///
    /// 大小取常驻 `$DATA` 的长度（没有 `$DATA` 时为 0），
    /// 时间戳取自 `$STANDARD_INFORMATION`（没有时为 0）。
    pub fn stat(&self, path: &str) -> Result<InodeMetadata, FsError> {
        let index = self.resolve(path)?;
        let entry = self.read_entry(index)?;

        let size = match entry.find_attribute(ATTR_DATA) {
            Ok(attr) => attr.resident_data()?.len(),
            Err(FsError::AttributeNotFound) => 0,
            Err(e) => return Err(e),
        };
        let (created, modified) = match entry.find_attribute(ATTR_STANDARD_INFORMATION) {
            Ok(attr) => {
                let info = attr.resident_data()?;
                if info.len() >= 16 {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&info[0..8]);
                    let created = u64::from_le_bytes(raw);
                    raw.copy_from_slice(&info[8..16]);
                    (nt_to_unix(created), nt_to_unix(u64::from_le_bytes(raw)))
                } else {
                    (0, 0)
                }
            }
            Err(FsError::AttributeNotFound) => (0, 0),
            Err(e) => return Err(e),
        };

        Ok(InodeMetadata {
            inode_no: u32::try_from(index).map_err(|_| FsError::InvalidArgument)?,
            size: u32::try_from(size).map_err(|_| FsError::InvalidEntry)?,
            created,
            modified,
        })
    }
}

impl FileSystem for ForeignVolume {
    fn fs_type(&self) -> &'static str {
        "ntfs"
    }

    fn metadata(&self, name: &str) -> Result<InodeMetadata, FsError> {
        self.stat(name)
    }

    fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        self.read_file(name, buf)
    }
}

/// NTFS 挂载槽
///
/// 同一时间最多挂载一个卷：`Unmounted -> Mounted -> Unmounted`。
#[derive(Default)]
pub struct ForeignMount {
    volume: Option<ForeignVolume>,
}

impl ForeignMount {
    /// 创建未挂载的槽
    pub const fn new() -> Self {
        Self { volume: None }
    }

    /// 是否已挂载
    pub fn is_mounted(&self) -> bool {
        self.volume.is_some()
    }

    /// 挂载 `device`
    ///
    /// 已有卷挂载时返回 [`FsError::Busy`] 并保留现有挂载；失败时保持未挂载状态。
    pub fn mount(&mut self, source: Arc<dyn SectorSource>, device: &str) -> Result<(), FsError> {
        if let Some(current) = &self.volume {
            warn!("ntfs: {} already mounted, refusing {}", current.device(), device);
            return Err(FsError::Busy);
        }
        self.volume = Some(ForeignVolume::mount(source, device)?);
        Ok(())
    }

    /// 卸载当前卷
    pub fn unmount(&mut self) -> Result<(), FsError> {
        let volume = self.volume.take().ok_or(FsError::NotMounted)?;
        debug!("ntfs: unmounted {}", volume.device());
        Ok(())
    }

    /// 当前挂载的卷
    pub fn volume(&self) -> Result<&ForeignVolume, FsError> {
        self.volume.as_ref().ok_or(FsError::NotMounted)
    }

    /// 见 [`ForeignVolume::read_entry`]
    pub fn read_entry(&self, index: u64) -> Result<MetadataEntry, FsError> {
        self.volume()?.read_entry(index)
    }

    /// 见 [`ForeignVolume::read_file`]
    pub fn read_file(&self, path: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        self.volume()?.read_file(path, buf)
    }

    /// 见 [`ForeignVolume::stat`]
    pub fn stat(&self, path: &str) -> Result<InodeMetadata, FsError> {
        self.volume()?.stat(path)
    }
}
