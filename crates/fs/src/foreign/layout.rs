//! NTFS 磁盘结构解析
//!
//! 所有结构都是紧凑排列的小端字段，这里按固定偏移逐字段读取，
//! 不把磁盘字节直接转换为结构体指针。

use alloc::vec::Vec;

use device::SECTOR_SIZE;
use log::warn;
use vfs::FsError;

use crate::config::{ATTR_END, ENTRY_SIZE};

/// 引导扇区结束标记
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// 引导扇区中的 OEM 标识
pub const OEM_ID: [u8; 8] = *b"NTFS    ";

/// 元数据表项签名 `"FILE"`（小端）
pub const ENTRY_SIGNATURE: u32 = 0x454C_4946;

/// 元数据表项固定头部长度
pub const ENTRY_HEADER_SIZE: usize = 42;

/// 属性固定头部长度
pub const ATTRIBUTE_HEADER_SIZE: usize = 16;

/// 引导代码区长度
pub const BOOTSTRAP_SIZE: usize = 426;

fn u16_at(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn u32_at(b: &[u8], off: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&b[off..off + 4]);
    u32::from_le_bytes(raw)
}

fn u64_at(b: &[u8], off: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&b[off..off + 8]);
    u64::from_le_bytes(raw)
}

fn array_at<const N: usize>(b: &[u8], off: usize) -> [u8; N] {
    let mut raw = [0u8; N];
    raw.copy_from_slice(&b[off..off + N]);
    raw
}

// ========== 引导扇区 ==========

/// NTFS 引导扇区（512 字节）
///
/// 保留全部字段，[`BootSector::to_bytes`] 可以逐字节写回。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootSector {
    /// 跳转指令
    pub jump: [u8; 3],
    /// OEM 标识，正常为 `"NTFS    "`
    pub oem_id: [u8; 8],
    /// 每扇区字节数
    pub bytes_per_sector: u16,
    /// 每簇扇区数
    pub sectors_per_cluster: u8,
    /// 保留扇区数
    pub reserved_sectors: u16,
    /// 恒为 0
    pub zeroes1: [u8; 3],
    /// 未使用
    pub not_used1: u16,
    /// 介质描述符
    pub media_descriptor: u8,
    /// 恒为 0
    pub zeroes2: u16,
    /// 每磁道扇区数
    pub sectors_per_track: u16,
    /// 磁头数
    pub number_of_heads: u16,
    /// 隐藏扇区数
    pub hidden_sectors: u32,
    /// 未使用
    pub not_used2: u32,
    /// 未使用
    pub not_used3: u32,
    /// 卷总扇区数
    pub total_sectors: u64,
    /// 元数据表起始簇号
    pub mft_cluster: u64,
    /// 元数据表镜像起始簇号
    pub mft_mirror_cluster: u64,
    /// 每个表项占用的簇数（负数表示 2^-n 字节）
    pub clusters_per_file_record: i8,
    /// 未使用
    pub not_used4: [u8; 3],
    /// 每个索引记录占用的簇数
    pub clusters_per_index_record: i8,
    /// 未使用
    pub not_used5: [u8; 3],
    /// 卷序列号
    pub volume_serial_number: u64,
    /// 校验和
    pub checksum: u32,
    /// 引导代码
    pub bootstrap: [u8; BOOTSTRAP_SIZE],
    /// 必须等于 [`BOOT_SIGNATURE`]
    pub end_of_sector_marker: u16,
}

impl BootSector {
    /// 从扇区字节解析，不做校验
    pub fn parse(b: &[u8; SECTOR_SIZE]) -> Self {
        Self {
            jump: array_at(b, 0),
            oem_id: array_at(b, 3),
            bytes_per_sector: u16_at(b, 11),
            sectors_per_cluster: b[13],
            reserved_sectors: u16_at(b, 14),
            zeroes1: array_at(b, 16),
            not_used1: u16_at(b, 19),
            media_descriptor: b[21],
            zeroes2: u16_at(b, 22),
            sectors_per_track: u16_at(b, 24),
            number_of_heads: u16_at(b, 26),
            hidden_sectors: u32_at(b, 28),
            not_used2: u32_at(b, 32),
            not_used3: u32_at(b, 36),
            total_sectors: u64_at(b, 40),
            mft_cluster: u64_at(b, 48),
            mft_mirror_cluster: u64_at(b, 56),
            clusters_per_file_record: b[64] as i8,
            not_used4: array_at(b, 65),
            clusters_per_index_record: b[68] as i8,
            not_used5: array_at(b, 69),
            volume_serial_number: u64_at(b, 72),
            checksum: u32_at(b, 80),
            bootstrap: array_at(b, 84),
            end_of_sector_marker: u16_at(b, 510),
        }
    }

    /// 序列化为扇区字节
    pub fn to_bytes(&self) -> [u8; SECTOR_SIZE] {
        let mut b = [0u8; SECTOR_SIZE];
        b[0..3].copy_from_slice(&self.jump);
        b[3..11].copy_from_slice(&self.oem_id);
        b[11..13].copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        b[13] = self.sectors_per_cluster;
        b[14..16].copy_from_slice(&self.reserved_sectors.to_le_bytes());
        b[16..19].copy_from_slice(&self.zeroes1);
        b[19..21].copy_from_slice(&self.not_used1.to_le_bytes());
        b[21] = self.media_descriptor;
        b[22..24].copy_from_slice(&self.zeroes2.to_le_bytes());
        b[24..26].copy_from_slice(&self.sectors_per_track.to_le_bytes());
        b[26..28].copy_from_slice(&self.number_of_heads.to_le_bytes());
        b[28..32].copy_from_slice(&self.hidden_sectors.to_le_bytes());
        b[32..36].copy_from_slice(&self.not_used2.to_le_bytes());
        b[36..40].copy_from_slice(&self.not_used3.to_le_bytes());
        b[40..48].copy_from_slice(&self.total_sectors.to_le_bytes());
        b[48..56].copy_from_slice(&self.mft_cluster.to_le_bytes());
        b[56..64].copy_from_slice(&self.mft_mirror_cluster.to_le_bytes());
        b[64] = self.clusters_per_file_record as u8;
        b[65..68].copy_from_slice(&self.not_used4);
        b[68] = self.clusters_per_index_record as u8;
        b[69..72].copy_from_slice(&self.not_used5);
        b[72..80].copy_from_slice(&self.volume_serial_number.to_le_bytes());
        b[80..84].copy_from_slice(&self.checksum.to_le_bytes());
        b[84..510].copy_from_slice(&self.bootstrap);
        b[510..512].copy_from_slice(&self.end_of_sector_marker.to_le_bytes());
        b
    }

    /// 结束标记是否有效
    pub fn is_valid(&self) -> bool {
        self.end_of_sector_marker == BOOT_SIGNATURE
    }

    /// 元数据表起始扇区（簇号 × 每簇扇区数），溢出时返回 None
    pub fn mft_start_sector(&self) -> Option<u64> {
        self.mft_cluster
            .checked_mul(u64::from(self.sectors_per_cluster))
    }
}

impl Default for BootSector {
    fn default() -> Self {
        Self::parse(&[0u8; SECTOR_SIZE])
    }
}

// ========== 元数据表项 ==========

bitflags::bitflags! {
    /// 元数据表项标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryFlags: u16 {
        /// 表项正在使用
        const IN_USE    = 0x0001;
        /// 表项描述一个目录
        const DIRECTORY = 0x0002;
    }
}

/// 元数据表项（MFT entry）
///
/// 持有整个表项的字节；属性以借用方式返回，生命周期不超过表项本身。
#[derive(Debug, Clone)]
pub struct MetadataEntry {
    index: u64,
    bytes: Vec<u8>,
}

impl MetadataEntry {
    /// 解析表项并应用更新序列
    ///
    /// 长度不足、签名不符或更新序列校验失败时返回 [`FsError::InvalidEntry`]。
    pub fn parse(index: u64, mut bytes: Vec<u8>) -> Result<Self, FsError> {
        if bytes.len() < ENTRY_HEADER_SIZE {
            warn!("ntfs: entry {}: truncated ({} bytes)", index, bytes.len());
            return Err(FsError::InvalidEntry);
        }
        let signature = u32_at(&bytes, 0);
        if signature != ENTRY_SIGNATURE {
            warn!("ntfs: entry {}: bad signature {:#010x}", index, signature);
            return Err(FsError::InvalidEntry);
        }
        apply_fixups(index, &mut bytes)?;
        Ok(Self { index, bytes })
    }

    /// 表项编号
    pub fn index(&self) -> u64 {
        self.index
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 签名
    pub fn signature(&self) -> u32 {
        u32_at(&self.bytes, 0)
    }

    /// 更新序列数组偏移
    pub fn fixup_offset(&self) -> u16 {
        u16_at(&self.bytes, 4)
    }

    /// 更新序列数组项数
    pub fn fixup_count(&self) -> u16 {
        u16_at(&self.bytes, 6)
    }

    /// 日志序列号
    pub fn log_sequence_number(&self) -> u64 {
        u64_at(&self.bytes, 8)
    }

    /// 序列号
    pub fn sequence_number(&self) -> u16 {
        u16_at(&self.bytes, 16)
    }

    /// 硬链接数
    pub fn link_count(&self) -> u16 {
        u16_at(&self.bytes, 18)
    }

    /// 第一个属性相对表项起始的偏移
    pub fn first_attribute_offset(&self) -> u16 {
        u16_at(&self.bytes, 20)
    }

    /// 标志位，未知位被丢弃
    pub fn flags(&self) -> EntryFlags {
        EntryFlags::from_bits_truncate(u16_at(&self.bytes, 22))
    }

    /// 已使用字节数，属性扫描不会越过此边界
    pub fn used_size(&self) -> u32 {
        u32_at(&self.bytes, 24)
    }

    /// 分配字节数
    pub fn allocated_size(&self) -> u32 {
        u32_at(&self.bytes, 28)
    }

    /// 基本记录引用
    pub fn base_record(&self) -> u64 {
        u64_at(&self.bytes, 32)
    }

    /// 下一个属性 ID
    pub fn next_attribute_id(&self) -> u16 {
        u16_at(&self.bytes, 40)
    }

    /// 是否在用
    pub fn is_in_use(&self) -> bool {
        self.flags().contains(EntryFlags::IN_USE)
    }

    /// 是否为目录
    pub fn is_directory(&self) -> bool {
        self.flags().contains(EntryFlags::DIRECTORY)
    }

    /// 遍历属性
    ///
    /// 扫描范围是 `[first_attribute_offset, used_size)`。`used_size` 超出表项、
    /// 或第一个属性落在固定头部内时返回 [`FsError::InvalidEntry`]。
    pub fn attributes(&self) -> Result<Attributes<'_>, FsError> {
        let used = self.used_size() as usize;
        let first = self.first_attribute_offset() as usize;
        if used > self.bytes.len() || first < ENTRY_HEADER_SIZE || first > used {
            warn!(
                "ntfs: entry {}: bad bounds (first {}, used {}, len {})",
                self.index,
                first,
                used,
                self.bytes.len()
            );
            return Err(FsError::InvalidEntry);
        }
        Ok(Attributes {
            area: &self.bytes[..used],
            offset: first,
            done: false,
        })
    }

    /// 查找第一个指定类型的属性
    pub fn find_attribute(&self, type_code: u32) -> Result<Attribute<'_>, FsError> {
        for attr in self.attributes()? {
            let attr = attr?;
            if attr.type_code() == type_code {
                return Ok(attr);
            }
        }
        Err(FsError::AttributeNotFound)
    }
}

/// 应用更新序列（fixup）
///
/// 磁盘上每个扇区的最后两个字节被替换成了更新序列号（USN），
/// 原值保存在更新序列数组中：数组第 0 项是 USN，第 i 项是第 i 个扇区的原值。
/// 项数为 0 表示表项没有更新序列。
fn apply_fixups(index: u64, bytes: &mut [u8]) -> Result<(), FsError> {
    let offset = u16_at(bytes, 4) as usize;
    let count = u16_at(bytes, 6) as usize;
    if count == 0 {
        return Ok(());
    }

    let sectors = count - 1;
    if offset + count * 2 > bytes.len() || sectors * SECTOR_SIZE > bytes.len() {
        warn!(
            "ntfs: entry {}: update sequence out of range (offset {}, count {})",
            index, offset, count
        );
        return Err(FsError::InvalidEntry);
    }

    let usn = u16_at(bytes, offset);
    for i in 1..count {
        let tail = i * SECTOR_SIZE - 2;
        if u16_at(bytes, tail) != usn {
            warn!("ntfs: entry {}: update sequence mismatch in sector {}", index, i);
            return Err(FsError::InvalidEntry);
        }
        let saved = offset + i * 2;
        bytes[tail] = bytes[saved];
        bytes[tail + 1] = bytes[saved + 1];
    }
    Ok(())
}

/// 有界属性迭代器
///
/// 每一步按属性自身声明的长度前进。遇到结束标记停止；头部被截断、
/// 长度小于属性头部或越过 `used_size` 时产出一次 [`FsError::InvalidEntry`] 后停止。
pub struct Attributes<'a> {
    area: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Attributes<'a> {
    fn fail(&mut self, reason: &str) -> Option<Result<Attribute<'a>, FsError>> {
        warn!("ntfs: malformed attribute at {:#x}: {}", self.offset, reason);
        self.done = true;
        Some(Err(FsError::InvalidEntry))
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = Result<Attribute<'a>, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.area.len() {
            return None;
        }
        let rest = &self.area[self.offset..];
        if rest.len() >= 4 && u32_at(rest, 0) == ATTR_END {
            self.done = true;
            return None;
        }
        if rest.len() < ATTRIBUTE_HEADER_SIZE {
            return self.fail("truncated header");
        }
        let length = u32_at(rest, 4) as usize;
        if length < ATTRIBUTE_HEADER_SIZE {
            return self.fail("length too small");
        }
        if length > rest.len() {
            return self.fail("crosses used size");
        }
        self.offset += length;
        Some(Ok(Attribute {
            bytes: &rest[..length],
        }))
    }
}

/// 借用自表项的单个属性
#[derive(Debug, Clone, Copy)]
pub struct Attribute<'a> {
    bytes: &'a [u8],
}

impl<'a> Attribute<'a> {
    /// 属性类型
    pub fn type_code(&self) -> u32 {
        u32_at(self.bytes, 0)
    }

    /// 声明的总长度（含头部）
    pub fn length(&self) -> u32 {
        u32_at(self.bytes, 4)
    }

    /// 是否为非常驻属性
    pub fn is_non_resident(&self) -> bool {
        self.bytes[8] != 0
    }

    /// 名称长度（UTF-16 字符数）
    pub fn name_length(&self) -> u8 {
        self.bytes[9]
    }

    /// 名称偏移，同时也是常驻数据的起始偏移
    pub fn name_offset(&self) -> u16 {
        u16_at(self.bytes, 10)
    }

    /// 属性标志
    pub fn flags(&self) -> u16 {
        u16_at(self.bytes, 12)
    }

    /// 属性 ID
    pub fn attribute_id(&self) -> u16 {
        u16_at(self.bytes, 14)
    }

    /// 属性的全部字节（头部加内容）
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// 常驻数据：从 `name_offset` 到属性末尾
    pub fn resident_data(&self) -> Result<&'a [u8], FsError> {
        if self.is_non_resident() {
            return Err(FsError::NonResidentUnsupported);
        }
        let start = self.name_offset() as usize;
        if start > self.bytes.len() {
            return Err(FsError::InvalidEntry);
        }
        Ok(&self.bytes[start..])
    }
}

/// 空的表项缓冲区
pub(super) fn entry_buffer() -> Result<Vec<u8>, FsError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(ENTRY_SIZE)
        .map_err(|_| FsError::AllocationFailure)?;
    buf.resize(ENTRY_SIZE, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ATTR_DATA, ATTR_FILE_NAME, ATTR_STANDARD_INFORMATION};

    const FIRST: usize = 56;

    /// 在 `at` 处写一个常驻属性，数据紧跟在 16 字节头部之后
    fn put_attr(b: &mut [u8], at: usize, type_code: u32, data: &[u8]) -> usize {
        let len = ATTRIBUTE_HEADER_SIZE + data.len();
        b[at..at + 4].copy_from_slice(&type_code.to_le_bytes());
        b[at + 4..at + 8].copy_from_slice(&(len as u32).to_le_bytes());
        b[at + 10..at + 12].copy_from_slice(&(ATTRIBUTE_HEADER_SIZE as u16).to_le_bytes());
        b[at + 16..at + len].copy_from_slice(data);
        at + len
    }

    fn entry_bytes(used: usize) -> Vec<u8> {
        let mut b = alloc::vec![0u8; ENTRY_SIZE];
        b[0..4].copy_from_slice(&ENTRY_SIGNATURE.to_le_bytes());
        b[18..20].copy_from_slice(&1u16.to_le_bytes());
        b[20..22].copy_from_slice(&(FIRST as u16).to_le_bytes());
        b[22..24].copy_from_slice(&0x0003u16.to_le_bytes());
        b[24..28].copy_from_slice(&(used as u32).to_le_bytes());
        b[28..32].copy_from_slice(&(ENTRY_SIZE as u32).to_le_bytes());
        b
    }

    #[test]
    fn test_boot_sector_field_offsets() {
        let mut raw = [0u8; SECTOR_SIZE];
        raw[3..11].copy_from_slice(&OEM_ID);
        raw[11..13].copy_from_slice(&512u16.to_le_bytes());
        raw[13] = 8;
        raw[40..48].copy_from_slice(&4096u64.to_le_bytes());
        raw[48..56].copy_from_slice(&4u64.to_le_bytes());
        raw[64] = 0xF6;
        raw[510..512].copy_from_slice(&BOOT_SIGNATURE.to_le_bytes());

        let boot = BootSector::parse(&raw);
        assert_eq!(boot.oem_id, OEM_ID);
        assert_eq!(boot.bytes_per_sector, 512);
        assert_eq!(boot.sectors_per_cluster, 8);
        assert_eq!(boot.total_sectors, 4096);
        assert_eq!(boot.mft_cluster, 4);
        assert_eq!(boot.clusters_per_file_record, -10);
        assert!(boot.is_valid());
        assert_eq!(boot.mft_start_sector(), Some(32));
        assert_eq!(boot.to_bytes(), raw);
    }

    #[test]
    fn test_boot_sector_defaults() {
        let boot = BootSector::default();
        assert!(!boot.is_valid());
        assert_eq!(boot.to_bytes(), [0u8; SECTOR_SIZE]);

        let overflow = BootSector {
            mft_cluster: u64::MAX,
            sectors_per_cluster: 2,
            ..BootSector::default()
        };
        assert_eq!(overflow.mft_start_sector(), None);
    }

    #[test]
    fn test_entry_header_fields() {
        let entry = MetadataEntry::parse(5, entry_bytes(FIRST)).unwrap();
        assert_eq!(entry.index(), 5);
        assert_eq!(entry.signature(), ENTRY_SIGNATURE);
        assert_eq!(entry.link_count(), 1);
        assert_eq!(entry.first_attribute_offset(), FIRST as u16);
        assert_eq!(entry.used_size(), FIRST as u32);
        assert_eq!(entry.allocated_size(), ENTRY_SIZE as u32);
        assert!(entry.is_in_use());
        assert!(entry.is_directory());
    }

    #[test]
    fn test_entry_rejects_bad_signature() {
        let mut b = entry_bytes(FIRST);
        b[0..4].copy_from_slice(b"BAAD");
        assert!(matches!(MetadataEntry::parse(0, b), Err(FsError::InvalidEntry)));
        assert!(matches!(
            MetadataEntry::parse(0, alloc::vec![0x46; 8]),
            Err(FsError::InvalidEntry)
        ));
    }

    /// 按磁盘格式写入更新序列：把每个扇区末尾两字节存进数组并替换为 USN
    fn protect(b: &mut [u8], usn: u16) {
        const ARRAY: usize = 48;
        let count = ENTRY_SIZE / SECTOR_SIZE + 1;
        b[4..6].copy_from_slice(&(ARRAY as u16).to_le_bytes());
        b[6..8].copy_from_slice(&(count as u16).to_le_bytes());
        b[ARRAY..ARRAY + 2].copy_from_slice(&usn.to_le_bytes());
        for i in 1..count {
            let tail = i * SECTOR_SIZE - 2;
            let saved = ARRAY + i * 2;
            b[saved] = b[tail];
            b[saved + 1] = b[tail + 1];
            b[tail..tail + 2].copy_from_slice(&usn.to_le_bytes());
        }
    }

    #[test]
    fn test_fixups_restore_sector_tails() {
        // $DATA 跨越第一个扇区的末尾
        let payload: Vec<u8> = (0..600u32).map(|i| (i % 241) as u8).collect();
        let mut b = entry_bytes(0);
        let at = put_attr(&mut b, FIRST, ATTR_DATA, &payload);
        b[24..28].copy_from_slice(&(at as u32).to_le_bytes());
        let original = b.clone();
        protect(&mut b, 0x0007);
        assert_ne!(b, original);

        let entry = MetadataEntry::parse(0, b).unwrap();
        let restored = entry.as_bytes();
        assert_eq!(restored[510..512], original[510..512]);
        assert_eq!(restored[ENTRY_SIZE - 2..], original[ENTRY_SIZE - 2..]);
        assert_eq!(entry.fixup_count(), 3);
        let data = entry.find_attribute(ATTR_DATA).unwrap();
        assert_eq!(data.resident_data().unwrap(), &payload[..]);
    }

    #[test]
    fn test_fixup_mismatch_is_invalid() {
        let mut b = entry_bytes(FIRST);
        protect(&mut b, 0x0007);
        // 第二个扇区末尾被改写（写入撕裂）
        b[ENTRY_SIZE - 2] = 0x99;
        assert!(matches!(MetadataEntry::parse(0, b), Err(FsError::InvalidEntry)));
    }

    #[test]
    fn test_fixup_array_out_of_range() {
        let mut b = entry_bytes(FIRST);
        b[4..6].copy_from_slice(&(ENTRY_SIZE as u16 - 2).to_le_bytes());
        b[6..8].copy_from_slice(&3u16.to_le_bytes());
        assert!(matches!(MetadataEntry::parse(0, b), Err(FsError::InvalidEntry)));

        let mut b = entry_bytes(FIRST);
        b[4..6].copy_from_slice(&48u16.to_le_bytes());
        b[6..8].copy_from_slice(&4u16.to_le_bytes());
        assert!(matches!(MetadataEntry::parse(0, b), Err(FsError::InvalidEntry)));
    }

    #[test]
    fn test_find_attribute_walks_chain() {
        let mut b = entry_bytes(0);
        let mut at = put_attr(&mut b, FIRST, ATTR_STANDARD_INFORMATION, &[0; 16]);
        at = put_attr(&mut b, at, ATTR_FILE_NAME, b"name");
        at = put_attr(&mut b, at, ATTR_DATA, b"payload");
        b[24..28].copy_from_slice(&(at as u32).to_le_bytes());

        let entry = MetadataEntry::parse(0, b).unwrap();
        assert_eq!(entry.attributes().unwrap().count(), 3);

        let data = entry.find_attribute(ATTR_DATA).unwrap();
        assert_eq!(data.resident_data(), Ok(&b"payload"[..]));
        assert!(matches!(entry.find_attribute(0x90), Err(FsError::AttributeNotFound)));
    }

    #[test]
    fn test_end_marker_stops_scan() {
        let mut b = entry_bytes(0);
        let at = put_attr(&mut b, FIRST, ATTR_FILE_NAME, b"n");
        b[at..at + 4].copy_from_slice(&ATTR_END.to_le_bytes());
        // 结束标记之后的属性不可见
        put_attr(&mut b, at + 8, ATTR_DATA, b"hidden");
        b[24..28].copy_from_slice(&(ENTRY_SIZE as u32).to_le_bytes());

        let entry = MetadataEntry::parse(0, b).unwrap();
        assert!(matches!(entry.find_attribute(ATTR_DATA), Err(FsError::AttributeNotFound)));
    }

    #[test]
    fn test_zero_length_attribute_fails_fast() {
        let mut b = entry_bytes(FIRST + 64);
        b[FIRST..FIRST + 4].copy_from_slice(&ATTR_FILE_NAME.to_le_bytes());
        // 长度字段保持为 0

        let entry = MetadataEntry::parse(0, b).unwrap();
        let mut iter = entry.attributes().unwrap();
        assert!(matches!(iter.next(), Some(Err(FsError::InvalidEntry))));
        assert!(iter.next().is_none());
        assert!(matches!(entry.find_attribute(ATTR_DATA), Err(FsError::InvalidEntry)));
    }

    #[test]
    fn test_attribute_crossing_used_size() {
        let mut b = entry_bytes(0);
        let at = put_attr(&mut b, FIRST, ATTR_DATA, &[7; 32]);
        b[24..28].copy_from_slice(&((at - 1) as u32).to_le_bytes());

        let entry = MetadataEntry::parse(0, b).unwrap();
        assert!(matches!(entry.find_attribute(ATTR_DATA), Err(FsError::InvalidEntry)));
    }

    #[test]
    fn test_bad_entry_bounds() {
        let entry = MetadataEntry::parse(0, entry_bytes(ENTRY_SIZE + 1)).unwrap();
        assert!(matches!(entry.attributes(), Err(FsError::InvalidEntry)));

        let mut b = entry_bytes(FIRST);
        b[20..22].copy_from_slice(&8u16.to_le_bytes());
        let entry = MetadataEntry::parse(0, b).unwrap();
        assert!(matches!(entry.attributes(), Err(FsError::InvalidEntry)));
    }

    #[test]
    fn test_resident_data_guards() {
        let mut b = entry_bytes(0);
        let at = put_attr(&mut b, FIRST, ATTR_DATA, &[1; 8]);
        b[24..28].copy_from_slice(&(at as u32).to_le_bytes());
        b[FIRST + 8] = 1;
        let entry = MetadataEntry::parse(0, b.clone()).unwrap();
        let attr = entry.find_attribute(ATTR_DATA).unwrap();
        assert!(attr.is_non_resident());
        assert_eq!(attr.resident_data(), Err(FsError::NonResidentUnsupported));

        b[FIRST + 8] = 0;
        b[FIRST + 10..FIRST + 12].copy_from_slice(&100u16.to_le_bytes());
        let entry = MetadataEntry::parse(0, b).unwrap();
        let attr = entry.find_attribute(ATTR_DATA).unwrap();
        assert_eq!(attr.resident_data(), Err(FsError::InvalidEntry));
    }
}
