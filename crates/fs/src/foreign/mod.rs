//! 只读 NTFS 解析器
//!
//! 通过 [`device::SectorSource`] 读取引导扇区和元数据表项，只支持常驻属性。

mod layout;
mod volume;

pub use layout::{
    Attribute, Attributes, BootSector, EntryFlags, MetadataEntry, ATTRIBUTE_HEADER_SIZE,
    BOOTSTRAP_SIZE, BOOT_SIGNATURE, ENTRY_HEADER_SIZE, ENTRY_SIGNATURE, OEM_ID,
};
pub use volume::{nt_to_unix, ForeignMount, ForeignVolume};
