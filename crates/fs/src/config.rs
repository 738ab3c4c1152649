//! 文件系统核心配置常量

/// ARFS 注册表默认可容纳的卷数上限
pub const MAX_NATIVE_VOLUMES: usize = 1024;

/// 每个卷分配的第一个 inode 编号
pub const FIRST_INODE_NO: u32 = 1;

/// NTFS 元数据表（MFT）每个表项的字节数
pub const ENTRY_SIZE: usize = 1024;

/// 路径解析尚未实现时使用的固定表项编号
pub const ROOT_ENTRY: u64 = 0;

/// `$STANDARD_INFORMATION` 属性类型
pub const ATTR_STANDARD_INFORMATION: u32 = 0x10;

/// `$FILE_NAME` 属性类型
pub const ATTR_FILE_NAME: u32 = 0x30;

/// `$DATA` 属性类型
pub const ATTR_DATA: u32 = 0x80;

/// 属性链结束标记
pub const ATTR_END: u32 = 0xFFFF_FFFF;
