//! Inode 元数据
//!
//! 文件与目录共享同一种元数据记录。

use alloc::string::String;

/// 文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    /// 普通文件
    File,
    /// 目录
    Directory,
}

/// 文件元数据
///
/// 时间戳为 Unix 秒。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InodeMetadata {
    /// Inode 编号，卷内唯一，从 1 开始顺序分配
    pub inode_no: u32,
    /// 文件大小（字节）
    pub size: u32,
    /// 创建时间
    pub created: u64,
    /// 最后修改时间
    pub modified: u64,
}

impl InodeMetadata {
    /// 创建一个大小为 0、两个时间戳相同的新记录
    pub fn new(inode_no: u32, now: u64) -> Self {
        Self {
            inode_no,
            size: 0,
            created: now,
            modified: now,
        }
    }
}

/// 轻量级目录项（列目录返回）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// 文件名
    pub name: String,
    /// 文件类型
    pub inode_type: InodeType,
    /// 元数据快照
    pub inode: InodeMetadata,
}
