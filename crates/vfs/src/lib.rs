//! 虚拟文件系统契约层
//!
//! 此 crate 定义两个文件系统后端（内存中的 ARFS 与只读的 NTFS 解析器）共享的契约：
//!
//! - [`FsError`] - 错误类型，可转换为 POSIX errno
//! - [`InodeMetadata`] / [`InodeType`] / [`DirEntry`] - 元数据
//! - [`FileSystem`] trait - 按卷内名称读取与查询的后端接口
//! - 名称与 `卷:/名称` 地址解析

#![no_std]

extern crate alloc;

pub mod error;

mod file_system;
mod inode;
mod path;

// Re-export error
pub use error::FsError;

// Re-export inode
pub use inode::{DirEntry, InodeMetadata, InodeType};

// Re-export file_system
pub use file_system::FileSystem;

// Re-export path
pub use path::{normalize_name, split_volume_path, validate_name};
