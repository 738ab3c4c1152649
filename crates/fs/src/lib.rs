//! # 文件系统核心 (FS)
//!
//! 本 crate 提供两个文件系统后端，均实现 VFS 的 [`vfs::FileSystem`] trait：
//!
//! - **[native]**: ARFS，纯内存的原生文件系统，支持创建、删除、打开、读写文件和目录
//! - **[foreign]**: 只读 NTFS 解析器，读取引导扇区、元数据表项和常驻属性
//!
//! [`FsContext`] 持有两个后端，把 `卷:/名称` 地址路由到对应的卷。
//! 运行时依赖（时钟）通过 [`ops`] 模块注册。

#![no_std]

extern crate alloc;

use alloc::string::String;

use vfs::FsError;

pub mod config;
pub mod context;
pub mod foreign;
pub mod native;
pub mod ops;

pub use context::FsContext;
pub use foreign::{ForeignMount, ForeignVolume, MetadataEntry};
pub use native::{NativeRegistry, NativeVolume, OpenDirectory, OpenFile};
pub use ops::{fs_ops, register_fs_ops, FsOps};

/// 复制名称，分配失败时返回 [`FsError::AllocationFailure`]
pub(crate) fn owned_name(name: &str) -> Result<String, FsError> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(name.len())
        .map_err(|_| FsError::AllocationFailure)?;
    owned.push_str(name);
    Ok(owned)
}
