//! 文件系统上下文
//!
//! [`FsContext`] 持有 ARFS 卷表和 NTFS 挂载槽，由宿主显式创建、初始化和拆除，
//! 并把 `卷:/名称` 地址路由到对应的后端。

use log::debug;
use vfs::{split_volume_path, FileSystem, FsError, InodeMetadata};

use crate::foreign::ForeignMount;
use crate::native::NativeRegistry;

/// 两个后端的所有者
#[derive(Default)]
pub struct FsContext {
    native: NativeRegistry,
    foreign: ForeignMount,
}

impl FsContext {
    /// 创建空上下文
    pub const fn new() -> Self {
        Self {
            native: NativeRegistry::new(),
            foreign: ForeignMount::new(),
        }
    }

    /// 重置为初始状态：清空卷表并丢弃已挂载的卷
    pub fn init(&mut self) {
        self.native.init();
        self.foreign = ForeignMount::new();
        debug!("fs: context initialized");
    }

    /// 卸载 NTFS 卷并清空卷表
    pub fn teardown(&mut self) {
        if self.foreign.is_mounted() {
            let _ = self.foreign.unmount();
        }
        self.native.init();
        debug!("fs: context torn down");
    }

    /// ARFS 卷表
    pub fn native(&self) -> &NativeRegistry {
        &self.native
    }

    /// ARFS 卷表（可变）
    pub fn native_mut(&mut self) -> &mut NativeRegistry {
        &mut self.native
    }

    /// NTFS 挂载槽
    pub fn foreign(&self) -> &ForeignMount {
        &self.foreign
    }

    /// NTFS 挂载槽（可变）
    pub fn foreign_mut(&mut self) -> &mut ForeignMount {
        &mut self.foreign
    }

    /// 按卷名选择后端，已挂载的 NTFS 设备名优先
    pub fn backend(&self, volume: &str) -> Result<&dyn FileSystem, FsError> {
        if let Ok(mounted) = self.foreign.volume() {
            if mounted.device() == volume {
                return Ok(mounted);
            }
        }
        let native = self.native.find_volume(volume)?;
        Ok(native)
    }

    /// 读取 `卷:/名称` 指向的文件
    pub fn read(&self, path: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        let (volume, name) = split_volume_path(path)?;
        self.backend(volume)?.read(name, buf)
    }

    /// 获取 `卷:/名称` 指向条目的元数据
    pub fn metadata(&self, path: &str) -> Result<InodeMetadata, FsError> {
        let (volume, name) = split_volume_path(path)?;
        self.backend(volume)?.metadata(name)
    }
}
