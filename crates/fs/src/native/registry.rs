//! ARFS 卷注册表

use alloc::vec::Vec;

use log::debug;
use vfs::{DirEntry, FsError, InodeMetadata};

use super::entry::{OpenDirectory, OpenFile};
use super::volume::NativeVolume;
use crate::config::MAX_NATIVE_VOLUMES;
use crate::owned_name;

/// 卷名不能为空，也不能包含 `:` 或 `/`（会与 `卷:/名称` 地址冲突）
fn validate_volume_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name.bytes().any(|b| b == b':' || b == b'/' || b == 0) {
        return Err(FsError::InvalidArgument);
    }
    Ok(())
}

/// 固定容量的 ARFS 卷表
///
/// 卷名唯一；按 `(卷名, 条目名)` 访问的操作在卷不存在时返回 [`FsError::NotFound`]。
pub struct NativeRegistry {
    volumes: Vec<NativeVolume>,
    capacity: usize,
}

impl NativeRegistry {
    /// 创建容量为 [`MAX_NATIVE_VOLUMES`] 的空注册表
    pub const fn new() -> Self {
        Self::with_capacity(MAX_NATIVE_VOLUMES)
    }

    /// 创建指定容量的空注册表
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            volumes: Vec::new(),
            capacity,
        }
    }

    /// 清空所有卷，可重复调用
    ///
    /// 被清掉的卷上仍存活的打开句柄保持有效，只是不再能通过注册表访问。
    pub fn init(&mut self) {
        self.volumes.clear();
    }

    /// 容量上限
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 已注册卷数
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// 是否没有任何卷
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// 注册一个空卷
    pub fn add_volume(&mut self, name: &str) -> Result<(), FsError> {
        if self.volumes.len() >= self.capacity {
            return Err(FsError::CapacityExceeded);
        }
        validate_volume_name(name)?;
        if self.find_volume(name).is_ok() {
            return Err(FsError::AlreadyExists);
        }
        let owned = owned_name(name)?;
        self.volumes
            .try_reserve(1)
            .map_err(|_| FsError::AllocationFailure)?;
        self.volumes.push(NativeVolume::new(owned));
        debug!("arfs: added volume {}", name);
        Ok(())
    }

    /// 注销卷，卷上有打开的条目时返回 [`FsError::Busy`]
    pub fn remove_volume(&mut self, name: &str) -> Result<(), FsError> {
        let pos = self
            .volumes
            .iter()
            .position(|v| v.name() == name)
            .ok_or(FsError::NotFound)?;
        if self.volumes[pos].has_open_entries() {
            return Err(FsError::Busy);
        }
        self.volumes.remove(pos);
        debug!("arfs: removed volume {}", name);
        Ok(())
    }

    /// 按名称查找卷
    pub fn find_volume(&self, name: &str) -> Result<&NativeVolume, FsError> {
        self.volumes
            .iter()
            .find(|v| v.name() == name)
            .ok_or(FsError::NotFound)
    }

    /// 按名称查找卷（可变）
    pub fn find_volume_mut(&mut self, name: &str) -> Result<&mut NativeVolume, FsError> {
        self.volumes
            .iter_mut()
            .find(|v| v.name() == name)
            .ok_or(FsError::NotFound)
    }

    /// 所有卷，按注册顺序
    pub fn volumes(&self) -> impl Iterator<Item = &NativeVolume> {
        self.volumes.iter()
    }

    /// 见 [`NativeVolume::create_file`]
    pub fn create_file(&mut self, volume: &str, name: &str) -> Result<u32, FsError> {
        self.find_volume_mut(volume)?.create_file(name)
    }

    /// 见 [`NativeVolume::delete_file`]
    pub fn delete_file(&mut self, volume: &str, name: &str) -> Result<(), FsError> {
        self.find_volume_mut(volume)?.delete_file(name)
    }

    /// 见 [`NativeVolume::open_file`]
    pub fn open_file(&self, volume: &str, name: &str) -> Result<OpenFile, FsError> {
        self.find_volume(volume)?.open_file(name)
    }

    /// 见 [`NativeVolume::create_directory`]
    pub fn create_directory(&mut self, volume: &str, name: &str) -> Result<u32, FsError> {
        self.find_volume_mut(volume)?.create_directory(name)
    }

    /// 见 [`NativeVolume::delete_directory`]
    pub fn delete_directory(&mut self, volume: &str, name: &str) -> Result<(), FsError> {
        self.find_volume_mut(volume)?.delete_directory(name)
    }

    /// 见 [`NativeVolume::open_directory`]
    pub fn open_directory(&self, volume: &str, name: &str) -> Result<OpenDirectory, FsError> {
        self.find_volume(volume)?.open_directory(name)
    }

    /// 见 [`NativeVolume::link_child`]
    pub fn link_child(&mut self, volume: &str, directory: &str, child: &str) -> Result<(), FsError> {
        self.find_volume_mut(volume)?.link_child(directory, child)
    }

    /// 见 [`NativeVolume::unlink_child`]
    pub fn unlink_child(
        &mut self,
        volume: &str,
        directory: &str,
        child: &str,
    ) -> Result<(), FsError> {
        self.find_volume_mut(volume)?.unlink_child(directory, child)
    }

    /// 列出目录的子条目；卷或目录不存在时返回空列表
    pub fn list_directory(&self, volume: &str, name: &str) -> Result<Vec<DirEntry>, FsError> {
        match self
            .find_volume(volume)
            .and_then(|v| v.list_directory(name))
        {
            Err(FsError::NotFound) => Ok(Vec::new()),
            other => other,
        }
    }

    /// 见 [`NativeVolume::list_volume`]
    pub fn list_volume(&self, volume: &str) -> Result<Vec<DirEntry>, FsError> {
        self.find_volume(volume)?.list_volume()
    }

    /// 见 [`NativeVolume::get_metadata`]
    pub fn get_metadata(&self, volume: &str, name: &str) -> Result<InodeMetadata, FsError> {
        self.find_volume(volume)?.get_metadata(name)
    }

    /// 见 [`NativeVolume::update_metadata`]
    pub fn update_metadata(
        &mut self,
        volume: &str,
        name: &str,
        inode: InodeMetadata,
    ) -> Result<(), FsError> {
        self.find_volume_mut(volume)?.update_metadata(name, inode)
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::init_test_ops;

    #[test]
    fn test_capacity_ceiling() {
        let mut reg = NativeRegistry::with_capacity(2);
        reg.add_volume("a").unwrap();
        reg.add_volume("b").unwrap();
        assert_eq!(reg.add_volume("c"), Err(FsError::CapacityExceeded));
        assert_eq!(reg.len(), 2);
        assert_eq!(NativeRegistry::new().capacity(), MAX_NATIVE_VOLUMES);
    }

    #[test]
    fn test_volume_names() {
        let mut reg = NativeRegistry::new();
        reg.add_volume("disk0").unwrap();
        assert_eq!(reg.add_volume("disk0"), Err(FsError::AlreadyExists));
        assert_eq!(reg.add_volume(""), Err(FsError::InvalidArgument));
        assert_eq!(reg.add_volume("c:"), Err(FsError::InvalidArgument));
        assert_eq!(reg.find_volume("disk0").map(|v| v.name()), Ok("disk0"));
        assert!(matches!(reg.find_volume("disk1"), Err(FsError::NotFound)));
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut reg = NativeRegistry::new();
        reg.add_volume("disk0").unwrap();
        reg.init();
        reg.init();
        assert!(reg.is_empty());
        reg.add_volume("disk0").unwrap();
        assert_eq!(reg.find_volume("disk0").unwrap().next_inode_no(), 1);
    }

    #[test]
    fn test_missing_volume() {
        init_test_ops();
        let mut reg = NativeRegistry::new();
        assert_eq!(reg.create_file("nope", "a"), Err(FsError::NotFound));
        assert_eq!(reg.delete_directory("nope", "a"), Err(FsError::NotFound));
        assert_eq!(reg.get_metadata("nope", "a"), Err(FsError::NotFound));
        assert!(reg.open_file("nope", "a").is_err());
        assert_eq!(reg.list_directory("nope", "d"), Ok(Vec::new()));
    }

    #[test]
    fn test_remove_volume() {
        init_test_ops();
        let mut reg = NativeRegistry::new();
        reg.add_volume("disk0").unwrap();
        reg.create_file("disk0", "a").unwrap();

        let handle = reg.open_file("disk0", "a").unwrap();
        assert_eq!(reg.remove_volume("disk0"), Err(FsError::Busy));
        drop(handle);
        assert_eq!(reg.remove_volume("disk0"), Ok(()));
        assert_eq!(reg.remove_volume("disk0"), Err(FsError::NotFound));
    }

    #[test]
    fn test_volumes_are_independent() {
        init_test_ops();
        let mut reg = NativeRegistry::new();
        reg.add_volume("a").unwrap();
        reg.add_volume("b").unwrap();
        assert_eq!(reg.create_file("a", "x"), Ok(1));
        assert_eq!(reg.create_file("b", "x"), Ok(1));
        assert_eq!(reg.create_file("b", "y"), Ok(2));
        assert_eq!(reg.find_volume("a").unwrap().next_inode_no(), 2);

        let names: Vec<&str> = reg.volumes().map(|v| v.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
