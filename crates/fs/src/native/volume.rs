//! ARFS 卷
//!
//! 每个卷有一个扁平的名称空间：文件和目录按名称精确匹配，互不冲突。
//! 条目存放在以 inode 编号为键的表中，另有名称到 inode 编号的索引。
//! inode 编号单调递增且从不回收，因此编号顺序就是创建顺序。

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use log::debug;
use vfs::{normalize_name, validate_name, DirEntry, FileSystem, FsError, InodeMetadata, InodeType};

use super::entry::{NativeDirectory, NativeFile, OpenDirectory, OpenFile};
use crate::config::FIRST_INODE_NO;
use crate::owned_name;

/// ARFS 卷
pub struct NativeVolume {
    name: String,
    files: BTreeMap<u32, Arc<NativeFile>>,
    directories: BTreeMap<u32, Arc<NativeDirectory>>,
    file_index: BTreeMap<String, u32>,
    dir_index: BTreeMap<String, u32>,
    next_inode_no: u32,
}

impl NativeVolume {
    pub(super) fn new(name: String) -> Self {
        Self {
            name,
            files: BTreeMap::new(),
            directories: BTreeMap::new(),
            file_index: BTreeMap::new(),
            dir_index: BTreeMap::new(),
            next_inode_no: FIRST_INODE_NO,
        }
    }

    /// 卷名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 下一个将被分配的 inode 编号
    pub fn next_inode_no(&self) -> u32 {
        self.next_inode_no
    }

    fn alloc_inode_no(&mut self) -> Result<u32, FsError> {
        let ino = self.next_inode_no;
        self.next_inode_no = ino.checked_add(1).ok_or(FsError::CapacityExceeded)?;
        Ok(ino)
    }

    // ========== 文件 ==========

    /// 创建空文件，返回新文件的 inode 编号
    pub fn create_file(&mut self, name: &str) -> Result<u32, FsError> {
        validate_name(name)?;
        if self.file_index.contains_key(name) {
            return Err(FsError::AlreadyExists);
        }
        let index_key = owned_name(name)?;
        let entry_name = owned_name(name)?;
        let ino = self.alloc_inode_no()?;

        self.files
            .insert(ino, Arc::new(NativeFile::new(entry_name, ino)));
        self.file_index.insert(index_key, ino);
        debug!("arfs: {}: created file {} (ino {})", self.name, name, ino);
        Ok(ino)
    }

    /// 删除文件，文件被打开时返回 [`FsError::Busy`]
    pub fn delete_file(&mut self, name: &str) -> Result<(), FsError> {
        let ino = *self.file_index.get(name).ok_or(FsError::NotFound)?;
        if self.files.get(&ino).is_some_and(|f| f.is_busy()) {
            return Err(FsError::Busy);
        }
        self.file_index.remove(name);
        self.files.remove(&ino);
        self.detach(ino);
        debug!("arfs: {}: deleted file {} (ino {})", self.name, name, ino);
        Ok(())
    }

    /// 打开文件
    ///
    /// 不阻止重复打开；返回的句柄存活期间文件不可删除，元数据不可覆盖。
    pub fn open_file(&self, name: &str) -> Result<OpenFile, FsError> {
        self.file(name).map(OpenFile::new)
    }

    fn file(&self, name: &str) -> Result<Arc<NativeFile>, FsError> {
        self.file_index
            .get(name)
            .and_then(|ino| self.files.get(ino))
            .cloned()
            .ok_or(FsError::NotFound)
    }

    /// 所有文件，最近创建的在前
    pub fn files(&self) -> impl Iterator<Item = &Arc<NativeFile>> {
        self.files.values().rev()
    }

    /// 文件名列表，最近创建的在前
    pub fn file_names(&self) -> Vec<&str> {
        self.files().map(|f| f.name()).collect()
    }

    // ========== 目录 ==========

    /// 创建空目录，返回新目录的 inode 编号
    pub fn create_directory(&mut self, name: &str) -> Result<u32, FsError> {
        validate_name(name)?;
        if self.dir_index.contains_key(name) {
            return Err(FsError::AlreadyExists);
        }
        let index_key = owned_name(name)?;
        let entry_name = owned_name(name)?;
        let ino = self.alloc_inode_no()?;

        self.directories
            .insert(ino, Arc::new(NativeDirectory::new(entry_name, ino)));
        self.dir_index.insert(index_key, ino);
        debug!("arfs: {}: created directory {} (ino {})", self.name, name, ino);
        Ok(ino)
    }

    /// 删除目录，目录被打开时返回 [`FsError::Busy`]
    ///
    /// 子条目本身不受影响，只是不再挂在这个目录下。
    pub fn delete_directory(&mut self, name: &str) -> Result<(), FsError> {
        let ino = *self.dir_index.get(name).ok_or(FsError::NotFound)?;
        if self.directories.get(&ino).is_some_and(|d| d.is_busy()) {
            return Err(FsError::Busy);
        }
        self.dir_index.remove(name);
        self.directories.remove(&ino);
        self.detach(ino);
        debug!("arfs: {}: deleted directory {} (ino {})", self.name, name, ino);
        Ok(())
    }

    /// 打开目录
    pub fn open_directory(&self, name: &str) -> Result<OpenDirectory, FsError> {
        self.directory(name).map(OpenDirectory::new)
    }

    fn directory(&self, name: &str) -> Result<Arc<NativeDirectory>, FsError> {
        self.dir_index
            .get(name)
            .and_then(|ino| self.directories.get(ino))
            .cloned()
            .ok_or(FsError::NotFound)
    }

    /// 所有目录，最近创建的在前
    pub fn directories(&self) -> impl Iterator<Item = &Arc<NativeDirectory>> {
        self.directories.values().rev()
    }

    /// 将已有条目挂到目录下，`child` 先按文件名查找，再按目录名查找
    pub fn link_child(&mut self, directory: &str, child: &str) -> Result<(), FsError> {
        let dir_ino = *self.dir_index.get(directory).ok_or(FsError::NotFound)?;
        let dir = self.directory(directory)?;
        let ino = self.lookup_ino(child).ok_or(FsError::NotFound)?;
        // 按表键比较：元数据里的 inode_no 可以被 update_metadata 改写
        if ino == dir_ino {
            return Err(FsError::InvalidArgument);
        }
        dir.link(ino)
    }

    /// 将条目从目录下摘除
    pub fn unlink_child(&mut self, directory: &str, child: &str) -> Result<(), FsError> {
        let dir = self.directory(directory)?;
        let ino = self.lookup_ino(child).ok_or(FsError::NotFound)?;
        if dir.unlink(ino) {
            Ok(())
        } else {
            Err(FsError::NotFound)
        }
    }

    /// 列出目录的子条目，最近挂入的在前
    pub fn list_directory(&self, name: &str) -> Result<Vec<DirEntry>, FsError> {
        let dir = self.directory(name)?;
        let children = dir.children();
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(children.len())
            .map_err(|_| FsError::AllocationFailure)?;
        for ino in children {
            if let Some(entry) = self.dir_entry(ino)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// 列出卷上所有条目：先文件后目录，各自最近创建的在前
    pub fn list_volume(&self) -> Result<Vec<DirEntry>, FsError> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(self.files.len() + self.directories.len())
            .map_err(|_| FsError::AllocationFailure)?;
        for f in self.files() {
            entries.push(DirEntry {
                name: owned_name(f.name())?,
                inode_type: InodeType::File,
                inode: f.inode(),
            });
        }
        for d in self.directories() {
            entries.push(DirEntry {
                name: owned_name(d.name())?,
                inode_type: InodeType::Directory,
                inode: d.inode(),
            });
        }
        Ok(entries)
    }

    fn dir_entry(&self, ino: u32) -> Result<Option<DirEntry>, FsError> {
        if let Some(f) = self.files.get(&ino) {
            return Ok(Some(DirEntry {
                name: owned_name(f.name())?,
                inode_type: InodeType::File,
                inode: f.inode(),
            }));
        }
        if let Some(d) = self.directories.get(&ino) {
            return Ok(Some(DirEntry {
                name: owned_name(d.name())?,
                inode_type: InodeType::Directory,
                inode: d.inode(),
            }));
        }
        Ok(None)
    }

    fn lookup_ino(&self, name: &str) -> Option<u32> {
        self.file_index
            .get(name)
            .or_else(|| self.dir_index.get(name))
            .copied()
    }

    /// 从所有目录的子条目中摘除 `ino`
    fn detach(&self, ino: u32) {
        for dir in self.directories.values() {
            dir.unlink(ino);
        }
    }

    // ========== 元数据 ==========

    /// 获取元数据，先查文件再查目录
    pub fn get_metadata(&self, name: &str) -> Result<InodeMetadata, FsError> {
        if let Ok(f) = self.file(name) {
            return Ok(f.inode());
        }
        self.directory(name).map(|d| d.inode())
    }

    /// 整体覆盖元数据（包括 inode 编号），先查文件再查目录
    ///
    /// 匹配到的条目被打开时返回 [`FsError::Busy`]。
    pub fn update_metadata(&mut self, name: &str, inode: InodeMetadata) -> Result<(), FsError> {
        if let Ok(f) = self.file(name) {
            return f.set_inode(inode);
        }
        self.directory(name)?.set_inode(inode)
    }

    /// 是否有任何条目处于打开状态
    pub fn has_open_entries(&self) -> bool {
        self.files.values().any(|f| f.is_busy()) || self.directories.values().any(|d| d.is_busy())
    }
}

impl FileSystem for NativeVolume {
    fn fs_type(&self) -> &'static str {
        "arfs"
    }

    fn metadata(&self, name: &str) -> Result<InodeMetadata, FsError> {
        self.get_metadata(normalize_name(name)?)
    }

    fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        let file = self.open_file(normalize_name(name)?)?;
        Ok(file.read(buf))
    }
}
