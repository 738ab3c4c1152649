//! ARFS 条目：文件、目录及其打开句柄
//!
//! 条目以 `Arc` 形式存放在卷的 inode 表中。打开句柄持有同一个 `Arc`
//! 并在打开计数上记一次；句柄被 drop 时计数自动归还。
//! 打开计数非零即视为“忙”，此时卷拒绝删除该条目或改写其元数据。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use sync::SpinLock;
use vfs::{FsError, InodeMetadata};

use crate::ops::fs_ops;

/// 打开计数
#[derive(Debug, Default)]
struct OpenCount(AtomicUsize);

impl OpenCount {
    fn acquire(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

struct FileState {
    inode: InodeMetadata,
    /// 首次写入前为 None
    data: Option<Vec<u8>>,
}

/// ARFS 普通文件
pub struct NativeFile {
    name: String,
    state: SpinLock<FileState>,
    opens: OpenCount,
}

impl NativeFile {
    pub(super) fn new(name: String, inode_no: u32) -> Self {
        let now = fs_ops().timestamp_now();
        Self {
            name,
            state: SpinLock::new(FileState {
                inode: InodeMetadata::new(inode_no, now),
                data: None,
            }),
            opens: OpenCount::default(),
        }
    }

    /// 文件名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 元数据快照
    pub fn inode(&self) -> InodeMetadata {
        self.state.lock().inode
    }

    /// 当前打开次数
    pub fn open_count(&self) -> usize {
        self.opens.get()
    }

    /// 是否处于打开状态
    pub fn is_busy(&self) -> bool {
        self.opens.get() > 0
    }

    /// 整体覆盖元数据，打开状态下返回 [`FsError::Busy`]
    pub(super) fn set_inode(&self, inode: InodeMetadata) -> Result<(), FsError> {
        if self.is_busy() {
            return Err(FsError::Busy);
        }
        self.state.lock().inode = inode;
        Ok(())
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        let state = self.state.lock();
        let data = state.data.as_deref().unwrap_or(&[]);
        // size 可能被 update_metadata 改得比数据长
        let count = buf.len().min(state.inode.size as usize).min(data.len());
        buf[..count].copy_from_slice(&data[..count]);
        count
    }

    fn write(&self, bytes: &[u8]) -> Result<usize, FsError> {
        let size = u32::try_from(bytes.len()).map_err(|_| FsError::InvalidArgument)?;

        // 新缓冲区完整构造好之后才替换旧缓冲区，失败时旧状态保持不变
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len())
            .map_err(|_| FsError::AllocationFailure)?;
        data.extend_from_slice(bytes);

        let now = fs_ops().timestamp_now();
        let mut state = self.state.lock();
        state.data = Some(data);
        state.inode.size = size;
        state.inode.modified = now;
        Ok(bytes.len())
    }
}

/// 已打开文件的句柄
///
/// 持有期间文件处于“忙”状态；drop 或 [`OpenFile::close`] 时释放。
pub struct OpenFile {
    file: Arc<NativeFile>,
}

impl OpenFile {
    pub(super) fn new(file: Arc<NativeFile>) -> Self {
        file.opens.acquire();
        Self { file }
    }

    /// 文件名
    pub fn name(&self) -> &str {
        self.file.name()
    }

    /// 元数据快照
    pub fn metadata(&self) -> InodeMetadata {
        self.file.inode()
    }

    /// 读取至多 `buf.len()` 字节，超过文件大小时截断，返回实际复制的字节数
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.file.read(buf)
    }

    /// 用 `bytes` 整体替换文件内容，返回写入的字节数
    ///
    /// 这是整文件覆盖而不是追加。失败时原内容、大小和时间戳不变。
    pub fn write(&self, bytes: &[u8]) -> Result<usize, FsError> {
        self.file.write(bytes)
    }

    /// 关闭句柄
    pub fn close(self) {}
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        self.file.opens.release();
    }
}

struct DirState {
    inode: InodeMetadata,
    /// 子条目的 inode 编号，最近链接的在前
    children: Vec<u32>,
}

/// ARFS 目录
pub struct NativeDirectory {
    name: String,
    state: SpinLock<DirState>,
    opens: OpenCount,
}

impl NativeDirectory {
    pub(super) fn new(name: String, inode_no: u32) -> Self {
        let now = fs_ops().timestamp_now();
        Self {
            name,
            state: SpinLock::new(DirState {
                inode: InodeMetadata::new(inode_no, now),
                children: Vec::new(),
            }),
            opens: OpenCount::default(),
        }
    }

    /// 目录名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 元数据快照
    pub fn inode(&self) -> InodeMetadata {
        self.state.lock().inode
    }

    /// 当前打开次数
    pub fn open_count(&self) -> usize {
        self.opens.get()
    }

    /// 是否处于打开状态
    pub fn is_busy(&self) -> bool {
        self.opens.get() > 0
    }

    /// 子条目数
    pub fn child_count(&self) -> usize {
        self.state.lock().children.len()
    }

    /// 子条目 inode 编号快照，最近链接的在前
    pub fn children(&self) -> Vec<u32> {
        self.state.lock().children.clone()
    }

    pub(super) fn set_inode(&self, inode: InodeMetadata) -> Result<(), FsError> {
        if self.is_busy() {
            return Err(FsError::Busy);
        }
        self.state.lock().inode = inode;
        Ok(())
    }

    pub(super) fn link(&self, inode_no: u32) -> Result<(), FsError> {
        let now = fs_ops().timestamp_now();
        let mut state = self.state.lock();
        if state.children.contains(&inode_no) {
            return Err(FsError::AlreadyExists);
        }
        state
            .children
            .try_reserve(1)
            .map_err(|_| FsError::AllocationFailure)?;
        state.children.insert(0, inode_no);
        state.inode.modified = now;
        Ok(())
    }

    /// 移除子条目，返回它之前是否存在
    pub(super) fn unlink(&self, inode_no: u32) -> bool {
        let mut state = self.state.lock();
        let before = state.children.len();
        state.children.retain(|&ino| ino != inode_no);
        before != state.children.len()
    }
}

/// 已打开目录的句柄
pub struct OpenDirectory {
    dir: Arc<NativeDirectory>,
}

impl OpenDirectory {
    pub(super) fn new(dir: Arc<NativeDirectory>) -> Self {
        dir.opens.acquire();
        Self { dir }
    }

    /// 目录名
    pub fn name(&self) -> &str {
        self.dir.name()
    }

    /// 元数据快照
    pub fn metadata(&self) -> InodeMetadata {
        self.dir.inode()
    }

    /// 子条目数
    pub fn child_count(&self) -> usize {
        self.dir.child_count()
    }

    /// 关闭句柄
    pub fn close(self) {}
}

impl Drop for OpenDirectory {
    fn drop(&mut self) {
        self.dir.opens.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::init_test_ops;

    fn file(name: &str) -> Arc<NativeFile> {
        init_test_ops();
        Arc::new(NativeFile::new(String::from(name), 1))
    }

    #[test]
    fn test_new_file_is_empty() {
        let f = file("a.txt");
        let inode = f.inode();
        assert_eq!(inode.inode_no, 1);
        assert_eq!(inode.size, 0);
        assert_eq!(inode.created, inode.modified);

        let handle = OpenFile::new(f.clone());
        let mut buf = [0xFFu8; 8];
        assert_eq!(handle.read(&mut buf), 0);
        assert_eq!(buf, [0xFF; 8]);
    }

    #[test]
    fn test_handle_tracks_busy() {
        let f = file("a.txt");
        assert!(!f.is_busy());

        let h1 = OpenFile::new(f.clone());
        let h2 = OpenFile::new(f.clone());
        assert_eq!(f.open_count(), 2);

        h1.close();
        assert!(f.is_busy());
        drop(h2);
        assert!(!f.is_busy());
    }

    #[test]
    fn test_write_replaces_whole_buffer() {
        let f = file("a.txt");
        let handle = OpenFile::new(f.clone());

        assert_eq!(handle.write(b"hello world"), Ok(11));
        assert_eq!(handle.write(b"bye"), Ok(3));

        let mut buf = [0u8; 32];
        let n = handle.read(&mut buf);
        assert_eq!(&buf[..n], b"bye");
        assert_eq!(handle.metadata().size, 3);
    }

    #[test]
    fn test_write_updates_modified_only() {
        let f = file("a.txt");
        let before = f.inode();
        let handle = OpenFile::new(f.clone());
        handle.write(b"x").unwrap();

        let after = handle.metadata();
        assert_eq!(after.created, before.created);
        assert!(after.modified > before.modified);
        assert_eq!(after.inode_no, before.inode_no);
    }

    #[test]
    fn test_read_never_exceeds_stored_data() {
        let f = file("a.txt");
        OpenFile::new(f.clone()).write(b"abc").unwrap();

        // 元数据声称的大小比实际数据大
        let mut inode = f.inode();
        inode.size = 100;
        f.set_inode(inode).unwrap();

        let mut buf = [0u8; 64];
        assert_eq!(OpenFile::new(f).read(&mut buf), 3);
    }

    #[test]
    fn test_set_inode_refused_while_open() {
        let f = file("a.txt");
        let handle = OpenFile::new(f.clone());
        let inode = f.inode();
        assert_eq!(f.set_inode(inode), Err(FsError::Busy));
        drop(handle);
        assert_eq!(f.set_inode(inode), Ok(()));
    }

    #[test]
    fn test_directory_children() {
        init_test_ops();
        let dir = Arc::new(NativeDirectory::new(String::from("docs"), 7));
        dir.link(3).unwrap();
        dir.link(5).unwrap();
        assert_eq!(dir.link(3), Err(FsError::AlreadyExists));
        assert_eq!(dir.children(), [5, 3]);

        assert!(dir.unlink(3));
        assert!(!dir.unlink(3));
        assert_eq!(dir.child_count(), 1);

        let handle = OpenDirectory::new(dir.clone());
        assert!(dir.is_busy());
        assert_eq!(handle.child_count(), 1);
        assert_eq!(handle.name(), "docs");
        handle.close();
        assert!(!dir.is_busy());
    }
}
