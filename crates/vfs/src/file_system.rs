//! 文件系统后端抽象

use crate::{FsError, InodeMetadata};

/// 文件系统后端 trait
///
/// VFS 门面只通过此接口访问后端：名称在各自卷内解析，
/// ARFS 按精确名称匹配，NTFS 解析器按路径解析到元数据表项。
pub trait FileSystem: Send + Sync {
    /// 文件系统类型名称
    fn fs_type(&self) -> &'static str;

    /// 获取名称对应条目的元数据快照
    fn metadata(&self, name: &str) -> Result<InodeMetadata, FsError>;

    /// 将名称对应文件的内容读入 `buf`，返回读取的字节数
    fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize, FsError>;
}
