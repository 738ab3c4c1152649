//! VFS 错误类型
//!
//! 所有错误都是可恢复的，以返回值的形式交给直接调用者。
//! 可通过 [`FsError::to_errno()`] 转换为系统调用错误码。

/// VFS 错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 名称空间相关
    /// 卷、文件或目录不存在 (-ENOENT)
    NotFound,
    /// 同名条目已存在 (-EEXIST)
    AlreadyExists,
    /// 条目已打开，拒绝删除或改写元数据 (-EBUSY)
    Busy,

    // 资源相关
    /// 内存分配失败 (-ENOMEM)
    AllocationFailure,
    /// 超出固定容量上限 (-ENOSPC)
    CapacityExceeded,

    // 设备与磁盘格式相关
    /// 扇区读取失败 (-EIO)
    ReadError,
    /// 引导扇区校验失败 (-EINVAL)
    InvalidBootSector,
    /// 元数据表项损坏 (-EUCLEAN)
    InvalidEntry,
    /// 表项中没有所需类型的属性 (-ENODATA)
    AttributeNotFound,
    /// 属性为非常驻，暂不支持 (-EOPNOTSUPP)
    NonResidentUnsupported,
    /// 调用者提供的缓冲区太小 (-ERANGE)
    BufferTooSmall,
    /// 没有已挂载的卷 (-ENODEV)
    NotMounted,

    // 参数相关
    /// 无效参数 (-EINVAL)
    InvalidArgument,
}

impl FsError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            FsError::NotFound => -2,
            FsError::ReadError => -5,
            FsError::AllocationFailure => -12,
            FsError::Busy => -16,
            FsError::AlreadyExists => -17,
            FsError::NotMounted => -19,
            FsError::InvalidBootSector => -22,
            FsError::InvalidArgument => -22,
            FsError::CapacityExceeded => -28,
            FsError::BufferTooSmall => -34,
            FsError::AttributeNotFound => -61,
            FsError::NonResidentUnsupported => -95,
            FsError::InvalidEntry => -117,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_values() {
        assert_eq!(FsError::NotFound.to_errno(), -2);
        assert_eq!(FsError::Busy.to_errno(), -16);
        assert_eq!(FsError::AllocationFailure.to_errno(), -12);
        assert_eq!(FsError::InvalidEntry.to_errno(), -117);
    }

    #[test]
    fn test_errno_always_negative() {
        let all = [
            FsError::NotFound,
            FsError::AlreadyExists,
            FsError::Busy,
            FsError::AllocationFailure,
            FsError::CapacityExceeded,
            FsError::ReadError,
            FsError::InvalidBootSector,
            FsError::InvalidEntry,
            FsError::AttributeNotFound,
            FsError::NonResidentUnsupported,
            FsError::BufferTooSmall,
            FsError::NotMounted,
            FsError::InvalidArgument,
        ];
        for err in all {
            assert!(err.to_errno() < 0, "{:?}", err);
        }
    }
}
