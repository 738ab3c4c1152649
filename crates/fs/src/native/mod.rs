//! ARFS：内存中的原生文件系统
//!
//! - [`NativeRegistry`] - 固定容量的卷表
//! - [`NativeVolume`] - 单个卷上的文件、目录与元数据操作
//! - [`OpenFile`] / [`OpenDirectory`] - RAII 打开句柄，存活期间条目处于“忙”状态

mod entry;
mod registry;
mod volume;

pub use entry::{NativeDirectory, NativeFile, OpenDirectory, OpenFile};
pub use registry::NativeRegistry;
pub use volume::NativeVolume;
