//! FS 相关操作的 Mock 实现
//!
//! 注意：这里不直接依赖 `fs` crate（避免循环依赖）。
//! `fs` crate 在 `cfg(test)` 下为这些类型实现其 trait（例如 `FsOps`）。

use core::sync::atomic::{AtomicU64, Ordering};

/// Mock 的 FS 运行时操作
///
/// 时钟单调递增：每次取时间都会前进一秒，
/// 因此并行测试也能观察到“后写入的时间戳更大”。
pub struct MockFsOps {
    now: AtomicU64,
}

impl MockFsOps {
    /// 创建从 `start` 开始计时的时钟
    pub const fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// 取当前时间并前进一秒
    pub fn tick(&self) -> u64 {
        self.now.fetch_add(1, Ordering::SeqCst)
    }
}

/// 全局 Mock 实例
pub static MOCK_FS_OPS: MockFsOps = MockFsOps::new(1_700_000_000);
