//! FS 运行时操作 trait 定义和注册
//!
//! 此模块定义了 FS 层需要的外部依赖接口，通过 trait 抽象实现与宿主内核的解耦。

use core::sync::atomic::{AtomicUsize, Ordering};

/// FS 运行时操作
///
/// 宿主内核需要实现此 trait 并在启动时注册。
pub trait FsOps: Send + Sync {
    /// 获取当前时间（Unix 秒），用于 inode 时间戳
    fn timestamp_now(&self) -> u64;
}

// ========== FsOps 注册 ==========

static FS_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static FS_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册 FS 操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_fs_ops(ops: &'static dyn FsOps) {
    let ptr = ops as *const dyn FsOps;
    // SAFETY: 将 fat pointer 拆分为 data 和 vtable 两部分存储
    let (data, vtable) =
        unsafe { core::mem::transmute::<*const dyn FsOps, (usize, usize)>(ptr) };
    FS_OPS_VTABLE.store(vtable, Ordering::Release);
    FS_OPS_DATA.store(data, Ordering::Release);
}

/// 获取已注册的 FS 操作实现
///
/// # Panics
/// 如果尚未调用 [`register_fs_ops`] 注册实现，则 panic
#[inline]
pub fn fs_ops() -> &'static dyn FsOps {
    let data = FS_OPS_DATA.load(Ordering::Acquire);
    let vtable = FS_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("fs: FsOps not registered");
    }
    // SAFETY: 重组 fat pointer
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn FsOps>((data, vtable)) }
}

#[cfg(test)]
impl FsOps for test_support::mock::fs::MockFsOps {
    fn timestamp_now(&self) -> u64 {
        self.tick()
    }
}

/// 在测试二进制中注册一次 Mock FsOps
#[cfg(test)]
pub(crate) fn init_test_ops() {
    static INIT: test_support::once::InitOnce = test_support::once::InitOnce::new();

    // Safety: tests use a single global mock FsOps.
    INIT.call(|| unsafe { register_fs_ops(&test_support::mock::fs::MOCK_FS_OPS) });
}
