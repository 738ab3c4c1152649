//! 中断保护器
//!
//! 基于 RAII 实现中断保护，在创建时禁用中断，销毁时恢复。
//!
//! 注意：禁用中断只能阻止**本地 CPU** 的“任务 vs 本地中断”并发，
//! 多核共享数据仍需要配合自旋锁。

use crate::arch_ops;

/// 中断保护器
///
/// 创建时禁用中断并保存之前的状态，销毁时恢复。
/// 未注册 [`ArchOps`](crate::ArchOps) 时为空操作。
///
/// # 示例
/// ```ignore
/// {
///     let guard = IntrGuard::new(); // 禁用中断
///     // 临界区代码
/// } // 离开作用域，自动恢复中断状态
/// ```
pub struct IntrGuard {
    flags: Option<usize>,
}

impl IntrGuard {
    /// 禁用中断并返回一个 IntrGuard 实例。
    pub fn new() -> Self {
        // SAFETY: 保存的 flags 只会在 drop / restore 时原样写回
        let flags = arch_ops().map(|ops| unsafe { ops.read_and_disable_interrupts() });
        IntrGuard { flags }
    }

    /// 放弃自动恢复，取出保存的中断状态
    ///
    /// 调用者负责稍后通过 [`IntrGuard::restore`] 写回。
    pub(crate) fn into_flags(self) -> Option<usize> {
        let flags = self.flags;
        core::mem::forget(self);
        flags
    }

    /// 写回由 [`IntrGuard::into_flags`] 取出的中断状态
    pub(crate) fn restore(flags: Option<usize>) {
        if let (Some(flags), Some(ops)) = (flags, arch_ops()) {
            // SAFETY: flags 来自同一 ArchOps 的 read_and_disable_interrupts
            unsafe { ops.restore_interrupts(flags) };
        }
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        Self::restore(self.flags);
    }
}
