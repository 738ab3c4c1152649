//! 原始自旋锁
//!
//! 基于原子操作实现，并实现 [`lock_api::RawMutex`]，从而可以直接套用
//! `lock_api::Mutex` 获得带 RAII 保护器的数据锁。

use core::hint;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::intr_guard::IntrGuard;

/// `saved_flags` 中表示“没有保存中断状态”的取值
const NO_FLAGS: usize = usize::MAX;

/// 自旋锁，提供互斥访问临界区的能力。
///
/// 持锁期间本地中断被屏蔽（若已注册 [`ArchOps`](crate::ArchOps)），
/// 解锁时恢复加锁前的中断状态。不可重入。
#[derive(Debug)]
pub struct RawSpinLock {
    lock: AtomicBool,
    saved_flags: AtomicUsize,
}

impl RawSpinLock {
    /// 创建一个新的 RawSpinLock 实例。
    pub const fn new() -> Self {
        RawSpinLock {
            lock: AtomicBool::new(false),
            saved_flags: AtomicUsize::new(NO_FLAGS),
        }
    }

    fn store_flags(&self, flags: Option<usize>) {
        self.saved_flags
            .store(flags.unwrap_or(NO_FLAGS), Ordering::Relaxed);
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: lock/try_lock 通过 Acquire CAS 保证互斥，unlock 以 Release 释放
unsafe impl lock_api::RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    type GuardMarker = lock_api::GuardSend;

    fn lock(&self) {
        let guard = IntrGuard::new();

        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            hint::spin_loop();
        }

        self.store_flags(guard.into_flags());
    }

    fn try_lock(&self) -> bool {
        let guard = IntrGuard::new();

        if self
            .lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.store_flags(guard.into_flags());
            true
        } else {
            // guard 被 drop，立即恢复中断状态
            false
        }
    }

    unsafe fn unlock(&self) {
        let flags = self.saved_flags.swap(NO_FLAGS, Ordering::Relaxed);
        self.lock.store(false, Ordering::Release);
        IntrGuard::restore((flags != NO_FLAGS).then_some(flags));
    }

    fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lock_api::RawMutex;

    #[test]
    fn test_raw_lock_exclusive() {
        let lock = RawSpinLock::new();
        assert!(!lock.is_locked());

        lock.lock();
        assert!(lock.is_locked());
        assert!(!lock.try_lock());

        // SAFETY: 当前上下文持有锁
        unsafe { lock.unlock() };
        assert!(!lock.is_locked());
        assert!(lock.try_lock());
        unsafe { lock.unlock() };
    }
}
