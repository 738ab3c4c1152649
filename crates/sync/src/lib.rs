//! 同步原语
//!
//! 向文件系统核心提供自旋锁与中断保护：
//!
//! - [`RawSpinLock`] - 实现 [`lock_api::RawMutex`] 的原始自旋锁
//! - [`SpinLock`] / [`SpinLockGuard`] - 基于 `lock_api::Mutex` 的数据锁
//! - [`IntrGuard`] - RAII 中断保护器
//!
//! # 架构依赖
//!
//! 中断控制通过 [`ArchOps`] trait 抽象。宿主内核可以调用 [`register_arch_ops`]
//! 注册实现；未注册时锁只做自旋，不触碰中断状态（例如在宿主测试环境中）。

#![no_std]

mod intr_guard;
mod raw_spin_lock;
mod spin_lock;

pub use intr_guard::IntrGuard;
pub use raw_spin_lock::RawSpinLock;
pub use spin_lock::{SpinLock, SpinLockGuard};

use core::sync::atomic::{AtomicUsize, Ordering};

/// 架构相关操作的 trait
///
/// 由宿主内核实现并注册，提供中断屏蔽能力
pub trait ArchOps: Send + Sync {
    /// 读取并禁用中断，返回之前的状态
    ///
    /// # Safety
    /// 调用者必须确保在适当的上下文中调用
    unsafe fn read_and_disable_interrupts(&self) -> usize;

    /// 恢复中断状态
    ///
    /// # Safety
    /// flags 必须是之前 read_and_disable_interrupts 返回的值
    unsafe fn restore_interrupts(&self, flags: usize);
}

/// 全局架构操作实例（存储 fat pointer 的两个部分）
static ARCH_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static ARCH_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册架构操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_arch_ops(ops: &'static dyn ArchOps) {
    let ptr = ops as *const dyn ArchOps;
    // SAFETY: fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ArchOps, (usize, usize)>(ptr) };
    ARCH_OPS_VTABLE.store(vtable, Ordering::Release);
    ARCH_OPS_DATA.store(data, Ordering::Release);
}

/// 获取架构操作实例，未注册时返回 `None`
#[inline]
pub(crate) fn arch_ops() -> Option<&'static dyn ArchOps> {
    let data = ARCH_OPS_DATA.load(Ordering::Acquire);
    if data == 0 {
        return None;
    }
    let vtable = ARCH_OPS_VTABLE.load(Ordering::Acquire);
    // SAFETY: data 和 vtable 是通过 register_arch_ops 设置的有效指针，
    // 且 vtable 先于 data 发布
    Some(unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ArchOps>((data, vtable)) })
}
