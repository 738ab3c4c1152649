//! 测试二进制内的一次性初始化

use core::sync::atomic::{AtomicUsize, Ordering};

const UNINIT: usize = 0;
const INITIALIZING: usize = 1;
const READY: usize = 2;

/// 只执行一次的初始化闸门
///
/// 并行测试中第一个调用者执行初始化，其余调用者自旋等待其完成。
pub struct InitOnce {
    state: AtomicUsize,
}

impl InitOnce {
    /// 创建未初始化的闸门
    pub const fn new() -> Self {
        Self {
            state: AtomicUsize::new(UNINIT),
        }
    }

    /// 第一次调用时执行 `init`，之后的调用等待它完成后直接返回
    pub fn call(&self, init: impl FnOnce()) {
        match self
            .state
            .compare_exchange(UNINIT, INITIALIZING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                init();
                self.state.store(READY, Ordering::Release);
            }
            Err(_) => {
                while self.state.load(Ordering::Acquire) != READY {
                    core::hint::spin_loop();
                }
            }
        }
    }
}

impl Default for InitOnce {
    fn default() -> Self {
        Self::new()
    }
}
