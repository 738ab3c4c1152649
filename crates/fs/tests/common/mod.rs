//! 集成测试共用的时钟注册

use fs::{FsOps, register_fs_ops};
use test_support::mock::fs::MOCK_FS_OPS;
use test_support::once::InitOnce;

struct MockClock;

impl FsOps for MockClock {
    fn timestamp_now(&self) -> u64 {
        MOCK_FS_OPS.tick()
    }
}

static CLOCK: MockClock = MockClock;

/// 为当前测试二进制注册单调递增的 Mock 时钟
pub fn init_clock() {
    static INIT: InitOnce = InitOnce::new();

    // Safety: every test in the binary shares this one clock.
    INIT.call(|| unsafe { register_fs_ops(&CLOCK) });
}
