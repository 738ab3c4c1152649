//! 测试支持 crate
//!
//! 提供文件系统核心测试使用的 Mock 实现和一次性初始化工具

#![no_std]

pub mod mock;
pub mod once;
