//! # 批量计算模块
//!
//! 提供批量材料计算能力。
//!
//! ## 功能
//! - 顺序/并行执行方式自动选择
//! - 按内存上限分块提交
//! - 单任务失败隔离
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `engine.rs` 与 `commands/batch.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod dispatcher;
pub mod input;
pub mod monitor;

pub use dispatcher::{
    BatchConfig, BatchDispatcher, BatchReport, BatchStats, CalculationJob, ExecutionMode,
    JobError, JobKey, JobOutcome, JobRecord, RejectedJob,
};
pub use monitor::{MemoryMonitor, MemoryProbe, MemoryStatus};
