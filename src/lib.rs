//! # xraylab - X 射线光学性质计算
//!
//! 由化学式、光子能量和质量密度计算材料的 X 射线光学性质：
//! 色散 δ、吸收 β、临界角、衰减长度与散射长度密度。
//!
//! ## 依赖关系
//! ```text
//! engine.rs        (应用根，持有缓存)
//!   ├── batch/     (批量调度、内存监控、批量输入)
//!   ├── xray/      (数据加载、插值缓存、散射因子、计算、导出)
//!   ├── parsers/   (化学式与能量规格)
//!   ├── models/    (元素表、组成、结果)
//!   ├── utils/     (终端输出、进度条)
//!   └── error.rs   (错误处理)
//! ```

pub mod batch;
pub mod engine;
pub mod error;
pub mod models;
pub mod parsers;
pub mod utils;
pub mod xray;

#[cfg(test)]
pub(crate) mod testutil;

pub use batch::{BatchConfig, BatchReport, CalculationJob, JobKey, JobOutcome};
pub use engine::{EnergyInput, XrayEngine};
pub use error::{ErrorKind, Result, XrayError};
pub use models::XRayResult;
pub use xray::{energy_to_wavelength, wavelength_to_energy, CacheStatistics};
