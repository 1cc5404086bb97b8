//! # X 射线光学性质计算模块
//!
//! ## 子模块
//! - `constants`: 物理常数与单位换算
//! - `data`: 元素散射因子表加载
//! - `interpolate`: 单调三次插值
//! - `cache`: 元素插值器缓存
//! - `resolver`: 散射因子解析
//! - `calculator`: 光学性质计算
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `batch/`, `engine.rs` 和 `commands/` 使用
//! - 使用 `models/` 与 `parsers/`

pub mod cache;
pub mod calculator;
pub mod constants;
pub mod data;
pub mod export;
pub mod interpolate;
pub mod resolver;

pub use cache::{CacheStatistics, InterpolatorCache, PRIORITY_ELEMENTS};
pub use calculator::MaterialCalculator;
pub use constants::{bragg_angle, energy_to_wavelength, wavelength_to_energy};
pub use data::{DirectorySource, ElementDataSource, ElementScatteringTable, MemorySource};
pub use interpolate::Interpolator;
pub use resolver::{ElementFactors, ResolvedFactors, ScatteringFactorResolver};
