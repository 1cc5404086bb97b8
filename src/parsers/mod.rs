//! # 解析器模块
//!
//! 化学式与能量规格字符串的解析。
//!
//! ## 依赖关系
//! - 被 `xray/` 与 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: formula, energy

pub mod energy;
pub mod formula;

pub use energy::parse_energy_spec;
pub use formula::parse_formula;
