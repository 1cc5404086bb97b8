//! # convert 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::{Args, ValueEnum};

/// 输入量
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Quantity {
    /// Photon energy in keV
    Energy,
    /// Wavelength in Å
    Wavelength,
}

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// What the given values are
    #[arg(value_enum)]
    pub from: Quantity,

    /// Values: "8.048", "5,10,15" or "5-15:11"
    pub values: String,

    /// Number of decimal places
    #[arg(long, default_value_t = 6)]
    pub precision: usize,
}
