//! # formula 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/formula.rs`

use clap::Args;

/// formula 子命令参数
#[derive(Args, Debug)]
pub struct FormulaArgs {
    /// One or more chemical formulas
    #[arg(required = true)]
    pub formulas: Vec<String>,

    /// Mass density in g/cm³, enables electron density output
    #[arg(short, long)]
    pub density: Option<f64>,
}
