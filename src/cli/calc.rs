//! # calc 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/calc.rs`

use super::OutputFormat;

use clap::Args;
use std::path::PathBuf;

/// calc 子命令参数
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Chemical formula, e.g. SiO2, Ca(OH)2, CuSO4(H2O)5
    pub formula: String,

    /// Photon energy in keV: "10", "5,10,15", "5-15:11" or "1-30:100:log"
    #[arg(short, long)]
    pub energy: String,

    /// Mass density in g/cm³
    #[arg(short, long)]
    pub density: f64,

    /// Write results to this file instead of the terminal
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (inferred from --output extension when omitted)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Comma-separated subset of fields for csv/json output
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Number of decimal places
    #[arg(long, default_value_t = 6)]
    pub precision: usize,
}
