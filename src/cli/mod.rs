//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `calc`: 单个材料计算
//! - `batch`: CSV 批量计算
//! - `convert`: 能量/波长换算
//! - `formula`: 化学式信息
//! - `bragg`: Bragg 角
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: calc, batch, convert, formula, bragg

pub mod batch;
pub mod bragg;
pub mod calc;
pub mod convert;
pub mod formula;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// xraylab - X 射线光学性质计算工具
#[derive(Parser)]
#[command(name = "xraylab")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "X-ray optical properties of materials from formula, energy and density",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding per-element scattering factor tables (<symbol>.nff)
    #[arg(long, global = true, env = "XRAYLAB_DATA_DIR", default_value = "./data/atomic")]
    pub data_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Calculate X-ray properties of a single material
    Calc(calc::CalcArgs),

    /// Calculate X-ray properties for many materials listed in a CSV file
    Batch(batch::BatchArgs),

    /// Convert between photon energy (keV) and wavelength (Å)
    Convert(convert::ConvertArgs),

    /// Show composition, molecular weight and electron count of formulas
    Formula(formula::FormulaArgs),

    /// Calculate Bragg angles for a d-spacing
    Bragg(bragg::BraggArgs),
}

/// 输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Terminal table
    Table,
    /// Comma-separated values
    Csv,
    /// JSON array of rows
    Json,
}

impl OutputFormat {
    /// 由文件扩展名推断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
