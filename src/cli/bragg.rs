//! # bragg 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/bragg.rs`

use clap::{ArgGroup, Args};

/// bragg 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("beam").required(true).args(["wavelength", "energy"])))]
pub struct BraggArgs {
    /// Lattice d-spacing(s) in Å, comma-separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub dspacing: Vec<f64>,

    /// X-ray wavelength in Å
    #[arg(short, long)]
    pub wavelength: Option<f64>,

    /// Photon energy in keV
    #[arg(short, long)]
    pub energy: Option<f64>,

    /// Diffraction order
    #[arg(long, default_value_t = 1)]
    pub order: u32,
}
