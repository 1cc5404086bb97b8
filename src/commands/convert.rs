//! # convert 子命令实现
//!
//! 能量 (keV) 与波长 (Å) 互换。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的 ConvertArgs
//! - 使用 `xraylab::xray::constants`

use crate::cli::convert::{ConvertArgs, Quantity};

use anyhow::{ensure, Context, Result};
use tabled::{Table, Tabled};
use xraylab::parsers::parse_energy_spec;
use xraylab::{energy_to_wavelength, wavelength_to_energy};

#[derive(Tabled)]
struct ConversionRow {
    #[tabled(rename = "E (keV)")]
    energy: String,
    #[tabled(rename = "λ (Å)")]
    wavelength: String,
}

/// 执行 convert
pub fn execute(args: ConvertArgs) -> Result<()> {
    // 数值列表与能量规格语法相同
    let values = parse_energy_spec(&args.values).context("invalid values")?;
    ensure!(
        values.iter().all(|v| v.is_finite() && *v > 0.0),
        "values must be positive"
    );

    let p = args.precision;
    let rows: Vec<ConversionRow> = values
        .iter()
        .map(|&v| {
            let (energy, wavelength) = match args.from {
                Quantity::Energy => (v, energy_to_wavelength(v)),
                Quantity::Wavelength => (wavelength_to_energy(v), v),
            };
            ConversionRow {
                energy: format!("{:.*}", p, energy),
                wavelength: format!("{:.*}", p, wavelength),
            }
        })
        .collect();

    println!("{}", Table::new(&rows));
    Ok(())
}
