//! # formula 子命令实现
//!
//! 显示化学式的元素组成、质量分数、分子量与电子数。
//!
//! ## 依赖关系
//! - 使用 `cli/formula.rs` 定义的 FormulaArgs
//! - 使用 `xraylab::parsers::parse_formula`

use crate::cli::formula::FormulaArgs;

use anyhow::{Context, Result};
use tabled::{Table, Tabled};
use xraylab::models::Composition;
use xraylab::parsers::parse_formula;
use xraylab::utils::output;
use xraylab::xray::constants::AVOGADRO;

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Element")]
    symbol: String,
    #[tabled(rename = "Z")]
    atomic_number: u32,
    #[tabled(rename = "Count")]
    count: String,
    #[tabled(rename = "Atomic weight")]
    atomic_weight: String,
    #[tabled(rename = "Mass %")]
    mass_percent: String,
}

/// 执行 formula
pub fn execute(args: FormulaArgs) -> Result<()> {
    for formula in &args.formulas {
        let composition = parse_formula(formula).with_context(|| format!("'{}'", formula))?;
        print_composition(&composition, args.density);
    }
    Ok(())
}

fn print_composition(composition: &Composition, density: Option<f64>) {
    output::print_header(composition.formula());

    let mw = composition.molecular_weight();
    let rows: Vec<ComponentRow> = composition
        .components()
        .iter()
        .map(|c| ComponentRow {
            symbol: c.element.symbol.to_string(),
            atomic_number: c.element.atomic_number,
            count: format!("{}", c.count),
            atomic_weight: format!("{:.4}", c.element.atomic_weight),
            mass_percent: format!("{:.2}", 100.0 * c.count * c.element.atomic_weight / mw),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_kv("Molecular weight (g/mol)", &format!("{:.4}", mw));
    output::print_kv(
        "Electrons per formula unit",
        &format!("{}", composition.total_electrons()),
    );

    if let Some(rho) = density.filter(|d| *d > 0.0) {
        let electron_density = 1e6 * rho / mw * AVOGADRO * composition.total_electrons() / 1e30;
        output::print_kv("Electron density (e/Å³)", &format!("{:.6}", electron_density));
    }
}
