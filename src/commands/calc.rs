//! # calc 子命令实现
//!
//! 计算单个材料在一组能量下的光学性质，输出终端表格或导出文件。
//!
//! ## 依赖关系
//! - 使用 `cli/calc.rs` 定义的 CalcArgs
//! - 使用 `xraylab::engine` 计算
//! - 使用 `xraylab::xray::export` 导出

use crate::cli::calc::CalcArgs;
use crate::cli::OutputFormat;

use anyhow::{Context, Result};
use std::path::Path;
use tabled::{Table, Tabled};
use xraylab::parsers::parse_energy_spec;
use xraylab::utils::output;
use xraylab::xray::export;
use xraylab::{XRayResult, XrayEngine};

/// 终端表格行
#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "E (keV)")]
    energy: String,
    #[tabled(rename = "λ (Å)")]
    wavelength: String,
    #[tabled(rename = "δ")]
    delta: String,
    #[tabled(rename = "β")]
    beta: String,
    #[tabled(rename = "θc (°)")]
    critical_angle: String,
    #[tabled(rename = "L_att (cm)")]
    attenuation: String,
    #[tabled(rename = "f1")]
    f1: String,
    #[tabled(rename = "f2")]
    f2: String,
}

/// 执行 calc
pub fn execute(args: CalcArgs, data_dir: &Path) -> Result<()> {
    let energies = parse_energy_spec(&args.energy).context("invalid --energy")?;
    let fields = export::select_fields(Some(args.fields.as_slice()))?;

    let format = match (&args.output, args.format) {
        (Some(path), OutputFormat::Table) => {
            OutputFormat::from_path(path).unwrap_or(OutputFormat::Csv)
        }
        (_, format) => format,
    };

    let engine = XrayEngine::from_data_dir(data_dir);
    let result = engine
        .compute_single(&args.formula, energies, args.density)
        .with_context(|| format!("calculation failed for '{}'", args.formula))?;

    match (&args.output, format) {
        (None, OutputFormat::Table) => print_result(&result, args.precision),
        (None, OutputFormat::Csv) => {
            export::write_csv(std::io::stdout().lock(), [&result], &fields, args.precision)?
        }
        (None, OutputFormat::Json) => {
            export::write_json(std::io::stdout().lock(), [&result], &fields)?;
            println!();
        }
        (Some(path), OutputFormat::Json) => {
            export::to_json([&result], path, &fields)?;
            output::print_success(&format!("Saved {} rows to '{}'", result.len(), path.display()));
        }
        (Some(path), _) => {
            export::to_csv([&result], path, &fields, args.precision)?;
            output::print_success(&format!("Saved {} rows to '{}'", result.len(), path.display()));
        }
    }

    Ok(())
}

fn print_result(result: &XRayResult, precision: usize) {
    output::print_header(&format!("X-ray Properties of {}", result.formula));

    output::print_kv("Density (g/cm³)", &format!("{}", result.density_g_cm3));
    output::print_kv(
        "Molecular weight (g/mol)",
        &format!("{:.*}", precision.min(4), result.molecular_weight_g_mol),
    );
    output::print_kv("Electrons per formula unit", &format!("{}", result.total_electrons));
    output::print_kv(
        "Electron density (e/Å³)",
        &format!("{:.*}", precision, result.electron_density_per_ang3),
    );
    println!();

    let rows: Vec<PropertyRow> = result
        .rows()
        .map(|r| PropertyRow {
            energy: format!("{:.4}", r.energy_kev),
            wavelength: format!("{:.*}", precision, r.wavelength_angstrom),
            delta: format!("{:.*e}", precision.min(4), r.dispersion_delta),
            beta: format!("{:.*e}", precision.min(4), r.absorption_beta),
            critical_angle: format!("{:.*}", precision, r.critical_angle_degrees),
            attenuation: format!("{:.*e}", precision.min(4), r.attenuation_length_cm),
            f1: format!("{:.4}", r.scattering_factor_f1),
            f2: format!("{:.4}", r.scattering_factor_f2),
        })
        .collect();

    println!("{}", Table::new(&rows));

    if let Some(first) = result.row(0) {
        println!();
        output::print_kv(
            "SLD real / imag (Å⁻²)",
            &format!(
                "{:.4e} / {:.4e}",
                first.real_sld_per_ang2, first.imaginary_sld_per_ang2
            ),
        );
    }
}
