//! # bragg 子命令实现
//!
//! ## 依赖关系
//! - 使用 `cli/bragg.rs` 定义的 BraggArgs
//! - 使用 `xraylab::xray::constants`

use crate::cli::bragg::BraggArgs;

use anyhow::{anyhow, Result};
use tabled::{Table, Tabled};
use xraylab::utils::output;
use xraylab::xray::bragg_angle;
use xraylab::{energy_to_wavelength, wavelength_to_energy};

#[derive(Tabled)]
struct BraggRow {
    #[tabled(rename = "d (Å)")]
    d_spacing: String,
    #[tabled(rename = "θ (°)")]
    theta: String,
    #[tabled(rename = "2θ (°)")]
    two_theta: String,
}

/// 执行 bragg
pub fn execute(args: BraggArgs) -> Result<()> {
    let wavelength = match (args.wavelength, args.energy) {
        (Some(w), _) => w,
        (None, Some(e)) => energy_to_wavelength(e),
        (None, None) => return Err(anyhow!("either --wavelength or --energy is required")),
    };

    output::print_info(&format!(
        "λ = {:.6} Å ({:.4} keV), order {}",
        wavelength,
        wavelength_to_energy(wavelength),
        args.order
    ));

    let mut rows = Vec::with_capacity(args.dspacing.len());
    for &d in &args.dspacing {
        match bragg_angle(d, wavelength, args.order) {
            Ok(theta) => rows.push(BraggRow {
                d_spacing: format!("{:.4}", d),
                theta: format!("{:.4}", theta),
                two_theta: format!("{:.4}", 2.0 * theta),
            }),
            Err(e) => output::print_warning(&format!("d = {} Å: {}", d, e)),
        }
    }

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
    Ok(())
}
