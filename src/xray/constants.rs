//! # 物理常数与单位换算
//!
//! ## 常数来源
//! CODATA 2018
//!
//! ## 依赖关系
//! - 被 `xray/calculator.rs` 和 `commands/` 使用
//! - 无外部模块依赖

use crate::error::{Result, XrayError};

use std::f64::consts::PI;

/// 经典电子半径 (m)
pub const THOMSON_RADIUS_M: f64 = 2.8179403262e-15;

/// 阿伏伽德罗常数 (1/mol)
pub const AVOGADRO: f64 = 6.02214076e23;

/// hc (keV·Å)
pub const HC_KEV_ANGSTROM: f64 = 12.398419843320026;

/// 支持的能量下限 (keV)
pub const MIN_ENERGY_KEV: f64 = 0.03;

/// 支持的能量上限 (keV)
pub const MAX_ENERGY_KEV: f64 = 30.0;

/// r_e·N_A·1e6 / (2π)，δ/β 公式的公共前因子（含 cm³→m³ 换算）
pub const SCATTERING_PREFACTOR: f64 = THOMSON_RADIUS_M * AVOGADRO * 1e6 / (2.0 * PI);

/// 能量 (keV) → 波长 (Å)
pub fn energy_to_wavelength(energy_kev: f64) -> f64 {
    HC_KEV_ANGSTROM / energy_kev
}

/// 波长 (Å) → 能量 (keV)
pub fn wavelength_to_energy(wavelength_angstrom: f64) -> f64 {
    HC_KEV_ANGSTROM / wavelength_angstrom
}

/// Bragg 角 θ（度）: nλ = 2d sin θ
pub fn bragg_angle(d_spacing: f64, wavelength: f64, order: u32) -> Result<f64> {
    if d_spacing <= 0.0 || wavelength <= 0.0 || order == 0 {
        return Err(XrayError::Validation(
            "d-spacing, wavelength and order must be positive".to_string(),
        ));
    }

    let sin_theta = order as f64 * wavelength / (2.0 * d_spacing);
    if sin_theta > 1.0 {
        return Err(XrayError::Validation(format!(
            "no Bragg reflection: nλ/2d = {:.4} > 1",
            sin_theta
        )));
    }
    Ok(sin_theta.asin().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wavelength_round_trip() {
        let mut e = 0.03;
        while e <= 30.0 {
            let back = wavelength_to_energy(energy_to_wavelength(e));
            assert!((back - e).abs() <= 1e-12 * e, "round trip failed at {}", e);
            e *= 1.37;
        }
    }

    #[test]
    fn test_cu_ka_energy() {
        // Cu Kα1 1.5406 Å ≈ 8.048 keV
        let e = wavelength_to_energy(1.5406);
        assert!((e - 8.048).abs() < 1e-3);
    }

    #[test]
    fn test_bragg_angle_si_111() {
        // Si(111) d = 3.1356 Å, Cu Kα1 → θ ≈ 14.22°
        let theta = bragg_angle(3.1356, 1.5406, 1).unwrap();
        assert!((theta - 14.221).abs() < 1e-2);
        assert!(bragg_angle(0.5, 1.5406, 1).is_err());
    }
}
