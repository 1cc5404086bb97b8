//! # 材料光学性质计算器
//!
//! 由化学式、能量数组和质量密度计算 X 射线光学性质。
//!
//! ## 算法概述
//! 1. 解析化学式
//! 2. 校验密度与能量
//! 3. 计算分子量、电子数与电子密度
//! 4. 通过解析器获取 Σ nᵢf1ᵢ、Σ nᵢf2ᵢ
//! 5. 经典色散关系求 δ、β，再求临界角、衰减长度和散射长度密度
//!
//! ## 公式
//! - λ = hc / E
//! - δ = λ² · r_e·N_A/(2π) · ρ/M · Σ nᵢf1ᵢ
//! - β = λ² · r_e·N_A/(2π) · ρ/M · Σ nᵢf2ᵢ
//! - θc = √(2δ)
//! - L_att = λ / (4πβ)
//! - SLD = 2πδ/λ², 2πβ/λ²
//!
//! ## 依赖关系
//! - 被 `batch/dispatcher.rs` 与 `engine.rs` 调用
//! - 使用 `parsers/formula.rs` 解析化学式
//! - 使用 `xray/resolver.rs` 获取散射因子

use crate::error::{Result, XrayError};
use crate::models::{Composition, XRayResult};
use crate::parsers::parse_formula;
use crate::xray::constants::{
    energy_to_wavelength, AVOGADRO, MAX_ENERGY_KEV, MIN_ENERGY_KEV, SCATTERING_PREFACTOR,
};
use crate::xray::resolver::ScatteringFactorResolver;

use std::f64::consts::PI;
use std::sync::Arc;

/// 校验密度 > 0
pub fn validate_density(density: f64) -> Result<()> {
    if !density.is_finite() || density <= 0.0 {
        return Err(XrayError::Validation(format!(
            "density must be positive, got {}",
            density
        )));
    }
    Ok(())
}

/// 校验能量非空、为正且在支持范围内
pub fn validate_energies(energies_kev: &[f64]) -> Result<()> {
    if energies_kev.is_empty() {
        return Err(XrayError::Energy("no energies given".to_string()));
    }
    for &e in energies_kev {
        if !e.is_finite() || e <= 0.0 {
            return Err(XrayError::Energy(format!(
                "energy must be positive, got {} keV",
                e
            )));
        }
        if !(MIN_ENERGY_KEV..=MAX_ENERGY_KEV).contains(&e) {
            return Err(XrayError::Energy(format!(
                "{} keV is outside the supported range {}-{} keV",
                e, MIN_ENERGY_KEV, MAX_ENERGY_KEV
            )));
        }
    }
    Ok(())
}

/// 光学性质计算器
#[derive(Debug, Clone)]
pub struct MaterialCalculator {
    resolver: Arc<ScatteringFactorResolver>,
}

impl MaterialCalculator {
    pub fn new(resolver: Arc<ScatteringFactorResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<ScatteringFactorResolver> {
        &self.resolver
    }

    /// 计算一个化学式在一组能量 (keV) 下的光学性质
    pub fn compute(&self, formula: &str, energies_kev: &[f64], density: f64) -> Result<XRayResult> {
        let composition = parse_formula(formula)?;
        self.compute_composition(&composition, energies_kev, density)
    }

    /// 对已解析的组成计算
    pub fn compute_composition(
        &self,
        composition: &Composition,
        energies_kev: &[f64],
        density: f64,
    ) -> Result<XRayResult> {
        let formula = composition.formula();

        validate_density(density)?;
        validate_energies(energies_kev)?;

        let molecular_weight = composition.molecular_weight();
        let total_electrons = composition.total_electrons();
        // e/cm³ → e/Å³
        let electron_density = 1e6 * density / molecular_weight * AVOGADRO * total_electrons / 1e30;

        let factors = self.resolver.resolve(composition, energies_kev)?;

        let common = SCATTERING_PREFACTOR * density / molecular_weight;
        let n = energies_kev.len();

        let mut wavelength = Vec::with_capacity(n);
        let mut delta = Vec::with_capacity(n);
        let mut beta = Vec::with_capacity(n);
        let mut critical_angle = Vec::with_capacity(n);
        let mut attenuation = Vec::with_capacity(n);
        let mut sld_re = Vec::with_capacity(n);
        let mut sld_im = Vec::with_capacity(n);

        for i in 0..n {
            let lambda_a = energy_to_wavelength(energies_kev[i]);
            let lambda_m = lambda_a * 1e-10;
            let lambda_sq = lambda_m * lambda_m;

            let d = lambda_sq * common * factors.total_f1[i];
            let b = lambda_sq * common * factors.total_f2[i];

            wavelength.push(lambda_a);
            delta.push(d);
            beta.push(b);
            critical_angle.push((2.0 * d).sqrt().to_degrees());
            // m → cm
            attenuation.push(lambda_m / (4.0 * PI * b) * 100.0);
            // m⁻² → Å⁻²
            sld_re.push(d * 2.0 * PI / lambda_sq / 1e20);
            sld_im.push(b * 2.0 * PI / lambda_sq / 1e20);
        }

        let result = XRayResult {
            formula: formula.to_string(),
            density_g_cm3: density,
            molecular_weight_g_mol: molecular_weight,
            total_electrons,
            electron_density_per_ang3: electron_density,
            energy_kev: energies_kev.to_vec(),
            wavelength_angstrom: wavelength,
            dispersion_delta: delta,
            absorption_beta: beta,
            scattering_factor_f1: factors.total_f1,
            scattering_factor_f2: factors.total_f2,
            critical_angle_degrees: critical_angle,
            attenuation_length_cm: attenuation,
            real_sld_per_ang2: sld_re,
            imaginary_sld_per_ang2: sld_im,
        };

        check_finite(&result)?;
        Ok(result)
    }
}

/// 任何 NaN/Inf 都视为计算失败
fn check_finite(result: &XRayResult) -> Result<()> {
    let scalars = [
        ("molecular weight", result.molecular_weight_g_mol),
        ("electron density", result.electron_density_per_ang3),
    ];
    if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
        return Err(XrayError::calculation(&result.formula, format!("{} is not finite", name)));
    }

    let arrays: [(&str, &[f64]); 8] = [
        ("dispersion delta", &result.dispersion_delta),
        ("absorption beta", &result.absorption_beta),
        ("f1", &result.scattering_factor_f1),
        ("f2", &result.scattering_factor_f2),
        ("critical angle", &result.critical_angle_degrees),
        ("attenuation length", &result.attenuation_length_cm),
        ("real SLD", &result.real_sld_per_ang2),
        ("imaginary SLD", &result.imaginary_sld_per_ang2),
    ];
    for (name, values) in arrays {
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(XrayError::calculation(
                &result.formula,
                format!(
                    "{} is {} at {} keV",
                    name, values[i], result.energy_kev[i]
                ),
            ));
        }
    }
    Ok(())
}
