//! # X 射线计算结果数据模型
//!
//! 单个材料在一组能量下的光学性质。所有数组字段与能量数组等长。
//!
//! ## 依赖关系
//! - 由 `xray/calculator.rs` 构造
//! - 被 `batch/`, `xray/export.rs`, `commands/` 使用

use serde::{Deserialize, Serialize};

/// X 射线光学性质计算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XRayResult {
    /// 化学式
    pub formula: String,
    /// 质量密度 (g/cm³)
    pub density_g_cm3: f64,
    /// 分子量 (g/mol)
    pub molecular_weight_g_mol: f64,
    /// 每分子式单元的电子数
    pub total_electrons: f64,
    /// 电子密度 (e/Å³)
    pub electron_density_per_ang3: f64,

    /// 光子能量 (keV)
    pub energy_kev: Vec<f64>,
    /// 波长 (Å)
    pub wavelength_angstrom: Vec<f64>,
    /// 色散 δ
    pub dispersion_delta: Vec<f64>,
    /// 吸收 β
    pub absorption_beta: Vec<f64>,
    /// 总散射因子实部 Σ nᵢf1ᵢ
    pub scattering_factor_f1: Vec<f64>,
    /// 总散射因子虚部 Σ nᵢf2ᵢ
    pub scattering_factor_f2: Vec<f64>,
    /// 临界角 (度)
    pub critical_angle_degrees: Vec<f64>,
    /// 衰减长度 (cm)
    pub attenuation_length_cm: Vec<f64>,
    /// 散射长度密度实部 (Å⁻²)
    pub real_sld_per_ang2: Vec<f64>,
    /// 散射长度密度虚部 (Å⁻²)
    pub imaginary_sld_per_ang2: Vec<f64>,
}

/// 单个能量点的数据行（导出用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XRayRow<'a> {
    pub formula: &'a str,
    pub density_g_cm3: f64,
    pub energy_kev: f64,
    pub wavelength_angstrom: f64,
    pub molecular_weight_g_mol: f64,
    pub total_electrons: f64,
    pub electron_density_per_ang3: f64,
    pub dispersion_delta: f64,
    pub absorption_beta: f64,
    pub scattering_factor_f1: f64,
    pub scattering_factor_f2: f64,
    pub critical_angle_degrees: f64,
    pub attenuation_length_cm: f64,
    pub real_sld_per_ang2: f64,
    pub imaginary_sld_per_ang2: f64,
}

/// 导出字段名（与 `XRayRow` 字段顺序一致）
pub const ROW_FIELDS: [&str; 15] = [
    "formula",
    "density_g_cm3",
    "energy_kev",
    "wavelength_angstrom",
    "molecular_weight_g_mol",
    "total_electrons",
    "electron_density_per_ang3",
    "dispersion_delta",
    "absorption_beta",
    "scattering_factor_f1",
    "scattering_factor_f2",
    "critical_angle_degrees",
    "attenuation_length_cm",
    "real_sld_per_ang2",
    "imaginary_sld_per_ang2",
];

impl XRayResult {
    /// 能量点数
    pub fn len(&self) -> usize {
        self.energy_kev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_kev.is_empty()
    }

    fn per_energy(&self) -> [&[f64]; 10] {
        [
            self.energy_kev.as_slice(),
            self.wavelength_angstrom.as_slice(),
            self.dispersion_delta.as_slice(),
            self.absorption_beta.as_slice(),
            self.scattering_factor_f1.as_slice(),
            self.scattering_factor_f2.as_slice(),
            self.critical_angle_degrees.as_slice(),
            self.attenuation_length_cm.as_slice(),
            self.real_sld_per_ang2.as_slice(),
            self.imaginary_sld_per_ang2.as_slice(),
        ]
    }

    /// 所有逐能量数组是否与能量数组等长
    ///
    /// 计算器构造的结果总是一致的；反序列化得到的结果需要检查。
    pub fn is_consistent(&self) -> bool {
        let n = self.len();
        self.per_energy().iter().all(|a| a.len() == n)
    }

    /// 第 i 个能量点的数据行，任一数组缺少该点时返回 None
    pub fn row(&self, i: usize) -> Option<XRayRow<'_>> {
        Some(XRayRow {
            formula: &self.formula,
            density_g_cm3: self.density_g_cm3,
            energy_kev: *self.energy_kev.get(i)?,
            wavelength_angstrom: *self.wavelength_angstrom.get(i)?,
            molecular_weight_g_mol: self.molecular_weight_g_mol,
            total_electrons: self.total_electrons,
            electron_density_per_ang3: self.electron_density_per_ang3,
            dispersion_delta: *self.dispersion_delta.get(i)?,
            absorption_beta: *self.absorption_beta.get(i)?,
            scattering_factor_f1: *self.scattering_factor_f1.get(i)?,
            scattering_factor_f2: *self.scattering_factor_f2.get(i)?,
            critical_angle_degrees: *self.critical_angle_degrees.get(i)?,
            attenuation_length_cm: *self.attenuation_length_cm.get(i)?,
            real_sld_per_ang2: *self.real_sld_per_ang2.get(i)?,
            imaginary_sld_per_ang2: *self.imaginary_sld_per_ang2.get(i)?,
        })
    }

    /// 逐能量点迭代数据行，在最短数组处结束
    pub fn rows(&self) -> impl Iterator<Item = XRayRow<'_>> + '_ {
        (0..self.len()).map_while(move |i| self.row(i))
    }

    /// 估算结果占用的内存（字节），批量调度用于分块决策
    pub fn estimated_bytes(n_energies: usize) -> u64 {
        // 10 个 f64 数组 + 固定开销
        (10 * n_energies * std::mem::size_of::<f64>() + 256) as u64
    }
}

impl XRayRow<'_> {
    /// 按字段名取格式化值，未知字段返回 None
    pub fn field(&self, name: &str, precision: usize) -> Option<String> {
        let v = match name {
            "formula" => return Some(self.formula.to_string()),
            "density_g_cm3" => self.density_g_cm3,
            "energy_kev" => self.energy_kev,
            "wavelength_angstrom" => self.wavelength_angstrom,
            "molecular_weight_g_mol" => self.molecular_weight_g_mol,
            "total_electrons" => self.total_electrons,
            "electron_density_per_ang3" => self.electron_density_per_ang3,
            "dispersion_delta" => return Some(format!("{:.*e}", precision, self.dispersion_delta)),
            "absorption_beta" => return Some(format!("{:.*e}", precision, self.absorption_beta)),
            "scattering_factor_f1" => self.scattering_factor_f1,
            "scattering_factor_f2" => self.scattering_factor_f2,
            "critical_angle_degrees" => self.critical_angle_degrees,
            "attenuation_length_cm" => self.attenuation_length_cm,
            "real_sld_per_ang2" => {
                return Some(format!("{:.*e}", precision, self.real_sld_per_ang2))
            }
            "imaginary_sld_per_ang2" => {
                return Some(format!("{:.*e}", precision, self.imaginary_sld_per_ang2))
            }
            _ => return None,
        };
        Some(format!("{:.*}", precision, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(n: usize) -> XRayResult {
        let v = |x: f64| vec![x; n];
        XRayResult {
            formula: "SiO2".to_string(),
            density_g_cm3: 2.2,
            molecular_weight_g_mol: 60.083,
            total_electrons: 30.0,
            electron_density_per_ang3: 0.66,
            energy_kev: (0..n).map(|i| 5.0 + i as f64).collect(),
            wavelength_angstrom: v(1.2),
            dispersion_delta: v(4.5e-6),
            absorption_beta: v(5.0e-8),
            scattering_factor_f1: v(30.0),
            scattering_factor_f2: v(0.5),
            critical_angle_degrees: v(0.17),
            attenuation_length_cm: v(0.013),
            real_sld_per_ang2: v(1.8e-5),
            imaginary_sld_per_ang2: v(2.0e-7),
        }
    }

    #[test]
    fn test_rows_follow_energies() {
        let r = result(3);
        assert!(r.is_consistent());
        let energies: Vec<f64> = r.rows().map(|row| row.energy_kev).collect();
        assert_eq!(energies, vec![5.0, 6.0, 7.0]);
        assert!(r.row(3).is_none());
    }

    #[test]
    fn test_mismatched_arrays_do_not_panic() {
        let json = serde_json::to_string(&result(3)).unwrap();
        let mut r: XRayResult = serde_json::from_str(&json).unwrap();
        r.attenuation_length_cm.pop();

        assert!(!r.is_consistent());
        assert!(r.row(2).is_none());
        assert_eq!(r.rows().count(), 2);
    }

    #[test]
    fn test_field_formatting() {
        let r = result(1);
        let row = r.row(0).unwrap();
        assert_eq!(row.field("formula", 3).unwrap(), "SiO2");
        assert_eq!(row.field("energy_kev", 2).unwrap(), "5.00");
        assert_eq!(row.field("dispersion_delta", 2).unwrap(), "4.50e-6");
        assert!(row.field("nope", 2).is_none());
    }
}
