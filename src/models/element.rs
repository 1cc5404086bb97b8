//! # 元素周期表数据
//!
//! 提供 H (Z=1) 到 U (Z=92) 的元素符号、名称与标准原子量。
//!
//! ## 数据来源
//! IUPAC Standard Atomic Weights (conventional values)
//!
//! ## 依赖关系
//! - 被 `parsers/formula.rs` 用于校验元素符号
//! - 被 `xray/calculator.rs` 用于计算分子量与电子数
//! - 纯静态数据，无外部依赖

use crate::error::{Result, XrayError};

use std::collections::HashMap;
use std::sync::LazyLock;

/// 化学元素
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    /// 原子序数
    pub atomic_number: u32,
    /// 元素符号
    pub symbol: &'static str,
    /// 英文名称
    pub name: &'static str,
    /// 标准原子量 (g/mol)
    pub atomic_weight: f64,
}

const fn el(
    atomic_number: u32,
    symbol: &'static str,
    name: &'static str,
    atomic_weight: f64,
) -> Element {
    Element {
        atomic_number,
        symbol,
        name,
        atomic_weight,
    }
}

/// 元素表，按原子序数排列
pub static ELEMENTS: [Element; 92] = [
    el(1, "H", "Hydrogen", 1.008),
    el(2, "He", "Helium", 4.002602),
    el(3, "Li", "Lithium", 6.94),
    el(4, "Be", "Beryllium", 9.0121831),
    el(5, "B", "Boron", 10.81),
    el(6, "C", "Carbon", 12.011),
    el(7, "N", "Nitrogen", 14.007),
    el(8, "O", "Oxygen", 15.999),
    el(9, "F", "Fluorine", 18.998403163),
    el(10, "Ne", "Neon", 20.1797),
    el(11, "Na", "Sodium", 22.98976928),
    el(12, "Mg", "Magnesium", 24.305),
    el(13, "Al", "Aluminum", 26.9815385),
    el(14, "Si", "Silicon", 28.085),
    el(15, "P", "Phosphorus", 30.973761998),
    el(16, "S", "Sulfur", 32.06),
    el(17, "Cl", "Chlorine", 35.45),
    el(18, "Ar", "Argon", 39.948),
    el(19, "K", "Potassium", 39.0983),
    el(20, "Ca", "Calcium", 40.078),
    el(21, "Sc", "Scandium", 44.955908),
    el(22, "Ti", "Titanium", 47.867),
    el(23, "V", "Vanadium", 50.9415),
    el(24, "Cr", "Chromium", 51.9961),
    el(25, "Mn", "Manganese", 54.938044),
    el(26, "Fe", "Iron", 55.845),
    el(27, "Co", "Cobalt", 58.933194),
    el(28, "Ni", "Nickel", 58.6934),
    el(29, "Cu", "Copper", 63.546),
    el(30, "Zn", "Zinc", 65.38),
    el(31, "Ga", "Gallium", 69.723),
    el(32, "Ge", "Germanium", 72.630),
    el(33, "As", "Arsenic", 74.921595),
    el(34, "Se", "Selenium", 78.971),
    el(35, "Br", "Bromine", 79.904),
    el(36, "Kr", "Krypton", 83.798),
    el(37, "Rb", "Rubidium", 85.4678),
    el(38, "Sr", "Strontium", 87.62),
    el(39, "Y", "Yttrium", 88.90584),
    el(40, "Zr", "Zirconium", 91.224),
    el(41, "Nb", "Niobium", 92.90637),
    el(42, "Mo", "Molybdenum", 95.95),
    el(43, "Tc", "Technetium", 98.0),
    el(44, "Ru", "Ruthenium", 101.07),
    el(45, "Rh", "Rhodium", 102.90550),
    el(46, "Pd", "Palladium", 106.42),
    el(47, "Ag", "Silver", 107.8682),
    el(48, "Cd", "Cadmium", 112.414),
    el(49, "In", "Indium", 114.818),
    el(50, "Sn", "Tin", 118.710),
    el(51, "Sb", "Antimony", 121.760),
    el(52, "Te", "Tellurium", 127.60),
    el(53, "I", "Iodine", 126.90447),
    el(54, "Xe", "Xenon", 131.293),
    el(55, "Cs", "Cesium", 132.90545196),
    el(56, "Ba", "Barium", 137.327),
    el(57, "La", "Lanthanum", 138.90547),
    el(58, "Ce", "Cerium", 140.116),
    el(59, "Pr", "Praseodymium", 140.90766),
    el(60, "Nd", "Neodymium", 144.242),
    el(61, "Pm", "Promethium", 145.0),
    el(62, "Sm", "Samarium", 150.36),
    el(63, "Eu", "Europium", 151.964),
    el(64, "Gd", "Gadolinium", 157.25),
    el(65, "Tb", "Terbium", 158.92535),
    el(66, "Dy", "Dysprosium", 162.500),
    el(67, "Ho", "Holmium", 164.93033),
    el(68, "Er", "Erbium", 167.259),
    el(69, "Tm", "Thulium", 168.93422),
    el(70, "Yb", "Ytterbium", 173.045),
    el(71, "Lu", "Lutetium", 174.9668),
    el(72, "Hf", "Hafnium", 178.49),
    el(73, "Ta", "Tantalum", 180.94788),
    el(74, "W", "Tungsten", 183.84),
    el(75, "Re", "Rhenium", 186.207),
    el(76, "Os", "Osmium", 190.23),
    el(77, "Ir", "Iridium", 192.217),
    el(78, "Pt", "Platinum", 195.084),
    el(79, "Au", "Gold", 196.966569),
    el(80, "Hg", "Mercury", 200.592),
    el(81, "Tl", "Thallium", 204.38),
    el(82, "Pb", "Lead", 207.2),
    el(83, "Bi", "Bismuth", 208.98040),
    el(84, "Po", "Polonium", 209.0),
    el(85, "At", "Astatine", 210.0),
    el(86, "Rn", "Radon", 222.0),
    el(87, "Fr", "Francium", 223.0),
    el(88, "Ra", "Radium", 226.0),
    el(89, "Ac", "Actinium", 227.0),
    el(90, "Th", "Thorium", 232.0377),
    el(91, "Pa", "Protactinium", 231.03588),
    el(92, "U", "Uranium", 238.02891),
];

/// 符号索引
static BY_SYMBOL: LazyLock<HashMap<&'static str, &'static Element>> =
    LazyLock::new(|| ELEMENTS.iter().map(|e| (e.symbol, e)).collect());

/// 按元素符号查找（区分大小写，如 "Si"）
pub fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    BY_SYMBOL.get(symbol).copied()
}

/// 按原子序数查找
pub fn element_by_number(z: u32) -> Option<&'static Element> {
    if (1..=ELEMENTS.len() as u32).contains(&z) {
        Some(&ELEMENTS[(z - 1) as usize])
    } else {
        None
    }
}

/// 查找元素，未知符号返回 `UnknownElement`
pub fn lookup(symbol: &str) -> Result<&'static Element> {
    element_by_symbol(symbol).ok_or_else(|| XrayError::UnknownElement {
        element: symbol.to_string(),
    })
}

/// 原子序数
pub fn atomic_number(symbol: &str) -> Result<u32> {
    lookup(symbol).map(|e| e.atomic_number)
}

/// 原子量 (g/mol)
pub fn atomic_weight(symbol: &str) -> Result<f64> {
    lookup(symbol).map(|e| e.atomic_weight)
}
