//! # 材料组成数据模型
//!
//! 化学式解析后的元素 → 化学计量数映射。
//!
//! ## 不变量
//! - 所有元素符号均为已知元素
//! - 化学计量数有限且 > 0
//! - 重复元素合并，保持首次出现顺序
//!
//! ## 依赖关系
//! - 由 `parsers/formula.rs` 构造
//! - 被 `xray/resolver.rs`, `xray/calculator.rs` 使用
//! - 使用 `models/element.rs`

use crate::error::{Result, XrayError};
use crate::models::element::{self, Element};

/// 单个组分
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub element: &'static Element,
    pub count: f64,
}

/// 材料组成
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// 原始化学式
    formula: String,
    /// 组分列表（按首次出现顺序）
    components: Vec<Component>,
}

impl Composition {
    /// 从 (符号, 计量数) 列表构造，合并重复元素
    pub fn from_counts<'a, I>(formula: &str, counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut components: Vec<Component> = Vec::new();

        for (symbol, count) in counts {
            let element = element::element_by_symbol(symbol).ok_or_else(|| {
                XrayError::formula(formula, format!("unknown element '{}'", symbol))
            })?;

            if !count.is_finite() || count <= 0.0 {
                return Err(XrayError::formula(
                    formula,
                    format!("count for '{}' must be positive, got {}", symbol, count),
                ));
            }

            match components
                .iter_mut()
                .find(|c| c.element.symbol == element.symbol)
            {
                Some(existing) => existing.count += count,
                None => components.push(Component { element, count }),
            }
        }

        if components.is_empty() {
            return Err(XrayError::formula(formula, "no elements found"));
        }

        Ok(Self {
            formula: formula.to_string(),
            components,
        })
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// 元素符号列表
    pub fn symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.iter().map(|c| c.element.symbol)
    }

    /// 某元素的计量数，不存在返回 None
    pub fn count(&self, symbol: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.element.symbol == symbol)
            .map(|c| c.count)
    }

    /// 分子量 (g/mol)
    pub fn molecular_weight(&self) -> f64 {
        self.components
            .iter()
            .map(|c| c.count * c.element.atomic_weight)
            .sum()
    }

    /// 每个分子式单元的总电子数 Σ nᵢZᵢ
    pub fn total_electrons(&self) -> f64 {
        self.components
            .iter()
            .map(|c| c.count * c.element.atomic_number as f64)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .components
            .iter()
            .map(|c| {
                if (c.count - 1.0).abs() < 1e-12 {
                    c.element.symbol.to_string()
                } else {
                    format!("{}{}", c.element.symbol, c.count)
                }
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_repeated_elements() {
        let counts = [("C", 1.0), ("H", 3.0), ("C", 1.0), ("H", 3.0)];
        let comp = Composition::from_counts("CH3CH3", counts).unwrap();
        assert_eq!(comp.len(), 2);
        assert_eq!(comp.count("C"), Some(2.0));
        assert_eq!(comp.count("H"), Some(6.0));
        assert_eq!(comp.symbols().collect::<Vec<_>>(), vec!["C", "H"]);
    }

    #[test]
    fn test_sio2_weight_and_electrons() {
        let comp = Composition::from_counts("SiO2", [("Si", 1.0), ("O", 2.0)]).unwrap();
        assert!((comp.molecular_weight() - 60.083).abs() < 1e-3);
        assert!((comp.total_electrons() - 30.0).abs() < 1e-12);
        assert_eq!(comp.to_string(), "Si O2");
    }

    #[test]
    fn test_rejects_non_positive_count() {
        let err = Composition::from_counts("O0", [("O", 0.0)]).unwrap_err();
        assert!(matches!(err, XrayError::Formula { .. }));
    }
}
