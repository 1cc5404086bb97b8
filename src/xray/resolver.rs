//! # 散射因子解析
//!
//! 给定材料组成和能量数组，返回每个元素在各能量点的 f1/f2，
//! 以及按化学计量数加权的总散射因子 Σ nᵢf1ᵢ、Σ nᵢf2ᵢ。
//!
//! 解析前只预热该化学式包含的元素，已缓存的元素直接跳过。
//!
//! ## 依赖关系
//! - 被 `xray/calculator.rs` 使用
//! - 使用 `xray/cache.rs` 获取插值器

use crate::error::Result;
use crate::models::Composition;
use crate::xray::cache::InterpolatorCache;

use std::sync::Arc;

/// 单个元素的散射因子
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFactors {
    pub symbol: &'static str,
    /// 化学计量数
    pub count: f64,
    pub f1: Vec<f64>,
    pub f2: Vec<f64>,
}

/// 一个化学式在一组能量下的散射因子
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFactors {
    /// 按组成顺序排列
    pub elements: Vec<ElementFactors>,
    /// Σ nᵢ f1ᵢ
    pub total_f1: Vec<f64>,
    /// Σ nᵢ f2ᵢ
    pub total_f2: Vec<f64>,
}

impl ResolvedFactors {
    pub fn element(&self, symbol: &str) -> Option<&ElementFactors> {
        self.elements.iter().find(|e| e.symbol == symbol)
    }
}

/// 散射因子解析器
#[derive(Debug)]
pub struct ScatteringFactorResolver {
    cache: Arc<InterpolatorCache>,
}

impl ScatteringFactorResolver {
    pub fn new(cache: Arc<InterpolatorCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<InterpolatorCache> {
        &self.cache
    }

    /// 解析组成中每个元素在 `energies_kev` 处的 f1/f2
    pub fn resolve(
        &self,
        composition: &Composition,
        energies_kev: &[f64],
    ) -> Result<ResolvedFactors> {
        self.cache.warm_formula(composition)?;

        let n = energies_kev.len();
        let mut total_f1 = vec![0.0; n];
        let mut total_f2 = vec![0.0; n];
        let mut elements = Vec::with_capacity(composition.len());

        for component in composition.components() {
            let symbol = component.element.symbol;
            let interpolator = self.cache.get_interpolator(symbol)?;
            let (f1, f2) = interpolator.evaluate(energies_kev)?;

            for i in 0..n {
                total_f1[i] += component.count * f1[i];
                total_f2[i] += component.count * f2[i];
            }

            elements.push(ElementFactors {
                symbol,
                count: component.count,
                f1,
                f2,
            });
        }

        Ok(ResolvedFactors {
            elements,
            total_f1,
            total_f2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XrayError;
    use crate::parsers::parse_formula;
    use crate::testutil::{sloped_table, CountingSource};
    use crate::xray::data::{ElementScatteringTable, MemorySource};

    fn resolver(source: MemorySource) -> (Arc<CountingSource>, ScatteringFactorResolver) {
        let counting = Arc::new(CountingSource::new(source));
        let cache = Arc::new(InterpolatorCache::new(counting.clone()));
        (counting, ScatteringFactorResolver::new(cache))
    }

    fn sloped(symbols: &[&str]) -> MemorySource {
        symbols
            .iter()
            .fold(MemorySource::new(), |s, sym| s.with_table(sloped_table(sym)))
    }

    #[test]
    fn test_total_is_stoichiometry_weighted_sum() {
        let (_, resolver) = resolver(sloped(&["Si", "O", "Ca", "H"]));
        let energies = [0.5, 1.234, 8.048, 17.5];

        let composition = parse_formula("Ca(OH)2SiO2").unwrap();
        let resolved = resolver.resolve(&composition, &energies).unwrap();

        // 单独解析每个元素
        for (i, _) in energies.iter().enumerate() {
            let mut f1 = 0.0;
            let mut f2 = 0.0;
            for c in composition.components() {
                let single = parse_formula(c.element.symbol).unwrap();
                let alone = resolver.resolve(&single, &energies).unwrap();
                f1 += c.count * alone.total_f1[i];
                f2 += c.count * alone.total_f2[i];
            }
            assert!((resolved.total_f1[i] - f1).abs() <= 1e-12 * f1.abs());
            assert!((resolved.total_f2[i] - f2).abs() <= 1e-12 * f2.abs());
        }

        assert_eq!(resolved.element("O").unwrap().count, 4.0);
        assert_eq!(resolved.element("Si").unwrap().f1.len(), energies.len());
    }

    #[test]
    fn test_first_resolution_warms_only_formula_elements() {
        let (source, resolver) = resolver(sloped(&["Si", "O", "Fe", "Au"]));
        let composition = parse_formula("SiO2").unwrap();

        resolver.resolve(&composition, &[10.0]).unwrap();
        assert_eq!(source.total_loads(), 2);
        assert!(!resolver.cache().is_cached("Fe"));

        let stats = resolver.cache().stats();
        assert_eq!(stats.preloaded, 2);
        assert_eq!(stats.lazy_loaded, 0);

        // 第二次解析全部命中
        resolver.resolve(&composition, &[5.0, 10.0]).unwrap();
        assert_eq!(source.total_loads(), 2);
    }

    #[test]
    fn test_cleared_cache_is_warmed_again() {
        let (source, resolver) = resolver(sloped(&["Si", "O"]));
        let composition = parse_formula("SiO2").unwrap();

        resolver.resolve(&composition, &[10.0]).unwrap();
        resolver.cache().clear();
        resolver.resolve(&composition, &[10.0]).unwrap();

        assert_eq!(source.total_loads(), 4);
        assert_eq!(resolver.cache().stats().preloaded, 2);
        assert_eq!(resolver.cache().stats().lazy_loaded, 0);
    }

    #[test]
    fn test_energy_outside_table_is_an_error() {
        let narrow = ElementScatteringTable::new(
            "Fe",
            vec![1000.0, 5000.0, 10000.0],
            vec![20.0, 24.0, 25.0],
            vec![3.0, 1.0, 0.5],
        )
        .unwrap();
        let (_, resolver) = resolver(MemorySource::new().with_table(narrow));
        let fe = parse_formula("Fe").unwrap();

        assert!(resolver.resolve(&fe, &[2.0, 9.9]).is_ok());
        for e in [0.5, 12.0] {
            let err = resolver.resolve(&fe, &[2.0, e]).unwrap_err();
            assert!(matches!(err, XrayError::EnergyRange { .. }), "got {:?}", err);
        }
    }

    #[test]
    fn test_missing_element_propagates() {
        let (_, resolver) = resolver(sloped(&["Si"]));
        let err = resolver
            .resolve(&parse_formula("SiC").unwrap(), &[1.0])
            .unwrap_err();
        assert!(matches!(err, XrayError::UnknownElement { .. }));
    }
}
