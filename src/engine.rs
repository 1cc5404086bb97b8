//! # 计算引擎
//!
//! 应用根对象：持有插值器缓存，并将其注入解析器、计算器和批量调度器。
//! 不使用进程级全局缓存，缓存的生命周期等于引擎的生命周期。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 组合 `xray/` 与 `batch/` 各组件

use crate::batch::{
    BatchConfig, BatchDispatcher, BatchReport, CalculationJob, JobRecord, MemoryMonitor,
};
use crate::error::{Result, XrayError};
use crate::models::XRayResult;
use crate::xray::data::{DirectorySource, ElementDataSource};
use crate::xray::{CacheStatistics, InterpolatorCache, MaterialCalculator, ScatteringFactorResolver};

use std::path::PathBuf;
use std::sync::Arc;

/// 能量输入
#[derive(Debug, Clone, PartialEq)]
pub enum EnergyInput {
    /// 所有任务使用同一个能量
    Scalar(f64),
    /// 所有任务使用同一组能量
    Shared(Vec<f64>),
    /// 每个任务各自的能量
    PerJob(Vec<Vec<f64>>),
}

impl From<f64> for EnergyInput {
    fn from(e: f64) -> Self {
        EnergyInput::Scalar(e)
    }
}

impl From<Vec<f64>> for EnergyInput {
    fn from(e: Vec<f64>) -> Self {
        EnergyInput::Shared(e)
    }
}

impl From<&[f64]> for EnergyInput {
    fn from(e: &[f64]) -> Self {
        EnergyInput::Shared(e.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for EnergyInput {
    fn from(e: Vec<Vec<f64>>) -> Self {
        EnergyInput::PerJob(e)
    }
}

impl EnergyInput {
    /// 第 i 个任务的能量
    fn for_job(&self, i: usize) -> Vec<f64> {
        match self {
            EnergyInput::Scalar(e) => vec![*e],
            EnergyInput::Shared(v) => v.clone(),
            EnergyInput::PerJob(v) => v[i].clone(),
        }
    }
}

/// 由并行数组组装任务列表
pub fn build_jobs(
    formulas: &[String],
    energies: &EnergyInput,
    densities: &[f64],
) -> Result<Vec<CalculationJob>> {
    if formulas.len() != densities.len() {
        return Err(XrayError::Validation(format!(
            "{} formulas but {} densities",
            formulas.len(),
            densities.len()
        )));
    }
    if let EnergyInput::PerJob(v) = energies {
        if v.len() != formulas.len() {
            return Err(XrayError::Validation(format!(
                "{} formulas but {} energy arrays",
                formulas.len(),
                v.len()
            )));
        }
    }

    Ok(formulas
        .iter()
        .zip(densities)
        .enumerate()
        .map(|(i, (formula, &density))| {
            CalculationJob::new(formula.clone(), energies.for_job(i), density)
        })
        .collect())
}

/// X 射线光学性质计算引擎
#[derive(Debug, Clone)]
pub struct XrayEngine {
    cache: Arc<InterpolatorCache>,
    calculator: MaterialCalculator,
    monitor: MemoryMonitor,
}

impl XrayEngine {
    /// 使用给定数据源创建引擎
    pub fn new(source: Arc<dyn ElementDataSource>) -> Self {
        let cache = Arc::new(InterpolatorCache::new(source));
        let resolver = Arc::new(ScatteringFactorResolver::new(Arc::clone(&cache)));
        Self {
            cache,
            calculator: MaterialCalculator::new(resolver),
            monitor: MemoryMonitor::default(),
        }
    }

    /// 从数据目录创建引擎
    pub fn from_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(DirectorySource::new(dir)))
    }

    pub fn with_monitor(mut self, monitor: MemoryMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn cache(&self) -> &Arc<InterpolatorCache> {
        &self.cache
    }

    pub fn calculator(&self) -> &MaterialCalculator {
        &self.calculator
    }

    /// 单个化学式的计算，错误直接返回给调用者
    pub fn compute_single(
        &self,
        formula: &str,
        energies: impl Into<EnergyInput>,
        density: f64,
    ) -> Result<XRayResult> {
        let energies = match energies.into() {
            EnergyInput::Scalar(e) => vec![e],
            EnergyInput::Shared(v) => v,
            EnergyInput::PerJob(_) => {
                return Err(XrayError::Validation(
                    "per-job energies need a batch computation".to_string(),
                ))
            }
        };
        self.calculator.compute(formula, &energies, density)
    }

    /// 批量计算
    pub fn compute_batch(
        &self,
        formulas: &[String],
        energies: impl Into<EnergyInput>,
        densities: &[f64],
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        let jobs = build_jobs(formulas, &energies.into(), densities)?;
        self.run_jobs(jobs, config)
    }

    /// 执行已组装的任务列表
    pub fn run_jobs(&self, jobs: Vec<CalculationJob>, config: &BatchConfig) -> Result<BatchReport> {
        self.dispatcher().run_batch(jobs, config)
    }

    /// 执行从输入文件读取的任务记录，被拒绝的记录计为失败
    pub fn run_records(
        &self,
        records: Vec<JobRecord>,
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        self.dispatcher().run_records(records, config)
    }

    fn dispatcher(&self) -> BatchDispatcher {
        BatchDispatcher::new(self.calculator.clone()).with_monitor(self.monitor.clone())
    }

    /// 清空插值器缓存
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStatistics {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testutil::{sloped_table, CountingSource};
    use crate::xray::data::MemorySource;

    fn engine() -> (Arc<CountingSource>, XrayEngine) {
        let source = ["Si", "O", "Al", "Ti"]
            .iter()
            .fold(MemorySource::new(), |s, sym| s.with_table(sloped_table(sym)));
        let counting = Arc::new(CountingSource::new(source));
        (counting.clone(), XrayEngine::new(counting))
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() <= 1e-12 * y.abs().max(f64::MIN_POSITIVE), "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_single_matches_batch() {
        let (_, engine) = engine();
        let single = engine.compute_single("SiO2", 8.048, 2.2).unwrap();

        for threshold in [1, 20] {
            let config = BatchConfig::default().with_parallel_threshold(threshold);
            let report = engine
                .compute_batch(&strings(&["SiO2"]), 8.048, &[2.2], &config)
                .unwrap();
            let batch = report.get(0).unwrap().as_ref().unwrap();

            assert_eq!(batch.formula, single.formula);
            assert_close(&batch.dispersion_delta, &single.dispersion_delta);
            assert_close(&batch.absorption_beta, &single.absorption_beta);
            assert_close(&batch.critical_angle_degrees, &single.critical_angle_degrees);
            assert_close(&batch.attenuation_length_cm, &single.attenuation_length_cm);
            assert_close(&batch.real_sld_per_ang2, &single.real_sld_per_ang2);
        }
    }

    #[test]
    fn test_energy_input_shapes() {
        let (_, engine) = engine();
        let formulas = strings(&["SiO2", "Al2O3", "TiO2"]);
        let densities = [2.2, 3.95, 4.23];
        let config = BatchConfig::default();

        let shared = engine
            .compute_batch(&formulas, vec![5.0, 10.0], &densities, &config)
            .unwrap();
        assert!(shared.successes().all(|(_, r)| r.len() == 2));

        let per_job = vec![vec![5.0], vec![5.0, 8.0], vec![5.0, 8.0, 12.0]];
        let report = engine
            .compute_batch(&formulas, per_job, &densities, &config)
            .unwrap();
        let lens: Vec<usize> = report.successes().map(|(_, r)| r.len()).collect();
        assert_eq!(lens, vec![1, 2, 3]);

        let err = engine
            .compute_batch(&formulas, vec![vec![5.0]], &densities, &config)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = engine
            .compute_batch(&formulas, 5.0, &densities[..2], &config)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_single_job_errors_propagate() {
        let (_, engine) = engine();
        let err = engine.compute_single("SiO2", 50.0, 2.2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Energy);

        let err = engine.compute_single("FeO", 10.0, 5.7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownElement);
    }

    #[test]
    fn test_cache_is_shared_and_clearable() {
        let (source, engine) = engine();
        engine.compute_single("SiO2", vec![5.0, 10.0], 2.2).unwrap();
        engine
            .compute_batch(
                &strings(&["SiO2"; 25]),
                10.0,
                &[2.2; 25],
                &BatchConfig::default(),
            )
            .unwrap();

        assert_eq!(source.total_loads(), 2);
        let stats = engine.cache_stats();
        assert_eq!(stats.cached_elements, 2);
        assert!(stats.hits > 0);

        engine.clear_cache();
        assert_eq!(engine.cache_stats().cached_elements, 0);

        engine.compute_single("SiO2", 10.0, 2.2).unwrap();
        assert_eq!(source.total_loads(), 4);
        assert_eq!(engine.cache_stats().preloaded, 2);
    }
}
