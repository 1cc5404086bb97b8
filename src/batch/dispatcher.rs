//! # 批量调度器
//!
//! 执行一批 (化学式, 能量, 密度) 计算任务。
//!
//! ## 功能
//! - 任务数低于阈值时在调用线程上顺序执行，否则使用 rayon 线程池
//! - 按块提交任务，每块提交前检查内存，超限时块大小减半
//! - 单个任务失败只记录在该任务名下，不中断整批
//! - 结果按提交序号排序，同一化学式重复出现不会互相覆盖
//! - 最小块仍超出内存上限时停止提交后续块，已完成的结果保留在报告中
//!
//! ## 依赖关系
//! - 被 `engine.rs` 与 `commands/batch.rs` 调用
//! - 使用 `xray/calculator.rs` 执行单个任务
//! - 使用 `batch/monitor.rs` 检查内存
//! - 使用 `rayon` 线程池与 `crossbeam-channel` 回传结果
//! - 使用 `utils/progress.rs` 创建进度条

use crate::batch::monitor::{MemoryMonitor, MemoryStatus};
use crate::error::{ErrorKind, Result, XrayError};
use crate::models::XRayResult;
use crate::utils::progress;
use crate::xray::MaterialCalculator;

use indicatif::ProgressBar;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// 默认块大小
pub const DEFAULT_CHUNK_SIZE: usize = 100;
/// 默认并行阈值
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 20;
/// 默认内存上限 (4 GiB)
pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 4 * 1024 * 1024 * 1024;

// ─────────────────────────────────────────────────────────────
// 配置
// ─────────────────────────────────────────────────────────────

/// 批量执行配置
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// 每块任务数
    pub chunk_size: usize,
    /// 最大工作线程数
    pub max_workers: usize,
    /// 内存上限（字节）
    pub memory_limit_bytes: u64,
    /// 任务数达到该值时并行执行
    pub parallel_threshold: usize,
    /// 显示进度条
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_workers: num_cpus::get(),
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            show_progress: false,
        }
    }
}

impl BatchConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.chunk_size == 0, "chunk_size"),
            (self.max_workers == 0, "max_workers"),
            (self.memory_limit_bytes == 0, "memory_limit_bytes"),
            (self.parallel_threshold == 0, "parallel_threshold"),
        ];
        match checks.iter().find(|(bad, _)| *bad) {
            Some((_, name)) => Err(XrayError::Validation(format!(
                "batch config: {} must be greater than zero",
                name
            ))),
            None => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────
// 任务与结果
// ─────────────────────────────────────────────────────────────

/// 单个计算任务
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationJob {
    pub formula: String,
    /// 能量 (keV)
    pub energies_kev: Vec<f64>,
    /// 密度 (g/cm³)
    pub density: f64,
}

impl CalculationJob {
    pub fn new(formula: impl Into<String>, energies_kev: Vec<f64>, density: f64) -> Self {
        Self {
            formula: formula.into(),
            energies_kev,
            density,
        }
    }

    /// 结果的预估内存占用
    pub fn estimated_bytes(&self) -> u64 {
        XRayResult::estimated_bytes(self.energies_kev.len())
    }
}

/// 任务标识：提交序号 + 化学式，按序号排序
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobKey {
    pub index: usize,
    pub formula: String,
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.formula, self.index)
    }
}

/// 单个任务的错误
pub type JobError = XrayError;

/// 单个任务的结果
pub type JobOutcome = std::result::Result<XRayResult, JobError>;

/// 读取阶段即被拒绝的任务（例如能量列无法解析）
#[derive(Debug, Clone)]
pub struct RejectedJob {
    pub formula: String,
    pub error: JobError,
}

/// 读取得到的一条任务记录
pub type JobRecord = std::result::Result<CalculationJob, RejectedJob>;

/// 执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel { workers: usize },
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel { workers } => write!(f, "parallel ({} workers)", workers),
        }
    }
}

/// 批量执行统计
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    pub mode: ExecutionMode,
    /// 提交的块数
    pub chunks: usize,
    /// 结束时的块大小
    pub final_chunk_size: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 在调用线程上执行的任务数
    pub on_calling_thread: usize,
    /// 因内存上限中止而未提交的任务数
    pub unsubmitted: usize,
    pub elapsed: Duration,
}

impl BatchStats {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// 批量执行报告
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: BTreeMap<JobKey, JobOutcome>,
    pub stats: BatchStats,
    /// 提前停止提交的原因 (`Resource`)
    pub aborted: Option<XrayError>,
}

impl BatchReport {
    /// 所有任务都已提交
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 按提交序号取结果
    pub fn get(&self, index: usize) -> Option<&JobOutcome> {
        self.results
            .iter()
            .find(|(k, _)| k.index == index)
            .map(|(_, v)| v)
    }

    /// 成功的结果（按提交顺序）
    pub fn successes(&self) -> impl Iterator<Item = (&JobKey, &XRayResult)> {
        self.results
            .iter()
            .filter_map(|(k, v)| v.as_ref().ok().map(|r| (k, r)))
    }

    /// 失败的任务（按提交顺序）
    pub fn failures(&self) -> impl Iterator<Item = (&JobKey, &JobError)> {
        self.results
            .iter()
            .filter_map(|(k, v)| v.as_ref().err().map(|e| (k, e)))
    }

    /// 按错误类别统计失败数
    pub fn failure_counts(&self) -> HashMap<ErrorKind, usize> {
        let mut counts = HashMap::new();
        for (_, e) in self.failures() {
            *counts.entry(e.kind()).or_insert(0) += 1;
        }
        counts
    }
}

// ─────────────────────────────────────────────────────────────
// 调度器
// ─────────────────────────────────────────────────────────────

/// 批量调度器
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    calculator: MaterialCalculator,
    monitor: MemoryMonitor,
}

impl BatchDispatcher {
    pub fn new(calculator: MaterialCalculator) -> Self {
        Self {
            calculator,
            monitor: MemoryMonitor::default(),
        }
    }

    pub fn with_monitor(mut self, monitor: MemoryMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// 选择执行方式
    pub fn plan(job_count: usize, config: &BatchConfig) -> ExecutionMode {
        if job_count < config.parallel_threshold {
            ExecutionMode::Sequential
        } else {
            let workers = config.max_workers.min(num_cpus::get()).max(1);
            ExecutionMode::Parallel { workers }
        }
    }

    /// 执行一批任务
    ///
    /// 单个任务的错误记录在结果中，只有配置无效时返回 `Err`。
    /// 内存上限在块大小为 1 时仍无法满足则停止提交，`aborted` 记录
    /// `Resource` 错误，已完成的结果照常返回。
    pub fn run_batch(
        &self,
        jobs: Vec<CalculationJob>,
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        config.validate()?;

        let start = Instant::now();
        let total = jobs.len();
        let mode = Self::plan(total, config);
        tracing::info!(jobs = total, %mode, "starting batch");

        let pool = match mode {
            ExecutionMode::Sequential => None,
            ExecutionMode::Parallel { workers } => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("xraylab-worker-{}", i))
                    .build()
                    .map_err(|e| {
                        XrayError::Validation(format!("cannot start worker pool: {}", e))
                    })?,
            ),
        };

        let pb = if config.show_progress {
            progress::create_progress_bar(total as u64, "Calculating")
        } else {
            ProgressBar::hidden()
        };

        let caller = thread::current().id();
        let mut results = BTreeMap::new();
        let mut on_calling_thread = 0;
        let mut chunk_size = config.chunk_size;
        let mut chunks = 0;
        let mut pos = 0;
        let mut aborted = None;

        while pos < total {
            let limit = config.memory_limit_bytes;
            let size = match self.admit_chunk(&jobs[pos..], &mut chunk_size, limit) {
                Ok(size) => size,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        submitted = pos,
                        remaining = total - pos,
                        "memory limit cannot be met, stopping submission"
                    );
                    aborted = Some(e);
                    break;
                }
            };
            let chunk = &jobs[pos..pos + size];

            let outcomes = match &pool {
                None => self.run_sequential(chunk, pos, caller, &pb),
                Some(pool) => self.run_parallel(pool, chunk, pos, caller, &pb),
            };

            for (index, outcome, here) in outcomes {
                if here {
                    on_calling_thread += 1;
                }
                let key = JobKey {
                    index,
                    formula: jobs[index].formula.clone(),
                };
                if let Err(e) = &outcome {
                    tracing::warn!(job = %key, error = %e, "job failed");
                }
                results.insert(key, outcome);
            }

            chunks += 1;
            pos += size;
        }

        pb.finish_and_clear();

        let failed = results.values().filter(|r| r.is_err()).count();
        let stats = BatchStats {
            mode,
            chunks,
            final_chunk_size: chunk_size,
            succeeded: results.len() - failed,
            failed,
            on_calling_thread,
            unsubmitted: total - pos,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            chunks = stats.chunks,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "batch finished"
        );

        Ok(BatchReport {
            results,
            stats,
            aborted,
        })
    }

    /// 执行读取得到的任务记录
    ///
    /// 被拒绝的记录按其在输入中的序号记为失败，其余记录照常执行，
    /// 结果键的序号均为记录在输入中的位置。
    pub fn run_records(
        &self,
        records: Vec<JobRecord>,
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        let mut positions = Vec::with_capacity(records.len());
        let mut jobs = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            match record {
                Ok(job) => {
                    positions.push(index);
                    jobs.push(job);
                }
                Err(r) => {
                    let key = JobKey {
                        index,
                        formula: r.formula,
                    };
                    tracing::warn!(job = %key, error = %r.error, "job rejected before submission");
                    rejected.push((key, r.error));
                }
            }
        }

        let mut report = self.run_batch(jobs, config)?;
        report.results = std::mem::take(&mut report.results)
            .into_iter()
            .map(|(key, outcome)| {
                let key = JobKey {
                    index: positions[key.index],
                    formula: key.formula,
                };
                (key, outcome)
            })
            .collect();

        report.stats.failed += rejected.len();
        for (key, error) in rejected {
            report.results.insert(key, Err(error));
        }
        Ok(report)
    }

    /// 确定下一块的大小，内存不足时减半，块大小为 1 仍超限则报错
    fn admit_chunk(
        &self,
        remaining: &[CalculationJob],
        chunk_size: &mut usize,
        limit: u64,
    ) -> Result<usize> {
        loop {
            let size = (*chunk_size).min(remaining.len());
            let estimate: u64 = remaining[..size].iter().map(|j| j.estimated_bytes()).sum();

            match self.monitor.check_with_headroom(limit, estimate) {
                MemoryStatus::Ok => return Ok(size),
                MemoryStatus::Warn => {
                    tracing::warn!(
                        usage = self.monitor.usage_bytes().unwrap_or(0),
                        limit,
                        "memory usage above warning threshold"
                    );
                    return Ok(size);
                }
                MemoryStatus::Exceeded if size > 1 => {
                    *chunk_size = size / 2;
                    tracing::info!(
                        chunk_size = *chunk_size,
                        "memory limit reached, shrinking chunks"
                    );
                }
                MemoryStatus::Exceeded => {
                    let usage = self.monitor.usage_bytes().unwrap_or(0);
                    return Err(XrayError::Resource {
                        limit_bytes: limit,
                        usage_bytes: usage.saturating_add(estimate),
                    });
                }
            }
        }
    }

    fn run_one(&self, job: &CalculationJob) -> JobOutcome {
        self.calculator
            .compute(&job.formula, &job.energies_kev, job.density)
    }

    fn run_sequential(
        &self,
        chunk: &[CalculationJob],
        offset: usize,
        caller: ThreadId,
        pb: &ProgressBar,
    ) -> Vec<(usize, JobOutcome, bool)> {
        chunk
            .iter()
            .enumerate()
            .map(|(i, job)| {
                let outcome = self.run_one(job);
                pb.inc(1);
                (offset + i, outcome, thread::current().id() == caller)
            })
            .collect()
    }

    fn run_parallel(
        &self,
        pool: &rayon::ThreadPool,
        chunk: &[CalculationJob],
        offset: usize,
        caller: ThreadId,
        pb: &ProgressBar,
    ) -> Vec<(usize, JobOutcome, bool)> {
        let (tx, rx) = crossbeam_channel::unbounded();

        pool.scope(|s| {
            for (i, job) in chunk.iter().enumerate() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let outcome = self.run_one(job);
                    pb.inc(1);
                    // 接收端在 scope 结束前一直存在
                    let _ = tx.send((offset + i, outcome, thread::current().id() == caller));
                });
            }
        });
        drop(tx);

        rx.into_iter().collect()
    }
}
