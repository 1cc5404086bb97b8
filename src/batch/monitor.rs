//! # 内存监控
//!
//! 采样进程常驻内存 (RSS)，供批量调度器决定分块大小。
//!
//! Linux 下读取 `/proc/self/status` 的 `VmRSS`；无法采样的平台视为内存充足。
//!
//! ## 依赖关系
//! - 被 `batch/dispatcher.rs` 使用
//! - 无外部模块依赖

use std::sync::Arc;

/// 默认告警阈值（占上限的比例）
pub const DEFAULT_WARN_FRACTION: f64 = 0.8;

/// 内存检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStatus {
    Ok,
    /// 超过告警阈值但未超限
    Warn,
    Exceeded,
}

/// 进程内存采样
pub trait MemoryProbe: Send + Sync {
    /// 当前常驻内存（字节），无法采样时返回 None
    fn resident_bytes(&self) -> Option<u64>;
}

/// 读取 `/proc/self/status`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStatusProbe;

impl MemoryProbe for ProcStatusProbe {
    fn resident_bytes(&self) -> Option<u64> {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        parse_vm_rss(&status)
    }
}

/// 从 status 文本中取 `VmRSS: <n> kB`
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

/// 内存监控器
#[derive(Clone)]
pub struct MemoryMonitor {
    probe: Arc<dyn MemoryProbe>,
    warn_fraction: f64,
}

impl std::fmt::Debug for MemoryMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMonitor")
            .field("warn_fraction", &self.warn_fraction)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryMonitor {
    fn default() -> Self {
        Self::with_probe(Arc::new(ProcStatusProbe))
    }
}

impl MemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            probe,
            warn_fraction: DEFAULT_WARN_FRACTION,
        }
    }

    pub fn with_warn_fraction(mut self, fraction: f64) -> Self {
        self.warn_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// 当前常驻内存（字节）
    pub fn usage_bytes(&self) -> Option<u64> {
        self.probe.resident_bytes()
    }

    /// 检查当前内存是否低于上限
    pub fn check(&self, limit_bytes: u64) -> MemoryStatus {
        self.check_with_headroom(limit_bytes, 0)
    }

    /// 检查当前内存加上预计新增 `extra_bytes` 后是否低于上限
    pub fn check_with_headroom(&self, limit_bytes: u64, extra_bytes: u64) -> MemoryStatus {
        let Some(usage) = self.usage_bytes() else {
            return MemoryStatus::Ok;
        };
        let projected = usage.saturating_add(extra_bytes);

        if projected > limit_bytes {
            MemoryStatus::Exceeded
        } else if projected as f64 >= limit_bytes as f64 * self.warn_fraction {
            MemoryStatus::Warn
        } else {
            MemoryStatus::Ok
        }
    }
}
