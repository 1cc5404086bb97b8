//! 测试辅助：合成散射因子表与计数数据源

use crate::batch::monitor::MemoryProbe;
use crate::error::Result;
use crate::models::element;
use crate::xray::data::{ElementDataSource, ElementScatteringTable, MemorySource};

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 合成表能量网格 (eV)，覆盖 0.01-30 keV
pub const GRID_EV: [f64; 9] = [10.0, 30.0, 100.0, 300.0, 1000.0, 3000.0, 10000.0, 20000.0, 30000.0];

/// f1 = Z, f2 = Z / 60 的平坦合成表
pub fn flat_table(symbol: &str) -> ElementScatteringTable {
    let z = element::atomic_number(symbol).unwrap() as f64;
    ElementScatteringTable::new(
        symbol,
        GRID_EV.to_vec(),
        vec![z; GRID_EV.len()],
        vec![z / 60.0; GRID_EV.len()],
    )
    .unwrap()
}

/// 随能量变化的合成表（f1 上升趋近 Z，f2 下降）
pub fn sloped_table(symbol: &str) -> ElementScatteringTable {
    let z = element::atomic_number(symbol).unwrap() as f64;
    let f1 = GRID_EV.iter().map(|e| z * (1.0 - 1.0 / (1.0 + e / 100.0))).collect();
    let f2 = GRID_EV.iter().map(|e| z * 50.0 / e).collect();
    ElementScatteringTable::new(symbol, GRID_EV.to_vec(), f1, f2).unwrap()
}

pub fn synthetic_source(symbols: &[&str]) -> MemorySource {
    symbols
        .iter()
        .fold(MemorySource::new(), |src, s| src.with_table(flat_table(s)))
}

/// 记录每个元素被加载次数的数据源
pub struct CountingSource {
    inner: MemorySource,
    delay: Duration,
    counts: Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    pub fn new(inner: MemorySource) -> Self {
        Self {
            inner,
            delay: Duration::from_millis(20),
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn loads_of(&self, symbol: &str) -> usize {
        self.counts.lock().get(symbol).copied().unwrap_or(0)
    }

    pub fn total_loads(&self) -> usize {
        self.counts.lock().values().sum()
    }
}

impl ElementDataSource for CountingSource {
    fn load(&self, symbol: &str) -> Result<ElementScatteringTable> {
        *self.counts.lock().entry(symbol.to_string()).or_insert(0) += 1;
        // 放大并发窗口
        std::thread::sleep(self.delay);
        self.inner.load(symbol)
    }

    fn describe(&self) -> String {
        format!("counting {}", self.inner.describe())
    }
}

/// 返回固定内存占用的探针
pub struct FixedProbe(AtomicU64);

impl FixedProbe {
    pub fn new(bytes: u64) -> Self {
        Self(AtomicU64::new(bytes))
    }
}

impl MemoryProbe for FixedProbe {
    fn resident_bytes(&self) -> Option<u64> {
        Some(self.0.load(Ordering::Relaxed))
    }
}

/// 依次返回预设读数，读完后一直返回 `then`
pub struct ScriptedProbe {
    readings: Mutex<VecDeque<u64>>,
    then: u64,
}

impl ScriptedProbe {
    pub fn new(readings: Vec<u64>, then: u64) -> Self {
        Self {
            readings: Mutex::new(readings.into()),
            then,
        }
    }
}

impl MemoryProbe for ScriptedProbe {
    fn resident_bytes(&self) -> Option<u64> {
        Some(self.readings.lock().pop_front().unwrap_or(self.then))
    }
}
