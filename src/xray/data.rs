//! # 元素散射因子数据加载
//!
//! 从外部参考数据集读取每个元素的 (E, f1, f2) 表。
//!
//! ## 数据格式
//! 每个元素一个文件 `<symbol>.nff`（小写符号），逗号分隔，首行为表头：
//! ```text
//! E,f1,f2
//! 10.0,-9999.0,1.2
//! ...
//! ```
//! 能量单位 eV，严格递增。
//!
//! 本模块不做缓存，缓存由 `xray/cache.rs` 负责。
//!
//! ## 依赖关系
//! - 被 `xray/cache.rs` 调用
//! - 使用 `csv` 读取表格
//! - 使用 `models/element.rs` 校验元素符号

use crate::error::{Result, XrayError};
use crate::models::element;

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 单个元素的散射因子表
#[derive(Debug, Clone, PartialEq)]
pub struct ElementScatteringTable {
    symbol: String,
    /// 能量网格 (eV)，严格递增
    energy_ev: Vec<f64>,
    f1: Vec<f64>,
    f2: Vec<f64>,
}

impl ElementScatteringTable {
    /// 构造并校验散射因子表
    pub fn new(symbol: &str, energy_ev: Vec<f64>, f1: Vec<f64>, f2: Vec<f64>) -> Result<Self> {
        let malformed = |reason: String| XrayError::DataFile {
            element: symbol.to_string(),
            reason,
        };

        if energy_ev.len() != f1.len() || energy_ev.len() != f2.len() {
            return Err(malformed(format!(
                "column lengths differ (E={}, f1={}, f2={})",
                energy_ev.len(),
                f1.len(),
                f2.len()
            )));
        }
        if energy_ev.len() < 2 {
            return Err(malformed(format!(
                "need at least 2 rows, got {}",
                energy_ev.len()
            )));
        }
        if let Some(i) = (0..energy_ev.len())
            .find(|&i| !energy_ev[i].is_finite() || !f1[i].is_finite() || !f2[i].is_finite())
        {
            return Err(malformed(format!("non-finite value in row {}", i + 1)));
        }
        if let Some(w) = energy_ev.windows(2).position(|w| w[1] <= w[0]) {
            return Err(malformed(format!(
                "energy grid not strictly increasing at row {} ({} eV)",
                w + 2,
                energy_ev[w + 1]
            )));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            energy_ev,
            f1,
            f2,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn energy_ev(&self) -> &[f64] {
        &self.energy_ev
    }

    pub fn f1(&self) -> &[f64] {
        &self.f1
    }

    pub fn f2(&self) -> &[f64] {
        &self.f2
    }

    pub fn len(&self) -> usize {
        self.energy_ev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_ev.is_empty()
    }

    /// 表格能量范围 (keV)
    pub fn energy_range_kev(&self) -> (f64, f64) {
        (
            self.energy_ev[0] / 1000.0,
            self.energy_ev[self.energy_ev.len() - 1] / 1000.0,
        )
    }
}

/// 元素散射因子数据源
///
/// 实现者只负责读取，不负责缓存。
pub trait ElementDataSource: Send + Sync {
    /// 读取元素的散射因子表，无数据时返回 `UnknownElement`
    fn load(&self, symbol: &str) -> Result<ElementScatteringTable>;

    /// 数据源描述（日志用）
    fn describe(&self) -> String;
}

impl<T: ElementDataSource + ?Sized> ElementDataSource for Arc<T> {
    fn load(&self, symbol: &str) -> Result<ElementScatteringTable> {
        (**self).load(symbol)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

// ─────────────────────────────────────────────────────────────
// 目录数据源
// ─────────────────────────────────────────────────────────────

/// 从目录读取 `<symbol>.nff` 文件
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 元素对应的数据文件路径
    pub fn table_path(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{}.nff", symbol.to_lowercase()))
    }
}

impl ElementDataSource for DirectorySource {
    fn load(&self, symbol: &str) -> Result<ElementScatteringTable> {
        element::lookup(symbol)?;

        let path = self.table_path(symbol);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(XrayError::UnknownElement {
                    element: symbol.to_string(),
                })
            }
            Err(e) => {
                return Err(XrayError::FileRead {
                    path: path.display().to_string(),
                    source: Arc::new(e),
                })
            }
        };

        parse_table(symbol, file)
    }

    fn describe(&self) -> String {
        format!("directory '{}'", self.root.display())
    }
}

/// 从 CSV 读取散射因子表（列顺序: E(eV), f1, f2）
pub fn parse_table<R: std::io::Read>(symbol: &str, reader: R) -> Result<ElementScatteringTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut energy = Vec::new();
    let mut f1 = Vec::new();
    let mut f2 = Vec::new();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() < 3 {
            return Err(XrayError::DataFile {
                element: symbol.to_string(),
                reason: format!("row {} has {} columns, expected 3", row + 2, record.len()),
            });
        }

        let mut values = [0.0; 3];
        for (i, value) in values.iter_mut().enumerate() {
            *value = record[i].parse().map_err(|_| XrayError::DataFile {
                element: symbol.to_string(),
                reason: format!("row {}: '{}' is not a number", row + 2, &record[i]),
            })?;
        }

        energy.push(values[0]);
        f1.push(values[1]);
        f2.push(values[2]);
    }

    ElementScatteringTable::new(symbol, energy, f1, f2)
}

// ─────────────────────────────────────────────────────────────
// 内存数据源
// ─────────────────────────────────────────────────────────────

/// 内存中的散射因子表集合
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, ElementScatteringTable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一张表（同名覆盖）
    pub fn with_table(mut self, table: ElementScatteringTable) -> Self {
        self.insert(table);
        self
    }

    pub fn insert(&mut self, table: ElementScatteringTable) {
        self.tables.insert(table.symbol().to_string(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl ElementDataSource for MemorySource {
    fn load(&self, symbol: &str) -> Result<ElementScatteringTable> {
        self.tables
            .get(symbol)
            .cloned()
            .ok_or_else(|| XrayError::UnknownElement {
                element: symbol.to_string(),
            })
    }

    fn describe(&self) -> String {
        format!("memory ({} tables)", self.tables.len())
    }
}
