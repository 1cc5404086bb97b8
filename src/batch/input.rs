//! # 批量输入读取
//!
//! 从 CSV 读取计算任务，列为 `formula,density,energy`。
//! energy 列可为单值、逗号分隔列表（需加引号）或范围规格。
//!
//! ## 依赖关系
//! - 被 `commands/batch.rs` 调用
//! - 使用 `parsers/energy.rs` 解析能量列
//! - 使用 `csv` 与 `serde` 反序列化

use crate::batch::dispatcher::{CalculationJob, JobRecord, RejectedJob};
use crate::error::{Result, XrayError};
use crate::parsers::parse_energy_spec;

use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct InputRow {
    formula: String,
    density: String,
    energy: String,
}

impl InputRow {
    /// `line` 从表头之后的第一条记录记为 2，不计注释行
    fn into_record(self, line: usize) -> JobRecord {
        let reject = |error: XrayError| RejectedJob {
            formula: self.formula.clone(),
            error,
        };

        let density = self.density.parse::<f64>().map_err(|_| {
            reject(XrayError::Validation(format!(
                "row {}: density '{}' is not a number",
                line, self.density
            )))
        })?;
        let energies = parse_energy_spec(&self.energy)
            .map_err(|e| reject(XrayError::Energy(format!("row {}: {}", line, e))))?;

        Ok(CalculationJob::new(self.formula, energies, density))
    }
}

/// 从任意 reader 读取任务记录
///
/// 单元格内容无效的行作为被拒绝的记录返回，不影响其它行；
/// 只有 CSV 结构错误或读取失败时返回 `Err`。
pub fn read_jobs<R: std::io::Read>(reader: R) -> Result<Vec<JobRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.deserialize::<InputRow>() {
        let row = row?;
        let line = records.len() + 2;
        records.push(row.into_record(line));
    }

    let rejected = records.iter().filter(|r| r.is_err()).count();
    tracing::debug!(records = records.len(), rejected, "read batch input");
    Ok(records)
}

/// 从 CSV 文件读取任务记录
pub fn read_jobs_from_path(path: &Path) -> Result<Vec<JobRecord>> {
    let file = File::open(path).map_err(|e| XrayError::FileRead {
        path: path.display().to_string(),
        source: Arc::new(e),
    })?;
    read_jobs(file)
}
