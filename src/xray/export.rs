//! # 计算结果导出
//!
//! 将 XRayResult 按能量点展开为数据行，导出为 CSV 或 JSON。
//!
//! ## 支持格式
//! - CSV: 每个结果 × 能量点一行，可选字段子集与数值精度
//! - JSON: 数据行对象数组
//!
//! ## 依赖关系
//! - 被 `commands/calc.rs` 与 `commands/batch.rs` 调用
//! - 使用 `models/result.rs` 的 XRayResult, XRayRow
//! - 使用 `csv` 与 `serde_json`

use crate::error::{Result, XrayError};
use crate::models::{XRayResult, ROW_FIELDS};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// 默认数值精度
pub const DEFAULT_PRECISION: usize = 6;

/// 解析字段子集，None 或空列表表示全部字段
pub fn select_fields(fields: Option<&[String]>) -> Result<Vec<&'static str>> {
    let Some(fields) = fields.filter(|f| !f.is_empty()) else {
        return Ok(ROW_FIELDS.to_vec());
    };

    fields
        .iter()
        .map(|name| {
            ROW_FIELDS
                .iter()
                .copied()
                .find(|f| *f == name.as_str())
                .ok_or_else(|| {
                    XrayError::Validation(format!(
                        "unknown field '{}' (available: {})",
                        name,
                        ROW_FIELDS.join(", ")
                    ))
                })
        })
        .collect()
}

/// 写 CSV 到任意 writer
pub fn write_csv<'a, W, I>(writer: W, results: I, fields: &[&str], precision: usize) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a XRayResult>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(fields)?;

    for result in results {
        for row in result.rows() {
            let record: Vec<String> = fields
                .iter()
                .map(|f| row.field(f, precision).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }

    wtr.flush().map_err(|e| XrayError::FileWrite {
        path: "<csv>".to_string(),
        source: Arc::new(e),
    })?;
    Ok(())
}

/// 写 JSON 数据行数组到任意 writer
pub fn write_json<'a, W, I>(writer: W, results: I, fields: &[&str]) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a XRayResult>,
{
    let mut rows = Vec::new();
    for result in results {
        for row in result.rows() {
            let serde_json::Value::Object(mut map) = serde_json::to_value(&row)? else {
                continue;
            };
            map.retain(|k, _| fields.contains(&k.as_str()));
            rows.push(serde_json::Value::Object(map));
        }
    }

    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| XrayError::FileWrite {
            path: path.display().to_string(),
            source: Arc::new(e),
        })
}

/// 导出为 CSV 文件
pub fn to_csv<'a, I>(
    results: I,
    output_path: &Path,
    fields: &[&str],
    precision: usize,
) -> Result<()>
where
    I: IntoIterator<Item = &'a XRayResult>,
{
    write_csv(create(output_path)?, results, fields, precision)
}

/// 导出为 JSON 文件
pub fn to_json<'a, I>(results: I, output_path: &Path, fields: &[&str]) -> Result<()>
where
    I: IntoIterator<Item = &'a XRayResult>,
{
    let mut file = create(output_path)?;
    write_json(&mut file, results, fields)?;
    file.flush().map_err(|e| XrayError::FileWrite {
        path: output_path.display().to_string(),
        source: Arc::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XRayResult {
        XRayResult {
            formula: "SiO2".to_string(),
            density_g_cm3: 2.2,
            molecular_weight_g_mol: 60.083,
            total_electrons: 30.0,
            electron_density_per_ang3: 0.6615,
            energy_kev: vec![8.0, 10.0],
            wavelength_angstrom: vec![1.5498, 1.2398],
            dispersion_delta: vec![7.1e-6, 4.56e-6],
            absorption_beta: vec![1.2e-7, 7.6e-8],
            scattering_factor_f1: vec![30.0, 30.0],
            scattering_factor_f2: vec![0.5, 0.5],
            critical_angle_degrees: vec![0.216, 0.173],
            attenuation_length_cm: vec![0.0103, 0.0130],
            real_sld_per_ang2: vec![1.86e-5, 1.86e-5],
            imaginary_sld_per_ang2: vec![3.1e-7, 3.1e-7],
        }
    }

    #[test]
    fn test_select_fields() {
        assert_eq!(select_fields(None).unwrap().len(), ROW_FIELDS.len());
        let empty: Vec<String> = Vec::new();
        assert_eq!(select_fields(Some(empty.as_slice())).unwrap().len(), ROW_FIELDS.len());

        let wanted = vec!["energy_kev".to_string(), "formula".to_string()];
        let picked = select_fields(Some(wanted.as_slice())).unwrap();
        assert_eq!(picked, vec!["energy_kev", "formula"]);

        let bogus = vec!["bogus".to_string()];
        assert!(select_fields(Some(bogus.as_slice())).is_err());
    }

    #[test]
    fn test_csv_one_row_per_energy() {
        let result = sample();
        let mut buf = Vec::new();
        write_csv(&mut buf, [&result], &["formula", "energy_kev", "dispersion_delta"], 3).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "formula,energy_kev,dispersion_delta");
        assert_eq!(lines[1], "SiO2,8.000,7.100e-6");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_json_filters_fields() {
        let result = sample();
        let mut buf = Vec::new();
        write_json(&mut buf, [&result, &result], &["formula", "critical_angle_degrees"]).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].as_object().unwrap().len(), 2);
        assert_eq!(rows[1]["critical_angle_degrees"], 0.173);
    }

    #[test]
    fn test_file_export() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample();

        let csv_path = dir.path().join("out.csv");
        to_csv([&result], &csv_path, &ROW_FIELDS, DEFAULT_PRECISION).unwrap();
        assert_eq!(std::fs::read_to_string(&csv_path).unwrap().lines().count(), 3);

        let json_path = dir.path().join("out.json");
        to_json([&result], &json_path, &ROW_FIELDS).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value[0]["formula"], "SiO2");
    }
}
