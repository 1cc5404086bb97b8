//! # 能量规格解析器
//!
//! 解析命令行与批量输入中的能量字符串（单位 keV）。
//!
//! ## 支持格式
//! - 单值: `10.0`
//! - 逗号分隔: `5.0,10.0,15.0`
//! - 线性范围: `5-15:11`（5 到 15 keV 共 11 点）
//! - 对数范围: `1-30:100:log`
//!
//! ## 依赖关系
//! - 被 `commands/calc.rs` 和 `batch/input.rs` 调用
//! - 使用 `regex` 匹配范围格式

use crate::error::{Result, XrayError};

use regex::Regex;
use std::sync::LazyLock;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d*\.?\d+)\s*-\s*(\d*\.?\d+)\s*:\s*(\d+)\s*(?::\s*(lin|linear|log)\s*)?$")
        .expect("static regex")
});

/// 解析能量规格字符串
pub fn parse_energy_spec(spec: &str) -> Result<Vec<f64>> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(XrayError::Energy("empty energy specification".to_string()));
    }

    if let Some(caps) = RANGE_PATTERN.captures(spec) {
        let start = parse_value(&caps[1])?;
        let end = parse_value(&caps[2])?;
        let count: usize = caps[3]
            .parse()
            .map_err(|_| XrayError::Energy(format!("invalid point count in '{}'", spec)))?;
        let log = caps.get(4).map(|m| m.as_str() == "log").unwrap_or(false);

        if count == 0 {
            return Err(XrayError::Energy(format!("point count must be >= 1 in '{}'", spec)));
        }
        if end < start {
            return Err(XrayError::Energy(format!("range end below start in '{}'", spec)));
        }

        return Ok(if log {
            logspace(start, end, count)
        } else {
            linspace(start, end, count)
        });
    }

    spec.split(',').map(|s| parse_value(s.trim())).collect()
}

fn parse_value(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| XrayError::Energy(format!("'{}' is not a number", text)))
}

/// 线性等间距点，首尾精确等于 `start` 与 `end`
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![start];
    }
    let step = (end - start) / (count - 1) as f64;
    let mut points: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
    pin_endpoints(&mut points, start, end);
    points
}

/// 对数等间距点，首尾精确等于 `start` 与 `end`
pub fn logspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    let mut points: Vec<f64> = linspace(start.log10(), end.log10(), count)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect();
    pin_endpoints(&mut points, start, end);
    points
}

// 浮点累积误差会让端点落到区间外，例如 10^log10(0.03) != 0.03
fn pin_endpoints(points: &mut [f64], start: f64, end: f64) {
    if let Some(first) = points.first_mut() {
        *first = start;
    }
    if points.len() > 1 {
        if let Some(last) = points.last_mut() {
            *last = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_list() {
        assert_eq!(parse_energy_spec("10.0").unwrap(), vec![10.0]);
        assert_eq!(parse_energy_spec("5, 10,15").unwrap(), vec![5.0, 10.0, 15.0]);
    }

    #[test]
    fn test_linear_range() {
        let e = parse_energy_spec("5-15:11").unwrap();
        assert_eq!(e.len(), 11);
        assert!((e[0] - 5.0).abs() < 1e-12);
        assert!((e[1] - 6.0).abs() < 1e-12);
        assert!((e[10] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_range() {
        let e = parse_energy_spec("1-100:3:log").unwrap();
        assert_eq!(e.len(), 3);
        assert!((e[0] - 1.0).abs() < 1e-9);
        assert!((e[1] - 10.0).abs() < 1e-9);
        assert!((e[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_range_endpoints_are_exact() {
        for spec in ["0.03-30:100:log", "0.03-30:7:log", "1-30:100:log", "0.03-30:1000"] {
            let e = parse_energy_spec(spec).unwrap();
            assert!(e.iter().all(|&x| (0.03..=30.0).contains(&x)), "{} left the range", spec);
            assert_eq!(*e.last().unwrap(), 30.0);
        }
        assert_eq!(parse_energy_spec("0.03-30:100:log").unwrap()[0], 0.03);
        assert_eq!(parse_energy_spec("1-30:100:log").unwrap()[0], 1.0);
        assert_eq!(parse_energy_spec("2.5-2.5:1:log").unwrap(), vec![2.5]);
    }

    #[test]
    fn test_invalid_specs() {
        for bad in ["", "abc", "5,x", "15-5:3", "5-15:0"] {
            assert!(
                matches!(parse_energy_spec(bad), Err(XrayError::Energy(_))),
                "expected energy error for {:?}",
                bad
            );
        }
    }
}
