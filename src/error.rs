//! # 统一错误处理模块
//!
//! 定义 xraylab 的所有错误类型，使用 `thiserror` 派生。
//!
//! 错误类型实现 `Clone`：同一元素的加载失败需要分发给所有等待该元素的调用者，
//! 因此 I/O 与 CSV 错误源用 `Arc` 包装。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::sync::Arc;
use thiserror::Error;

/// xraylab 统一错误类型
#[derive(Error, Debug, Clone)]
pub enum XrayError {
    // ─────────────────────────────────────────────────────────────
    // 输入错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid formula '{formula}': {reason}")]
    Formula { formula: String, reason: String },

    #[error("Invalid energy: {0}")]
    Energy(String),

    #[error(
        "Energy {energy_kev} keV is outside the tabulated range of {element} ({min_kev}-{max_kev} keV)"
    )]
    EnergyRange {
        element: String,
        energy_kev: f64,
        min_kev: f64,
        max_kev: f64,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    // ─────────────────────────────────────────────────────────────
    // 计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Calculation failed for '{formula}': {reason}")]
    Calculation { formula: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unknown element: {element}")]
    UnknownElement { element: String },

    #[error("Malformed scattering table for {element}: {reason}")]
    DataFile { element: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 资源错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Memory limit of {limit_bytes} bytes cannot be honored (usage {usage_bytes} bytes at minimum chunk size)"
    )]
    Resource { limit_bytes: u64, usage_bytes: u64 },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileRead {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("CSV error: {0}")]
    Csv(#[source] Arc<csv::Error>),

    #[error("JSON error: {0}")]
    Json(String),
}

/// 错误类别，批量模式下用于统计失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Formula,
    Energy,
    EnergyRange,
    Validation,
    Calculation,
    UnknownElement,
    DataFile,
    Resource,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Formula => "formula",
            ErrorKind::Energy => "energy",
            ErrorKind::EnergyRange => "energy-range",
            ErrorKind::Validation => "validation",
            ErrorKind::Calculation => "calculation",
            ErrorKind::UnknownElement => "unknown-element",
            ErrorKind::DataFile => "data-file",
            ErrorKind::Resource => "resource",
            ErrorKind::Io => "io",
        };
        write!(f, "{}", name)
    }
}

impl XrayError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            XrayError::Formula { .. } => ErrorKind::Formula,
            XrayError::Energy(_) => ErrorKind::Energy,
            XrayError::EnergyRange { .. } => ErrorKind::EnergyRange,
            XrayError::Validation(_) => ErrorKind::Validation,
            XrayError::Calculation { .. } => ErrorKind::Calculation,
            XrayError::UnknownElement { .. } => ErrorKind::UnknownElement,
            XrayError::DataFile { .. } => ErrorKind::DataFile,
            XrayError::Resource { .. } => ErrorKind::Resource,
            XrayError::FileRead { .. }
            | XrayError::FileWrite { .. }
            | XrayError::Csv(_)
            | XrayError::Json(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn formula(formula: &str, reason: impl Into<String>) -> Self {
        XrayError::Formula {
            formula: formula.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn calculation(formula: &str, reason: impl Into<String>) -> Self {
        XrayError::Calculation {
            formula: formula.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for XrayError {
    fn from(e: csv::Error) -> Self {
        XrayError::Csv(Arc::new(e))
    }
}

impl From<serde_json::Error> for XrayError {
    fn from(e: serde_json::Error) -> Self {
        XrayError::Json(e.to_string())
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XrayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let e = XrayError::formula("Xx2", "unknown element 'Xx'");
        assert_eq!(e.kind(), ErrorKind::Formula);
        assert!(e.to_string().contains("Xx2"));

        let e = XrayError::UnknownElement {
            element: "Zz".to_string(),
        };
        assert_eq!(e.kind(), ErrorKind::UnknownElement);
    }

    #[test]
    fn test_io_error_survives_clone() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = XrayError::FileRead {
            path: "si.nff".to_string(),
            source: Arc::new(io),
        };
        let cloned = e.clone();
        assert_eq!(cloned.kind(), ErrorKind::Io);
        assert!(cloned.source().is_some());
    }
}
