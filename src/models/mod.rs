//! # 数据模型模块
//!
//! 定义元素、材料组成和计算结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `xray/`, `batch/` 和 `commands/` 使用
//! - 子模块: element, composition, result

pub mod composition;
pub mod element;
pub mod result;

pub use composition::{Component, Composition};
pub use element::Element;
pub use result::{XRayResult, XRayRow, ROW_FIELDS};
