//! # 化学式解析器
//!
//! 将化学式字符串解析为 `Composition`。
//!
//! ## 语法
//! ```text
//! formula := term+
//! term    := (element | '(' formula ')') count?
//! element := [A-Z][a-z]*
//! count   := [0-9]+ ('.' [0-9]*)? | '.' [0-9]+
//! ```
//! 例: `SiO2`, `Al2O3`, `Ca(OH)2`, `CuSO4(H2O)5`, `Si0.5Ge0.5`
//!
//! ## 依赖关系
//! - 被 `xray/calculator.rs` 和 `commands/formula.rs` 调用
//! - 使用 `models/composition.rs`

use crate::error::{Result, XrayError};
use crate::models::Composition;

/// 括号嵌套上限
const MAX_DEPTH: usize = 16;

/// 解析化学式
pub fn parse_formula(formula: &str) -> Result<Composition> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(XrayError::formula(formula, "formula is empty"));
    }

    let mut parser = FormulaParser {
        source: trimmed,
        chars: trimmed.chars().collect(),
        pos: 0,
    };

    let counts = parser.parse_sequence(0)?;
    if parser.pos < parser.chars.len() {
        // 只有多余的 ')' 会停在这里
        return Err(parser.error(format!(
            "unbalanced ')' at position {}",
            parser.pos + 1
        )));
    }

    Composition::from_counts(trimmed, counts.iter().map(|(s, n)| (s.as_str(), *n)))
}

struct FormulaParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl FormulaParser<'_> {
    fn error(&self, reason: impl Into<String>) -> XrayError {
        XrayError::formula(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// 解析一个项序列，遇到 ')' 或结尾停止
    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<(String, f64)>> {
        if depth > MAX_DEPTH {
            return Err(self.error("parentheses nested too deeply"));
        }

        let mut counts = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    let open = self.pos;
                    self.pos += 1;
                    let inner = self.parse_sequence(depth + 1)?;
                    if self.peek() != Some(')') {
                        return Err(self.error(format!("unclosed '(' at position {}", open + 1)));
                    }
                    self.pos += 1;
                    if inner.is_empty() {
                        return Err(self.error("empty parentheses"));
                    }
                    let multiplier = self.parse_count()?.unwrap_or(1.0);
                    counts.extend(inner.into_iter().map(|(s, n)| (s, n * multiplier)));
                }
                ')' => break,
                c if c.is_ascii_uppercase() => {
                    let symbol = self.parse_symbol();
                    let count = self.parse_count()?.unwrap_or(1.0);
                    counts.push((symbol, count));
                }
                c => {
                    return Err(self.error(format!(
                        "unexpected character '{}' at position {}",
                        c,
                        self.pos + 1
                    )));
                }
            }
        }

        Ok(counts)
    }

    fn parse_symbol(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while matches!(self.peek(), Some(c) if c.is_ascii_lowercase()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// 解析可选的计量数
    fn parse_count(&mut self) -> Result<Option<f64>> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let value: f64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid count '{}'", text)))?;

        if !value.is_finite() || value <= 0.0 {
            return Err(self.error(format!("count must be positive, got '{}'", text)));
        }
        Ok(Some(value))
    }
}
