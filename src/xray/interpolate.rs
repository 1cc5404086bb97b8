//! # 单调三次插值 (PCHIP)
//!
//! 分段三次 Hermite 插值，节点斜率采用 Fritsch–Carlson 加权调和平均，
//! 保证在单调区间内不产生过冲。吸收边附近 f1/f2 急剧变化，
//! 普通三次样条会在边前后产生振荡。
//!
//! 超出表格能量范围时返回 `EnergyRange` 错误，不做外推。
//!
//! ## 依赖关系
//! - 被 `xray/cache.rs` 构造并缓存
//! - 使用 `xray/data.rs` 的 ElementScatteringTable

use crate::error::{Result, XrayError};
use crate::xray::data::ElementScatteringTable;

use std::sync::Arc;

/// 计算 PCHIP 节点斜率
///
/// `xs` 必须严格递增且长度 ≥ 2。
pub fn pchip_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    debug_assert!(n >= 2 && ys.len() == n);

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

    if n == 2 {
        return vec![delta[0], delta[0]];
    }

    let mut d = vec![0.0; n];

    // 内部节点：加权调和平均，符号变化处斜率置零
    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] <= 0.0 {
            d[k] = 0.0;
        } else {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            d[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }
    }

    d[0] = edge_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = edge_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// 端点斜率：三点公式 + 保形修正
fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if d.signum() != m0.signum() || m0 == 0.0 {
        0.0
    } else if m0.signum() != m1.signum() && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

/// 在 `x` 处求 Hermite 插值（调用方保证 x 在 [xs[0], xs[n-1]] 内）
pub fn hermite_eval(xs: &[f64], ys: &[f64], ds: &[f64], x: f64) -> f64 {
    let n = xs.len();
    // 区间 i 满足 xs[i] <= x <= xs[i+1]
    let i = xs.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2);

    let h = xs[i + 1] - xs[i];
    let s = (x - xs[i]) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * ys[i] + h10 * h * ds[i] + h01 * ys[i + 1] + h11 * h * ds[i + 1]
}

/// 单个元素的 f1(E)/f2(E) 插值器
///
/// 只读共享散射因子表，构造后不可变。
#[derive(Debug)]
pub struct Interpolator {
    table: Arc<ElementScatteringTable>,
    d1: Vec<f64>,
    d2: Vec<f64>,
}

impl Interpolator {
    /// 由散射因子表构造插值器
    pub fn new(table: Arc<ElementScatteringTable>) -> Self {
        let d1 = pchip_slopes(table.energy_ev(), table.f1());
        let d2 = pchip_slopes(table.energy_ev(), table.f2());
        Self { table, d1, d2 }
    }

    pub fn symbol(&self) -> &str {
        self.table.symbol()
    }

    pub fn table(&self) -> &ElementScatteringTable {
        &self.table
    }

    /// 可插值的能量范围 (keV)
    pub fn domain_kev(&self) -> (f64, f64) {
        self.table.energy_range_kev()
    }

    fn to_grid(&self, energy_kev: f64) -> Result<f64> {
        let e_ev = energy_kev * 1000.0;
        let grid = self.table.energy_ev();
        if !(e_ev >= grid[0] && e_ev <= grid[grid.len() - 1]) {
            let (min_kev, max_kev) = self.domain_kev();
            return Err(XrayError::EnergyRange {
                element: self.symbol().to_string(),
                energy_kev,
                min_kev,
                max_kev,
            });
        }
        Ok(e_ev)
    }

    /// f1(E)，E 单位 keV
    pub fn f1(&self, energy_kev: f64) -> Result<f64> {
        let e = self.to_grid(energy_kev)?;
        Ok(hermite_eval(self.table.energy_ev(), self.table.f1(), &self.d1, e))
    }

    /// f2(E)，E 单位 keV
    pub fn f2(&self, energy_kev: f64) -> Result<f64> {
        let e = self.to_grid(energy_kev)?;
        Ok(hermite_eval(self.table.energy_ev(), self.table.f2(), &self.d2, e))
    }

    /// 在一组能量上同时求 f1 与 f2
    pub fn evaluate(&self, energies_kev: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let grid = self.table.energy_ev();
        let mut f1 = Vec::with_capacity(energies_kev.len());
        let mut f2 = Vec::with_capacity(energies_kev.len());

        for &energy in energies_kev {
            let e = self.to_grid(energy)?;
            f1.push(hermite_eval(grid, self.table.f1(), &self.d1, e));
            f2.push(hermite_eval(grid, self.table.f2(), &self.d2, e));
        }

        Ok((f1, f2))
    }
}
