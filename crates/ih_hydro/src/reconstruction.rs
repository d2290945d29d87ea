// crates/ih_hydro/src/reconstruction.rs

//! 斜率限制重构
//!
//! 把单元中心的原始变量沿梯度外推到面中点，并用逐面限制器
//! 把外推值压回以左右单元线性插值为中心的单调窗口内，
//! 抑制间断附近的伪振荡。
//!
//! 窗口参数 ψ₁ = 0.5、ψ₂ = 0.25；符号翻转的场合用
//! `f64::MIN_POSITIVE` 正则化，避免窗口端点穿过零。
//!
//! 对 ρ、三个速度分量、p 逐一独立应用。

use glam::DVec3;

/// 窗口扩张系数 ψ₁
const PSI1: f64 = 0.5;

/// 插值偏移系数 ψ₂
const PSI2: f64 = 0.25;

/// 逐面斜率限制
///
/// # 参数
/// - `phi_mid0`: 梯度外推得到的界面值 φ′
/// - `phi_l`: 界面左侧单元值
/// - `phi_r`: 界面右侧单元值
/// - `d_over_r`: 本侧中点到面中点的距离与左右中点距离之比
///
/// # 返回
/// 限制后的界面值
pub fn limit(phi_mid0: f64, phi_l: f64, phi_r: f64, d_over_r: f64) -> f64 {
    let delta1 = PSI1 * (phi_l - phi_r).abs();
    let delta2 = PSI2 * (phi_l - phi_r).abs();

    let phi_min = phi_l.min(phi_r);
    let phi_max = phi_l.max(phi_r);

    let phi_bar = phi_l + d_over_r * (phi_r - phi_l);

    // 扩张上端；若 φmax + δ₁ 变号则改用正则化形式
    let phi_plus = if (phi_max + delta1) * phi_max > 0.0 {
        phi_max + delta1
    } else {
        let abs_max = phi_max.abs();
        phi_max * abs_max / (abs_max + delta1 + f64::MIN_POSITIVE)
    };

    // 扩张下端，对称处理
    let phi_minus = if (phi_min - delta1) * phi_min > 0.0 {
        phi_min - delta1
    } else {
        let abs_min = phi_min.abs();
        phi_min * abs_min / (abs_min + delta1 + f64::MIN_POSITIVE)
    };

    if phi_l == phi_r {
        phi_l
    } else if phi_l < phi_r {
        phi_minus.max((phi_bar + delta2).min(phi_mid0))
    } else {
        phi_plus.min((phi_bar - delta2).max(phi_mid0))
    }
}

/// 构造一个量的斜率限制重构值
///
/// # 参数
/// - `quantity`: 本侧单元值
/// - `gradient`: 该量的梯度
/// - `distance`: 从本侧中点指向面中点的位移
/// - `quantity_other`: 界面另一侧的单元值
/// - `fractional_distance`: |distance| 与左右中点距离之比
#[inline]
pub fn reconstruct_quantity(
    quantity: f64,
    gradient: DVec3,
    distance: DVec3,
    quantity_other: f64,
    fractional_distance: f64,
) -> f64 {
    let quantity_prime = quantity + gradient.dot(distance);
    limit(quantity_prime, quantity, quantity_other, fractional_distance)
}
