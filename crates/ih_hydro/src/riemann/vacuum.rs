// crates/ih_hydro/src/riemann/vacuum.rs

//! 真空黎曼问题采样
//!
//! 三种真空场合的自相似解，在 ξ = x/t = 0 处采样：
//! - 左侧真空：右侧气体向左稀疏扩张
//! - 右侧真空：左侧气体向右稀疏扩张
//! - 真空生成：两侧气体背向分离，中间拉出真空
//!
//! 精确解与 HLLC 求解器共用本模块；近似求解器对真空场合
//! 没有稳定的波速估计，必须走解析解。
//!
//! 侧别约定：压强或密度非正的一侧按真空处理（稀疏波公式
//! 在 c = 0 时扇区为空，不会发生除零）。

use super::GammaFactors;

/// ξ = 0 处的采样结果
///
/// `side`：-1 取自左侧数据，+1 取自右侧数据，0 界面处为真空。
/// 调用方按 `side` 选择切向速度来源。
pub(crate) type VacuumSample = (f64, f64, f64, i8);

/// 一侧是否按真空处理
#[inline]
pub(crate) fn is_vacuum(rho: f64, p: f64) -> bool {
    rho <= 0.0 || p <= 0.0
}

/// 是否发生真空生成
///
/// 判据：2c_L/(γ-1) + 2c_R/(γ-1) ≤ v_R − v_L。
#[inline]
pub(crate) fn generates_vacuum(gf: &GammaFactors, v_l: f64, c_l: f64, v_r: f64, c_r: f64) -> bool {
    gf.tdgm1 * (c_l + c_r) <= v_r - v_l
}

/// 若属于真空场合，给出 ξ = 0 处的采样状态
///
/// # 参数
/// 法向一维状态：`v_*` 为法向速度分量，`c_*` 为声速。
///
/// # 返回
/// `None` 表示常规（非真空）黎曼问题，交回调用方迭代求解。
#[allow(clippy::too_many_arguments)]
pub(crate) fn sample_vacuum(
    gf: &GammaFactors,
    rho_l: f64,
    v_l: f64,
    p_l: f64,
    c_l: f64,
    rho_r: f64,
    v_r: f64,
    p_r: f64,
    c_r: f64,
) -> Option<VacuumSample> {
    let left_vacuum = is_vacuum(rho_l, p_l);
    let right_vacuum = is_vacuum(rho_r, p_r);

    if left_vacuum && right_vacuum {
        return Some((0.0, 0.0, 0.0, 0));
    }
    if left_vacuum {
        return Some(sample_right_gas(gf, rho_r, v_r, p_r, c_r));
    }
    if right_vacuum {
        return Some(sample_left_gas(gf, rho_l, v_l, p_l, c_l));
    }
    if generates_vacuum(gf, v_l, c_l, v_r, c_r) {
        // 背向分离：左扇 | 真空 | 右扇
        let s_star_l = v_l + gf.tdgm1 * c_l;
        let s_star_r = v_r - gf.tdgm1 * c_r;
        if 0.0 <= v_l - c_l {
            return Some((rho_l, v_l, p_l, -1));
        }
        if 0.0 < s_star_l {
            return Some(left_fan(gf, rho_l, v_l, p_l, c_l));
        }
        if 0.0 <= s_star_r {
            return Some((0.0, 0.0, 0.0, 0));
        }
        if 0.0 < v_r + c_r {
            return Some(right_fan(gf, rho_r, v_r, p_r, c_r));
        }
        return Some((rho_r, v_r, p_r, 1));
    }

    None
}

/// 右侧真空、左侧气体：真空锋面速度 S*L = v_L + 2c_L/(γ-1)
fn sample_left_gas(gf: &GammaFactors, rho_l: f64, v_l: f64, p_l: f64, c_l: f64) -> VacuumSample {
    let s_star = v_l + gf.tdgm1 * c_l;
    if 0.0 >= s_star {
        (0.0, 0.0, 0.0, 0)
    } else if 0.0 <= v_l - c_l {
        (rho_l, v_l, p_l, -1)
    } else {
        left_fan(gf, rho_l, v_l, p_l, c_l)
    }
}

/// 左侧真空、右侧气体：真空锋面速度 S*R = v_R − 2c_R/(γ-1)
fn sample_right_gas(gf: &GammaFactors, rho_r: f64, v_r: f64, p_r: f64, c_r: f64) -> VacuumSample {
    let s_star = v_r - gf.tdgm1 * c_r;
    if 0.0 <= s_star {
        (0.0, 0.0, 0.0, 0)
    } else if 0.0 >= v_r + c_r {
        (rho_r, v_r, p_r, 1)
    } else {
        right_fan(gf, rho_r, v_r, p_r, c_r)
    }
}

/// 左行稀疏扇内 ξ = 0 的状态
pub(crate) fn left_fan(gf: &GammaFactors, rho_l: f64, v_l: f64, p_l: f64, c_l: f64) -> VacuumSample {
    let base = gf.tdgp1 + gf.gm1dgp1 * v_l / c_l;
    (
        rho_l * base.powf(gf.tdgm1),
        gf.tdgp1 * (c_l + gf.gm1d2 * v_l),
        p_l * base.powf(gf.tgdgm1),
        -1,
    )
}

/// 右行稀疏扇内 ξ = 0 的状态
pub(crate) fn right_fan(gf: &GammaFactors, rho_r: f64, v_r: f64, p_r: f64, c_r: f64) -> VacuumSample {
    let base = gf.tdgp1 - gf.gm1dgp1 * v_r / c_r;
    (
        rho_r * base.powf(gf.tdgm1),
        gf.tdgp1 * (-c_r + gf.gm1d2 * v_r),
        p_r * base.powf(gf.tgdgm1),
        1,
    )
}
