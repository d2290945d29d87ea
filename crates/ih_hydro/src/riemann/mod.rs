// crates/ih_hydro/src/riemann/mod.rs

//! 黎曼求解器
//!
//! 提供理想气体欧拉方程的界面通量求解：
//!
//! - [`ExactRiemannSolver`]: 迭代精确求解器，完整波型采样与真空生成
//! - [`HllcRiemannSolver`]: HLLC 近似求解器，计算量低
//!
//! 求解都在界面随动参考系中进行（速度先减去 `vframe`），
//! 得到的通量再变换回实验室参考系。等温（γ = 1）运行时
//! 能量通量不写入，保持为零。
//!
//! 求解器按名称由 [`create_solver`] 工厂创建；未知名称是
//! 构造期错误。

mod exact;
mod hllc;
mod vacuum;

pub use exact::ExactRiemannSolver;
pub use hllc::HllcRiemannSolver;

use glam::DVec3;

use crate::error::{HydroError, HydroResult};

// ============================================================
// 通量与接口
// ============================================================

/// 界面通量（单位面积、单位时间）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiemannFlux {
    /// 质量通量
    pub mass: f64,
    /// 动量通量
    pub momentum: DVec3,
    /// 能量通量；γ = 1 时不写入
    pub energy: f64,
}

impl RiemannFlux {
    /// 零通量
    pub const ZERO: Self = Self {
        mass: 0.0,
        momentum: DVec3::ZERO,
        energy: 0.0,
    };

    /// 通量是否有效（非 NaN/Inf）
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.mass.is_finite() && self.momentum.is_finite() && self.energy.is_finite()
    }
}

/// 黎曼求解器接口
pub trait RiemannSolver: Send + Sync {
    /// 求解器名称
    fn name(&self) -> &'static str;

    /// 求解界面通量
    ///
    /// # 参数
    /// - `rho_l`, `u_l`, `p_l`: 左侧原始状态
    /// - `rho_r`, `u_r`, `p_r`: 右侧原始状态
    /// - `normal`: 界面单位法向（由左指向右）
    /// - `vframe`: 界面移动速度
    #[allow(clippy::too_many_arguments)]
    fn solve_for_flux(
        &self,
        rho_l: f64,
        u_l: DVec3,
        p_l: f64,
        rho_r: f64,
        u_r: DVec3,
        p_r: f64,
        normal: DVec3,
        vframe: DVec3,
    ) -> RiemannFlux;
}

/// 按名称创建求解器
///
/// 支持的名称："Exact"、"HLLC"。
pub fn create_solver(kind: &str, gamma: f64) -> HydroResult<Box<dyn RiemannSolver>> {
    match kind {
        "Exact" => Ok(Box::new(ExactRiemannSolver::new(gamma))),
        "HLLC" => Ok(Box::new(HllcRiemannSolver::new(gamma))),
        other => Err(HydroError::UnknownSolver(other.to_owned())),
    }
}

// ============================================================
// γ 导出常数
// ============================================================

/// 绝热指数的常用组合，构造时算好供热循环使用
///
/// γ = 1（等温）在内部用 1 + 1e-9 代替，使指数组合保持有限；
/// 此时能量通量不写入。
#[derive(Debug, Clone, Copy)]
pub(crate) struct GammaFactors {
    /// γ
    pub gamma: f64,
    /// 1/(γ-1)
    pub gm1_inv: f64,
    /// (γ+1)/(2γ)
    pub gp1d2g: f64,
    /// (γ-1)/(2γ)
    pub gm1d2g: f64,
    /// (γ-1)/(γ+1)
    pub gm1dgp1: f64,
    /// 2/(γ+1)
    pub tdgp1: f64,
    /// 2/(γ-1)
    pub tdgm1: f64,
    /// (γ-1)/2
    pub gm1d2: f64,
    /// 2γ/(γ-1)
    pub tgdgm1: f64,
    /// 1/γ
    pub ginv: f64,
}

impl GammaFactors {
    pub fn new(gamma: f64) -> Self {
        let g = if gamma > 1.0 { gamma } else { 1.0 + 1.0e-9 };
        let gm1 = g - 1.0;
        let gp1 = g + 1.0;
        Self {
            gamma: g,
            gm1_inv: 1.0 / gm1,
            gp1d2g: gp1 / (2.0 * g),
            gm1d2g: gm1 / (2.0 * g),
            gm1dgp1: gm1 / gp1,
            tdgp1: 2.0 / gp1,
            tdgm1: 2.0 / gm1,
            gm1d2: 0.5 * gm1,
            tgdgm1: 2.0 * g / gm1,
            ginv: 1.0 / g,
        }
    }

    /// 声速 c = √(γp/ρ)
    #[inline]
    pub fn sound_speed(&self, rho: f64, p: f64) -> f64 {
        if rho > 0.0 {
            (self.gamma * p / rho).sqrt()
        } else {
            0.0
        }
    }
}

/// 由界面处采样状态组装实验室参考系通量
///
/// 采样状态 (ρ, v⃗, p) 处于界面随动参考系；先按
/// F = (ρvₙ, ρvₙv⃗ + p n̂, (E+p)vₙ) 组装，再做参考系回变换：
/// F_E += v⃗f·F_p + ½|v⃗f|²F_m，F_p += F_m·v⃗f。
#[inline]
pub(crate) fn flux_from_sample(
    gf: &GammaFactors,
    rho: f64,
    velocity: DVec3,
    pressure: f64,
    normal: DVec3,
    vframe: DVec3,
    isothermal: bool,
) -> RiemannFlux {
    let vn = velocity.dot(normal);
    let mass = rho * vn;
    let mut momentum = rho * vn * velocity + pressure * normal;
    let mut energy = if isothermal {
        0.0
    } else {
        (pressure * gf.gm1_inv + 0.5 * rho * velocity.length_squared() + pressure) * vn
    };

    if !isothermal {
        energy += vframe.dot(momentum) + 0.5 * vframe.length_squared() * mass;
    }
    momentum += mass * vframe;

    RiemannFlux {
        mass,
        momentum,
        energy,
    }
}
