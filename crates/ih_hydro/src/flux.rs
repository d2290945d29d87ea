// crates/ih_hydro/src/flux.rs

//! 界面通量内核
//!
//! 单个面的完整通量计算：
//! 1. 两侧原始变量按梯度外推到面中点并逐量斜率限制（reconstruction）
//! 2. 重构密度与压强钳制非负（安全流体策略）
//! 3. 在界面随动参考系调用黎曼求解器取得原始通量
//! 4. 乘以 面积 × Δt 得到积分通量
//! 5. 通量限制：标量因子 f ∈ [0, 1]，防止单面抽干单元
//!
//! 通量限制的上限是单元当前守恒量的 [`FLUX_LIMITER`] 倍；
//! 动量限制只作用于"高动量"单元（|p⃗|²ρ > γ(2m)²P），
//! 否则静止单元永远无法获得动量。
//!
//! NaN 契约检查是调试断言，release 构建下由钳制兜底。

use glam::DVec3;

use crate::boundary::FaceState;
use crate::reconstruction::reconstruct_quantity;
use crate::riemann::{RiemannFlux, RiemannSolver};
use crate::state::{Conserved, Primitives};

/// 通量限制倍数：任何一面最多带走单元守恒量的 2 倍
pub const FLUX_LIMITER: f64 = 2.0;

// ============================================================
// 单元通量限制量
// ============================================================

/// 一个单元的通量限制量，进入邻居循环前算好
#[derive(Debug, Clone, Copy)]
pub struct FluxLimits {
    /// 质量通量上限 2m
    pub mass: f64,
    /// 动量通量平方上限 (2|p⃗|)²
    pub momentum2: f64,
    /// 能量通量上限 2E
    pub energy: f64,
    /// 高动量指示：|p⃗|²ρ > γ(2m)²P
    pub high_momentum: bool,
}

impl FluxLimits {
    /// 由守恒与原始状态计算
    pub fn of_cell(conserved: &Conserved, primitives: &Primitives, gamma: f64) -> Self {
        let mass = FLUX_LIMITER * conserved.mass;
        let momentum2 = conserved.momentum.length_squared();
        Self {
            mass,
            momentum2: (FLUX_LIMITER * FLUX_LIMITER) * momentum2,
            energy: FLUX_LIMITER * conserved.energy,
            high_momentum: momentum2 * primitives.density
                > gamma * (mass * mass) * primitives.pressure,
        }
    }
}

/// 通量限制因子
///
/// # 参数
/// - `mass_flux`, `momentum_flux2`, `energy_flux`: 积分通量
///   （动量取模平方），正号表示流出左单元
/// - `left`, `right`: 两侧单元的限制量
/// - `isothermal`: γ = 1 时能量不参与限制
///
/// # 返回
/// f ∈ [0, 1]；越界指示上游出现 NaN/Inf，属调试断言
pub fn limit_flux(
    mass_flux: f64,
    momentum_flux2: f64,
    energy_flux: f64,
    left: &FluxLimits,
    right: &FluxLimits,
    isothermal: bool,
) -> f64 {
    let mut factor: f64 = 1.0;
    if mass_flux > left.mass {
        factor = left.mass / mass_flux;
    }
    if -mass_flux > right.mass {
        factor = factor.min(-right.mass / mass_flux);
    }
    if !isothermal {
        if energy_flux > left.energy {
            factor = factor.min(left.energy / energy_flux);
        }
        if -energy_flux > right.energy {
            factor = factor.min(-right.energy / energy_flux);
        }
    }
    // 动量限制只针对高动量单元
    if left.high_momentum && momentum_flux2 > left.momentum2 {
        factor = factor.min((left.momentum2 / momentum_flux2).sqrt());
    }
    if right.high_momentum && momentum_flux2 > right.momentum2 {
        factor = factor.min((right.momentum2 / momentum_flux2).sqrt());
    }

    debug_assert!(
        (0.0..=1.0).contains(&factor),
        "flux factor: {} (mass {}, momentum2 {}, energy {})",
        factor,
        mass_flux,
        momentum_flux2,
        energy_flux
    );
    factor
}

// ============================================================
// 面通量
// ============================================================

/// 计算一个面的积分通量（已乘 面积 × Δt，未乘限制因子）
///
/// # 参数
/// - `left`, `right`: 两侧面状态（原始变量 + 梯度，内部单位）
/// - `d_l`, `d_r`: 两侧中点指向面中点的位移（内部单位）
/// - `dl_over_r`, `dr_over_r`: 对应的分数距离 |d|/|x_L − x_R|
/// - `normal`: 外向法向，`vframe`: 界面速度
/// - `area`: 面积（内部单位），`timestep`: Δt（内部单位）
/// - `isothermal`: γ = 1 标志
#[allow(clippy::too_many_arguments)]
pub fn compute_face_flux(
    left: &FaceState,
    right: &FaceState,
    d_l: DVec3,
    d_r: DVec3,
    dl_over_r: f64,
    dr_over_r: f64,
    solver: &dyn RiemannSolver,
    normal: DVec3,
    vframe: DVec3,
    area: f64,
    timestep: f64,
    isothermal: bool,
) -> RiemannFlux {
    debug_assert!(
        left.density.is_finite() && left.velocity.is_finite() && left.pressure.is_finite(),
        "left state: rho {}, u {:?}, P {}",
        left.density,
        left.velocity,
        left.pressure
    );
    debug_assert!(
        right.density.is_finite() && right.velocity.is_finite() && right.pressure.is_finite(),
        "right state: rho {}, u {:?}, P {}",
        right.density,
        right.velocity,
        right.pressure
    );

    // 二阶空间外推
    let mut rho_l = reconstruct_quantity(left.density, left.grad_density, d_l, right.density, dl_over_r);
    let u_l = DVec3::new(
        reconstruct_quantity(left.velocity.x, left.grad_velocity[0], d_l, right.velocity.x, dl_over_r),
        reconstruct_quantity(left.velocity.y, left.grad_velocity[1], d_l, right.velocity.y, dl_over_r),
        reconstruct_quantity(left.velocity.z, left.grad_velocity[2], d_l, right.velocity.z, dl_over_r),
    );
    let mut p_l = reconstruct_quantity(left.pressure, left.grad_pressure, d_l, right.pressure, dl_over_r);

    let mut rho_r = reconstruct_quantity(right.density, right.grad_density, d_r, left.density, dr_over_r);
    let u_r = DVec3::new(
        reconstruct_quantity(right.velocity.x, right.grad_velocity[0], d_r, left.velocity.x, dr_over_r),
        reconstruct_quantity(right.velocity.y, right.grad_velocity[1], d_r, left.velocity.y, dr_over_r),
        reconstruct_quantity(right.velocity.z, right.grad_velocity[2], d_r, left.velocity.z, dr_over_r),
    );
    let mut p_r = reconstruct_quantity(right.pressure, right.grad_pressure, d_r, left.pressure, dr_over_r);

    debug_assert!(
        rho_l.is_finite() && p_l.is_finite() && u_l.is_finite(),
        "reconstructed left: rho {}, u {:?}, P {}, grad_rho {:?}, d {:?}, ratio {}",
        rho_l,
        u_l,
        p_l,
        left.grad_density,
        d_l,
        dl_over_r
    );
    debug_assert!(
        rho_r.is_finite() && p_r.is_finite() && u_r.is_finite(),
        "reconstructed right: rho {}, u {:?}, P {}, grad_rho {:?}, d {:?}, ratio {}",
        rho_r,
        u_r,
        p_r,
        right.grad_density,
        d_r,
        dr_over_r
    );

    // 重构值保持物理
    rho_l = rho_l.max(0.0);
    p_l = p_l.max(0.0);
    rho_r = rho_r.max(0.0);
    p_r = p_r.max(0.0);

    let mut flux = solver.solve_for_flux(rho_l, u_l, p_l, rho_r, u_r, p_r, normal, vframe);

    debug_assert!(
        flux.mass.is_finite() && flux.momentum.is_finite(),
        "flux: m {}, p {:?}, E {}; left ({}, {:?}, {}), right ({}, {:?}, {})",
        flux.mass,
        flux.momentum,
        flux.energy,
        rho_l,
        u_l,
        p_l,
        rho_r,
        u_r,
        p_r
    );
    debug_assert!(isothermal || flux.energy.is_finite());

    // 按面积与时间步积分
    let weight = area * timestep;
    flux.mass *= weight;
    flux.momentum *= weight;
    flux.energy *= weight;
    flux
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riemann::ExactRiemannSolver;
    use crate::state::PrimitiveGradients;

    const GAMMA: f64 = 5.0 / 3.0;

    fn face_state(rho: f64, vx: f64, p: f64) -> FaceState {
        FaceState::from_cell(
            &Primitives::new(rho, DVec3::new(vx, 0.0, 0.0), p),
            &PrimitiveGradients::ZERO,
        )
    }

    #[test]
    fn test_interior_face_antisymmetry() {
        // 同一个面从两侧算：积分通量互为相反数
        let solver = ExactRiemannSolver::new(GAMMA);
        let a = face_state(1.0, 0.2, 1.0);
        let b = face_state(0.5, -0.1, 0.4);
        let d = DVec3::new(0.5, 0.0, 0.0);

        let forward = compute_face_flux(
            &a, &b, d, -d, 0.5, 0.5, &solver, DVec3::X, DVec3::ZERO, 2.0, 0.1, false,
        );
        let backward = compute_face_flux(
            &b, &a, -d, d, 0.5, 0.5, &solver, DVec3::NEG_X, DVec3::ZERO, 2.0, 0.1, false,
        );

        assert!((forward.mass + backward.mass).abs() < 1.0e-12);
        assert!((forward.momentum + backward.momentum).length() < 1.0e-12);
        assert!((forward.energy + backward.energy).abs() < 1.0e-12);
    }

    #[test]
    fn test_negative_reconstruction_is_clamped() {
        // 陡梯度把 ρ′、p′ 推成负值：钳制后求解器仍收到物理状态
        let mut left = face_state(0.1, 0.0, 0.1);
        left.grad_density = DVec3::new(-10.0, 0.0, 0.0);
        left.grad_pressure = DVec3::new(-10.0, 0.0, 0.0);
        let right = face_state(0.1, 0.0, 0.1);
        let solver = ExactRiemannSolver::new(GAMMA);

        let flux = compute_face_flux(
            &left,
            &right,
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::new(-0.5, 0.0, 0.0),
            0.5,
            0.5,
            &solver,
            DVec3::X,
            DVec3::ZERO,
            1.0,
            0.01,
            false,
        );
        assert!(flux.is_valid());
    }

    #[test]
    fn test_limit_factor_identity_for_small_flux() {
        let cons = Conserved::new(1.0, DVec3::ZERO, 2.0);
        let prim = Primitives::new(1.0, DVec3::ZERO, 1.0);
        let limits = FluxLimits::of_cell(&cons, &prim, GAMMA);
        let f = limit_flux(0.5, 0.0, 0.5, &limits, &limits, false);
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_limit_factor_caps_mass_drain() {
        // 质量通量超过 2m：因子压到恰好带走 2m
        let cons = Conserved::new(1.0, DVec3::ZERO, 2.0);
        let prim = Primitives::new(1.0, DVec3::ZERO, 1.0);
        let limits = FluxLimits::of_cell(&cons, &prim, GAMMA);

        let f = limit_flux(5.0, 0.0, 0.0, &limits, &limits, false);
        assert!((f - 2.0 / 5.0).abs() < 1.0e-14);
        // 反向流出右单元同理
        let f = limit_flux(-5.0, 0.0, 0.0, &limits, &limits, false);
        assert!((f - 2.0 / 5.0).abs() < 1.0e-14);
    }

    #[test]
    fn test_energy_limit_skipped_when_isothermal() {
        let cons = Conserved::new(1.0, DVec3::ZERO, 0.1);
        let prim = Primitives::new(1.0, DVec3::ZERO, 1.0);
        let limits = FluxLimits::of_cell(&cons, &prim, GAMMA);

        let adiabatic = limit_flux(0.0, 0.0, 10.0, &limits, &limits, false);
        assert!(adiabatic < 1.0);
        let isothermal = limit_flux(0.0, 0.0, 10.0, &limits, &limits, true);
        assert_eq!(isothermal, 1.0);
    }

    #[test]
    fn test_momentum_limit_gated_on_high_momentum() {
        // 低动量单元不做动量限制，否则永远无法起动
        let prim = Primitives::new(1.0, DVec3::ZERO, 1.0);
        let resting = Conserved::new(1.0, DVec3::ZERO, 2.0);
        let limits = FluxLimits::of_cell(&resting, &prim, GAMMA);
        assert!(!limits.high_momentum);
        let f = limit_flux(0.0, 100.0, 0.0, &limits, &limits, false);
        assert_eq!(f, 1.0);

        // 高动量单元：|p⃗|²ρ > γ(2m)²P
        let moving = Conserved::new(1.0, DVec3::new(10.0, 0.0, 0.0), 2.0);
        let limits = FluxLimits::of_cell(&moving, &prim, GAMMA);
        assert!(limits.high_momentum);
        let flux2 = 1.0e4;
        let f = limit_flux(0.0, flux2, 0.0, &limits, &limits, false);
        assert!((f - (limits.momentum2 / flux2).sqrt()).abs() < 1.0e-14);
    }
}
