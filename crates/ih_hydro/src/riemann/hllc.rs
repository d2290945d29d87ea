// crates/ih_hydro/src/riemann/hllc.rs

//! HLLC 近似黎曼求解器
//!
//! 三波（左波、接触面、右波）近似：
//! 1. PVRS 预估星区压强，据此给出左右波速 S_L、S_R
//! 2. 接触面速度 S* 由横跨两波的 Rankine-Hugoniot 关系解出
//! 3. 按 S_L、S*、S_R 与零的相对位置取 F_L、F*_L、F*_R 或 F_R
//!
//! 接触间断被显式保留，计算量远低于迭代精确解。
//! 真空场合没有可靠的波速估计，转交解析真空解。

use glam::DVec3;

use super::vacuum::sample_vacuum;
use super::{flux_from_sample, GammaFactors, RiemannFlux, RiemannSolver};

/// HLLC 求解器
#[derive(Debug, Clone)]
pub struct HllcRiemannSolver {
    gf: GammaFactors,
    /// 等温运行（γ = 1）：能量通量不写入
    isothermal: bool,
}

impl HllcRiemannSolver {
    /// 创建求解器
    pub fn new(gamma: f64) -> Self {
        Self {
            gf: GammaFactors::new(gamma),
            isothermal: gamma == 1.0,
        }
    }

    /// 单侧波速因子 q_K
    ///
    /// 稀疏波取 1，激波按星区压强比修正。
    #[inline]
    fn wave_speed_factor(&self, p_star: f64, p_k: f64) -> f64 {
        if p_star <= p_k {
            1.0
        } else {
            (1.0 + self.gf.gp1d2g * (p_star / p_k - 1.0)).sqrt()
        }
    }

    /// 面参考系中的欧拉通量（含参考系回变换在外层完成）
    #[inline]
    fn raw_flux(&self, rho: f64, velocity: DVec3, p: f64, normal: DVec3) -> (f64, DVec3, f64) {
        let vn = velocity.dot(normal);
        let energy = p * self.gf.gm1_inv + 0.5 * rho * velocity.length_squared();
        (
            rho * vn,
            rho * vn * velocity + p * normal,
            (energy + p) * vn,
        )
    }
}

impl RiemannSolver for HllcRiemannSolver {
    fn name(&self) -> &'static str {
        "HLLC"
    }

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
    ) -> RiemannFlux {
        let gf = &self.gf;

        // 变换到界面随动参考系
        let u_l = u_l - vframe;
        let u_r = u_r - vframe;
        let v_l = u_l.dot(normal);
        let v_r = u_r.dot(normal);
        let c_l = gf.sound_speed(rho_l, p_l);
        let c_r = gf.sound_speed(rho_r, p_r);

        // 真空场合走解析解
        if let Some((rho, v_n, p, side)) =
            sample_vacuum(gf, rho_l, v_l, p_l, c_l, rho_r, v_r, p_r, c_r)
        {
            if side == 0 || rho <= 0.0 {
                return RiemannFlux::ZERO;
            }
            let velocity = if side < 0 {
                u_l + (v_n - v_l) * normal
            } else {
                u_r + (v_n - v_r) * normal
            };
            return flux_from_sample(gf, rho, velocity, p, normal, vframe, self.isothermal);
        }

        // PVRS 星区压强预估
        let rho_bar = 0.5 * (rho_l + rho_r);
        let c_bar = 0.5 * (c_l + c_r);
        let p_star = (0.5 * (p_l + p_r) - 0.5 * (v_r - v_l) * rho_bar * c_bar).max(0.0);

        // 波速估计
        let s_l = v_l - c_l * self.wave_speed_factor(p_star, p_l);
        let s_r = v_r + c_r * self.wave_speed_factor(p_star, p_r);

        // 接触面速度
        let ml = rho_l * (s_l - v_l);
        let mr = rho_r * (s_r - v_r);
        let s_star = (p_r - p_l + ml * v_l - mr * v_r) / (ml - mr);

        let (mass, mut momentum, mut energy) = if s_l >= 0.0 {
            self.raw_flux(rho_l, u_l, p_l, normal)
        } else if s_r <= 0.0 {
            self.raw_flux(rho_r, u_r, p_r, normal)
        } else if s_star >= 0.0 {
            // F*_L = F_L + S_L (U*_L − U_L)
            let (f_m, f_p, f_e) = self.raw_flux(rho_l, u_l, p_l, normal);
            let rho_star = rho_l * (s_l - v_l) / (s_l - s_star);
            let u_star = u_l + (s_star - v_l) * normal;
            let e_l = p_l * gf.gm1_inv + 0.5 * rho_l * u_l.length_squared();
            let e_star = rho_star
                * (e_l / rho_l + (s_star - v_l) * (s_star + p_l / (rho_l * (s_l - v_l))));
            (
                f_m + s_l * (rho_star - rho_l),
                f_p + s_l * (rho_star * u_star - rho_l * u_l),
                f_e + s_l * (e_star - e_l),
            )
        } else {
            let (f_m, f_p, f_e) = self.raw_flux(rho_r, u_r, p_r, normal);
            let rho_star = rho_r * (s_r - v_r) / (s_r - s_star);
            let u_star = u_r + (s_star - v_r) * normal;
            let e_r = p_r * gf.gm1_inv + 0.5 * rho_r * u_r.length_squared();
            let e_star = rho_star
                * (e_r / rho_r + (s_star - v_r) * (s_star + p_r / (rho_r * (s_r - v_r))));
            (
                f_m + s_r * (rho_star - rho_r),
                f_p + s_r * (rho_star * u_star - rho_r * u_r),
                f_e + s_r * (e_star - e_r),
            )
        };

        // 回到实验室参考系
        if self.isothermal {
            energy = 0.0;
        } else {
            energy += vframe.dot(momentum) + 0.5 * vframe.length_squared() * mass;
        }
        momentum += mass * vframe;

        RiemannFlux {
            mass,
            momentum,
            energy,
        }
    }
}
