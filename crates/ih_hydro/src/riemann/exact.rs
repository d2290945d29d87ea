// crates/ih_hydro/src/riemann/exact.rs

//! 精确黎曼求解器
//!
//! 理想气体欧拉方程的迭代精确解：
//! 1. 对压强方程 f(p) = f_L(p) + f_R(p) + (v_R − v_L) 用 Brent 法求根，
//!    得到星区压强 p* 与接触面速度 u*
//! 2. 按波型（激波/稀疏波）在 ξ = x/t = 0 处采样
//! 3. 真空场合（单侧真空、真空生成）走解析真空解
//!
//! 求解在界面随动参考系中进行，输出通量再变换回实验室系。

use glam::DVec3;

use super::vacuum::{self, sample_vacuum};
use super::{flux_from_sample, GammaFactors, RiemannFlux, RiemannSolver};

/// Brent 迭代的绝对容差（内部单位压强量级为 1）
const BRENT_TOLERANCE: f64 = 1.0e-12;

/// Brent 最大迭代次数
const MAX_ITERATIONS: usize = 100;

/// 压强上界扩张的最大翻倍次数
const MAX_BRACKET_DOUBLINGS: usize = 64;

/// 精确黎曼求解器
#[derive(Debug, Clone)]
pub struct ExactRiemannSolver {
    gf: GammaFactors,
    /// 等温运行（γ = 1）：能量通量不写入
    isothermal: bool,
}

impl ExactRiemannSolver {
    /// 创建求解器
    pub fn new(gamma: f64) -> Self {
        Self {
            gf: GammaFactors::new(gamma),
            isothermal: gamma == 1.0,
        }
    }

    /// 单侧压强函数 f_K(p)
    ///
    /// p > p_K 为激波分支，否则为稀疏波分支。
    #[inline]
    fn f_k(&self, p: f64, rho_k: f64, p_k: f64, c_k: f64) -> f64 {
        if p > p_k {
            let a = self.gf.tdgp1 / rho_k;
            let b = self.gf.gm1dgp1 * p_k;
            (p - p_k) * (a / (p + b)).sqrt()
        } else {
            self.gf.tdgm1 * c_k * ((p / p_k).powf(self.gf.gm1d2g) - 1.0)
        }
    }

    /// 压强方程 f(p) = f_L + f_R + Δv
    #[inline]
    #[allow(clippy::too_many_arguments)]
    fn pressure_function(
        &self,
        p: f64,
        rho_l: f64,
        v_l: f64,
        p_l: f64,
        c_l: f64,
        rho_r: f64,
        v_r: f64,
        p_r: f64,
        c_r: f64,
    ) -> f64 {
        self.f_k(p, rho_l, p_l, c_l) + self.f_k(p, rho_r, p_r, c_r) + (v_r - v_l)
    }

    /// 求星区压强与接触面速度
    ///
    /// 仅对常规（非真空）问题有定义；真空场合返回 `None`。
    /// 法向一维状态输入。
    pub fn star_state(
        &self,
        rho_l: f64,
        v_l: f64,
        p_l: f64,
        rho_r: f64,
        v_r: f64,
        p_r: f64,
    ) -> Option<(f64, f64)> {
        let c_l = self.gf.sound_speed(rho_l, p_l);
        let c_r = self.gf.sound_speed(rho_r, p_r);
        if vacuum::is_vacuum(rho_l, p_l)
            || vacuum::is_vacuum(rho_r, p_r)
            || vacuum::generates_vacuum(&self.gf, v_l, c_l, v_r, c_r)
        {
            return None;
        }

        let f = |p: f64| self.pressure_function(p, rho_l, v_l, p_l, c_l, rho_r, v_r, p_r, c_r);

        let p_min = p_l.min(p_r);
        let p_max = p_l.max(p_r);
        let f_min = f(p_min);
        let f_max = f(p_max);

        let p_star = if f_min > 0.0 && f_max > 0.0 {
            // 双稀疏波：根落在 (0, p_min)；无真空生成保证 f(0) < 0
            brent(&f, 0.0, p_min, f(0.0), f_min)
        } else if f_min < 0.0 && f_max < 0.0 {
            // 双激波：向上翻倍扩张直到 f 变号
            let mut lower = p_max;
            let mut f_lower = f_max;
            let mut upper = 2.0 * p_max;
            let mut f_upper = f(upper);
            let mut doublings = 0;
            while f_upper < 0.0 && doublings < MAX_BRACKET_DOUBLINGS {
                lower = upper;
                f_lower = f_upper;
                upper *= 2.0;
                f_upper = f(upper);
                doublings += 1;
            }
            brent(&f, lower, upper, f_lower, f_upper)
        } else {
            brent(&f, p_min, p_max, f_min, f_max)
        };

        let u_star = 0.5 * (v_l + v_r)
            + 0.5 * (self.f_k(p_star, rho_r, p_r, c_r) - self.f_k(p_star, rho_l, p_l, c_l));
        Some((p_star, u_star))
    }

    /// 在 ξ = 0 处采样完整解
    ///
    /// 返回 (ρ, vₙ, p, side)；side 含义见真空模块。
    pub(crate) fn solve(
        &self,
        rho_l: f64,
        v_l: f64,
        p_l: f64,
        rho_r: f64,
        v_r: f64,
        p_r: f64,
    ) -> (f64, f64, f64, i8) {
        let c_l = self.gf.sound_speed(rho_l, p_l);
        let c_r = self.gf.sound_speed(rho_r, p_r);

        if let Some(sample) =
            sample_vacuum(&self.gf, rho_l, v_l, p_l, c_l, rho_r, v_r, p_r, c_r)
        {
            return sample;
        }

        // star_state 的真空检查已在上面排除，此处必然有值
        let (p_star, u_star) = self
            .star_state(rho_l, v_l, p_l, rho_r, v_r, p_r)
            .expect("regular Riemann problem");

        if u_star >= 0.0 {
            self.sample_left(p_star, u_star, rho_l, v_l, p_l, c_l)
        } else {
            self.sample_right(p_star, u_star, rho_r, v_r, p_r, c_r)
        }
    }

    /// 接触面右移：采样左波一侧
    fn sample_left(
        &self,
        p_star: f64,
        u_star: f64,
        rho_l: f64,
        v_l: f64,
        p_l: f64,
        c_l: f64,
    ) -> (f64, f64, f64, i8) {
        let gf = &self.gf;
        let pratio = p_star / p_l;
        if p_star > p_l {
            // 左激波
            let s_l = v_l - c_l * (gf.gp1d2g * pratio + gf.gm1d2g).sqrt();
            if s_l >= 0.0 {
                (rho_l, v_l, p_l, -1)
            } else {
                let rho = rho_l * (pratio + gf.gm1dgp1) / (gf.gm1dgp1 * pratio + 1.0);
                (rho, u_star, p_star, -1)
            }
        } else {
            // 左稀疏波
            if v_l - c_l >= 0.0 {
                (rho_l, v_l, p_l, -1)
            } else {
                let c_star = c_l * pratio.powf(gf.gm1d2g);
                if u_star - c_star < 0.0 {
                    (rho_l * pratio.powf(gf.ginv), u_star, p_star, -1)
                } else {
                    vacuum::left_fan(gf, rho_l, v_l, p_l, c_l)
                }
            }
        }
    }

    /// 接触面左移：采样右波一侧
    fn sample_right(
        &self,
        p_star: f64,
        u_star: f64,
        rho_r: f64,
        v_r: f64,
        p_r: f64,
        c_r: f64,
    ) -> (f64, f64, f64, i8) {
        let gf = &self.gf;
        let pratio = p_star / p_r;
        if p_star > p_r {
            // 右激波
            let s_r = v_r + c_r * (gf.gp1d2g * pratio + gf.gm1d2g).sqrt();
            if s_r <= 0.0 {
                (rho_r, v_r, p_r, 1)
            } else {
                let rho = rho_r * (pratio + gf.gm1dgp1) / (gf.gm1dgp1 * pratio + 1.0);
                (rho, u_star, p_star, 1)
            }
        } else {
            // 右稀疏波
            if v_r + c_r <= 0.0 {
                (rho_r, v_r, p_r, 1)
            } else {
                let c_star = c_r * pratio.powf(gf.gm1d2g);
                if u_star + c_star > 0.0 {
                    (rho_r * pratio.powf(gf.ginv), u_star, p_star, 1)
                } else {
                    vacuum::right_fan(gf, rho_r, v_r, p_r, c_r)
                }
            }
        }
    }
}

impl RiemannSolver for ExactRiemannSolver {
    fn name(&self) -> &'static str {
        "Exact"
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
        // 变换到界面随动参考系
        let u_l = u_l - vframe;
        let u_r = u_r - vframe;
        let v_l = u_l.dot(normal);
        let v_r = u_r.dot(normal);

        let (rho, v_n, p, side) = self.solve(rho_l, v_l, p_l, rho_r, v_r, p_r);
        if side == 0 || rho <= 0.0 {
            return RiemannFlux::ZERO;
        }

        // 切向速度取自接触面同侧
        let velocity = if side < 0 {
            u_l + (v_n - v_l) * normal
        } else {
            u_r + (v_n - v_r) * normal
        };

        flux_from_sample(&self.gf, rho, velocity, p, normal, vframe, self.isothermal)
    }
}

// ============================================================
// Brent 求根
// ============================================================

/// Brent 法求 f 在 [a, b] 上的根，要求 f(a)·f(b) ≤ 0
fn brent<F: Fn(f64) -> f64>(f: &F, a0: f64, b0: f64, fa0: f64, fb0: f64) -> f64 {
    if fa0 == 0.0 {
        return a0;
    }
    if fb0 == 0.0 {
        return b0;
    }
    debug_assert!(fa0 * fb0 < 0.0, "brent: f({}) = {}, f({}) = {}", a0, fa0, b0, fb0);

    let (mut a, mut b) = (a0, b0);
    let (mut fa, mut fb) = (fa0, fb0);
    let (mut c, mut fc) = (a, fa);
    let mut d = b - a;
    let mut e = b - a;

    for _ in 0..MAX_ITERATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * BRENT_TOLERANCE;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return b;
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // 逆二次插值，失败则退回二分
            let s = fb / fa;
            let (mut p, mut q);
            if a == c {
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                let qq = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * qq * (qq - r) - (b - a) * (r - 1.0));
                q = (qq - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1 * xm.signum();
        }
        fb = f(b);
    }
    b
}

// ============================================================
// 测试
// ============================================================
