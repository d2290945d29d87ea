// crates/ih_foundation/src/math.rs

//! 数学工具
//!
//! 目前只包含 Lambert W 函数的两个实分支，供球对称吸积剖面
//! 反解马赫数使用。
//!
//! Lambert W 定义为 w·e^w = x 的反函数：
//! - 主分支 W₀：定义域 x ≥ -1/e，值域 w ≥ -1
//! - 分支 W₋₁：定义域 -1/e ≤ x < 0，值域 w ≤ -1

/// -1/e，两个实分支共同的定义域下界
pub const INV_E_NEG: f64 = -0.36787944117144233;

/// Halley 迭代收敛容差（相对）
const TOLERANCE: f64 = 1.0e-14;

/// 最大迭代次数
const MAX_ITERATIONS: usize = 64;

/// Lambert W 主分支 W₀(x)
///
/// # 参数
/// - `x`: 自变量，要求 x ≥ -1/e
///
/// # 返回
/// w 使得 w·e^w = x；参数越界时返回 NaN
pub fn lambert_w0(x: f64) -> f64 {
    if !(x >= INV_E_NEG) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    // 分支点附近直接返回 -1，避免 Halley 迭代分母退化
    if x - INV_E_NEG < 1.0e-16 {
        return -1.0;
    }

    // 初值：x < e 用分支点级数展开，大参数用对数近似
    // （级数在 x → e 处偏差较大，但 f 在 w > -1 上单调，Halley 仍收敛）
    let w0 = if x < std::f64::consts::E {
        let p = (2.0 * (1.0 + std::f64::consts::E * x)).sqrt();
        -1.0 + p - p * p / 3.0
    } else {
        let l1 = x.ln();
        let l2 = l1.ln();
        l1 - l2 + l2 / l1
    };

    halley(x, w0)
}

/// Lambert W 分支 W₋₁(x)
///
/// # 参数
/// - `x`: 自变量，要求 -1/e ≤ x < 0
///
/// # 返回
/// w ≤ -1 使得 w·e^w = x；参数越界时返回 NaN
pub fn lambert_wm1(x: f64) -> f64 {
    if !(x >= INV_E_NEG) || x >= 0.0 {
        return f64::NAN;
    }
    if x - INV_E_NEG < 1.0e-16 {
        return -1.0;
    }

    // 初值：分支点附近用级数，x → 0⁻ 用双重对数
    let w0 = if x < -0.25 {
        let p = (2.0 * (1.0 + std::f64::consts::E * x)).sqrt();
        -1.0 - p - p * p / 3.0
    } else {
        let l1 = (-x).ln();
        let l2 = (-l1).ln();
        l1 - l2 + l2 / l1
    };

    halley(x, w0)
}

/// Halley 迭代求解 w·e^w = x
///
/// 三阶收敛，初值来自调用方的分支相关近似。
fn halley(x: f64, mut w: f64) -> f64 {
    for _ in 0..MAX_ITERATIONS {
        let ew = w.exp();
        let f = w * ew - x;
        let wp1 = w + 1.0;
        let denom = ew * wp1 - (w + 2.0) * f / (2.0 * wp1);
        if denom == 0.0 {
            break;
        }
        let w_next = w - f / denom;
        if (w_next - w).abs() <= TOLERANCE * w_next.abs().max(1.0e-300) {
            return w_next;
        }
        w = w_next;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_inverse(w: f64, x: f64) {
        assert!(
            (w * w.exp() - x).abs() <= 1.0e-12 * x.abs().max(1.0e-300),
            "w e^w = {} != {}",
            w * w.exp(),
            x
        );
    }

    #[test]
    fn test_w0_basic_values() {
        assert_eq!(lambert_w0(0.0), 0.0);
        // W0(e) = 1
        assert!((lambert_w0(std::f64::consts::E) - 1.0).abs() < 1.0e-12);
        // W0(1) = Ω ≈ 0.567143
        assert!((lambert_w0(1.0) - 0.5671432904097838).abs() < 1.0e-12);
    }

    #[test]
    fn test_w0_inverse_identity() {
        for &x in &[-0.3, -0.1, -0.01, 0.5, 2.0, 10.0, 1.0e3, 1.0e8] {
            check_inverse(lambert_w0(x), x);
        }
    }

    #[test]
    fn test_wm1_inverse_identity() {
        for &x in &[-0.36, -0.3, -0.2, -0.1, -0.01, -1.0e-4, -1.0e-10] {
            let w = lambert_wm1(x);
            assert!(w <= -1.0);
            check_inverse(w, x);
        }
    }

    #[test]
    fn test_branch_point() {
        // 两分支在 x = -1/e 处汇合于 w = -1
        assert!((lambert_w0(INV_E_NEG) + 1.0).abs() < 1.0e-6);
        assert!((lambert_wm1(INV_E_NEG) + 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn test_domain_errors() {
        assert!(lambert_w0(-0.4).is_nan());
        assert!(lambert_wm1(0.1).is_nan());
        assert!(lambert_wm1(-0.4).is_nan());
    }
}
