// crates/ih_foundation/src/units.rs

//! 内部单位制
//!
//! 流体求解内部使用无量纲单位，把所有量的数值压到 1 附近，
//! 避免天体物理 SI 量级（密度 ~1e-21，长度 ~1e16）带来的舍入损失。
//!
//! 三个独立基准尺度在初始化时确定：
//! - L₀：盒子平均边长
//! - ρ₀：平均密度
//! - p₀：平均压强
//!
//! 导出单位：
//! - 时间 t₀ = L₀·√(ρ₀/p₀)
//! - 速度 v₀ = L₀/t₀ = √(p₀/ρ₀)
//! - 质量 m₀ = ρ₀·L₀³
//! - 能量 E₀ = m₀·v₀²
//!
//! 换算只发生在与外部协作者的边界上；内层循环一律使用内部量。

use crate::error::{FoundationError, FoundationResult};

// ============================================================
// 物理量枚举
// ============================================================

/// 支持换算的物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// 长度 [m]
    Length,
    /// 表面积 [m²]
    SurfaceArea,
    /// 体积 [m³]
    Volume,
    /// 质量 [kg]
    Mass,
    /// 速度 [m/s]
    Velocity,
    /// 加速度 [m/s²]
    Acceleration,
    /// 密度 [kg/m³]
    Density,
    /// 压强 [Pa]
    Pressure,
    /// 动量 [kg m/s]
    Momentum,
    /// 能量 [J]
    Energy,
    /// 时间 [s]
    Time,
}

impl Quantity {
    /// 物理量个数
    pub const COUNT: usize = 11;

    /// 全部物理量，便于测试遍历
    pub const ALL: [Quantity; Self::COUNT] = [
        Quantity::Length,
        Quantity::SurfaceArea,
        Quantity::Volume,
        Quantity::Mass,
        Quantity::Velocity,
        Quantity::Acceleration,
        Quantity::Density,
        Quantity::Pressure,
        Quantity::Momentum,
        Quantity::Energy,
        Quantity::Time,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

// ============================================================
// 单位制
// ============================================================

/// 内部单位制
///
/// 小而不可变的值类型：构造后 11 个换算因子全部固定。
/// 既可按值传递也可借用，无生命周期负担。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSystem {
    /// 一个内部单位对应的 SI 数值，按 [`Quantity`] 的判别值索引
    in_si: [f64; Quantity::COUNT],
    /// 上表的逐项倒数（一个 SI 单位对应的内部数值）
    in_internal: [f64; Quantity::COUNT],
}

impl UnitSystem {
    /// 由三个基准尺度构造单位制
    ///
    /// # 参数
    /// - `length`: 长度单位 L₀ [m]
    /// - `density`: 密度单位 ρ₀ [kg/m³]
    /// - `pressure`: 压强单位 p₀ [Pa]
    pub fn new(length: f64, density: f64, pressure: f64) -> FoundationResult<Self> {
        let check = |name: &'static str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(value)
            } else {
                Err(FoundationError::InvalidUnitScale { name, value })
            }
        };
        let length = check("length", length)?;
        let density = check("density", density)?;
        let pressure = check("pressure", pressure)?;

        let time = length * (density / pressure).sqrt();
        let velocity = length / time;
        let mass = density * length * length * length;

        let mut in_si = [1.0; Quantity::COUNT];
        in_si[Quantity::Length.index()] = length;
        in_si[Quantity::SurfaceArea.index()] = length * length;
        in_si[Quantity::Volume.index()] = length * length * length;
        in_si[Quantity::Mass.index()] = mass;
        in_si[Quantity::Velocity.index()] = velocity;
        in_si[Quantity::Acceleration.index()] = velocity / time;
        in_si[Quantity::Density.index()] = density;
        in_si[Quantity::Pressure.index()] = pressure;
        in_si[Quantity::Momentum.index()] = mass * velocity;
        in_si[Quantity::Energy.index()] = mass * velocity * velocity;
        in_si[Quantity::Time.index()] = time;

        let mut in_internal = [1.0; Quantity::COUNT];
        for i in 0..Quantity::COUNT {
            in_internal[i] = 1.0 / in_si[i];
        }

        Ok(Self { in_si, in_internal })
    }

    /// 平凡单位制（所有因子为 1），初始化完成前的占位
    pub fn trivial() -> Self {
        Self {
            in_si: [1.0; Quantity::COUNT],
            in_internal: [1.0; Quantity::COUNT],
        }
    }

    /// 一个内部单位的 SI 数值
    #[inline]
    pub fn internal_unit_in_si(&self, quantity: Quantity) -> f64 {
        self.in_si[quantity.index()]
    }

    /// 一个 SI 单位的内部数值
    #[inline]
    pub fn si_unit_in_internal(&self, quantity: Quantity) -> f64 {
        self.in_internal[quantity.index()]
    }

    /// SI → 内部单位
    #[inline]
    pub fn to_internal(&self, quantity: Quantity, value_si: f64) -> f64 {
        value_si * self.in_internal[quantity.index()]
    }

    /// 内部单位 → SI
    #[inline]
    pub fn to_si(&self, quantity: Quantity, value_internal: f64) -> f64 {
        value_internal * self.in_si[quantity.index()]
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::trivial()
    }
}

// ============================================================
// 测试
// ============================================================
