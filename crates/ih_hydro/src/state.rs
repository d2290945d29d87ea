// crates/ih_hydro/src/state.rs

//! 单元流体状态
//!
//! 采用 SoA 布局：每类量一条 `Vec`，按单元编号索引。
//! 状态由调用方持有并以 `&mut` 传给积分器；网格只提供几何与拓扑。
//! 并行阶段因此可以对每个单元的槽位做独占写、对邻居做只读。
//!
//! # 单位约定
//!
//! `initialise` 前：速度、电离变量（数密度 [m⁻³]、温度 [K]）为 SI；
//! `initialise` 后：原始/守恒/通量差/能量源项均为内部单位，
//! 引力加速度仍以 SI 存放（由外部子系统逐步写入），使用时换算。
//!
//! # 源项缓冲的所有权契约
//!
//! `source_energy_rate`（功率，乘 Δt 生效）与 `source_energy`
//! （能量，一次性生效）由其它子系统写入；核心在每步结束时清零。

use glam::DVec3;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// ============================================================
// 单元值类型
// ============================================================

/// 单个单元的原始变量 (ρ, v⃗, p)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Primitives {
    /// 密度
    pub density: f64,
    /// 速度
    pub velocity: DVec3,
    /// 压强
    pub pressure: f64,
}

impl Primitives {
    /// 真空状态
    pub const VACUUM: Self = Self {
        density: 0.0,
        velocity: DVec3::ZERO,
        pressure: 0.0,
    };

    /// 创建原始状态
    #[inline]
    pub const fn new(density: f64, velocity: DVec3, pressure: f64) -> Self {
        Self {
            density,
            velocity,
            pressure,
        }
    }

    /// 状态是否有效（非 NaN/Inf，密度压强非负）
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.density.is_finite()
            && self.velocity.is_finite()
            && self.pressure.is_finite()
            && self.density >= 0.0
            && self.pressure >= 0.0
    }
}

/// 单个单元的原始变量梯度，五个三维向量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrimitiveGradients {
    /// ∇ρ
    pub density: DVec3,
    /// ∇vₓ、∇vᵧ、∇v_z（按行存放）
    pub velocity: [DVec3; 3],
    /// ∇p
    pub pressure: DVec3,
}

impl PrimitiveGradients {
    /// 零梯度
    pub const ZERO: Self = Self {
        density: DVec3::ZERO,
        velocity: [DVec3::ZERO; 3],
        pressure: DVec3::ZERO,
    };
}

/// 单个单元的守恒变量 (m, p⃗, E)，也用作通量差累加器 ΔC
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Conserved {
    /// 质量
    pub mass: f64,
    /// 动量
    pub momentum: DVec3,
    /// 总能（动能 + 内能；γ=1 时被忽略但保持有限）
    pub energy: f64,
}

impl Conserved {
    /// 零状态
    pub const ZERO: Self = Self {
        mass: 0.0,
        momentum: DVec3::ZERO,
        energy: 0.0,
    };

    /// 创建守恒状态
    #[inline]
    pub const fn new(mass: f64, momentum: DVec3, energy: f64) -> Self {
        Self {
            mass,
            momentum,
            energy,
        }
    }

    /// 状态是否有效
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.mass.is_finite() && self.momentum.is_finite() && self.energy.is_finite()
    }
}

impl Add for Conserved {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            mass: self.mass + rhs.mass,
            momentum: self.momentum + rhs.momentum,
            energy: self.energy + rhs.energy,
        }
    }
}

impl AddAssign for Conserved {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Conserved {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            mass: self.mass - rhs.mass,
            momentum: self.momentum - rhs.momentum,
            energy: self.energy - rhs.energy,
        }
    }
}

impl SubAssign for Conserved {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self {
            mass: self.mass * rhs,
            momentum: self.momentum * rhs,
            energy: self.energy * rhs,
        }
    }
}

// ============================================================
// 电离变量
// ============================================================

/// 每单元的电离变量，由电离/辐射转移子系统维护
///
/// 核心只读取中性氢比例 x_H 与温度，并在每步结束时回写
/// 温度（γ>1）与数密度。数密度、温度保持 SI（m⁻³、K）。
#[derive(Debug, Clone, Default)]
pub struct IonizationVariables {
    /// 氢的中性比例 x_H ∈ [0, 1]
    pub neutral_fraction: Vec<f64>,
    /// 温度 [K]
    pub temperature: Vec<f64>,
    /// 氢数密度 [m⁻³]
    pub number_density: Vec<f64>,
}

impl IonizationVariables {
    /// 零初始化
    pub fn zeroed(n_cells: usize) -> Self {
        Self {
            neutral_fraction: vec![0.0; n_cells],
            temperature: vec![0.0; n_cells],
            number_density: vec![0.0; n_cells],
        }
    }
}

// ============================================================
// 全网格状态
// ============================================================

/// 全网格流体状态（SoA）
#[derive(Debug, Clone, Default)]
pub struct HydroState {
    /// 原始变量
    pub primitives: Vec<Primitives>,
    /// 原始变量梯度
    pub gradients: Vec<PrimitiveGradients>,
    /// 守恒变量
    pub conserved: Vec<Conserved>,
    /// 通量差累加器；更新约定为 C ← C − ΔC
    pub delta: Vec<Conserved>,
    /// 外部能量源：功率项，乘 Δt 生效后清零
    pub source_energy_rate: Vec<f64>,
    /// 外部能量源：能量项，一次性生效后清零
    pub source_energy: Vec<f64>,
    /// 引力加速度 [m/s²]，由外部子系统写入，核心只读
    pub acceleration: Vec<DVec3>,
    /// 电离变量
    pub ions: IonizationVariables,
}

impl HydroState {
    /// 按单元数零初始化
    pub fn zeroed(n_cells: usize) -> Self {
        Self {
            primitives: vec![Primitives::default(); n_cells],
            gradients: vec![PrimitiveGradients::ZERO; n_cells],
            conserved: vec![Conserved::ZERO; n_cells],
            delta: vec![Conserved::ZERO; n_cells],
            source_energy_rate: vec![0.0; n_cells],
            source_energy: vec![0.0; n_cells],
            acceleration: vec![DVec3::ZERO; n_cells],
            ions: IonizationVariables::zeroed(n_cells),
        }
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// 把一个单元置为真空：m = 0 ⇒ p⃗ = 0，ρ = v = p = T = 0
    pub fn set_vacuum(&mut self, cell: usize) {
        self.primitives[cell] = Primitives::VACUUM;
        self.conserved[cell] = Conserved::ZERO;
        self.ions.temperature[cell] = 0.0;
        self.ions.number_density[cell] = 0.0;
    }

    /// 总质量（内部单位），守恒性检查用
    pub fn total_mass(&self) -> f64 {
        self.conserved.iter().map(|c| c.mass).sum()
    }

    /// 总动量（内部单位）
    pub fn total_momentum(&self) -> DVec3 {
        self.conserved
            .iter()
            .fold(DVec3::ZERO, |acc, c| acc + c.momentum)
    }

    /// 总能量（内部单位）
    pub fn total_energy(&self) -> f64 {
        self.conserved.iter().map(|c| c.energy).sum()
    }
}
