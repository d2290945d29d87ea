// crates/ih_hydro/src/boundary.rs

//! 边界条件
//!
//! 域边界面的右侧状态由本模块的"边界预言机"构造：
//! 给定左侧单元的面状态、外向法向与右侧参考点，按该面所属轴向
//! 与侧别查策略表，就地改写一份左侧状态的拷贝。
//!
//! 策略表是 6 元数组，按 `轴 × 2 + 侧` 索引
//! （0 = x 低侧，1 = x 高侧，2 = y 低侧，……）。
//!
//! 周期边界不经过预言机：网格跨周期面枚举出真实邻居。
//! `Inflow` 与 `Reflective` 行为一致（无汇默认）。

use glam::{BVec3, DVec3};
use serde::{Deserialize, Serialize};

use ih_foundation::units::{Quantity, UnitSystem};

use crate::bondi::BondiProfile;
use crate::error::{HydroError, HydroResult};
use crate::state::{PrimitiveGradients, Primitives};

// ============================================================
// 边界类型
// ============================================================

/// 边界条件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// 周期边界：必须按轴成对出现，且网格盒子同轴周期
    Periodic,
    /// 反射边界：法向速度翻转，对应梯度分量取反
    #[default]
    Reflective,
    /// 入流边界：无汇默认下与反射一致
    Inflow,
    /// 出流边界：拷贝左侧状态；回流时镜像法向速度
    Outflow,
    /// Bondi 吸积边界：右侧状态取自解析吸积剖面
    Bondi,
}

impl BoundaryKind {
    /// 关键字（与 serde 反序列化使用的拼写一致）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::Reflective => "reflective",
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
            Self::Bondi => "bondi",
        }
    }

    /// 是否翻转法向速度（反射族）
    #[inline]
    pub fn is_reflecting(&self) -> bool {
        matches!(self, Self::Reflective | Self::Inflow)
    }
}

impl std::fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================
// 策略表
// ============================================================

/// 六个域边界面的策略表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundarySet {
    kinds: [BoundaryKind; 6],
}

impl BoundarySet {
    /// 按 (x低, x高, y低, y高, z低, z高) 创建
    pub const fn new(kinds: [BoundaryKind; 6]) -> Self {
        Self { kinds }
    }

    /// 查询某轴某侧的策略
    ///
    /// # 参数
    /// - `axis`: 0..3
    /// - `side`: 0 = 低侧，1 = 高侧
    #[inline]
    pub fn kind(&self, axis: usize, side: usize) -> BoundaryKind {
        self.kinds[2 * axis + side]
    }

    /// 是否存在 bondi 面（任意一面都要求剖面存在）
    pub fn has_bondi(&self) -> bool {
        self.kinds.contains(&BoundaryKind::Bondi)
    }

    /// 构造期校验：周期性按轴对称，且与网格盒子周期性一致
    pub fn validate(&self, box_periodicity: BVec3) -> HydroResult<()> {
        let periodic = [box_periodicity.x, box_periodicity.y, box_periodicity.z];
        for (axis, name) in ['x', 'y', 'z'].into_iter().enumerate() {
            let low = self.kind(axis, 0) == BoundaryKind::Periodic;
            let high = self.kind(axis, 1) == BoundaryKind::Periodic;
            if low != high {
                return Err(HydroError::AsymmetricPeriodicity { axis: name });
            }
            if low && !periodic[axis] {
                return Err(HydroError::PeriodicityMismatch { axis: name });
            }
        }
        Ok(())
    }
}

impl Default for BoundarySet {
    fn default() -> Self {
        Self::new([BoundaryKind::Reflective; 6])
    }
}

// ============================================================
// 面状态与预言机
// ============================================================

/// 界面一侧的流体状态：原始变量加五个梯度
#[derive(Debug, Clone, Copy)]
pub struct FaceState {
    /// 密度
    pub density: f64,
    /// 速度
    pub velocity: DVec3,
    /// 压强
    pub pressure: f64,
    /// ∇ρ
    pub grad_density: DVec3,
    /// ∇vₓ、∇vᵧ、∇v_z
    pub grad_velocity: [DVec3; 3],
    /// ∇p
    pub grad_pressure: DVec3,
}

impl FaceState {
    /// 由单元的原始变量与梯度组装
    #[inline]
    pub fn from_cell(primitives: &Primitives, gradients: &PrimitiveGradients) -> Self {
        Self {
            density: primitives.density,
            velocity: primitives.velocity,
            pressure: primitives.pressure,
            grad_density: gradients.density,
            grad_velocity: gradients.velocity,
            grad_pressure: gradients.pressure,
        }
    }
}

/// 域边界面的右侧状态构造
///
/// `state` 进入时是左侧状态的拷贝，按面法向逐轴套用策略后
/// 就地成为右侧状态。通量限制量沿用左侧单元，由调用方处理。
///
/// # 参数
/// - `state`: 左侧状态拷贝，就地改写
/// - `normal`: 外向法向
/// - `position_r`: 右侧参考点（左中点 + 面位移）[m]
/// - `boundaries`: 策略表
/// - `bondi`: 吸积剖面；存在 bondi 面时必须为 `Some`（构造期已校验）
/// - `units`: 内部单位制，用于换算剖面给出的 SI 状态
pub fn apply_boundary(
    state: &mut FaceState,
    normal: DVec3,
    position_r: DVec3,
    boundaries: &BoundarySet,
    bondi: Option<&BondiProfile>,
    units: &UnitSystem,
) {
    for axis in 0..3 {
        let side = if normal[axis] < 0.0 {
            0
        } else if normal[axis] > 0.0 {
            1
        } else {
            continue;
        };

        match boundaries.kind(axis, side) {
            BoundaryKind::Reflective | BoundaryKind::Inflow => {
                state.velocity[axis] = -state.velocity[axis];
                state.grad_density[axis] = -state.grad_density[axis];
                // 只翻转与面不正交的梯度分量；
                // 速度法向分量在自己的梯度行里保持符号
                state.grad_velocity[(axis + 1) % 3][axis] =
                    -state.grad_velocity[(axis + 1) % 3][axis];
                state.grad_velocity[(axis + 2) % 3][axis] =
                    -state.grad_velocity[(axis + 2) % 3][axis];
                state.grad_pressure[axis] = -state.grad_pressure[axis];
            }
            BoundaryKind::Bondi => {
                let profile = bondi.expect("bondi boundary without profile");
                let (density, velocity, pressure, _neutral_fraction) =
                    profile.hydrodynamic_variables(position_r);
                state.density = units.to_internal(Quantity::Density, density);
                state.velocity = velocity * units.si_unit_in_internal(Quantity::Velocity);
                state.pressure = units.to_internal(Quantity::Pressure, pressure);
                // 剖面梯度视为零
                state.grad_density = DVec3::ZERO;
                state.grad_velocity = [DVec3::ZERO; 3];
                state.grad_pressure = DVec3::ZERO;
            }
            BoundaryKind::Outflow => {
                // 只有当气体要流回盒子时才镜像法向速度并抹平其梯度行
                if state.velocity[axis] * normal[axis] < 0.0 {
                    state.velocity[axis] = -state.velocity[axis];
                    state.grad_velocity[axis] = DVec3::ZERO;
                }
            }
            BoundaryKind::Periodic => {
                // 周期邻居由网格直接枚举，预言机不应被问到；
                // 保持拷贝语义即可
            }
        }
    }
}

// ============================================================
// 测试
// ============================================================
