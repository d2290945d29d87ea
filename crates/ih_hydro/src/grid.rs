// crates/ih_hydro/src/grid.rs

//! 网格接口
//!
//! 核心不拥有网格容器，只消费一个几何/拓扑能力对象。
//! 单元迭代退化为 `0..n_cells` 上的编号循环，邻居枚举通过
//! 轻量描述值 [`NeighbourFace`] 回调给调用方，不产生环状所有权。
//!
//! 所有几何量（中点、体积、面积、界面速度）以 SI 交付，
//! 由核心在使用处换算到内部单位。
//!
//! 访问标记（`reset_access_flags` / `register_access` / `check_access`）
//! 只在 debug 构建下被核心调用，用于检验并行通量扫描
//! 恰好访问每个单元一次；静态网格可以保留默认实现。

use glam::{BVec3, DVec3};

/// 单元编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub usize);

impl CellId {
    /// 取出底层编号
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 模拟盒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    /// 角点 [m]
    pub anchor: DVec3,
    /// 三个边长 [m]
    pub sides: DVec3,
    /// 各轴周期性
    pub periodic: BVec3,
}

impl SimulationBox {
    /// 创建盒子
    pub const fn new(anchor: DVec3, sides: DVec3, periodic: BVec3) -> Self {
        Self {
            anchor,
            sides,
            periodic,
        }
    }
}

/// 一个邻居面的几何描述
///
/// `neighbour` 为 `None` 表示面落在计算域边界上，右侧状态
/// 需要向边界条件查询。周期边界不会出现在这里：网格自己跨越
/// 周期面枚举出真实邻居。
#[derive(Debug, Clone, Copy)]
pub struct NeighbourFace {
    /// 界面另一侧的单元；域边界面为 `None`
    pub neighbour: Option<CellId>,
    /// 面中点 [m]
    pub midpoint: DVec3,
    /// 外向单位法向
    pub normal: DVec3,
    /// 面积 [m²]
    pub area: f64,
    /// 从本单元中点指向邻居中点的位移 [m]（跨周期面时为几何位移）
    pub neighbour_offset: DVec3,
}

/// 网格能力对象
///
/// 实现者持有几何与拓扑；流体状态由 [`crate::state::HydroState`]
/// 单独持有。`Sync` 约束使并行扫描可以共享借用网格。
pub trait Grid: Sync {
    /// 单元数
    fn n_cells(&self) -> usize;

    /// 模拟盒子
    fn simulation_box(&self) -> SimulationBox;

    /// 单元中点 [m]
    fn midpoint(&self, cell: CellId) -> DVec3;

    /// 单元体积 [m³]
    fn volume(&self, cell: CellId) -> f64;

    /// 枚举单元的全部邻居面
    fn for_each_neighbour(&self, cell: CellId, visit: &mut dyn FnMut(NeighbourFace));

    /// 界面移动速度 [m/s]（静态网格为零）
    fn interface_velocity(&self, _cell: CellId, _neighbour: CellId, _midpoint: DVec3) -> DVec3 {
        DVec3::ZERO
    }

    /// 更新网格运动速度（移动网格用；静态网格为空操作）
    fn set_grid_velocity(&mut self, _gamma: f64, _velocity_unit_si: f64) {}

    /// 推进网格自身运动 Δt [s]
    fn evolve(&mut self, _timestep: f64) {}

    /// 清零访问标记
    fn reset_access_flags(&self) {}

    /// 记录一次单元访问
    fn register_access(&self, _cell: CellId) {}

    /// 检查每个单元是否恰好被访问一次
    fn check_access(&self) -> bool {
        true
    }
}
