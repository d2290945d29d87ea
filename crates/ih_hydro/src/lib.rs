// crates/ih_hydro/src/lib.rs

//! IonHydro 流体力学核心
//!
//! 在结构化单元网格上推进电离气体的守恒流体状态，
//! 采用二阶 MUSCL-Hancock 格式：
//! - 原始变量的 Green-Gauss 梯度 + 逐面斜率限制重构 (gradients, reconstruction)
//! - Hancock 半步时间预测
//! - 黎曼求解器驱动的界面通量交换 + 通量限制 (riemann, flux)
//! - 边界条件查询 (boundary)
//! - 可选的辐射加热/冷却源项与保守更新 (integrator)
//!
//! 网格容器、黎曼求解的调用方配置、电离/辐射转移子系统都是外部
//! 协作者，通过窄接口消费（见 [`grid::Grid`]、[`config::HydroConfig`]）。
//!
//! # 单位约定
//!
//! `initialise` 之后所有单元状态都处于内部单位制
//! （[`ih_foundation::units::UnitSystem`]），与外部协作者交换时
//! 才发生换算。

pub mod bondi;
pub mod boundary;
pub mod config;
pub mod error;
pub mod flux;
pub mod gradients;
pub mod grid;
pub mod integrator;
pub mod reconstruction;
pub mod riemann;
pub mod state;

// 重导出常用类型
pub use bondi::BondiProfile;
pub use boundary::{BoundaryKind, BoundarySet, FaceState};
pub use config::{BoundaryConfig, HydroConfig};
pub use error::{HydroError, HydroResult};
pub use flux::{FluxLimits, FLUX_LIMITER};
pub use grid::{CellId, Grid, NeighbourFace, SimulationBox};
pub use integrator::HydroIntegrator;
pub use riemann::{create_solver, ExactRiemannSolver, HllcRiemannSolver, RiemannFlux, RiemannSolver};
pub use state::{Conserved, HydroState, IonizationVariables, Primitives, PrimitiveGradients};
