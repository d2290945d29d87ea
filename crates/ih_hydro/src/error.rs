// crates/ih_hydro/src/error.rs

//! 核心错误类型
//!
//! 错误分两类：
//! - 构造期配置错误（不对称周期边界、缺少 Bondi 剖面、未知关键字），
//!   在求解器创建时立即失败；
//! - 运行期契约违约（通量扫描漏访单元、限制因子越界），
//!   整步中止，不做局部恢复。
//!
//! 通量中出现 NaN 属于调试断言（`debug_assert!`），release 构建下
//! 由安全钳制（ρ、p、m、E ≥ 0）兜底。

use thiserror::Error;

/// 核心统一错误
#[derive(Debug, Error)]
pub enum HydroError {
    /// 单侧周期边界：周期性必须按轴成对出现
    #[error("periodic boundaries along {axis} only work if both {axis} boundaries are periodic")]
    AsymmetricPeriodicity {
        /// 轴名（x/y/z）
        axis: char,
    },

    /// 边界周期而网格盒子不周期
    #[error("periodic boundaries along {axis} only work if the grid box is also periodic in {axis}")]
    PeriodicityMismatch {
        /// 轴名（x/y/z）
        axis: char,
    },

    /// 任意一面使用 bondi 边界都要求提供吸积剖面
    #[error("bondi inflow boundaries only work if a Bondi profile is given")]
    MissingBondiProfile,

    /// 未知黎曼求解器名称
    #[error("unknown Riemann solver type: {0}")]
    UnknownSolver(String),

    /// 其它非法配置
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 状态向量长度与网格单元数不符
    #[error("hydro state holds {state} cells but the grid has {grid}")]
    StateSizeMismatch {
        /// 状态长度
        state: usize,
        /// 网格单元数
        grid: usize,
    },

    /// 并行通量扫描没有恰好访问每个单元一次
    #[error("access error in the hydro flux exchange sweep")]
    AccessViolation,

    /// 通量限制因子跑出 [0, 1]，指示上游出现 NaN/Inf
    #[error("flux limit factor {factor} outside [0, 1]")]
    FluxFactorOutOfRange {
        /// 越界的因子
        factor: f64,
    },

    /// 基础层错误（单位制构造等）
    #[error(transparent)]
    Foundation(#[from] ih_foundation::FoundationError),
}

/// 统一结果类型别名
pub type HydroResult<T> = Result<T, HydroError>;
