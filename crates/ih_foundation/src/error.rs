// crates/ih_foundation/src/error.rs

//! 基础错误类型
//!
//! 仅包含与基础设施相关的错误，不得出现任何流体或网格概念。
//! 高层错误（如 `ih_hydro::HydroError`)可以包裹本类型。

use thiserror::Error;

/// 基础层错误
#[derive(Debug, Clone, Error)]
pub enum FoundationError {
    /// 单位制基准尺度非正
    #[error("unit scale {name} must be positive and finite, got {value}")]
    InvalidUnitScale {
        /// 尺度名称（length/density/pressure）
        name: &'static str,
        /// 传入的非法值
        value: f64,
    },
}

/// 统一结果类型别名
pub type FoundationResult<T> = Result<T, FoundationError>;
