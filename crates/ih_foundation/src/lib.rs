// crates/ih_foundation/src/lib.rs

//! IonHydro 基础层
//!
//! 提供与物理求解无关的基础设施：
//! - 物理常数 (constants)
//! - 数学工具 (math) - Lambert W 函数
//! - 内部单位制 (units) - 无量纲化换算
//! - 基础错误类型 (error)
//!
//! # 设计原则
//!
//! 本 crate 是最底层，禁止引入任何流体力学或网格概念，
//! 上层 crate（如 `ih_hydro`）只通过这里定义的纯数值接口交互。

pub mod constants;
pub mod error;
pub mod math;
pub mod units;

pub use error::FoundationError;
pub use units::{Quantity, UnitSystem};
