// crates/ih_foundation/src/constants.rs

//! 物理常数
//!
//! 全部采用 SI 单位的 CODATA 值。自然常数不随内部单位制改变，
//! 换算进内部单位的工作由使用方（见 `ih_hydro` 的积分器）完成。

/// 玻尔兹曼常数 [J/K]
pub const BOLTZMANN_K: f64 = 1.380649e-23;

/// 氢原子（质子）质量 [kg]
pub const HYDROGEN_MASS: f64 = 1.67262192369e-27;

/// 牛顿引力常数 [m³ kg⁻¹ s⁻²]
pub const NEWTON_G: f64 = 6.67430e-11;
