// crates/ih_hydro/src/config.rs

//! 求解器配置
//!
//! 全部字段可缺省，serde 反序列化时逐字段填入默认值，
//! 因此空配置 `{}` 就是一组可运行的缺省参数。
//! 构造期校验（周期性对称、bondi 需要剖面、γ 合法）
//! 在 [`crate::integrator::HydroIntegrator::new`] 进行。

use serde::{Deserialize, Serialize};

use crate::boundary::{BoundaryKind, BoundarySet};
use crate::error::{HydroError, HydroResult};

/// 流体积分器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydroConfig {
    /// 多方指数 γ；1 表示等温
    #[serde(default = "default_polytropic_index")]
    pub polytropic_index: f64,

    /// 是否启用辐射加热
    #[serde(default = "default_true")]
    pub radiative_heating: bool,

    /// 是否启用辐射冷却
    #[serde(default)]
    pub radiative_cooling: bool,

    /// Courant-Friedrichs-Lewy 时间步常数
    #[serde(default = "default_cfl_constant")]
    pub cfl_constant: f64,

    /// 黎曼求解器名称（"Exact" / "HLLC"）
    #[serde(default = "default_riemann_solver")]
    pub riemann_solver: String,

    /// 中性气体的假定温度 [K]
    #[serde(default = "default_neutral_temperature")]
    pub neutral_temperature: f64,

    /// 电离气体的假定温度 [K]
    #[serde(default = "default_ionised_temperature")]
    pub ionised_temperature: f64,

    /// 激波加热判定温度 [K]；高于此温度的气体不受辐射影响
    #[serde(default = "default_shock_temperature")]
    pub shock_temperature: f64,

    /// 气体速度上限 [m/s]，超出即截断
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,

    /// 六个域边界面的边界条件
    #[serde(default)]
    pub boundaries: BoundaryConfig,
}

fn default_polytropic_index() -> f64 {
    5.0 / 3.0
}
fn default_true() -> bool {
    true
}
fn default_cfl_constant() -> f64 {
    0.2
}
fn default_riemann_solver() -> String {
    "Exact".to_owned()
}
fn default_neutral_temperature() -> f64 {
    100.0
}
fn default_ionised_temperature() -> f64 {
    1.0e4
}
fn default_shock_temperature() -> f64 {
    3.0e4
}
fn default_max_velocity() -> f64 {
    // 实际上不设上限的哨兵值
    1.0e99
}

impl Default for HydroConfig {
    fn default() -> Self {
        Self {
            polytropic_index: default_polytropic_index(),
            radiative_heating: true,
            radiative_cooling: false,
            cfl_constant: default_cfl_constant(),
            riemann_solver: default_riemann_solver(),
            neutral_temperature: default_neutral_temperature(),
            ionised_temperature: default_ionised_temperature(),
            shock_temperature: default_shock_temperature(),
            max_velocity: default_max_velocity(),
            boundaries: BoundaryConfig::default(),
        }
    }
}

impl HydroConfig {
    /// 基本数值合法性检查
    pub fn validate(&self) -> HydroResult<()> {
        if !(self.polytropic_index >= 1.0) {
            return Err(HydroError::InvalidConfig(format!(
                "polytropic index must be >= 1, got {}",
                self.polytropic_index
            )));
        }
        if !(self.cfl_constant > 0.0 && self.cfl_constant <= 1.0) {
            return Err(HydroError::InvalidConfig(format!(
                "CFL constant must lie in (0, 1], got {}",
                self.cfl_constant
            )));
        }
        if !(self.max_velocity > 0.0) {
            return Err(HydroError::InvalidConfig(format!(
                "maximum velocity must be positive, got {}",
                self.max_velocity
            )));
        }
        Ok(())
    }
}

/// 六个域边界面的配置，按 (轴, 低/高侧) 命名
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// x 低侧
    #[serde(default)]
    pub x_low: BoundaryKind,
    /// x 高侧
    #[serde(default)]
    pub x_high: BoundaryKind,
    /// y 低侧
    #[serde(default)]
    pub y_low: BoundaryKind,
    /// y 高侧
    #[serde(default)]
    pub y_high: BoundaryKind,
    /// z 低侧
    #[serde(default)]
    pub z_low: BoundaryKind,
    /// z 高侧
    #[serde(default)]
    pub z_high: BoundaryKind,
}

impl BoundaryConfig {
    /// 六面同一种边界
    pub fn uniform(kind: BoundaryKind) -> Self {
        Self {
            x_low: kind,
            x_high: kind,
            y_low: kind,
            y_high: kind,
            z_low: kind,
            z_high: kind,
        }
    }

    /// 转成按 `轴 × 2 + 侧` 索引的策略表
    pub fn to_set(self) -> BoundarySet {
        BoundarySet::new([
            self.x_low, self.x_high, self.y_low, self.y_high, self.z_low, self.z_high,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HydroConfig::default();
        assert!((config.polytropic_index - 5.0 / 3.0).abs() < 1.0e-15);
        assert!(config.radiative_heating);
        assert!(!config.radiative_cooling);
        assert!((config.cfl_constant - 0.2).abs() < 1.0e-15);
        assert_eq!(config.riemann_solver, "Exact");
        assert_eq!(config.neutral_temperature, 100.0);
        assert_eq!(config.ionised_temperature, 1.0e4);
        assert_eq!(config.shock_temperature, 3.0e4);
        assert_eq!(config.boundaries.x_low, BoundaryKind::Reflective);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_equals_defaults() {
        let parsed: HydroConfig = serde_json::from_str("{}").unwrap();
        let defaults = HydroConfig::default();
        assert_eq!(parsed.riemann_solver, defaults.riemann_solver);
        assert_eq!(parsed.max_velocity, defaults.max_velocity);
        assert_eq!(parsed.boundaries.z_high, defaults.boundaries.z_high);
    }

    #[test]
    fn test_boundary_keywords_round_trip() {
        let parsed: HydroConfig = serde_json::from_str(
            r#"{
                "polytropic_index": 1.0,
                "riemann_solver": "HLLC",
                "boundaries": {
                    "x_low": "periodic",
                    "x_high": "periodic",
                    "y_low": "outflow",
                    "z_high": "bondi"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.polytropic_index, 1.0);
        assert_eq!(parsed.boundaries.x_low, BoundaryKind::Periodic);
        assert_eq!(parsed.boundaries.y_low, BoundaryKind::Outflow);
        assert_eq!(parsed.boundaries.y_high, BoundaryKind::Reflective);
        assert_eq!(parsed.boundaries.z_high, BoundaryKind::Bondi);

        let set = parsed.boundaries.to_set();
        assert_eq!(set.kind(0, 0), BoundaryKind::Periodic);
        assert_eq!(set.kind(1, 0), BoundaryKind::Outflow);
        assert_eq!(set.kind(2, 1), BoundaryKind::Bondi);
        assert!(set.has_bondi());
    }

    #[test]
    fn test_unknown_boundary_keyword_rejected() {
        let result = serde_json::from_str::<HydroConfig>(
            r#"{ "boundaries": { "x_low": "open" } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = HydroConfig::default();
        config.polytropic_index = 0.9;
        assert!(matches!(
            config.validate(),
            Err(HydroError::InvalidConfig(_))
        ));

        let mut config = HydroConfig::default();
        config.cfl_constant = 0.0;
        assert!(config.validate().is_err());
    }
}
