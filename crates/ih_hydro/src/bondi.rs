// crates/ih_hydro/src/bondi.rs

//! 球对称 Bondi 吸积剖面
//!
//! 等温 Bondi 解的解析形式：在 Bondi 半径
//! r_B = G·M/(2c_s²) 处流动恰好跨声速。任意半径上的马赫数
//! v/c_s 由 Lambert W 函数反解：
//!
//! - r > r_B：亚声速支，取主分支 W₀
//! - r < r_B：超声速支，取 W₋₁
//!
//! 剖面作为 `bondi` 边界的外部协作者，在 SI 单位下
//! 回答任意位置的 (ρ, v⃗, p, x_H)。

use glam::DVec3;

use ih_foundation::constants::NEWTON_G;
use ih_foundation::math::{lambert_w0, lambert_wm1, INV_E_NEG};

/// 球对称 Bondi 吸积剖面
#[derive(Debug, Clone)]
pub struct BondiProfile {
    /// 吸积中心位置 [m]
    centre: DVec3,
    /// Bondi 半径 [m]
    bondi_radius: f64,
    /// Bondi 半径处的密度 [kg/m³]
    bondi_density: f64,
    /// 等温声速 [m/s]
    sound_speed: f64,
    /// 电离半径 [m]；0 表示整个剖面为中性
    ionisation_radius: f64,
    /// 电离区内的压强对比度
    pressure_contrast: f64,
}

impl BondiProfile {
    /// 创建剖面
    ///
    /// # 参数
    /// - `centre`: 吸积中心位置 [m]
    /// - `central_mass`: 中心质量 [kg]
    /// - `bondi_density`: Bondi 半径处的密度 [kg/m³]
    /// - `sound_speed`: 等温声速 [m/s]
    pub fn new(centre: DVec3, central_mass: f64, bondi_density: f64, sound_speed: f64) -> Self {
        Self {
            centre,
            bondi_radius: 0.5 * NEWTON_G * central_mass / (sound_speed * sound_speed),
            bondi_density,
            sound_speed,
            ionisation_radius: 0.0,
            pressure_contrast: 1.0,
        }
    }

    /// 设置电离半径与电离区压强对比度
    pub fn with_ionisation(mut self, ionisation_radius: f64, pressure_contrast: f64) -> Self {
        self.ionisation_radius = ionisation_radius;
        self.pressure_contrast = pressure_contrast;
        self
    }

    /// Bondi 半径 [m]
    #[inline]
    pub fn bondi_radius(&self) -> f64 {
        self.bondi_radius
    }

    /// 给定位置上的流体状态
    ///
    /// # 返回
    /// (ρ [kg/m³], v⃗ [m/s], p [Pa], x_H)；速度指向中心（吸积）。
    pub fn hydrodynamic_variables(&self, position: DVec3) -> (f64, DVec3, f64, f64) {
        let offset = position - self.centre;
        let radius = offset.length().max(f64::MIN_POSITIVE);

        let rb = self.bondi_radius / radius;
        let rb2 = rb * rb;
        // Lambert W 自变量解析上落在 [-1/e, 0)，钳掉舍入越界
        let argument = (-rb2 * rb2 * (3.0 - 4.0 * rb).exp()).max(INV_E_NEG);
        let mach = if radius > self.bondi_radius {
            (-lambert_w0(argument)).sqrt()
        } else {
            (-lambert_wm1(argument)).sqrt()
        };

        let density = rb2 * self.bondi_density / mach;
        let velocity = -mach * self.sound_speed * offset / radius;
        let mut pressure = density * self.sound_speed * self.sound_speed;

        let neutral_fraction = if radius < self.ionisation_radius {
            pressure *= self.pressure_contrast;
            0.0
        } else {
            1.0
        };

        (density, velocity, pressure, neutral_fraction)
    }
}
