// crates/ih_hydro/src/integrator.rs

//! 流体积分器
//!
//! 编排一个完整的 MUSCL-Hancock 时间步：
//!
//! 1. Δt 换算到内部单位
//! 2. 梯度遍历（并行）
//! 3. Hancock 半步时间预测（串行逐单元）
//! 4. 通量遍历（并行）：逐面重构 → 黎曼求解 → 通量限制 → 累加 ΔC
//! 5. 辐射加热/冷却源项（可选，串行）
//! 6. 保守更新 C ← C − ΔC，叠加引力与外部能量源
//! 7. 网格自身运动推进
//! 8. 原始变量恢复（含速度与声速上限）
//! 9. 重算网格运动速度
//!
//! 两个并行阶段都只对本单元槽位独占写、对邻居只读，
//! 单元顺序不影响结果。通量遍历后核对访问标记，
//! 漏访单元按契约违约中止。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use glam::{BVec3, DVec3};
use rayon::prelude::*;

use ih_foundation::constants::{BOLTZMANN_K, HYDROGEN_MASS};
use ih_foundation::units::{Quantity, UnitSystem};

use crate::bondi::BondiProfile;
use crate::boundary::{apply_boundary, BoundarySet, FaceState};
use crate::config::HydroConfig;
use crate::error::{HydroError, HydroResult};
use crate::flux::{compute_face_flux, limit_flux, FluxLimits};
use crate::gradients::compute_primitive_gradients;
use crate::grid::{CellId, Grid};
use crate::riemann::{create_solver, RiemannSolver};
use crate::state::{Conserved, HydroState, Primitives};

/// 流体积分器
///
/// 配置、单位制、求解器与边界表在一个步内全部只读共享；
/// `initialise` 是唯一改写自身状态（定标单位制与换算因子）的操作。
pub struct HydroIntegrator {
    /// 多方指数 γ
    gamma: f64,
    /// γ - 1
    gm1: f64,
    /// 1/(γ-1)；γ = 1 时为 +inf，等温路径不使用
    gm1_inv: f64,
    /// 等温运行标志
    isothermal: bool,
    /// 辐射加热开关
    do_radiative_heating: bool,
    /// 辐射冷却开关
    do_radiative_cooling: bool,
    /// CFL 常数
    cfl_constant: f64,
    /// 中性气体温度 [K]
    neutral_temperature: f64,
    /// 电离气体温度 [K]
    ionised_temperature: f64,
    /// 激波判定温度 [K]
    shock_temperature: f64,
    /// 速度上限；`initialise` 前为 SI，之后为内部单位
    max_velocity: f64,
    /// 温度 → 比内能，u_fac = k/((γ-1)m_H)
    u_conversion_factor: f64,
    /// 压强/密度 → 温度，T_fac = m_H/k
    t_conversion_factor: f64,
    /// 温度 → 压强/密度，P_fac = k/m_H
    p_conversion_factor: f64,
    /// 密度 → 数密度，n_fac = 1/m_H
    n_conversion_factor: f64,
    /// 内部单位制；`initialise` 时由平均状态定标
    units: UnitSystem,
    /// 黎曼求解器
    solver: Box<dyn RiemannSolver>,
    /// 边界策略表
    boundaries: BoundarySet,
    /// Bondi 吸积剖面（bondi 边界用）
    bondi: Option<BondiProfile>,
}

impl HydroIntegrator {
    /// 创建积分器
    ///
    /// # 参数
    /// - `config`: 求解器配置
    /// - `box_periodicity`: 网格盒子的周期性标志，用于校验边界配置
    /// - `bondi`: 吸积剖面；任何一面配置为 bondi 时必须提供
    pub fn new(
        config: &HydroConfig,
        box_periodicity: BVec3,
        bondi: Option<BondiProfile>,
    ) -> HydroResult<Self> {
        config.validate()?;

        let boundaries = config.boundaries.to_set();
        boundaries.validate(box_periodicity)?;
        if boundaries.has_bondi() && bondi.is_none() {
            return Err(HydroError::MissingBondiProfile);
        }

        let gamma = config.polytropic_index;
        let solver = create_solver(&config.riemann_solver, gamma)?;
        let gm1 = gamma - 1.0;
        let gm1_inv = 1.0 / gm1;

        Ok(Self {
            gamma,
            gm1,
            gm1_inv,
            isothermal: gamma == 1.0,
            do_radiative_heating: config.radiative_heating,
            do_radiative_cooling: config.radiative_cooling,
            cfl_constant: config.cfl_constant,
            neutral_temperature: config.neutral_temperature,
            ionised_temperature: config.ionised_temperature,
            shock_temperature: config.shock_temperature,
            max_velocity: config.max_velocity,
            u_conversion_factor: BOLTZMANN_K * gm1_inv / HYDROGEN_MASS,
            t_conversion_factor: HYDROGEN_MASS / BOLTZMANN_K,
            p_conversion_factor: BOLTZMANN_K / HYDROGEN_MASS,
            n_conversion_factor: 1.0 / HYDROGEN_MASS,
            units: UnitSystem::trivial(),
            solver,
            boundaries,
            bondi,
        })
    }

    /// 内部单位制
    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    /// 由电离变量初始化流体状态
    ///
    /// 调用方先在 `state.ions` 填入数密度与温度（SI），并把初始
    /// 速度（SI）写入 `state.primitives`。本方法：
    /// 1. 逐单元构造原始与守恒变量（SI），电离气体压强翻倍
    /// 2. 按平均盒边长、平均密度、平均压强定标内部单位制
    /// 3. 把全部状态与换算因子缩放到内部单位
    /// 4. 通知网格计算运动速度
    pub fn initialise<G: Grid>(&mut self, grid: &mut G, state: &mut HydroState) -> HydroResult<()> {
        let n_cells = grid.n_cells();
        if state.len() != n_cells {
            return Err(HydroError::StateSizeMismatch {
                state: state.len(),
                grid: n_cells,
            });
        }

        let sides = grid.simulation_box().sides;
        let average_box_size = (sides.x + sides.y + sides.z) / 3.0;

        let mut average_density = 0.0;
        let mut average_pressure = 0.0;
        for i in 0..n_cells {
            let volume = grid.volume(CellId(i));
            let density = state.ions.number_density[i] * HYDROGEN_MASS;
            let temperature = state.ions.temperature[i];

            let mut velocity = state.primitives[i].velocity;
            let speed = velocity.length();
            if speed > self.max_velocity {
                velocity *= self.max_velocity / speed;
            }

            // 完全中性或完全电离的近似；电离气体平均分子质量减半
            let mut pressure = density * self.p_conversion_factor * temperature;
            if temperature >= self.ionised_temperature {
                pressure *= 2.0;
            }

            state.primitives[i] = Primitives::new(density, velocity, pressure);
            average_density += density;
            average_pressure += pressure;

            let mass = density * volume;
            let momentum = mass * velocity;
            let kinetic = 0.5 * velocity.dot(momentum);
            let energy = if self.gamma > 1.0 {
                // E = V·p/(γ-1) + ½p⃗·v⃗
                volume * pressure * self.gm1_inv + kinetic
            } else {
                // 能量槽被忽略，但必须保持有限
                kinetic
            };
            state.conserved[i] = Conserved::new(mass, momentum, energy);
        }

        average_density /= n_cells as f64;
        average_pressure /= n_cells as f64;
        self.units = UnitSystem::new(average_box_size, average_density, average_pressure)?;
        log::info!(
            "内部单位定标: L0 = {:.6e} m, rho0 = {:.6e} kg/m^3, P0 = {:.6e} Pa",
            average_box_size,
            average_density,
            average_pressure
        );

        // 把物理换算因子一次性缩放进内部单位，内层循环不再换算
        let velocity_unit_internal = self.units.si_unit_in_internal(Quantity::Velocity);
        let velocity_unit_internal2 = velocity_unit_internal * velocity_unit_internal;
        self.p_conversion_factor *= velocity_unit_internal2;
        self.u_conversion_factor *= velocity_unit_internal2;
        let velocity_unit_si = self.units.internal_unit_in_si(Quantity::Velocity);
        self.t_conversion_factor *= velocity_unit_si * velocity_unit_si;
        self.n_conversion_factor *= self.units.internal_unit_in_si(Quantity::Density);

        // 全部状态缩放到内部单位
        for i in 0..n_cells {
            let p = &mut state.primitives[i];
            p.density = self.units.to_internal(Quantity::Density, p.density);
            p.velocity *= velocity_unit_internal;
            p.pressure = self.units.to_internal(Quantity::Pressure, p.pressure);

            let c = &mut state.conserved[i];
            c.mass = self.units.to_internal(Quantity::Mass, c.mass);
            c.momentum *= self.units.si_unit_in_internal(Quantity::Momentum);
            c.energy = self.units.to_internal(Quantity::Energy, c.energy);
        }

        grid.set_grid_velocity(self.gamma, self.units.internal_unit_in_si(Quantity::Velocity));
        self.max_velocity = self.units.to_internal(Quantity::Velocity, self.max_velocity);
        Ok(())
    }

    /// 单元声速（内部单位）
    ///
    /// γ > 1：c = √(γp/ρ)，真空单元取最小正数；
    /// γ = 1：等温声速 c = √(P_fac·T/μ)，μ = ½(1+x_H)。
    fn sound_speed(&self, primitives: &Primitives, neutral_fraction: f64, temperature: f64) -> f64 {
        if self.gamma > 1.0 {
            if primitives.density > 0.0 {
                (self.gamma * primitives.pressure / primitives.density).sqrt()
            } else {
                f64::MIN_POSITIVE
            }
        } else {
            let mean_molecular_mass = 0.5 * (1.0 + neutral_fraction);
            (self.p_conversion_factor * temperature / mean_molecular_mass).sqrt()
        }
    }

    /// 稳定积分允许的最大时间步 [s]
    ///
    /// 每单元的稳定时间为 R/(c_s + |v|)，R 为等体积球半径；
    /// 取全网格最小值乘 CFL 常数。
    pub fn max_timestep<G: Grid>(&self, grid: &G, state: &HydroState) -> f64 {
        // 原子位编码取最小值：非负 f64 的位序与数值序一致
        let minimum = AtomicU64::new(f64::MAX.to_bits());

        (0..grid.n_cells()).into_par_iter().for_each(|i| {
            let primitives = &state.primitives[i];
            let sound_speed = self.sound_speed(
                primitives,
                state.ions.neutral_fraction[i],
                state.ions.temperature[i],
            );
            let speed = primitives.velocity.length();
            debug_assert!(!speed.is_infinite());

            let volume = self.units.to_internal(Quantity::Volume, grid.volume(CellId(i)));
            let radius = (0.75 * volume * std::f64::consts::FRAC_1_PI).cbrt();
            let dt = radius / (sound_speed + speed);
            minimum.fetch_min(dt.to_bits(), Ordering::Relaxed);
        });

        let dt_min = f64::from_bits(minimum.load(Ordering::Relaxed));
        debug_assert!(dt_min > 0.0);
        self.units
            .to_si(Quantity::Time, self.cfl_constant * dt_min)
    }

    /// 推进一个流体时间步
    ///
    /// # 参数
    /// - `timestep`: Δt [s]
    pub fn do_step<G: Grid>(
        &self,
        grid: &mut G,
        state: &mut HydroState,
        timestep: f64,
    ) -> HydroResult<()> {
        let n_cells = grid.n_cells();
        if state.len() != n_cells {
            return Err(HydroError::StateSizeMismatch {
                state: state.len(),
                grid: n_cells,
            });
        }
        let dt = self.units.to_internal(Quantity::Time, timestep);

        // 梯度遍历（并行）
        {
            let HydroState {
                primitives,
                gradients,
                ..
            } = state;
            compute_primitive_gradients(
                &*grid,
                primitives,
                gradients,
                &self.boundaries,
                self.bondi.as_ref(),
                &self.units,
            );
        }

        // Hancock 半步预测
        self.hancock_half_step(state, dt);

        // 通量遍历（并行）
        self.flux_sweep(&*grid, state, dt)?;

        // 辐射源项
        if self.do_radiative_heating || self.do_radiative_cooling {
            self.radiation_source_term(state);
        }

        // 保守更新
        self.conservative_update(state, dt);

        // 网格自身运动
        grid.evolve(timestep);

        // 原始变量恢复
        self.recover_primitives(&*grid, state);

        grid.set_grid_velocity(self.gamma, self.units.internal_unit_in_si(Quantity::Velocity));
        Ok(())
    }

    /// Hancock 半步：用已知梯度把原始变量推进 Δt/2
    fn hancock_half_step(&self, state: &mut HydroState, dt: f64) {
        let half_dt = 0.5 * dt;
        let acceleration_to_internal = self.units.si_unit_in_internal(Quantity::Acceleration);

        for i in 0..state.len() {
            let primitives = state.primitives[i];
            let density = primitives.density;
            let density_inv = 1.0 / density;
            if !(density > 0.0) || density_inv.is_infinite() {
                continue;
            }
            let velocity = primitives.velocity;
            let pressure = primitives.pressure;
            let acceleration = state.acceleration[i] * acceleration_to_internal;
            let gradients = &state.gradients[i];

            let div_v = gradients.velocity[0].x + gradients.velocity[1].y + gradients.velocity[2].z;

            let density_new =
                density - half_dt * (density * div_v + velocity.dot(gradients.density));
            let velocity_new = velocity
                - half_dt * (velocity * div_v + density_inv * gradients.pressure - acceleration);
            let pressure_new = pressure
                - half_dt * (self.gamma * pressure * div_v + velocity.dot(gradients.pressure));

            debug_assert!(
                density_new.is_finite(),
                "rho: {}, divv: {}, u: {:?}, grad_rho: {:?}",
                density,
                div_v,
                velocity,
                gradients.density
            );
            debug_assert!(
                velocity_new.is_finite(),
                "u: {:?}, divv: {}, grad_P: {:?}, a: {:?}",
                velocity,
                div_v,
                gradients.pressure,
                acceleration
            );
            debug_assert!(
                pressure_new.is_finite(),
                "P: {}, divv: {}, u: {:?}, grad_P: {:?}",
                pressure,
                div_v,
                velocity,
                gradients.pressure
            );

            state.primitives[i] = Primitives::new(density_new, velocity_new, pressure_new);
        }
    }

    /// 并行通量遍历：逐单元枚举邻居面，把限制后的通量累入 ΔC
    fn flux_sweep<G: Grid>(&self, grid: &G, state: &mut HydroState, dt: f64) -> HydroResult<()> {
        grid.reset_access_flags();

        // 越界的限制因子在并行段内只登记，串行段再报告
        let bad_factor_seen = AtomicBool::new(false);
        let bad_factor_bits = AtomicU64::new(0);

        {
            let HydroState {
                primitives,
                gradients,
                conserved,
                delta,
                ..
            } = state;
            let primitives: &[Primitives] = primitives;
            let gradients = &gradients[..];
            let conserved: &[Conserved] = conserved;

            delta.par_iter_mut().enumerate().for_each(|(i, slot)| {
                let cell = CellId(i);
                grid.register_access(cell);
                *slot = self.cell_flux_delta(
                    grid,
                    cell,
                    primitives,
                    gradients,
                    conserved,
                    dt,
                    &bad_factor_seen,
                    &bad_factor_bits,
                );
            });
        }

        if bad_factor_seen.load(Ordering::Relaxed) {
            return Err(HydroError::FluxFactorOutOfRange {
                factor: f64::from_bits(bad_factor_bits.load(Ordering::Relaxed)),
            });
        }
        if !grid.check_access() {
            return Err(HydroError::AccessViolation);
        }
        Ok(())
    }

    /// 单个单元对自身 ΔC 的全部面贡献
    #[allow(clippy::too_many_arguments)]
    fn cell_flux_delta<G: Grid>(
        &self,
        grid: &G,
        cell: CellId,
        primitives: &[Primitives],
        gradients: &[crate::state::PrimitiveGradients],
        conserved: &[Conserved],
        dt: f64,
        bad_factor_seen: &AtomicBool,
        bad_factor_bits: &AtomicU64,
    ) -> Conserved {
        let position_l = grid.midpoint(cell);
        let left = FaceState::from_cell(&primitives[cell.get()], &gradients[cell.get()]);
        let limits_l = FluxLimits::of_cell(&conserved[cell.get()], &primitives[cell.get()], self.gamma);

        let length_to_internal = self.units.si_unit_in_internal(Quantity::Length);
        let length_to_si = self.units.internal_unit_in_si(Quantity::Length);
        let velocity_to_internal = self.units.si_unit_in_internal(Quantity::Velocity);

        let mut delta = Conserved::ZERO;
        grid.for_each_neighbour(cell, &mut |face| {
            let area = self.units.to_internal(Quantity::SurfaceArea, face.area);
            let position_r = position_l + face.neighbour_offset;

            let d_l = (face.midpoint - position_l) * length_to_internal;
            let d_r = (face.midpoint - position_r) * length_to_internal;
            let r_inv = length_to_si / (position_l - position_r).length();
            let dl_over_r = d_l.length() * r_inv;
            let dr_over_r = d_r.length() * r_inv;

            // 右侧状态：内部邻居直接读取，域边界向预言机查询
            let (right, vframe, limits_r) = match face.neighbour {
                Some(neighbour) => (
                    FaceState::from_cell(&primitives[neighbour.get()], &gradients[neighbour.get()]),
                    grid.interface_velocity(cell, neighbour, face.midpoint) * velocity_to_internal,
                    FluxLimits::of_cell(
                        &conserved[neighbour.get()],
                        &primitives[neighbour.get()],
                        self.gamma,
                    ),
                ),
                None => {
                    let mut right = left;
                    apply_boundary(
                        &mut right,
                        face.normal,
                        position_r,
                        &self.boundaries,
                        self.bondi.as_ref(),
                        &self.units,
                    );
                    // 边界面的通量限制量沿用左单元
                    (right, DVec3::ZERO, limits_l)
                }
            };

            let flux = compute_face_flux(
                &left,
                &right,
                d_l,
                d_r,
                dl_over_r,
                dr_over_r,
                self.solver.as_ref(),
                face.normal,
                vframe,
                area,
                dt,
                self.isothermal,
            );

            let factor = limit_flux(
                flux.mass,
                flux.momentum.length_squared(),
                flux.energy,
                &limits_l,
                &limits_r,
                self.isothermal,
            );
            if !(0.0..=1.0).contains(&factor) && !bad_factor_seen.swap(true, Ordering::Relaxed) {
                bad_factor_bits.store(factor.to_bits(), Ordering::Relaxed);
            }

            delta.mass += factor * flux.mass;
            delta.momentum += factor * flux.momentum;
            delta.energy += factor * flux.energy;
        });
        delta
    }

    /// 辐射加热/冷却源项
    ///
    /// 目标温度按中性比例在电离/中性温度之间插值。
    /// 外部能量缓冲为正或当前温度高于激波温度的单元视为
    /// 激波加热，不做辐射调整。
    fn radiation_source_term(&self, state: &mut HydroState) {
        for i in 0..state.len() {
            let neutral = state.ions.neutral_fraction[i];
            let target_temperature = self.ionised_temperature * (1.0 - neutral)
                + self.neutral_temperature * neutral;
            state.ions.temperature[i] = target_temperature;

            let primitives = state.primitives[i];
            if !(self.gamma > 1.0) || !(primitives.density > 0.0) {
                continue;
            }

            let old_temperature = 0.5 * (1.0 + neutral) * self.t_conversion_factor
                * primitives.pressure
                / (primitives.density + f64::MIN_POSITIVE);
            if state.source_energy[i] > 0.0 || old_temperature > self.shock_temperature {
                // 激波加热的单元保持现状
                state.ions.temperature[i] = old_temperature;
                continue;
            }

            let u_factor = 2.0 * self.u_conversion_factor / (1.0 + neutral);
            let u_target = u_factor * target_temperature;
            let u_old = primitives.pressure * self.gm1_inv
                / (primitives.density + f64::MIN_POSITIVE);
            let mut energy_change = state.conserved[i].mass * (u_target - u_old);

            if self.do_radiative_heating && energy_change > 0.0 {
                state.delta[i].energy -= energy_change;
            }
            if self.do_radiative_cooling && energy_change < 0.0 {
                // 能量变化钳制在中性/电离温差对应的量级
                energy_change = energy_change.max(
                    2.0 * u_factor
                        * (self.neutral_temperature - self.ionised_temperature)
                        * state.conserved[i].mass,
                );
                debug_assert!(energy_change < 0.0);
                // 平均分子质量随冷却改变，抽走全额会把压强打负
                state.delta[i].energy -= 0.5 * energy_change;
            }
            debug_assert!(state.delta[i].energy.is_finite());
        }
    }

    /// 保守更新：C ← C − ΔC，叠加引力与外部能量源，清空缓冲
    fn conservative_update(&self, state: &mut HydroState, dt: f64) {
        let acceleration_to_internal = self.units.si_unit_in_internal(Quantity::Acceleration);

        for i in 0..state.len() {
            let delta = state.delta[i];
            let conserved = &mut state.conserved[i];
            *conserved -= delta;

            debug_assert!(!conserved.mass.is_nan());
            conserved.mass = conserved.mass.max(0.0);

            // 引力：动量吸收 mΔt·a⃗，能量吸收 Δt·p⃗·a⃗（动量取踢前值）
            let acceleration = state.acceleration[i] * acceleration_to_internal;
            let mass_dt = conserved.mass * dt;
            let momentum_old = conserved.momentum;
            conserved.momentum += mass_dt * acceleration;
            conserved.energy += dt * momentum_old.dot(acceleration);

            // 外部能量源，按契约用后清零
            conserved.energy += dt * state.source_energy_rate[i] + state.source_energy[i];
            state.source_energy_rate[i] = 0.0;
            state.source_energy[i] = 0.0;

            debug_assert!(conserved.momentum.is_finite());
            debug_assert!(self.gamma == 1.0 || !conserved.energy.is_nan());

            conserved.energy = conserved.energy.max(0.0);
            if self.gamma > 1.0 && conserved.energy == 0.0 {
                conserved.momentum = DVec3::ZERO;
            }

            state.delta[i] = Conserved::ZERO;
        }
    }

    /// 原始变量恢复：含真空处理、速度上限、声速上限与电离变量回写
    fn recover_primitives<G: Grid>(&self, grid: &G, state: &mut HydroState) {
        for i in 0..state.len() {
            let volume = self.units.to_internal(Quantity::Volume, grid.volume(CellId(i)));
            debug_assert!(volume > 0.0);

            let conserved = state.conserved[i];
            let mean_molecular_mass = 0.5 * (1.0 + state.ions.neutral_fraction[i]);

            let mut density;
            let mut velocity;
            let mut pressure;
            let temperature;
            if conserved.mass <= 0.0 {
                debug_assert!(conserved.mass == 0.0);
                density = 0.0;
                velocity = DVec3::ZERO;
                pressure = 0.0;
                temperature = 0.0;
            } else {
                density = conserved.mass / volume;
                velocity = conserved.momentum / conserved.mass;
                if self.gamma > 1.0 {
                    // p = (E − ½v⃗·p⃗)(γ-1)/V
                    pressure = self.gm1
                        * (conserved.energy - 0.5 * velocity.dot(conserved.momentum))
                        / volume;
                    temperature =
                        mean_molecular_mass * self.t_conversion_factor * pressure / density;
                } else {
                    temperature = state.ions.temperature[i];
                    pressure = self.p_conversion_factor * density * temperature
                        / mean_molecular_mass;
                }
            }

            // 非物理状态退化为真空
            if density <= 0.0 || pressure <= 0.0 {
                density = 0.0;
                velocity = DVec3::ZERO;
                pressure = 0.0;
            }
            debug_assert!(velocity.is_finite());

            // 速度上限
            let speed = velocity.length();
            if speed > self.max_velocity {
                velocity *= self.max_velocity / speed;
            }
            let mut primitives = Primitives::new(density, velocity, pressure);

            // 声速上限：超限时压低压强
            let sound_speed = self.sound_speed(
                &primitives,
                state.ions.neutral_fraction[i],
                state.ions.temperature[i],
            );
            if sound_speed > self.max_velocity {
                let factor = self.max_velocity / sound_speed;
                primitives.pressure *= factor * factor;
            }
            state.primitives[i] = primitives;

            state.ions.number_density[i] = density * self.n_conversion_factor;
            if self.gamma > 1.0 {
                state.ions.temperature[i] = temperature;
            }
        }
    }
}

// ============================================================
// 测试
// ============================================================
