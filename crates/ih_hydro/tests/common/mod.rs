// crates/ih_hydro/tests/common/mod.rs

//! 集成测试共用设施
//!
//! 提供一个最小的结构化笛卡尔网格实现（静态网格，支持逐轴
//! 周期回绕与访问计数），以及由 (ρ, v⃗, p) 反推电离变量的
//! 初始化辅助函数。

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{BVec3, DVec3};

use ih_foundation::constants::{BOLTZMANN_K, HYDROGEN_MASS};
use ih_hydro::{CellId, Grid, HydroIntegrator, HydroState, NeighbourFace, SimulationBox};

/// 结构化笛卡尔测试网格
///
/// 单元编号按 i + nx·(j + ny·k) 排列；周期轴上的邻居跨边界
/// 回绕，非周期轴的域边界面给出 `None` 邻居。
pub struct CartesianGrid {
    n: [usize; 3],
    anchor: DVec3,
    cell_size: DVec3,
    periodic: BVec3,
    access: Vec<AtomicU32>,
}

impl CartesianGrid {
    pub fn new(
        nx: usize,
        ny: usize,
        nz: usize,
        anchor: DVec3,
        sides: DVec3,
        periodic: BVec3,
    ) -> Self {
        let n_cells = nx * ny * nz;
        Self {
            n: [nx, ny, nz],
            anchor,
            cell_size: DVec3::new(
                sides.x / nx as f64,
                sides.y / ny as f64,
                sides.z / nz as f64,
            ),
            periodic,
            access: (0..n_cells).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    #[inline]
    fn index(&self, coordinates: [usize; 3]) -> usize {
        coordinates[0] + self.n[0] * (coordinates[1] + self.n[1] * coordinates[2])
    }

    #[inline]
    fn coordinates(&self, cell: CellId) -> [usize; 3] {
        let i = cell.get();
        [
            i % self.n[0],
            (i / self.n[0]) % self.n[1],
            i / (self.n[0] * self.n[1]),
        ]
    }

    fn periodic_axis(&self, axis: usize) -> bool {
        [self.periodic.x, self.periodic.y, self.periodic.z][axis]
    }

    /// 某一轴向一侧的邻居编号；域边界返回 None
    fn neighbour_at(&self, coordinates: [usize; 3], axis: usize, step: isize) -> Option<usize> {
        let extent = self.n[axis];
        let position = coordinates[axis] as isize + step;
        let wrapped = if position < 0 {
            if !self.periodic_axis(axis) {
                return None;
            }
            extent - 1
        } else if position as usize >= extent {
            if !self.periodic_axis(axis) {
                return None;
            }
            0
        } else {
            position as usize
        };
        let mut neighbour = coordinates;
        neighbour[axis] = wrapped;
        Some(self.index(neighbour))
    }
}

impl Grid for CartesianGrid {
    fn n_cells(&self) -> usize {
        self.access.len()
    }

    fn simulation_box(&self) -> SimulationBox {
        SimulationBox::new(
            self.anchor,
            DVec3::new(
                self.cell_size.x * self.n[0] as f64,
                self.cell_size.y * self.n[1] as f64,
                self.cell_size.z * self.n[2] as f64,
            ),
            self.periodic,
        )
    }

    fn midpoint(&self, cell: CellId) -> DVec3 {
        let c = self.coordinates(cell);
        self.anchor
            + DVec3::new(
                (c[0] as f64 + 0.5) * self.cell_size.x,
                (c[1] as f64 + 0.5) * self.cell_size.y,
                (c[2] as f64 + 0.5) * self.cell_size.z,
            )
    }

    fn volume(&self, _cell: CellId) -> f64 {
        self.cell_size.x * self.cell_size.y * self.cell_size.z
    }

    fn for_each_neighbour(&self, cell: CellId, visit: &mut dyn FnMut(NeighbourFace)) {
        let coordinates = self.coordinates(cell);
        let midpoint = self.midpoint(cell);

        for axis in 0..3 {
            let half = 0.5 * self.cell_size[axis];
            let area = match axis {
                0 => self.cell_size.y * self.cell_size.z,
                1 => self.cell_size.x * self.cell_size.z,
                _ => self.cell_size.x * self.cell_size.y,
            };
            for (step, sign) in [(-1_isize, -1.0), (1, 1.0)] {
                let mut normal = DVec3::ZERO;
                normal[axis] = sign;
                let mut offset = DVec3::ZERO;
                offset[axis] = sign * self.cell_size[axis];
                let mut face_midpoint = midpoint;
                face_midpoint[axis] += sign * half;
                visit(NeighbourFace {
                    neighbour: self
                        .neighbour_at(coordinates, axis, step)
                        .map(CellId),
                    midpoint: face_midpoint,
                    normal,
                    area,
                    neighbour_offset: offset,
                });
            }
        }
    }

    fn reset_access_flags(&self) {
        for flag in &self.access {
            flag.store(0, Ordering::Relaxed);
        }
    }

    fn register_access(&self, cell: CellId) {
        self.access[cell.get()].fetch_add(1, Ordering::Relaxed);
    }

    fn check_access(&self) -> bool {
        self.access
            .iter()
            .all(|flag| flag.load(Ordering::Relaxed) == 1)
    }
}

// ============================================================
// 初始化辅助
// ============================================================

/// 用目标原始状态 (ρ, v⃗, p) 反推初始化输入
///
/// 温度按完全中性气体反解：T = p·m_H/(k·ρ)，远低于电离温度，
/// 初始化时不会触发电离压强翻倍。真空单元（ρ = 0）置零。
pub fn seed_primitive(state: &mut HydroState, cell: usize, density: f64, velocity: DVec3, pressure: f64) {
    if density > 0.0 {
        state.ions.number_density[cell] = density / HYDROGEN_MASS;
        state.ions.temperature[cell] = pressure * HYDROGEN_MASS / (BOLTZMANN_K * density);
    } else {
        state.ions.number_density[cell] = 0.0;
        state.ions.temperature[cell] = 0.0;
    }
    state.ions.neutral_fraction[cell] = 1.0;
    state.primitives[cell].velocity = velocity;
}

/// 直接给定电离变量（温度可以落在电离区间）
pub fn seed_thermal(
    state: &mut HydroState,
    cell: usize,
    number_density: f64,
    temperature: f64,
    neutral_fraction: f64,
) {
    state.ions.number_density[cell] = number_density;
    state.ions.temperature[cell] = temperature;
    state.ions.neutral_fraction[cell] = neutral_fraction;
    state.primitives[cell].velocity = DVec3::ZERO;
}

/// 以 CFL 步长推进到目标时刻
pub fn advance_to<G: Grid>(
    integrator: &HydroIntegrator,
    grid: &mut G,
    state: &mut HydroState,
    t_end: f64,
) -> usize {
    let mut time = 0.0;
    let mut steps = 0;
    while time < t_end {
        let dt = integrator.max_timestep(&*grid, state).min(t_end - time);
        integrator.do_step(grid, state, dt).unwrap();
        time += dt;
        steps += 1;
        assert!(steps < 100_000, "步数超限: t = {time}");
    }
    steps
}

/// 以 CFL 步长推进固定步数
pub fn advance_steps<G: Grid>(
    integrator: &HydroIntegrator,
    grid: &mut G,
    state: &mut HydroState,
    steps: usize,
) {
    for _ in 0..steps {
        let dt = integrator.max_timestep(&*grid, state);
        integrator.do_step(grid, state, dt).unwrap();
    }
}
