// crates/ih_hydro/src/gradients.rs

//! 原始变量梯度
//!
//! Green-Gauss 面积分近似：∇φ ≈ (1/V) Σ_f φ_f A_f n̂_f，
//! 面值取两侧单元的算术平均。域边界面的右侧值向边界
//! 预言机查询，与通量扫描使用同一套边界语义。
//!
//! 原始梯度随后做逐单元 Barth-Jespersen 限制：
//! 向任意面中点的外推都不得越过邻居值的包络，
//! 五个量（ρ、vₓ、vᵧ、v_z、p）各自取所有面上的最小限制因子。
//!
//! 每个单元只写自己的梯度槽、只读邻居的原始变量，
//! 因此整趟遍历可以无锁并行。

use glam::DVec3;
use rayon::prelude::*;

use ih_foundation::units::{Quantity, UnitSystem};

use crate::bondi::BondiProfile;
use crate::boundary::{apply_boundary, BoundarySet, FaceState};
use crate::grid::{CellId, Grid};
use crate::state::{PrimitiveGradients, Primitives};

/// 限制因子分母的保护量
const SLOPE_EPSILON: f64 = 1.0e-14;

/// 计算全部单元的原始变量梯度（并行）
///
/// # 参数
/// - `grid`: 网格几何
/// - `primitives`: 当前原始变量（内部单位）
/// - `gradients`: 输出槽，逐单元覆写
/// - `boundaries`, `bondi`: 边界语义
/// - `units`: 内部单位制
pub fn compute_primitive_gradients<G: Grid + ?Sized>(
    grid: &G,
    primitives: &[Primitives],
    gradients: &mut [PrimitiveGradients],
    boundaries: &BoundarySet,
    bondi: Option<&BondiProfile>,
    units: &UnitSystem,
) {
    gradients
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, gradient)| {
            *gradient = cell_gradients(
                grid,
                CellId(index),
                primitives,
                boundaries,
                bondi,
                units,
            );
        });
}

/// 单个单元的 Green-Gauss 梯度 + Barth-Jespersen 限制
fn cell_gradients<G: Grid + ?Sized>(
    grid: &G,
    cell: CellId,
    primitives: &[Primitives],
    boundaries: &BoundarySet,
    bondi: Option<&BondiProfile>,
    units: &UnitSystem,
) -> PrimitiveGradients {
    let position = grid.midpoint(cell);
    let values = quantities(&primitives[cell.get()]);

    let mut raw = [DVec3::ZERO; 5];
    let mut lower = values;
    let mut upper = values;

    grid.for_each_neighbour(cell, &mut |face| {
        let area = units.to_internal(Quantity::SurfaceArea, face.area);
        let neighbour_values = match face.neighbour {
            Some(neighbour) => quantities(&primitives[neighbour.get()]),
            None => {
                // 域边界：预言机只负责右侧的变量值，梯度在这里无关
                let mut state = FaceState::from_cell(
                    &primitives[cell.get()],
                    &PrimitiveGradients::ZERO,
                );
                apply_boundary(
                    &mut state,
                    face.normal,
                    position + face.neighbour_offset,
                    boundaries,
                    bondi,
                    units,
                );
                [
                    state.density,
                    state.velocity.x,
                    state.velocity.y,
                    state.velocity.z,
                    state.pressure,
                ]
            }
        };

        for q in 0..5 {
            let face_value = 0.5 * (values[q] + neighbour_values[q]);
            raw[q] += face_value * area * face.normal;
            lower[q] = lower[q].min(neighbour_values[q]);
            upper[q] = upper[q].max(neighbour_values[q]);
        }
    });

    let volume = units.to_internal(Quantity::Volume, grid.volume(cell));
    debug_assert!(volume > 0.0);
    for gradient in raw.iter_mut() {
        *gradient /= volume;
    }

    // Barth-Jespersen：面中点外推不得穿出邻居包络
    let mut alpha = [1.0_f64; 5];
    grid.for_each_neighbour(cell, &mut |face| {
        let distance =
            (face.midpoint - position) * units.si_unit_in_internal(Quantity::Length);
        for q in 0..5 {
            let delta = raw[q].dot(distance);
            if delta > SLOPE_EPSILON {
                alpha[q] = alpha[q].min(((upper[q] - values[q]) / delta).clamp(0.0, 1.0));
            } else if delta < -SLOPE_EPSILON {
                alpha[q] = alpha[q].min(((lower[q] - values[q]) / delta).clamp(0.0, 1.0));
            }
        }
    });

    PrimitiveGradients {
        density: raw[0] * alpha[0],
        velocity: [raw[1] * alpha[1], raw[2] * alpha[2], raw[3] * alpha[3]],
        pressure: raw[4] * alpha[4],
    }
}

/// 单元原始变量按 (ρ, vₓ, vᵧ, v_z, p) 排成数组
#[inline]
fn quantities(primitives: &Primitives) -> [f64; 5] {
    [
        primitives.density,
        primitives.velocity.x,
        primitives.velocity.y,
        primitives.velocity.z,
        primitives.pressure,
    ]
}

// ============================================================
// 测试
// ============================================================
