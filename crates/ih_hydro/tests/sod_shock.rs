// crates/ih_hydro/tests/sod_shock.rs

//! Sod 激波管端到端验证
//!
//! 数值解与精确黎曼解的相似性解对比：激波锋面与稀疏波尾
//! 的位置误差不超过两个单元；密度剖面保持单调且处处为正。

mod common;

use common::{advance_to, seed_primitive, CartesianGrid};
use glam::{BVec3, DVec3};
use ih_foundation::units::Quantity;
use ih_hydro::{ExactRiemannSolver, Grid, HydroConfig, HydroIntegrator, HydroState};

const GAMMA: f64 = 5.0 / 3.0;
const N_CELLS: usize = 100;
const DX: f64 = 1.0 / N_CELLS as f64;

/// 左右初始状态
const RHO_L: f64 = 1.0;
const P_L: f64 = 1.0;
const RHO_R: f64 = 0.125;
const P_R: f64 = 0.1;

fn sod_setup() -> (CartesianGrid, HydroState, HydroIntegrator) {
    let mut config = HydroConfig::default();
    config.radiative_heating = false;

    let grid = CartesianGrid::new(
        N_CELLS,
        1,
        1,
        DVec3::ZERO,
        DVec3::new(1.0, DX, DX),
        BVec3::FALSE,
    );
    let mut state = HydroState::zeroed(grid.n_cells());
    for i in 0..state.len() {
        let x = (i as f64 + 0.5) * DX;
        if x < 0.5 {
            seed_primitive(&mut state, i, RHO_L, DVec3::ZERO, P_L);
        } else {
            seed_primitive(&mut state, i, RHO_R, DVec3::ZERO, P_R);
        }
    }
    let integrator = HydroIntegrator::new(&config, BVec3::FALSE, None).unwrap();
    (grid, state, integrator)
}

#[test]
fn test_sod_shock_tube_against_similarity_solution() {
    let (mut grid, mut state, mut integrator) = sod_setup();
    integrator.initialise(&mut grid, &mut state).unwrap();

    let t_end = 0.25;
    advance_to(&integrator, &mut grid, &mut state, t_end);

    // 换算回 SI 的密度剖面
    let units = *integrator.units();
    let density: Vec<f64> = state
        .primitives
        .iter()
        .map(|p| units.to_si(Quantity::Density, p.density))
        .collect();
    let pressure: Vec<f64> = state
        .primitives
        .iter()
        .map(|p| units.to_si(Quantity::Pressure, p.pressure))
        .collect();

    // 正性
    for i in 0..N_CELLS {
        assert!(density[i] > 0.0, "cell {}: rho = {}", i, density[i]);
        assert!(pressure[i] > 0.0, "cell {}: P = {}", i, pressure[i]);
    }

    // 单调性（容许初始间断处的起步小起伏）
    for i in 1..N_CELLS {
        assert!(
            density[i] <= density[i - 1] + 0.02 * RHO_L,
            "cells {}..{}: rho {} -> {}",
            i - 1,
            i,
            density[i - 1],
            density[i]
        );
    }

    // 相似性解的特征位置
    let exact = ExactRiemannSolver::new(GAMMA);
    let (p_star, u_star) = exact
        .star_state(RHO_L, 0.0, P_L, RHO_R, 0.0, P_R)
        .unwrap();
    let c_l = (GAMMA * P_L / RHO_L).sqrt();
    let c_r = (GAMMA * P_R / RHO_R).sqrt();

    // 右行激波速度（Rankine-Hugoniot）
    let gp1d2g = (GAMMA + 1.0) / (2.0 * GAMMA);
    let gm1d2g = (GAMMA - 1.0) / (2.0 * GAMMA);
    let shock_speed = c_r * (gp1d2g * p_star / P_R + gm1d2g).sqrt();
    let shock_position = 0.5 + shock_speed * t_end;

    // 稀疏波尾（星区左缘）
    let c_star_l = c_l * (p_star / P_L).powf(gm1d2g);
    let tail_position = 0.5 + (u_star - c_star_l) * t_end;

    // 激波后密度，用于定位数值激波
    let gm1dgp1 = (GAMMA - 1.0) / (GAMMA + 1.0);
    let pratio = p_star / P_R;
    let rho_post_shock = RHO_R * (pratio + gm1dgp1) / (gm1dgp1 * pratio + 1.0);
    let rho_star_l = RHO_L * (p_star / P_L).powf(1.0 / GAMMA);

    // 数值激波位置：从右向左第一次越过半跳幅
    let shock_threshold = 0.5 * (RHO_R + rho_post_shock);
    let mut numerical_shock = None;
    for i in (0..N_CELLS).rev() {
        if density[i] > shock_threshold {
            numerical_shock = Some((i as f64 + 0.5) * DX);
            break;
        }
    }
    let numerical_shock = numerical_shock.expect("未找到激波");
    assert!(
        (numerical_shock - shock_position).abs() <= 2.0 * DX + 0.5 * DX,
        "激波位置 {} vs {}",
        numerical_shock,
        shock_position
    );

    // 数值稀疏波尾：从左向右密度降到星区值附近的位置
    let tail_threshold = rho_star_l * 1.02;
    let mut numerical_tail = None;
    for i in 0..N_CELLS {
        if density[i] <= tail_threshold {
            numerical_tail = Some((i as f64 + 0.5) * DX);
            break;
        }
    }
    let numerical_tail = numerical_tail.expect("未找到稀疏波尾");
    assert!(
        (numerical_tail - tail_position).abs() <= 2.0 * DX + 0.5 * DX,
        "稀疏波尾位置 {} vs {}",
        numerical_tail,
        tail_position
    );

    // 星区密度平台检查：接触面左侧应接近 ρ*L
    let contact_position = 0.5 + u_star * t_end;
    let probe = ((0.5 * (tail_position + contact_position)) / DX) as usize;
    assert!(
        (density[probe] - rho_star_l).abs() <= 0.05 * rho_star_l,
        "平台密度 {} vs {}",
        density[probe],
        rho_star_l
    );
}

#[test]
fn test_reflective_setup_stays_mirror_symmetric() {
    // 关于 x = 0.5 对称的初值在反射盒子里演化保持镜像对称
    let mut config = HydroConfig::default();
    config.radiative_heating = false;

    let mut grid = CartesianGrid::new(
        N_CELLS,
        1,
        1,
        DVec3::ZERO,
        DVec3::new(1.0, DX, DX),
        BVec3::FALSE,
    );
    let mut state = HydroState::zeroed(grid.n_cells());
    for i in 0..state.len() {
        let x = (i as f64 + 0.5) * DX;
        if (x - 0.5).abs() < 0.25 {
            seed_primitive(&mut state, i, RHO_L, DVec3::ZERO, P_L);
        } else {
            seed_primitive(&mut state, i, RHO_R, DVec3::ZERO, P_R);
        }
    }

    let mut integrator = HydroIntegrator::new(&config, BVec3::FALSE, None).unwrap();
    integrator.initialise(&mut grid, &mut state).unwrap();

    for _ in 0..20 {
        let dt = integrator.max_timestep(&grid, &state);
        integrator.do_step(&mut grid, &mut state, dt).unwrap();

        for i in 0..N_CELLS / 2 {
            let mirror = N_CELLS - 1 - i;
            let a = &state.primitives[i];
            let b = &state.primitives[mirror];
            assert!(
                (a.density - b.density).abs() <= 1.0e-9 * a.density.max(1.0),
                "cells {} / {}: rho {} vs {}",
                i,
                mirror,
                a.density,
                b.density
            );
            assert!(
                (a.pressure - b.pressure).abs() <= 1.0e-9 * a.pressure.max(1.0),
                "cells {} / {}: P {} vs {}",
                i,
                mirror,
                a.pressure,
                b.pressure
            );
            assert!(
                (a.velocity.x + b.velocity.x).abs() <= 1.0e-9,
                "cells {} / {}: vx {} vs {}",
                i,
                mirror,
                a.velocity.x,
                b.velocity.x
            );
        }
    }
}
