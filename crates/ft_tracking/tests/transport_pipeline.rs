// crates/ft_tracking/tests/transport_pipeline.rs

//! 端到端运移流程测试
//!
//! 从合成流场解出发：控制体构建 → 节点速度重构 → 布种 →
//! 系综追踪，对照解析运移时间。

use ft_flow::{Connection, FlowSolution, ReconstructionConfig, VelocityField};
use ft_mesh::{samples, DfnMesh, GeometricControlVolumes};
use ft_tracking::prelude::*;
use glam::DVec3;

/// 按给定匀速场合成流场解
fn synthetic_solution(
    mesh: &DfnMesh,
    cv: &GeometricControlVolumes,
    v0: DVec3,
    aperture: f64,
) -> FlowSolution {
    let mut connections = Vec::new();
    for (i, faces) in cv.faces.iter().enumerate() {
        for f in faces {
            if (i as u32) < f.neighbor {
                let area = f.length * aperture;
                connections.push(Connection {
                    a: i as u32,
                    b: f.neighbor,
                    area,
                    flux: v0.dot(f.normal) * area,
                });
            }
        }
    }
    FlowSolution::new(
        vec![0.0; mesh.n_nodes()],
        cv.node_area.iter().map(|a| a * aperture).collect(),
        connections,
        vec![],
        vec![aperture; mesh.n_fractures()],
        1.0,
    )
    .unwrap()
}

#[test]
fn uniform_strip_transport_matches_analytic() {
    let mesh = samples::strip(4).unwrap();
    let cv = GeometricControlVolumes::build(&mesh).unwrap();
    let v0 = DVec3::new(0.5, 0.0, 0.0);
    let sol = synthetic_solution(&mesh, &cv, v0, 1e-3);

    let cfg = ReconstructionConfig::default().with_parallel(false);
    let field = VelocityField::reconstruct(&mesh, &cv, &sol, &cfg).unwrap();

    let zones = BoundaryZones::from_node_lists(&mesh, [0u32, 1], [8u32, 9]).unwrap();
    let settings = TransportSettings {
        n_particles: 100,
        parallel: false,
        control_planes: vec![ControlPlane::new(Axis::X, 2.0)],
        ..Default::default()
    };
    let outcome = Ensemble::new(&mesh, &field, &zones, &sol.aperture, settings)
        .unwrap()
        .run()
        .unwrap();

    let summary = EnsembleSummary::from_records(&outcome.records);
    assert_eq!(summary.n_exited, 100, "匀速场中所有粒子都应离开");
    // 4 m / 0.5 m/s = 8 s
    assert!(
        (summary.t_adv_mean - 8.0).abs() < 1e-4,
        "平均运移时间应为 8 s, 实际 {}",
        summary.t_adv_mean
    );
    assert!(summary.t_adv_max - summary.t_adv_min < 1e-4);

    // 控制面 x = 2 在半程：穿越时刻应为 4 s
    assert_eq!(outcome.crossings.len(), 100);
    for c in &outcome.crossings {
        assert!((c.t_adv - 4.0).abs() < 1e-4);
    }
}

#[test]
fn two_fracture_network_routes_and_exits() {
    let mesh = samples::cross().unwrap();
    // 裂隙 0 向 +x 输运到交线，交线节点速度为零（通量全部转入
    // 裂隙 1），裂隙 1 向 -z 输运到下缘出口
    let node_velocity = mesh
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            if i == 1 || i == 4 {
                DVec3::ZERO
            } else if n.fracture == 0 {
                DVec3::new(1.0, 0.0, 0.0)
            } else {
                DVec3::new(0.0, 0.0, -1.0)
            }
        })
        .collect();
    let field = VelocityField {
        node_velocity,
        n_fallback: 0,
    };

    let zones = BoundaryZones::from_node_lists(&mesh, [0u32, 3], [8u32, 9]).unwrap();
    let settings = TransportSettings {
        n_particles: 40,
        parallel: true,
        routing: RoutingRule::CompleteMixing,
        tdrw: TdrwConfig {
            enabled: true,
            matrix_porosity: 0.02,
            matrix_diffusivity: 1e-10,
        },
        ..Default::default()
    };
    let outcome = Ensemble::new(&mesh, &field, &zones, &[1e-3, 1e-3], settings)
        .unwrap()
        .run()
        .unwrap();

    let summary = EnsembleSummary::from_records(&outcome.records);
    assert_eq!(summary.n_exited, 40, "所有粒子都应穿过交线并离开");
    for r in &outcome.records {
        assert_eq!(r.n_fractures, 2, "每个粒子都应经过两条裂隙");
        assert!((r.exit_z + 1.0).abs() < 1e-6, "出口应在裂隙 1 下缘");
        assert!(r.t_total >= r.t_adv, "总时间应包含基质滞留");
    }
}

#[test]
fn same_seed_reproduces_identical_results() {
    let mesh = samples::strip(3).unwrap();
    let field = VelocityField {
        node_velocity: vec![DVec3::new(1.0, 0.2, 0.0); mesh.n_nodes()],
        n_fallback: 0,
    };
    let zones = BoundaryZones::from_node_lists(&mesh, [0u32, 1], [6u32, 7]).unwrap();

    let run = || {
        let settings = TransportSettings {
            n_particles: 25,
            seed: 123,
            tdrw: TdrwConfig {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };
        Ensemble::new(&mesh, &field, &zones, &[1e-4], settings)
            .unwrap()
            .run()
            .unwrap()
    };

    let a = run();
    let b = run();
    for (x, y) in a.records.iter().zip(&b.records) {
        assert_eq!(x.t_adv, y.t_adv);
        assert_eq!(x.t_total, y.t_total);
        assert_eq!(x.n_steps, y.n_steps);
    }
}
