// crates/ft_mesh/src/topology.rs

//! 网格拓扑构建
//!
//! 从原始节点/单元数组构建完整的 [`DfnMesh`]：
//!
//! 1. 输入一致性检查（编号范围、裂隙归属）
//! 2. 裂隙平面局部坐标系（由每条裂隙第一个非退化单元的法向确定）
//! 3. 边 → 单元邻接（同一裂隙内每条内部边恰有 2 个相邻单元）
//! 4. 节点 → 单元关联表
//! 5. 边界节点标记（位于单边上的节点）
//! 6. 交叉线 twin 链接（坐标重合、裂隙不同的节点对）
//!
//! # 交叉线识别
//!
//! 网格生成器在两条裂隙的交线上按裂隙各放一份节点。构建时将
//! 坐标按容差量化后分组，同组且裂隙不同的节点互为 twin，
//! 类别标记为 `Intersection`（优先于边界标记）。

use crate::mesh::{Cell, DfnMesh, MeshSource, Node, NodeKind};
use ft_foundation::error::{FtError, FtResult};
use ft_foundation::{ensure, require};
use ft_geo::{FracturePlane, Triangle3, EPS_GEO};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{debug, warn};

/// 坐标量化容差（twin 识别用）
const TWIN_QUANT: f64 = 1e-8;

/// 退化单元面积下限（相对单元边长尺度）
const DEGENERATE_AREA: f64 = 1e-14;

/// 构建完整网格拓扑
pub fn build(source: MeshSource) -> FtResult<DfnMesh> {
    let n_nodes = source.node_coords.len();
    let n_cells = source.cell_nodes.len();

    FtError::check_size("node_fracture", n_nodes, source.node_fracture.len())?;
    FtError::check_size("cell_fracture", n_cells, source.cell_fracture.len())?;
    ensure!(
        n_nodes >= 3 && n_cells >= 1,
        FtError::invalid_mesh(format!("网格过小: {n_nodes} 节点, {n_cells} 单元"))
    );

    // 裂隙数：编号最大值 + 1
    let n_fractures = source
        .cell_fracture
        .iter()
        .chain(source.node_fracture.iter())
        .max()
        .map(|m| *m as usize + 1)
        .unwrap_or(0);

    // 单元节点编号与裂隙归属检查
    for (ci, nodes) in source.cell_nodes.iter().enumerate() {
        for &n in nodes {
            FtError::check_index("Node", n as usize, n_nodes)?;
            if source.node_fracture[n as usize] != source.cell_fracture[ci] {
                return Err(FtError::invalid_mesh(format!(
                    "单元 {ci} 的节点 {n} 裂隙归属不一致: 节点在裂隙 {}, 单元在裂隙 {}",
                    source.node_fracture[n as usize], source.cell_fracture[ci]
                )));
            }
        }
    }

    let cells: Vec<Cell> = source
        .cell_nodes
        .iter()
        .zip(source.cell_fracture.iter())
        .map(|(nodes, f)| Cell {
            nodes: *nodes,
            fracture: *f,
        })
        .collect();

    // ------------------------------------------------------------
    // 单元几何量与裂隙平面
    // ------------------------------------------------------------
    let mut cell_area = vec![0.0_f64; n_cells];
    let mut frame_seed: Vec<Option<(Triangle3, u32)>> = vec![None; n_fractures];

    for (ci, cell) in cells.iter().enumerate() {
        let tri = Triangle3::new(
            source.node_coords[cell.nodes[0] as usize].to_dvec3(),
            source.node_coords[cell.nodes[1] as usize].to_dvec3(),
            source.node_coords[cell.nodes[2] as usize].to_dvec3(),
        );
        let area = tri.area();
        if area < DEGENERATE_AREA {
            return Err(FtError::invalid_mesh(format!(
                "单元 {ci} 退化: 面积 = {area:e}"
            )));
        }
        cell_area[ci] = area;
        if frame_seed[cell.fracture as usize].is_none() {
            frame_seed[cell.fracture as usize] = Some((tri, cell.nodes[0]));
        }
    }

    let mut fractures = Vec::with_capacity(n_fractures);
    for (f, seed) in frame_seed.iter().enumerate() {
        let (tri, origin_node) = require!(
            seed.as_ref(),
            FtError::invalid_mesh(format!("裂隙 {f} 没有任何单元"))
        );
        let origin = source.node_coords[*origin_node as usize].to_dvec3();
        fractures.push(FracturePlane::from_normal_and_origin(tri.normal(), origin)?);
    }

    // 共面性检查：节点到所属裂隙平面的距离
    let mut worst_offset = 0.0_f64;
    for (ni, p) in source.node_coords.iter().enumerate() {
        let plane = &fractures[source.node_fracture[ni] as usize];
        worst_offset = worst_offset.max(plane.signed_distance(p.to_dvec3()).abs());
    }
    if worst_offset > 1e-6 {
        warn!(worst_offset, "节点偏离所属裂隙平面，插值精度可能受影响");
    }

    // ------------------------------------------------------------
    // 边 → 单元邻接
    // ------------------------------------------------------------
    let mut edge_cells: HashMap<(u32, u32), SmallVec<[u32; 2]>> = HashMap::new();
    for (ci, cell) in cells.iter().enumerate() {
        for e in 0..3 {
            let (a, b) = cell.edge(e);
            let key = if a < b { (a, b) } else { (b, a) };
            edge_cells.entry(key).or_default().push(ci as u32);
        }
    }

    let mut neighbors = vec![[None, None, None]; n_cells];
    for ((a, b), incident) in &edge_cells {
        if incident.len() > 2 {
            return Err(FtError::invalid_mesh(format!(
                "边 ({a}, {b}) 有 {} 个相邻单元",
                incident.len()
            )));
        }
        if incident.len() == 2 {
            let (c0, c1) = (incident[0], incident[1]);
            for (this, other) in [(c0, c1), (c1, c0)] {
                let cell = &cells[this as usize];
                for e in 0..3 {
                    let (x, y) = cell.edge(e);
                    let key = if x < y { (x, y) } else { (y, x) };
                    if key == (*a, *b) {
                        neighbors[this as usize][e] = Some(other);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------
    // 节点关联与边界标记
    // ------------------------------------------------------------
    let mut node_cells: Vec<SmallVec<[u32; 8]>> = vec![SmallVec::new(); n_nodes];
    for (ci, cell) in cells.iter().enumerate() {
        for &n in &cell.nodes {
            node_cells[n as usize].push(ci as u32);
        }
    }

    let mut kind = vec![NodeKind::Interior; n_nodes];
    for ((a, b), incident) in &edge_cells {
        if incident.len() == 1 {
            kind[*a as usize] = NodeKind::Boundary;
            kind[*b as usize] = NodeKind::Boundary;
        }
    }

    // ------------------------------------------------------------
    // 交叉线 twin 链接
    // ------------------------------------------------------------
    let mut twins: Vec<SmallVec<[u32; 2]>> = vec![SmallVec::new(); n_nodes];
    let mut coord_groups: HashMap<(i64, i64, i64), SmallVec<[u32; 4]>> = HashMap::new();
    for (ni, p) in source.node_coords.iter().enumerate() {
        let key = (
            (p.x / TWIN_QUANT).round() as i64,
            (p.y / TWIN_QUANT).round() as i64,
            (p.z / TWIN_QUANT).round() as i64,
        );
        coord_groups.entry(key).or_default().push(ni as u32);
    }

    let mut n_twins = 0usize;
    for group in coord_groups.values() {
        if group.len() < 2 {
            continue;
        }
        for &i in group {
            for &j in group {
                if i == j || source.node_fracture[i as usize] == source.node_fracture[j as usize]
                {
                    continue;
                }
                // 量化分组后复核真实距离
                let d = source.node_coords[i as usize]
                    .distance_to(&source.node_coords[j as usize]);
                if d <= EPS_GEO.max(TWIN_QUANT) {
                    twins[i as usize].push(j);
                }
            }
        }
        for &i in group {
            if !twins[i as usize].is_empty() {
                kind[i as usize] = NodeKind::Intersection;
                n_twins += 1;
            }
        }
    }

    debug!(
        n_nodes,
        n_cells, n_fractures, n_twins, "网格拓扑构建完成"
    );

    let nodes: Vec<Node> = source
        .node_coords
        .iter()
        .enumerate()
        .map(|(ni, p)| Node {
            pos: *p,
            fracture: source.node_fracture[ni],
            kind: kind[ni],
            twins: std::mem::take(&mut twins[ni]),
        })
        .collect();

    Ok(DfnMesh {
        nodes,
        cells,
        fractures,
        neighbors,
        node_cells,
        cell_area,
    })
}

// ============================================================
// 测试
// ============================================================
