// crates/ft_io/src/import/avs_mesh.rs

//! AVS UCD `.inp` 网格读取
//!
//! 网格生成器输出的三角网格。文件结构：
//!
//! ```text
//! n_nodes n_cells n_node_data n_cell_data n_model_data
//! <node_id> <x> <y> <z>                  （n_nodes 行，编号 1 基）
//! <cell_id> <material> tri <n1> <n2> <n3>（n_cells 行，编号 1 基）
//! ...（附加数据段，忽略）
//! ```
//!
//! 单元材料号即裂隙编号（1 基）。节点所属裂隙由包含它的单元
//! 推导：交叉线节点按裂隙复制，因此每个节点恰好属于一条裂隙。

use ft_foundation::error::{FtError, FtResult};
use ft_geo::Point3D;
use ft_mesh::MeshSource;
use std::path::Path;
use tracing::debug;

/// 从文件读取 AVS 网格
pub fn load_avs_mesh(path: &Path) -> FtResult<MeshSource> {
    if !path.is_file() {
        return Err(FtError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FtError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
    parse_avs_string(&content, path)
}

/// 从字符串解析 AVS 网格（`origin` 仅用于错误信息）
pub fn parse_avs_string(content: &str, origin: impl AsRef<Path>) -> FtResult<MeshSource> {
    let origin = origin.as_ref();
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (header_no, header) = lines
        .next()
        .ok_or_else(|| FtError::parse(origin, 1, "空文件"))?;
    let head: Vec<&str> = header.split_whitespace().collect();
    if head.len() < 2 {
        return Err(FtError::parse(
            origin,
            header_no,
            format!("头部应为 5 个计数, 实际 {} 列", head.len()),
        ));
    }
    let n_nodes: usize = parse_field(origin, header_no, head[0], "节点数")?;
    let n_cells: usize = parse_field(origin, header_no, head[1], "单元数")?;
    if n_nodes == 0 || n_cells == 0 {
        return Err(FtError::parse(origin, header_no, "节点数与单元数不能为 0"));
    }

    // 节点段
    let mut node_coords = Vec::with_capacity(n_nodes);
    for _ in 0..n_nodes {
        let (no, line) = lines
            .next()
            .ok_or_else(|| FtError::parse(origin, 0, "节点段提前结束"))?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 4 {
            return Err(FtError::parse(
                origin,
                no,
                format!("节点行应为 `id x y z`, 实际 {} 列", cols.len()),
            ));
        }
        let id: usize = parse_field(origin, no, cols[0], "节点编号")?;
        if id != node_coords.len() + 1 {
            return Err(FtError::parse(
                origin,
                no,
                format!("节点编号应连续: 期望 {}, 实际 {id}", node_coords.len() + 1),
            ));
        }
        let x: f64 = parse_field(origin, no, cols[1], "x")?;
        let y: f64 = parse_field(origin, no, cols[2], "y")?;
        let z: f64 = parse_field(origin, no, cols[3], "z")?;
        node_coords.push(Point3D::new(x, y, z));
    }

    // 单元段；节点裂隙号由单元材料号推导
    let mut cell_nodes = Vec::with_capacity(n_cells);
    let mut cell_fracture = Vec::with_capacity(n_cells);
    let mut node_fracture: Vec<Option<u32>> = vec![None; n_nodes];
    for _ in 0..n_cells {
        let (no, line) = lines
            .next()
            .ok_or_else(|| FtError::parse(origin, 0, "单元段提前结束"))?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 6 {
            return Err(FtError::parse(
                origin,
                no,
                format!("单元行应为 `id mat tri n1 n2 n3`, 实际 {} 列", cols.len()),
            ));
        }
        if !cols[2].eq_ignore_ascii_case("tri") {
            return Err(FtError::parse(
                origin,
                no,
                format!("只支持三角形单元 (tri), 实际 `{}`", cols[2]),
            ));
        }
        let material: u32 = parse_field(origin, no, cols[1], "材料号")?;
        if material == 0 {
            return Err(FtError::parse(origin, no, "材料号（裂隙号）为 1 基"));
        }
        let fracture = material - 1;

        let mut nodes = [0u32; 3];
        for (k, col) in cols[3..6].iter().enumerate() {
            let raw: usize = parse_field(origin, no, col, "单元节点编号")?;
            if raw == 0 || raw > n_nodes {
                return Err(FtError::parse(
                    origin,
                    no,
                    format!("单元节点编号越界: {raw} (共 {n_nodes} 节点)"),
                ));
            }
            let node = (raw - 1) as u32;
            nodes[k] = node;
            match node_fracture[raw - 1] {
                None => node_fracture[raw - 1] = Some(fracture),
                Some(f) if f == fracture => {}
                Some(f) => {
                    return Err(FtError::parse(
                        origin,
                        no,
                        format!("节点 {raw} 同时属于裂隙 {} 与 {}（交叉线节点应按裂隙复制）",
                            f + 1,
                            fracture + 1
                        ),
                    ));
                }
            }
        }
        cell_nodes.push(nodes);
        cell_fracture.push(fracture);
    }

    let node_fracture: Vec<u32> = node_fracture
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            f.ok_or_else(|| {
                FtError::invalid_mesh(format!("节点 {} 不属于任何单元", i + 1))
            })
        })
        .collect::<FtResult<_>>()?;

    debug!(
        n_nodes,
        n_cells,
        file = %origin.display(),
        "AVS 网格读取完成"
    );

    Ok(MeshSource {
        node_coords,
        node_fracture,
        cell_nodes,
        cell_fracture,
    })
}

fn parse_field<T: std::str::FromStr>(
    origin: &Path,
    line: usize,
    raw: &str,
    what: &str,
) -> FtResult<T> {
    raw.parse::<T>()
        .map_err(|_| FtError::parse(origin, line, format!("无法解析{what}: `{raw}`")))
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRIANGLES: &str = "\
4 2 0 0 0
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
1 1 tri 1 2 3
2 1 tri 1 3 4
";

    #[test]
    fn test_parse_minimal_mesh() {
        let source = parse_avs_string(TWO_TRIANGLES, "test.inp").unwrap();
        assert_eq!(source.node_coords.len(), 4);
        assert_eq!(source.cell_nodes.len(), 2);
        assert_eq!(source.cell_nodes[0], [0, 1, 2]);
        assert_eq!(source.cell_fracture, vec![0, 0]);
        assert_eq!(source.node_fracture, vec![0, 0, 0, 0]);
        assert!((source.node_coords[2].x - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_mesh_builds() {
        let source = parse_avs_string(TWO_TRIANGLES, "test.inp").unwrap();
        let mesh = ft_mesh::DfnMesh::build(source).unwrap();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_fractures(), 1);
    }

    #[test]
    fn test_material_maps_to_fracture() {
        let content = "\
6 2 0 0 0
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 1.0 0.0 0.0
5 1.0 1.0 0.0
6 1.0 0.0 -1.0
1 1 tri 1 2 3
2 2 tri 4 5 6
";
        let source = parse_avs_string(content, "test.inp").unwrap();
        assert_eq!(source.cell_fracture, vec![0, 1]);
        assert_eq!(source.node_fracture, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_bad_node_id_rejected() {
        let content = "\
3 1 0 0 0
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
1 1 tri 1 2 9
";
        let err = parse_avs_string(content, "bad.inp").unwrap_err();
        assert!(err.to_string().contains("第5行"), "错误应带行号: {err}");
    }

    #[test]
    fn test_non_triangle_rejected() {
        let content = "\
3 1 0 0 0
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
1 1 quad 1 2 3
";
        assert!(parse_avs_string(content, "bad.inp").is_err());
    }

    #[test]
    fn test_truncated_file_rejected() {
        let content = "4 2 0 0 0\n1 0.0 0.0 0.0\n";
        assert!(parse_avs_string(content, "bad.inp").is_err());
    }

    #[test]
    fn test_shared_node_across_fractures_rejected() {
        let content = "\
4 2 0 0 0
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
1 1 tri 1 2 3
2 2 tri 1 3 4
";
        assert!(parse_avs_string(content, "bad.inp").is_err());
    }
}
