// crates/ft_io/src/import/uge.rs

//! `.uge` 控制体文件读取
//!
//! 流动求解器所用的非结构网格控制体描述：
//!
//! ```text
//! CELLS <n>
//! <id> <cx> <cy> <cz> <volume>        （n 行，编号 1 基）
//! CONNECTIONS <m>
//! <id1> <id2> <fx> <fy> <fz> <area>   （m 行）
//! ```
//!
//! 控制体编号与网格节点编号一一对应（控制体以节点为中心）。

use ft_foundation::error::{FtError, FtResult};
use ft_geo::Point3D;
use std::path::Path;
use tracing::debug;

/// 一条控制体连接
#[derive(Debug, Clone, Copy)]
pub struct UgeConnection {
    /// 控制体 a（0 基）
    pub a: u32,
    /// 控制体 b（0 基）
    pub b: u32,
    /// 连接面中心
    pub center: Point3D,
    /// 连接面面积 [m²]
    pub area: f64,
}

/// `.uge` 文件内容
#[derive(Debug, Clone, Default)]
pub struct UgeData {
    /// 控制体中心
    pub cell_center: Vec<Point3D>,
    /// 控制体体积 [m³]
    pub cell_volume: Vec<f64>,
    /// 控制体连接
    pub connections: Vec<UgeConnection>,
}

impl UgeData {
    /// 控制体数
    pub fn n_cells(&self) -> usize {
        self.cell_volume.len()
    }
}

/// 从文件读取 `.uge`
pub fn load_uge(path: &Path) -> FtResult<UgeData> {
    if !path.is_file() {
        return Err(FtError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FtError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
    parse_uge_string(&content, path)
}

/// 从字符串解析 `.uge`
pub fn parse_uge_string(content: &str, origin: impl AsRef<Path>) -> FtResult<UgeData> {
    let origin = origin.as_ref();
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    // CELLS 段
    let (no, header) = lines
        .next()
        .ok_or_else(|| FtError::parse(origin, 1, "空文件"))?;
    let n_cells = parse_section_header(origin, no, header, "CELLS")?;

    let mut data = UgeData {
        cell_center: Vec::with_capacity(n_cells),
        cell_volume: Vec::with_capacity(n_cells),
        connections: Vec::new(),
    };
    for _ in 0..n_cells {
        let (no, line) = lines
            .next()
            .ok_or_else(|| FtError::parse(origin, 0, "CELLS 段提前结束"))?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 5 {
            return Err(FtError::parse(
                origin,
                no,
                format!("控制体行应为 `id x y z volume`, 实际 {} 列", cols.len()),
            ));
        }
        let id: usize = parse_field(origin, no, cols[0], "控制体编号")?;
        if id != data.cell_center.len() + 1 {
            return Err(FtError::parse(
                origin,
                no,
                format!("控制体编号应连续: 期望 {}, 实际 {id}", data.cell_center.len() + 1),
            ));
        }
        let x: f64 = parse_field(origin, no, cols[1], "x")?;
        let y: f64 = parse_field(origin, no, cols[2], "y")?;
        let z: f64 = parse_field(origin, no, cols[3], "z")?;
        let volume: f64 = parse_field(origin, no, cols[4], "体积")?;
        if !(volume > 0.0) || !volume.is_finite() {
            return Err(FtError::parse(origin, no, format!("控制体体积无效: {volume}")));
        }
        data.cell_center.push(Point3D::new(x, y, z));
        data.cell_volume.push(volume);
    }

    // CONNECTIONS 段
    let (no, header) = lines
        .next()
        .ok_or_else(|| FtError::parse(origin, 0, "缺少 CONNECTIONS 段"))?;
    let n_conns = parse_section_header(origin, no, header, "CONNECTIONS")?;

    for _ in 0..n_conns {
        let (no, line) = lines
            .next()
            .ok_or_else(|| FtError::parse(origin, 0, "CONNECTIONS 段提前结束"))?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 6 {
            return Err(FtError::parse(
                origin,
                no,
                format!("连接行应为 `id1 id2 x y z area`, 实际 {} 列", cols.len()),
            ));
        }
        let a: usize = parse_field(origin, no, cols[0], "控制体编号")?;
        let b: usize = parse_field(origin, no, cols[1], "控制体编号")?;
        if a == 0 || a > n_cells || b == 0 || b > n_cells {
            return Err(FtError::parse(
                origin,
                no,
                format!("连接编号越界: ({a}, {b}), 共 {n_cells} 控制体"),
            ));
        }
        if a == b {
            return Err(FtError::parse(origin, no, format!("控制体 {a} 与自身相连")));
        }
        let x: f64 = parse_field(origin, no, cols[2], "x")?;
        let y: f64 = parse_field(origin, no, cols[3], "y")?;
        let z: f64 = parse_field(origin, no, cols[4], "z")?;
        let area: f64 = parse_field(origin, no, cols[5], "面积")?;
        if !(area > 0.0) || !area.is_finite() {
            return Err(FtError::parse(origin, no, format!("连接面积无效: {area}")));
        }
        data.connections.push(UgeConnection {
            a: (a - 1) as u32,
            b: (b - 1) as u32,
            center: Point3D::new(x, y, z),
            area,
        });
    }

    debug!(
        n_cells,
        n_connections = data.connections.len(),
        file = %origin.display(),
        ".uge 读取完成"
    );
    Ok(data)
}

fn parse_section_header(
    origin: &Path,
    line: usize,
    raw: &str,
    keyword: &str,
) -> FtResult<usize> {
    let cols: Vec<&str> = raw.split_whitespace().collect();
    if cols.len() < 2 || !cols[0].eq_ignore_ascii_case(keyword) {
        return Err(FtError::parse(
            origin,
            line,
            format!("期望 `{keyword} <n>` 段头, 实际 `{raw}`"),
        ));
    }
    parse_field(origin, line, cols[1], "计数")
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

    const SMALL_UGE: &str = "\
CELLS 3
1 0.0 0.0 0.0 1.0e-3
2 1.0 0.0 0.0 2.0e-3
3 2.0 0.0 0.0 1.0e-3
CONNECTIONS 2
1 2 0.5 0.0 0.0 1.0e-3
2 3 1.5 0.0 0.0 1.0e-3
";

    #[test]
    fn test_parse_small_uge() {
        let data = parse_uge_string(SMALL_UGE, "test.uge").unwrap();
        assert_eq!(data.n_cells(), 3);
        assert_eq!(data.connections.len(), 2);
        assert_eq!(data.connections[0].a, 0);
        assert_eq!(data.connections[0].b, 1);
        assert!((data.cell_volume[1] - 2.0e-3).abs() < 1e-18);
        assert!((data.connections[1].center.x - 1.5).abs() < 1e-14);
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let content = "cells 1\n1 0.0 0.0 0.0 1.0\nconnections 0\n";
        let data = parse_uge_string(content, "test.uge").unwrap();
        assert_eq!(data.n_cells(), 1);
        assert!(data.connections.is_empty());
    }

    #[test]
    fn test_bad_volume_rejected() {
        let content = "CELLS 1\n1 0.0 0.0 0.0 -1.0\nCONNECTIONS 0\n";
        assert!(parse_uge_string(content, "bad.uge").is_err());
    }

    #[test]
    fn test_out_of_range_connection_rejected() {
        let content = "CELLS 1\n1 0.0 0.0 0.0 1.0\nCONNECTIONS 1\n1 9 0.0 0.0 0.0 1.0\n";
        assert!(parse_uge_string(content, "bad.uge").is_err());
    }

    #[test]
    fn test_missing_connections_rejected() {
        let content = "CELLS 1\n1 0.0 0.0 0.0 1.0\n";
        assert!(parse_uge_string(content, "bad.uge").is_err());
    }
}
