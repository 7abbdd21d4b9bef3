// crates/ft_io/src/import/flux.rs

//! 连接通量文件读取与流场解装配
//!
//! 流动求解器输出每条控制体连接上的体积通量：
//!
//! ```text
//! <id1> <id2> <flux>   （编号 1 基；通量正值为 id1 → id2 [m³/s]）
//! ```
//!
//! [`assemble_flow`] 把 `.uge` 控制体、连接通量与裂隙开度装配成
//! 追踪层所需的 [`FlowSolution`]。

use crate::import::uge::UgeData;
use ft_flow::{Connection, FlowSolution};
use ft_foundation::error::{FtError, FtResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 一条连接上的通量
#[derive(Debug, Clone, Copy)]
pub struct FluxRecord {
    /// 控制体 a（0 基）
    pub a: u32,
    /// 控制体 b（0 基）
    pub b: u32,
    /// 体积通量 [m³/s]，正值为 a → b
    pub flux: f64,
}

/// 从文件读取连接通量
pub fn load_flux(path: &Path) -> FtResult<Vec<FluxRecord>> {
    if !path.is_file() {
        return Err(FtError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FtError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
    parse_flux_string(&content, path)
}

/// 从字符串解析连接通量
pub fn parse_flux_string(content: &str, origin: impl AsRef<Path>) -> FtResult<Vec<FluxRecord>> {
    let origin = origin.as_ref();
    let mut records = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let no = i + 1;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 {
            return Err(FtError::parse(
                origin,
                no,
                format!("通量行应为 `id1 id2 flux`, 实际 {} 列", cols.len()),
            ));
        }
        let a: usize = cols[0]
            .parse()
            .map_err(|_| FtError::parse(origin, no, format!("无法解析编号: `{}`", cols[0])))?;
        let b: usize = cols[1]
            .parse()
            .map_err(|_| FtError::parse(origin, no, format!("无法解析编号: `{}`", cols[1])))?;
        let flux: f64 = cols[2]
            .parse()
            .map_err(|_| FtError::parse(origin, no, format!("无法解析通量: `{}`", cols[2])))?;
        if a == 0 || b == 0 {
            return Err(FtError::parse(origin, no, "控制体编号为 1 基, 不允许 0"));
        }
        if !flux.is_finite() {
            return Err(FtError::parse(origin, no, format!("通量非有限值: {flux}")));
        }
        records.push(FluxRecord {
            a: (a - 1) as u32,
            b: (b - 1) as u32,
            flux,
        });
    }

    if records.is_empty() {
        return Err(FtError::invalid_input(format!(
            "{}: 通量文件无有效数据",
            origin.display()
        )));
    }
    debug!(n_records = records.len(), file = %origin.display(), "连接通量读取完成");
    Ok(records)
}

/// 装配流场解
///
/// 把 `.uge` 的控制体连接与通量记录按 (a, b) 对配对；通量文件中
/// 方向与 `.uge` 相反的记录自动取反。每条连接都必须有通量。
pub fn assemble_flow(
    uge: &UgeData,
    fluxes: &[FluxRecord],
    aperture: Vec<f64>,
    porosity: f64,
) -> FtResult<FlowSolution> {
    let mut flux_by_pair: HashMap<(u32, u32), f64> = HashMap::with_capacity(fluxes.len());
    for r in fluxes {
        let key = (r.a.min(r.b), r.a.max(r.b));
        // 统一为 min → max 方向的符号
        let signed = if r.a <= r.b { r.flux } else { -r.flux };
        if flux_by_pair.insert(key, signed).is_some() {
            return Err(FtError::invalid_flow(format!(
                "连接 ({}, {}) 的通量重复",
                key.0 + 1,
                key.1 + 1
            )));
        }
    }

    let mut connections = Vec::with_capacity(uge.connections.len());
    let mut missing = 0usize;
    for c in &uge.connections {
        let key = (c.a.min(c.b), c.a.max(c.b));
        let Some(&signed) = flux_by_pair.get(&key) else {
            missing += 1;
            continue;
        };
        let flux = if c.a <= c.b { signed } else { -signed };
        connections.push(Connection {
            a: c.a,
            b: c.b,
            area: c.area,
            flux,
        });
    }
    if missing > 0 {
        return Err(FtError::invalid_flow(format!(
            "{missing} 条控制体连接缺少通量记录"
        )));
    }

    FlowSolution::new(
        vec![0.0; uge.n_cells()],
        uge.cell_volume.clone(),
        connections,
        Vec::new(),
        aperture,
        porosity,
    )
}

// ============================================================
// 测试
// ============================================================
