// crates/ft_io/src/exporters/vtk.rs

//! VTK 轨迹导出
//!
//! 把粒子轨迹写成 VTK legacy 格式的折线 (POLYDATA / LINES)，
//! 附带对流时间与速度模两个点标量，可直接在 ParaView 中按时间
//! 或速度着色。少于 2 个采样点的轨迹被跳过。

use ft_foundation::error::{FtError, FtResult};
use ft_tracking::TrajectoryPoint;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// 写出 VTK 折线文件
pub fn write_trajectories_vtk(path: &Path, trajectories: &[Vec<TrajectoryPoint>]) -> FtResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FtError::io_with_source(format!("创建目录 {} 失败", parent.display()), e)
            })?;
        }
    }

    let lines: Vec<&Vec<TrajectoryPoint>> =
        trajectories.iter().filter(|t| t.len() >= 2).collect();
    if lines.is_empty() {
        return Err(FtError::invalid_input("没有可导出的轨迹（采样点不足）"));
    }
    let n_points: usize = lines.iter().map(|t| t.len()).sum();

    let file = File::create(path)
        .map_err(|e| FtError::io_with_source(format!("创建 {} 失败", path.display()), e))?;
    let mut w = BufWriter::new(file);

    (|| -> std::io::Result<()> {
        writeln!(w, "# vtk DataFile Version 3.0")?;
        writeln!(w, "particle trajectories")?;
        writeln!(w, "ASCII")?;
        writeln!(w, "DATASET POLYDATA")?;

        writeln!(w, "POINTS {n_points} double")?;
        for traj in &lines {
            for p in traj.iter() {
                writeln!(w, "{:.9e} {:.9e} {:.9e}", p.x, p.y, p.z)?;
            }
        }

        let index_count: usize = lines.iter().map(|t| t.len() + 1).sum();
        writeln!(w, "LINES {} {index_count}", lines.len())?;
        let mut offset = 0usize;
        for traj in &lines {
            write!(w, "{}", traj.len())?;
            for k in 0..traj.len() {
                write!(w, " {}", offset + k)?;
            }
            writeln!(w)?;
            offset += traj.len();
        }

        writeln!(w, "POINT_DATA {n_points}")?;
        writeln!(w, "SCALARS advective_time double 1")?;
        writeln!(w, "LOOKUP_TABLE default")?;
        for traj in &lines {
            for p in traj.iter() {
                writeln!(w, "{:.9e}", p.t)?;
            }
        }
        writeln!(w, "SCALARS speed double 1")?;
        writeln!(w, "LOOKUP_TABLE default")?;
        for traj in &lines {
            for p in traj.iter() {
                writeln!(w, "{:.9e}", p.speed)?;
            }
        }
        w.flush()
    })()
    .map_err(|e| FtError::io_with_source(format!("写入 {} 失败", path.display()), e))?;

    debug!(
        n_lines = lines.len(),
        n_points,
        file = %path.display(),
        "VTK 轨迹写出完成"
    );
    Ok(())
}

// ============================================================
// 测试
// ============================================================
