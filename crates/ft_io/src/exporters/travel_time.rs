// crates/ft_io/src/exporters/travel_time.rs

//! 运移时间与控制面穿越导出
//!
//! - 运移时间文件：每个粒子一行，对流时间与含基质滞留的总时间
//! - 控制面穿越文件：每次首穿一行，按控制面编号分组可得到沿程
//!   到达时间分布

use ft_foundation::error::{FtError, FtResult};
use ft_tracking::{ControlPlane, CrossingRecord, TravelTimeRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// 写出运移时间文件
pub fn write_travel_times(path: &Path, records: &[TravelTimeRecord]) -> FtResult<()> {
    ensure_parent(path)?;
    let file = File::create(path)
        .map_err(|e| FtError::io_with_source(format!("创建 {} 失败", path.display()), e))?;
    let mut w = BufWriter::new(file);

    (|| -> std::io::Result<()> {
        writeln!(
            w,
            "# id status t_adv t_total exit_x exit_y exit_z n_fractures n_steps"
        )?;
        for r in records {
            writeln!(
                w,
                "{} {} {:.9e} {:.9e} {:.9e} {:.9e} {:.9e} {} {}",
                r.id,
                r.status.name(),
                r.t_adv,
                r.t_total,
                r.exit_x,
                r.exit_y,
                r.exit_z,
                r.n_fractures,
                r.n_steps
            )?;
        }
        w.flush()
    })()
    .map_err(|e| FtError::io_with_source(format!("写入 {} 失败", path.display()), e))?;

    debug!(n_records = records.len(), file = %path.display(), "运移时间写出完成");
    Ok(())
}

/// 写出控制面穿越文件
pub fn write_control_plane_crossings(
    path: &Path,
    planes: &[ControlPlane],
    crossings: &[CrossingRecord],
) -> FtResult<()> {
    ensure_parent(path)?;
    let file = File::create(path)
        .map_err(|e| FtError::io_with_source(format!("创建 {} 失败", path.display()), e))?;
    let mut w = BufWriter::new(file);

    (|| -> std::io::Result<()> {
        for (k, plane) in planes.iter().enumerate() {
            writeln!(w, "# plane {k}: {} = {:.9e}", plane.axis.name(), plane.position)?;
        }
        writeln!(w, "# particle plane t_adv t_total x y z")?;
        for c in crossings {
            writeln!(
                w,
                "{} {} {:.9e} {:.9e} {:.9e} {:.9e} {:.9e}",
                c.particle, c.plane, c.t_adv, c.t_total, c.x, c.y, c.z
            )?;
        }
        w.flush()
    })()
    .map_err(|e| FtError::io_with_source(format!("写入 {} 失败", path.display()), e))?;

    debug!(n_crossings = crossings.len(), file = %path.display(), "控制面穿越写出完成");
    Ok(())
}

fn ensure_parent(path: &Path) -> FtResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FtError::io_with_source(format!("创建目录 {} 失败", parent.display()), e)
            })?;
        }
    }
    Ok(())
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ft_tracking::{Axis, ParticleStatus};
    use glam::DVec3;

    #[test]
    fn test_write_travel_times() {
        let dir = std::env::temp_dir().join("ft_io_tt_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("travel_times.dat");

        let records = vec![TravelTimeRecord {
            id: 0,
            status: ParticleStatus::Exited,
            t_adv: 1.5,
            t_total: 2.0,
            exit_x: 4.0,
            exit_y: 0.5,
            exit_z: 0.0,
            n_fractures: 2,
            n_steps: 120,
        }];
        write_travel_times(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().next().unwrap().starts_with("# id status"));
        let data = content.lines().nth(1).unwrap();
        assert!(data.starts_with("0 exited"), "数据行: {data}");
        assert!(data.ends_with("2 120"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_crossings() {
        let dir = std::env::temp_dir().join("ft_io_cp_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("planes.dat");

        let planes = vec![ControlPlane::new(Axis::X, 2.0)];
        let crossings = vec![CrossingRecord::new(
            3,
            0,
            1.0,
            1.2,
            DVec3::new(2.0, 0.5, 0.0),
        )];
        write_control_plane_crossings(&path, &planes, &crossings).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# plane 0: x"));
        assert!(content.lines().last().unwrap().starts_with("3 0"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
