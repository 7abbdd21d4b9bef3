// crates/ft_io/src/exporters/trajectory.rs

//! 粒子轨迹文件导出
//!
//! 每个粒子一个 `traj_<id>.dat` 文件，行格式 `t x y z v fracture`。
//! 未采样轨迹的粒子（空轨迹）不产生文件。

use ft_foundation::error::{FtError, FtResult};
use ft_tracking::TrajectoryPoint;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// 写出全部粒子轨迹，返回实际写出的文件数
pub fn write_trajectory_files(
    dir: &Path,
    trajectories: &[Vec<TrajectoryPoint>],
) -> FtResult<usize> {
    std::fs::create_dir_all(dir)
        .map_err(|e| FtError::io_with_source(format!("创建目录 {} 失败", dir.display()), e))?;

    let mut written = 0usize;
    for (id, traj) in trajectories.iter().enumerate() {
        if traj.is_empty() {
            continue;
        }
        let path = dir.join(format!("traj_{id}.dat"));
        let file = File::create(&path)
            .map_err(|e| FtError::io_with_source(format!("创建 {} 失败", path.display()), e))?;
        let mut w = BufWriter::new(file);
        write_one(&mut w, traj)
            .map_err(|e| FtError::io_with_source(format!("写入 {} 失败", path.display()), e))?;
        written += 1;
    }

    debug!(n_files = written, dir = %dir.display(), "轨迹文件写出完成");
    Ok(written)
}

fn write_one<W: Write>(w: &mut W, traj: &[TrajectoryPoint]) -> std::io::Result<()> {
    writeln!(w, "# t x y z v fracture")?;
    for p in traj {
        writeln!(
            w,
            "{:.9e} {:.9e} {:.9e} {:.9e} {:.9e} {}",
            p.t, p.x, p.y, p.z, p.speed, p.fracture
        )?;
    }
    w.flush()
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn sample_traj() -> Vec<TrajectoryPoint> {
        vec![
            TrajectoryPoint::new(0.0, DVec3::new(0.0, 0.5, 0.0), 1.0, 0),
            TrajectoryPoint::new(1.0, DVec3::new(1.0, 0.5, 0.0), 1.0, 0),
        ]
    }

    #[test]
    fn test_write_and_skip_empty() {
        let dir = std::env::temp_dir().join("ft_io_traj_test");
        let _ = std::fs::remove_dir_all(&dir);

        let trajectories = vec![sample_traj(), Vec::new(), sample_traj()];
        let n = write_trajectory_files(&dir, &trajectories).unwrap();
        assert_eq!(n, 2);

        assert!(dir.join("traj_0.dat").is_file());
        assert!(!dir.join("traj_1.dat").exists(), "空轨迹不应产生文件");
        assert!(dir.join("traj_2.dat").is_file());

        let content = std::fs::read_to_string(dir.join("traj_0.dat")).unwrap();
        assert!(content.starts_with("# t x y z v fracture"));
        assert_eq!(content.lines().count(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
