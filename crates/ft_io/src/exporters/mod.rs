// crates/ft_io/src/exporters/mod.rs

//! 数据导出模块
//!
//! 粒子追踪结果的文本与可视化输出。所有写入器在目标目录不存在
//! 时自动创建。

pub mod trajectory;
pub mod travel_time;
pub mod vtk;

pub use trajectory::write_trajectory_files;
pub use travel_time::{write_control_plane_crossings, write_travel_times};
pub use vtk::write_trajectories_vtk;
