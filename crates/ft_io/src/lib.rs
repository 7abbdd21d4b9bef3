// crates/ft_io/src/lib.rs

//! FracTrans IO 层
//!
//! 读取裂隙网络网格与流动求解器输出，导出粒子追踪结果。
//!
//! # 模块
//!
//! - [`import`]: AVS 网格、`.uge` 控制体、边界区、通量与开度文件
//! - [`exporters`]: 轨迹、运移时间、控制面穿越与 VTK 可视化
//!
//! 所有读取器都是行式文本解析，错误信息带文件路径与行号；
//! 每个读取器都有 `parse_*_string` 变体供无文件测试使用。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod exporters;
pub mod import;

pub use exporters::{
    write_control_plane_crossings, write_trajectories_vtk, write_trajectory_files,
    write_travel_times,
};
pub use import::{
    assemble_flow, load_aperture, load_avs_mesh, load_flux, load_uge, load_zone, FluxRecord,
    UgeConnection, UgeData,
};
