// crates/ft_io/src/import/mod.rs

//! 数据导入模块
//!
//! 裂隙网络粒子追踪的输入由网格生成器与流动求解器产出：
//!
//! - AVS UCD `.inp`: 三角网格（节点、单元、单元材料号 = 裂隙号）
//! - `.uge`: 控制体体积与控制体连接面
//! - `.zone`: 入流/出流边界节点编号
//! - 通量文件: 每条连接的体积通量
//! - 开度文件: 每条裂隙的开度

pub mod aperture;
pub mod avs_mesh;
pub mod flux;
pub mod uge;
pub mod zone;

pub use aperture::{load_aperture, parse_aperture_string};
pub use avs_mesh::{load_avs_mesh, parse_avs_string};
pub use flux::{assemble_flow, load_flux, parse_flux_string, FluxRecord};
pub use uge::{load_uge, parse_uge_string, UgeConnection, UgeData};
pub use zone::{load_zone, parse_zone_string};
