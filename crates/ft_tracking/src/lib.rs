// crates/ft_tracking/src/lib.rs

//! FracTrans 追踪层
//!
//! 拉格朗日粒子追踪：粒子沿重构速度场的路径线穿过裂隙网络，
//! 在交叉线处按分流规则切换裂隙，可选地叠加基质扩散滞留时间
//! (TDRW)，最终从出流边界离开并记录运移时间。
//!
//! # 模块
//!
//! - `particle`: 粒子状态与运移记录
//! - `zones`: 入流/出流边界区
//! - `stepper`: 预估-校正步进与单元穿越
//! - `routing`: 交叉线分流（完全混合 / 流线分流）
//! - `tdrw`: 时域随机游走滞留时间
//! - `control_plane`: 控制面穿越记录
//! - `seeder`: 入流边界布种
//! - `ensemble`: 并行系综运行

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control_plane;
pub mod ensemble;
pub mod particle;
pub mod routing;
pub mod seeder;
pub mod stepper;
pub mod tdrw;
pub mod zones;

pub use control_plane::{Axis, ControlPlane, CrossingRecord};
pub use ensemble::{Ensemble, EnsembleSummary, TransportOutcome, TransportSettings};
pub use particle::{Particle, ParticleStatus, TrajectoryPoint, TravelTimeRecord};
pub use routing::{IntersectionRouter, RoutingRule};
pub use seeder::{Seeder, SeedingMode};
pub use stepper::{StepEvent, Stepper, StepperConfig};
pub use tdrw::{erfc_inv, Tdrw, TdrwConfig};
pub use zones::BoundaryZones;

/// 预导入模块
pub mod prelude {
    pub use crate::control_plane::{Axis, ControlPlane, CrossingRecord};
    pub use crate::ensemble::{Ensemble, EnsembleSummary, TransportOutcome, TransportSettings};
    pub use crate::particle::{Particle, ParticleStatus, TrajectoryPoint, TravelTimeRecord};
    pub use crate::routing::{IntersectionRouter, RoutingRule};
    pub use crate::seeder::{Seeder, SeedingMode};
    pub use crate::stepper::{StepEvent, Stepper, StepperConfig};
    pub use crate::tdrw::{Tdrw, TdrwConfig};
    pub use crate::zones::BoundaryZones;
}
