// crates/ft_config/src/lib.rs

//! FracTrans 配置层
//!
//! JSON 格式的运移配置。所有字段带默认值：最小配置只需给出
//! 输入文件路径，其余参数按缺省运行。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod transport_config;

pub use transport_config::{
    FlowConfig, MeshConfig, OutputConfig, ParticlesConfig, StepperSection, TransportConfig,
};
