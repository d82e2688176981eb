//! 服务启动与关闭流程

pub mod shutdown;
pub mod startup;
