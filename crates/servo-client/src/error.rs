//! 客户端错误类型

use servo_driver::DriverError;
use servo_link::LinkError;
use servo_tools::{ConfigError, PatternError};
use thiserror::Error;

/// 客户端错误
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 位姿库中没有这个名称
    #[error("Unknown pattern '{name}'")]
    UnknownPattern { name: String },
}

/// 客户端 Result 别名
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn is_busy(&self) -> bool {
        matches!(self, ClientError::Driver(e) if e.is_busy())
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ClientError::Driver(e) if e.is_out_of_range())
    }

    /// 链路层故障（串口不可用或发送失败），继续操作没有意义
    pub fn is_link_failure(&self) -> bool {
        matches!(self, ClientError::Driver(DriverError::Link(_)))
    }

    /// 串口打开失败
    pub fn is_port_unavailable(&self) -> bool {
        matches!(
            self,
            ClientError::Driver(DriverError::Link(LinkError::PortUnavailable { .. }))
        )
    }
}
