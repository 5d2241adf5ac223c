//! 命令定义和实现

pub mod animate;
pub mod config;
pub mod manual;
pub mod patterns;
pub mod ports;
pub mod send;

pub use animate::{AnimateCommand, SequenceCommand};
pub use config::ConfigCommand;
pub use manual::{AllAngleCommand, TestCommand};
pub use patterns::PatternsCommand;
pub use send::SendCommand;
