pub mod config;
pub mod error;
pub mod filter;
pub mod locality;
pub mod output;
pub mod snapshot;

pub use netwatch_common::{ConnectionRecord, LocalityClass, TcpState};
