//! Jito block engine bundle 中继：提交、inflight 状态与最终状态查询。

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::BundleRelayClient;
pub use error::RelayError;
pub use transport::{HttpRelayTransport, RelayTransport};
pub use types::{BundleId, InflightStatus};
