pub mod account_source;
pub mod resilient_client;

pub use account_source::{AccountSource, MemcmpFilter};
pub use resilient_client::ResilientRpcClient;
