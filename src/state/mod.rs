// src/state/mod.rs

pub mod account_cache;

pub use account_cache::{AccountCache, DEFAULT_CLUSTER};
