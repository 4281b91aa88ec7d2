// src/data_pipeline/mod.rs

// Les deux points de contact avec l'extérieur : le RPC (par lots) et les URI off-chain.
pub mod fetcher;
pub mod offchain_metadata;

pub use fetcher::{BatchFetcher, DEFAULT_MAX_BATCH_SIZE};
pub use offchain_metadata::{Attribute, OffchainMetadata, OffchainMetadataClient};
