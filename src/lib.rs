// src/lib.rs

// On déclare tous nos modules principaux pour les rendre publics et
// utilisables par nos programmes binaires (token_inspector.rs).
pub mod config;
pub mod data_pipeline;
pub mod decoders;
pub mod filtering;
pub mod monitoring;
pub mod pda;
pub mod programs;
pub mod rpc;
pub mod state;
pub mod token_data;
pub mod utils;

#[cfg(test)]
mod test_utils;
